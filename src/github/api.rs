use anyhow::{Context, Result, anyhow, bail};
use serde::de::DeserializeOwned;

use crate::model::{CommitInfo, Label, LabelSpec, PullRequest, Release};

pub const PAGE_SIZE: usize = 100;
pub const MAX_PAGES: usize = 100;
const API_ROOT: &str = "https://api.github.com";

/// REST surface tender needs. List endpoints are exposed per page so callers
/// can stop early; mutations are only reached under `--fix`.
pub trait GithubApi {
  fn list_labels_page(&self, owner: &str, repo: &str, page: usize) -> Result<Vec<Label>>;
  fn create_label(&self, owner: &str, repo: &str, spec: &LabelSpec) -> Result<()>;
  fn update_label(&self, owner: &str, repo: &str, name: &str, spec: &LabelSpec) -> Result<()>;
  fn list_pulls_page(&self, owner: &str, repo: &str, state: &str, page: usize) -> Result<Vec<PullRequest>>;
  fn list_releases_page(&self, owner: &str, repo: &str, page: usize) -> Result<Vec<Release>>;
  fn create_draft_release(&self, owner: &str, repo: &str, name: &str, body: &str) -> Result<()>;
  fn update_release(&self, owner: &str, repo: &str, id: i64, name: &str, body: &str) -> Result<()>;
  fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<CommitInfo>;
}

/// Drain a paged list endpoint until it runs dry.
pub fn collect_pages<T>(mut fetch: impl FnMut(usize) -> Result<Vec<T>>) -> Result<Vec<T>> {
  let mut out: Vec<T> = Vec::new();
  for page in 1..=MAX_PAGES {
    let batch = fetch(page)?;
    let done = batch.len() < PAGE_SIZE;
    out.extend(batch);
    if done {
      return Ok(out);
    }
  }
  bail!("gave up after {} pages; narrow the query", MAX_PAGES)
}

/// Discover a GitHub token: env vars first, then `gh auth token`.
pub fn get_github_token() -> Option<String> {
  for var in ["GITHUB_TOKEN", "GH_TOKEN", "HOMEBREW_GITHUB_API_TOKEN"] {
    if let Ok(t) = std::env::var(var) {
      if !t.trim().is_empty() {
        return Some(t);
      }
    }
  }

  if let Ok(output) = std::process::Command::new("gh").args(["auth", "token"]).output() {
    if output.status.success() {
      let t = String::from_utf8_lossy(&output.stdout).trim().to_string();

      if !t.is_empty() {
        return Some(t);
      }
    }
  }

  None
}

/// Pick a backend: fixtures when any TENDER_TEST_* variable is set,
/// otherwise real HTTP.
pub fn build_api(token: Option<String>) -> Box<dyn GithubApi> {
  if env_wants_mock() {
    return Box::new(GithubEnvApi);
  }
  if token.is_none() {
    tracing::warn!("no GitHub token found; set GITHUB_TOKEN or run: gh auth login");
  }
  Box::new(GithubHttpApi::new(token))
}

fn env_wants_mock() -> bool {
  std::env::vars().any(|(k, _)| k.starts_with("TENDER_TEST_"))
}

// --- HTTP backend ---

pub struct GithubHttpApi {
  agent: ureq::Agent,
  token: Option<String>,
}

impl GithubHttpApi {
  pub fn new(token: Option<String>) -> Self {
    Self {
      agent: ureq::AgentBuilder::new().build(),
      token,
    }
  }

  fn prepared(&self, req: ureq::Request) -> ureq::Request {
    let req = req
      .set("Accept", "application/vnd.github+json")
      .set("User-Agent", "tender");
    match &self.token {
      Some(t) => req.set("Authorization", &format!("Bearer {}", t)),
      None => req,
    }
  }

  fn get_json<T: DeserializeOwned>(&self, path: &str, query: &[(&str, String)]) -> Result<T> {
    let mut req = self.agent.get(&format!("{}{}", API_ROOT, path));
    for (key, value) in query {
      req = req.query(key, value);
    }

    let resp = self.prepared(req).call().map_err(describe)?;
    resp
      .into_json::<T>()
      .with_context(|| format!("decoding response from {}", path))
  }

  fn send_json(&self, method: &str, path: &str, payload: serde_json::Value) -> Result<()> {
    let req = self.prepared(self.agent.request(method, &format!("{}{}", API_ROOT, path)));
    req.send_json(payload).map_err(describe)?;
    Ok(())
  }
}

/// Surface the API `message` field on non-2xx responses.
fn describe(err: ureq::Error) -> anyhow::Error {
  match err {
    ureq::Error::Status(code, resp) => {
      let message = resp
        .into_json::<serde_json::Value>()
        .ok()
        .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
        .unwrap_or_default();
      if message.is_empty() {
        anyhow!("GitHub API returned {}", code)
      } else {
        anyhow!("GitHub API returned {}: {}", code, message)
      }
    }
    other => anyhow::Error::from(other),
  }
}

impl GithubApi for GithubHttpApi {
  fn list_labels_page(&self, owner: &str, repo: &str, page: usize) -> Result<Vec<Label>> {
    self.get_json(
      &format!("/repos/{}/{}/labels", owner, repo),
      &[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())],
    )
  }

  fn create_label(&self, owner: &str, repo: &str, spec: &LabelSpec) -> Result<()> {
    self.send_json(
      "POST",
      &format!("/repos/{}/{}/labels", owner, repo),
      serde_json::json!({
        "name": spec.name,
        "color": spec.color,
        "description": spec.description,
      }),
    )
  }

  fn update_label(&self, owner: &str, repo: &str, name: &str, spec: &LabelSpec) -> Result<()> {
    self.send_json(
      "PATCH",
      &format!("/repos/{}/{}/labels/{}", owner, repo, name),
      serde_json::json!({
        "color": spec.color,
        "description": spec.description,
      }),
    )
  }

  fn list_pulls_page(&self, owner: &str, repo: &str, state: &str, page: usize) -> Result<Vec<PullRequest>> {
    self.get_json(
      &format!("/repos/{}/{}/pulls", owner, repo),
      &[
        ("state", state.to_string()),
        ("sort", "created".to_string()),
        ("direction", "desc".to_string()),
        ("per_page", PAGE_SIZE.to_string()),
        ("page", page.to_string()),
      ],
    )
  }

  fn list_releases_page(&self, owner: &str, repo: &str, page: usize) -> Result<Vec<Release>> {
    self.get_json(
      &format!("/repos/{}/{}/releases", owner, repo),
      &[("per_page", PAGE_SIZE.to_string()), ("page", page.to_string())],
    )
  }

  fn create_draft_release(&self, owner: &str, repo: &str, name: &str, body: &str) -> Result<()> {
    self.send_json(
      "POST",
      &format!("/repos/{}/{}/releases", owner, repo),
      serde_json::json!({
        "tag_name": "",
        "name": name,
        "body": body,
        "draft": true,
        "prerelease": true,
      }),
    )
  }

  fn update_release(&self, owner: &str, repo: &str, id: i64, name: &str, body: &str) -> Result<()> {
    self.send_json(
      "PATCH",
      &format!("/repos/{}/{}/releases/{}", owner, repo, id),
      serde_json::json!({
        "name": name,
        "body": body,
        "draft": true,
      }),
    )
  }

  fn get_commit(&self, owner: &str, repo: &str, sha: &str) -> Result<CommitInfo> {
    self.get_json(&format!("/repos/{}/{}/commits/{}", owner, repo, sha), &[])
  }
}

// --- Fixture backend for offline tests ---
//
// Reads canned responses from TENDER_TEST_* variables; list endpoints serve
// everything on page 1. Mutations only log, so `--fix` paths stay observable
// without a network.

pub struct GithubEnvApi;

fn env_json<T: DeserializeOwned>(var: &str) -> Result<Option<T>> {
  match std::env::var(var) {
    Ok(s) => Ok(Some(
      serde_json::from_str(&s).with_context(|| format!("parsing {}", var))?,
    )),
    Err(_) => Ok(None),
  }
}

impl GithubApi for GithubEnvApi {
  fn list_labels_page(&self, _owner: &str, _repo: &str, page: usize) -> Result<Vec<Label>> {
    if page > 1 {
      return Ok(Vec::new());
    }
    Ok(env_json("TENDER_TEST_LABELS_JSON")?.unwrap_or_default())
  }

  fn create_label(&self, owner: &str, repo: &str, spec: &LabelSpec) -> Result<()> {
    tracing::info!("create label '{}' on {}/{}", spec.name, owner, repo);
    Ok(())
  }

  fn update_label(&self, owner: &str, repo: &str, name: &str, _spec: &LabelSpec) -> Result<()> {
    tracing::info!("update label '{}' on {}/{}", name, owner, repo);
    Ok(())
  }

  fn list_pulls_page(&self, _owner: &str, _repo: &str, _state: &str, page: usize) -> Result<Vec<PullRequest>> {
    if page > 1 {
      return Ok(Vec::new());
    }
    Ok(env_json("TENDER_TEST_PULLS_JSON")?.unwrap_or_default())
  }

  fn list_releases_page(&self, _owner: &str, _repo: &str, page: usize) -> Result<Vec<Release>> {
    if page > 1 {
      return Ok(Vec::new());
    }
    Ok(env_json("TENDER_TEST_RELEASES_JSON")?.unwrap_or_default())
  }

  fn create_draft_release(&self, owner: &str, repo: &str, name: &str, _body: &str) -> Result<()> {
    tracing::info!("create draft release '{}' on {}/{}", name, owner, repo);
    Ok(())
  }

  fn update_release(&self, owner: &str, repo: &str, id: i64, _name: &str, _body: &str) -> Result<()> {
    tracing::info!("update release {} on {}/{}", id, owner, repo);
    Ok(())
  }

  fn get_commit(&self, _owner: &str, _repo: &str, sha: &str) -> Result<CommitInfo> {
    let commits: std::collections::HashMap<String, CommitInfo> =
      env_json("TENDER_TEST_COMMITS_JSON")?.unwrap_or_default();
    commits
      .get(sha)
      .cloned()
      .ok_or_else(|| anyhow!("no fixture for commit {}", sha))
  }
}
