use anyhow::Result;
use once_cell::sync::Lazy;
use regex::Regex;

use crate::util::run_git;

/// A tag name paired with the commit time of the commit it points at.
#[derive(Debug, Clone)]
pub struct TagInfo {
  pub name: String,
  pub epoch: i64,
}

/// Parse `remote.origin.url` to extract (owner, repo) when hosted on GitHub.
pub fn parse_origin_github(repo: &str) -> Option<(String, String)> {
  static RE_ORIGIN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:git@github\.com:|https?://github\.com/)([^/]+)/([^/]+?)(?:\.git)?$").unwrap());

  let url = run_git(repo, &["config".into(), "--get".into(), "remote.origin.url".into()]).ok()?;
  let caps = RE_ORIGIN.captures(url.trim())?;

  Some((caps[1].to_string(), caps[2].to_string()))
}

/// Drop local tags that no longer exist on origin, then pull the rest.
/// Best-effort: origin-less or offline repositories only log at debug.
pub fn fetch_tags(repo: &str) {
  let args: Vec<String> = vec![
    "fetch".into(),
    "--prune".into(),
    "origin".into(),
    "+refs/tags/*:refs/tags/*".into(),
  ];
  if let Err(err) = run_git(repo, &args) {
    tracing::debug!("tag sync with origin skipped: {:#}", err);
  }
}

/// All tags with their commit times, newest first.
pub fn tags_by_date(repo: &str) -> Result<Vec<TagInfo>> {
  let out = run_git(
    repo,
    &vec![
      "for-each-ref".into(),
      "refs/tags".into(),
      "--sort=-creatordate".into(),
      "--format=%(refname:short)%00%(creatordate:unix)".into(),
    ],
  )?;

  let mut tags: Vec<TagInfo> = Vec::new();
  for line in out.lines() {
    let mut parts = line.splitn(2, '\u{0}');
    let (Some(name), Some(epoch)) = (parts.next(), parts.next()) else { continue };
    if name.is_empty() {
      continue;
    }
    tags.push(TagInfo {
      name: name.to_string(),
      epoch: epoch.trim().parse().unwrap_or(0),
    });
  }
  Ok(tags)
}

/// Commit SHAs reachable from HEAD but not from `tag`.
pub fn rev_list_since(repo: &str, tag: &str) -> Result<Vec<String>> {
  let out = run_git(repo, &vec!["rev-list".into(), format!("{}..HEAD", tag)])?;
  Ok(
    out
      .lines()
      .map(str::trim)
      .filter(|s| !s.is_empty())
      .map(String::from)
      .collect(),
  )
}

#[cfg(test)]
mod tests {
  use super::*;
  use std::process::Command;

  fn git(repo: &std::path::Path, args: &[&str]) {
    let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
    assert!(status.success(), "git {:?} failed", args);
  }

  fn commit(repo: &std::path::Path, message: &str, date: &str) {
    let status = Command::new("git")
      .args(["commit", "-q", "-m", message])
      .current_dir(repo)
      .env("GIT_AUTHOR_DATE", date)
      .env("GIT_COMMITTER_DATE", date)
      .status()
      .unwrap();
    assert!(status.success(), "git commit failed");
  }

  fn fixture() -> tempfile::TempDir {
    let dir = tempfile::TempDir::new().unwrap();
    git(dir.path(), &["init", "-q", "-b", "main"]);
    git(dir.path(), &["config", "user.name", "Fixture Bot"]);
    git(dir.path(), &["config", "user.email", "fixture@example.com"]);
    git(dir.path(), &["config", "commit.gpgsign", "false"]);

    std::fs::write(dir.path().join("a.txt"), "one\n").unwrap();
    git(dir.path(), &["add", "."]);
    commit(dir.path(), "first", "2025-08-01T10:00:00");
    git(dir.path(), &["tag", "v1.0.0"]);

    std::fs::write(dir.path().join("b.txt"), "two\n").unwrap();
    git(dir.path(), &["add", "."]);
    commit(dir.path(), "second", "2025-08-02T10:00:00");
    dir
  }

  #[test]
  fn origin_parse_recognizes_github_remotes() {
    let dir = fixture();
    let repo = dir.path().to_str().unwrap();
    git(dir.path(), &["remote", "add", "origin", "git@github.com:acme/widget.git"]);
    assert_eq!(parse_origin_github(repo), Some(("acme".into(), "widget".into())));

    git(dir.path(), &["remote", "set-url", "origin", "https://github.com/acme/widget"]);
    assert_eq!(parse_origin_github(repo), Some(("acme".into(), "widget".into())));

    git(dir.path(), &["remote", "set-url", "origin", "https://example.com/acme/widget.git"]);
    assert_eq!(parse_origin_github(repo), None);
  }

  #[test]
  fn tags_listed_newest_first_with_epochs() {
    let dir = fixture();
    let repo = dir.path().to_str().unwrap();
    git(dir.path(), &["tag", "v1.1.0"]);

    let tags = tags_by_date(repo).unwrap();
    assert_eq!(tags.len(), 2);
    assert!(tags.iter().all(|t| t.epoch > 0));
    // v1.1.0 points at the newer commit
    assert_eq!(tags[0].name, "v1.1.0");
  }

  #[test]
  fn rev_list_counts_commits_after_tag() {
    let dir = fixture();
    let repo = dir.path().to_str().unwrap();
    let shas = rev_list_since(repo, "v1.0.0").unwrap();
    assert_eq!(shas.len(), 1);
    assert_eq!(shas[0].len(), 40);
  }

  #[test]
  fn fetch_tags_tolerates_missing_origin() {
    let dir = fixture();
    // No origin remote configured; must not panic or error out.
    fetch_tags(dir.path().to_str().unwrap());
  }
}
