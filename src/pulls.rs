use std::io::Write;

use anyhow::Result;
use termcolor::WriteColor;

use crate::cli::EffectiveConfig;
use crate::config::ProjectConfig;
use crate::github::api::{GithubApi, collect_pages};
use crate::model::PullRequest;
use crate::term;

// Keeps CI logs bounded when a repository has never been labeled.
const MAX_REPORTED: usize = 20;

#[derive(Debug)]
pub struct Violation {
  pub number: i64,
  pub title: String,
  pub state: String,
  pub html_url: String,
  pub labels: Vec<String>,
}

/// PRs that should carry one of the required labels but do not. Closed PRs
/// that were never merged are out of scope. The scan stops collecting after
/// `MAX_REPORTED` hits.
pub fn find_violations(project: &ProjectConfig, pulls: &[PullRequest]) -> Vec<Violation> {
  let mut out: Vec<Violation> = Vec::new();

  for pull in pulls {
    if pull.state == "closed" && !pull.is_merged() {
      continue;
    }

    let names = pull.label_names();
    if !project.required_labels.is_disjoint(&names) {
      continue;
    }

    out.push(Violation {
      number: pull.number,
      title: pull.title.clone(),
      state: pull.state.clone(),
      html_url: pull.html_url.clone(),
      labels: names.into_iter().collect(),
    });

    if out.len() >= MAX_REPORTED {
      tracing::warn!("stopped auditing after {} unlabeled pull requests", MAX_REPORTED);
      break;
    }
  }

  out
}

pub fn run(cfg: &EffectiveConfig, project: &ProjectConfig, api: &dyn GithubApi) -> Result<usize> {
  tracing::info!("auditing pull requests for {}/{}", cfg.org, cfg.repo);

  let pulls = collect_pages(|page| api.list_pulls_page(&cfg.org, &cfg.repo, "all", page))?;
  let violations = find_violations(project, &pulls);

  let required: Vec<String> = project.required_labels.iter().cloned().collect();
  let mut out = term::stdout();
  for violation in &violations {
    let pr = term::link(&violation.html_url, &format!("PR #{}", violation.number));
    writeln!(out, "{}: [{}] {}", pr, violation.state, violation.title)?;
    out.set_color(&term::warning())?;
    writeln!(
      out,
      "\tshould have at least one label out of {} but found: {}",
      required.join(", "),
      violation.labels.join(", ")
    )?;
    out.reset()?;
  }

  Ok(violations.len())
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::model::{Label, ReleaseDrafter};

  fn project() -> ProjectConfig {
    let drafter: ReleaseDrafter = serde_yaml::from_str(
      "categories:\n  - title: Features\n    labels: [feature]\n  - title: Bug Fixes\n    labels: [bug]\n",
    )
    .unwrap();
    ProjectConfig::assemble(vec![], drafter)
  }

  fn pull(number: i64, state: &str, merged: bool, labels: &[&str]) -> PullRequest {
    PullRequest {
      number,
      title: format!("PR {}", number),
      state: state.into(),
      html_url: format!("https://github.com/acme/widget/pull/{}", number),
      user: None,
      labels: labels
        .iter()
        .map(|n| Label { name: n.to_string(), color: "ffffff".into(), description: None })
        .collect(),
      merged_at: merged.then(|| "2025-08-01T00:00:00Z".to_string()),
      closed_at: None,
      merge_commit_sha: None,
    }
  }

  #[test]
  fn labeled_pulls_pass() {
    let violations = find_violations(&project(), &[pull(1, "open", false, &["bug"])]);
    assert!(violations.is_empty());
  }

  #[test]
  fn open_unlabeled_pull_is_a_violation() {
    let violations = find_violations(&project(), &[pull(2, "open", false, &["docs"])]);
    assert_eq!(violations.len(), 1);
    assert_eq!(violations[0].number, 2);
    assert_eq!(violations[0].labels, vec!["docs".to_string()]);
  }

  #[test]
  fn closed_unmerged_pulls_are_skipped() {
    let violations = find_violations(&project(), &[pull(3, "closed", false, &[])]);
    assert!(violations.is_empty());
  }

  #[test]
  fn merged_unlabeled_pull_is_a_violation() {
    let violations = find_violations(&project(), &[pull(4, "closed", true, &[])]);
    assert_eq!(violations.len(), 1);
  }

  #[test]
  fn scan_caps_at_twenty_violations() {
    let pulls: Vec<PullRequest> = (1..=30).map(|n| pull(n, "open", false, &[])).collect();
    let violations = find_violations(&project(), &pulls);
    assert_eq!(violations.len(), 20);
  }
}
