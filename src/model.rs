use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// One entry of `.github/labels.yml`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LabelSpec {
  pub name: String,
  pub color: String,
  pub description: String,
}

/// The subset of `.github/release-drafter.yml` that tender consumes.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReleaseDrafter {
  #[serde(default)]
  pub categories: Vec<Category>,
  #[serde(rename = "exclude-labels", skip_serializing_if = "Option::is_none")]
  pub exclude_labels: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Category {
  pub title: String,
  #[serde(default)]
  pub labels: Vec<String>,
}

// --- GitHub REST payloads (the fields tender reads) ---

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Label {
  pub name: String,
  pub color: String,
  #[serde(default)]
  pub description: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
  pub login: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PullRequest {
  pub number: i64,
  pub title: String,
  pub state: String,
  pub html_url: String,
  #[serde(default)]
  pub user: Option<User>,
  #[serde(default)]
  pub labels: Vec<Label>,
  #[serde(default)]
  pub merged_at: Option<String>,
  #[serde(default)]
  pub closed_at: Option<String>,
  #[serde(default)]
  pub merge_commit_sha: Option<String>,
}

impl PullRequest {
  pub fn is_merged(&self) -> bool {
    self.merged_at.is_some()
  }

  pub fn label_names(&self) -> BTreeSet<String> {
    self.labels.iter().map(|l| l.name.clone()).collect()
  }

  /// Author login, empty when GitHub returns no user (deleted accounts).
  pub fn author(&self) -> &str {
    self.user.as_ref().map(|u| u.login.as_str()).unwrap_or("")
  }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Release {
  pub id: i64,
  #[serde(default)]
  pub tag_name: String,
  #[serde(default)]
  pub name: Option<String>,
  #[serde(default)]
  pub body: Option<String>,
  pub draft: bool,
  #[serde(default)]
  pub prerelease: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitInfo {
  pub sha: String,
  pub html_url: String,
  pub commit: CommitMessage,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommitMessage {
  pub message: String,
}
