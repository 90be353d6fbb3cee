use std::path::{Path, PathBuf};
use std::process::Command;

#[allow(dead_code)]
pub fn git(repo: &Path, args: &[&str]) {
  let status = Command::new("git").args(args).current_dir(repo).status().unwrap();
  assert!(status.success(), "git {:?} failed", args);
}

fn commit(repo: &Path, message: &str, date: &str) {
  let status = Command::new("git")
    .args(["commit", "-q", "-m", message])
    .current_dir(repo)
    .env("GIT_AUTHOR_DATE", date)
    .env("GIT_COMMITTER_DATE", date)
    .status()
    .unwrap();
  assert!(status.success(), "git commit failed");
}

#[allow(dead_code)]
pub struct Fixture {
  pub root: tempfile::TempDir,
  pub work: PathBuf,
  /// SHA of the one commit made after the v1.0.0 tag.
  pub head: String,
}

/// A working clone with a local bare origin: config files committed,
/// `v1.0.0` tagged and pushed, one unreleased commit ("Fix crash") on top.
#[allow(dead_code)]
pub fn init_fixture_repo() -> Fixture {
  let root = tempfile::TempDir::new().unwrap();
  let work = root.path().join("work");
  let origin = root.path().join("origin.git");
  std::fs::create_dir_all(&work).unwrap();

  git(&work, &["init", "-q", "-b", "main"]);
  git(&work, &["config", "user.name", "Fixture Bot"]);
  git(&work, &["config", "user.email", "fixture@example.com"]);
  git(&work, &["config", "commit.gpgsign", "false"]);

  std::fs::create_dir_all(work.join(".github")).unwrap();
  std::fs::write(
    work.join(".github/labels.yml"),
    "- name: bug\n  color: d73a4a\n  description: Something is broken\n\
     - name: feature\n  color: a2eeef\n  description: New behavior\n\
     - name: skip-changelog\n  color: cccccc\n  description: Excluded from release notes\n",
  )
  .unwrap();
  std::fs::write(
    work.join(".github/release-drafter.yml"),
    "categories:\n  - title: Features\n    labels:\n      - feature\n  - title: Bug Fixes\n    labels:\n      - bug\nexclude-labels:\n  - skip-changelog\n",
  )
  .unwrap();

  git(&work, &["add", "."]);
  commit(&work, "chore: scaffold project", "2025-08-01T10:00:00");
  git(&work, &["tag", "v1.0.0"]);

  std::fs::write(work.join("fix.txt"), "patched\n").unwrap();
  git(&work, &["add", "."]);
  commit(&work, "Fix crash", "2025-08-02T10:00:00");

  let status = Command::new("git")
    .args(["init", "-q", "--bare"])
    .arg(&origin)
    .status()
    .unwrap();
  assert!(status.success(), "git init --bare failed");
  git(&work, &["remote", "add", "origin", origin.to_str().unwrap()]);
  git(&work, &["push", "-q", "origin", "main", "--tags"]);

  let out = Command::new("git")
    .args(["rev-parse", "HEAD"])
    .current_dir(&work)
    .output()
    .unwrap();
  assert!(out.status.success());
  let head = String::from_utf8(out.stdout).unwrap().trim().to_string();

  Fixture { root, work, head }
}
