use std::collections::BTreeSet;
use std::io::Write;

use anyhow::{Result, bail};
use termcolor::WriteColor;

use crate::cli::EffectiveConfig;
use crate::config::ProjectConfig;
use crate::gitio;
use crate::github::api::{GithubApi, MAX_PAGES, PAGE_SIZE, collect_pages};
use crate::model::PullRequest;
use crate::term;
use crate::util;
use crate::version;

/// What a composition pass produced, before rendering.
#[derive(Debug)]
pub struct Notes {
  /// Category title to entry lines, in category order.
  pub sections: Vec<(String, Vec<String>)>,
  /// Merged PRs whose merge commit is not part of the unreleased range.
  pub ignored: Vec<String>,
  /// Label problems that block clean notes.
  pub errors: Vec<String>,
}

/// Bucket merged PRs into drafter sections. `unreleased` is consumed as PRs
/// claim their merge commits; whatever remains afterwards was pushed without
/// a PR. `pulls` must come newest first; the pass stops at the first PR
/// closed at or before the cutoff.
pub fn compose_notes(
  project: &ProjectConfig,
  pulls: &[PullRequest],
  unreleased: &mut BTreeSet<String>,
  cutoff_epoch: i64,
) -> Notes {
  let mut sections: Vec<(String, Vec<String>)> = project
    .categories
    .iter()
    .map(|c| (c.title.clone(), Vec::new()))
    .collect();
  let mut ignored: Vec<String> = Vec::new();
  let mut errors: Vec<String> = Vec::new();

  for pull in pulls {
    if !pull.is_merged() {
      continue;
    }

    let labels = pull.label_names();
    if !project.exclude_labels.is_disjoint(&labels) {
      continue;
    }

    let sha = pull.merge_commit_sha.as_deref().unwrap_or("");
    if unreleased.contains(sha) {
      let mut valid = project.required_labels.intersection(&labels);
      if let Some(label) = valid.next() {
        let title = &project.label_section[label];
        if let Some((_, entries)) = sections.iter_mut().find(|(t, _)| t == title) {
          entries.push(format!("* {} (#{}) @{}", pull.title, pull.number, pull.author()));
        }
      } else {
        errors.push(format!(
          "{} contains unknown labels {}, add one of the required labels: {}.",
          term::link(&pull.html_url, &format!("PR #{}", pull.number)),
          join(&labels),
          join(&project.required_labels),
        ));
      }
      unreleased.remove(sha);
    } else if closed_after(pull, cutoff_epoch) {
      ignored.push(format!(
        "ignored {} because its merge commit {} is not among the unreleased commits",
        pull.html_url,
        pull.merge_commit_sha.as_deref().unwrap_or("<none>"),
      ));
    } else {
      tracing::info!("stopped processing pull requests at the first one closed before the cutoff");
      break;
    }
  }

  Notes { sections, ignored, errors }
}

fn join(set: &BTreeSet<String>) -> String {
  set.iter().cloned().collect::<Vec<_>>().join(", ")
}

fn closed_after(pull: &PullRequest, cutoff_epoch: i64) -> bool {
  pull
    .closed_at
    .as_deref()
    .and_then(|s| chrono::DateTime::parse_from_rfc3339(s).ok())
    .map(|dt| dt.timestamp() > cutoff_epoch)
    .unwrap_or(false)
}

/// Render the Markdown body; empty sections are omitted.
pub fn render_body(notes: &Notes) -> String {
  let mut body = String::from("## Changes\n\n");
  for (title, entries) in &notes.sections {
    if entries.is_empty() {
      continue;
    }
    body.push_str(&format!("### {}\n\n", title));
    for entry in entries {
      body.push_str(entry);
      body.push('\n');
    }
    body.push('\n');
  }
  body
}

pub fn run(cfg: &EffectiveConfig, project: &ProjectConfig, api: &dyn GithubApi) -> Result<usize> {
  tracing::info!("drafting release notes for {}/{}", cfg.org, cfg.repo);

  // Local cleanup first: drop tags that no longer exist on origin.
  gitio::fetch_tags(".");

  let tags = gitio::tags_by_date(".")?;
  let Some(tag) = version::last_release_tag(&tags) else {
    bail!("no release tag found; tag a release before drafting notes");
  };

  let mut unreleased: BTreeSet<String> = gitio::rev_list_since(".", &tag.name)?.into_iter().collect();
  let age_days = (chrono::Utc::now().timestamp() - tag.epoch) / 86_400;
  tracing::info!(
    "counting {} commits since tag {}, made over {} days",
    unreleased.len(),
    tag.name,
    age_days
  );

  let releases = collect_pages(|page| api.list_releases_page(&cfg.org, &cfg.repo, page))?;
  for release in &releases {
    tracing::debug!(
      "release tag_name={} name={} draft={} prerelease={}",
      release.tag_name,
      release.name.as_deref().unwrap_or(""),
      release.draft,
      release.prerelease
    );
  }
  let existing_draft = releases.iter().find(|r| r.draft);

  // Page through closed PRs newest first, stopping once a page ends before
  // the cutoff; older pages cannot contribute.
  let mut pulls: Vec<PullRequest> = Vec::new();
  for page in 1..=MAX_PAGES {
    let batch = api.list_pulls_page(&cfg.org, &cfg.repo, "closed", page)?;
    let short_page = batch.len() < PAGE_SIZE;
    let past_cutoff = batch.last().map(|p| !closed_after(p, tag.epoch)).unwrap_or(false);
    pulls.extend(batch);
    if short_page || past_cutoff {
      break;
    }
  }

  let notes = compose_notes(project, &pulls, &mut unreleased, tag.epoch);

  // Commits no PR claimed are direct pushes; surface them for the operator.
  for sha in &unreleased {
    match api.get_commit(&cfg.org, &cfg.repo, sha) {
      Ok(info) => tracing::info!(
        "commit '{}' not included, see {}",
        util::subject_of(&info.commit.message),
        info.html_url
      ),
      Err(err) => tracing::warn!("commit {} not included (lookup failed: {:#})", util::short_sha(sha), err),
    }
  }

  for warning in &notes.ignored {
    tracing::warn!("{}", warning);
  }

  let body = render_body(&notes);
  print!("{}", body);

  if cfg.fix {
    match existing_draft {
      Some(draft) if draft.body.as_deref() == Some(body.as_str()) => {
        tracing::info!("release body already in sync, doing nothing");
      }
      Some(draft) => {
        tracing::info!("updating release body");
        api.update_release(&cfg.org, &cfg.repo, draft.id, "Draft", &body)?;
      }
      None => {
        tracing::info!("creating new draft release");
        api.create_draft_release(&cfg.org, &cfg.repo, "Draft", &body)?;
      }
    }
  }

  if !notes.errors.is_empty() {
    let mut out = term::stdout();
    for error in &notes.errors {
      out.set_color(&term::error())?;
      writeln!(out, "{}", error)?;
      out.reset()?;
    }
  }

  Ok(notes.errors.len())
}
