use std::collections::BTreeMap;
use std::io::Write;

use anyhow::Result;
use termcolor::WriteColor;

use crate::cli::EffectiveConfig;
use crate::config::ProjectConfig;
use crate::github::api::{GithubApi, collect_pages};
use crate::model::{Label, LabelSpec};
use crate::term;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LabelAction {
  /// Configured but absent from the repository.
  Create(LabelSpec),
  /// Present with a different color or description.
  Update(LabelSpec),
  /// On the repository but not in the configuration; never deleted, only
  /// reported.
  Unknown(String),
}

/// Diff desired label specs against what the repository has.
pub fn diff_labels(desired: &BTreeMap<String, LabelSpec>, existing: &[Label]) -> Vec<LabelAction> {
  let existing_by_name: BTreeMap<&str, &Label> =
    existing.iter().map(|l| (l.name.as_str(), l)).collect();

  let mut actions: Vec<LabelAction> = Vec::new();
  for (name, spec) in desired {
    match existing_by_name.get(name.as_str()) {
      None => actions.push(LabelAction::Create(spec.clone())),
      Some(label) => {
        let color_differs = !label
          .color
          .eq_ignore_ascii_case(spec.color.trim_start_matches('#'));
        let desc_differs = label.description.as_deref().unwrap_or("") != spec.description;
        if color_differs || desc_differs {
          actions.push(LabelAction::Update(spec.clone()));
        }
      }
    }
  }

  for label in existing {
    if !desired.contains_key(&label.name) {
      actions.push(LabelAction::Unknown(label.name.clone()));
    }
  }

  actions
}

pub fn run(cfg: &EffectiveConfig, project: &ProjectConfig, api: &dyn GithubApi) -> Result<usize> {
  tracing::info!("auditing repository labels for {}/{}", cfg.org, cfg.repo);

  let existing = collect_pages(|page| api.list_labels_page(&cfg.org, &cfg.repo, page))?;
  let actions = diff_labels(&project.labels, &existing);

  let mut out = term::stdout();
  let mut unknown = 0usize;
  let mut pending = 0usize;

  for action in &actions {
    match action {
      LabelAction::Create(spec) => {
        out.set_color(&term::warning())?;
        writeln!(out, "missing label '{}'", spec.name)?;
        out.reset()?;
        if cfg.fix {
          api.create_label(&cfg.org, &cfg.repo, spec)?;
          writeln!(out, "\tcreated with color {} and description '{}'", spec.color, spec.description)?;
        } else {
          pending += 1;
        }
      }
      LabelAction::Update(spec) => {
        out.set_color(&term::warning())?;
        writeln!(out, "label '{}' attributes differ", spec.name)?;
        out.reset()?;
        if cfg.fix {
          api.update_label(&cfg.org, &cfg.repo, &spec.name, spec)?;
          writeln!(out, "\tupdated to color {} and description '{}'", spec.color, spec.description)?;
        } else {
          pending += 1;
        }
      }
      LabelAction::Unknown(name) => {
        unknown += 1;
        out.set_color(&term::error())?;
        writeln!(out, "unknown label '{}' found, you may want to rename or remove it", name)?;
        out.reset()?;
      }
    }
  }

  if actions.is_empty() {
    out.set_color(&term::success())?;
    writeln!(out, "labels in sync")?;
    out.reset()?;
  }

  Ok(pending + unknown)
}
