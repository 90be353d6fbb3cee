use std::collections::{BTreeMap, BTreeSet};

use anyhow::{Context, Result, bail};

use crate::model::{Category, LabelSpec, ReleaseDrafter};

pub const LABELS_FILE: &str = ".github/labels.yml";
pub const DRAFTER_FILE: &str = ".github/release-drafter.yml";

// Shared meta repository probed when a project does not carry its own copy.
const FALLBACK_META_ORG: &str = "pycontribs";

const DEFAULT_EXCLUDE_LABELS: &[&str] = &["skip-changelog"];

/// Declarative project configuration plus the maps derived from it.
#[derive(Debug)]
pub struct ProjectConfig {
  /// Desired labels by name, from `.github/labels.yml`.
  pub labels: BTreeMap<String, LabelSpec>,
  /// Release-drafter categories in file order.
  pub categories: Vec<Category>,
  /// Labels of which every PR must carry at least one.
  pub required_labels: BTreeSet<String>,
  /// Label name to release-notes section title; first category claiming a
  /// label wins.
  pub label_section: BTreeMap<String, String>,
  /// PRs carrying any of these never appear in release notes.
  pub exclude_labels: BTreeSet<String>,
}

impl ProjectConfig {
  pub fn load(org: &str) -> Result<Self> {
    let labels_raw = load_config_text(org, LABELS_FILE)?;
    let specs: Vec<LabelSpec> =
      serde_yaml::from_str(&labels_raw).with_context(|| format!("parsing {}", LABELS_FILE))?;

    let drafter_raw = load_config_text(org, DRAFTER_FILE)?;
    let drafter: ReleaseDrafter =
      serde_yaml::from_str(&drafter_raw).with_context(|| format!("parsing {}", DRAFTER_FILE))?;

    Ok(Self::assemble(specs, drafter))
  }

  /// Build the derived maps from parsed files.
  pub fn assemble(specs: Vec<LabelSpec>, drafter: ReleaseDrafter) -> Self {
    let mut labels = BTreeMap::new();
    for spec in specs {
      labels.insert(spec.name.clone(), spec);
    }

    let mut required_labels = BTreeSet::new();
    let mut label_section = BTreeMap::new();
    for category in &drafter.categories {
      if category.labels.is_empty() {
        tracing::warn!("category {:?} does not have any labels defined", category.title);
        continue;
      }
      for label in &category.labels {
        required_labels.insert(label.clone());
        label_section
          .entry(label.clone())
          .or_insert_with(|| category.title.clone());
      }
    }

    let exclude_labels: BTreeSet<String> = match drafter.exclude_labels {
      Some(ref list) => list.iter().cloned().collect(),
      None => DEFAULT_EXCLUDE_LABELS.iter().map(|s| s.to_string()).collect(),
    };

    tracing::info!(
      "labels mapped to release notes sections: {}",
      label_section.keys().cloned().collect::<Vec<_>>().join(", ")
    );

    Self {
      labels,
      categories: drafter.categories,
      required_labels,
      label_section,
      exclude_labels,
    }
  }
}

/// Resolve a config file: local checkout first, then the org meta repo, then
/// the shared fallback meta repo. First hit wins.
fn load_config_text(org: &str, rel_path: &str) -> Result<String> {
  let mut tried: Vec<String> = Vec::new();

  for location in candidate_locations(org, rel_path) {
    if tried.contains(&location) {
      continue;
    }
    tried.push(location.clone());

    let found = if location.starts_with("http") {
      http_get_text(&location)
    } else {
      std::fs::read_to_string(&location).ok()
    };

    match found {
      Some(text) => {
        tracing::info!("loaded {}", location);
        return Ok(text);
      }
      None => tracing::debug!("config {} not found", location),
    }
  }

  bail!("unable to load {} from any of: {}", rel_path, tried.join(", "))
}

fn candidate_locations(org: &str, rel_path: &str) -> Vec<String> {
  vec![
    rel_path.to_string(),
    format!("https://raw.githubusercontent.com/{}/meta/master/{}", org, rel_path),
    format!(
      "https://raw.githubusercontent.com/{}/meta/master/{}",
      FALLBACK_META_ORG, rel_path
    ),
  ]
}

/// GET a candidate location; any HTTP failure just moves on down the chain.
fn http_get_text(url: &str) -> Option<String> {
  let agent = ureq::AgentBuilder::new().build();
  match agent.get(url).set("User-Agent", "tender").call() {
    Ok(resp) => resp.into_string().ok(),
    Err(err) => {
      tracing::info!("config {} not loaded: {}", url, err);
      None
    }
  }
}
