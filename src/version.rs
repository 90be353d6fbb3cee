use once_cell::sync::Lazy;
use regex::Regex;

use crate::gitio::TagInfo;

// Matches version tags carrying a pre-release marker in the styles seen on
// real repositories: 1.2.3rc1, v1.2.3-rc.1, 2.0.0a1, 3.0.0.dev2, 1.0.0-beta.
static RE_PRERELEASE: Lazy<Regex> = Lazy::new(|| {
  Regex::new(r"(?i)^v?\d+(?:\.\d+)*[._-]?(?:a|b|c|rc|alpha|beta|dev|pre|preview)[._-]?\d*$").unwrap()
});

pub fn is_prerelease(tag: &str) -> bool {
  RE_PRERELEASE.is_match(tag.trim())
}

/// Newest tag that is a plain release. Expects `tags` newest first, as
/// produced by `gitio::tags_by_date`.
pub fn last_release_tag(tags: &[TagInfo]) -> Option<&TagInfo> {
  tags.iter().find(|t| !is_prerelease(&t.name))
}
