//! Locator helpers.
//!
//! A locator is the canonical URL of a catalog entity, e.g.
//! `https://swapi.dev/api/films/1/`. The short id is its trailing number.

use std::fmt;

/// Kind of catalog entity a locator points at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
  Film,
  Character,
}

impl EntityKind {
  /// Path segment the catalog uses for this kind
  pub fn segment(self) -> &'static str {
    match self {
      EntityKind::Film => "films",
      EntityKind::Character => "people",
    }
  }
}

impl fmt::Display for EntityKind {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    match self {
      EntityKind::Film => write!(f, "film"),
      EntityKind::Character => write!(f, "character"),
    }
  }
}

/// Extract the numeric id from a locator ending in `/<digits>/`.
///
/// Returns an empty string when the locator does not have that shape.
pub fn extract_id(locator: &str) -> String {
  let Some(trimmed) = locator.strip_suffix('/') else {
    return String::new();
  };
  let Some((_, last)) = trimmed.rsplit_once('/') else {
    return String::new();
  };

  if !last.is_empty() && last.bytes().all(|b| b.is_ascii_digit()) {
    last.to_string()
  } else {
    String::new()
  }
}

/// Build the canonical locator for an entity id.
pub fn build_locator(base_url: &str, id: &str, kind: EntityKind) -> String {
  format!(
    "{}/{}/{}/",
    base_url.trim_end_matches('/'),
    kind.segment(),
    id
  )
}
