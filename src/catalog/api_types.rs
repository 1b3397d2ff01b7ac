//! Serde-deserializable types matching catalog API envelopes.
//!
//! Entity payloads deserialize straight into the domain types; only the
//! list envelope needs its own shape.

use serde::Deserialize;

use super::types::Film;

// ============================================================================
// Film list endpoint response
// ============================================================================

#[derive(Debug, Deserialize)]
pub struct ApiFilmList {
  #[serde(default)]
  pub count: u64,
  /// Next page link; pages beyond the first are not followed
  pub next: Option<String>,
  #[serde(default)]
  pub results: Vec<Film>,
}
