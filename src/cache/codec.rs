//! Snapshot encoding for the cache state.
//!
//! The snapshot is a JSON object with one member per `CacheState` field.
//! Map fields are stored as arrays of `[key, value]` pairs.

use color_eyre::{eyre::eyre, Result};
use tracing::warn;

use super::state::CacheState;

/// Encode the state as a snapshot string.
pub fn encode(state: &CacheState) -> Result<String> {
  serde_json::to_string(state).map_err(|e| eyre!("Failed to encode cache snapshot: {}", e))
}

/// Decode a snapshot string.
///
/// Absent, empty or malformed input yields the default state.
pub fn decode(text: Option<&str>) -> CacheState {
  let Some(text) = text.filter(|t| !t.trim().is_empty()) else {
    return CacheState::default();
  };

  match serde_json::from_str(text) {
    Ok(state) => state,
    Err(e) => {
      warn!(error = %e, "discarding unreadable cache snapshot");
      CacheState::default()
    }
  }
}

/// Serde adapter storing a string-keyed map as a list of `[key, value]` pairs.
pub mod entries {
  use serde::{Deserialize, Deserializer, Serialize, Serializer};
  use std::collections::HashMap;

  pub fn serialize<V, S>(map: &HashMap<String, V>, serializer: S) -> Result<S::Ok, S::Error>
  where
    V: Serialize,
    S: Serializer,
  {
    // Sorted so identical states produce identical snapshots
    let mut pairs: Vec<(&String, &V)> = map.iter().collect();
    pairs.sort_by(|a, b| a.0.cmp(b.0));
    serializer.collect_seq(pairs)
  }

  pub fn deserialize<'de, V, D>(deserializer: D) -> Result<HashMap<String, V>, D::Error>
  where
    V: Deserialize<'de>,
    D: Deserializer<'de>,
  {
    let pairs: Vec<(String, V)> = Vec::deserialize(deserializer)?;
    Ok(pairs.into_iter().collect())
  }
}
