//! Core traits for cached entities.

use serde::{de::DeserializeOwned, Serialize};

use crate::catalog::EntityKind;

/// Trait for entities held in the normalized cache.
///
/// An entity is identified by its canonical locator and references entities
/// of the other kind by locator.
pub trait Entity: Clone + Send + Sync + Serialize + DeserializeOwned + 'static {
  /// Canonical locator, used as the cache key
  fn locator(&self) -> &str;

  /// Locators of the entities this one references, in catalog order
  fn references(&self) -> &[String];

  /// Entity kind, for logging and locator construction
  fn kind() -> EntityKind;
}
