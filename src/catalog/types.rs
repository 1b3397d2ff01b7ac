use serde::{Deserialize, Serialize};

use crate::cache::Entity;

use super::locator::EntityKind;

/// Film record as served by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Film {
  pub title: String,
  #[serde(default)]
  pub episode_id: u32,
  #[serde(default)]
  pub opening_crawl: String,
  #[serde(default)]
  pub director: String,
  #[serde(default)]
  pub producer: String,
  #[serde(default)]
  pub release_date: String,
  /// Character locators, in the order the catalog lists them
  #[serde(default)]
  pub characters: Vec<String>,
  #[serde(default)]
  pub planets: Vec<String>,
  #[serde(default)]
  pub starships: Vec<String>,
  #[serde(default)]
  pub vehicles: Vec<String>,
  #[serde(default)]
  pub species: Vec<String>,
  #[serde(default)]
  pub created: String,
  #[serde(default)]
  pub edited: String,
  /// Canonical locator
  pub url: String,
}

/// Character record as served by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
  pub name: String,
  #[serde(default)]
  pub height: String,
  #[serde(default)]
  pub mass: String,
  #[serde(default)]
  pub hair_color: String,
  #[serde(default)]
  pub skin_color: String,
  #[serde(default)]
  pub eye_color: String,
  #[serde(default)]
  pub birth_year: String,
  #[serde(default)]
  pub gender: String,
  #[serde(default)]
  pub homeworld: String,
  /// Film locators, in the order the catalog lists them
  #[serde(default)]
  pub films: Vec<String>,
  #[serde(default)]
  pub species: Vec<String>,
  #[serde(default)]
  pub vehicles: Vec<String>,
  #[serde(default)]
  pub starships: Vec<String>,
  #[serde(default)]
  pub created: String,
  #[serde(default)]
  pub edited: String,
  /// Canonical locator
  pub url: String,
}

impl Entity for Film {
  fn locator(&self) -> &str {
    &self.url
  }

  fn references(&self) -> &[String] {
    &self.characters
  }

  fn kind() -> EntityKind {
    EntityKind::Film
  }
}

impl Entity for Character {
  fn locator(&self) -> &str {
    &self.url
  }

  fn references(&self) -> &[String] {
    &self.films
  }

  fn kind() -> EntityKind {
    EntityKind::Character
  }
}
