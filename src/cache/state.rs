//! The cache root and its derived views.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use super::codec::entries;
use crate::catalog::{Character, Film};

/// All cached catalog data.
///
/// Map-typed fields are declared with `entries` so they persist as
/// `[key, value]` pair lists. Fields missing from a snapshot keep their
/// defaults.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CacheState {
  /// Full film list, fetched once
  pub films: Vec<Film>,
  #[serde(with = "entries")]
  pub film_by_id: HashMap<String, Film>,
  /// Selected film locator, empty when nothing is selected
  pub selected_film_id: String,
  /// Resolved characters per film locator
  #[serde(with = "entries")]
  pub film_characters: HashMap<String, Vec<Character>>,
  #[serde(with = "entries")]
  pub character_by_id: HashMap<String, Character>,
  /// Selected character locator, empty when nothing is selected
  pub selected_character_id: String,
  /// Resolved films per character locator
  #[serde(with = "entries")]
  pub character_films: HashMap<String, Vec<Film>>,
  /// A primary fetch is in flight
  pub is_loading: bool,
  /// A cascade of referenced-entity fetches is in flight
  pub is_inter_loading: bool,
}

impl CacheState {
  pub fn current_film(&self) -> Option<&Film> {
    self.film_by_id.get(&self.selected_film_id)
  }

  pub fn current_film_characters(&self) -> Option<&[Character]> {
    self
      .film_characters
      .get(&self.selected_film_id)
      .map(Vec::as_slice)
  }

  pub fn current_character(&self) -> Option<&Character> {
    self.character_by_id.get(&self.selected_character_id)
  }

  pub fn current_character_films(&self) -> Option<&[Film]> {
    self
      .character_films
      .get(&self.selected_character_id)
      .map(Vec::as_slice)
  }

  /// Clear the in-flight flags.
  ///
  /// A snapshot taken mid-fetch carries them, but nothing is in flight in a
  /// freshly started process.
  pub fn settle(&mut self) {
    self.is_loading = false;
    self.is_inter_loading = false;
  }
}
