//! Fixtures shared by unit tests.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

use crate::catalog::{CatalogGateway, Character, Film};

pub const BASE: &str = "https://swapi.dev/api";

pub fn film_url(id: u32) -> String {
  format!("{}/films/{}/", BASE, id)
}

pub fn character_url(id: u32) -> String {
  format!("{}/people/{}/", BASE, id)
}

pub fn film(id: u32, characters: &[u32]) -> Film {
  Film {
    title: format!("Film {}", id),
    episode_id: id,
    opening_crawl: "It is a period of civil war.".to_string(),
    director: "George Lucas".to_string(),
    producer: "Gary Kurtz, Rick McCallum".to_string(),
    release_date: "1977-05-25".to_string(),
    characters: characters.iter().map(|c| character_url(*c)).collect(),
    planets: Vec::new(),
    starships: Vec::new(),
    vehicles: Vec::new(),
    species: Vec::new(),
    created: "2014-12-10T14:23:31.880000Z".to_string(),
    edited: "2014-12-20T19:49:45.256000Z".to_string(),
    url: film_url(id),
  }
}

pub fn character(id: u32, films: &[u32]) -> Character {
  Character {
    name: format!("Character {}", id),
    height: "172".to_string(),
    mass: "77".to_string(),
    hair_color: "blond".to_string(),
    skin_color: "fair".to_string(),
    eye_color: "blue".to_string(),
    birth_year: "19BBY".to_string(),
    gender: "male".to_string(),
    homeworld: format!("{}/planets/1/", BASE),
    films: films.iter().map(|f| film_url(*f)).collect(),
    species: Vec::new(),
    vehicles: Vec::new(),
    starships: Vec::new(),
    created: "2014-12-09T13:50:51.644000Z".to_string(),
    edited: "2014-12-20T21:17:56.891000Z".to_string(),
    url: character_url(id),
  }
}

/// In-process catalog with scripted contents and a request log.
///
/// Lookups resolve by exact locator first, then through `aliases`, so a
/// requested locator can resolve to an entity with a different canonical
/// form.
#[derive(Default)]
pub struct FakeGateway {
  pub films: HashMap<String, Film>,
  pub characters: HashMap<String, Character>,
  pub aliases: HashMap<String, String>,
  pub failing: HashSet<String>,
  pub calls: Mutex<Vec<String>>,
}

impl FakeGateway {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn with_film(mut self, film: Film) -> Self {
    self.films.insert(film.url.clone(), film);
    self
  }

  pub fn with_character(mut self, character: Character) -> Self {
    self.characters.insert(character.url.clone(), character);
    self
  }

  pub fn with_alias(mut self, requested: &str, canonical: &str) -> Self {
    self
      .aliases
      .insert(requested.to_string(), canonical.to_string());
    self
  }

  pub fn failing(mut self, locator: &str) -> Self {
    self.failing.insert(locator.to_string());
    self
  }

  pub fn calls(&self) -> Vec<String> {
    self.calls.lock().unwrap().clone()
  }

  fn record(&self, call: String) {
    self.calls.lock().unwrap().push(call);
  }

  fn resolve<'a>(&'a self, locator: &'a str) -> Option<&'a str> {
    if self.failing.contains(locator) {
      return None;
    }
    Some(
      self
        .aliases
        .get(locator)
        .map(String::as_str)
        .unwrap_or(locator),
    )
  }
}

#[async_trait]
impl CatalogGateway for FakeGateway {
  async fn list_films(&self) -> Vec<Film> {
    self.record("list".to_string());
    tokio::task::yield_now().await;

    let mut films: Vec<Film> = self.films.values().cloned().collect();
    films.sort_by_key(|f| f.episode_id);
    films
  }

  async fn fetch_film(&self, locator: &str) -> Option<Film> {
    self.record(format!("film {}", locator));
    tokio::task::yield_now().await;

    self
      .resolve(locator)
      .and_then(|key| self.films.get(key).cloned())
  }

  async fn fetch_character(&self, locator: &str) -> Option<Character> {
    self.record(format!("character {}", locator));
    tokio::task::yield_now().await;

    self
      .resolve(locator)
      .and_then(|key| self.characters.get(key).cloned())
  }
}
