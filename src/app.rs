use color_eyre::{eyre::eyre, Result};
use std::sync::Arc;
use tracing::info;

use crate::cache::storage::scoped_slot;
use crate::cache::{persist, NoopStorage, SlotStorage, SqliteStorage};
use crate::catalog::{build_locator, extract_id, CatalogClient, Character, EntityKind, Film};
use crate::config::Config;
use crate::store::{CatalogStore, Subscription};

/// What to show
#[derive(Debug, Clone)]
pub enum Command {
  /// The full film list
  Films,
  /// One film with its characters, optionally following one of them
  Film {
    id: String,
    open_character: Option<usize>,
  },
  /// One character with its films
  Character { id: String },
  /// What the cache currently holds
  Status,
}

/// Main application state
pub struct App {
  config: Config,
  store: CatalogStore<CatalogClient>,
  /// Keeps the snapshot in sync with the store while the app is alive
  _persistence: Subscription,
}

impl App {
  pub fn new(config: Config, persist_enabled: bool) -> Result<Self> {
    let client = CatalogClient::new(&config.api)?;

    let storage: Arc<dyn SlotStorage> = if persist_enabled && config.storage.enabled {
      Arc::new(SqliteStorage::open(&config.database_path()?)?)
    } else {
      Arc::new(NoopStorage)
    };
    let slot = scoped_slot(&config.storage.slot, &config.api.url);

    let state = persist::rehydrate(storage.as_ref(), &slot);
    let store = CatalogStore::new(client, state);
    let persistence = persist::attach(&store, storage, slot);

    Ok(Self {
      config,
      store,
      _persistence: persistence,
    })
  }

  pub async fn run(&self, command: Command) -> Result<()> {
    info!(?command, "running");

    match command {
      Command::Films => self.show_films().await,
      Command::Film { id, open_character } => self.show_film(&id, open_character).await,
      Command::Character { id } => self.show_character(&id).await,
      Command::Status => {
        self.show_status();
        Ok(())
      }
    }
  }

  async fn show_films(&self) -> Result<()> {
    self.store.ensure_films().await;

    let films = self.store.films();
    if films.is_empty() {
      println!("No films available.");
      return Ok(());
    }

    for film in &films {
      println!(
        "{:>3}  Episode {:<2} {} ({})",
        extract_id(&film.url),
        film.episode_id,
        film.title,
        film.release_date
      );
    }
    Ok(())
  }

  async fn show_film(&self, id: &str, open_character: Option<usize>) -> Result<()> {
    let locator = build_locator(&self.config.api.url, id, EntityKind::Film);
    self.store.open_film(&locator).await;

    let film = self
      .store
      .current_film()
      .ok_or_else(|| eyre!("Film {} could not be loaded", id))?;
    let characters = self.store.current_film_characters().unwrap_or_default();
    print_film(&film, &characters);

    let Some(index) = open_character else {
      return Ok(());
    };

    let character = index
      .checked_sub(1)
      .and_then(|i| characters.get(i))
      .cloned()
      .ok_or_else(|| eyre!("Film {} has no character #{}", id, index))?;

    let locator = character.url.clone();
    self
      .store
      .set_current_character(character)
      .await
      .map_err(|e| eyre!("Resolving character films failed: {}", e))?;
    self.store.open_character(&locator).await;

    println!();
    self.print_current_character(&extract_id(&locator))
  }

  async fn show_character(&self, id: &str) -> Result<()> {
    let locator = build_locator(&self.config.api.url, id, EntityKind::Character);
    self.store.open_character(&locator).await;
    self.print_current_character(id)
  }

  fn print_current_character(&self, id: &str) -> Result<()> {
    let character = self
      .store
      .current_character()
      .ok_or_else(|| eyre!("Character {} could not be loaded", id))?;
    let films = self.store.current_character_films().unwrap_or_default();
    print_character(&character, &films);
    Ok(())
  }

  fn show_status(&self) {
    let state = self.store.snapshot();
    println!("films listed:        {}", state.films.len());
    println!("films cached:        {}", state.film_by_id.len());
    println!("characters cached:   {}", state.character_by_id.len());
    println!("film casts resolved: {}", state.film_characters.len());
    println!("filmographies:       {}", state.character_films.len());
    println!(
      "selected film:       {}",
      or_none(&self.store.selected_film_id())
    );
    println!(
      "selected character:  {}",
      or_none(&self.store.selected_character_id())
    );
    println!(
      "in flight:           {}",
      match (self.store.is_loading(), self.store.is_inter_loading()) {
        (false, false) => "nothing",
        (true, _) => "primary fetch",
        (false, true) => "references",
      }
    );
  }
}

fn or_none(value: &str) -> &str {
  if value.is_empty() {
    "-"
  } else {
    value
  }
}

fn print_film(film: &Film, characters: &[Character]) {
  println!("{} (Episode {})", film.title, film.episode_id);
  println!(
    "Directed by {}, produced by {}",
    film.director, film.producer
  );
  println!("Released {}", film.release_date);
  println!();
  println!("{}", film.opening_crawl.replace("\r\n", "\n"));
  println!();

  if characters.is_empty() && !film.characters.is_empty() {
    println!("Characters could not be loaded.");
    return;
  }

  println!("Characters:");
  for (index, character) in characters.iter().enumerate() {
    println!("{:>3}. {}", index + 1, character.name);
  }
}

fn print_character(character: &Character, films: &[Film]) {
  println!("{}", character.name);
  println!(
    "Born {}, {}, {} cm, {} kg",
    character.birth_year, character.gender, character.height, character.mass
  );
  println!(
    "Hair {}, skin {}, eyes {}",
    character.hair_color, character.skin_color, character.eye_color
  );

  if films.is_empty() && !character.films.is_empty() {
    println!("Films could not be loaded.");
    return;
  }

  println!("Films:");
  for film in films {
    println!("  Episode {:<2} {}", film.episode_id, film.title);
  }
}
