//! Normalized catalog store.
//!
//! The store owns the `CacheState`, exposes derived views of the current
//! selection and runs the cascading load protocol: fetch one entity, commit
//! it, then fetch every entity it references one at a time and commit the
//! collected list in a single step.
//!
//! Every mutation goes through [`CatalogStore::patch`], which notifies
//! subscribers synchronously with the new state.

use futures::future::BoxFuture;
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError, Weak};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::cache::{CacheState, Entity};
use crate::catalog::{extract_id, CatalogGateway, Character, Film};

type Listener = Box<dyn Fn(&CacheState) + Send + Sync>;

#[derive(Default)]
struct Listeners {
  next_id: u64,
  entries: Vec<(u64, Listener)>,
}

/// Handle for a state-change listener. Dropping it unsubscribes.
#[must_use = "dropping a Subscription unsubscribes the listener"]
pub struct Subscription {
  id: u64,
  listeners: Weak<Mutex<Listeners>>,
}

impl Drop for Subscription {
  fn drop(&mut self) {
    if let Some(listeners) = self.listeners.upgrade() {
      lock(&listeners).entries.retain(|(id, _)| *id != self.id);
    }
  }
}

struct Inner<G> {
  gateway: G,
  state: Mutex<CacheState>,
  listeners: Arc<Mutex<Listeners>>,
}

/// Single authoritative cache of catalog data.
///
/// Cloning is cheap and yields another handle to the same store.
pub struct CatalogStore<G> {
  inner: Arc<Inner<G>>,
}

impl<G> Clone for CatalogStore<G> {
  fn clone(&self) -> Self {
    Self {
      inner: Arc::clone(&self.inner),
    }
  }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
  // A panicking listener poisons the lock; the state itself stays usable
  mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

impl<G: CatalogGateway + 'static> CatalogStore<G> {
  /// Create a store over a gateway, starting from `state`.
  pub fn new(gateway: G, state: CacheState) -> Self {
    Self {
      inner: Arc::new(Inner {
        gateway,
        state: Mutex::new(state),
        listeners: Arc::new(Mutex::new(Listeners::default())),
      }),
    }
  }

  /// Register a listener called after every mutation.
  ///
  /// Listeners run while the state is locked and must not call back into
  /// the store.
  pub fn subscribe<F>(&self, listener: F) -> Subscription
  where
    F: Fn(&CacheState) + Send + Sync + 'static,
  {
    let mut listeners = lock(&self.inner.listeners);
    let id = listeners.next_id;
    listeners.next_id += 1;
    listeners.entries.push((id, Box::new(listener)));

    Subscription {
      id,
      listeners: Arc::downgrade(&self.inner.listeners),
    }
  }

  /// Apply a mutation and notify subscribers.
  fn patch<R>(&self, mutate: impl FnOnce(&mut CacheState) -> R) -> R {
    let mut state = lock(&self.inner.state);
    let result = mutate(&mut *state);

    let listeners = lock(&self.inner.listeners);
    for (_, listener) in &listeners.entries {
      listener(&*state);
    }

    result
  }

  /// Run a read-only projection of the current state.
  pub fn read<R>(&self, project: impl FnOnce(&CacheState) -> R) -> R {
    project(&*lock(&self.inner.state))
  }

  pub fn snapshot(&self) -> CacheState {
    self.read(CacheState::clone)
  }

  // ==========================================================================
  // Derived views
  // ==========================================================================

  pub fn films(&self) -> Vec<Film> {
    self.read(|state| state.films.clone())
  }

  pub fn is_loading(&self) -> bool {
    self.read(|state| state.is_loading)
  }

  pub fn is_inter_loading(&self) -> bool {
    self.read(|state| state.is_inter_loading)
  }

  pub fn selected_film_id(&self) -> String {
    self.read(|state| state.selected_film_id.clone())
  }

  pub fn selected_character_id(&self) -> String {
    self.read(|state| state.selected_character_id.clone())
  }

  pub fn current_film(&self) -> Option<Film> {
    self.read(|state| state.current_film().cloned())
  }

  pub fn current_film_characters(&self) -> Option<Vec<Character>> {
    self.read(|state| state.current_film_characters().map(<[Character]>::to_vec))
  }

  pub fn current_character(&self) -> Option<Character> {
    self.read(|state| state.current_character().cloned())
  }

  pub fn current_character_films(&self) -> Option<Vec<Film>> {
    self.read(|state| state.current_character_films().map(<[Film]>::to_vec))
  }

  // ==========================================================================
  // Selection
  // ==========================================================================

  pub fn select_film(&self, locator: &str) {
    self.patch(|state| state.selected_film_id = locator.to_string());
  }

  pub fn select_character(&self, locator: &str) {
    self.patch(|state| state.selected_character_id = locator.to_string());
  }

  /// Make `character` the current character and resolve its films in the
  /// background.
  ///
  /// The character is only inserted when the slot of the *current*
  /// selection is empty, so an entry resolved through another path is never
  /// clobbered. The resolved films are stored under the character's locator
  /// only if that key is still absent when the cascade completes.
  pub fn set_current_character(&self, character: Character) -> JoinHandle<()> {
    self.patch(|state| {
      if !state
        .character_by_id
        .contains_key(&state.selected_character_id)
      {
        state
          .character_by_id
          .insert(character.url.clone(), character.clone());
      }
      state.selected_character_id = character.url.clone();
    });

    let store = self.clone();
    tokio::spawn(async move {
      let films: Vec<Film> = store.resolve_all(character.references()).await;

      store.patch(|state| match state.character_films.entry(character.url) {
        Entry::Vacant(slot) => {
          slot.insert(films);
        }
        Entry::Occupied(slot) => {
          debug!(locator = %slot.key(), "films already resolved, keeping existing");
        }
      });
    })
  }

  // ==========================================================================
  // Loading
  // ==========================================================================

  /// Load the full film list.
  pub async fn load_films(&self) {
    self.patch(|state| state.is_loading = true);

    let films = self.inner.gateway.list_films().await;
    info!(count = films.len(), "film list loaded");

    self.patch(|state| {
      state.films = films;
      state.is_loading = false;
    });
  }

  /// Load the selected film, then every character it references.
  pub async fn load_film_by_id(&self) {
    self.load_by_id::<Film>().await;
  }

  /// Load the selected character, then every film it references.
  pub async fn load_character_by_id(&self) {
    self.load_by_id::<Character>().await;
  }

  /// Load the film list unless it is already cached.
  pub async fn ensure_films(&self) {
    if self.read(|state| state.films.is_empty()) {
      self.load_films().await;
    }
  }

  /// Select a film and load it unless it is already cached.
  pub async fn open_film(&self, locator: &str) {
    self.open::<Film>(locator).await;
  }

  /// Select a character and load it unless it is already cached.
  pub async fn open_character(&self, locator: &str) {
    self.open::<Character>(locator).await;
  }

  async fn open<T: Resolve>(&self, locator: &str) {
    // A selection with the same id may be the canonical form of the
    // requested locator; keep it so the cached entry is found.
    let selected = self.read(|state| T::selection(state).to_string());
    if selected.is_empty() || extract_id(&selected) != extract_id(locator) {
      T::select(self, locator);
    }

    if self.read(|state| T::current(state).is_some()) {
      debug!(kind = %T::kind(), locator, "serving from cache");
    } else {
      T::load(self).await;
    }
  }

  async fn load_by_id<T: Resolve>(&self) {
    let requested = self.patch(|state| {
      state.is_loading = true;
      T::selected(state).clone()
    });

    let Some(entity) = T::fetch(&self.inner.gateway, &requested).await else {
      warn!(kind = %T::kind(), locator = %requested, "load failed");
      self.patch(|state| state.is_loading = false);
      return;
    };

    let locator = entity.locator().to_string();
    let references = entity.references().to_vec();

    self.patch(|state| {
      T::by_id(state).insert(locator.clone(), entity);
      *T::selected(state) = locator.clone();
      state.is_loading = false;
    });

    self.patch(|state| state.is_inter_loading = true);

    let resolved: Vec<T::Other> = self.resolve_all(&references).await;
    info!(
      kind = %T::kind(),
      locator = %locator,
      resolved = resolved.len(),
      referenced = references.len(),
      "references resolved"
    );

    self.patch(|state| {
      T::resolved(state).insert(locator, resolved);
      state.is_inter_loading = false;
    });
  }

  /// Fetch every locator in order, one request at a time.
  ///
  /// Failed fetches are dropped; the order of the rest is preserved.
  async fn resolve_all<T: Resolve>(&self, locators: &[String]) -> Vec<T> {
    let mut resolved = Vec::with_capacity(locators.len());

    for locator in locators {
      match T::fetch(&self.inner.gateway, locator).await {
        Some(entity) => resolved.push(entity),
        None => {
          debug!(kind = %T::kind(), locator = %locator, "dropping unresolved reference")
        }
      }
    }

    resolved
  }
}

/// Binds an entity type to its store operations, its gateway call and its
/// slots in the state.
trait Resolve: Entity {
  /// Type of the entities this one references
  type Other: Resolve;

  fn select<G: CatalogGateway + 'static>(store: &CatalogStore<G>, locator: &str);

  fn load<G: CatalogGateway + 'static>(store: &CatalogStore<G>) -> BoxFuture<'_, ()>;

  fn fetch<'a, G: CatalogGateway>(
    gateway: &'a G,
    locator: &'a str,
  ) -> BoxFuture<'a, Option<Self>>;

  fn selection(state: &CacheState) -> &str;

  fn current(state: &CacheState) -> Option<&Self>;

  fn by_id(state: &mut CacheState) -> &mut HashMap<String, Self>;

  fn selected(state: &mut CacheState) -> &mut String;

  fn resolved(state: &mut CacheState) -> &mut HashMap<String, Vec<Self::Other>>;
}

impl Resolve for Film {
  type Other = Character;

  fn select<G: CatalogGateway + 'static>(store: &CatalogStore<G>, locator: &str) {
    store.select_film(locator);
  }

  fn load<G: CatalogGateway + 'static>(store: &CatalogStore<G>) -> BoxFuture<'_, ()> {
    Box::pin(store.load_film_by_id())
  }

  fn fetch<'a, G: CatalogGateway>(
    gateway: &'a G,
    locator: &'a str,
  ) -> BoxFuture<'a, Option<Self>> {
    gateway.fetch_film(locator)
  }

  fn selection(state: &CacheState) -> &str {
    &state.selected_film_id
  }

  fn current(state: &CacheState) -> Option<&Self> {
    state.current_film()
  }

  fn by_id(state: &mut CacheState) -> &mut HashMap<String, Self> {
    &mut state.film_by_id
  }

  fn selected(state: &mut CacheState) -> &mut String {
    &mut state.selected_film_id
  }

  fn resolved(state: &mut CacheState) -> &mut HashMap<String, Vec<Character>> {
    &mut state.film_characters
  }
}

impl Resolve for Character {
  type Other = Film;

  fn select<G: CatalogGateway + 'static>(store: &CatalogStore<G>, locator: &str) {
    store.select_character(locator);
  }

  fn load<G: CatalogGateway + 'static>(store: &CatalogStore<G>) -> BoxFuture<'_, ()> {
    Box::pin(store.load_character_by_id())
  }

  fn fetch<'a, G: CatalogGateway>(
    gateway: &'a G,
    locator: &'a str,
  ) -> BoxFuture<'a, Option<Self>> {
    gateway.fetch_character(locator)
  }

  fn selection(state: &CacheState) -> &str {
    &state.selected_character_id
  }

  fn current(state: &CacheState) -> Option<&Self> {
    state.current_character()
  }

  fn by_id(state: &mut CacheState) -> &mut HashMap<String, Self> {
    &mut state.character_by_id
  }

  fn selected(state: &mut CacheState) -> &mut String {
    &mut state.selected_character_id
  }

  fn resolved(state: &mut CacheState) -> &mut HashMap<String, Vec<Film>> {
    &mut state.character_films
  }
}
