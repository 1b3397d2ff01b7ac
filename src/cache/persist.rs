//! Wiring between the store and slot storage.

use std::sync::Arc;
use tracing::{info, warn};

use super::codec;
use super::state::CacheState;
use super::storage::SlotStorage;
use crate::catalog::CatalogGateway;
use crate::store::{CatalogStore, Subscription};

/// Persist the store's state to `slot` now and after every mutation.
///
/// Persistence stops when the returned subscription is dropped.
pub fn attach<G>(
  store: &CatalogStore<G>,
  storage: Arc<dyn SlotStorage>,
  slot: String,
) -> Subscription
where
  G: CatalogGateway + 'static,
{
  let persist = move |state: &CacheState| {
    let result = codec::encode(state).and_then(|text| storage.save(&slot, &text));
    if let Err(e) = result {
      warn!(slot = %slot, error = %e, "failed to persist cache snapshot");
    }
  };

  store.read(|state| persist(state));
  store.subscribe(persist)
}

/// Load the state persisted in `slot`.
///
/// Falls back to the default state when the slot is missing or unreadable.
pub fn rehydrate(storage: &dyn SlotStorage, slot: &str) -> CacheState {
  let stored = match storage.load(slot) {
    Ok(stored) => stored,
    Err(e) => {
      warn!(slot, error = %e, "failed to read cache snapshot");
      None
    }
  };

  if let Some(stored) = &stored {
    info!(slot, saved_at = %stored.saved_at, "rehydrating cache snapshot");
  }

  let mut state = codec::decode(stored.as_ref().map(|s| s.value.as_str()));
  state.settle();
  state
}
