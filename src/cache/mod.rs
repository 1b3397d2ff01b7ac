//! Cache state, its snapshot encoding and durable storage.
//!
//! This module provides:
//! - `CacheState`, the normalized root of all cached catalog data
//! - A snapshot codec that stores map fields as `[key, value]` pair lists
//! - Named-slot storage backed by SQLite
//! - Persistence wiring that rewrites the snapshot after every store mutation

pub mod codec;
pub mod persist;
mod state;
pub mod storage;
mod traits;

pub use state::CacheState;
pub use storage::{NoopStorage, SlotStorage, SqliteStorage};
pub use traits::Entity;
