//! Slot storage trait and SQLite implementation.
//!
//! A slot is a named text value, written whole and read whole.

use chrono::{DateTime, Utc};
use color_eyre::{eyre::eyre, Result};
use rusqlite::{params, Connection, OptionalExtension};
use sha2::{Digest, Sha256};
use std::path::Path;
use std::sync::Mutex;

/// A stored slot value.
#[derive(Debug, Clone)]
pub struct StoredSlot {
  pub value: String,
  /// When the value was last written
  pub saved_at: DateTime<Utc>,
}

/// Trait for durable slot storage backends.
pub trait SlotStorage: Send + Sync {
  /// Read a slot, `None` if it was never written.
  fn load(&self, slot: &str) -> Result<Option<StoredSlot>>;

  /// Replace the value of a slot.
  fn save(&self, slot: &str, value: &str) -> Result<()>;
}

/// Storage implementation that doesn't persist anything.
/// Used when persistence is disabled.
pub struct NoopStorage;

impl SlotStorage for NoopStorage {
  fn load(&self, _slot: &str) -> Result<Option<StoredSlot>> {
    Ok(None) // Always empty
  }

  fn save(&self, _slot: &str, _value: &str) -> Result<()> {
    Ok(()) // Discard
  }
}

/// SQLite-based slot storage implementation.
pub struct SqliteStorage {
  conn: Mutex<Connection>,
}

impl SqliteStorage {
  /// Open or create the database at the given path.
  pub fn open(path: &Path) -> Result<Self> {
    // Ensure parent directory exists
    if let Some(parent) = path.parent() {
      std::fs::create_dir_all(parent)
        .map_err(|e| eyre!("Failed to create cache directory: {}", e))?;
    }

    let conn = Connection::open(path)
      .map_err(|e| eyre!("Failed to open cache database at {}: {}", path.display(), e))?;

    Self::with_connection(conn)
  }

  /// Open a private in-memory database.
  #[cfg(test)]
  pub fn open_in_memory() -> Result<Self> {
    let conn = Connection::open_in_memory()
      .map_err(|e| eyre!("Failed to open in-memory cache database: {}", e))?;

    Self::with_connection(conn)
  }

  fn with_connection(conn: Connection) -> Result<Self> {
    let storage = Self {
      conn: Mutex::new(conn),
    };
    storage.run_migrations()?;

    Ok(storage)
  }

  /// Run database migrations for the slot table.
  fn run_migrations(&self) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute_batch(SLOT_SCHEMA)
      .map_err(|e| eyre!("Failed to run cache migrations: {}", e))?;

    Ok(())
  }
}

/// Schema for the slot table.
const SLOT_SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS state_slots (
    slot TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    saved_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;

impl SlotStorage for SqliteStorage {
  fn load(&self, slot: &str) -> Result<Option<StoredSlot>> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    let row: Option<(String, String)> = conn
      .query_row(
        "SELECT value, saved_at FROM state_slots WHERE slot = ?",
        params![slot],
        |row| Ok((row.get(0)?, row.get(1)?)),
      )
      .optional()
      .map_err(|e| eyre!("Failed to read slot {}: {}", slot, e))?;

    match row {
      Some((value, saved_at)) => Ok(Some(StoredSlot {
        value,
        saved_at: parse_datetime(&saved_at)?,
      })),
      None => Ok(None),
    }
  }

  fn save(&self, slot: &str, value: &str) -> Result<()> {
    let conn = self
      .conn
      .lock()
      .map_err(|e| eyre!("Lock poisoned: {}", e))?;

    conn
      .execute(
        "INSERT OR REPLACE INTO state_slots (slot, value, saved_at)
         VALUES (?, ?, datetime('now'))",
        params![slot, value],
      )
      .map_err(|e| eyre!("Failed to write slot {}: {}", slot, e))?;

    Ok(())
  }
}

/// Slot name scoped to one catalog base url.
///
/// Snapshots taken against different remotes never share a slot.
pub fn scoped_slot(slot: &str, base_url: &str) -> String {
  let mut hasher = Sha256::new();
  hasher.update(base_url.trim_end_matches('/').as_bytes());
  let digest = hex::encode(hasher.finalize());
  format!("{}:{}", slot, &digest[..16])
}

/// Parse a datetime string from SQLite format.
fn parse_datetime(s: &str) -> Result<DateTime<Utc>> {
  // SQLite stores as "YYYY-MM-DD HH:MM:SS"
  chrono::NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
    .map(|dt| dt.and_utc())
    .map_err(|e| eyre!("Failed to parse datetime '{}': {}", s, e))
}
