//! Remote film catalog: domain types, locators and the HTTP gateway.

pub mod api_types;
pub mod client;
pub mod locator;
pub mod types;

pub use client::{CatalogClient, CatalogGateway};
pub use locator::{build_locator, extract_id, EntityKind};
pub use types::{Character, Film};
