//! Storage backends for the clip URL shortener.
//!
//! Both backends implement the [`Store`] contract from `clip-core`.

pub mod memory;
pub mod postgres;

pub use clip_core::{Lookup, SaveOutcome, Store, StorageError, UrlRecord};
pub use memory::InMemoryStore;
pub use postgres::PostgresStore;
