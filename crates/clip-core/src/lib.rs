//! Core types and traits for the clip URL shortener.
//!
//! This crate defines the record model, the storage capability trait
//! implemented by the backends in `clip-storage`, and the service trait
//! the shortener exposes to outer layers.

pub mod error;
pub mod record;
pub mod shortener;
pub mod store;

pub use error::{ShortenError, StorageError};
pub use record::{OwnedUrl, UrlRecord};
pub use shortener::{BatchRequest, BatchResponse, Resolution, Shortened, UrlShortener};
pub use store::{Lookup, SaveOutcome, Store};
