//! URL shortening service implementation.
//!
//! This crate provides the identifier generator and the service that
//! orchestrates generation and storage. Core types are re-exported from
//! `clip_core`.

pub mod generator;
pub mod service;

pub use clip_core::{
    BatchRequest, BatchResponse, Resolution, ShortenError, Shortened, UrlShortener,
};
pub use generator::{HexIdGenerator, IdGenerator};
pub use service::ShortenerService;
