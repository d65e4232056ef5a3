use crate::error::ShortenError;
use crate::record::OwnedUrl;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Result of a single shorten call.
#[derive(Debug, Clone, PartialEq)]
pub struct Shortened {
    /// The short URL to hand back to the caller. On conflict this is the
    /// previously stored URL, not a freshly composed one.
    pub short_url: String,
    /// True when the original URL was already stored.
    pub conflict: bool,
}

/// One entry of a batch shorten request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchRequest {
    pub correlation_id: String,
    pub original_url: String,
}

/// One entry of a batch shorten response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchResponse {
    pub correlation_id: String,
    pub short_url: String,
}

/// Outcome of resolving a generated identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// The identifier maps to this original URL.
    Active(String),
    /// The identifier existed but was deleted by its owner.
    Gone,
    /// The identifier was never stored.
    NotFound,
}

/// The service boundary handed to outer layers (HTTP routing, auth).
#[async_trait]
pub trait UrlShortener: Send + Sync + 'static {
    /// Shortens a single URL. A repeated call for the same URL returns
    /// the stored short URL with `conflict = true`.
    async fn shorten(
        &self,
        original_url: &str,
        base_addr: &str,
        owner_id: &str,
    ) -> Result<Shortened, ShortenError>;

    /// Shortens a batch of URLs as one atomic unit. On failure no entry
    /// of the batch becomes resolvable.
    async fn shorten_batch(
        &self,
        requests: Vec<BatchRequest>,
        base_addr: &str,
        owner_id: &str,
    ) -> Result<Vec<BatchResponse>, ShortenError>;

    /// Resolves a generated identifier back to its original URL.
    async fn resolve(&self, id: &str) -> Result<Resolution, ShortenError>;

    /// Lists the active URLs owned by the given user.
    async fn list_owned(&self, owner_id: &str) -> Result<Vec<OwnedUrl>, ShortenError>;

    /// Soft-deletes the given identifiers for the given owner.
    async fn delete(&self, owner_id: &str, ids: Vec<String>) -> Result<(), ShortenError>;

    /// Pings the backing store within the given deadline.
    async fn health_check(&self, timeout: Duration) -> bool;
}
