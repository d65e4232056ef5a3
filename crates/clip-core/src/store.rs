use crate::error::Result;
use crate::record::{OwnedUrl, UrlRecord};
use async_trait::async_trait;

/// Outcome of a [`Store::save`] call.
#[derive(Debug, Clone, PartialEq)]
pub enum SaveOutcome {
    /// The record was inserted as a new row.
    Created,
    /// The original URL was already stored; the record that won carries
    /// this short URL. No new row was created.
    Conflict { existing_short_url: String },
}

impl SaveOutcome {
    pub fn is_conflict(&self) -> bool {
        matches!(self, SaveOutcome::Conflict { .. })
    }
}

/// Result of a [`Store::get`] lookup by generated identifier.
///
/// `Deleted` is distinct from `Missing`: the identifier existed once and
/// was soft-deleted by its owner.
#[derive(Debug, Clone, PartialEq)]
pub enum Lookup {
    Active(String),
    Deleted,
    Missing,
}

/// The storage capability set.
///
/// Two implementations exist in `clip-storage`: a synchronized in-memory
/// map and a PostgreSQL table. Both enforce the same contract: collective
/// uniqueness of `original_url` under concurrent writers, all-or-nothing
/// batch ingestion, and owner-scoped listing and soft deletion.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Inserts a new record, or reports the surviving record's short URL
    /// when the original URL is already stored. Racing saves of the same
    /// URL resolve to exactly one `Created`.
    async fn save(&self, record: UrlRecord) -> Result<SaveOutcome>;

    /// Exact-match lookup by generated identifier.
    async fn get(&self, id: &str) -> Result<Lookup>;

    /// Inserts a set of records as a single all-or-nothing unit. On any
    /// failure none of the batch's records become visible.
    async fn save_batch(&self, records: Vec<UrlRecord>) -> Result<()>;

    /// Returns the active records owned by the given user; an empty vec
    /// when the user owns nothing.
    async fn get_urls(&self, owner_id: &str) -> Result<Vec<OwnedUrl>>;

    /// Soft-deletes the given identifiers, scoped to the owner.
    /// Identifiers owned by someone else are silently ignored.
    async fn delete_urls(&self, owner_id: &str, ids: &[String]) -> Result<()>;

    /// Liveness probe of the backing store.
    async fn ping(&self) -> Result<()>;
}
