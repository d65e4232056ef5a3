use async_trait::async_trait;
use clip_core::error::Result;
use clip_core::{Lookup, OwnedUrl, SaveOutcome, Store, StorageError, UrlRecord};
use jiff::Timestamp;
use parking_lot::RwLock;
use std::collections::{HashMap, HashSet};

/// In-memory storage entry for a URL mapping.
#[derive(Debug, Clone)]
struct Entry {
    original_url: String,
    short_url: String,
    owner_id: String,
    deleted_at: Option<Timestamp>,
}

#[derive(Debug, Default)]
struct Indexes {
    by_id: HashMap<String, Entry>,
    id_by_original: HashMap<String, String>,
}

/// In-memory implementation of the [`Store`] contract.
///
/// A single `RwLock` guards both indexes so that a save is an atomic
/// check-and-insert across the id index and the original-URL index.
/// Racing saves of the same URL serialize on the write lock and resolve
/// to exactly one winner.
#[derive(Debug, Default)]
pub struct InMemoryStore {
    inner: RwLock<Indexes>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory store.
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn save(&self, record: UrlRecord) -> Result<SaveOutcome> {
        let mut inner = self.inner.write();

        // The original-URL index arbitrates the uniqueness race. Soft-deleted
        // records still hold their URL, matching the relational constraint.
        if let Some(id) = inner.id_by_original.get(&record.original_url) {
            let existing = inner.by_id.get(id).ok_or_else(|| {
                StorageError::InvalidData(format!("dangling original-url index entry for '{}'", id))
            })?;
            return Ok(SaveOutcome::Conflict {
                existing_short_url: existing.short_url.clone(),
            });
        }

        inner
            .id_by_original
            .insert(record.original_url.clone(), record.generated_id.clone());
        inner.by_id.insert(
            record.generated_id,
            Entry {
                original_url: record.original_url,
                short_url: record.short_url,
                owner_id: record.owner_id,
                deleted_at: None,
            },
        );

        Ok(SaveOutcome::Created)
    }

    async fn get(&self, id: &str) -> Result<Lookup> {
        let inner = self.inner.read();

        let Some(entry) = inner.by_id.get(id) else {
            return Ok(Lookup::Missing);
        };

        if entry.deleted_at.is_some() {
            return Ok(Lookup::Deleted);
        }

        Ok(Lookup::Active(entry.original_url.clone()))
    }

    async fn save_batch(&self, records: Vec<UrlRecord>) -> Result<()> {
        let mut inner = self.inner.write();

        // Validate the whole batch before touching either index, so a
        // failure leaves nothing behind.
        let mut seen = HashSet::new();
        for record in &records {
            if inner.id_by_original.contains_key(&record.original_url)
                || !seen.insert(record.original_url.as_str())
            {
                return Err(StorageError::Query(format!(
                    "duplicate original_url in batch: '{}'",
                    record.original_url
                )));
            }
        }

        for record in records {
            inner
                .id_by_original
                .insert(record.original_url.clone(), record.generated_id.clone());
            inner.by_id.insert(
                record.generated_id,
                Entry {
                    original_url: record.original_url,
                    short_url: record.short_url,
                    owner_id: record.owner_id,
                    deleted_at: None,
                },
            );
        }

        Ok(())
    }

    async fn get_urls(&self, owner_id: &str) -> Result<Vec<OwnedUrl>> {
        let inner = self.inner.read();

        let urls = inner
            .by_id
            .values()
            .filter(|entry| entry.owner_id == owner_id && entry.deleted_at.is_none())
            .map(|entry| OwnedUrl {
                original_url: entry.original_url.clone(),
                short_url: entry.short_url.clone(),
            })
            .collect();

        Ok(urls)
    }

    async fn delete_urls(&self, owner_id: &str, ids: &[String]) -> Result<()> {
        let now = Timestamp::now();
        let mut inner = self.inner.write();

        for id in ids {
            if let Some(entry) = inner.by_id.get_mut(id) {
                if entry.owner_id == owner_id && entry.deleted_at.is_none() {
                    entry.deleted_at = Some(now);
                }
            }
        }

        Ok(())
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
