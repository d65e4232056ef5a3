use crate::generator::IdGenerator;
use async_trait::async_trait;
use clip_core::{
    BatchRequest, BatchResponse, Lookup, OwnedUrl, Resolution, SaveOutcome, ShortenError,
    Shortened, Store, UrlRecord, UrlShortener,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// A concrete implementation of the [`UrlShortener`] trait.
///
/// Wraps a [`Store`] and an [`IdGenerator`]: the generator proposes an
/// identifier, the store arbitrates uniqueness of the original URL. On a
/// conflict the stored short URL wins and the freshly generated
/// identifier is discarded unused.
#[derive(Debug, Clone)]
pub struct ShortenerService<S, G> {
    store: Arc<S>,
    generator: Arc<G>,
}

impl<S: Store, G: IdGenerator> ShortenerService<S, G> {
    /// Creates a new service over the given store and generator.
    pub fn new(store: S, generator: G) -> Self {
        Self {
            store: Arc::new(store),
            generator: Arc::new(generator),
        }
    }
}

/// Composes a short URL from the base address and an identifier.
fn compose_short_url(base_addr: &str, id: &str) -> String {
    format!("{}/{}", base_addr.trim_end_matches('/'), id)
}

#[async_trait]
impl<S: Store, G: IdGenerator> UrlShortener for ShortenerService<S, G> {
    async fn shorten(
        &self,
        original_url: &str,
        base_addr: &str,
        owner_id: &str,
    ) -> Result<Shortened, ShortenError> {
        if original_url.is_empty() {
            return Err(ShortenError::EmptyUrl);
        }

        let generated_id = self.generator.generate();
        let short_url = compose_short_url(base_addr, &generated_id);

        let outcome = self
            .store
            .save(UrlRecord {
                original_url: original_url.to_string(),
                short_url: short_url.clone(),
                generated_id,
                owner_id: owner_id.to_string(),
            })
            .await?;

        match outcome {
            SaveOutcome::Created => {
                debug!(%short_url, "stored new short url");
                Ok(Shortened {
                    short_url,
                    conflict: false,
                })
            }
            SaveOutcome::Conflict { existing_short_url } => {
                if existing_short_url.is_empty() {
                    warn!(%original_url, "conflicting record has an empty short url");
                }
                Ok(Shortened {
                    short_url: existing_short_url,
                    conflict: true,
                })
            }
        }
    }

    async fn shorten_batch(
        &self,
        requests: Vec<BatchRequest>,
        base_addr: &str,
        owner_id: &str,
    ) -> Result<Vec<BatchResponse>, ShortenError> {
        if requests.is_empty() {
            info!("batch request is empty");
            return Ok(Vec::new());
        }

        // Validate up front; a bad entry must not leave a partial batch.
        if requests.iter().any(|req| req.original_url.is_empty()) {
            return Err(ShortenError::EmptyUrl);
        }

        // Batch rows are keyed by correlation id, which doubles as the
        // generated identifier of the stored record.
        let mut records = Vec::with_capacity(requests.len());
        let mut responses = Vec::with_capacity(requests.len());
        for request in requests {
            let short_url = compose_short_url(base_addr, &request.correlation_id);
            records.push(UrlRecord {
                original_url: request.original_url,
                short_url: short_url.clone(),
                generated_id: request.correlation_id.clone(),
                owner_id: owner_id.to_string(),
            });
            responses.push(BatchResponse {
                correlation_id: request.correlation_id,
                short_url,
            });
        }

        self.store.save_batch(records).await?;
        debug!(count = responses.len(), "stored url batch");

        Ok(responses)
    }

    async fn resolve(&self, id: &str) -> Result<Resolution, ShortenError> {
        let resolution = match self.store.get(id).await? {
            Lookup::Active(original_url) => Resolution::Active(original_url),
            Lookup::Deleted => Resolution::Gone,
            Lookup::Missing => Resolution::NotFound,
        };

        Ok(resolution)
    }

    async fn list_owned(&self, owner_id: &str) -> Result<Vec<OwnedUrl>, ShortenError> {
        Ok(self.store.get_urls(owner_id).await?)
    }

    async fn delete(&self, owner_id: &str, ids: Vec<String>) -> Result<(), ShortenError> {
        self.store.delete_urls(owner_id, &ids).await?;
        debug!(count = ids.len(), "marked urls deleted");

        Ok(())
    }

    async fn health_check(&self, timeout: Duration) -> bool {
        matches!(
            tokio::time::timeout(timeout, self.store.ping()).await,
            Ok(Ok(()))
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generator::HexIdGenerator;
    use clip_storage::InMemoryStore;

    const BASE: &str = "http://sh.rt";

    fn test_service() -> ShortenerService<InMemoryStore, HexIdGenerator> {
        ShortenerService::new(InMemoryStore::new(), HexIdGenerator::new())
    }

    fn batch(entries: &[(&str, &str)]) -> Vec<BatchRequest> {
        entries
            .iter()
            .map(|(id, url)| BatchRequest {
                correlation_id: id.to_string(),
                original_url: url.to_string(),
            })
            .collect()
    }

    #[tokio::test]
    async fn shorten_composes_short_url() {
        let service = test_service();

        let shortened = service
            .shorten("https://example.com/a", BASE, "")
            .await
            .unwrap();

        assert!(!shortened.conflict);
        let id = shortened.short_url.strip_prefix("http://sh.rt/").unwrap();
        assert_eq!(id.len(), 8);
        assert!(id.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[tokio::test]
    async fn repeated_shorten_is_idempotent() {
        let service = test_service();

        let first = service
            .shorten("https://example.com/a", BASE, "")
            .await
            .unwrap();
        let second = service
            .shorten("https://example.com/a", BASE, "")
            .await
            .unwrap();

        assert!(!first.conflict);
        assert!(second.conflict);
        assert_eq!(first.short_url, second.short_url);
    }

    #[tokio::test]
    async fn distinct_urls_resolve_independently() {
        let service = test_service();

        let a = service.shorten("http://a", BASE, "").await.unwrap();
        let b = service.shorten("http://b", BASE, "").await.unwrap();
        assert_ne!(a.short_url, b.short_url);

        let id_a = a.short_url.rsplit('/').next().unwrap();
        let id_b = b.short_url.rsplit('/').next().unwrap();

        assert_eq!(
            service.resolve(id_a).await.unwrap(),
            Resolution::Active("http://a".to_string())
        );
        assert_eq!(
            service.resolve(id_b).await.unwrap(),
            Resolution::Active("http://b".to_string())
        );
    }

    #[tokio::test]
    async fn empty_url_is_rejected() {
        let service = test_service();

        let err = service.shorten("", BASE, "").await.unwrap_err();
        assert!(matches!(err, ShortenError::EmptyUrl));
    }

    #[tokio::test]
    async fn resolve_unknown_id() {
        let service = test_service();

        assert_eq!(
            service.resolve("unknown").await.unwrap(),
            Resolution::NotFound
        );
    }

    #[tokio::test]
    async fn trailing_slash_in_base_addr() {
        let service = test_service();

        let shortened = service
            .shorten("http://a", "http://sh.rt/", "")
            .await
            .unwrap();
        assert!(!shortened.short_url.contains("//sh.rt//"));
        assert!(shortened.short_url.starts_with("http://sh.rt/"));
    }

    #[tokio::test]
    async fn delete_marks_gone_and_is_owner_scoped() {
        let service = test_service();

        let shortened = service.shorten("http://a", BASE, "u1").await.unwrap();
        let id = shortened
            .short_url
            .rsplit('/')
            .next()
            .unwrap()
            .to_string();

        // A different owner deleting the same id has no effect.
        service.delete("u2", vec![id.clone()]).await.unwrap();
        assert_eq!(
            service.resolve(&id).await.unwrap(),
            Resolution::Active("http://a".to_string())
        );

        service.delete("u1", vec![id.clone()]).await.unwrap();
        assert_eq!(service.resolve(&id).await.unwrap(), Resolution::Gone);
    }

    #[tokio::test]
    async fn batch_maps_correlation_ids() {
        let service = test_service();

        let responses = service
            .shorten_batch(batch(&[("1", "http://a"), ("2", "http://b")]), BASE, "u1")
            .await
            .unwrap();

        assert_eq!(responses.len(), 2);
        assert_eq!(responses[0].correlation_id, "1");
        assert_eq!(responses[0].short_url, "http://sh.rt/1");
        assert_eq!(responses[1].correlation_id, "2");
        assert_eq!(responses[1].short_url, "http://sh.rt/2");

        let mut owned = service.list_owned("u1").await.unwrap();
        owned.sort_by(|a, b| a.original_url.cmp(&b.original_url));
        assert_eq!(owned.len(), 2);
        assert_eq!(owned[0].original_url, "http://a");
        assert_eq!(owned[1].original_url, "http://b");
    }

    #[tokio::test]
    async fn batch_with_invalid_entry_stores_nothing() {
        let service = test_service();

        let err = service
            .shorten_batch(batch(&[("1", "http://a"), ("2", "")]), BASE, "u1")
            .await
            .unwrap_err();
        assert!(matches!(err, ShortenError::EmptyUrl));

        assert_eq!(service.resolve("1").await.unwrap(), Resolution::NotFound);
        assert_eq!(service.resolve("2").await.unwrap(), Resolution::NotFound);
        assert!(service.list_owned("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn batch_conflicting_with_stored_url_stores_nothing() {
        let service = test_service();

        service.shorten("http://a", BASE, "").await.unwrap();

        let result = service
            .shorten_batch(batch(&[("1", "http://b"), ("2", "http://a")]), BASE, "u1")
            .await;
        assert!(result.is_err());

        assert_eq!(service.resolve("1").await.unwrap(), Resolution::NotFound);
        assert!(service.list_owned("u1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_batch_returns_empty() {
        let service = test_service();

        let responses = service.shorten_batch(Vec::new(), BASE, "u1").await.unwrap();
        assert!(responses.is_empty());
    }

    #[tokio::test]
    async fn list_owned_empty_for_unknown_owner() {
        let service = test_service();

        assert!(service.list_owned("nobody").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn health_check_reports_live_store() {
        let service = test_service();

        assert!(service.health_check(Duration::from_secs(1)).await);
    }
}
