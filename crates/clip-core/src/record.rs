use serde::{Deserialize, Serialize};

/// A stored URL mapping.
///
/// `generated_id` is the lookup key the redirect path resolves;
/// `original_url` is collectively unique across all owners.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UrlRecord {
    /// The original URL that was shortened.
    pub original_url: String,
    /// The full short URL handed back to the caller.
    pub short_url: String,
    /// The generated identifier, used as the primary lookup key.
    pub generated_id: String,
    /// The owning user; empty means anonymous.
    #[serde(default)]
    pub owner_id: String,
}

/// A URL pair as listed back to its owner.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnedUrl {
    pub original_url: String,
    pub short_url: String,
}
