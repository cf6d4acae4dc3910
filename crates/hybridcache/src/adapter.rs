//! `UpstreamAdapter`: the capability the engine needs from whatever speaks
//! to the actual remote registry. Authentication, rate-limiting, and HTTP
//! details are entirely the adapter's concern; the engine only knows these
//! six operations.

use async_trait::async_trait;
use hybridcache_tiers::{CacheValue, EntryMeta, KeyCodec, OriginFetcher, ResourceKind, StoredEntry, TierError};
use std::sync::Arc;
use thiserror::Error;

/// Inbound capability the engine requires of the upstream source of truth.
#[async_trait]
pub trait UpstreamAdapter: Send + Sync {
    async fn get_component_source(&self, name: &str) -> Result<serde_json::Value, AdapterError>;
    async fn get_component_demo(&self, name: &str) -> Result<serde_json::Value, AdapterError>;
    async fn get_component_metadata(&self, name: &str) -> Result<serde_json::Value, AdapterError>;
    async fn get_block(&self, name: &str, include_components: bool) -> Result<serde_json::Value, AdapterError>;
    async fn build_directory_tree(&self, owner: &str, repo: &str, path: &str, branch: &str) -> Result<serde_json::Value, AdapterError>;
    async fn list_components(&self) -> Result<Vec<String>, AdapterError>;
}

/// Errors an [`UpstreamAdapter`] may raise; mirrors `TierError`'s terminal
/// vs. retryable split so the origin tier's recovery manager classifies
/// them the same way it would any other tier failure.
#[derive(Debug, Clone, Error)]
pub enum AdapterError {
    #[error("not found upstream")]
    NotFound,
    #[error("upstream rejected credentials")]
    Unauthorized,
    #[error("upstream forbade the request")]
    Forbidden,
    #[error("upstream call timed out")]
    Timeout,
    #[error("transient upstream failure: {0}")]
    TransientIo(String),
    #[error("{0}")]
    Other(String),
}

impl From<AdapterError> for TierError {
    fn from(err: AdapterError) -> Self {
        match err {
            AdapterError::NotFound => TierError::NotFound,
            AdapterError::Unauthorized => TierError::Unauthorized,
            AdapterError::Forbidden => TierError::Forbidden,
            AdapterError::Timeout => TierError::Timeout { tier: "origin".to_string(), elapsed_ms: 0 },
            AdapterError::TransientIo(message) => TierError::TransientIo { tier: "origin".to_string(), message },
            AdapterError::Other(message) => TierError::TransientIo { tier: "origin".to_string(), message },
        }
    }
}

/// Bridges the engine's richer [`UpstreamAdapter`] onto `hybridcache-tiers`'
/// narrow [`OriginFetcher`], dispatching on the fingerprint's resource kind.
pub struct AdapterOriginFetcher {
    adapter: Arc<dyn UpstreamAdapter>,
}

impl AdapterOriginFetcher {
    pub fn new(adapter: Arc<dyn UpstreamAdapter>) -> Self {
        Self { adapter }
    }
}

/// Converts a raw JSON record from [`UpstreamAdapter`] into the tagged
/// [`CacheValue`] variant its resource kind owns. Fields the upstream
/// response doesn't carry come through as `None`/absent — whether that
/// disqualifies the record is [`hybridcache_tiers::PartialResponseHandler`]'s
/// call, not this conversion's.
fn value_from_kind(kind: ResourceKind, json: serde_json::Value) -> CacheValue {
    let obj = json.as_object();
    let str_field = |key: &str| obj.and_then(|o| o.get(key)).and_then(|v| v.as_str()).map(str::to_string);
    let str_list_field = |key: &str| {
        obj.and_then(|o| o.get(key))
            .and_then(|v| v.as_array())
            .map(|arr| arr.iter().filter_map(|item| item.as_str().map(str::to_string)).collect::<Vec<String>>())
    };
    let value_field = |key: &str| obj.and_then(|o| o.get(key)).cloned();

    match kind {
        ResourceKind::Component => CacheValue::Component {
            name: str_field("name"),
            code: str_field("code"),
            demo: str_field("demo"),
            metadata: value_field("metadata"),
            dependencies: str_list_field("dependencies"),
            partial: false,
            missing_fields: Vec::new(),
        },
        ResourceKind::ComponentDemo => CacheValue::ComponentDemo { name: str_field("name"), code: str_field("code") },
        ResourceKind::ComponentMetadata => CacheValue::ComponentMetadata {
            name: str_field("name"),
            kind: str_field("type").or_else(|| str_field("kind")),
            description: str_field("description"),
            tags: str_list_field("tags"),
            dependencies: str_list_field("dependencies"),
            partial: false,
            missing_fields: Vec::new(),
        },
        ResourceKind::Block => CacheValue::Block {
            name: str_field("name"),
            components: str_list_field("components"),
            description: str_field("description"),
            tags: str_list_field("tags"),
            code: str_field("code"),
            partial: false,
            missing_fields: Vec::new(),
        },
        // Neither a directory listing nor a component-name list has a
        // fixed, judgeable field shape; both pass through as opaque JSON.
        ResourceKind::Directory | ResourceKind::List => CacheValue::Directory(json),
    }
}

fn record_entry(kind: ResourceKind, value: serde_json::Value) -> StoredEntry {
    let value = value_from_kind(kind, value);
    let size = value.size_bytes();
    StoredEntry { value, meta: EntryMeta::new(size, 0, "origin") }
}

#[async_trait]
impl OriginFetcher for AdapterOriginFetcher {
    async fn fetch(&self, key: &str) -> Result<StoredEntry, TierError> {
        let parsed = KeyCodec::parse(key)?;

        let value = match parsed.kind {
            ResourceKind::Component => self.adapter.get_component_source(&parsed.name).await?,
            ResourceKind::ComponentDemo => self.adapter.get_component_demo(&parsed.name).await?,
            ResourceKind::ComponentMetadata => self.adapter.get_component_metadata(&parsed.name).await?,
            ResourceKind::Block => {
                let include_components = parsed.variant.iter().any(|v| v == "with-components");
                self.adapter.get_block(&parsed.name, include_components).await?
            }
            ResourceKind::Directory => {
                let path = parsed.variant.first().map(String::as_str).unwrap_or("");
                let branch = parsed.variant.get(1).map(String::as_str).unwrap_or("main");
                self.adapter.build_directory_tree(&parsed.framework, &parsed.name, path, branch).await?
            }
            ResourceKind::List => {
                let names = self.adapter.list_components().await?;
                serde_json::json!(names)
            }
        };

        Ok(record_entry(parsed.kind, value))
    }

    async fn fetch_keys(&self, pattern: &str) -> Result<Vec<String>, TierError> {
        let _ = pattern;
        let names = self.adapter.list_components().await?;
        Ok(names.into_iter().map(|name| format!("component:*:{name}")).collect())
    }
}
