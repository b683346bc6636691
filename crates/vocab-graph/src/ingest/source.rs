//! Retrieval of default vocabularies and the process-wide raw document cache.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use parking_lot::RwLock;
use serde_json::Value as JsonValue;
use tracing::{debug, instrument};

use crate::error::FetchError;
use crate::model::ontology::reserved;

/// Default vocabularies that can be requested by name, with display labels.
pub const DEFAULT_VOCABULARIES: [(&str, &str); 5] = [
    ("schema", "Schema.org"),
    ("schema-pending", "Schema.org Pending"),
    ("schema-bib", "Schema.org Bibliographic"),
    ("schema-health-lifesci", "Schema.org Health and Lifesciences"),
    ("schema-auto", "Schema.org Auto"),
];

/// Display label of a default vocabulary.
pub fn default_vocabulary_label(name: &str) -> Option<&'static str> {
    DEFAULT_VOCABULARIES
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, label)| *label)
}

/// Store vocabulary a fetched default vocabulary is merged into.
pub fn target_vocabulary(name: &str) -> &'static str {
    if name.contains(reserved::SCHEMA_VOCAB) {
        reserved::SCHEMA_VOCAB
    } else {
        reserved::WEBAPI_VOCAB
    }
}

/// Source of raw default-vocabulary documents.
#[async_trait]
pub trait VocabSource: Send + Sync {
    async fn fetch(&self, name: &str) -> Result<JsonValue, FetchError>;
}

/// Fetches `<base_url>/<name>` over HTTP and decodes the body as JSON.
#[derive(Debug, Clone)]
pub struct HttpVocabSource {
    client: reqwest::Client,
    base_url: String,
}

impl HttpVocabSource {
    pub fn new(base_url: &str) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build with a request timeout.
    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn url_for(&self, name: &str) -> String {
        format!("{}/{}", self.base_url, name)
    }
}

#[async_trait]
impl VocabSource for HttpVocabSource {
    #[instrument(skip(self), fields(url = %self.url_for(name)))]
    async fn fetch(&self, name: &str) -> Result<JsonValue, FetchError> {
        let http_err = |source: reqwest::Error| FetchError::Http {
            name: name.to_string(),
            source,
        };
        let response = self.client.get(self.url_for(name)).send().await.map_err(http_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status {
                name: name.to_string(),
                status: status.as_u16(),
            });
        }
        response
            .json::<JsonValue>()
            .await
            .map_err(|e| FetchError::Decode {
                name: name.to_string(),
                message: e.to_string(),
            })
    }
}

static RAW_CACHE: Lazy<RwLock<HashMap<String, JsonValue>>> =
    Lazy::new(|| RwLock::new(HashMap::new()));

/// Fetch a default vocabulary through the process-wide cache. A cache miss
/// fetches from `source`, prepares the document and caches it for the rest of
/// the process lifetime.
pub async fn fetch_default_vocabulary(
    source: &dyn VocabSource,
    name: &str,
) -> Result<JsonValue, FetchError> {
    let cached = RAW_CACHE.read().get(name).cloned();
    if let Some(cached) = cached {
        debug!(vocab = name, "default vocabulary served from cache");
        return Ok(cached);
    }
    let raw = source.fetch(name).await?;
    let prepared = prepare_default_vocabulary(name, raw);
    RAW_CACHE
        .write()
        .entry(name.to_string())
        .or_insert_with(|| prepared.clone());
    Ok(prepared)
}

/// Whether a default vocabulary is already cached in this process.
pub fn is_cached(name: &str) -> bool {
    RAW_CACHE.read().contains_key(name)
}

/// `webapi` keeps only its own terms and blank nodes from `@graph`; other
/// vocabularies drop their top-level `@id`, which would otherwise turn the
/// document into a named graph.
pub fn prepare_default_vocabulary(name: &str, mut raw: JsonValue) -> JsonValue {
    let Some(map) = raw.as_object_mut() else {
        return raw;
    };
    if name == reserved::WEBAPI_VOCAB {
        if let Some(JsonValue::Array(graph)) = map.get_mut("@graph") {
            graph.retain(|n| {
                n.get("@id")
                    .and_then(JsonValue::as_str)
                    .is_some_and(|id| id.starts_with("webapi") || id.starts_with("_:"))
            });
        }
    } else {
        map.remove("@id");
    }
    raw
}
