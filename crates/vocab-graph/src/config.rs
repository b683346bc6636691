//! Engine configuration, loaded from an optional TOML file.
//!
//! ```toml
//! vocab_base_url = "https://annotations.example.org/annotation/api/vocabs"
//! request_timeout_secs = 10
//! default_vocabularies = ["schema", "webapi"]
//!
//! [store]
//! format_order = ["json-ld", "turtle"]
//!
//! [[store.sparql_prefixes]]
//! prefix = "schema"
//! namespace = "http://schema.org/"
//! ```

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::store::StoreOptions;

pub const DEFAULT_VOCAB_BASE_URL: &str = "http://localhost:8080/annotation/api/vocabs";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Base URL default vocabularies are fetched from (`<base>/<name>`).
    pub vocab_base_url: String,
    pub request_timeout_secs: u64,
    /// Default vocabularies loaded by the `defaults` command when none are named.
    pub default_vocabularies: Vec<String>,
    pub store: StoreOptions,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            vocab_base_url: DEFAULT_VOCAB_BASE_URL.to_string(),
            request_timeout_secs: 30,
            default_vocabularies: vec!["schema".to_string()],
            store: StoreOptions::default(),
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path)?;
        Self::from_toml(&text)
    }

    pub fn from_toml(text: &str) -> Result<Self, ConfigError> {
        let config: EngineConfig = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Load `path` when given, defaults otherwise.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        path.map_or_else(|| Ok(Self::default()), Self::load)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.vocab_base_url.trim().is_empty() {
            return Err(ConfigError::Invalid("vocab_base_url is empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid(
                "request_timeout_secs must be positive".into(),
            ));
        }
        if self.store.format_order.is_empty() {
            return Err(ConfigError::Invalid("store.format_order is empty".into()));
        }
        if let Some(p) = self.store.sparql_prefixes.iter().find(|p| p.prefix.is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "sparql prefix for <{}> has no name",
                p.namespace
            )));
        }
        Ok(())
    }
}
