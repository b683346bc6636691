//! The vocabulary store: named vocabularies, merging, and memoized queries.
//!
//! Query components live in their own modules as further `impl VocabStore`
//! blocks: [`hierarchy`], [`resolve`], [`restriction`] and [`sparql`].

pub mod hierarchy;
pub mod memo;
pub mod resolve;
pub mod restriction;
pub mod sparql;

use std::borrow::Cow;
use std::sync::Arc;

use futures::future::join_all;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument, warn};

use crate::error::{FetchError, IngestError};
use crate::ingest::loader::{self, Format, FormatAdapter, RawDocument};
use crate::ingest::source::{self, VocabSource};
use crate::model::ontology::{reserved, schema, sh};
use crate::model::{iri, Node};

use self::memo::{CacheStats, QueryMemo};
use self::resolve::IoKind;

/// Prefix declaration prepended to SPARQL target queries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SparqlPrefix {
    pub prefix: String,
    pub namespace: String,
}

/// Options controlling ingestion and query behavior.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreOptions {
    /// Formats tried, in order, when `add_vocabulary` gets no explicit format.
    pub format_order: Vec<Format>,
    /// Prefixes declared in front of every SPARQL target query.
    pub sparql_prefixes: Vec<SparqlPrefix>,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self {
            format_order: vec![Format::JsonLd, Format::Turtle],
            sparql_prefixes: vec![SparqlPrefix {
                prefix: schema::PREFIX.to_string(),
                namespace: schema::NS.to_string(),
            }],
        }
    }
}

/// A named collection of nodes, keyed by id in insertion order.
#[derive(Debug, Clone, Default)]
pub struct Vocabulary {
    nodes: IndexMap<String, Node>,
}

impl Vocabulary {
    pub fn get(&self, id: &str) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    fn merge(&mut self, node: Node) {
        match self.nodes.get_mut(&node.id) {
            Some(existing) => existing.merge(node),
            None => {
                self.nodes.insert(node.id.clone(), node);
            }
        }
    }
}

/// Holds named vocabularies and answers graph queries over all of them.
///
/// Mutations take `&mut self`, so a store has a single writer; queries take
/// `&self` and may run concurrently. Every mutation calls
/// [`invalidate`](Self::invalidate).
pub struct VocabStore {
    vocabs: IndexMap<String, Vocabulary>,
    current_defaults: Vec<String>,
    adapters: Vec<Arc<dyn FormatAdapter>>,
    options: StoreOptions,
    generation: u64,
    memo: QueryMemo,
}

impl Default for VocabStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

impl VocabStore {
    pub fn new(options: StoreOptions) -> Self {
        let adapters = options
            .format_order
            .iter()
            .map(|f| loader::adapter_for(*f))
            .collect();
        Self {
            vocabs: IndexMap::new(),
            current_defaults: Vec::new(),
            adapters,
            options,
            generation: 0,
            memo: QueryMemo::default(),
        }
    }

    /// Replace the format adapters tried during detection, in order.
    pub fn with_adapters(mut self, adapters: Vec<Arc<dyn FormatAdapter>>) -> Self {
        self.adapters = adapters;
        self
    }

    pub fn options(&self) -> &StoreOptions {
        &self.options
    }

    // -----------------------------------------------------------------------
    // Mutation
    // -----------------------------------------------------------------------

    /// Parse `raw` and merge its nodes into vocabulary `name`.
    ///
    /// Without a format, the adapters are tried in order and the first that
    /// parses wins. Returns the number of nodes merged.
    #[instrument(skip(self, raw), fields(vocab = %name))]
    pub fn add_vocabulary(
        &mut self,
        name: &str,
        raw: impl Into<RawDocument>,
        format: Option<Format>,
    ) -> Result<usize, IngestError> {
        let raw = raw.into();
        let (format, nodes) = match format {
            Some(format) => (format, loader::parse_as(&raw, format)?),
            None => loader::detect_and_parse(&raw, &self.adapters)?,
        };
        debug!(%format, nodes = nodes.len(), "parsed vocabulary");
        Ok(self.add_nodes(name, nodes))
    }

    /// Like [`add_vocabulary`](Self::add_vocabulary) with a media type string.
    pub fn add_vocabulary_with_media_type(
        &mut self,
        name: &str,
        raw: impl Into<RawDocument>,
        media_type: &str,
    ) -> Result<usize, IngestError> {
        let format: Format = media_type.parse()?;
        self.add_vocabulary(name, raw, Some(format))
    }

    /// Merge already-flattened nodes into vocabulary `name`.
    pub fn add_nodes(&mut self, name: &str, nodes: Vec<Node>) -> usize {
        let count = nodes.len();
        let vocab = self.vocabs.entry(name.to_string()).or_default();
        for node in nodes {
            vocab.merge(node);
        }
        self.invalidate();
        count
    }

    /// Drop a vocabulary. Absent names are ignored.
    pub fn remove_vocabulary(&mut self, name: &str) {
        if self.vocabs.shift_remove(name).is_some() {
            debug!(vocab = name, "removed vocabulary");
        }
        self.invalidate();
    }

    /// Replace the default vocabularies with `names`.
    ///
    /// The reserved `schema` and `webapi` vocabularies are dropped, every name
    /// is fetched concurrently (through the process-wide cache), and results
    /// are merged in request order. Not atomic: vocabularies that loaded stay
    /// loaded when another one fails, and the first failure is returned.
    #[instrument(skip(self, source))]
    pub async fn set_default_vocabularies(
        &mut self,
        source: &dyn VocabSource,
        names: &[&str],
    ) -> Result<(), FetchError> {
        self.current_defaults = names.iter().map(|n| n.to_string()).collect();
        self.vocabs.shift_remove(reserved::SCHEMA_VOCAB);
        self.vocabs.shift_remove(reserved::WEBAPI_VOCAB);
        self.invalidate();

        let fetched = join_all(
            names
                .iter()
                .map(|name| source::fetch_default_vocabulary(source, name)),
        )
        .await;

        let mut first_error = None;
        for (name, result) in names.iter().zip(fetched) {
            let outcome = result.and_then(|doc| {
                self.add_vocabulary(source::target_vocabulary(name), doc, Some(Format::JsonLd))
                    .map_err(|e| FetchError::Ingest {
                        name: name.to_string(),
                        source: e,
                    })
            });
            match outcome {
                Ok(count) => info!(vocab = %name, nodes = count, "loaded default vocabulary"),
                Err(e) => {
                    warn!(vocab = %name, error = %e, "default vocabulary failed to load");
                    first_error.get_or_insert(e);
                }
            }
        }
        first_error.map_or(Ok(()), Err)
    }

    /// Bump the generation and drop every memoized result.
    pub fn invalidate(&mut self) {
        self.generation += 1;
        self.memo.clear();
    }

    // -----------------------------------------------------------------------
    // Lookup
    // -----------------------------------------------------------------------

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.memo.stats(self.generation)
    }

    pub fn current_default_vocabularies(&self) -> &[String] {
        &self.current_defaults
    }

    pub fn vocabulary_names(&self) -> impl Iterator<Item = &str> {
        self.vocabs.keys().map(String::as_str)
    }

    pub fn vocabulary(&self, name: &str) -> Option<&Vocabulary> {
        self.vocabs.get(name)
    }

    /// Nodes of one vocabulary (empty if it is not loaded).
    pub fn vocabulary_nodes(&self, name: &str) -> Vec<&Node> {
        self.vocabs
            .get(name)
            .map(|v| v.nodes().collect())
            .unwrap_or_default()
    }

    /// Every node of every vocabulary, vocabularies in insertion order.
    pub fn all_nodes(&self) -> Arc<[Node]> {
        self.memo.all_nodes.get_or_compute(self.generation, (), || {
            self.vocabs
                .values()
                .flat_map(|v| v.nodes().cloned())
                .collect()
        })
    }

    /// First stored node with this id.
    pub fn get_any_node(&self, id: &str) -> Option<&Node> {
        self.vocabs.values().find_map(|v| v.get(id))
    }

    /// First vocabulary holding a node with this id.
    pub fn vocabulary_holding(&self, id: &str) -> Option<&Vocabulary> {
        self.vocabs.values().find(|v| v.get(id).is_some())
    }

    /// Node by id. Ids ending in `-input` / `-output` resolve to synthetic
    /// IO nodes derived from their base node.
    pub fn get_node(&self, id: &str) -> Option<Cow<'_, Node>> {
        match IoKind::from_suffixed_id(id) {
            Some(kind) => self.io_node(id, kind).map(Cow::Owned),
            None => self.get_any_node(id).map(Cow::Borrowed),
        }
    }

    /// Node by namespace and local name.
    pub fn get_node_in_namespace(&self, namespace: &str, local: &str) -> Option<Cow<'_, Node>> {
        self.get_node(&iri::join_ns(namespace, local))
    }

    /// Shape nodes: typed `sh:NodeShape` or `sh:SPARQLTargetType`.
    pub fn restriction_nodes(&self) -> Vec<Node> {
        self.all_nodes()
            .iter()
            .filter(|n| n.has_any_type(&sh::RESTRICTION_TYPES))
            .cloned()
            .collect()
    }
}
