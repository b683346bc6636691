//! An in-memory graph engine over RDF vocabularies.
//!
//! Vocabularies arrive as JSON-LD or Turtle, are flattened into [`Node`]s and
//! merged into a [`VocabStore`] under a name. The store answers class-hierarchy
//! queries, resolves blank nodes and synthetic `-input` / `-output` property
//! nodes, and turns SHACL shapes into [`Restriction`]s, including shapes
//! targeted by SPARQL queries evaluated against a caller's document.
//!
//! ```
//! use vocab_graph::VocabStore;
//!
//! let mut store = VocabStore::default();
//! store
//!     .add_vocabulary(
//!         "zoo",
//!         r#"{
//!             "@context": {"rdfs": "http://www.w3.org/2000/01/rdf-schema#"},
//!             "@graph": [
//!                 {"@id": "http://ex.org/Animal"},
//!                 {"@id": "http://ex.org/Dog",
//!                  "rdfs:subClassOf": {"@id": "http://ex.org/Animal"}}
//!             ]
//!         }"#,
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(
//!     store.super_classes("http://ex.org/Dog"),
//!     ["http://ex.org/Dog", "http://ex.org/Animal"]
//! );
//! ```

pub mod config;
pub mod emitter;
pub mod error;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod store;

pub use config::EngineConfig;
pub use error::{ConfigError, FetchError, IngestError, QueryError};
pub use ingest::loader::{Format, RawDocument};
pub use model::{Literal, Node, NodeValue};
pub use store::resolve::IoKind;
pub use store::restriction::{NodeKind, Restriction};
pub use store::sparql::{OxigraphEvaluator, QueryEvaluator, SparqlRestrictions};
pub use store::{StoreOptions, VocabStore};
