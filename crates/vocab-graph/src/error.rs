//! Error types for ingestion, fetching, querying and configuration.

use thiserror::Error;

use crate::ingest::loader::Format;

/// Errors from the built-in JSON-LD expansion and flattening.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum JsonLdError {
    #[error("invalid JSON: {0}")]
    Json(String),

    #[error("invalid context: {message}")]
    InvalidContext { message: String },

    #[error("invalid @id value: {0}")]
    InvalidId(String),

    #[error("invalid value object: {0}")]
    InvalidValue(String),

    #[error("flattened document has neither a node array nor an @graph array")]
    UnexpectedShape,
}

/// Errors from Turtle parsing.
#[derive(Error, Debug)]
pub enum TurtleError {
    #[error("Turtle input must be text, not a JSON object")]
    NotText,

    #[error("Turtle syntax error: {0}")]
    Syntax(String),
}

/// One failed attempt of a format adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct FormatAttempt {
    pub format: Format,
    pub message: String,
}

/// Errors returned when adding a vocabulary.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum IngestError {
    #[error("format \"{0}\" not supported")]
    UnknownFormat(String),

    #[error("{format} parse error: {message}")]
    Parse { format: Format, message: String },

    #[error("document is not in any supported format ({})", describe_attempts(.attempts))]
    UnsupportedFormat { attempts: Vec<FormatAttempt> },
}

fn describe_attempts(attempts: &[FormatAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{}: {}", a.format, a.message))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Errors while retrieving default vocabularies.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("request for vocabulary '{name}' failed: {source}")]
    Http {
        name: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("vocabulary '{name}' returned HTTP {status}")]
    Status { name: String, status: u16 },

    #[error("vocabulary '{name}' is not a JSON document: {message}")]
    Decode { name: String, message: String },

    #[error("vocabulary '{name}' could not be loaded: {source}")]
    Ingest {
        name: String,
        #[source]
        source: IngestError,
    },
}

/// Errors from evaluating a SPARQL query against a document.
#[derive(Error, Debug)]
pub enum QueryError {
    #[error("document could not be converted to RDF: {0}")]
    Document(String),

    #[error("query store error: {0}")]
    Store(String),

    #[error("query evaluation failed: {0}")]
    Evaluation(String),

    #[error("query task failed: {0}")]
    Join(String),
}

/// Errors while loading configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid config file: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid config value: {0}")]
    Invalid(String),
}
