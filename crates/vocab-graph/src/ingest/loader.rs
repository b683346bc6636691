//! Format detection and the ordered list of format adapters.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{jsonld, turtle};
use crate::error::{FormatAttempt, IngestError};
use crate::model::Node;

/// A raw vocabulary document: text, or JSON that was already parsed.
#[derive(Debug, Clone, PartialEq)]
pub enum RawDocument {
    Text(String),
    Json(serde_json::Value),
}

impl From<String> for RawDocument {
    fn from(text: String) -> Self {
        RawDocument::Text(text)
    }
}

impl From<&str> for RawDocument {
    fn from(text: &str) -> Self {
        RawDocument::Text(text.to_string())
    }
}

impl From<serde_json::Value> for RawDocument {
    fn from(value: serde_json::Value) -> Self {
        RawDocument::Json(value)
    }
}

/// Supported serializations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Format {
    JsonLd,
    Turtle,
}

impl Format {
    pub fn media_type(&self) -> &'static str {
        match self {
            Format::JsonLd => "application/ld+json",
            Format::Turtle => "text/turtle",
        }
    }

    /// Guess a format from a file extension.
    pub fn from_path(path: &Path) -> Option<Format> {
        match path.extension()?.to_str()?.to_ascii_lowercase().as_str() {
            "jsonld" | "json" => Some(Format::JsonLd),
            "ttl" | "turtle" => Some(Format::Turtle),
            _ => None,
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.media_type())
    }
}

impl FromStr for Format {
    type Err = IngestError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "application/ld+json" | "jsonld" | "json-ld" => Ok(Format::JsonLd),
            "text/turtle" | "turtle" | "ttl" => Ok(Format::Turtle),
            _ => Err(IngestError::UnknownFormat(s.to_string())),
        }
    }
}

/// Converts a raw document of one format into flattened nodes.
pub trait FormatAdapter: Send + Sync {
    fn format(&self) -> Format;
    /// Parse the document; the error string is the underlying parser message.
    fn parse(&self, raw: &RawDocument) -> Result<Vec<Node>, String>;
}

/// JSON-LD: expand, then flatten.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonLdAdapter;

impl FormatAdapter for JsonLdAdapter {
    fn format(&self) -> Format {
        Format::JsonLd
    }

    fn parse(&self, raw: &RawDocument) -> Result<Vec<Node>, String> {
        let result = match raw {
            RawDocument::Text(text) => jsonld::text_to_nodes(text),
            RawDocument::Json(value) => jsonld::document_to_nodes(value),
        };
        result.map_err(|e| e.to_string())
    }
}

/// Turtle via the oxigraph parser.
#[derive(Debug, Default, Clone, Copy)]
pub struct TurtleAdapter;

impl FormatAdapter for TurtleAdapter {
    fn format(&self) -> Format {
        Format::Turtle
    }

    fn parse(&self, raw: &RawDocument) -> Result<Vec<Node>, String> {
        match raw {
            RawDocument::Text(text) => turtle::turtle_to_nodes(text).map_err(|e| e.to_string()),
            RawDocument::Json(_) => Err(crate::error::TurtleError::NotText.to_string()),
        }
    }
}

/// Adapter for a format.
pub fn adapter_for(format: Format) -> Arc<dyn FormatAdapter> {
    match format {
        Format::JsonLd => Arc::new(JsonLdAdapter),
        Format::Turtle => Arc::new(TurtleAdapter),
    }
}

/// Default detection order: JSON-LD first, then Turtle.
pub fn default_adapters() -> Vec<Arc<dyn FormatAdapter>> {
    vec![adapter_for(Format::JsonLd), adapter_for(Format::Turtle)]
}

/// Parse with an explicit format.
pub fn parse_as(raw: &RawDocument, format: Format) -> Result<Vec<Node>, IngestError> {
    adapter_for(format)
        .parse(raw)
        .map_err(|message| IngestError::Parse { format, message })
}

/// Try each adapter in order; the first success wins. When every adapter
/// fails, the error lists every attempt in the order tried.
pub fn detect_and_parse(
    raw: &RawDocument,
    adapters: &[Arc<dyn FormatAdapter>],
) -> Result<(Format, Vec<Node>), IngestError> {
    let mut attempts = Vec::with_capacity(adapters.len());
    for adapter in adapters {
        match adapter.parse(raw) {
            Ok(nodes) => return Ok((adapter.format(), nodes)),
            Err(message) => {
                debug!(format = %adapter.format(), %message, "format adapter rejected document");
                attempts.push(FormatAttempt {
                    format: adapter.format(),
                    message,
                });
            }
        }
    }
    Err(IngestError::UnsupportedFormat { attempts })
}

/// Read a vocabulary file, guessing its format from the extension.
pub fn read_document(path: &Path) -> std::io::Result<(RawDocument, Option<Format>)> {
    let text = std::fs::read_to_string(path)?;
    Ok((RawDocument::Text(text), Format::from_path(path)))
}
