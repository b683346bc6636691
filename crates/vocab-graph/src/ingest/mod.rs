//! Ingestion: format adapters and default vocabulary retrieval.

pub mod blank;
pub mod jsonld;
pub mod loader;
pub mod source;
pub mod turtle;
