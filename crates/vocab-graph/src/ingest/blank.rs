//! Blank-node labelling for ingested documents.
//!
//! Parsers hand out blank labels that only mean something inside one
//! document. [`BlankLabels`] renames them in order of first appearance under
//! a scope taken from the document content, so the same document always gets
//! the same labels and two different documents never share one.

use std::collections::HashMap;

use sha2::{Digest, Sha256};

use crate::model::iri::BLANK_PREFIX;

/// Hex digits of the content digest kept in a scope.
const SCOPE_LEN: usize = 12;

/// Scope for a document's blank labels: a short SHA-256 digest of its content.
pub fn document_scope(content: &[u8]) -> String {
    let digest = format!("{:x}", Sha256::digest(content));
    digest[..SCOPE_LEN].to_string()
}

/// Renames parser-local blank labels to stable, document-scoped ones.
#[derive(Debug, Clone, Default)]
pub struct BlankLabels {
    scope: Option<String>,
    labels: HashMap<String, String>,
    counter: usize,
}

impl BlankLabels {
    /// Labels `_:b0`, `_:b1`, ... with no document scope.
    pub fn unscoped() -> Self {
        Self::default()
    }

    /// Labels `_:<scope>-b0`, `_:<scope>-b1`, ... for a document's content.
    pub fn for_content(content: &[u8]) -> Self {
        Self {
            scope: Some(document_scope(content)),
            ..Self::default()
        }
    }

    /// A new label, unrelated to any earlier one.
    pub fn fresh(&mut self) -> String {
        let n = self.counter;
        self.counter += 1;
        match &self.scope {
            Some(scope) => format!("{BLANK_PREFIX}{scope}-b{n}"),
            None => format!("{BLANK_PREFIX}b{n}"),
        }
    }

    /// The label standing for `original`, allocated on first sight.
    pub fn relabel(&mut self, original: &str) -> String {
        if let Some(label) = self.labels.get(original) {
            return label.clone();
        }
        let label = self.fresh();
        self.labels.insert(original.to_string(), label.clone());
        label
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_original_keeps_its_label() {
        let mut labels = BlankLabels::unscoped();
        assert_eq!(labels.relabel("_:x"), "_:b0");
        assert_eq!(labels.fresh(), "_:b1");
        assert_eq!(labels.relabel("_:x"), "_:b0");
    }

    #[test]
    fn scope_follows_content() {
        assert_eq!(document_scope(b"a"), document_scope(b"a"));
        assert_ne!(document_scope(b"a"), document_scope(b"b"));
        let label = BlankLabels::for_content(b"a").fresh();
        assert_eq!(label, format!("_:{}-b0", document_scope(b"a")));
    }
}
