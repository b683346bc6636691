//! Reference resolution: synthetic IO property nodes, blank-node
//! de-referencing and enumeration rewriting.

use std::collections::HashSet;

use serde_json::{json, Map, Value as JsonValue};

use super::{VocabStore, Vocabulary};
use crate::model::iri::{self, IriMinter};
use crate::model::ontology::{schema, standard};
use crate::model::{Literal, Node, NodeValue};

/// Which side of an Action a synthetic property node describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IoKind {
    Input,
    Output,
}

impl IoKind {
    pub fn suffix(self) -> &'static str {
        match self {
            IoKind::Input => "-input",
            IoKind::Output => "-output",
        }
    }

    /// Kind of a suffixed id such as `http://schema.org/object-input`.
    pub fn from_suffixed_id(id: &str) -> Option<IoKind> {
        [IoKind::Input, IoKind::Output]
            .into_iter()
            .find(|kind| id.ends_with(kind.suffix()))
    }
}

impl VocabStore {
    /// Synthetic IO variant of a property node.
    ///
    /// `id` may be the base id or already carry the io suffix. The copy gets
    /// the suffixed id, a suffixed label, and a range limited to
    /// `schema:Text` and `schema:PropertyValueSpecification`.
    pub fn io_node(&self, id: &str, kind: IoKind) -> Option<Node> {
        let base_id = id.strip_suffix(kind.suffix()).unwrap_or(id);
        let base = self.get_any_node(base_id)?;

        let mut node = base.clone();
        node.id = format!("{}{}", base.id, kind.suffix());
        let label = format!("{}{}", base.label(), kind.suffix());
        node.properties.insert(
            standard::RDFS_LABEL.to_string(),
            vec![NodeValue::Literal(Literal::new(label))],
        );
        node.properties.insert(
            schema::RANGE_INCLUDES.to_string(),
            vec![
                NodeValue::reference(schema::TEXT),
                NodeValue::reference(schema::PROPERTY_VALUE_SPECIFICATION),
            ],
        );
        Some(node)
    }

    /// De-reference blank-node references inside a node, recursively.
    ///
    /// Blank nodes are looked up first in the vocabulary holding `node`, then
    /// in every vocabulary.
    pub fn replace_blank_nodes_in(&self, node: &Node) -> Node {
        let mut path = HashSet::new();
        if node.is_blank() {
            path.insert(node.id.clone());
        }
        let home = self.vocabulary_holding(&node.id);
        self.resolve_node(node, home, &mut path)
    }

    /// De-reference blank-node references inside a value, recursively.
    ///
    /// A bare reference to a blank node becomes `NodeValue::Embedded` with the
    /// resolved node. A blank node already being resolved further up the same
    /// path stays a reference, which bounds the recursion on cyclic graphs.
    /// References to unknown blank nodes are left as they are.
    pub fn replace_blank_nodes(&self, value: &NodeValue) -> NodeValue {
        self.resolve_value(value, None, &mut HashSet::new())
    }

    fn resolve_node(
        &self,
        node: &Node,
        home: Option<&Vocabulary>,
        path: &mut HashSet<String>,
    ) -> Node {
        Node {
            id: node.id.clone(),
            types: node.types.clone(),
            properties: node
                .properties
                .iter()
                .map(|(k, values)| {
                    let resolved = values
                        .iter()
                        .map(|v| self.resolve_value(v, home, path))
                        .collect();
                    (k.clone(), resolved)
                })
                .collect(),
        }
    }

    fn resolve_value(
        &self,
        value: &NodeValue,
        home: Option<&Vocabulary>,
        path: &mut HashSet<String>,
    ) -> NodeValue {
        match value {
            NodeValue::Reference(id) if value.is_replaceable() => {
                if path.contains(id) {
                    return value.clone();
                }
                let local = home.and_then(|v| v.get(id));
                let Some(target) = local.or_else(|| self.get_any_node(id)) else {
                    return value.clone();
                };
                path.insert(id.clone());
                let resolved = self.resolve_node(target, home, path);
                path.remove(id);
                NodeValue::Embedded(Box::new(resolved))
            }
            NodeValue::List(items) => {
                NodeValue::List(items.iter().map(|v| self.resolve_value(v, home, path)).collect())
            }
            NodeValue::Embedded(node) => {
                let inserted = node.is_blank() && path.insert(node.id.clone());
                let resolved = self.resolve_node(node, home, path);
                if inserted {
                    path.remove(&node.id);
                }
                NodeValue::Embedded(Box::new(resolved))
            }
            NodeValue::Reference(_) | NodeValue::Literal(_) => value.clone(),
        }
    }

    /// Whether a property's first declared `schema:rangeIncludes` is an enumeration.
    pub fn is_enum_property(&self, property: &str) -> bool {
        let Some(node) = self.get_node(property) else {
            return false;
        };
        let Some(range) = node.first_reference(schema::RANGE_INCLUDES) else {
            return false;
        };
        self.super_classes(range)
            .iter()
            .any(|c| c == schema::ENUMERATION)
    }

    /// Rewrite enumeration-valued strings of an annotation payload into references.
    ///
    /// For each string under key `k` where `schema:k` is an enum property, the
    /// string becomes `{"@id": "http://schema.org/<value>"}`. Keys starting with
    /// `@` and every non-matching leaf pass through unchanged.
    pub fn replace_enums(&self, payload: &JsonValue) -> JsonValue {
        let minter = IriMinter::new(schema::NS);
        self.replace_enums_with(payload, &minter)
    }

    fn replace_enums_with(&self, payload: &JsonValue, minter: &IriMinter) -> JsonValue {
        match payload {
            JsonValue::Array(items) => JsonValue::Array(
                items
                    .iter()
                    .map(|v| self.replace_enums_with(v, minter))
                    .collect(),
            ),
            JsonValue::Object(map) => {
                let mut out = Map::with_capacity(map.len());
                for (key, value) in map {
                    let replaced = match value {
                        JsonValue::String(s)
                            if !key.starts_with('@')
                                && self.is_enum_property(&minter.term_iri(key)) =>
                        {
                            json!({ "@id": minter.term_iri(iri::local_name(s)) })
                        }
                        JsonValue::Array(_) | JsonValue::Object(_) => {
                            self.replace_enums_with(value, minter)
                        }
                        _ => value.clone(),
                    };
                    out.insert(key.clone(), replaced);
                }
                JsonValue::Object(out)
            }
            other => other.clone(),
        }
    }
}
