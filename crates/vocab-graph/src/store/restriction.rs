//! Restriction derivation from SHACL node shapes.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::VocabStore;
use crate::model::ontology::sh;
use crate::model::{Node, NodeValue};

/// `sh:nodeKind` values.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum NodeKind {
    #[serde(rename = "IRI")]
    Iri,
    Literal,
    BlankNode,
    #[serde(rename = "BlankNodeOrIRI")]
    BlankNodeOrIri,
    BlankNodeOrLiteral,
    #[serde(rename = "IRIOrLiteral")]
    IriOrLiteral,
}

impl NodeKind {
    pub fn from_iri(iri: &str) -> Option<NodeKind> {
        match iri {
            sh::IRI => Some(NodeKind::Iri),
            sh::LITERAL => Some(NodeKind::Literal),
            sh::BLANK_NODE => Some(NodeKind::BlankNode),
            sh::BLANK_NODE_OR_IRI => Some(NodeKind::BlankNodeOrIri),
            sh::BLANK_NODE_OR_LITERAL => Some(NodeKind::BlankNodeOrLiteral),
            sh::IRI_OR_LITERAL => Some(NodeKind::IriOrLiteral),
            _ => None,
        }
    }
}

/// One constrained property of a shape.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Restriction {
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub node_kind: Option<NodeKind>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class_constraint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datatype: Option<String>,
}

/// Path used for the implicit restriction of IRI-kind shapes.
pub const ID_PATH: &str = "@id";

impl Restriction {
    /// The restriction every `sh:nodeKind sh:IRI` shape implies: an explicit id.
    pub fn required_id() -> Self {
        Self {
            path: ID_PATH.to_string(),
            min_count: Some(1),
            ..Default::default()
        }
    }

    /// Read a property shape. Shapes without a usable `sh:path` yield `None`.
    pub fn from_property_shape(shape: &Node) -> Option<Self> {
        let path = shape.values(sh::PATH).iter().find_map(path_id)?;
        let count = |property: &str| {
            shape
                .first_literal(property)
                .and_then(|l| l.value.trim().parse::<u32>().ok())
        };
        Some(Self {
            path: path.to_string(),
            min_count: count(sh::MIN_COUNT),
            max_count: count(sh::MAX_COUNT),
            node_kind: shape.first_reference(sh::NODE_KIND).and_then(NodeKind::from_iri),
            class_constraint: shape.first_reference(sh::CLASS).map(str::to_string),
            datatype: shape.first_reference(sh::DATATYPE).map(str::to_string),
        })
    }

    pub fn is_required(&self) -> bool {
        self.min_count.is_some_and(|n| n > 0)
    }
}

impl fmt::Display for Restriction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}..{}]",
            self.path,
            self.min_count.unwrap_or(0),
            self.max_count.map_or_else(|| "*".to_string(), |n| n.to_string())
        )?;
        if let Some(kind) = self.node_kind {
            write!(f, " kind={kind:?}")?;
        }
        if let Some(class) = &self.class_constraint {
            write!(f, " class=<{class}>")?;
        }
        if let Some(datatype) = &self.datatype {
            write!(f, " datatype=<{datatype}>")?;
        }
        Ok(())
    }
}

/// Predicate of a path value; for a sequence path, its first step.
fn path_id(value: &NodeValue) -> Option<&str> {
    match value {
        NodeValue::List(steps) => steps.iter().find_map(NodeValue::as_id),
        other => other.as_id(),
    }
}

impl VocabStore {
    /// Flatten shapes into restrictions, one per property shape, in shape order.
    ///
    /// Blank property shapes are de-referenced first; a shape with
    /// `sh:nodeKind sh:IRI` also yields [`Restriction::required_id`].
    pub fn make_restrictions(&self, shapes: &[Node]) -> Vec<Restriction> {
        let mut restrictions = Vec::new();
        for shape in shapes.iter().filter(|s| s.has_property(sh::PROPERTY)) {
            let resolved = self.replace_blank_nodes_in(shape);
            for value in resolved.values(sh::PROPERTY) {
                let Some(property_shape) = self.property_shape(value) else {
                    debug!(shape = %shape.id, "property shape could not be resolved");
                    continue;
                };
                match Restriction::from_property_shape(&property_shape) {
                    Some(r) => restrictions.push(r),
                    None => debug!(shape = %shape.id, "property shape has no sh:path"),
                }
            }
            if resolved.first_reference(sh::NODE_KIND) == Some(sh::IRI) {
                restrictions.push(Restriction::required_id());
            }
        }
        restrictions
    }

    fn property_shape(&self, value: &NodeValue) -> Option<Node> {
        match value {
            NodeValue::Embedded(node) => Some((**node).clone()),
            NodeValue::Reference(id) => self
                .get_any_node(id)
                .map(|node| self.replace_blank_nodes_in(node)),
            _ => None,
        }
    }

    /// Restrictions of shapes targeting any class in the super-class closure
    /// of `type_ids`, plus the shapes named in `extra_ids`.
    pub fn restrictions_for_types<S: AsRef<str>, E: AsRef<str>>(
        &self,
        type_ids: &[S],
        extra_ids: &[E],
    ) -> Vec<Restriction> {
        let closure = self.super_classes_for_types(type_ids);
        let mut shapes: Vec<Node> = self
            .restriction_nodes()
            .into_iter()
            .filter(|n| n.reference_ids(sh::TARGET_CLASS).any(|t| closure.iter().any(|c| c == t)))
            .collect();
        shapes.extend(
            extra_ids
                .iter()
                .filter_map(|id| self.get_node(id.as_ref()))
                .map(|n| n.into_owned()),
        );
        self.make_restrictions(&shapes)
    }

    /// Restrictions of shapes whose `sh:targetNode` names `node_id`.
    pub fn restrictions_for_node(&self, node_id: &str) -> Vec<Restriction> {
        let shapes: Vec<Node> = self
            .restriction_nodes()
            .into_iter()
            .filter(|n| n.reference_ids(sh::TARGET_NODE).any(|t| t == node_id))
            .collect();
        self.make_restrictions(&shapes)
    }
}
