//! Typed representation of flattened JSON-LD nodes.
//!
//! A [`Node`] serializes to and from a flattened JSON-LD node object:
//! `{ "@id": ..., "@type": [...], "<property>": [<value>, ...] }`.
//! Property values are [`NodeValue`]s, a tagged variant instead of the
//! `@id` / `@value` / `@list` shaped objects of the JSON form.

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::iri;
use super::ontology::{standard, schema};

/// A semantic entity: one RDF resource.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Node {
    #[serde(rename = "@id")]
    pub id: String,
    #[serde(rename = "@type", default, skip_serializing_if = "Vec::is_empty")]
    pub types: Vec<String>,
    #[serde(flatten)]
    pub properties: IndexMap<String, Vec<NodeValue>>,
}

/// A literal value with optional datatype or language tag.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Literal {
    pub value: String,
    pub datatype: Option<String>,
    pub language: Option<String>,
}

/// The value of a property: a reference, a literal, an ordered list, or a
/// node embedded by blank-node resolution.
#[derive(Debug, Clone, PartialEq)]
pub enum NodeValue {
    Reference(String),
    Literal(Literal),
    List(Vec<NodeValue>),
    Embedded(Box<Node>),
}

impl Node {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// Builder: add an rdf:type.
    pub fn with_type(mut self, type_iri: impl Into<String>) -> Self {
        self.types.push(type_iri.into());
        self
    }

    /// Builder: append a value to a property.
    pub fn with_value(mut self, property: impl Into<String>, value: NodeValue) -> Self {
        self.properties.entry(property.into()).or_default().push(value);
        self
    }

    /// Builder: append a reference to a property.
    pub fn with_ref(self, property: impl Into<String>, id: impl Into<String>) -> Self {
        self.with_value(property, NodeValue::Reference(id.into()))
    }

    /// Builder: append a plain literal to a property.
    pub fn with_literal(self, property: impl Into<String>, value: impl Into<String>) -> Self {
        self.with_value(property, NodeValue::literal(value))
    }

    pub fn is_blank(&self) -> bool {
        iri::is_blank(&self.id)
    }

    pub fn has_type(&self, type_iri: &str) -> bool {
        self.types.iter().any(|t| t == type_iri)
    }

    pub fn has_any_type(&self, type_iris: &[&str]) -> bool {
        self.types.iter().any(|t| type_iris.contains(&t.as_str()))
    }

    /// All values of a property (empty if absent).
    pub fn values(&self, property: &str) -> &[NodeValue] {
        self.properties
            .get(property)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    pub fn has_property(&self, property: &str) -> bool {
        !self.values(property).is_empty()
    }

    /// Ids referenced by a property, including ids of embedded nodes.
    pub fn reference_ids<'a>(&'a self, property: &str) -> impl Iterator<Item = &'a str> + 'a {
        self.values(property).iter().filter_map(NodeValue::as_id)
    }

    pub fn first_reference(&self, property: &str) -> Option<&str> {
        self.reference_ids(property).next()
    }

    pub fn first_literal(&self, property: &str) -> Option<&Literal> {
        self.values(property).iter().find_map(NodeValue::as_literal)
    }

    /// Display label: `rdfs:label`, falling back to the local name of the id.
    pub fn label(&self) -> &str {
        self.first_literal(standard::RDFS_LABEL)
            .map(|l| l.value.as_str())
            .unwrap_or_else(|| iri::local_name(&self.id))
    }

    /// Declared domains (`schema:domainIncludes` and `rdfs:domain`).
    pub fn domains(&self) -> impl Iterator<Item = &str> {
        self.reference_ids(schema::DOMAIN_INCLUDES)
            .chain(self.reference_ids(standard::RDFS_DOMAIN))
    }

    /// Overwrite-merge: properties of `other` replace same-key properties of
    /// `self`; everything else is kept. Non-empty types of `other` replace ours.
    pub fn merge(&mut self, other: Node) {
        if !other.types.is_empty() {
            self.types = other.types;
        }
        for (property, values) in other.properties {
            self.properties.insert(property, values);
        }
    }
}

impl Literal {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: None,
        }
    }

    pub fn typed(value: impl Into<String>, datatype: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: Some(datatype.into()),
            language: None,
        }
    }

    pub fn lang(value: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            datatype: None,
            language: Some(language.into()),
        }
    }
}

impl NodeValue {
    pub fn reference(id: impl Into<String>) -> Self {
        NodeValue::Reference(id.into())
    }

    pub fn literal(value: impl Into<String>) -> Self {
        NodeValue::Literal(Literal::new(value))
    }

    /// Referenced id, or the id of an embedded node.
    pub fn as_id(&self) -> Option<&str> {
        match self {
            NodeValue::Reference(id) => Some(id),
            NodeValue::Embedded(node) => Some(&node.id),
            _ => None,
        }
    }

    pub fn as_literal(&self) -> Option<&Literal> {
        match self {
            NodeValue::Literal(l) => Some(l),
            _ => None,
        }
    }

    pub fn as_embedded(&self) -> Option<&Node> {
        match self {
            NodeValue::Embedded(node) => Some(node),
            _ => None,
        }
    }

    /// A bare reference to a blank node, i.e. a value blank-node resolution replaces.
    pub fn is_replaceable(&self) -> bool {
        matches!(self, NodeValue::Reference(id) if iri::is_blank(id))
    }
}

impl Serialize for NodeValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            NodeValue::Reference(id) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("@id", id)?;
                map.end()
            }
            NodeValue::Literal(lit) => {
                let len = 1 + usize::from(lit.datatype.is_some()) + usize::from(lit.language.is_some());
                let mut map = serializer.serialize_map(Some(len))?;
                map.serialize_entry("@value", &lit.value)?;
                if let Some(dt) = &lit.datatype {
                    map.serialize_entry("@type", dt)?;
                }
                if let Some(lang) = &lit.language {
                    map.serialize_entry("@language", lang)?;
                }
                map.end()
            }
            NodeValue::List(items) => {
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry("@list", items)?;
                map.end()
            }
            NodeValue::Embedded(node) => node.serialize(serializer),
        }
    }
}

/// JSON shape of a value object before it is classified into a variant.
#[derive(Deserialize)]
struct RawValue {
    #[serde(rename = "@id")]
    id: Option<String>,
    #[serde(rename = "@value")]
    value: Option<serde_json::Value>,
    #[serde(rename = "@type")]
    datatype: Option<String>,
    #[serde(rename = "@language")]
    language: Option<String>,
    #[serde(rename = "@list")]
    list: Option<Vec<NodeValue>>,
}

impl<'de> Deserialize<'de> for NodeValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawValue::deserialize(deserializer)?;
        if let Some(items) = raw.list {
            return Ok(NodeValue::List(items));
        }
        if let Some(value) = raw.value {
            let (lexical, implied) = lexical_form(value).map_err(D::Error::custom)?;
            return Ok(NodeValue::Literal(Literal {
                value: lexical,
                datatype: raw.datatype.or(implied),
                language: raw.language,
            }));
        }
        match raw.id {
            Some(id) => Ok(NodeValue::Reference(id)),
            None => Err(D::Error::custom(
                "value object needs one of @id, @value or @list",
            )),
        }
    }
}

/// Lexical form of a JSON scalar plus the XSD datatype it implies.
pub(crate) fn lexical_form(value: serde_json::Value) -> Result<(String, Option<String>), String> {
    match value {
        serde_json::Value::String(s) => Ok((s, None)),
        serde_json::Value::Bool(b) => Ok((b.to_string(), Some(standard::XSD_BOOLEAN.to_string()))),
        serde_json::Value::Number(n) => {
            let datatype = if n.is_f64() {
                standard::XSD_DOUBLE
            } else {
                standard::XSD_INTEGER
            };
            Ok((n.to_string(), Some(datatype.to_string())))
        }
        other => Err(format!("@value must be a scalar, got {other}")),
    }
}
