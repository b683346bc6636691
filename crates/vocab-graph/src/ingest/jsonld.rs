//! Minimal JSON-LD expansion and flattening.
//!
//! Supports the subset vocabulary documents use in practice: object and array
//! contexts with prefixes, `@vocab`, `@base`, `@language`, term definitions with
//! `@id` / `@type` / `@container: @list`, `@graph`, nested node objects, value
//! objects and `@list`. Remote (string) contexts are not fetched.
//!
//! ```
//! use vocab_graph::ingest::jsonld::{expand, flatten, nodes_from_flattened};
//! use serde_json::json;
//!
//! let doc = json!({
//!     "@context": {"ex": "http://example.org/"},
//!     "@id": "ex:Dog",
//!     "ex:name": "Dog"
//! });
//! let nodes = nodes_from_flattened(flatten(&expand(&doc).unwrap()).unwrap()).unwrap();
//! assert_eq!(nodes[0].id, "http://example.org/Dog");
//! ```

use std::collections::HashMap;

use indexmap::IndexMap;
use serde_json::{json, Map, Value as JsonValue};
use tracing::debug;

use super::blank::BlankLabels;
use crate::error::JsonLdError;
use crate::model::iri;
use crate::model::Node;

type Result<T> = std::result::Result<T, JsonLdError>;

/// Bound on chained term definitions (`a -> b:x -> c:y ...`).
const MAX_TERM_DEPTH: usize = 8;

/// How a term's string values are interpreted.
#[derive(Debug, Clone, PartialEq)]
enum TypeMapping {
    /// `"@type": "@id"` -- values are IRIs resolved against `@base`.
    Id,
    /// `"@type": "@vocab"` -- values are IRIs resolved against terms and `@vocab`.
    Vocab,
    /// A datatype IRI.
    Datatype(String),
}

#[derive(Debug, Clone, Default)]
struct TermDefinition {
    id: Option<String>,
    type_mapping: Option<TypeMapping>,
    list_container: bool,
}

/// Active context during expansion.
#[derive(Debug, Clone, Default)]
pub struct Context {
    terms: HashMap<String, TermDefinition>,
    vocab: Option<String>,
    base: Option<String>,
    language: Option<String>,
}

impl Context {
    /// Parse a local context on top of this one.
    pub fn merged(&self, local: &JsonValue) -> Result<Context> {
        match local {
            JsonValue::Null => Ok(Context::default()),
            JsonValue::String(url) => {
                debug!(context = %url, "remote JSON-LD context ignored");
                Ok(self.clone())
            }
            JsonValue::Array(items) => items
                .iter()
                .try_fold(self.clone(), |ctx, item| ctx.merged(item)),
            JsonValue::Object(map) => {
                let mut ctx = self.clone();
                for (key, value) in map {
                    match key.as_str() {
                        "@vocab" => ctx.vocab = value.as_str().map(str::to_string),
                        "@base" => ctx.base = value.as_str().map(str::to_string),
                        "@language" => ctx.language = value.as_str().map(str::to_string),
                        "@version" | "@protected" | "@propagate" => {}
                        _ => {
                            let definition = parse_term_definition(key, value)?;
                            match definition {
                                Some(def) => {
                                    ctx.terms.insert(key.clone(), def);
                                }
                                None => {
                                    ctx.terms.remove(key);
                                }
                            }
                        }
                    }
                }
                Ok(ctx)
            }
            other => Err(JsonLdError::InvalidContext {
                message: format!("unexpected context value {other}"),
            }),
        }
    }

    /// Expand a compact IRI, term or relative reference.
    ///
    /// `vocab` selects vocabulary-relative resolution (properties, types) over
    /// document-relative resolution (`@id` values). Returns `None` when a
    /// vocabulary-relative term cannot be turned into an IRI.
    pub fn expand_iri(&self, value: &str, vocab: bool) -> Option<String> {
        self.expand_iri_at(value, vocab, 0)
    }

    fn expand_iri_at(&self, value: &str, vocab: bool, depth: usize) -> Option<String> {
        if value.starts_with('@') || iri::is_blank(value) || depth > MAX_TERM_DEPTH {
            return Some(value.to_string());
        }
        if vocab {
            // A term defined as itself falls through to prefix and @vocab handling.
            if let Some(id) = self.terms.get(value).and_then(|d| d.id.as_deref()) {
                if id != value {
                    return self.expand_iri_at(id, true, depth + 1);
                }
            }
        }
        if let Some((prefix, suffix)) = value.split_once(':') {
            if suffix.starts_with("//") {
                return Some(value.to_string());
            }
            if let Some(ns) = self.terms.get(prefix).and_then(|d| d.id.as_deref()) {
                let ns = self.expand_iri_at(ns, true, depth + 1)?;
                return Some(format!("{ns}{suffix}"));
            }
            if iri::looks_like_iri(value) {
                return Some(value.to_string());
            }
        }
        if vocab {
            self.vocab.as_ref().map(|v| format!("{v}{value}"))
        } else {
            Some(match &self.base {
                Some(base) => format!("{base}{value}"),
                None => value.to_string(),
            })
        }
    }

    fn term(&self, key: &str) -> Option<&TermDefinition> {
        self.terms.get(key)
    }
}

fn parse_term_definition(term: &str, value: &JsonValue) -> Result<Option<TermDefinition>> {
    match value {
        JsonValue::Null => Ok(None),
        JsonValue::String(id) => Ok(Some(TermDefinition {
            id: Some(id.clone()),
            ..Default::default()
        })),
        JsonValue::Object(map) => {
            let id = match map.get("@id") {
                Some(JsonValue::String(s)) => Some(s.clone()),
                Some(JsonValue::Null) | None => Some(term.to_string()),
                Some(other) => {
                    return Err(JsonLdError::InvalidContext {
                        message: format!("term '{term}' has non-string @id {other}"),
                    })
                }
            };
            let type_mapping = match map.get("@type").and_then(JsonValue::as_str) {
                Some("@id") => Some(TypeMapping::Id),
                Some("@vocab") => Some(TypeMapping::Vocab),
                Some(datatype) => Some(TypeMapping::Datatype(datatype.to_string())),
                None => None,
            };
            let list_container = match map.get("@container") {
                Some(JsonValue::String(c)) => c == "@list",
                Some(JsonValue::Array(cs)) => cs.iter().any(|c| c == "@list"),
                _ => false,
            };
            Ok(Some(TermDefinition {
                id,
                type_mapping,
                list_container,
            }))
        }
        other => Err(JsonLdError::InvalidContext {
            message: format!("term '{term}' has invalid definition {other}"),
        }),
    }
}

// ---------------------------------------------------------------------------
// Expansion
// ---------------------------------------------------------------------------

/// Expand a JSON-LD document into an array of expanded node objects.
pub fn expand(document: &JsonValue) -> Result<JsonValue> {
    let mut out = Vec::new();
    expand_top(document, &Context::default(), &mut out)?;
    Ok(JsonValue::Array(out))
}

fn expand_top(document: &JsonValue, ctx: &Context, out: &mut Vec<JsonValue>) -> Result<()> {
    match document {
        JsonValue::Array(items) => {
            for item in items {
                expand_top(item, ctx, out)?;
            }
            Ok(())
        }
        JsonValue::Object(map) => {
            let ctx = match map.get("@context") {
                Some(local) => ctx.merged(local)?,
                None => ctx.clone(),
            };
            if let Some(graph) = map.get("@graph") {
                expand_top(graph, &ctx, out)?;
                let has_own_properties = map
                    .keys()
                    .any(|k| !matches!(k.as_str(), "@context" | "@graph" | "@id"));
                if !has_own_properties {
                    return Ok(());
                }
            }
            out.push(expand_node(map, &ctx)?);
            Ok(())
        }
        JsonValue::Null => Ok(()),
        other => Err(JsonLdError::InvalidValue(format!(
            "top-level value must be an object or array, got {other}"
        ))),
    }
}

fn expand_node(map: &Map<String, JsonValue>, ctx: &Context) -> Result<JsonValue> {
    let ctx = match map.get("@context") {
        Some(local) => ctx.merged(local)?,
        None => ctx.clone(),
    };

    let mut node = Map::new();
    for (key, value) in map {
        match key.as_str() {
            "@context" | "@graph" => {}
            "@id" => {
                let id = value
                    .as_str()
                    .ok_or_else(|| JsonLdError::InvalidId(value.to_string()))?;
                let id = ctx.expand_iri(id, false).unwrap_or_else(|| id.to_string());
                node.insert("@id".to_string(), json!(id));
            }
            "@type" => {
                let types: Vec<JsonValue> = string_items(value)
                    .map(|t| json!(ctx.expand_iri(t, true).unwrap_or_else(|| t.to_string())))
                    .collect();
                node.insert("@type".to_string(), JsonValue::Array(types));
            }
            k if k.starts_with('@') => {}
            _ => {
                let Some(property) = ctx.expand_iri(key, true) else {
                    debug!(term = %key, "dropping property that does not expand to an IRI");
                    continue;
                };
                if property.starts_with('@') {
                    continue;
                }
                let def = ctx.term(key);
                let mut values = expand_value(value, def, &ctx)?;
                if def.is_some_and(|d| d.list_container) {
                    values = vec![json!({ "@list": values })];
                }
                if values.is_empty() {
                    continue;
                }
                match node.get_mut(&property) {
                    Some(JsonValue::Array(existing)) => existing.extend(values),
                    _ => {
                        node.insert(property, JsonValue::Array(values));
                    }
                }
            }
        }
    }
    Ok(JsonValue::Object(node))
}

fn string_items(value: &JsonValue) -> impl Iterator<Item = &str> {
    let items: Vec<&str> = match value {
        JsonValue::String(s) => vec![s.as_str()],
        JsonValue::Array(arr) => arr.iter().filter_map(JsonValue::as_str).collect(),
        _ => Vec::new(),
    };
    items.into_iter()
}

fn expand_value(
    value: &JsonValue,
    def: Option<&TermDefinition>,
    ctx: &Context,
) -> Result<Vec<JsonValue>> {
    let mapping = def.and_then(|d| d.type_mapping.as_ref());
    match value {
        JsonValue::Null => Ok(Vec::new()),
        JsonValue::Bool(_) | JsonValue::Number(_) => {
            let mut obj = Map::new();
            obj.insert("@value".to_string(), value.clone());
            if let Some(TypeMapping::Datatype(dt)) = mapping {
                obj.insert("@type".to_string(), json!(expand_datatype(dt, ctx)));
            }
            Ok(vec![JsonValue::Object(obj)])
        }
        JsonValue::String(s) => Ok(vec![match mapping {
            Some(TypeMapping::Id) => {
                json!({ "@id": ctx.expand_iri(s, false).unwrap_or_else(|| s.clone()) })
            }
            Some(TypeMapping::Vocab) => {
                json!({ "@id": ctx.expand_iri(s, true).unwrap_or_else(|| s.clone()) })
            }
            Some(TypeMapping::Datatype(dt)) => {
                json!({ "@value": s, "@type": expand_datatype(dt, ctx) })
            }
            None => match &ctx.language {
                Some(lang) => json!({ "@value": s, "@language": lang }),
                None => json!({ "@value": s }),
            },
        }]),
        JsonValue::Array(items) => {
            let mut out = Vec::new();
            for item in items {
                out.extend(expand_value(item, def, ctx)?);
            }
            Ok(out)
        }
        JsonValue::Object(map) => {
            if let Some(literal) = map.get("@value") {
                return expand_value_object(literal, map, ctx).map(|v| vec![v]);
            }
            if let Some(items) = map.get("@list") {
                let inner = TermDefinition {
                    list_container: false,
                    ..def.cloned().unwrap_or_default()
                };
                return Ok(vec![json!({ "@list": expand_value(items, Some(&inner), ctx)? })]);
            }
            if let Some(items) = map.get("@set") {
                return expand_value(items, def, ctx);
            }
            Ok(vec![expand_node(map, ctx)?])
        }
    }
}

fn expand_value_object(
    literal: &JsonValue,
    map: &Map<String, JsonValue>,
    ctx: &Context,
) -> Result<JsonValue> {
    if literal.is_object() || literal.is_array() {
        return Err(JsonLdError::InvalidValue(literal.to_string()));
    }
    let mut obj = Map::new();
    obj.insert("@value".to_string(), literal.clone());
    if let Some(dt) = map.get("@type").and_then(JsonValue::as_str) {
        obj.insert("@type".to_string(), json!(expand_datatype(dt, ctx)));
    } else if let Some(lang) = map.get("@language").and_then(JsonValue::as_str) {
        obj.insert("@language".to_string(), json!(lang));
    }
    Ok(JsonValue::Object(obj))
}

fn expand_datatype(datatype: &str, ctx: &Context) -> String {
    ctx.expand_iri(datatype, true)
        .unwrap_or_else(|| datatype.to_string())
}

// ---------------------------------------------------------------------------
// Flattening
// ---------------------------------------------------------------------------

/// Flatten expanded node objects into a node array. Nested nodes become
/// top-level nodes referenced by id; nodes without an id get blank labels.
/// Blank labels are renumbered `_:b0`, `_:b1`, ... in document order.
pub fn flatten(expanded: &JsonValue) -> Result<JsonValue> {
    flatten_with(expanded, BlankLabels::unscoped())
}

/// [`flatten`] with blank labels drawn from `labels`.
pub fn flatten_with(expanded: &JsonValue, labels: BlankLabels) -> Result<JsonValue> {
    let mut flattener = Flattener {
        nodes: IndexMap::new(),
        labels,
    };
    match expanded {
        JsonValue::Array(items) => {
            for item in items {
                flattener.flatten_element(item)?;
            }
        }
        other => {
            flattener.flatten_element(other)?;
        }
    }
    Ok(JsonValue::Array(
        flattener.nodes.into_values().map(JsonValue::Object).collect(),
    ))
}

struct Flattener {
    nodes: IndexMap<String, Map<String, JsonValue>>,
    labels: BlankLabels,
}

impl Flattener {
    fn relabel(&mut self, id: &str) -> String {
        if iri::is_blank(id) {
            self.labels.relabel(id)
        } else {
            id.to_string()
        }
    }

    fn flatten_element(&mut self, element: &JsonValue) -> Result<()> {
        match element {
            JsonValue::Object(map) if !map.contains_key("@value") && !map.contains_key("@list") => {
                self.flatten_node(map)?;
                Ok(())
            }
            JsonValue::Array(items) => items.iter().try_for_each(|i| self.flatten_element(i)),
            _ => Ok(()),
        }
    }

    fn flatten_node(&mut self, map: &Map<String, JsonValue>) -> Result<String> {
        let id = match map.get("@id") {
            Some(JsonValue::String(id)) => self.relabel(id),
            Some(other) => return Err(JsonLdError::InvalidId(other.to_string())),
            None => self.labels.fresh(),
        };

        // Reserve the slot first so nodes keep document order.
        self.nodes.entry(id.clone()).or_insert_with(|| {
            let mut m = Map::new();
            m.insert("@id".to_string(), json!(id));
            m
        });

        let mut properties: Vec<(String, Vec<JsonValue>)> = Vec::new();
        for (key, value) in map {
            if key.starts_with('@') {
                continue;
            }
            let items = match value {
                JsonValue::Array(items) => items.as_slice(),
                single => std::slice::from_ref(single),
            };
            let mut flattened = Vec::with_capacity(items.len());
            for item in items {
                flattened.push(self.flatten_value(item)?);
            }
            properties.push((key.clone(), flattened));
        }

        let Some(entry) = self.nodes.get_mut(&id) else {
            return Ok(id);
        };
        if let Some(JsonValue::Array(types)) = map.get("@type") {
            let existing = entry
                .entry("@type")
                .or_insert_with(|| JsonValue::Array(Vec::new()));
            if let JsonValue::Array(existing) = existing {
                for t in types {
                    if !existing.contains(t) {
                        existing.push(t.clone());
                    }
                }
            }
        }
        for (key, values) in properties {
            match entry.get_mut(&key) {
                Some(JsonValue::Array(existing)) => existing.extend(values),
                _ => {
                    entry.insert(key, JsonValue::Array(values));
                }
            }
        }
        Ok(id)
    }

    fn flatten_value(&mut self, value: &JsonValue) -> Result<JsonValue> {
        let JsonValue::Object(map) = value else {
            return Err(JsonLdError::InvalidValue(value.to_string()));
        };
        if map.contains_key("@value") {
            return Ok(value.clone());
        }
        if let Some(items) = map.get("@list") {
            let items = match items {
                JsonValue::Array(items) => items.as_slice(),
                single => std::slice::from_ref(single),
            };
            let mut flattened = Vec::with_capacity(items.len());
            for item in items {
                flattened.push(self.flatten_value(item)?);
            }
            return Ok(json!({ "@list": flattened }));
        }
        let is_reference = map.len() == 1 && map.contains_key("@id");
        if is_reference {
            let id = map
                .get("@id")
                .and_then(JsonValue::as_str)
                .ok_or_else(|| JsonLdError::InvalidId(value.to_string()))?;
            return Ok(json!({ "@id": self.relabel(id) }));
        }
        let id = self.flatten_node(map)?;
        Ok(json!({ "@id": id }))
    }
}

/// Convert flattener output into nodes. Accepts both a node array and an
/// object carrying an `@graph` node array.
pub fn nodes_from_flattened(flattened: JsonValue) -> Result<Vec<Node>> {
    let items = match flattened {
        JsonValue::Array(items) => items,
        JsonValue::Object(mut map) => match map.remove("@graph") {
            Some(JsonValue::Array(items)) => items,
            _ => return Err(JsonLdError::UnexpectedShape),
        },
        _ => return Err(JsonLdError::UnexpectedShape),
    };
    items
        .into_iter()
        .map(|item| serde_json::from_value(item).map_err(|e| JsonLdError::Json(e.to_string())))
        .collect()
}

/// Expand, flatten and convert a parsed JSON-LD document. Blank labels are
/// scoped to the document content, see [`BlankLabels::for_content`].
pub fn document_to_nodes(document: &JsonValue) -> Result<Vec<Node>> {
    let content = serde_json::to_vec(document).map_err(|e| JsonLdError::Json(e.to_string()))?;
    let labels = BlankLabels::for_content(&content);
    nodes_from_flattened(flatten_with(&expand(document)?, labels)?)
}

/// Parse JSON-LD text and convert it to nodes.
pub fn text_to_nodes(text: &str) -> Result<Vec<Node>> {
    let document: JsonValue =
        serde_json::from_str(text).map_err(|e| JsonLdError::Json(e.to_string()))?;
    document_to_nodes(&document)
}
