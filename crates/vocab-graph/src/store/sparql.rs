//! SPARQL-targeted restrictions and the query evaluator seam.
//!
//! A shape whose `sh:target` is typed with a `sh:SPARQLTargetType` applies
//! only when that type's `sh:select` query matches the caller's document.

use std::collections::{HashMap, HashSet};

use async_trait::async_trait;
use futures::future::join_all;
use once_cell::sync::Lazy;
use oxigraph::model::{BlankNode, GraphName, Literal as RdfLiteral, NamedNode, Quad, Term};
use oxigraph::sparql::QueryResults;
use oxigraph::store::Store;
use regex::{Captures, Regex};
use serde_json::Value as JsonValue;
use tracing::{debug, instrument, warn};

use super::restriction::Restriction;
use super::VocabStore;
use crate::error::QueryError;
use crate::ingest::jsonld;
use crate::model::iri::{self, BLANK_PREFIX};
use crate::model::ontology::{sh, standard};
use crate::model::{Node, NodeValue};

/// Evaluates a SPARQL query against a JSON-LD document.
#[async_trait]
pub trait QueryEvaluator: Send + Sync {
    /// Whether `query` matches `document`: an ASK answers true, a SELECT has a
    /// solution, a CONSTRUCT/DESCRIBE produces a triple.
    async fn matches(&self, document: &JsonValue, query: &str) -> Result<bool, QueryError>;
}

/// Loads the document into an in-memory oxigraph store and runs the query
/// there, on a blocking thread.
#[derive(Debug, Default, Clone, Copy)]
pub struct OxigraphEvaluator;

#[async_trait]
impl QueryEvaluator for OxigraphEvaluator {
    async fn matches(&self, document: &JsonValue, query: &str) -> Result<bool, QueryError> {
        let document = document.clone();
        let query = query.to_string();
        tokio::task::spawn_blocking(move || evaluate(&document, &query))
            .await
            .map_err(|e| QueryError::Join(e.to_string()))?
    }
}

/// Synchronous evaluation used by [`OxigraphEvaluator`].
pub fn evaluate(document: &JsonValue, query: &str) -> Result<bool, QueryError> {
    let store = document_store(document)?;
    #[allow(deprecated)]
    let results = store
        .query(query)
        .map_err(|e| QueryError::Evaluation(e.to_string()))?;
    let first = |item: Option<Result<(), String>>| match item {
        None => Ok(false),
        Some(Ok(())) => Ok(true),
        Some(Err(e)) => Err(QueryError::Evaluation(e)),
    };
    match results {
        QueryResults::Boolean(b) => Ok(b),
        QueryResults::Solutions(mut solutions) => {
            first(solutions.next().map(|r| r.map(|_| ()).map_err(|e| e.to_string())))
        }
        QueryResults::Graph(mut triples) => {
            first(triples.next().map(|r| r.map(|_| ()).map_err(|e| e.to_string())))
        }
    }
}

/// Load a JSON-LD document into a fresh in-memory store.
pub fn document_store(document: &JsonValue) -> Result<Store, QueryError> {
    let nodes =
        jsonld::document_to_nodes(document).map_err(|e| QueryError::Document(e.to_string()))?;
    let store = Store::new().map_err(|e| QueryError::Store(e.to_string()))?;
    let mut loader = QuadLoader { store: &store };
    for node in &nodes {
        loader.insert_node(node)?;
    }
    Ok(store)
}

struct QuadLoader<'a> {
    store: &'a Store,
}

impl QuadLoader<'_> {
    fn insert_node(&mut self, node: &Node) -> Result<(), QueryError> {
        for type_iri in &node.types {
            if let Ok(object) = NamedNode::new(type_iri.as_str()) {
                self.insert(&node.id, standard::RDF_TYPE, object.into())?;
            }
        }
        for (property, values) in &node.properties {
            for value in values {
                if let Some(object) = self.object_term(value)? {
                    self.insert(&node.id, property, object)?;
                }
            }
        }
        Ok(())
    }

    fn object_term(&mut self, value: &NodeValue) -> Result<Option<Term>, QueryError> {
        Ok(match value {
            NodeValue::Reference(id) => resource_term(id),
            NodeValue::Embedded(node) => {
                self.insert_node(node)?;
                resource_term(&node.id)
            }
            NodeValue::Literal(lit) => {
                let literal = match (&lit.language, &lit.datatype) {
                    (Some(lang), _) => {
                        RdfLiteral::new_language_tagged_literal(lit.value.as_str(), lang.as_str())
                            .ok()
                    }
                    (None, Some(dt)) => NamedNode::new(dt.as_str())
                        .ok()
                        .map(|dt| RdfLiteral::new_typed_literal(lit.value.as_str(), dt)),
                    (None, None) => Some(RdfLiteral::new_simple_literal(lit.value.as_str())),
                };
                literal.map(Term::from)
            }
            NodeValue::List(items) => Some(self.insert_list(items)?),
        })
    }

    /// Encode a list as an `rdf:first` / `rdf:rest` chain; returns its head.
    fn insert_list(&mut self, items: &[NodeValue]) -> Result<Term, QueryError> {
        let mut head: Term = NamedNode::new_unchecked(standard::RDF_NIL).into();
        for item in items.iter().rev() {
            let cell = BlankNode::default();
            let cell_id = format!("{BLANK_PREFIX}{}", cell.as_str());
            if let Some(object) = self.object_term(item)? {
                self.insert(&cell_id, standard::RDF_FIRST, object)?;
            }
            self.insert(&cell_id, standard::RDF_REST, head)?;
            head = cell.into();
        }
        Ok(head)
    }

    fn insert(&mut self, subject: &str, predicate: &str, object: Term) -> Result<(), QueryError> {
        let Ok(predicate) = NamedNode::new(predicate) else {
            debug!(%predicate, "skipping triple with non-IRI predicate");
            return Ok(());
        };
        let quad = match subject.strip_prefix(BLANK_PREFIX) {
            Some(label) => match BlankNode::new(label) {
                Ok(s) => Quad::new(s, predicate, object, GraphName::DefaultGraph),
                Err(_) => return Ok(()),
            },
            None => match NamedNode::new(subject) {
                Ok(s) => Quad::new(s, predicate, object, GraphName::DefaultGraph),
                Err(_) => {
                    debug!(%subject, "skipping triple with non-IRI subject");
                    return Ok(());
                }
            },
        };
        self.store
            .insert(&quad)
            .map_err(|e| QueryError::Store(e.to_string()))?;
        Ok(())
    }
}

fn resource_term(id: &str) -> Option<Term> {
    match id.strip_prefix(BLANK_PREFIX) {
        Some(label) => BlankNode::new(label).ok().map(Term::from),
        None => NamedNode::new(id).ok().map(Term::from),
    }
}

static PARAMETER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$([A-Za-z_][A-Za-z0-9_]*)").expect("parameter pattern is valid"));

/// Replace `$name` tokens whose name is a key of `params` with `<iri>`.
/// Other `$` variables are left for the query engine.
pub fn substitute_parameters(query: &str, params: &HashMap<String, String>) -> String {
    PARAMETER
        .replace_all(query, |caps: &Captures| match params.get(&caps[1]) {
            Some(iri) => format!("<{iri}>"),
            None => caps[0].to_string(),
        })
        .into_owned()
}

/// A shape paired with the rewritten query deciding whether it applies.
#[derive(Debug, Clone)]
pub struct SparqlShape {
    pub shape: Node,
    pub query: String,
}

/// A shape whose query could not be evaluated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeFailure {
    pub shape_id: String,
    pub message: String,
}

/// Result of [`VocabStore::sparql_restrictions_for_types`]. Shapes whose
/// evaluation failed are excluded from `restrictions` and listed in `failures`.
#[derive(Debug, Clone, Default)]
pub struct SparqlRestrictions {
    pub restrictions: Vec<Restriction>,
    pub failures: Vec<ShapeFailure>,
}

impl VocabStore {
    /// Shapes carrying a SPARQL target, with their parameterized queries.
    ///
    /// Candidates are all restriction nodes plus the nodes named in
    /// `extra_ids`. The first `sh:target` value must be a node whose first type
    /// carries `sh:select`; reference-valued properties of that target node
    /// become query parameters named by their local name.
    pub fn sparql_shapes<E: AsRef<str>>(&self, extra_ids: &[E]) -> Vec<SparqlShape> {
        let mut seen = HashSet::new();
        let mut candidates = self.restriction_nodes();
        candidates.extend(
            extra_ids
                .iter()
                .filter_map(|id| self.get_node(id.as_ref()))
                .map(|n| n.into_owned()),
        );

        let prefixes: String = self
            .options
            .sparql_prefixes
            .iter()
            .map(|p| format!("PREFIX {}: <{}>\n", p.prefix, p.namespace))
            .collect();

        candidates
            .into_iter()
            .filter(|n| n.has_property(sh::TARGET) && seen.insert(n.id.clone()))
            .filter_map(|candidate| {
                let shape = self.replace_blank_nodes_in(&candidate);
                let target = match shape.values(sh::TARGET).first()? {
                    NodeValue::Embedded(node) => (**node).clone(),
                    NodeValue::Reference(id) => self.get_any_node(id)?.clone(),
                    _ => return None,
                };
                let target_type = self.get_node(target.types.first()?)?;
                let select = target_type.first_literal(sh::SELECT)?;
                let params: HashMap<String, String> = target
                    .properties
                    .iter()
                    .filter_map(|(k, values)| {
                        let id = values.first()?.as_id()?;
                        Some((iri::local_name(k).to_string(), id.to_string()))
                    })
                    .collect();
                let query = format!("{prefixes}{}", substitute_parameters(&select.value, &params));
                Some(SparqlShape { shape, query })
            })
            .collect()
    }

    /// Restrictions of SPARQL-targeted shapes whose query matches `document`.
    ///
    /// Every query runs concurrently and the call returns once all have
    /// finished. A failing evaluation excludes its shape, is logged, and is
    /// reported in [`SparqlRestrictions::failures`]; it never aborts the
    /// others. `type_ids` does not narrow the candidates: the target query
    /// alone decides applicability. A null document yields no restrictions.
    #[instrument(skip_all, fields(types = type_ids.len()))]
    pub async fn sparql_restrictions_for_types<S: AsRef<str>, E: AsRef<str>>(
        &self,
        type_ids: &[S],
        extra_ids: &[E],
        document: &JsonValue,
        evaluator: &dyn QueryEvaluator,
    ) -> SparqlRestrictions {
        if document.is_null() {
            return SparqlRestrictions::default();
        }
        let shapes = self.sparql_shapes(extra_ids);
        let outcomes = join_all(shapes.iter().map(|s| evaluator.matches(document, &s.query))).await;

        let mut matched = Vec::new();
        let mut failures = Vec::new();
        for (shape, outcome) in shapes.into_iter().zip(outcomes) {
            match outcome {
                Ok(true) => matched.push(shape.shape),
                Ok(false) => debug!(shape = %shape.shape.id, "SPARQL target did not match"),
                Err(e) => {
                    warn!(shape = %shape.shape.id, error = %e, "SPARQL target evaluation failed; shape excluded");
                    failures.push(ShapeFailure {
                        shape_id: shape.shape.id,
                        message: e.to_string(),
                    });
                }
            }
        }

        SparqlRestrictions {
            restrictions: self.make_restrictions(&matched),
            failures,
        }
    }
}
