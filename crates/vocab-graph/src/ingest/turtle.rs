//! Turtle to node conversion on top of the oxigraph parser.

use std::fmt::Display;

use indexmap::IndexMap;
use oxigraph::io::{RdfFormat, RdfParser};
use oxigraph::model::Term;

use super::blank::BlankLabels;
use crate::error::TurtleError;
use crate::model::iri::BLANK_PREFIX;
use crate::model::ontology::standard;
use crate::model::{Literal, Node, NodeValue};

/// Parse Turtle text and group its triples into nodes, one per subject, in
/// order of first appearance. `rdf:type` objects become node types.
///
/// Blank nodes, including anonymous `[ ... ]` ones, are relabelled in order of
/// first appearance under a scope taken from `text`.
pub fn turtle_to_nodes(text: &str) -> Result<Vec<Node>, TurtleError> {
    let mut nodes: IndexMap<String, Node> = IndexMap::new();
    let mut labels = BlankLabels::for_content(text.as_bytes());

    for quad in RdfParser::from_format(RdfFormat::Turtle).for_reader(text.as_bytes()) {
        let quad = quad.map_err(|e| TurtleError::Syntax(e.to_string()))?;
        let subject = term_id(&quad.subject, &mut labels);
        let predicate = quad.predicate.as_str();
        let node = nodes
            .entry(subject.clone())
            .or_insert_with(|| Node::new(subject));

        let Some(value) = term_value(&quad.object, &mut labels) else {
            continue;
        };
        if predicate == standard::RDF_TYPE {
            if let NodeValue::Reference(type_iri) = value {
                if !node.has_type(&type_iri) {
                    node.types.push(type_iri);
                }
                continue;
            }
        }
        node.properties
            .entry(predicate.to_string())
            .or_default()
            .push(value);
    }

    Ok(nodes.into_values().collect())
}

/// Id of a subject from its N-Triples display form (`<iri>` or `_:label`).
fn term_id(subject: &impl Display, labels: &mut BlankLabels) -> String {
    let rendered = subject.to_string();
    match rendered.strip_prefix('<').and_then(|s| s.strip_suffix('>')) {
        Some(iri) => iri.to_string(),
        None if rendered.starts_with(BLANK_PREFIX) => labels.relabel(&rendered),
        None => rendered,
    }
}

fn term_value(object: &Term, labels: &mut BlankLabels) -> Option<NodeValue> {
    match object {
        Term::NamedNode(n) => Some(NodeValue::Reference(n.as_str().to_string())),
        Term::BlankNode(b) => Some(NodeValue::Reference(
            labels.relabel(&format!("{BLANK_PREFIX}{}", b.as_str())),
        )),
        Term::Literal(l) => {
            let datatype = l.datatype().as_str();
            let literal = match l.language() {
                Some(lang) => Literal::lang(l.value(), lang),
                None if datatype == standard::XSD_STRING => Literal::new(l.value()),
                None => Literal::typed(l.value(), datatype),
            };
            Some(NodeValue::Literal(literal))
        }
        #[allow(unreachable_patterns)]
        _ => None,
    }
}
