//! Serialize store nodes back out as RDF triples.

pub mod ntriples;
pub mod turtle;

use std::io;

use crate::model::iri::BLANK_PREFIX;
use crate::model::ontology::standard;
use crate::model::{Literal, Node, NodeValue};

/// Subject or object of an emitted triple.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Term {
    Iri(String),
    /// Blank node label, without the `_:` prefix.
    Blank(String),
    Literal(Literal),
}

impl Term {
    /// Term for a node id: blank when it starts with `_:`, an IRI otherwise.
    pub fn resource(id: &str) -> Term {
        match id.strip_prefix(BLANK_PREFIX) {
            Some(label) => Term::Blank(label.to_string()),
            None => Term::Iri(id.to_string()),
        }
    }
}

/// Writes triples in one serialization format.
pub trait TriplesEmitter {
    /// Emit one triple.
    fn emit(&mut self, subject: &Term, predicate: &str, object: &Term) -> io::Result<()>;
    /// Register a namespace prefix (used by Turtle format).
    fn add_prefix(&mut self, prefix: &str, iri: &str);
    /// Flush any buffered output.
    fn flush(&mut self) -> io::Result<()>;
    /// Return the number of triples emitted so far.
    fn triple_count(&self) -> u64;

    fn emit_iri(&mut self, subject: &str, predicate: &str, object: &str) -> io::Result<()> {
        self.emit(&Term::resource(subject), predicate, &Term::resource(object))
    }

    fn emit_literal(&mut self, subject: &str, predicate: &str, value: &str) -> io::Result<()> {
        self.emit(
            &Term::resource(subject),
            predicate,
            &Term::Literal(Literal::new(value)),
        )
    }
}

/// Emit every node: its types, then each property value in order.
///
/// Lists become `rdf:first` / `rdf:rest` chains over generated blank nodes;
/// embedded nodes are emitted after the triple that points at them.
pub fn emit_nodes(emitter: &mut dyn TriplesEmitter, nodes: &[Node]) -> io::Result<()> {
    let mut lists = 0usize;
    for node in nodes {
        emit_node(emitter, node, &mut lists)?;
    }
    Ok(())
}

fn emit_node(emitter: &mut dyn TriplesEmitter, node: &Node, lists: &mut usize) -> io::Result<()> {
    let subject = Term::resource(&node.id);
    for type_iri in &node.types {
        emitter.emit(&subject, standard::RDF_TYPE, &Term::Iri(type_iri.clone()))?;
    }
    for (property, values) in &node.properties {
        for value in values {
            let object = value_term(emitter, value, lists)?;
            emitter.emit(&subject, property, &object)?;
        }
    }
    Ok(())
}

fn value_term(
    emitter: &mut dyn TriplesEmitter,
    value: &NodeValue,
    lists: &mut usize,
) -> io::Result<Term> {
    match value {
        NodeValue::Reference(id) => Ok(Term::resource(id)),
        NodeValue::Literal(lit) => Ok(Term::Literal(lit.clone())),
        NodeValue::Embedded(node) => {
            emit_node(emitter, node, lists)?;
            Ok(Term::resource(&node.id))
        }
        NodeValue::List(items) => {
            let mut head = Term::Iri(standard::RDF_NIL.to_string());
            for item in items.iter().rev() {
                let cell = Term::Blank(format!("l{}", *lists));
                *lists += 1;
                let object = value_term(emitter, item, lists)?;
                emitter.emit(&cell, standard::RDF_FIRST, &object)?;
                emitter.emit(&cell, standard::RDF_REST, &head)?;
                head = cell;
            }
            Ok(head)
        }
    }
}

/// Escape a string for a quoted literal (N-Triples / Turtle `STRING_LITERAL_QUOTE`).
pub(crate) fn escape_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if (c as u32) < 0x20 => out.push_str(&format!("\\u{:04X}", c as u32)),
            _ => out.push(c),
        }
    }
    out
}
