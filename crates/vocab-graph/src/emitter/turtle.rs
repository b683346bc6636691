use std::collections::BTreeMap;
use std::io::{self, Write};

use super::{escape_literal, Term, TriplesEmitter};
use crate::model::iri::escape_iri;
use crate::model::ontology::standard;

/// Turtle format emitter with prefix support.
///
/// Prefixes must be registered before the first triple; they are written
/// once, sorted, ahead of it.
pub struct TurtleEmitter<W: Write> {
    writer: W,
    count: u64,
    prefixes: BTreeMap<String, String>,
    prefix_written: bool,
}

impl<W: Write> TurtleEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            count: 0,
            prefixes: BTreeMap::new(),
            prefix_written: false,
        }
    }

    fn write_prefixes(&mut self) -> io::Result<()> {
        if self.prefix_written {
            return Ok(());
        }
        self.prefix_written = true;
        for (prefix, iri) in &self.prefixes {
            writeln!(self.writer, "@prefix {prefix}: <{}> .", escape_iri(iri))?;
        }
        if !self.prefixes.is_empty() {
            writeln!(self.writer)?;
        }
        Ok(())
    }

    /// Compact an IRI with the longest matching prefix, if the remaining
    /// local name is a plain identifier.
    fn compact_iri(&self, iri: &str) -> String {
        let best = self
            .prefixes
            .iter()
            .filter(|(_, ns)| iri.starts_with(ns.as_str()))
            .max_by_key(|(_, ns)| ns.len());
        if let Some((prefix, ns)) = best {
            let local = &iri[ns.len()..];
            if !local.is_empty() && local.chars().all(|c| c.is_alphanumeric() || c == '_') {
                return format!("{prefix}:{local}");
            }
        }
        format!("<{}>", escape_iri(iri))
    }

    fn term(&self, term: &Term) -> String {
        match term {
            Term::Iri(iri) => self.compact_iri(iri),
            Term::Blank(label) => format!("_:{label}"),
            Term::Literal(lit) => {
                let value = escape_literal(&lit.value);
                match (&lit.language, &lit.datatype) {
                    (Some(lang), _) => format!("\"{value}\"@{lang}"),
                    (None, Some(dt)) if dt != standard::XSD_STRING => {
                        format!("\"{value}\"^^{}", self.compact_iri(dt))
                    }
                    _ => format!("\"{value}\""),
                }
            }
        }
    }
}

impl<W: Write> TriplesEmitter for TurtleEmitter<W> {
    fn emit(&mut self, subject: &Term, predicate: &str, object: &Term) -> io::Result<()> {
        self.write_prefixes()?;
        let p = if predicate == standard::RDF_TYPE {
            "a".to_string()
        } else {
            self.compact_iri(predicate)
        };
        writeln!(self.writer, "{} {p} {} .", self.term(subject), self.term(object))?;
        self.count += 1;
        Ok(())
    }

    fn add_prefix(&mut self, prefix: &str, iri: &str) {
        self.prefixes.insert(prefix.to_string(), iri.to_string());
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn triple_count(&self) -> u64 {
        self.count
    }
}
