use std::io::{self, Write};

use super::{escape_literal, Term, TriplesEmitter};
use crate::model::iri::escape_iri;
use crate::model::ontology::standard;

/// N-Triples format emitter. Streams triples as `<s> <p> <o> .` lines.
pub struct NTriplesEmitter<W: Write> {
    writer: W,
    count: u64,
}

impl<W: Write> NTriplesEmitter<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, count: 0 }
    }

    fn term(term: &Term) -> String {
        match term {
            Term::Iri(iri) => format!("<{}>", escape_iri(iri)),
            Term::Blank(label) => format!("_:{label}"),
            Term::Literal(lit) => {
                let value = escape_literal(&lit.value);
                match (&lit.language, &lit.datatype) {
                    (Some(lang), _) => format!("\"{value}\"@{lang}"),
                    (None, Some(dt)) if dt != standard::XSD_STRING => {
                        format!("\"{value}\"^^<{}>", escape_iri(dt))
                    }
                    _ => format!("\"{value}\""),
                }
            }
        }
    }
}

impl<W: Write> TriplesEmitter for NTriplesEmitter<W> {
    fn emit(&mut self, subject: &Term, predicate: &str, object: &Term) -> io::Result<()> {
        writeln!(
            self.writer,
            "{} <{}> {} .",
            Self::term(subject),
            escape_iri(predicate),
            Self::term(object)
        )?;
        self.count += 1;
        Ok(())
    }

    fn add_prefix(&mut self, _prefix: &str, _iri: &str) {
        // N-Triples has no prefixes.
    }

    fn flush(&mut self) -> io::Result<()> {
        self.writer.flush()
    }

    fn triple_count(&self) -> u64 {
        self.count
    }
}
