pub mod iri;
pub mod node;
pub mod ontology;

pub use node::{Literal, Node, NodeValue};
