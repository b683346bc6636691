//! RDF vocabulary constants used by the graph engine.
//!
//! - `rdf:` / `rdfs:` / `xsd:` / `owl:` -- W3C standard vocabularies
//! - `schema:` prefix (http://schema.org/) -- classes and properties the engine reasons about
//! - `sh:` prefix (http://www.w3.org/ns/shacl#) -- the shape subset used for restrictions

/// Standard RDF/RDFS/XSD/OWL namespace URIs
pub mod standard {
    pub const RDF: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#";
    pub const RDFS: &str = "http://www.w3.org/2000/01/rdf-schema#";
    pub const XSD: &str = "http://www.w3.org/2001/XMLSchema#";
    pub const OWL: &str = "http://www.w3.org/2002/07/owl#";

    pub const RDF_TYPE: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#type";
    pub const RDF_PROPERTY: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#Property";
    pub const RDF_FIRST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#first";
    pub const RDF_REST: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#rest";
    pub const RDF_NIL: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#nil";
    pub const RDF_LANG_STRING: &str = "http://www.w3.org/1999/02/22-rdf-syntax-ns#langString";

    pub const RDFS_LABEL: &str = "http://www.w3.org/2000/01/rdf-schema#label";
    pub const RDFS_COMMENT: &str = "http://www.w3.org/2000/01/rdf-schema#comment";
    pub const RDFS_SUBCLASS_OF: &str = "http://www.w3.org/2000/01/rdf-schema#subClassOf";
    pub const RDFS_DOMAIN: &str = "http://www.w3.org/2000/01/rdf-schema#domain";
    pub const RDFS_RANGE: &str = "http://www.w3.org/2000/01/rdf-schema#range";

    pub const OWL_OBJECT_PROPERTY: &str = "http://www.w3.org/2002/07/owl#ObjectProperty";
    pub const OWL_DATATYPE_PROPERTY: &str = "http://www.w3.org/2002/07/owl#DatatypeProperty";

    pub const XSD_STRING: &str = "http://www.w3.org/2001/XMLSchema#string";
    pub const XSD_BOOLEAN: &str = "http://www.w3.org/2001/XMLSchema#boolean";
    pub const XSD_INTEGER: &str = "http://www.w3.org/2001/XMLSchema#integer";
    pub const XSD_DOUBLE: &str = "http://www.w3.org/2001/XMLSchema#double";

    /// Node types that mark a node as a property definition.
    pub const PROPERTY_TYPES: [&str; 3] = [RDF_PROPERTY, OWL_OBJECT_PROPERTY, OWL_DATATYPE_PROPERTY];
}

/// schema.org (`schema:` prefix)
pub mod schema {
    pub const PREFIX: &str = "schema";
    pub const NS: &str = "http://schema.org/";

    // Classes
    pub const THING: &str = "http://schema.org/Thing";
    pub const ACTION: &str = "http://schema.org/Action";
    pub const ENUMERATION: &str = "http://schema.org/Enumeration";
    pub const PROPERTY_VALUE_SPECIFICATION: &str = "http://schema.org/PropertyValueSpecification";

    // Data types
    pub const DATA_TYPE: &str = "http://schema.org/DataType";
    pub const TEXT: &str = "http://schema.org/Text";
    pub const URL: &str = "http://schema.org/URL";
    pub const NUMBER: &str = "http://schema.org/Number";
    pub const INTEGER: &str = "http://schema.org/Integer";
    pub const FLOAT: &str = "http://schema.org/Float";
    pub const BOOLEAN: &str = "http://schema.org/Boolean";
    pub const DATE: &str = "http://schema.org/Date";
    pub const DATE_TIME: &str = "http://schema.org/DateTime";
    pub const TIME: &str = "http://schema.org/Time";

    // Properties
    pub const DOMAIN_INCLUDES: &str = "http://schema.org/domainIncludes";
    pub const RANGE_INCLUDES: &str = "http://schema.org/rangeIncludes";

    /// Classes whose instances are rendered as plain input values rather
    /// than nested nodes.
    pub const SPECIAL_TERMINALS: [&str; 10] = [
        DATA_TYPE, TEXT, URL, NUMBER, INTEGER, FLOAT, BOOLEAN, DATE, DATE_TIME, TIME,
    ];
}

/// SHACL (`sh:` prefix)
pub mod sh {
    pub const PREFIX: &str = "sh";
    pub const NS: &str = "http://www.w3.org/ns/shacl#";

    // Classes
    pub const NODE_SHAPE: &str = "http://www.w3.org/ns/shacl#NodeShape";
    pub const SPARQL_TARGET_TYPE: &str = "http://www.w3.org/ns/shacl#SPARQLTargetType";

    // Targets
    pub const TARGET: &str = "http://www.w3.org/ns/shacl#target";
    pub const TARGET_CLASS: &str = "http://www.w3.org/ns/shacl#targetClass";
    pub const TARGET_NODE: &str = "http://www.w3.org/ns/shacl#targetNode";
    pub const SELECT: &str = "http://www.w3.org/ns/shacl#select";

    // Property shapes
    pub const PROPERTY: &str = "http://www.w3.org/ns/shacl#property";
    pub const PATH: &str = "http://www.w3.org/ns/shacl#path";
    pub const MIN_COUNT: &str = "http://www.w3.org/ns/shacl#minCount";
    pub const MAX_COUNT: &str = "http://www.w3.org/ns/shacl#maxCount";
    pub const CLASS: &str = "http://www.w3.org/ns/shacl#class";
    pub const DATATYPE: &str = "http://www.w3.org/ns/shacl#datatype";
    pub const NODE_KIND: &str = "http://www.w3.org/ns/shacl#nodeKind";

    // Node kinds
    pub const IRI: &str = "http://www.w3.org/ns/shacl#IRI";
    pub const LITERAL: &str = "http://www.w3.org/ns/shacl#Literal";
    pub const BLANK_NODE: &str = "http://www.w3.org/ns/shacl#BlankNode";
    pub const BLANK_NODE_OR_IRI: &str = "http://www.w3.org/ns/shacl#BlankNodeOrIRI";
    pub const BLANK_NODE_OR_LITERAL: &str = "http://www.w3.org/ns/shacl#BlankNodeOrLiteral";
    pub const IRI_OR_LITERAL: &str = "http://www.w3.org/ns/shacl#IRIOrLiteral";

    /// Node types that mark a node as a restriction-bearing shape.
    pub const RESTRICTION_TYPES: [&str; 2] = [NODE_SHAPE, SPARQL_TARGET_TYPE];
}

/// Names of the vocabularies reserved for default (fetched) vocabularies.
pub mod reserved {
    pub const SCHEMA_VOCAB: &str = "schema";
    pub const WEBAPI_VOCAB: &str = "webapi";
}
