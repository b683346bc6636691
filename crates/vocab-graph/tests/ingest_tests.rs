use serde_json::json;
use vocab_graph::ingest::blank::document_scope;
use vocab_graph::ingest::jsonld::{self, expand, flatten, Context};
use vocab_graph::ingest::loader::{detect_and_parse, default_adapters, parse_as};
use vocab_graph::ingest::turtle::turtle_to_nodes;
use vocab_graph::model::ontology::standard;
use vocab_graph::{Format, Literal, NodeValue, RawDocument};

// ---------------------------------------------------------------------------
// JSON-LD
// ---------------------------------------------------------------------------

#[test]
fn context_expands_prefixes_vocab_and_terms() {
    let ctx = Context::default()
        .merged(&json!({
            "@vocab": "http://schema.org/",
            "ex": "http://example.org/",
            "knows": {"@id": "ex:knows", "@type": "@id"}
        }))
        .unwrap();
    assert_eq!(ctx.expand_iri("ex:Dog", true).as_deref(), Some("http://example.org/Dog"));
    assert_eq!(ctx.expand_iri("name", true).as_deref(), Some("http://schema.org/name"));
    assert_eq!(ctx.expand_iri("knows", true).as_deref(), Some("http://example.org/knows"));
    assert_eq!(
        ctx.expand_iri("http://other.org/x", true).as_deref(),
        Some("http://other.org/x")
    );
}

#[test]
fn terms_without_a_vocab_are_dropped() {
    let doc = json!({
        "@context": {"ex": "http://example.org/"},
        "@id": "ex:a",
        "unmapped": "value",
        "ex:kept": "value"
    });
    let nodes = jsonld::document_to_nodes(&doc).unwrap();
    assert_eq!(nodes.len(), 1);
    let keys: Vec<&String> = nodes[0].properties.keys().collect();
    assert_eq!(keys, ["http://example.org/kept"]);
}

#[test]
fn nested_nodes_are_flattened_with_blank_labels() {
    let doc = json!({
        "@context": {"ex": "http://example.org/"},
        "@id": "ex:shape",
        "ex:property": [
            {"ex:path": {"@id": "ex:name"}},
            {"ex:path": {"@id": "ex:age"}}
        ]
    });
    let nodes = jsonld::nodes_from_flattened(flatten(&expand(&doc).unwrap()).unwrap()).unwrap();
    let ids: Vec<&str> = nodes.iter().map(|n| n.id.as_str()).collect();
    assert_eq!(ids, ["http://example.org/shape", "_:b0", "_:b1"]);
    assert_eq!(
        nodes[0].values("http://example.org/property"),
        [NodeValue::reference("_:b0"), NodeValue::reference("_:b1")]
    );
}

#[test]
fn document_blank_labels_are_scoped_to_content() {
    let dog = json!({
        "@context": {"ex": "http://example.org/"},
        "@id": "ex:DogShape",
        "ex:property": {"ex:path": {"@id": "ex:name"}}
    });
    let cat = json!({
        "@context": {"ex": "http://example.org/"},
        "@id": "ex:CatShape",
        "ex:property": {"ex:path": {"@id": "ex:whiskers"}}
    });
    let scope = document_scope(&serde_json::to_vec(&dog).unwrap());

    let first = jsonld::document_to_nodes(&dog).unwrap();
    assert_eq!(first[1].id, format!("_:{scope}-b0"));
    assert_eq!(jsonld::document_to_nodes(&dog).unwrap(), first);

    let other = jsonld::document_to_nodes(&cat).unwrap();
    assert!(other[1].id.starts_with("_:"));
    assert_ne!(other[1].id, first[1].id);
}

#[test]
fn typed_coercion_lists_and_scalars() {
    let doc = json!({
        "@context": {
            "ex": "http://example.org/",
            "xsd": "http://www.w3.org/2001/XMLSchema#",
            "steps": {"@id": "ex:steps", "@container": "@list", "@type": "@id"},
            "born": {"@id": "ex:born", "@type": "xsd:date"}
        },
        "@id": "ex:a",
        "steps": ["ex:one", "ex:two"],
        "born": "2020-01-01",
        "ex:count": 3,
        "ex:ratio": 0.5,
        "ex:title": {"@value": "Titel", "@language": "de"}
    });
    let node = jsonld::document_to_nodes(&doc).unwrap().remove(0);
    assert_eq!(
        node.values("http://example.org/steps"),
        [NodeValue::List(vec![
            NodeValue::reference("http://example.org/one"),
            NodeValue::reference("http://example.org/two"),
        ])]
    );
    assert_eq!(
        node.first_literal("http://example.org/born"),
        Some(&Literal::typed("2020-01-01", "http://www.w3.org/2001/XMLSchema#date"))
    );
    assert_eq!(
        node.first_literal("http://example.org/count"),
        Some(&Literal::typed("3", standard::XSD_INTEGER))
    );
    assert_eq!(
        node.first_literal("http://example.org/ratio"),
        Some(&Literal::typed("0.5", standard::XSD_DOUBLE))
    );
    assert_eq!(
        node.first_literal("http://example.org/title"),
        Some(&Literal::lang("Titel", "de"))
    );
}

#[test]
fn repeated_subjects_merge_during_flattening() {
    let doc = json!([
        {"@id": "http://example.org/a", "@type": "http://example.org/T1",
         "http://example.org/p": "1"},
        {"@id": "http://example.org/a", "@type": ["http://example.org/T1", "http://example.org/T2"],
         "http://example.org/p": "2"}
    ]);
    let flattened = flatten(&expand(&doc).unwrap()).unwrap();
    let nodes = jsonld::nodes_from_flattened(flattened).unwrap();
    assert_eq!(nodes.len(), 1);
    assert_eq!(nodes[0].types, ["http://example.org/T1", "http://example.org/T2"]);
    assert_eq!(nodes[0].values("http://example.org/p").len(), 2);
}

#[test]
fn node_arrays_inside_graph_objects_are_accepted() {
    let nodes = jsonld::nodes_from_flattened(json!({
        "@graph": [{"@id": "http://example.org/a"}]
    }))
    .unwrap();
    assert_eq!(nodes[0].id, "http://example.org/a");
    assert!(jsonld::nodes_from_flattened(json!("nope")).is_err());
}

#[test]
fn invalid_json_text_is_an_error() {
    assert!(jsonld::text_to_nodes("{ not json").is_err());
    assert!(jsonld::document_to_nodes(&json!(42)).is_err());
}

// ---------------------------------------------------------------------------
// Turtle
// ---------------------------------------------------------------------------

#[test]
fn turtle_groups_triples_by_subject() {
    let text = std::fs::read_to_string(
        std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures/vehicles.ttl"),
    )
    .unwrap();
    let nodes = turtle_to_nodes(&text).unwrap();

    let vehicle = nodes.iter().find(|n| n.id == "http://example.org/Vehicle").unwrap();
    assert_eq!(vehicle.types, [standard::RDFS.to_string() + "Class"]);
    assert_eq!(
        vehicle.first_literal(standard::RDFS_LABEL),
        Some(&Literal::lang("Vehicle", "en"))
    );

    let wheels = nodes.iter().find(|n| n.id == "http://example.org/wheels").unwrap();
    assert_eq!(
        wheels.first_literal("http://example.org/defaultCount"),
        Some(&Literal::typed("4", standard::XSD_INTEGER))
    );
    let detail = wheels.first_reference("http://example.org/detail").unwrap();
    assert!(detail.starts_with("_:"));
    assert!(nodes.iter().any(|n| n.id == detail));
}

#[test]
fn turtle_anonymous_nodes_get_stable_labels() {
    let text = "@prefix sh: <http://www.w3.org/ns/shacl#> .\n\
        @prefix ex: <http://example.org/> .\n\
        ex:DogShape a sh:NodeShape ;\n\
            sh:property [ sh:path ex:name ; sh:minCount 1 ] ,\n\
                        [ sh:path ex:age ] .\n";
    let first = turtle_to_nodes(text).unwrap();
    let second = turtle_to_nodes(text).unwrap();
    assert_eq!(first, second);

    let scope = document_scope(text.as_bytes());
    let blanks: Vec<&str> = first
        .iter()
        .map(|n| n.id.as_str())
        .filter(|id| id.starts_with("_:"))
        .collect();
    assert_eq!(blanks.len(), 2);
    assert!(blanks.iter().all(|id| id.starts_with(&format!("_:{scope}-b"))));
}

#[test]
fn turtle_syntax_errors_are_reported() {
    assert!(turtle_to_nodes("<http://example.org/a> <http://example.org/p> .").is_err());
}

// ---------------------------------------------------------------------------
// Loader
// ---------------------------------------------------------------------------

#[test]
fn media_types_and_short_names_parse() {
    assert_eq!("application/ld+json".parse::<Format>().unwrap(), Format::JsonLd);
    assert_eq!("TTL".parse::<Format>().unwrap(), Format::Turtle);
    assert!("text/html".parse::<Format>().is_err());
    assert_eq!(Format::Turtle.to_string(), "text/turtle");
}

#[test]
fn detection_reports_the_winning_format() {
    let raw = RawDocument::from("<http://example.org/a> <http://example.org/p> \"x\" .");
    let (format, nodes) = detect_and_parse(&raw, &default_adapters()).unwrap();
    assert_eq!(format, Format::Turtle);
    assert_eq!(nodes.len(), 1);

    let json = RawDocument::from(json!({"@id": "http://example.org/a"}));
    assert!(parse_as(&json, Format::Turtle).is_err());
    assert_eq!(parse_as(&json, Format::JsonLd).unwrap().len(), 1);
}
