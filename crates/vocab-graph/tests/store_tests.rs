use std::path::PathBuf;

use serde_json::json;
use vocab_graph::error::IngestError;
use vocab_graph::model::ontology::standard;
use vocab_graph::{Format, Node, NodeValue, StoreOptions, VocabStore};

fn fixture(name: &str) -> String {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name);
    std::fs::read_to_string(path).expect("fixture")
}

fn ex(local: &str) -> String {
    format!("http://example.org/{local}")
}

#[test]
fn loads_jsonld_text_by_detection() {
    let mut store = VocabStore::default();
    let count = store
        .add_vocabulary("animals", fixture("animals.jsonld"), None)
        .unwrap();
    assert_eq!(count, 18);
    assert_eq!(store.vocabulary_names().collect::<Vec<_>>(), ["animals"]);
    let dog = store.get_node(&ex("Dog")).unwrap();
    assert_eq!(dog.label(), "Dog");
    assert_eq!(dog.first_reference(standard::RDFS_SUBCLASS_OF), Some(ex("Animal").as_str()));
}

#[test]
fn loads_turtle_by_detection_after_jsonld_fails() {
    let mut store = VocabStore::default();
    store
        .add_vocabulary("vehicles", fixture("vehicles.ttl"), None)
        .unwrap();
    assert!(store.get_node(&ex("Car")).is_some());
    assert_eq!(
        store.super_classes(&ex("Car")),
        [ex("Car"), ex("Vehicle")]
    );
}

#[test]
fn loads_already_parsed_json() {
    let mut store = VocabStore::default();
    let doc = json!({
        "@context": {"ex": "http://example.org/"},
        "@id": "ex:Solo",
        "ex:flag": true
    });
    store.add_vocabulary("solo", doc, Some(Format::JsonLd)).unwrap();
    let solo = store.get_node(&ex("Solo")).unwrap();
    let flag = solo.first_literal(&ex("flag")).unwrap();
    assert_eq!(flag.value, "true");
    assert_eq!(flag.datatype.as_deref(), Some(standard::XSD_BOOLEAN));
}

#[test]
fn unparseable_document_reports_every_attempt_in_order() {
    let mut store = VocabStore::default();
    let err = store
        .add_vocabulary("broken", "this is { not a vocabulary", None)
        .unwrap_err();
    match err {
        IngestError::UnsupportedFormat { attempts } => {
            let formats: Vec<Format> = attempts.iter().map(|a| a.format).collect();
            assert_eq!(formats, [Format::JsonLd, Format::Turtle]);
            assert!(attempts.iter().all(|a| !a.message.is_empty()));
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(store.vocabulary("broken").is_none());
}

#[test]
fn format_order_is_configurable() {
    let options = StoreOptions {
        format_order: vec![Format::Turtle],
        ..StoreOptions::default()
    };
    let mut store = VocabStore::new(options);
    let err = store
        .add_vocabulary("animals", fixture("animals.jsonld"), None)
        .unwrap_err();
    let IngestError::UnsupportedFormat { attempts } = err else {
        panic!("expected UnsupportedFormat");
    };
    assert_eq!(attempts.len(), 1);
    assert_eq!(attempts[0].format, Format::Turtle);
}

#[test]
fn explicit_format_failure_is_a_parse_error() {
    let mut store = VocabStore::default();
    let err = store
        .add_vocabulary("vehicles", fixture("vehicles.ttl"), Some(Format::JsonLd))
        .unwrap_err();
    assert!(matches!(err, IngestError::Parse { format: Format::JsonLd, .. }));
}

#[test]
fn unknown_media_type_is_rejected() {
    let mut store = VocabStore::default();
    let err = store
        .add_vocabulary_with_media_type("x", "{}", "application/rdf+xml")
        .unwrap_err();
    assert_eq!(err, IngestError::UnknownFormat("application/rdf+xml".into()));
    assert_eq!(err.to_string(), "format \"application/rdf+xml\" not supported");

    store
        .add_vocabulary_with_media_type("vehicles", fixture("vehicles.ttl"), "text/turtle")
        .unwrap();
    assert!(store.get_node(&ex("Vehicle")).is_some());
}

#[test]
fn adding_the_same_vocabulary_twice_is_idempotent() {
    let mut store = VocabStore::default();
    store.add_vocabulary("animals", fixture("animals.jsonld"), None).unwrap();
    let before: Vec<Node> = store.all_nodes().to_vec();
    store.add_vocabulary("animals", fixture("animals.jsonld"), None).unwrap();
    assert_eq!(store.all_nodes().to_vec(), before);
}

const PERSON_SHAPE_TTL: &str = "@prefix sh: <http://www.w3.org/ns/shacl#> .
@prefix ex: <http://example.org/> .

ex:PersonShape a sh:NodeShape ;
    sh:targetClass ex:Person ;
    sh:property [ sh:path ex:name ; sh:minCount 1 ] .
";

#[test]
fn adding_the_same_turtle_twice_is_idempotent() {
    let mut once = VocabStore::default();
    once.add_vocabulary("shapes", PERSON_SHAPE_TTL, Some(Format::Turtle)).unwrap();

    let mut twice = VocabStore::default();
    twice.add_vocabulary("shapes", PERSON_SHAPE_TTL, Some(Format::Turtle)).unwrap();
    twice.add_vocabulary("shapes", PERSON_SHAPE_TTL, Some(Format::Turtle)).unwrap();

    assert_eq!(once.all_nodes().len(), 2);
    assert_eq!(twice.all_nodes().to_vec(), once.all_nodes().to_vec());
}

#[test]
fn blank_nodes_of_different_documents_stay_apart() {
    let dog = json!({
        "@context": {"sh": "http://www.w3.org/ns/shacl#", "ex": "http://example.org/"},
        "@id": "ex:DogShape",
        "@type": "sh:NodeShape",
        "sh:property": {"sh:path": {"@id": "ex:name"}}
    });
    let cat = json!({
        "@context": {"sh": "http://www.w3.org/ns/shacl#", "ex": "http://example.org/"},
        "@id": "ex:CatShape",
        "@type": "sh:NodeShape",
        "sh:property": {"sh:path": {"@id": "ex:whiskers"}}
    });
    let mut store = VocabStore::default();
    store.add_vocabulary("shapes", dog, None).unwrap();
    store.add_vocabulary("shapes", cat, None).unwrap();

    assert_eq!(store.all_nodes().len(), 4);
}

#[test]
fn merge_overwrites_per_property() {
    let mut store = VocabStore::default();
    store.add_nodes(
        "v",
        vec![Node::new(ex("n"))
            .with_literal(ex("a"), "1")
            .with_literal(ex("b"), "2")],
    );
    store.add_nodes("v", vec![Node::new(ex("n")).with_literal(ex("b"), "3")]);

    let node = store.get_node(&ex("n")).unwrap();
    assert_eq!(node.values(&ex("a")), [NodeValue::literal("1")]);
    assert_eq!(node.values(&ex("b")), [NodeValue::literal("3")]);
}

#[test]
fn same_id_in_two_vocabularies_is_kept_twice() {
    let mut store = VocabStore::default();
    store.add_nodes("first", vec![Node::new(ex("n")).with_literal(ex("p"), "first")]);
    store.add_nodes("second", vec![Node::new(ex("n")).with_literal(ex("p"), "second")]);

    assert_eq!(store.all_nodes().len(), 2);
    assert_eq!(store.vocabulary_nodes("second").len(), 1);
    let first = store.get_any_node(&ex("n")).unwrap();
    assert_eq!(first.first_literal(&ex("p")).unwrap().value, "first");
}

#[test]
fn mutations_invalidate_memoized_queries() {
    let mut store = VocabStore::default();
    store.add_nodes(
        "v",
        vec![Node::new(ex("B")).with_ref(standard::RDFS_SUBCLASS_OF, ex("A"))],
    );
    assert_eq!(store.sub_classes(&ex("A")), [ex("A"), ex("B")]);
    let generation = store.generation();

    store.add_nodes(
        "w",
        vec![Node::new(ex("C")).with_ref(standard::RDFS_SUBCLASS_OF, ex("B"))],
    );
    assert!(store.generation() > generation);
    assert_eq!(store.sub_classes(&ex("A")), [ex("A"), ex("B"), ex("C")]);
    assert_eq!(store.super_classes(&ex("C")), [ex("C"), ex("B"), ex("A")]);

    store.remove_vocabulary("w");
    assert_eq!(store.sub_classes(&ex("A")), [ex("A"), ex("B")]);
    assert_eq!(store.super_classes(&ex("C")), [ex("C")]);
}

#[test]
fn repeated_queries_hit_the_memo() {
    let mut store = VocabStore::default();
    store.add_vocabulary("animals", fixture("animals.jsonld"), None).unwrap();

    store.super_classes(&ex("Puppy"));
    store.super_classes(&ex("Puppy"));
    let stats = store.cache_stats();
    assert_eq!(stats.generation, store.generation());
    assert!(stats.super_classes.hits >= 1);
    assert!(stats.super_classes.entries >= 1);

    store.invalidate();
    let stats = store.cache_stats();
    assert_eq!(stats.super_classes.entries, 0);
    assert_eq!(stats.all_nodes.entries, 0);
}

#[test]
fn namespace_lookup_and_restriction_nodes() {
    let mut store = VocabStore::default();
    store.add_vocabulary("animals", fixture("animals.jsonld"), None).unwrap();
    store.add_vocabulary("shapes", fixture("shapes.jsonld"), None).unwrap();

    let cat = store.get_node_in_namespace("http://example.org/", "Cat").unwrap();
    assert_eq!(cat.id, ex("Cat"));

    let shapes: Vec<String> = store.restriction_nodes().into_iter().map(|n| n.id).collect();
    assert_eq!(shapes, [ex("AnimalShape"), ex("DogShape"), ex("RexShape")]);
}
