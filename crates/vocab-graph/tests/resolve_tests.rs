use std::path::PathBuf;

use serde_json::json;
use vocab_graph::model::ontology::{schema, standard};
use vocab_graph::{IoKind, Node, NodeValue, VocabStore};

fn animals() -> VocabStore {
    let path = PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join("animals.jsonld");
    let mut store = VocabStore::default();
    store
        .add_vocabulary("animals", std::fs::read_to_string(path).unwrap(), None)
        .unwrap();
    store
}

#[test]
fn io_node_is_a_suffixed_copy_with_text_range() {
    let store = animals();
    let input = store.get_node("http://schema.org/object-input").unwrap();

    assert_eq!(input.id, "http://schema.org/object-input");
    assert_eq!(input.label(), "object-input");
    assert_eq!(
        input.values(schema::RANGE_INCLUDES),
        [
            NodeValue::reference(schema::TEXT),
            NodeValue::reference(schema::PROPERTY_VALUE_SPECIFICATION),
        ]
    );
    assert_eq!(input.first_reference(schema::DOMAIN_INCLUDES), Some(schema::ACTION));

    let base = store.get_node("http://schema.org/object").unwrap();
    assert_eq!(base.first_reference(schema::RANGE_INCLUDES), Some(schema::THING));
}

#[test]
fn io_node_accepts_base_id_and_output_kind() {
    let store = animals();
    let output = store.io_node("http://schema.org/object", IoKind::Output).unwrap();
    assert_eq!(output.id, "http://schema.org/object-output");
    assert_eq!(
        IoKind::from_suffixed_id("http://schema.org/object-output"),
        Some(IoKind::Output)
    );
    assert!(store.get_node("http://schema.org/missing-input").is_none());
}

#[test]
fn blank_references_are_embedded() {
    let mut store = VocabStore::default();
    store.add_nodes(
        "v",
        vec![
            Node::new("http://example.org/shape").with_ref("http://example.org/p", "_:b0"),
            Node::new("_:b0").with_literal("http://example.org/q", "inner"),
        ],
    );
    let shape = store.get_node("http://example.org/shape").unwrap();
    let resolved = store.replace_blank_nodes_in(&shape);
    let inner = resolved.values("http://example.org/p")[0].as_embedded().unwrap();
    assert_eq!(inner.id, "_:b0");
    assert_eq!(inner.first_literal("http://example.org/q").unwrap().value, "inner");
}

#[test]
fn blank_node_cycles_terminate() {
    let mut store = VocabStore::default();
    store.add_nodes(
        "v",
        vec![
            Node::new("_:a").with_ref("http://example.org/next", "_:b"),
            Node::new("_:b").with_ref("http://example.org/next", "_:a"),
        ],
    );
    let resolved = store.replace_blank_nodes(&NodeValue::reference("_:a"));

    let a = resolved.as_embedded().unwrap();
    let b = a.values("http://example.org/next")[0].as_embedded().unwrap();
    assert_eq!(b.id, "_:b");
    assert_eq!(
        b.values("http://example.org/next"),
        [NodeValue::reference("_:a")]
    );
}

#[test]
fn unknown_blank_nodes_and_lists() {
    let mut store = VocabStore::default();
    store.add_nodes("v", vec![Node::new("_:known").with_literal(standard::RDFS_LABEL, "k")]);

    let value = NodeValue::List(vec![
        NodeValue::reference("_:known"),
        NodeValue::reference("_:unknown"),
        NodeValue::reference("http://example.org/named"),
    ]);
    let NodeValue::List(items) = store.replace_blank_nodes(&value) else {
        panic!("list expected");
    };
    assert_eq!(items[0].as_embedded().unwrap().label(), "k");
    assert_eq!(items[1], NodeValue::reference("_:unknown"));
    assert_eq!(items[2], NodeValue::reference("http://example.org/named"));
}

#[test]
fn enum_strings_become_references() {
    let store = animals();
    let payload = json!({
        "@type": "Dog",
        "size": "Small",
        "name": "Rex",
        "friends": [{"size": "Large"}],
        "tags": ["Small"]
    });
    let replaced = store.replace_enums(&payload);
    assert_eq!(
        replaced,
        json!({
            "@type": "Dog",
            "size": {"@id": "http://schema.org/Small"},
            "name": "Rex",
            "friends": [{"size": {"@id": "http://schema.org/Large"}}],
            "tags": ["Small"]
        })
    );
}

#[test]
fn enum_rewrite_uses_local_name_of_full_iris() {
    let store = animals();
    let replaced = store.replace_enums(&json!({"size": "http://example.org/Large"}));
    assert_eq!(replaced, json!({"size": {"@id": "http://schema.org/Large"}}));
}
