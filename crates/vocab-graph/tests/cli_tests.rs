//! CLI integration tests.
//!
//! These tests invoke the `vocab-graph` binary via `std::process::Command`
//! against the fixture vocabularies and verify its output.

use std::path::PathBuf;
use std::process::{Command, Output};

fn binary_path() -> PathBuf {
    PathBuf::from(env!("CARGO_BIN_EXE_vocab-graph"))
}

fn fixture_path(name: &str) -> String {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("fixtures")
        .join(name)
        .to_string_lossy()
        .into_owned()
}

fn run(args: &[&str]) -> Output {
    let output = Command::new(binary_path())
        .env_remove("RUST_LOG")
        .env_remove("VOCAB_GRAPH_CONFIG")
        .args(args)
        .output()
        .expect("failed to execute binary");
    assert!(
        output.status.success(),
        "vocab-graph {args:?} failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    output
}

fn stdout(output: &Output) -> String {
    String::from_utf8(output.stdout.clone()).expect("invalid UTF-8")
}

#[test]
fn super_classes_prints_one_class_per_line() {
    let animals = fixture_path("animals.jsonld");
    let output = run(&["-q", "-i", &animals, "super-classes", "http://example.org/Dog"]);
    assert_eq!(
        stdout(&output),
        "http://example.org/Dog\nhttp://example.org/Animal\nhttp://schema.org/Thing\n"
    );
}

#[test]
fn sub_classes_include_transitive_children() {
    let animals = fixture_path("animals.jsonld");
    let output = run(&["-i", &animals, "sub-classes", "http://example.org/Dog"]);
    assert_eq!(stdout(&output), "http://example.org/Dog\nhttp://example.org/Puppy\n");
}

#[test]
fn restrictions_are_printed_as_json() {
    let animals = fixture_path("animals.jsonld");
    let shapes = fixture_path("shapes.jsonld");
    let output = run(&[
        "-i",
        &animals,
        "-i",
        &shapes,
        "restrictions",
        "http://example.org/Dog",
    ]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    let paths: Vec<&str> = json
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["path"].as_str().unwrap())
        .collect();
    assert_eq!(
        paths,
        ["http://example.org/name", "http://example.org/breed", "@id"]
    );
}

#[test]
fn node_restrictions_by_target_node() {
    let shapes = fixture_path("shapes.jsonld");
    let output = run(&["-i", &shapes, "node-restrictions", "http://example.org/rex"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json[0]["class"], serde_json::Value::Null);
    assert_eq!(json[0]["classConstraint"], "http://schema.org/Person");
}

#[test]
fn sparql_restrictions_against_a_document() {
    let sparql = fixture_path("sparql.jsonld");
    let dir = tempfile::tempdir().unwrap();
    let document = dir.path().join("doc.jsonld");
    std::fs::write(
        &document,
        r#"{"@id": "http://example.org/rex", "http://schema.org/owner": {"@id": "http://example.org/alice"}}"#,
    )
    .unwrap();
    let output = run(&[
        "-i",
        &sparql,
        "sparql-restrictions",
        "--document",
        document.to_str().unwrap(),
    ]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json[0]["path"], "http://schema.org/owner");
    assert_eq!(json.as_array().unwrap().len(), 1);
}

#[test]
fn node_prints_synthetic_io_nodes() {
    let animals = fixture_path("animals.jsonld");
    let output = run(&["-i", &animals, "node", "http://schema.org/object-input"]);
    let json: serde_json::Value = serde_json::from_str(&stdout(&output)).unwrap();
    assert_eq!(json["@id"], "http://schema.org/object-input");
    assert_eq!(
        json["http://www.w3.org/2000/01/rdf-schema#label"][0]["@value"],
        "object-input"
    );
}

#[test]
fn unknown_node_fails() {
    let animals = fixture_path("animals.jsonld");
    let output = Command::new(binary_path())
        .args(["-i", &animals, "node", "http://example.org/Nope"])
        .output()
        .expect("failed to execute binary");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("no node with id"));
}

#[test]
fn ntriples_export_is_line_based() {
    let vehicles = fixture_path("vehicles.ttl");
    let output = run(&["-i", &vehicles, "export"]);
    let out = stdout(&output);
    assert!(!out.is_empty());
    for line in out.lines() {
        let trimmed = line.trim();
        assert!(trimmed.ends_with(" ."), "N-Triples line does not end with ' .': {trimmed}");
        assert!(
            trimmed.starts_with('<') || trimmed.starts_with("_:"),
            "unexpected subject: {trimmed}"
        );
    }
    assert!(out.contains(
        "<http://example.org/Car> <http://www.w3.org/2000/01/rdf-schema#subClassOf> <http://example.org/Vehicle> ."
    ));
}

#[test]
fn turtle_export_to_file() {
    let animals = fixture_path("animals.jsonld");
    let dir = tempfile::tempdir().unwrap();
    let out_path = dir.path().join("out.ttl");
    run(&[
        "-i",
        &animals,
        "export",
        "--format",
        "turtle",
        "--output",
        out_path.to_str().unwrap(),
    ]);
    let text = std::fs::read_to_string(&out_path).unwrap();
    assert!(text.starts_with("@prefix "));
    assert!(text.contains("schema:Thing a rdfs:Class ."));
}

#[test]
fn bad_export_format_fails() {
    let animals = fixture_path("animals.jsonld");
    let output = Command::new(binary_path())
        .args(["-i", &animals, "export", "--format", "rdfxml"])
        .output()
        .expect("failed to execute binary");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("Unknown format"));
}

#[test]
fn config_file_is_honored() {
    let dir = tempfile::tempdir().unwrap();
    let config = dir.path().join("vocab-graph.toml");
    std::fs::write(&config, "[store]\nformat_order = [\"turtle\"]\n").unwrap();
    let notes = dir.path().join("notes.txt");
    std::fs::write(&notes, "{\"@id\": \"http://example.org/a\"}").unwrap();

    let output = Command::new(binary_path())
        .args([
            "--config",
            config.to_str().unwrap(),
            "-i",
            notes.to_str().unwrap(),
            "super-classes",
            "http://example.org/a",
        ])
        .output()
        .expect("failed to execute binary");
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("text/turtle"));
}
