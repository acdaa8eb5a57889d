//! File round-trip tests for the registries and the annotation store.

mod common;

use common::{class, object_registry, predicate, store_of, vr};
use vrcurate::store::{
    read_annotations, read_registry, write_annotations, write_registry,
};
use vrcurate::vr::{ClassId, PredicateId};

#[test]
fn registry_roundtrips_through_a_json_array() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("objects.json");

    let registry = object_registry();
    write_registry(&path, &registry).unwrap();

    // persisted form is a bare JSON array of names
    let raw = std::fs::read_to_string(&path).unwrap();
    assert!(raw.starts_with('['));
    assert!(raw.contains("\"person\""));

    let restored = read_registry::<ClassId>(&path).unwrap();
    assert_eq!(restored.names(), registry.names());
    assert_eq!(restored.id_of("horse"), Some(ClassId::new(class("horse"))));
}

#[test]
fn annotation_store_roundtrips_with_stable_field_names() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("annotations.json");

    let store = store_of(vec![(
        "00001.jpg",
        vec![vr(class("person"), [0, 10, 0, 10], predicate("on"), class("horse"), [5, 50, 5, 50])],
    )]);
    write_annotations(&path, &store).unwrap();

    let value: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    let record = &value["00001.jpg"][0];
    assert_eq!(record["subject"]["category"], class("person"));
    assert_eq!(record["subject"]["bbox"], serde_json::json!([0, 10, 0, 10]));
    assert_eq!(record["predicate"], predicate("on"));
    assert_eq!(record["object"]["category"], class("horse"));
    assert_eq!(record["object"]["bbox"], serde_json::json!([5, 50, 5, 50]));

    let restored = read_annotations(&path).unwrap();
    assert_eq!(restored.len(), 1);
    assert_eq!(
        restored.records("00001.jpg").unwrap(),
        store.records("00001.jpg").unwrap()
    );
}

#[test]
fn loading_a_malformed_annotations_file_names_the_path() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("broken.json");
    std::fs::write(&path, "{ not json").unwrap();

    let err = read_annotations(&path).unwrap_err();
    assert!(err.to_string().contains("broken.json"));
}

#[test]
fn registry_file_with_wrong_shape_is_a_parse_error() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("objects.json");
    std::fs::write(&path, r#"{"person": 0}"#).unwrap();

    assert!(read_registry::<PredicateId>(&path).is_err());
}
