//! Shared fixtures for integration tests.

// not every test binary uses every helper
#![allow(dead_code)]

use std::collections::BTreeMap;

use vrcurate::store::{AnnotationStore, ClassRegistry, PredicateRegistry, Registry};
use vrcurate::vr::{BBox, ClassId, PredicateId, VrObject, VrRecord};

/// Object classes used across the integration tests. Positions are the
/// category IDs the fixture records refer to.
pub const OBJECT_CLASSES: [&str; 7] = [
    "person", "horse", "hand", "hat", "plane", "airplane", "shirt",
];

/// Predicates used across the integration tests.
pub const PREDICATES: [&str; 6] = ["on", "wear", "has", "ride", "next to", "of"];

pub fn object_registry() -> ClassRegistry {
    Registry::from_names(OBJECT_CLASSES.iter().map(|s| s.to_string()).collect())
}

pub fn predicate_registry() -> PredicateRegistry {
    Registry::from_names(PREDICATES.iter().map(|s| s.to_string()).collect())
}

/// Builds a record from raw registry positions and bbox coordinates.
pub fn vr(
    subject: usize,
    subject_bbox: [u32; 4],
    predicate: usize,
    object: usize,
    object_bbox: [u32; 4],
) -> VrRecord {
    VrRecord::new(
        VrObject::new(ClassId::new(subject), BBox::from(subject_bbox)),
        PredicateId::new(predicate),
        VrObject::new(ClassId::new(object), BBox::from(object_bbox)),
    )
}

/// Builds a store from (image name, records) pairs.
pub fn store_of(entries: Vec<(&str, Vec<VrRecord>)>) -> AnnotationStore {
    let map: BTreeMap<String, Vec<VrRecord>> = entries
        .into_iter()
        .map(|(name, records)| (name.to_string(), records))
        .collect();
    AnnotationStore::from_map(map)
}

/// Index of a name in the object class fixture list.
pub fn class(name: &str) -> usize {
    OBJECT_CLASSES
        .iter()
        .position(|c| *c == name)
        .unwrap_or_else(|| panic!("unknown fixture class {}", name))
}

/// Index of a name in the predicate fixture list.
pub fn predicate(name: &str) -> usize {
    PREDICATES
        .iter()
        .position(|p| *p == name)
        .unwrap_or_else(|| panic!("unknown fixture predicate {}", name))
}
