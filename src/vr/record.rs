//! The visual relationship (VR) record.
//!
//! One VR record asserts a (subject, predicate, object) relationship in
//! one image, with a bounding box for each of the two participants. The
//! class and predicate fields hold registry positions, not names; the
//! serialized shape matches the annotation files exactly:
//!
//! ```json
//! {
//!   "subject": { "category": 3, "bbox": [ymin, ymax, xmin, xmax] },
//!   "predicate": 7,
//!   "object": { "category": 12, "bbox": [ymin, ymax, xmin, xmax] }
//! }
//! ```

use serde::{Deserialize, Serialize};

use super::bbox::BBox;
use super::ids::{ClassId, PredicateId};
use crate::store::{ClassRegistry, PredicateRegistry};

/// One participant of a visual relationship: an object class plus the
/// bounding box localizing it in the image.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VrObject {
    pub category: ClassId,
    pub bbox: BBox,
}

impl VrObject {
    /// Creates a new participant.
    pub fn new(category: ClassId, bbox: BBox) -> Self {
        Self { category, bbox }
    }
}

/// A single visual relationship record.
///
/// Two records are duplicates exactly when every field is equal, which is
/// what the derived `PartialEq` gives us: both categories, both bounding
/// boxes, and the predicate.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct VrRecord {
    pub subject: VrObject,
    pub predicate: PredicateId,
    pub object: VrObject,
}

impl VrRecord {
    /// Creates a new record from its parts.
    pub fn new(subject: VrObject, predicate: PredicateId, object: VrObject) -> Self {
        Self {
            subject,
            predicate,
            object,
        }
    }

    /// Returns true when this record's classification matches the given
    /// (subject class, predicate, object class) triple. Bounding boxes
    /// are ignored.
    #[inline]
    pub fn matches_triple(&self, subject: ClassId, predicate: PredicateId, object: ClassId) -> bool {
        self.subject.category == subject
            && self.predicate == predicate
            && self.object.category == object
    }

    /// Exchanges the subject and object participants.
    ///
    /// Category and bounding box move together; a partial swap (category
    /// but not bbox) would corrupt the annotation and is not expressible
    /// through this method.
    #[inline]
    pub fn swap_participants(&mut self) {
        std::mem::swap(&mut self.subject, &mut self.object);
    }

    /// Resolves this record's triple to names.
    ///
    /// Returns `None` if a category or predicate index is out of range
    /// for its registry, which means the annotations are corrupt.
    pub fn triple_names<'a>(
        &self,
        objects: &'a ClassRegistry,
        predicates: &'a PredicateRegistry,
    ) -> Option<(&'a str, &'a str, &'a str)> {
        let s = objects.name_of(self.subject.category)?;
        let p = predicates.name_of(self.predicate)?;
        let o = objects.name_of(self.object.category)?;
        Some((s, p, o))
    }

    /// Renders this record's triple as the anchor-tuple string used by
    /// change/remove instructions, e.g. `('person', 'on', 'horse')`.
    ///
    /// Returns `None` under the same conditions as [`triple_names`].
    ///
    /// [`triple_names`]: VrRecord::triple_names
    pub fn render_triple(
        &self,
        objects: &ClassRegistry,
        predicates: &PredicateRegistry,
    ) -> Option<String> {
        let (s, p, o) = self.triple_names(objects, predicates)?;
        Some(format!("('{}', '{}', '{}')", s, p, o))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::Registry;

    fn registries() -> (ClassRegistry, PredicateRegistry) {
        let objects = Registry::from_names(vec!["person".into(), "horse".into()]);
        let predicates = Registry::from_names(vec!["on".into(), "beside".into()]);
        (objects, predicates)
    }

    fn record() -> VrRecord {
        VrRecord::new(
            VrObject::new(ClassId::new(0), BBox::new(0, 10, 0, 10)),
            PredicateId::new(0),
            VrObject::new(ClassId::new(1), BBox::new(5, 25, 5, 25)),
        )
    }

    #[test]
    fn renders_anchor_tuple_with_single_quotes() {
        let (objects, predicates) = registries();
        let rendered = record().render_triple(&objects, &predicates).unwrap();
        assert_eq!(rendered, "('person', 'on', 'horse')");
    }

    #[test]
    fn render_fails_on_out_of_range_category() {
        let (objects, predicates) = registries();
        let mut vr = record();
        vr.object.category = ClassId::new(99);
        assert!(vr.render_triple(&objects, &predicates).is_none());
    }

    #[test]
    fn swap_moves_category_and_bbox_together() {
        let mut vr = record();
        let subject_before = vr.subject;
        let object_before = vr.object;
        vr.swap_participants();
        assert_eq!(vr.subject, object_before);
        assert_eq!(vr.object, subject_before);
    }

    #[test]
    fn duplicate_detection_is_full_field_equality() {
        let a = record();
        let mut b = record();
        assert_eq!(a, b);
        b.subject.bbox = BBox::new(0, 11, 0, 10);
        assert_ne!(a, b);
    }

    #[test]
    fn serializes_with_annotation_file_field_names() {
        let json = serde_json::to_value(record()).unwrap();
        assert_eq!(json["subject"]["category"], 0);
        assert_eq!(json["subject"]["bbox"], serde_json::json!([0, 10, 0, 10]));
        assert_eq!(json["predicate"], 0);
        assert_eq!(json["object"]["category"], 1);
    }
}
