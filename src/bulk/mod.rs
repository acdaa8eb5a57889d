//! Bulk mutation operators over the whole annotation store.
//!
//! These operators implement planned, dataset-wide corrections directly,
//! without the textual instruction protocol: merging one class or
//! predicate into another, removing or transforming every instance of a
//! VR pattern, purging exact duplicates, pruning image entries drained
//! to emptiness, and reclassifying a class in an explicit list of images.
//!
//! They share the protocol's defensive posture: a pattern that matches
//! nothing is a configuration error, not a silent no-op, because it
//! almost always means the instruction list is stale or mistyped.

use crate::error::CurateError;
use crate::store::{remove_descending, AnnotationStore, ClassRegistry, PredicateRegistry};

/// A (subject, predicate, object) name triple naming a VR pattern.
pub type VrPattern<'a> = (&'a str, &'a str, &'a str);

/// Globally merges object class `from` into object class `to`.
///
/// Every subject or object reference to `from` is rewritten to `to`,
/// independently. Returns the number of images rewritten; zero matching
/// images is a configuration error.
pub fn merge_object_classes(
    store: &mut AnnotationStore,
    objects: &ClassRegistry,
    from: &str,
    to: &str,
) -> Result<usize, CurateError> {
    let from_id = objects.require(from)?;
    let to_id = objects.require(to)?;

    let mut images_rewritten = 0;
    for (_, records) in store.iter_mut() {
        let mut rewritten = false;
        for record in records.iter_mut() {
            if record.subject.category == from_id {
                record.subject.category = to_id;
                rewritten = true;
            }
            if record.object.category == from_id {
                record.object.category = to_id;
                rewritten = true;
            }
        }
        if rewritten {
            images_rewritten += 1;
        }
    }

    if images_rewritten == 0 {
        return Err(CurateError::config(format!(
            "no image references object class '{}'; merge into '{}' has nothing to do",
            from, to
        )));
    }
    Ok(images_rewritten)
}

/// Globally merges predicate `from` into predicate `to`.
///
/// Returns the number of images rewritten; zero matching images is a
/// configuration error.
pub fn merge_predicates(
    store: &mut AnnotationStore,
    predicates: &PredicateRegistry,
    from: &str,
    to: &str,
) -> Result<usize, CurateError> {
    let from_id = predicates.require(from)?;
    let to_id = predicates.require(to)?;

    let mut images_rewritten = 0;
    for (_, records) in store.iter_mut() {
        let mut rewritten = false;
        for record in records.iter_mut() {
            if record.predicate == from_id {
                record.predicate = to_id;
                rewritten = true;
            }
        }
        if rewritten {
            images_rewritten += 1;
        }
    }

    if images_rewritten == 0 {
        return Err(CurateError::config(format!(
            "no image references predicate '{}'; merge into '{}' has nothing to do",
            from, to
        )));
    }
    Ok(images_rewritten)
}

/// Removes every VR record matching the pattern, across all images.
///
/// Per-image removals go through the descending-order primitive so a
/// deletion can never invalidate the index of another pending deletion.
/// Returns the number of record instances removed; zero is a
/// configuration error.
pub fn remove_vr_globally(
    store: &mut AnnotationStore,
    objects: &ClassRegistry,
    predicates: &PredicateRegistry,
    pattern: VrPattern<'_>,
) -> Result<usize, CurateError> {
    let (subject_name, predicate_name, object_name) = pattern;
    let subject = objects.require(subject_name)?;
    let predicate = predicates.require(predicate_name)?;
    let object = objects.require(object_name)?;

    let mut instances_removed = 0;
    for (_, records) in store.iter_mut() {
        let mut to_remove: Vec<usize> = records
            .iter()
            .enumerate()
            .filter(|(_, r)| r.matches_triple(subject, predicate, object))
            .map(|(idx, _)| idx)
            .collect();
        to_remove.reverse();
        instances_removed += remove_descending(records, &to_remove)?;
    }

    if instances_removed == 0 {
        return Err(CurateError::config(format!(
            "vr pattern ('{}', '{}', '{}') matches no annotations; nothing to remove",
            subject_name, predicate_name, object_name
        )));
    }
    Ok(instances_removed)
}

/// The three relationships a transform pair may legally have.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransformShape {
    /// Subject and object keep their positions; the predicate changes.
    PredicateOnly,
    /// Subject and object swap positions; the predicate also changes.
    SwapAndPredicate,
    /// Subject and object swap positions; the predicate is unchanged.
    SwapOnly,
}

impl TransformShape {
    fn swaps(self) -> bool {
        !matches!(self, TransformShape::PredicateOnly)
    }

    fn changes_predicate(self) -> bool {
        !matches!(self, TransformShape::SwapOnly)
    }
}

/// Classifies a transform pair by element-wise comparison.
///
/// Any relationship between the two triples other than the three
/// supported shapes is a configuration error, as is an identity pair.
pub fn classify_transform(
    from: VrPattern<'_>,
    to: VrPattern<'_>,
) -> Result<TransformShape, CurateError> {
    let (fs, fp, fo) = from;
    let (ts, tp, to_) = to;

    if from == to {
        return Err(CurateError::config(format!(
            "vr transform ('{}', '{}', '{}') -> identical vr changes nothing",
            fs, fp, fo
        )));
    }

    let positions_kept = fs == ts && fo == to_;
    let positions_swapped = fs == to_ && fo == ts;

    match (positions_kept, positions_swapped, fp == tp) {
        (true, _, false) => Ok(TransformShape::PredicateOnly),
        (false, true, false) => Ok(TransformShape::SwapAndPredicate),
        (false, true, true) => Ok(TransformShape::SwapOnly),
        _ => Err(CurateError::config(format!(
            "unsupported vr transform shape: ('{}', '{}', '{}') -> ('{}', '{}', '{}')",
            fs, fp, fo, ts, tp, to_
        ))),
    }
}

/// Globally transforms every VR record matching `from` into `to`.
///
/// When the shape swaps subject and object, each participant's category
/// and bounding box move together; a partial swap is not possible.
/// Returns the number of record instances transformed; zero is a
/// configuration error.
pub fn transform_vr_globally(
    store: &mut AnnotationStore,
    objects: &ClassRegistry,
    predicates: &PredicateRegistry,
    from: VrPattern<'_>,
    to: VrPattern<'_>,
) -> Result<usize, CurateError> {
    let shape = classify_transform(from, to)?;

    let (from_subject_name, from_predicate_name, from_object_name) = from;
    let from_subject = objects.require(from_subject_name)?;
    let from_predicate = predicates.require(from_predicate_name)?;
    let from_object = objects.require(from_object_name)?;
    let to_predicate = predicates.require(to.1)?;

    let mut instances_changed = 0;
    for (_, records) in store.iter_mut() {
        for record in records.iter_mut() {
            if !record.matches_triple(from_subject, from_predicate, from_object) {
                continue;
            }
            if shape.changes_predicate() {
                record.predicate = to_predicate;
            }
            if shape.swaps() {
                record.swap_participants();
            }
            instances_changed += 1;
        }
    }

    if instances_changed == 0 {
        return Err(CurateError::config(format!(
            "vr pattern ('{}', '{}', '{}') matches no annotations; nothing to transform",
            from_subject_name, from_predicate_name, from_object_name
        )));
    }
    Ok(instances_changed)
}

/// Removes exact-duplicate VR records, keeping each first occurrence.
///
/// Two records are duplicates only under full field equality: both
/// categories, both bounding boxes, and the predicate. Returns (images
/// touched, records removed); a store with no duplicates yields (0, 0),
/// so running this twice is a no-op the second time, never an error.
pub fn remove_duplicate_vrs(store: &mut AnnotationStore) -> Result<(usize, usize), CurateError> {
    let mut images_touched = 0;
    let mut records_removed = 0;

    for (_, records) in store.iter_mut() {
        let mut is_duplicate = vec![false; records.len()];
        let mut duplicate_indices: Vec<usize> = Vec::new();
        for first in 0..records.len() {
            if is_duplicate[first] {
                continue;
            }
            for second in (first + 1)..records.len() {
                if !is_duplicate[second] && records[first] == records[second] {
                    is_duplicate[second] = true;
                    duplicate_indices.push(second);
                }
            }
        }
        if duplicate_indices.is_empty() {
            continue;
        }
        duplicate_indices.sort_unstable();
        duplicate_indices.reverse();
        records_removed += remove_descending(records, &duplicate_indices)?;
        images_touched += 1;
    }

    Ok((images_touched, records_removed))
}

/// Deletes annotation-store entries whose VR sequence is empty.
///
/// Global removals can drain an image's whole sequence without deleting
/// its entry, leaving an image that maps to nothing. This pass cleans
/// those entries up. Returns the number of entries deleted; a store with
/// no empty entries yields zero, never an error, so it is idempotent.
pub fn remove_empty_images(store: &mut AnnotationStore) -> usize {
    let empty: Vec<String> = store
        .iter()
        .filter(|(_, records)| records.is_empty())
        .map(|(name, _)| name.clone())
        .collect();
    for name in &empty {
        store.remove_image(name);
    }
    empty.len()
}

/// Switches object class `from` to `to` in an explicit list of images.
///
/// Like [`merge_object_classes`] but restricted to the named images. A
/// named image absent from the store is a reference error; a named image
/// with no reference to `from` is a configuration error, guarding
/// against a stale image list becoming silently ineffective.
pub fn switch_object_classes_in_named_images(
    store: &mut AnnotationStore,
    objects: &ClassRegistry,
    from: &str,
    to: &str,
    image_names: &[String],
) -> Result<usize, CurateError> {
    let from_id = objects.require(from)?;
    let to_id = objects.require(to)?;

    for name in image_names {
        let records = store.records_mut(name).ok_or_else(|| {
            CurateError::reference_global(format!("image name '{}' not recognised", name))
        })?;

        let mut rewritten = false;
        for record in records.iter_mut() {
            if record.subject.category == from_id {
                record.subject.category = to_id;
                rewritten = true;
            }
            if record.object.category == from_id {
                record.object.category = to_id;
                rewritten = true;
            }
        }
        if !rewritten {
            return Err(CurateError::config(format!(
                "image '{}' has no reference to object class '{}'",
                name, from
            )));
        }
    }

    Ok(image_names.len())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transform_classification_covers_the_three_shapes() {
        assert_eq!(
            classify_transform(("hand", "on", "person"), ("hand", "of", "person")).unwrap(),
            TransformShape::PredicateOnly
        );
        assert_eq!(
            classify_transform(("hand", "on", "person"), ("person", "has", "hand")).unwrap(),
            TransformShape::SwapAndPredicate
        );
        assert_eq!(
            classify_transform(("hand", "near", "person"), ("person", "near", "hand")).unwrap(),
            TransformShape::SwapOnly
        );
    }

    #[test]
    fn transform_classification_rejects_other_relationships() {
        // object class changes: not expressible as a transform
        assert!(classify_transform(("hand", "on", "person"), ("arm", "on", "person")).is_err());
        // identity
        assert!(classify_transform(("hand", "on", "person"), ("hand", "on", "person")).is_err());
        // symmetric pattern: a "swap" would change nothing
        assert!(
            classify_transform(("person", "next to", "person"), ("person", "next to", "person"))
                .is_err()
        );
    }
}
