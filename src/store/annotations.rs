//! The in-memory annotation store.
//!
//! The store maps an image name to the ordered sequence of VR records
//! annotating that image. Order matters only because instructions address
//! records by position; deleting a record shifts the positions after it,
//! which is why batch removals go through [`remove_descending`].

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::CurateError;
use crate::vr::VrRecord;

/// Mapping from image name to that image's ordered VR records.
///
/// Serializes as a single JSON object, image names as keys.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AnnotationStore {
    images: BTreeMap<String, Vec<VrRecord>>,
}

impl AnnotationStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store from an existing mapping.
    pub fn from_map(images: BTreeMap<String, Vec<VrRecord>>) -> Self {
        Self { images }
    }

    /// Returns the number of images in the store.
    pub fn len(&self) -> usize {
        self.images.len()
    }

    /// Returns true if the store holds no images.
    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    /// Returns true if the store has an entry for the named image.
    pub fn contains_image(&self, name: &str) -> bool {
        self.images.contains_key(name)
    }

    /// Returns the VR records for the named image.
    pub fn records(&self, name: &str) -> Option<&[VrRecord]> {
        self.images.get(name).map(Vec::as_slice)
    }

    /// Returns a mutable handle on the named image's VR records.
    pub fn records_mut(&mut self, name: &str) -> Option<&mut Vec<VrRecord>> {
        self.images.get_mut(name)
    }

    /// Replaces (or creates) the entry for an image.
    pub fn replace(&mut self, name: impl Into<String>, records: Vec<VrRecord>) {
        self.images.insert(name.into(), records);
    }

    /// Deletes an image's entry, returning its records if it existed.
    ///
    /// This simulates removing the image from the dataset; the physical
    /// image file is untouched.
    pub fn remove_image(&mut self, name: &str) -> Option<Vec<VrRecord>> {
        self.images.remove(name)
    }

    /// Iterates over (image name, records) pairs in name order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Vec<VrRecord>)> {
        self.images.iter()
    }

    /// Iterates over (image name, mutable records) pairs in name order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (&String, &mut Vec<VrRecord>)> {
        self.images.iter_mut()
    }
}

/// Removes the records at `indices` from `records`.
///
/// `indices` must be strictly descending and in range. Descending order
/// is a hard invariant: removing a lower index first would shift every
/// record after it and silently invalidate the remaining indices,
/// deleting the wrong records. The primitive rejects bad batches rather
/// than trusting caller discipline.
///
/// Returns the number of records removed.
pub fn remove_descending(
    records: &mut Vec<VrRecord>,
    indices: &[usize],
) -> Result<usize, CurateError> {
    for pair in indices.windows(2) {
        if pair[1] >= pair[0] {
            return Err(CurateError::config(format!(
                "removal indices must be strictly descending, got {} before {}",
                pair[0], pair[1]
            )));
        }
    }
    if let Some(&first) = indices.first() {
        if first >= records.len() {
            return Err(CurateError::config(format!(
                "removal index {} out of range for {} record(s)",
                first,
                records.len()
            )));
        }
    }
    for &idx in indices {
        records.remove(idx);
    }
    Ok(indices.len())
}
