//! JSON persistence for registries and the annotation store.
//!
//! Both persisted forms are structurally stable: a registry is a JSON
//! array of name strings in ID order, and the annotation store is a JSON
//! object from image name to an array of VR records. Loading happens once
//! before a curation pass; writing back is a caller decision made only
//! after the whole pass succeeds.

use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

use super::annotations::AnnotationStore;
use super::registry::{Registry, RegistryId};
use crate::error::CurateError;

/// Reads a registry from a JSON array of names.
pub fn read_registry<Id: RegistryId>(path: &Path) -> Result<Registry<Id>, CurateError> {
    let file = File::open(path).map_err(CurateError::Io)?;
    let reader = BufReader::new(file);

    let names: Vec<String> =
        serde_json::from_reader(reader).map_err(|source| CurateError::JsonParse {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(Registry::from_names(names))
}

/// Writes a registry back as a JSON array of names, in ID order.
pub fn write_registry<Id: RegistryId>(
    path: &Path,
    registry: &Registry<Id>,
) -> Result<(), CurateError> {
    let file = File::create(path).map_err(CurateError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer(writer, registry.names()).map_err(|source| CurateError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}

/// Reads the annotation store from its JSON file.
pub fn read_annotations(path: &Path) -> Result<AnnotationStore, CurateError> {
    let file = File::open(path).map_err(CurateError::Io)?;
    let reader = BufReader::new(file);

    serde_json::from_reader(reader).map_err(|source| CurateError::JsonParse {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes the annotation store to a JSON file.
pub fn write_annotations(path: &Path, store: &AnnotationStore) -> Result<(), CurateError> {
    let file = File::create(path).map_err(CurateError::Io)?;
    let writer = BufWriter::new(file);

    serde_json::to_writer(writer, store).map_err(|source| CurateError::JsonWrite {
        path: path.to_path_buf(),
        source,
    })
}
