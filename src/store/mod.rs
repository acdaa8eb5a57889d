//! The annotation store and the two name registries.
//!
//! These are the load-once, save-on-demand data structures every curation
//! operation works against: the object-class and predicate registries
//! (ordered name lists whose positions are stable category IDs) and the
//! store mapping image names to ordered VR record sequences.

mod annotations;
mod io_json;
mod registry;

pub use annotations::{remove_descending, AnnotationStore};
pub use io_json::{read_annotations, read_registry, write_annotations, write_registry};
pub use registry::{ClassRegistry, PredicateRegistry, Registry, RegistryId};
