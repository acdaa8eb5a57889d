//! Visual relationship data model.
//!
//! The types here are the vocabulary the rest of the crate speaks:
//! integer-coordinate bounding boxes, typed registry IDs, and the VR
//! record itself.

mod bbox;
mod ids;
mod record;

pub use bbox::BBox;
pub use ids::{ClassId, PredicateId};
pub use record::{VrObject, VrRecord};
