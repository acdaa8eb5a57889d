//! The hand-authored, per-image customization protocol.
//!
//! An instruction file is a UTF-8 text file, one instruction per line,
//! organized into image blocks: an `imname` declaration followed by the
//! VR-level edits for that image. [`parse_line`] turns lines into typed
//! instructions; [`apply_instructions`] runs them as a single-pass state
//! machine over the annotation store.

mod driver;
mod parse;
mod report;

pub use driver::{apply_instruction_file, apply_instructions};
pub use parse::{parse_line, ImageDecl, ParsedLine, VrInstruction};
pub use report::{DriverReport, OrphanDeclaration};
