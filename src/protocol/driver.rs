//! Single-pass state machine that applies an instruction stream.
//!
//! The driver consumes parsed instructions in file order. An `imname`
//! line finalizes the previous image block and opens a new one on a
//! private working copy of that image's VR records; the working copy is
//! written back into the store only when the block closes with at least
//! one applied edit. Any error aborts the whole run: the stream is never
//! half-applied to disk, because persistence only ever happens after the
//! driver returns successfully.

use std::fs;
use std::path::Path;

use super::parse::{parse_line, ImageDecl, ParsedLine, VrInstruction};
use super::report::{DriverReport, OrphanDeclaration};
use crate::error::CurateError;
use crate::store::{AnnotationStore, ClassRegistry, PredicateRegistry};
use crate::vr::VrRecord;

/// The open image block: the image being edited and the working state
/// accumulated for it so far.
struct ActiveImage {
    name: String,
    declared_at: usize,
    edits: Vec<VrRecord>,
    edited: bool,
    /// Index of the most recent `rvrxxx` in this block, if any. Present
    /// means removals have begun: change instructions are no longer
    /// legal, and further removals must target strictly lower indices.
    last_removed: Option<usize>,
}

/// Applies an instruction file to the store. See [`apply_instructions`].
pub fn apply_instruction_file(
    path: &Path,
    store: &mut AnnotationStore,
    objects: &ClassRegistry,
    predicates: &PredicateRegistry,
) -> Result<DriverReport, CurateError> {
    let text = fs::read_to_string(path).map_err(CurateError::Io)?;
    apply_instructions(&text, store, objects, predicates)
}

/// Applies an instruction stream to the store.
///
/// On success, returns the run summary. On error, the failing image
/// block has written nothing back to the store; previously finalized
/// blocks remain applied in memory, which is safe because a failed run
/// must never be persisted.
pub fn apply_instructions(
    text: &str,
    store: &mut AnnotationStore,
    objects: &ClassRegistry,
    predicates: &PredicateRegistry,
) -> Result<DriverReport, CurateError> {
    let mut driver = Driver {
        store,
        objects,
        predicates,
        active: None,
        report: DriverReport::new(),
    };

    for (idx, raw) in text.lines().enumerate() {
        let line_num = idx + 1;
        match parse_line(line_num, raw.trim(), objects, predicates)? {
            ParsedLine::Blank | ParsedLine::Comment => {}
            ParsedLine::Image(decl) => driver.begin_image(line_num, decl)?,
            ParsedLine::Vr(instruction) => driver.apply(line_num, instruction)?,
        }
    }

    driver.finalize_active();
    Ok(driver.report)
}

struct Driver<'a> {
    store: &'a mut AnnotationStore,
    objects: &'a ClassRegistry,
    predicates: &'a PredicateRegistry,
    active: Option<ActiveImage>,
    report: DriverReport,
}

impl Driver<'_> {
    /// Closes the open image block, if any: commits the working copy
    /// when edits were applied, or records an orphan-declaration
    /// diagnostic when the block was empty.
    fn finalize_active(&mut self) {
        if let Some(active) = self.active.take() {
            if active.edited {
                self.store.replace(active.name, active.edits);
            } else {
                self.report.orphan_declarations.push(OrphanDeclaration {
                    image: active.name,
                    line: active.declared_at,
                });
            }
        }
    }

    fn begin_image(&mut self, line_num: usize, decl: ImageDecl) -> Result<(), CurateError> {
        self.finalize_active();

        let records = self.store.records(&decl.name).ok_or_else(|| {
            CurateError::reference(
                line_num,
                format!("image name '{}' not recognised", decl.name),
            )
        })?;

        self.report.images_processed += 1;

        if decl.remove {
            // no edit block follows an image removal
            self.store.remove_image(&decl.name);
            self.report.images_removed += 1;
            return Ok(());
        }

        self.active = Some(ActiveImage {
            edits: records.to_vec(),
            name: decl.name,
            declared_at: line_num,
            edited: false,
            last_removed: None,
        });
        Ok(())
    }

    fn apply(&mut self, line_num: usize, instruction: VrInstruction) -> Result<(), CurateError> {
        let Some(active) = self.active.as_mut() else {
            return Err(CurateError::integrity(
                line_num,
                format!(
                    "orphan '{}' instruction (no associated image)",
                    instruction.keyword()
                ),
            ));
        };

        if instruction.is_change() && active.last_removed.is_some() {
            return Err(CurateError::integrity(
                line_num,
                format!(
                    "'{}' instruction after 'rvrxxx' in the same image block not allowed",
                    instruction.keyword()
                ),
            ));
        }

        match instruction {
            VrInstruction::ChangeSubjectClass {
                index,
                anchor,
                class,
            } => {
                check_anchor(active, index, &anchor, self.objects, self.predicates, line_num)?;
                active.edits[index].subject.category = class;
            }
            VrInstruction::ChangeSubjectBBox {
                index,
                anchor,
                bbox,
            } => {
                check_anchor(active, index, &anchor, self.objects, self.predicates, line_num)?;
                active.edits[index].subject.bbox = bbox;
            }
            VrInstruction::ChangePredicate {
                index,
                anchor,
                predicate,
            } => {
                check_anchor(active, index, &anchor, self.objects, self.predicates, line_num)?;
                active.edits[index].predicate = predicate;
            }
            VrInstruction::ChangeObjectClass {
                index,
                anchor,
                class,
            } => {
                check_anchor(active, index, &anchor, self.objects, self.predicates, line_num)?;
                active.edits[index].object.category = class;
            }
            VrInstruction::ChangeObjectBBox {
                index,
                anchor,
                bbox,
            } => {
                check_anchor(active, index, &anchor, self.objects, self.predicates, line_num)?;
                active.edits[index].object.bbox = bbox;
            }
            VrInstruction::Append { record } => {
                // appending never disturbs existing indices, so it is
                // legal even after a removal
                active.edits.push(record);
            }
            VrInstruction::Remove { index, anchor } => {
                check_anchor(active, index, &anchor, self.objects, self.predicates, line_num)?;
                if let Some(last) = active.last_removed {
                    if index >= last {
                        return Err(CurateError::integrity(
                            line_num,
                            format!(
                                "'rvrxxx' instructions not in descending order by index \
                                 ({} after {})",
                                index, last
                            ),
                        ));
                    }
                }
                active.edits.remove(index);
                active.last_removed = Some(index);
            }
        }

        active.edited = true;
        self.report.instructions_applied += 1;
        Ok(())
    }
}

/// Verifies a change/remove instruction's expectations against the live
/// working copy: the target index must be in range and the rendered
/// tuple at that index must equal the instruction's anchor string. This
/// is the engine's core defense against instructions authored against a
/// data state that has since drifted.
fn check_anchor(
    active: &ActiveImage,
    index: usize,
    anchor: &str,
    objects: &ClassRegistry,
    predicates: &PredicateRegistry,
    line_num: usize,
) -> Result<(), CurateError> {
    let record = active.edits.get(index).ok_or_else(|| {
        CurateError::integrity(
            line_num,
            format!(
                "vr index {} out of range for image '{}' with {} record(s)",
                index,
                active.name,
                active.edits.len()
            ),
        )
    })?;

    let actual = record.render_triple(objects, predicates).ok_or_else(|| {
        CurateError::reference(
            line_num,
            format!(
                "annotations for image '{}' reference a category outside the registries",
                active.name
            ),
        )
    })?;

    if actual != anchor {
        return Err(CurateError::integrity(
            line_num,
            format!("expected vr {} does not match actual vr {}", anchor, actual),
        ));
    }
    Ok(())
}
