//! Run summary for the protocol driver.
//!
//! The driver is fail-fast, so the report only exists for runs that
//! completed; it carries counts plus the non-fatal diagnostics an
//! operator should review before persisting the customized store.

use std::fmt;

/// The outcome of a successfully consumed instruction stream.
#[derive(Clone, Debug, Default)]
pub struct DriverReport {
    /// Images declared and processed, including removals.
    pub images_processed: usize,

    /// Image entries deleted via the `rimxxx` marker.
    pub images_removed: usize,

    /// VR-level instructions applied.
    pub instructions_applied: usize,

    /// Image declarations that were followed by no instructions. These
    /// blocks wrote nothing; a stale declaration usually means the
    /// instruction file has drifted from the analyst's intent.
    pub orphan_declarations: Vec<OrphanDeclaration>,
}

/// An `imname` declaration with no instructions in its block.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrphanDeclaration {
    /// The declared image name.
    pub image: String,
    /// The 1-based line number of the declaration.
    pub line: usize,
}

impl DriverReport {
    /// Creates a new empty report.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the run produced no diagnostics.
    pub fn is_clean(&self) -> bool {
        self.orphan_declarations.is_empty()
    }
}

impl fmt::Display for DriverReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Applied {} instruction(s) across {} image(s) ({} image(s) removed)",
            self.instructions_applied, self.images_processed, self.images_removed
        )?;

        for orphan in &self.orphan_declarations {
            writeln!(
                f,
                "  [WARN] orphan image declaration '{}' has no instructions (line {})",
                orphan.image, orphan.line
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_lists_orphan_declarations() {
        let report = DriverReport {
            images_processed: 3,
            images_removed: 1,
            instructions_applied: 7,
            orphan_declarations: vec![OrphanDeclaration {
                image: "00042.jpg".into(),
                line: 12,
            }],
        };
        let rendered = report.to_string();
        assert!(rendered.contains("7 instruction(s)"));
        assert!(rendered.contains("00042.jpg"));
        assert!(rendered.contains("line 12"));
        assert!(!report.is_clean());
    }
}
