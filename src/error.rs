use std::path::PathBuf;
use thiserror::Error;

/// The main error type for vrcurate operations.
///
/// Every variant is fatal: the engine never recovers locally, because a
/// curated dataset must never be left with a partially applied or
/// mismatched edit. Persistence happens only after a run completes
/// without error, so a fatal error cannot leave a corrupted file on disk.
#[derive(Debug, Error)]
pub enum CurateError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse JSON from {path}: {source}")]
    JsonParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Failed to write JSON to {path}: {source}")]
    JsonWrite {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// A malformed instruction line: unknown keyword, missing fields,
    /// bad index, or a malformed bbox literal.
    #[error("parse error, line {line}: {message}")]
    Parse { line: usize, message: String },

    /// An unknown image, object class, or predicate name. The line number
    /// is present for errors raised while consuming an instruction stream
    /// and absent for errors raised by bulk operators.
    #[error("reference error{}: {message}", fmt_line(.line))]
    Reference { line: Option<usize>, message: String },

    /// An instruction whose expectations do not match the live data:
    /// anchor-tuple mismatch, out-of-range target index, removals not in
    /// descending order, a change following a removal, or an instruction
    /// with no active image.
    #[error("integrity error, line {line}: {message}")]
    Integrity { line: usize, message: String },

    /// A bulk operation that cannot apply as configured: a pattern that
    /// matches zero images, or a transform pair that fits none of the
    /// supported shapes.
    #[error("configuration error: {message}")]
    Configuration { message: String },
}

fn fmt_line(line: &Option<usize>) -> String {
    match line {
        Some(n) => format!(", line {}", n),
        None => String::new(),
    }
}

impl CurateError {
    /// Shorthand for a parse error at a 1-based line number.
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        CurateError::Parse {
            line,
            message: message.into(),
        }
    }

    /// Shorthand for a reference error raised at a 1-based line number.
    pub(crate) fn reference(line: usize, message: impl Into<String>) -> Self {
        CurateError::Reference {
            line: Some(line),
            message: message.into(),
        }
    }

    /// Shorthand for a reference error raised outside an instruction stream.
    pub(crate) fn reference_global(message: impl Into<String>) -> Self {
        CurateError::Reference {
            line: None,
            message: message.into(),
        }
    }

    /// Shorthand for an integrity error at a 1-based line number.
    pub(crate) fn integrity(line: usize, message: impl Into<String>) -> Self {
        CurateError::Integrity {
            line,
            message: message.into(),
        }
    }

    /// Shorthand for a configuration error.
    pub(crate) fn config(message: impl Into<String>) -> Self {
        CurateError::Configuration {
            message: message.into(),
        }
    }
}
