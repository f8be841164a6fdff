//! Error types and result aliases for flogical.
//!
//! - [`Result<T>`]: Type alias for `anyhow::Result<T>` used throughout the crate
//! - [`LineError`]: Fatal line-shape failures raised by the input stream

use std::fmt;

use anyhow::Result as AnyhowResult;

pub type Result<T> = AnyhowResult<T>;

/// A physical line that cannot be assembled into a logical statement.
///
/// Both variants abort the statement being assembled; nothing is returned
/// for it. Recover the variant from an `anyhow::Error` with `downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LineError {
    /// Fragment does not decompose into continuation/core/comment
    Malformed { line: usize, text: String },
    /// Preprocessor directive found inside a statement already in progress
    PreprocessorContinuation { line: usize, text: String },
}

impl LineError {
    /// Physical line number the error was raised on
    #[must_use]
    pub fn line(&self) -> usize {
        match self {
            Self::Malformed { line, .. } | Self::PreprocessorContinuation { line, .. } => *line,
        }
    }
}

impl fmt::Display for LineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Malformed { line, text } => {
                write!(f, "line {line}: unexpected line format: {text:?}")
            }
            Self::PreprocessorContinuation { line, text } => write!(
                f,
                "line {line}: continuation to a preprocessor line not supported: {text:?}"
            ),
        }
    }
}

impl std::error::Error for LineError {}
