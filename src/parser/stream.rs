/// `InputStream` - Converts physical lines to logical Fortran statements
///
/// This module handles:
/// - Joining line continuations (lines ending with &)
/// - Splitting semicolon-separated statements
/// - Separating comments from code
/// - Conditional-compilation lines (!$)
/// - Passing preprocessor directives (#) through as single-line statements
use std::collections::VecDeque;
use std::io::{BufRead, BufReader};

use anyhow::bail;
use log::debug;
use serde::Serialize;

use super::fragment::{expand_tabs, split_fragments, Fragment};
use super::patterns::LINE_SHAPE_RE;
use crate::error::{LineError, Result};

/// Default maximum number of pieces allowed in a single logical statement.
/// This prevents memory exhaustion from pathological inputs with many continuations.
pub const DEFAULT_MAX_CONTINUATION_LINES: usize = 10_000;

/// Default tab stop width
pub const DEFAULT_TAB_WIDTH: usize = 8;

/// Knobs controlling how physical lines are read
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSettings {
    /// Tab stops are placed every `tab_width` columns
    pub tab_width: usize,
    /// Recognize the `!$` conditional-compilation sentinel
    pub sentinel: bool,
    /// Upper bound on pieces per logical statement
    pub max_continuation_lines: usize,
}

impl Default for StreamSettings {
    fn default() -> Self {
        Self {
            tab_width: DEFAULT_TAB_WIDTH,
            sentinel: true,
            max_continuation_lines: DEFAULT_MAX_CONTINUATION_LINES,
        }
    }
}

/// A logical Fortran statement with associated metadata
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct LogicalLine {
    /// Joined statement text: continuation markers and comments removed
    pub joined: String,
    /// Comment of each contributing piece ("" when it has none)
    pub comments: Vec<String>,
    /// The original source pieces, in order
    pub lines: Vec<String>,
    /// Statement started on a `!$` conditional-compilation line
    pub conditional: bool,
    /// Statement is a `#` preprocessor directive
    pub preprocessor: bool,
    /// Physical line the statement starts on
    pub first_line: usize,
    /// Physical line the statement ends on
    pub last_line: usize,
}

impl LogicalLine {
    /// Whether the statement carries no code (blank or comment-only)
    #[must_use]
    pub fn is_blank(&self) -> bool {
        self.joined.trim().is_empty()
    }
}

/// Decomposition of one fragment by `LINE_SHAPE_RE`
#[derive(Debug)]
enum Shape<'a> {
    Preprocessor,
    Statement {
        core: &'a str,
        continues: bool,
        comment: Option<&'a str>,
    },
}

fn decompose(fragment: &Fragment) -> std::result::Result<Shape<'_>, LineError> {
    let body = fragment.body.as_str();
    let malformed = || LineError::Malformed {
        line: fragment.line_number,
        text: fragment.raw.clone(),
    };

    let caps = LINE_SHAPE_RE.captures(body).ok_or_else(malformed)?;
    if caps.get(0).map_or(0, |m| m.end()) != body.len() {
        return Err(malformed());
    }
    if caps.name("preprocessor").is_some() {
        return Ok(Shape::Preprocessor);
    }
    Ok(Shape::Statement {
        core: caps.name("core").map_or("", |m| m.as_str()),
        continues: caps.name("continue").is_some(),
        comment: caps.name("comment").map(|m| m.as_str()),
    })
}

/// `InputStream` reads logical Fortran statements from a reader
///
/// Handles line continuations and semicolon splitting
pub struct InputStream<R: BufRead> {
    reader: R,
    fragments: VecDeque<Fragment>,
    line_number: usize,
    settings: StreamSettings,
}

impl<R: BufRead> InputStream<R> {
    /// Create a new `InputStream` with default settings
    pub fn new(reader: R) -> Self {
        Self::with_settings(reader, StreamSettings::default())
    }

    /// Create a new `InputStream`
    ///
    /// # Arguments
    /// * `reader` - The underlying reader
    /// * `settings` - Tab width, sentinel recognition and continuation limit
    pub fn with_settings(reader: R, settings: StreamSettings) -> Self {
        Self {
            reader,
            fragments: VecDeque::new(),
            line_number: 0,
            settings,
        }
    }

    /// Number of physical lines read so far
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// Read one physical line and queue its fragments
    ///
    /// Returns false at EOF
    fn fill_buffer(&mut self) -> Result<bool> {
        let mut raw_line = String::new();
        if self.reader.read_line(&mut raw_line)? == 0 {
            return Ok(false);
        }
        self.line_number += 1;
        let line = expand_tabs(&raw_line, self.settings.tab_width);
        debug!("line {}: read {:?}", self.line_number, line);

        self.fragments.extend(split_fragments(
            &line,
            self.line_number,
            self.settings.sentinel,
        ));
        Ok(true)
    }

    /// Read the next logical Fortran statement
    ///
    /// Returns None at EOF. A statement still expecting a continuation when
    /// the input ends is returned as assembled so far.
    pub fn next_logical_line(&mut self) -> Result<Option<LogicalLine>> {
        let mut statement = LogicalLine::default();
        let mut continuation = false;

        loop {
            if self.fragments.is_empty() && !self.fill_buffer()? {
                break;
            }
            let Some(fragment) = self.fragments.pop_front() else {
                continue;
            };

            if statement.lines.len() >= self.settings.max_continuation_lines {
                bail!(
                    "Line {} exceeds maximum continuation lines ({})",
                    fragment.line_number,
                    self.settings.max_continuation_lines
                );
            }
            if statement.lines.is_empty() {
                statement.first_line = fragment.line_number;
            }
            statement.last_line = fragment.line_number;

            match decompose(&fragment)? {
                Shape::Preprocessor => {
                    if !statement.lines.is_empty() {
                        return Err(LineError::PreprocessorContinuation {
                            line: fragment.line_number,
                            text: fragment.raw.clone(),
                        }
                        .into());
                    }
                    statement.joined.clone_from(&fragment.raw);
                    statement.comments.push(String::new());
                    statement.lines.push(fragment.raw.clone());
                    statement.preprocessor = true;
                    break;
                }
                Shape::Statement {
                    core,
                    continues,
                    comment,
                } => {
                    // The sentinel only means something at the start of a statement;
                    // joining non-blank text it is just dropped
                    if fragment.conditional && statement.is_blank() {
                        statement.conditional = true;
                    }

                    let kept = statement.joined.trim_end_matches(['\r', '\n']).len();
                    statement.joined.truncate(kept);
                    statement.joined.push_str(core);

                    if fragment.conditional || !core.trim().is_empty() {
                        continuation = false;
                    }
                    if continues {
                        continuation = true;
                    }
                    if fragment.terminated {
                        continuation = false;
                    }

                    let comment = if fragment.is_comment_line() {
                        fragment.raw.trim_end_matches(['\r', '\n']).to_string()
                    } else {
                        comment.map(str::to_string).unwrap_or_default()
                    };
                    statement.comments.push(comment);
                    statement.lines.push(fragment.raw.clone());
                }
            }

            if !continuation {
                break;
            }
        }

        if statement.lines.is_empty() {
            return Ok(None);
        }
        debug!(
            "lines {}-{}: statement {:?}",
            statement.first_line, statement.last_line, statement.joined
        );
        Ok(Some(statement))
    }
}

impl<R: BufRead> Iterator for InputStream<R> {
    type Item = Result<LogicalLine>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_logical_line().transpose()
    }
}

/// Helper to create `InputStream` from a string (for testing)
impl<'a> InputStream<BufReader<&'a [u8]>> {
    #[must_use]
    pub fn from_string(s: &'a str) -> Self {
        let reader = BufReader::new(s.as_bytes());
        Self::new(reader)
    }
}
