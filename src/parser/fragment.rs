/// Per-line splitting of physical lines into statement fragments
///
/// A physical line is cut at every `;` that is Fortran code (not inside a
/// string, not inside a comment). A conditional-compilation line (`!$ ...`)
/// has its marker stripped before scanning, and the pieces are tagged so the
/// stream can treat them as live code. Splitting is stateless: it looks at a
/// single line and nothing else.
use log::trace;

use super::char_filter::CharFilter;
use super::patterns::SENTINEL_RE;

/// A `;`-delimited slice of one physical line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fragment {
    /// Exact source text covered, separator included.
    /// The sentinel and its indentation are kept on the first fragment of a
    /// conditional line, so joining every fragment's `raw` gives back the line.
    pub raw: String,
    /// Statement text: no sentinel, no trailing separator
    pub body: String,
    /// Whether this fragment carries the `!$` sentinel
    pub conditional: bool,
    /// Whether the fragment was cut at a `;`, which ends its statement
    pub terminated: bool,
    /// Physical line number (1-based)
    pub line_number: usize,
}

impl Fragment {
    fn new(prefix: &str, piece: &str, body: &str, line_number: usize) -> Self {
        Self {
            raw: format!("{prefix}{piece}"),
            body: body.to_string(),
            conditional: !prefix.is_empty(),
            terminated: piece.len() > body.len(),
            line_number,
        }
    }

    /// Whether the raw text is a comment-only line (and not a sentinel line)
    #[must_use]
    pub fn is_comment_line(&self) -> bool {
        !self.conditional && self.raw.trim_start().starts_with('!')
    }
}

/// Expand tabs to stops every `width` columns
#[must_use]
pub fn expand_tabs(line: &str, width: usize) -> String {
    if !line.contains('\t') {
        return line.to_string();
    }
    let width = width.max(1);
    let mut result = String::with_capacity(line.len() + width);
    let mut column = 0;
    for c in line.chars() {
        match c {
            '\t' => {
                let pad = width - column % width;
                result.extend(std::iter::repeat(' ').take(pad));
                column += pad;
            }
            '\n' | '\r' => {
                result.push(c);
                column = 0;
            }
            _ => {
                result.push(c);
                column += 1;
            }
        }
    }
    result
}

/// Byte length of the leading sentinel (indentation + `!$`), if any
#[must_use]
pub fn sentinel_prefix_len(line: &str) -> Option<usize> {
    SENTINEL_RE
        .captures(line)
        .and_then(|caps| caps.get(2))
        .map(|marker| marker.end())
}

/// Split one tab-expanded physical line into fragments
///
/// `sentinel` enables recognition of the `!$` conditional-compilation marker.
/// An empty line yields no fragments; any other line yields at least one.
#[must_use]
pub fn split_fragments(line: &str, line_number: usize, sentinel: bool) -> Vec<Fragment> {
    if line.is_empty() {
        return Vec::new();
    }

    // Preprocessor lines are passed through whole
    if line.starts_with('#') {
        return vec![Fragment::new("", line, line, line_number)];
    }

    let prefix_len = if sentinel {
        sentinel_prefix_len(line).unwrap_or(0)
    } else {
        0
    };
    let (mut prefix, rest) = line.split_at(prefix_len);

    let mut fragments = Vec::new();
    let mut start = 0;
    let mut filter = CharFilter::new(rest);
    for (pos, c) in filter.by_ref() {
        let end = pos + c.len_utf8();
        if c == ';' || end == rest.len() {
            let body_end = if c == ';' { pos } else { end };
            fragments.push(Fragment::new(
                prefix,
                &rest[start..end],
                &rest[start..body_end],
                line_number,
            ));
            prefix = "";
            start = end;
        }
    }

    if filter.instring() {
        trace!("line {line_number}: unterminated string runs to end of line");
    }

    // Trailing comment or unterminated string
    if start < rest.len() || fragments.is_empty() {
        fragments.push(Fragment::new(prefix, &rest[start..], &rest[start..], line_number));
    }

    trace!(
        "line {line_number}: split into {} fragment(s)",
        fragments.len()
    );
    fragments
}
