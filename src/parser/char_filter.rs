/// `CharFilter` - Iterator that hides comments and string contents
///
/// Wraps the `char_indices` of a single physical line and yields only the
/// characters that are Fortran code. Everything from an unquoted `!` to the
/// end of the line is dropped, and so is everything inside a quoted string.
/// Callers looking for `;` or `&` can therefore act on every character they
/// see without re-checking string state.
///
/// A filter covers exactly one line: string state does not carry over, and a
/// string left open at the end of the line simply swallows the rest of it.

/// Type of string delimiter we're currently inside
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum StringDelimiter {
    #[default]
    None,
    Single, // '...'
    Double, // "..."
}

impl StringDelimiter {
    fn from_quote(c: char) -> Option<Self> {
        match c {
            '\'' => Some(Self::Single),
            '"' => Some(Self::Double),
            _ => None,
        }
    }
}

/// Iterator adapter yielding `(byte position, char)` for code characters only
///
/// The opening quote of a string and its contents are skipped; the closing
/// quote is yielded, since it is the point where code resumes.
pub struct CharFilter<'a> {
    chars: std::str::CharIndices<'a>,
    instring: StringDelimiter,
    done: bool,
}

impl<'a> CharFilter<'a> {
    /// Create a new `CharFilter` over one physical line
    #[must_use]
    pub fn new(line: &'a str) -> Self {
        Self {
            chars: line.char_indices(),
            instring: StringDelimiter::None,
            done: false,
        }
    }

    /// Check if we're currently inside a string
    ///
    /// After the filter is exhausted this tells whether the line ended inside
    /// an unterminated string.
    #[must_use]
    pub fn instring(&self) -> bool {
        self.instring != StringDelimiter::None
    }
}

impl Iterator for CharFilter<'_> {
    type Item = (usize, char);

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            let (pos, c) = self.chars.next()?;

            if self.instring == StringDelimiter::None && c == '!' {
                // Rest of the line is a comment
                self.done = true;
                return None;
            }

            if let Some(delim) = StringDelimiter::from_quote(c) {
                if self.instring == delim {
                    self.instring = StringDelimiter::None;
                    return Some((pos, c));
                }
                if self.instring == StringDelimiter::None {
                    self.instring = delim;
                    continue;
                }
                // Other quote kind inside a string is a literal character
            }

            if self.instring == StringDelimiter::None {
                return Some((pos, c));
            }
        }
    }
}
