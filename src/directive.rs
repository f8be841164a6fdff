//! Inline directive parsing for `! flogical:` comments
//!
//! Supports in-file configuration overrides via special comments:
//! `! flogical: --tab-width 4 --no-sentinel`

use std::io::BufRead;
use std::sync::LazyLock;

use regex::Regex;

use crate::config::Config;

/// Pattern to match flogical directives
static FLOGICAL_DIRECTIVE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^\s*!\s*flogical:\s*(.*?)\s*$")
        .unwrap_or_else(|e| panic!("Invalid directive pattern: {e}"))
});

/// Parsed directive options that can override config
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DirectiveOverrides {
    pub tab_width: Option<usize>,
    pub sentinel: Option<bool>,
    pub max_continuation_lines: Option<usize>,
}

impl DirectiveOverrides {
    /// Check if any overrides are set
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tab_width.is_none() && self.sentinel.is_none() && self.max_continuation_lines.is_none()
    }

    /// Apply the overrides on top of a configuration
    pub fn apply(&self, config: &mut Config) {
        if let Some(tab_width) = self.tab_width {
            config.tab_width = tab_width;
        }
        if let Some(sentinel) = self.sentinel {
            config.sentinel = sentinel;
        }
        if let Some(limit) = self.max_continuation_lines {
            config.max_continuation_lines = limit;
        }
    }
}

/// Check if a line contains a flogical directive
#[must_use]
pub fn is_directive_line(line: &str) -> bool {
    FLOGICAL_DIRECTIVE_RE.is_match(line)
}

/// Parse a flogical directive line and return option overrides
///
/// # Returns
/// * `Some(DirectiveOverrides)` if the line is a directive with at least one known option
/// * `None` otherwise
#[must_use]
pub fn parse_directive(line: &str) -> Option<DirectiveOverrides> {
    let caps = FLOGICAL_DIRECTIVE_RE.captures(line)?;
    parse_directive_args(caps.get(1)?.as_str())
}

/// Parse directive arguments into overrides
fn parse_directive_args(args_str: &str) -> Option<DirectiveOverrides> {
    let mut overrides = DirectiveOverrides::default();
    let mut tokens = args_str.split_whitespace();

    while let Some(token) = tokens.next() {
        match token {
            "-t" | "--tab-width" => {
                overrides.tab_width = tokens.next().and_then(|v| v.parse().ok());
            }
            "--max-continuation-lines" => {
                overrides.max_continuation_lines = tokens.next().and_then(|v| v.parse().ok());
            }
            "--no-sentinel" => overrides.sentinel = Some(false),
            "--sentinel" => overrides.sentinel = Some(true),
            _ => {
                // Unknown option, skip
            }
        }
    }

    if overrides.is_empty() {
        None
    } else {
        Some(overrides)
    }
}

/// Scan input for flogical directives and return the first found
///
/// Only the first directive is used (subsequent ones are ignored).
pub fn find_directive<R: BufRead>(input: &mut R) -> Option<DirectiveOverrides> {
    let mut buffer = String::new();

    while input.read_line(&mut buffer).ok()? > 0 {
        if is_directive_line(&buffer) {
            return parse_directive(&buffer);
        }
        buffer.clear();
    }

    None
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;

    #[test]
    fn test_is_directive_line() {
        assert!(is_directive_line("! flogical: --tab-width 4"));
        assert!(is_directive_line("  ! flogical: --no-sentinel"));
        assert!(is_directive_line("! FLOGICAL: -t 2"));
        assert!(!is_directive_line("! this is a regular comment"));
        assert!(!is_directive_line("x = 1"));
    }

    #[test]
    fn test_parse_directive_tab_width() {
        let overrides = parse_directive("! flogical: --tab-width 4").unwrap();
        assert_eq!(overrides.tab_width, Some(4));
        assert_eq!(overrides.sentinel, None);
    }

    #[test]
    fn test_parse_directive_multiple() {
        let overrides =
            parse_directive("! flogical: -t 2 --no-sentinel --max-continuation-lines 255\n")
                .unwrap();
        assert_eq!(overrides.tab_width, Some(2));
        assert_eq!(overrides.sentinel, Some(false));
        assert_eq!(overrides.max_continuation_lines, Some(255));
    }

    #[test]
    fn test_parse_invalid_directive() {
        assert!(parse_directive("! flogical:").is_none());
        assert!(parse_directive("! flogical: --unknown").is_none());
    }

    #[test]
    fn test_apply_overrides() {
        let mut config = Config::default();
        let overrides = DirectiveOverrides {
            sentinel: Some(false),
            ..Default::default()
        };
        overrides.apply(&mut config);
        assert!(!config.sentinel);
        assert_eq!(config.tab_width, 8);
    }

    #[test]
    fn test_find_directive_first_wins() {
        let source = "program p\n! flogical: -t 4\n! flogical: -t 2\nend\n";
        let overrides = find_directive(&mut Cursor::new(source)).unwrap();
        assert_eq!(overrides.tab_width, Some(4));
    }

    #[test]
    fn test_find_directive_none() {
        assert!(find_directive(&mut Cursor::new("x = 1\n")).is_none());
    }
}
