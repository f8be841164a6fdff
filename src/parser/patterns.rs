/// Regex patterns for free-form Fortran line shapes
///
/// All patterns are compiled once at first use via `LazyLock`.
///
/// All regexes use case-insensitive + unicode flags
use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

/// Build a case-insensitive regex from a compile-time constant pattern.
///
/// # Panics
///
/// Panics if the pattern is invalid. All patterns in this module are
/// compile-time constants covered by the tests below.
fn build_re(pattern: &str) -> Regex {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .unicode(true)
        .build()
        .unwrap_or_else(|_| panic!("Invalid regex pattern: {pattern}"))
}

// Balanced parentheses, nested up to three levels
const PARENS_STR: &str = r"\((?:[^()]+|\((?:[^()]+|\([^()]*\))*\))*\)";

// ===== LINE SHAPE =====

/// Decomposition of one fragment.
///
/// Either a preprocessor directive, or:
/// `spaces, [&], core, [&], spaces, [!comment], [line break]`.
/// The core may hold balanced strings, or one unterminated string that runs
/// to the end of the fragment. Callers must check the match covers the whole
/// fragment.
pub static LINE_SHAPE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(
        r#"\A(?:(?P<preprocessor>#[^\r\n]*\r?\n?)| *(?P<join>&)?(?P<core>(?:[^&!"']+|"[^"]*"|'[^']*'|"[^"]*\z|'[^']*\z)*)(?P<continue>&)? *(?P<comment>![^\r\n]*)?\r?\n?)"#,
    )
});

// ===== CONDITIONAL COMPILATION =====

/// Conditional-compilation sentinel `!$` at the start of a line.
///
/// Group 1 is the indentation, group 2 the marker. Whatever follows the
/// marker is code, with or without a blank in between (`!$x = 1`, `!$omp`).
pub static SENTINEL_RE: LazyLock<Regex> = LazyLock::new(|| build_re(r"\A([ \t]*)(!\$)"));

// ===== STATEMENTS =====

/// USE statement: module name, optional `, only:` and the import list
pub static USE_PARSE_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(
        r"^ *use +(?P<module>[a-zA-Z_][a-zA-Z_0-9]*)(?P<only> *, *only *:)? *(?P<imports>.*)$",
    )
});

/// Variable declaration: type spec, kind/len parameters, attributes, `::` and variables
pub static VAR_DECL_RE: LazyLock<Regex> = LazyLock::new(|| {
    build_re(&format!(
        r"^ *(?P<type>integer(?: *\* *[0-9]+)?|logical|character(?: *\* *[0-9]+)?|real(?: *\* *[0-9]+)?|complex(?: *\* *[0-9]+)?|type) *(?P<parameters>{PARENS_STR})? *(?P<attributes>(?: *, *[a-zA-Z_0-9]+(?: *{PARENS_STR})?)+)? *(?P<dpnt>::)?(?P<vars>[^\n]+)\n?"
    ))
});

/// A single attribute inside the attribute group of a declaration
pub static DECL_ATTRIBUTE_RE: LazyLock<Regex> =
    LazyLock::new(|| build_re(&format!(r"[a-zA-Z_0-9]+(?: *{PARENS_STR})?")));
