//! Classification of logical statements.
//!
//! Runs on the joined text of a [`LogicalLine`](crate::parser::LogicalLine),
//! never on physical lines, so continuations and `;` separators are already
//! resolved. Recognizes `use` statements and variable declarations; anything
//! else is [`StatementKind::Other`].

use serde::Serialize;

use crate::parser::patterns::{DECL_ATTRIBUTE_RE, USE_PARSE_RE, VAR_DECL_RE};
use crate::parser::CharFilter;

/// A `use` statement
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UseStatement {
    pub module: String,
    /// `, only:` was given
    pub only: bool,
    /// Imported names or renames, as written
    pub imports: Vec<String>,
}

/// A variable declaration
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VarDecl {
    /// Type keyword with optional `*N` length, e.g. `real` or `character*8`
    pub type_spec: String,
    /// Kind/len parameter list including parentheses, e.g. `(kind=dp)`
    pub parameters: Option<String>,
    pub attributes: Vec<String>,
    /// `::` separates attributes from variables
    pub double_colon: bool,
    /// Declared entities with their initializers, as written
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub enum StatementKind {
    Use(UseStatement),
    Declaration(VarDecl),
    Other,
}

/// Classify the joined text of a logical statement
#[must_use]
pub fn classify(joined: &str) -> StatementKind {
    if let Some(use_stmt) = parse_use(joined) {
        StatementKind::Use(use_stmt)
    } else if let Some(decl) = parse_var_decl(joined) {
        StatementKind::Declaration(decl)
    } else {
        StatementKind::Other
    }
}

/// Parse a `use` statement
#[must_use]
pub fn parse_use(joined: &str) -> Option<UseStatement> {
    let caps = USE_PARSE_RE.captures(joined.trim_end())?;
    Some(UseStatement {
        module: caps["module"].to_string(),
        only: caps.name("only").is_some(),
        imports: split_top_level(caps.name("imports").map_or("", |m| m.as_str())),
    })
}

/// Parse a variable declaration
///
/// A type keyword glued to more identifier characters (`realx = 1`) is an
/// assignment, and a bare `type` without a parameter list (`type :: point`,
/// `type is (...)`) opens a derived type or a type guard, not a declaration.
#[must_use]
pub fn parse_var_decl(joined: &str) -> Option<VarDecl> {
    let text = joined.trim_end();
    let caps = VAR_DECL_RE.captures(text)?;

    let type_match = caps.name("type")?;
    let glued = text[type_match.end()..]
        .chars()
        .next()
        .is_some_and(|c| c.is_alphanumeric() || c == '_');
    if glued {
        return None;
    }

    let parameters = caps.name("parameters").map(|m| m.as_str().to_string());
    let type_spec = type_match.as_str().to_string();
    if parameters.is_none() && type_spec.eq_ignore_ascii_case("type") {
        return None;
    }

    let double_colon = caps.name("dpnt").is_some();
    let vars = caps.name("vars").map_or("", |m| m.as_str());
    if !double_colon {
        // `integer function f(x)` is a procedure header
        let first_word = vars
            .trim_start()
            .split(|c: char| !(c.is_alphanumeric() || c == '_'))
            .next()
            .unwrap_or_default();
        if first_word.eq_ignore_ascii_case("function") {
            return None;
        }
    }

    let attributes = caps
        .name("attributes")
        .map(|m| {
            DECL_ATTRIBUTE_RE
                .find_iter(m.as_str())
                .map(|a| a.as_str().to_string())
                .collect()
        })
        .unwrap_or_default();

    let variables = split_top_level(vars);
    if variables.is_empty() {
        return None;
    }

    Some(VarDecl {
        type_spec,
        parameters,
        attributes,
        double_colon,
        variables,
    })
}

/// Split a comma-separated list at commas outside brackets and strings
fn split_top_level(list: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut depth = 0usize;
    let mut start = 0;
    for (pos, c) in CharFilter::new(list) {
        match c {
            '(' | '[' => depth += 1,
            ')' | ']' => depth = depth.saturating_sub(1),
            ',' if depth == 0 => {
                items.push(&list[start..pos]);
                start = pos + 1;
            }
            _ => {}
        }
    }
    items.push(&list[start..]);
    items
        .into_iter()
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}
