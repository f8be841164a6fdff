//! Report pipeline
//!
//! Drives an [`InputStream`] to exhaustion and writes one record per
//! statement, filtered and shaped by the [`ReportMode`].

use std::io::{BufRead, Write};

use log::debug;
use serde::Serialize;

use crate::cli::ReportMode;
use crate::config::Config;
use crate::parser::{expand_tabs, InputStream, LogicalLine};
use crate::statement::{classify, StatementKind, UseStatement, VarDecl};
use crate::Result;

/// Counts gathered while reporting one input
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Non-blank logical statements
    pub statements: usize,
    /// Physical lines read
    pub lines: usize,
    pub uses: usize,
    pub declarations: usize,
}

impl Summary {
    /// Add another input's counts to this one
    pub fn merge(&mut self, other: &Summary) {
        self.statements += other.statements;
        self.lines += other.lines;
        self.uses += other.uses;
        self.declarations += other.declarations;
    }
}

/// One logical line as written in json mode
#[derive(Serialize)]
struct JsonRecord<'a> {
    source: &'a str,
    #[serde(flatten)]
    line: &'a LogicalLine,
    kind: &'a StatementKind,
}

fn format_use(stmt: &UseStatement) -> String {
    if stmt.only {
        format!("{} only: {}", stmt.module, stmt.imports.join(", "))
    } else if stmt.imports.is_empty() {
        stmt.module.clone()
    } else {
        // Rename list without `only:`
        format!("{}, {}", stmt.module, stmt.imports.join(", "))
    }
}

fn format_decl(decl: &VarDecl) -> String {
    format!(
        "{}{} :: {}",
        decl.type_spec,
        decl.parameters.as_deref().unwrap_or_default(),
        decl.variables.join(", ")
    )
}

/// Report every logical statement of `reader` to `writer`
///
/// # Arguments
/// * `reader` - Source to read
/// * `writer` - Destination for the records
/// * `config` - Reading options
/// * `mode` - Which statements get a record and what it contains
/// * `source_name` - Prefix for each record (file name or `stdin`)
///
/// [`ReportMode::Check`] writes no records; see [`check_round_trip`].
pub fn report<R: BufRead, W: Write>(
    reader: R,
    writer: &mut W,
    config: &Config,
    mode: ReportMode,
    source_name: &str,
) -> Result<Summary> {
    let mut stream = InputStream::with_settings(reader, config.stream_settings());
    let mut summary = Summary::default();

    while let Some(line) = stream.next_logical_line()? {
        if line.is_blank() {
            continue;
        }
        summary.statements += 1;

        let kind = if line.preprocessor {
            StatementKind::Other
        } else {
            classify(&line.joined)
        };
        match &kind {
            StatementKind::Use(_) => summary.uses += 1,
            StatementKind::Declaration(_) => summary.declarations += 1,
            StatementKind::Other => {}
        }

        let first_line = line.first_line;
        match (mode, &kind) {
            (ReportMode::Statements, _) => {
                writeln!(writer, "{source_name}:{first_line}: {}", line.joined.trim_end())?;
            }
            (ReportMode::Uses, StatementKind::Use(stmt)) => {
                writeln!(writer, "{source_name}:{first_line}: {}", format_use(stmt))?;
            }
            (ReportMode::Declarations, StatementKind::Declaration(decl)) => {
                writeln!(writer, "{source_name}:{first_line}: {}", format_decl(decl))?;
            }
            (ReportMode::Json, _) => {
                let record = JsonRecord {
                    source: source_name,
                    line: &line,
                    kind: &kind,
                };
                serde_json::to_writer(&mut *writer, &record)?;
                writeln!(writer)?;
            }
            _ => {}
        }
    }

    summary.lines = stream.line_number();
    debug!(
        "{source_name}: {} statements on {} lines",
        summary.statements, summary.lines
    );
    Ok(summary)
}

/// Verify that the raw pieces of every statement reproduce the input
///
/// Tabs in `contents` are expanded first, since the stream only ever sees
/// expanded text.
///
/// # Returns
/// * `Ok(None)` if the round trip is exact
/// * `Ok(Some(line))` with the first physical line that differs
pub fn check_round_trip(contents: &str, config: &Config) -> Result<Option<usize>> {
    let stream = InputStream::with_settings(contents.as_bytes(), config.stream_settings());
    let mut rebuilt = String::with_capacity(contents.len());
    for line in stream {
        for piece in &line?.lines {
            rebuilt.push_str(piece);
        }
    }

    let expected = expand_tabs(contents, config.tab_width);
    if rebuilt == expected {
        return Ok(None);
    }

    let mut expected_lines = expected.split_inclusive('\n');
    let mut rebuilt_lines = rebuilt.split_inclusive('\n');
    let mut line_number = 0;
    loop {
        line_number += 1;
        match (expected_lines.next(), rebuilt_lines.next()) {
            (Some(a), Some(b)) if a == b => {}
            (None, None) => return Ok(None),
            _ => return Ok(Some(line_number)),
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use super::*;
    use crate::error::LineError;

    fn run(source: &str, mode: ReportMode) -> (String, Summary) {
        let mut output = Vec::new();
        let summary = report(
            Cursor::new(source),
            &mut output,
            &Config::default(),
            mode,
            "test.f90",
        )
        .unwrap();
        (String::from_utf8(output).unwrap(), summary)
    }

    const SOURCE: &str = "\
module m
  use iso_fortran_env, only: real64, &
       int32
  implicit none
  real(kind=real64) :: a, b ! values
  integer i; i = 1
end module m
";

    #[test]
    fn test_statements_mode() {
        let (output, summary) = run(SOURCE, ReportMode::Statements);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines[0], "test.f90:1: module m");
        assert_eq!(lines[1], "test.f90:2: use iso_fortran_env, only: real64, int32");
        assert_eq!(lines[4], "test.f90:6: integer i");
        assert_eq!(lines[5], "test.f90:6: i = 1");
        assert_eq!(lines.len(), 7);
        assert_eq!(summary.statements, 7);
        assert_eq!(summary.lines, 7);
    }

    #[test]
    fn test_uses_mode() {
        let (output, summary) = run(SOURCE, ReportMode::Uses);
        assert_eq!(output, "test.f90:2: iso_fortran_env only: real64, int32\n");
        assert_eq!(summary.uses, 1);
    }

    #[test]
    fn test_decls_mode() {
        let (output, summary) = run(SOURCE, ReportMode::Declarations);
        assert_eq!(
            output,
            "test.f90:5: real(kind=real64) :: a, b\ntest.f90:6: integer :: i\n"
        );
        assert_eq!(summary.declarations, 2);
    }

    #[test]
    fn test_json_mode() {
        let (output, _) = run("x = 1 ! set\n", ReportMode::Json);
        let value: serde_json::Value = serde_json::from_str(output.trim_end()).unwrap();
        assert_eq!(value["source"], "test.f90");
        assert_eq!(value["joined"], "x = 1 ");
        assert_eq!(value["comments"][0], "! set");
        assert_eq!(value["first_line"], 1);
        assert_eq!(value["kind"], "Other");
    }

    #[test]
    fn test_check_mode_writes_nothing() {
        let (output, summary) = run(SOURCE, ReportMode::Check);
        assert!(output.is_empty());
        assert_eq!(summary.statements, 7);
    }

    #[test]
    fn test_preprocessor_not_classified() {
        let (output, summary) = run("#define integer real\n", ReportMode::Statements);
        assert_eq!(output, "test.f90:1: #define integer real\n");
        assert_eq!(summary.declarations, 0);
    }

    #[test]
    fn test_report_propagates_line_errors() {
        let mut output = Vec::new();
        let err = report(
            Cursor::new("x = 1 &\n#ifdef A\n"),
            &mut output,
            &Config::default(),
            ReportMode::Statements,
            "bad.f90",
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LineError>(),
            Some(LineError::PreprocessorContinuation { line: 2, .. })
        ));
    }

    #[test]
    fn test_summary_merge() {
        let mut total = Summary {
            statements: 2,
            lines: 3,
            uses: 1,
            declarations: 0,
        };
        total.merge(&Summary {
            statements: 1,
            lines: 1,
            uses: 0,
            declarations: 1,
        });
        assert_eq!(total.statements, 3);
        assert_eq!(total.lines, 4);
        assert_eq!(total.uses, 1);
        assert_eq!(total.declarations, 1);
    }

    #[test]
    fn test_round_trip_exact() {
        let config = Config::default();
        assert_eq!(check_round_trip(SOURCE, &config).unwrap(), None);
        assert_eq!(
            check_round_trip("\tx = 1; y = 2 &\n\t! note\n  & + 3\n!$ z = 4\n", &config).unwrap(),
            None
        );
        assert_eq!(check_round_trip("", &config).unwrap(), None);
    }
}
