//! Integration tests for flogical
//!
//! These tests drive the public API end to end: physical lines in, logical
//! statements and reports out.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::io::{BufReader, Cursor};

use flogical::process::{check_round_trip, report};
use flogical::statement::{classify, StatementKind};
use flogical::{
    find_directive, Config, InputStream, LineError, LogicalLine, ReportMode, StreamSettings,
};

fn statements(source: &str) -> Vec<LogicalLine> {
    InputStream::from_string(source)
        .collect::<flogical::Result<Vec<_>>>()
        .unwrap()
}

#[test]
fn test_exclamation_in_string_is_not_a_comment() {
    let lines = statements("print *, 'Hello! World' ! greet\n");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].joined, "print *, 'Hello! World' ");
    assert_eq!(lines[0].comments, vec!["! greet"]);
}

#[test]
fn test_continuation_joined_without_ampersand() {
    let lines = statements("x = 1 &\n  + 2\n");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].joined, "x = 1 + 2\n");
    assert!(!lines[0].joined.contains('&'));
    assert_eq!(lines[0].lines, vec!["x = 1 &\n", "  + 2\n"]);
    assert_eq!(lines[0].first_line, 1);
    assert_eq!(lines[0].last_line, 2);
}

#[test]
fn test_semicolon_splits_statements() {
    let lines = statements("a = 1 ; b = 2\n");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].joined, "a = 1 ");
    assert_eq!(lines[0].lines, vec!["a = 1 ;"]);
    assert_eq!(lines[1].joined, "b = 2\n");
    assert_eq!(lines[1].lines, vec![" b = 2\n"]);
    assert_eq!(lines[0].first_line, 1);
    assert_eq!(lines[1].first_line, 1);
}

#[test]
fn test_sentinel_line_is_conditional_code() {
    let lines = statements("!$ x = 1\n");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].joined, "x = 1\n");
    assert!(lines[0].conditional);
    assert_eq!(lines[0].lines, vec!["!$ x = 1\n"]);
}

#[test]
fn test_sentinel_without_blank_is_conditional_code() {
    let lines = statements("!$x=1\n!$omp parallel do\n  !$OMP END PARALLEL DO\n");
    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0].joined, "x=1\n");
    assert_eq!(lines[1].joined, "omp parallel do\n");
    assert_eq!(lines[2].joined, "OMP END PARALLEL DO\n");
    assert!(lines.iter().all(|line| line.conditional));
    assert!(lines.iter().all(|line| line.comments == vec![""]));
}

#[test]
fn test_separator_only_line_ends_continuation() {
    let lines = statements("x = 1 &\n;\ny = 2\n");
    let joined: Vec<&str> = lines
        .iter()
        .filter(|line| !line.is_blank())
        .map(|line| line.joined.trim_end())
        .collect();
    assert_eq!(joined, vec!["x = 1", "y = 2"]);
    assert_eq!(lines[0].last_line, 2);
    let rebuilt: String = lines.iter().flat_map(|line| line.lines.clone()).collect();
    assert_eq!(rebuilt, "x = 1 &\n;\ny = 2\n");
}

#[test]
fn test_sentinel_disabled_is_comment() {
    let settings = StreamSettings {
        sentinel: false,
        ..StreamSettings::default()
    };
    let mut stream = InputStream::with_settings(Cursor::new("!$ x = 1\n"), settings);
    let line = stream.next_logical_line().unwrap().unwrap();
    assert!(line.is_blank());
    assert!(!line.conditional);
    assert_eq!(line.comments, vec!["!$ x = 1"]);
}

#[test]
fn test_preprocessor_line_passes_through() {
    let lines = statements("#define X 1\ny = X\n");
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0].joined, "#define X 1\n");
    assert!(lines[0].preprocessor);
    assert_eq!(lines[0].comments, vec![""]);
    assert_eq!(lines[1].joined, "y = X\n");
}

#[test]
fn test_comment_lines_inside_continuation() {
    let source = "call foo(a, & ! first\n  ! aside\n\n  & b)\n";
    let lines = statements(source);
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].joined, "call foo(a,  b)\n");
    assert_eq!(lines[0].comments, vec!["! first", "  ! aside", "", ""]);
    assert_eq!(lines[0].lines.len(), 4);
}

#[test]
fn test_round_trip_reproduces_input() {
    let source = "\
module demo
  use iso_c_binding, only: c_int ! interop
  implicit none
  integer :: a = 1, b = 2; real :: c
contains
  subroutine s()
    print *, 'a; b', &
         \"c ! d\"
!$  call omp_init() ; a = 2
#ifdef DEBUG
    write(*, *) a
#endif
  end subroutine s
end module demo
";
    let rebuilt: String = statements(source)
        .iter()
        .flat_map(|line| line.lines.iter().map(String::as_str))
        .collect();
    assert_eq!(rebuilt, source);
    assert_eq!(check_round_trip(source, &Config::default()).unwrap(), None);
}

#[test]
fn test_tabs_are_expanded() {
    let lines = statements("\tx = 1\n");
    assert_eq!(lines[0].lines, vec!["        x = 1\n"]);
    assert_eq!(lines[0].joined, "x = 1\n");
}

#[test]
fn test_unterminated_continuation_at_eof() {
    let lines = statements("x = 1 + &\n");
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].joined, "x = 1 + ");
}

#[test]
fn test_preprocessor_inside_continuation_fails() {
    let mut stream = InputStream::from_string("x = 1 &\n#ifdef A\n  + 2\n");
    let err = stream.next_logical_line().unwrap_err();
    let line_error = err.downcast_ref::<LineError>().unwrap();
    assert_eq!(line_error.line(), 2);
    assert!(matches!(line_error, LineError::PreprocessorContinuation { .. }));
}

#[test]
fn test_malformed_line_fails() {
    let mut stream = InputStream::from_string("a & b\n");
    let err = stream.next_logical_line().unwrap_err();
    assert!(matches!(
        err.downcast_ref::<LineError>(),
        Some(LineError::Malformed { line: 1, .. })
    ));
}

#[test]
fn test_classify_joined_statements() {
    let lines = statements("use mpi, only: &\n    mpi_comm_world\nreal(8), &\n  intent(in) :: x\n");
    match classify(&lines[0].joined) {
        StatementKind::Use(stmt) => {
            assert_eq!(stmt.module, "mpi");
            assert_eq!(stmt.imports, vec!["mpi_comm_world"]);
        }
        other => panic!("expected use statement, got {other:?}"),
    }
    match classify(&lines[1].joined) {
        StatementKind::Declaration(decl) => {
            assert_eq!(decl.type_spec, "real");
            assert_eq!(decl.attributes, vec!["intent(in)"]);
            assert_eq!(decl.variables, vec!["x"]);
        }
        other => panic!("expected declaration, got {other:?}"),
    }
}

#[test]
fn test_report_with_directive_overrides() {
    let source = "! flogical: --no-sentinel\n!$ x = 1\ny = 2\n";
    let mut config = Config::default();
    if let Some(overrides) = find_directive(&mut BufReader::new(Cursor::new(source))) {
        overrides.apply(&mut config);
    }
    assert!(!config.sentinel);

    let mut output = Vec::new();
    let summary = report(
        Cursor::new(source),
        &mut output,
        &config,
        ReportMode::Statements,
        "demo.f90",
    )
    .unwrap();
    assert_eq!(String::from_utf8(output).unwrap(), "demo.f90:3: y = 2\n");
    assert_eq!(summary.statements, 1);
    assert_eq!(summary.lines, 3);
}

#[test]
fn test_report_json_lines() {
    let mut output = Vec::new();
    report(
        Cursor::new("use m\ninteger :: i\n"),
        &mut output,
        &Config::default(),
        ReportMode::Json,
        "demo.f90",
    )
    .unwrap();
    let records: Vec<serde_json::Value> = String::from_utf8(output)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["kind"]["Use"]["module"], "m");
    assert_eq!(records[1]["kind"]["Declaration"]["variables"][0], "i");
    assert_eq!(records[1]["first_line"], 2);
}
