//! Command-line interface for flogical.
//!
//! Defines CLI arguments using clap builder API

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use clap::{Arg, ArgAction, Command};

/// What the report pipeline writes for each statement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReportMode {
    /// Every non-blank statement with its joined text
    #[default]
    Statements,
    /// `use` statements only
    Uses,
    /// Variable declarations only
    Declarations,
    /// One JSON object per logical line
    Json,
    /// Verify that raw lines reproduce the input
    Check,
}

impl ReportMode {
    /// Names accepted by `--mode`
    pub const NAMES: [&'static str; 5] = ["statements", "uses", "decls", "json", "check"];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            ReportMode::Statements => "statements",
            ReportMode::Uses => "uses",
            ReportMode::Declarations => "decls",
            ReportMode::Json => "json",
            ReportMode::Check => "check",
        }
    }
}

impl FromStr for ReportMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "statements" => Ok(ReportMode::Statements),
            "uses" => Ok(ReportMode::Uses),
            "decls" => Ok(ReportMode::Declarations),
            "json" => Ok(ReportMode::Json),
            "check" => Ok(ReportMode::Check),
            other => Err(format!("unknown mode '{other}'")),
        }
    }
}

impl fmt::Display for ReportMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// CLI arguments parsed from command line
#[derive(Debug, Clone)]
pub struct CliArgs {
    /// Files or directories to read
    pub inputs: Vec<PathBuf>,

    /// Report mode
    pub mode: ReportMode,

    /// Config file path
    pub config: Option<PathBuf>,

    /// Tab stop width
    pub tab_width: Option<usize>,

    /// Treat `!$` lines as comments
    pub no_sentinel: bool,

    /// Maximum pieces in one logical statement
    pub max_continuation_lines: Option<usize>,

    /// Recursive directory processing
    pub recursive: bool,

    /// Exclude patterns for files/directories (glob patterns)
    pub exclude: Vec<String>,

    /// Custom Fortran file extensions (in addition to defaults)
    pub fortran_extensions: Vec<String>,

    /// Number of parallel jobs (0 = auto, 1 = sequential)
    pub jobs: Option<usize>,

    /// Enable debug output
    pub debug: bool,

    /// Silent mode (no summary output)
    pub silent: bool,
}

/// Build the clap Command for parsing CLI arguments
#[must_use]
pub fn build_cli() -> Command {
    Command::new("flogical")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Reconstructs logical statements from free-form Fortran source")
        .arg(
            Arg::new("inputs")
                .help("Files or directories to read ('-' for stdin)")
                .value_name("FILE")
                .num_args(1..)
                .required(false)
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .help("What to report for each statement [default: statements]")
                .value_name("MODE")
                .value_parser(ReportMode::NAMES),
        )
        .arg(
            Arg::new("config")
                .short('c')
                .long("config")
                .help("Path to configuration file (overrides auto-discovery)")
                .value_name("FILE")
                .value_parser(clap::value_parser!(PathBuf)),
        )
        .arg(
            Arg::new("tab-width")
                .short('t')
                .long("tab-width")
                .help("Tab stop width used when expanding tabs [default: 8]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("no-sentinel")
                .long("no-sentinel")
                .help("Treat '!$' conditional-compilation lines as plain comments")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("max-continuation-lines")
                .long("max-continuation-lines")
                .help("Maximum pieces in one logical statement [default: 10000]")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("recursive")
                .short('r')
                .long("recursive")
                .help("Recursively process directories")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("exclude")
                .short('e')
                .long("exclude")
                .help("Exclude files/directories matching pattern (glob syntax, can be repeated)")
                .value_name("PATTERN")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("fortran")
                .short('f')
                .long("fortran")
                .help("Additional Fortran file extension (can be repeated, e.g., -f f03 -f F03)")
                .value_name("EXT")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("jobs")
                .short('j')
                .long("jobs")
                .help("Number of parallel jobs (0=auto, 1=sequential)")
                .value_name("NUM")
                .value_parser(clap::value_parser!(usize)),
        )
        .arg(
            Arg::new("debug")
                .short('D')
                .long("debug")
                .help("Enable debug output (shows config, lines read, statements emitted)")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("silent")
                .short('S')
                .long("silent")
                .help("Silent mode (no summary output)")
                .action(ArgAction::SetTrue),
        )
}

/// Parse CLI arguments from command line
#[must_use]
pub fn parse_args() -> CliArgs {
    args_from_matches(&build_cli().get_matches())
}

/// Parse CLI arguments from an iterator (for testing)
#[must_use]
pub fn parse_args_from<I, T>(args: I) -> CliArgs
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    args_from_matches(&build_cli().get_matches_from(args))
}

/// Convert clap `ArgMatches` to `CliArgs`
fn args_from_matches(matches: &clap::ArgMatches) -> CliArgs {
    // Values are restricted to ReportMode::NAMES by clap
    let mode = matches
        .get_one::<String>("mode")
        .and_then(|name| name.parse().ok())
        .unwrap_or_default();

    CliArgs {
        inputs: matches
            .get_many::<PathBuf>("inputs")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        mode,
        config: matches.get_one::<PathBuf>("config").cloned(),
        tab_width: matches.get_one::<usize>("tab-width").copied(),
        no_sentinel: matches.get_flag("no-sentinel"),
        max_continuation_lines: matches.get_one::<usize>("max-continuation-lines").copied(),
        recursive: matches.get_flag("recursive"),
        exclude: matches
            .get_many::<String>("exclude")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        fortran_extensions: matches
            .get_many::<String>("fortran")
            .map(|vals| vals.cloned().collect())
            .unwrap_or_default(),
        jobs: matches.get_one::<usize>("jobs").copied(),
        debug: matches.get_flag("debug"),
        silent: matches.get_flag("silent"),
    }
}
