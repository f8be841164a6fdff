//! flogical - Logical statement reporter for free-form Fortran source

#![warn(clippy::all)]
#![warn(clippy::pedantic)]

use std::fs::File;
use std::io::{self, BufReader, Cursor, IsTerminal, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use flogical::process::{check_round_trip, report, Summary};
use flogical::{find_directive, logging, parse_args, CliArgs, Config, ReportMode, Result};
use glob::Pattern;
use log::{debug, warn};
use rayon::prelude::*;
use walkdir::WalkDir;

/// Fortran file extensions to process
const FORTRAN_EXTENSIONS: &[&str] = &[
    "f90", "f95", "f03", "f08", "f18", "f", "for", "ftn", "fpp", "F90", "F95", "F03", "F08", "F18",
    "F", "FOR", "FTN", "FPP",
];

/// Default maximum file size in bytes (100 MB)
/// Files larger than this are skipped to prevent memory exhaustion
const DEFAULT_MAX_FILE_SIZE: u64 = 100 * 1024 * 1024;

/// What reading one input produced
struct FileReport {
    output: Vec<u8>,
    summary: Summary,
    /// False when check mode found a round-trip mismatch
    passed: bool,
}

fn main() -> Result<ExitCode> {
    let args = parse_args();
    logging::init(args.debug);

    let use_stdin =
        args.inputs.is_empty() || (args.inputs.len() == 1 && args.inputs[0].as_os_str() == "-");

    // If no inputs and running interactively, print usage; otherwise read from stdin
    if args.inputs.is_empty() && io::stdin().is_terminal() {
        print_usage();
        return Ok(ExitCode::SUCCESS);
    }

    if use_stdin {
        let config = build_config(&args, None)?;
        let file_report = process_stdin(&config, &args)?;
        io::stdout().write_all(&file_report.output)?;
        return Ok(if file_report.passed {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    // An explicit config file applies to every input; otherwise each file
    // discovers its own
    let base_config = if args.config.is_some() {
        Some(build_config(&args, None)?)
    } else {
        None
    };

    if let Some(jobs) = args.jobs {
        if jobs > 0 {
            if let Err(e) = rayon::ThreadPoolBuilder::new()
                .num_threads(jobs)
                .build_global()
            {
                warn!("failed to configure thread pool: {e}");
            }
        }
    }

    let (files, missing) = collect_files(&args);
    if files.is_empty() && missing == 0 {
        if !args.silent {
            eprintln!("No Fortran files found.");
        }
        return Ok(ExitCode::SUCCESS);
    }

    let run = |path: &PathBuf| -> Result<FileReport> {
        match base_config.as_ref() {
            Some(config) => process_single_file(path, config, &args),
            None => {
                let config = build_config(&args, Some(path.as_path()))?;
                process_single_file(path, &config, &args)
            }
        }
    };

    // Per-file output is buffered and written in input order
    let results: Vec<Result<FileReport>> = if args.jobs == Some(1) {
        files.iter().map(run).collect()
    } else {
        files.par_iter().map(run).collect()
    };

    let mut stdout = io::stdout().lock();
    let mut total = Summary::default();
    let mut failed = missing;
    for (path, result) in files.iter().zip(results) {
        match result {
            Ok(file_report) => {
                stdout.write_all(&file_report.output)?;
                total.merge(&file_report.summary);
                if !file_report.passed {
                    failed += 1;
                }
            }
            Err(e) => {
                failed += 1;
                eprintln!("Error processing {}: {e}", path.display());
            }
        }
    }
    stdout.flush()?;

    if !args.silent {
        eprintln!(
            "Read {} files: {} statements on {} lines, {} use statements, {} declarations.",
            files.len(),
            total.statements,
            total.lines,
            total.uses,
            total.declarations
        );
        if failed > 0 {
            eprintln!("{failed} files failed.");
        }
    }

    Ok(if failed == 0 {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    })
}

/// Build configuration from CLI args and optional config file
///
/// If `for_path` is provided and no explicit config file is specified,
/// uses auto-discovery to find config files in parent directories.
fn build_config(args: &CliArgs, for_path: Option<&Path>) -> Result<Config> {
    let mut config = if let Some(config_path) = &args.config {
        debug!("Using explicit config file: {}", config_path.display());
        Config::from_toml_file(config_path)?
    } else {
        let start = match for_path {
            Some(path) => path.to_path_buf(),
            None => std::env::current_dir().unwrap_or_default(),
        };
        let discovered = Config::discover_config_files(&start);
        if discovered.is_empty() {
            debug!("No config files discovered for: {}", start.display());
        } else {
            debug!("Discovered config files for {}:", start.display());
            for f in &discovered {
                debug!("  - {}", f.display());
            }
        }
        Config::from_discovered_files(&start)
    };

    // Override with CLI arguments
    if let Some(tab_width) = args.tab_width {
        config.tab_width = tab_width;
    }
    if args.no_sentinel {
        config.sentinel = false;
    }
    if let Some(limit) = args.max_continuation_lines {
        config.max_continuation_lines = limit;
    }

    debug!("Configuration:");
    debug!("  tab_width: {}", config.tab_width);
    debug!("  sentinel: {}", config.sentinel);
    debug!("  max_continuation_lines: {}", config.max_continuation_lines);

    if let Some(error) = config.validate() {
        anyhow::bail!("Invalid configuration: {error}");
    }

    Ok(config)
}

/// Collect all files to process, handling directories and recursive flag
///
/// Also returns how many inputs did not exist.
fn collect_files(args: &CliArgs) -> (Vec<PathBuf>, usize) {
    let exclude_patterns: Vec<Pattern> = args
        .exclude
        .iter()
        .filter_map(|p| match Pattern::new(p) {
            Ok(pattern) => Some(pattern),
            Err(e) => {
                warn!("ignoring invalid exclude pattern '{p}': {e}");
                None
            }
        })
        .collect();

    let custom_extensions = &args.fortran_extensions;
    let mut files = Vec::new();
    let mut missing = 0;

    for input in &args.inputs {
        if input.is_file() {
            if !is_excluded(input, &exclude_patterns) {
                files.push(input.clone());
            }
        } else if input.is_dir() {
            if args.recursive {
                // WalkDir reports symlink loops as errors, which are skipped
                for entry in WalkDir::new(input)
                    .follow_links(true)
                    .max_depth(256)
                    .sort_by_file_name()
                    .into_iter()
                    .filter_map(std::result::Result::ok)
                {
                    let path = entry.path();
                    if path.is_file()
                        && is_fortran_file(path, custom_extensions)
                        && !is_excluded(path, &exclude_patterns)
                    {
                        files.push(path.to_path_buf());
                    }
                }
            } else if let Ok(entries) = std::fs::read_dir(input) {
                let mut children: Vec<PathBuf> = entries
                    .filter_map(std::result::Result::ok)
                    .map(|entry| entry.path())
                    .filter(|path| {
                        path.is_file()
                            && is_fortran_file(path, custom_extensions)
                            && !is_excluded(path, &exclude_patterns)
                    })
                    .collect();
                children.sort();
                files.extend(children);
            }
        } else {
            missing += 1;
            eprintln!("Error processing {}: no such file or directory", input.display());
        }
    }

    (files, missing)
}

/// Check if a path matches any exclusion pattern
fn is_excluded(path: &Path, patterns: &[Pattern]) -> bool {
    if patterns.is_empty() {
        return false;
    }

    let path_str = path.to_string_lossy();

    patterns.iter().any(|pattern| {
        // Full path, file name, or any single component
        pattern.matches(&path_str)
            || path
                .file_name()
                .is_some_and(|name| pattern.matches(&name.to_string_lossy()))
            || path.components().any(|component| match component {
                std::path::Component::Normal(c) => pattern.matches(&c.to_string_lossy()),
                _ => false,
            })
    })
}

/// Check if a file has a Fortran extension
/// Checks against both default extensions and any custom extensions provided
fn is_fortran_file(path: &Path, custom_extensions: &[String]) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| {
            FORTRAN_EXTENSIONS.contains(&ext)
                || custom_extensions
                    .iter()
                    .any(|custom| custom.strip_prefix('.').unwrap_or(custom) == ext)
        })
}

/// Apply directive overrides from file contents to a configuration
fn apply_directive_overrides(config: &mut Config, contents: &[u8], source_name: &str) {
    let cursor = Cursor::new(contents);
    if let Some(overrides) = find_directive(&mut BufReader::new(cursor)) {
        debug!("Found file directive in {source_name}: {overrides:?}");
        overrides.apply(config);
    }
}

/// Report one in-memory input
fn process_contents(
    contents: Vec<u8>,
    config: &Config,
    args: &CliArgs,
    source_name: &str,
) -> Result<FileReport> {
    let mut file_config = config.clone();
    apply_directive_overrides(&mut file_config, &contents, source_name);
    if let Some(error) = file_config.validate() {
        anyhow::bail!("Invalid directive: {error}");
    }

    let mut output = Vec::new();
    let summary = report(
        BufReader::new(Cursor::new(&contents)),
        &mut output,
        &file_config,
        args.mode,
        source_name,
    )?;

    let mut passed = true;
    if args.mode == ReportMode::Check {
        let text = String::from_utf8(contents)?;
        match check_round_trip(&text, &file_config)? {
            None => writeln!(output, "{source_name}: round trip OK")?,
            Some(line) => {
                passed = false;
                writeln!(output, "{source_name}:{line}: round trip mismatch")?;
            }
        }
    }

    Ok(FileReport {
        output,
        summary,
        passed,
    })
}

/// Process a single file
fn process_single_file(path: &Path, config: &Config, args: &CliArgs) -> Result<FileReport> {
    // Check file size BEFORE reading to prevent memory exhaustion
    let file_size = std::fs::metadata(path)?.len();
    if file_size > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "{} MB exceeds limit of {} MB",
            file_size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    let mut contents = Vec::new();
    File::open(path)?.read_to_end(&mut contents)?;
    debug!("Reading: {}", path.display());

    process_contents(contents, config, args, &path.to_string_lossy())
}

/// Process input from stdin
fn process_stdin(config: &Config, args: &CliArgs) -> Result<FileReport> {
    let mut contents = Vec::new();
    io::stdin().read_to_end(&mut contents)?;

    #[allow(clippy::cast_possible_truncation)]
    let stdin_size = contents.len() as u64;
    if stdin_size > DEFAULT_MAX_FILE_SIZE {
        anyhow::bail!(
            "stdin input too large ({} MB exceeds limit of {} MB)",
            stdin_size / (1024 * 1024),
            DEFAULT_MAX_FILE_SIZE / (1024 * 1024)
        );
    }

    process_contents(contents, config, args, "stdin")
}

fn print_usage() {
    println!(
        "flogical v{} - Logical statement reporter for free-form Fortran",
        env!("CARGO_PKG_VERSION")
    );
    println!();
    println!("Joins continuation lines, splits ';'-separated statements and");
    println!("separates comments, then reports the resulting statements.");
    println!();
    println!("Usage:");
    println!("  flogical [OPTIONS] <FILE>...");
    println!("  flogical [OPTIONS] -r <DIRECTORY>");
    println!("  flogical [OPTIONS] -              # Read from stdin");
    println!("  cat file.f90 | flogical           # Pipe input");
    println!();
    println!("Examples:");
    println!("  flogical file.f90               # List statements");
    println!("  flogical -m uses -r src/        # List use statements of a tree");
    println!("  flogical -m json file.f90       # One JSON object per logical line");
    println!("  flogical -m check -r src/       # Verify lossless reconstruction");
    println!();
    println!("Options:");
    println!("  -m, --mode <MODE>               statements, uses, decls, json, check");
    println!("  -t, --tab-width <NUM>           Tab stop width [default: 8]");
    println!("  --no-sentinel                   Treat '!$' lines as comments");
    println!("  --max-continuation-lines <NUM>  Pieces per statement [default: 10000]");
    println!("  -r, --recursive                 Process directories recursively");
    println!("  -e, --exclude <PATTERN>         Exclude files/dirs matching pattern (repeatable)");
    println!("  -f, --fortran <EXT>             Additional Fortran extension (repeatable)");
    println!("  -j, --jobs <NUM>                Parallel jobs (0=auto, 1=sequential)");
    println!("  -c, --config <FILE>             Config file path (overrides auto-discovery)");
    println!("  -D, --debug                     Enable debug output");
    println!("  -S, --silent                    Silent mode");
    println!("  -h, --help                      Print help");
    println!();
    println!("Supported extensions: .f90, .f95, .f03, .f08, .f18, .f, .for, .ftn, .fpp (case-insensitive)");
    println!();
    println!("Config file auto-discovery:");
    println!("  Searches for flogical.toml in parent directories");
    println!("  starting from the file being read up to the root directory.");
    println!("  Also checks flogical.toml in the home directory.");
    println!("  More specific configs (closer to file) override less specific ones.");
    println!("  A '! flogical: --tab-width 4' comment in a file overrides both.");
}
