//! Stderr logger for the `flogical` binary.
//!
//! Library code logs through the `log` facade; this backend prints debug
//! records as `[DEBUG] ...` and warnings as `Warning: ...`.

use log::{Level, LevelFilter, Log, Metadata, Record};

struct StderrLogger;

static LOGGER: StderrLogger = StderrLogger;

impl Log for StderrLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            eprintln!("{}", format_record(record.level(), &record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

/// Render one log message with its level prefix
fn format_record(level: Level, message: &str) -> String {
    match level {
        Level::Error => format!("Error: {message}"),
        Level::Warn => format!("Warning: {message}"),
        Level::Info => message.to_string(),
        Level::Debug => format!("[DEBUG] {message}"),
        Level::Trace => format!("[TRACE] {message}"),
    }
}

/// Install the stderr logger
///
/// `debug` enables debug records; otherwise only warnings and errors show.
/// Calling it more than once keeps the first logger and only updates the level.
pub fn init(debug: bool) {
    // A second call fails to set the logger; the level still applies
    let _ = log::set_logger(&LOGGER);
    log::set_max_level(if debug {
        LevelFilter::Debug
    } else {
        LevelFilter::Warn
    });
}
