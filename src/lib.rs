//! flogical - Logical statement reconstruction for free-form Fortran
//!
//! Turns physical source lines into logical statements: continuation lines
//! (`&`) are joined, `;`-separated statements are split apart, comments are
//! collected per physical line and `!$` conditional-compilation lines are
//! recognized as live code.

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]

pub mod cli;
pub mod config;
pub mod directive;
pub mod error;
pub mod logging;
pub mod parser;
pub mod process;
pub mod statement;

// Re-export commonly used types
pub use cli::{build_cli, parse_args, parse_args_from, CliArgs, ReportMode};
pub use config::Config;
pub use directive::{find_directive, parse_directive, DirectiveOverrides};
pub use error::{LineError, Result};
pub use parser::{InputStream, LogicalLine, StreamSettings};
