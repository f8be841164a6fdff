//! Statement reporting pipeline.
//!
//! Reads a source into logical statements and writes a record for each:
//!
//! - `statements`: the joined text of every non-blank statement
//! - `uses`: module and import list of each `use` statement
//! - `decls`: type and variables of each declaration
//! - `json`: every logical line with its metadata, one object per line
//!
//! [`check_round_trip`] verifies that the raw pieces of all statements
//! reproduce the input exactly.

pub mod pipeline;

pub use pipeline::{check_round_trip, report, Summary};
