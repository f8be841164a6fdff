//! Fortran source reading utilities.
//!
//! This module turns physical source lines into logical statements:
//! - [`CharFilter`]: Iterator adapter that hides string contents and comments
//! - [`split_fragments`]: Splits one physical line at `;` separators
//! - [`InputStream`]: Joins continuation lines (`&`) into [`LogicalLine`]s
//! - [`patterns`]: Precompiled regex patterns for Fortran line shapes
//!
//! String literals may not span physical lines; an unterminated string simply
//! runs to the end of its line.

pub mod char_filter;
pub mod fragment;
pub mod patterns;
pub mod stream;

pub use char_filter::CharFilter;
pub use fragment::{expand_tabs, split_fragments, Fragment};
pub use stream::{InputStream, LogicalLine, StreamSettings};
