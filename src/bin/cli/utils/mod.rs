//! CLI utilities module
//!
//! Argument normalisation and error reporting shared by the commands.

pub mod args;
pub mod error;

pub use args::normalize_args;
pub use error::{exit_codes, report_error};
