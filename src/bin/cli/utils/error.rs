//! Exit codes and error reporting for the command line.

use std::io::Write;

/// CLI exit codes
pub mod exit_codes {
    /// Success
    pub const SUCCESS: i32 = 0;
    /// Any failure, including usage errors
    pub const FAILURE: i32 = 1;
}

/// Writes `error: ...` or `error opening db: ...` to `stderr` and returns
/// the exit code for it.
pub fn report_error<E: Write>(stderr: &mut E, error: &bucketq::Error) -> i32 {
    tracing::debug!(error = ?error, "command failed");
    let _ = writeln!(stderr, "{}", error.report());
    error.exit_code()
}
