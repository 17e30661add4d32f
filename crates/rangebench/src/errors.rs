//! Error handling and exit codes.

use rangebench_core::constants::exit_codes;
use rangebench_core::error::BenchError;

/// Exit code for a benchmark error.
///
/// Every fatal condition ends the process with the same code.
#[must_use]
pub fn handle_error(err: &BenchError) -> i32 {
    match err {
        BenchError::UnknownPartition(_)
        | BenchError::InvalidLength { .. }
        | BenchError::CountMismatch { .. }
        | BenchError::RetriesExhausted { .. }
        | BenchError::Store { .. }
        | BenchError::UnknownStrategy(_)
        | BenchError::Config(_)
        | BenchError::Output(_) => exit_codes::ERROR_GENERIC,
    }
}

/// Exit code for any top-level error.
#[must_use]
pub fn exit_code(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<BenchError>()
        .map_or(exit_codes::ERROR_GENERIC, handle_error)
}
