//! Cross-strategy result validation.

use rangebench_core::error::BenchError;
use rangebench_core::executor::ExecutionResult;
use rangebench_core::query::Query;

/// Checks that every strategy returned the same count for one query.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResultValidator;

impl ResultValidator {
    /// The first result is the reference; the first divergent count is an error.
    ///
    /// Zero or one result is trivially consistent.
    pub fn validate(&self, query: &Query, results: &[ExecutionResult]) -> Result<(), BenchError> {
        let Some((reference, rest)) = results.split_first() else {
            return Ok(());
        };
        for result in rest {
            if result.count != reference.count {
                return Err(BenchError::CountMismatch {
                    expected: reference.count,
                    actual: result.count,
                    expected_strategy: reference.strategy,
                    actual_strategy: result.strategy,
                    query: query.clone(),
                });
            }
        }
        Ok(())
    }
}
