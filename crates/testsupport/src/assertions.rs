//! Custom assertion helpers for chain outcomes and harness errors.

use chain::{ChainError, ChainOutcome};
use common::HarnessResult;
use pretty_assertions::assert_eq;
use types::Value;

use crate::scripted::RecordedCall;

/// Assert that every step of a chain succeeded.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let mut db = ScriptedInvoker::new();
/// let outcome = chain::execute_chain(&mut db, &[step(1, "Ping")]);
/// assert_chain_succeeded(&outcome);
/// ```
pub fn assert_chain_succeeded(outcome: &ChainOutcome) {
    assert!(
        outcome.success,
        "Expected chain to succeed, but step {:?} failed: {:?}",
        outcome.failed_step, outcome.error
    );
    assert_eq!(outcome.failed_step, None, "successful chain reports a failed step");
    assert_eq!(outcome.error, None, "successful chain reports an error");
}

/// Assert that a chain failed at `position` and return the error.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let mut db = ScriptedInvoker::new().fail("Update", "constraint violation");
/// let outcome = chain::execute_chain(&mut db, &create_update_chain());
/// let err = assert_chain_failed_at(&outcome, 2);
/// assert_eq!(err.to_string(), "constraint violation");
/// ```
pub fn assert_chain_failed_at(outcome: &ChainOutcome, position: usize) -> &ChainError {
    assert!(
        !outcome.success,
        "Expected chain to fail at step {position}, but it succeeded"
    );
    assert_eq!(
        outcome.failed_step,
        Some(position),
        "Chain failed at the wrong step: {:?}",
        outcome.error
    );
    outcome
        .error
        .as_ref()
        .expect("failed chain must carry an error")
}

/// Assert the exact set of step positions present in `partial_results`.
pub fn assert_executed_steps(outcome: &ChainOutcome, expected: &[usize]) {
    let actual: Vec<usize> = outcome.partial_results.keys().copied().collect();
    assert_eq!(
        actual, expected,
        "partial_results mismatch: expected steps {:?}, got {:?}",
        expected, actual
    );
}

/// Assert that a chain variable holds `expected`.
pub fn assert_variable(outcome: &ChainOutcome, name: &str, expected: &Value) {
    match outcome.chain_data.get(name) {
        Some(actual) => assert_eq!(
            actual, expected,
            "chain variable '{}' mismatch",
            name
        ),
        None => panic!(
            "Expected chain variable '{}', available: {:?}",
            name,
            outcome.chain_data.keys().collect::<Vec<_>>()
        ),
    }
}

/// Assert that a recorded call bound `param` to `expected`.
pub fn assert_param(call: &RecordedCall, param: &str, expected: &Value) {
    match call.params.get(param) {
        Some(actual) => assert_eq!(
            actual, expected,
            "parameter '{}' of call to '{}' mismatch",
            param, call.procedure
        ),
        None => panic!(
            "Call to '{}' has no parameter '{}': {:?}",
            call.procedure, param, call.params
        ),
    }
}

/// Assert that an operation returns an error containing a specific substring.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let result: common::HarnessResult<()> = Err(common::HarnessError::Fixture("file not found".into()));
/// assert_error_contains(result, "not found");
/// ```
pub fn assert_error_contains<T>(result: HarnessResult<T>, expected_msg: &str) {
    match result {
        Ok(_) => panic!("Expected error containing '{}', but got Ok", expected_msg),
        Err(e) => {
            let error_string = e.to_string();
            assert!(
                error_string.contains(expected_msg),
                "Expected error to contain '{}', but got: {}",
                expected_msg,
                error_string
            );
        }
    }
}
