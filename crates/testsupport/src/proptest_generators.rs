//! Property-based test generators using proptest.
//!
//! Strategies for scalar values, variable names and chains whose steps thread
//! one output into the next.

use crate::builders::step;
use fixtures::Step;
use proptest::prelude::*;
use types::Value;

/// Strategy for generating random `Value` instances.
///
/// Generates a mix of Int, Text, Bool, and Null values. Text never looks like
/// a `$(name)` reference.
pub fn arb_value() -> impl Strategy<Value = Value> {
    prop_oneof![
        any::<i64>().prop_map(Value::Int),
        "[a-z]{1,20}".prop_map(Value::Text),
        any::<bool>().prop_map(Value::Bool),
        Just(Value::Null),
    ]
}

/// Strategy for valid chain variable names.
pub fn arb_identifier() -> impl Strategy<Value = String> {
    "[a-z_][a-z0-9_]{0,12}"
}

/// A linear chain of `len` steps: step k outputs `@out` into `v{k}` and
/// step k+1 passes `$(v{k})` as `@in`.
///
/// # Example
///
/// ```
/// use proptest::prelude::*;
/// use testsupport::proptest_generators::arb_linear_chain;
///
/// proptest! {
///     #[test]
///     fn chain_has_requested_length(steps in arb_linear_chain(1..5)) {
///         prop_assert!(!steps.is_empty() && steps.len() < 5);
///     }
/// }
/// ```
pub fn arb_linear_chain(len: std::ops::Range<usize>) -> impl Strategy<Value = Vec<Step>> {
    prop::collection::vec(arb_value(), len).prop_map(|literals| linear_chain(&literals))
}

/// Deterministic version of [`arb_linear_chain`]; each step also carries its
/// literal as `@lit`.
pub fn linear_chain(literals: &[Value]) -> Vec<Step> {
    literals
        .iter()
        .enumerate()
        .map(|(idx, literal)| {
            let position = idx + 1;
            let mut s = step(position, &format!("Proc{position}"))
                .param("@lit", literal.clone())
                .output("@out", format!("v{position}"));
            if position > 1 {
                s = s.param("@in", format!("$(v{})", position - 1));
            }
            s
        })
        .collect()
}

/// A chain length paired with a 1-based failing position inside it.
pub fn arb_chain_with_failure(max_len: usize) -> impl Strategy<Value = (usize, usize)> {
    (1..=max_len).prop_flat_map(|len| (Just(len), 1..=len))
}
