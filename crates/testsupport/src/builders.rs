//! Builders for steps, cases and invocation results.

use common::{InvocationResult, Params, RecordBatch, Row};
use fixtures::{CasePayload, CaseType, Step, TestCase};
use types::Value;

/// Start a chain step; extend it with `.param`, `.input` and `.output`.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let s = step(2, "Update").param("id", "$(new_id)").output("@rows", "touched");
/// assert_eq!(s.step, 2);
/// assert_eq!(s.output_mapping["@rows"], "touched");
/// ```
pub fn step(label: usize, procedure: &str) -> Step {
    Step::new(label, procedure)
}

/// A result carrying only named output parameters.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let result = outputs([("@id", 42)]);
/// assert_eq!(result.output("@id"), Some(&types::Value::Int(42)));
/// assert!(!result.has_result_set());
/// ```
pub fn outputs<I, K, V>(pairs: I) -> InvocationResult
where
    I: IntoIterator<Item = (K, V)>,
    K: Into<String>,
    V: Into<Value>,
{
    pairs
        .into_iter()
        .fold(InvocationResult::no_result(), |result, (k, v)| {
            result.with_output(k, v)
        })
}

/// A result set with the given column labels and rows.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
/// use types::Value;
///
/// let result = rows(&["id", "name"], vec![vec![Value::Int(1), Value::Text("A".into())]]);
/// assert_eq!(result.row_count(), 1);
/// ```
pub fn rows(columns: &[&str], data: Vec<Vec<Value>>) -> InvocationResult {
    InvocationResult::with_rows(RecordBatch::new(
        columns.iter().map(|c| c.to_string()).collect(),
        data.into_iter().map(Row::new).collect(),
    ))
}

/// A result set whose only row has the `(status, message, id)` layout used by
/// status-reporting procedures.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
///
/// let ok = status_row(1, "Saved", 42);
/// assert_eq!(ok.first_row_value("intNewId"), Some(&types::Value::Int(42)));
/// ```
pub fn status_row(status: i64, message: &str, id: i64) -> InvocationResult {
    rows(
        &["intStatus", "strMessage", "intNewId"],
        vec![vec![
            Value::Int(status),
            Value::Text(message.to_string()),
            Value::Int(id),
        ]],
    )
}

/// A single-call test case.
pub fn single_case(case_id: &str, case_type: CaseType, params: Params) -> TestCase {
    TestCase {
        case_id: case_id.to_string(),
        case_type,
        description: String::new(),
        payload: CasePayload::Single(params),
    }
}

/// A chained test case.
pub fn chain_case(case_id: &str, case_type: CaseType, steps: Vec<Step>) -> TestCase {
    TestCase {
        case_id: case_id.to_string(),
        case_type,
        description: String::new(),
        payload: CasePayload::Chain(steps),
    }
}

/// The create-then-update chain used throughout the docs: step 1 maps `@id`
/// to `new_id`, step 2 references it.
pub fn create_update_chain() -> Vec<Step> {
    vec![
        step(1, "Create").param("name", "A").output("@id", "new_id"),
        step(2, "Update").param("id", "$(new_id)").param("name", "B"),
    ]
}
