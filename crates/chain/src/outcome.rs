use common::InvocationResult;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;
use types::Value;

/// Why a chain stopped. Stored in [`ChainOutcome::error`], never returned as
/// an `Err`.
#[derive(Error, Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChainError {
    /// A `$(name)` reference or input mapping names a variable no earlier
    /// step produced.
    #[error("missing chain variable '{name}' for parameter '{parameter}'")]
    MissingVariable { parameter: String, name: String },
    /// An output mapping names an output the step's result does not carry.
    #[error("output '{output}' not found in result of '{procedure}'")]
    MissingOutput { procedure: String, output: String },
    /// The invoker reported failure.
    #[error("{message}")]
    Invocation { procedure: String, message: String },
    /// The call returned but its status row reports failure.
    #[error("{message}")]
    StatusRejected { status: Value, message: String },
}

impl ChainError {
    pub fn is_resolution_error(&self) -> bool {
        matches!(
            self,
            ChainError::MissingVariable { .. } | ChainError::MissingOutput { .. }
        )
    }
}

/// Raw results of the steps that returned, keyed by 1-based position.
pub type StepResults = BTreeMap<usize, InvocationResult>;

/// Result of one chain run.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChainOutcome {
    /// True iff every step ran without error.
    pub success: bool,
    /// 1-based position of the first failing step.
    pub failed_step: Option<usize>,
    pub error: Option<ChainError>,
    /// Variable store as of the last fully successful step.
    pub chain_data: BTreeMap<String, Value>,
    /// Every step whose invocation returned, including a failing step whose
    /// call returned before the failure was detected.
    pub partial_results: StepResults,
}

impl ChainOutcome {
    pub(crate) fn succeeded(chain_data: BTreeMap<String, Value>, results: StepResults) -> Self {
        Self {
            success: true,
            failed_step: None,
            error: None,
            chain_data,
            partial_results: results,
        }
    }

    pub(crate) fn failed(
        position: usize,
        error: ChainError,
        chain_data: BTreeMap<String, Value>,
        results: StepResults,
    ) -> Self {
        Self {
            success: false,
            failed_step: Some(position),
            error: Some(error),
            chain_data,
            partial_results: results,
        }
    }

    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(ToString::to_string)
    }

    pub fn variable(&self, name: &str) -> Option<&Value> {
        self.chain_data.get(name)
    }

    pub fn step_result(&self, position: usize) -> Option<&InvocationResult> {
        self.partial_results.get(&position)
    }

    pub fn executed_steps(&self) -> usize {
        self.partial_results.len()
    }
}
