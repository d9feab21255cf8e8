use crate::{InvokeError, ProcedureInvoker};
use common::{HarnessError, HarnessResult, InvocationResult, Params};
use serde::{Deserialize, Serialize};
use std::{
    collections::{BTreeMap, VecDeque},
    fs,
    path::Path,
};
use tracing::debug;

/// One canned answer: either an invoker failure or a result.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ReplayResponse {
    Failure { error: String },
    Success(InvocationResult),
}

/// Serves canned responses per procedure from a JSON document:
///
/// ```json
/// {
///   "usp_CreateTeam": [
///     { "result_set": { "columns": ["intStatus", "strMessage"], "rows": [[1, "ok"]] },
///       "outputs": { "@id": 42 } }
///   ],
///   "usp_RenameTeam": [ { "error": "duplicate name" } ]
/// }
/// ```
///
/// Responses for a procedure are consumed in order and the last one repeats.
#[derive(Clone, Debug, Default)]
pub struct ReplayInvoker {
    responses: BTreeMap<String, VecDeque<ReplayResponse>>,
}

impl ReplayInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_json_str(json: &str) -> HarnessResult<Self> {
        let raw: BTreeMap<String, Vec<ReplayResponse>> = serde_json::from_str(json)
            .map_err(|err| HarnessError::Config(format!("invalid replay responses: {err}")))?;
        Ok(Self {
            responses: raw
                .into_iter()
                .map(|(name, list)| (name, list.into()))
                .collect(),
        })
    }

    pub fn from_path(path: &Path) -> HarnessResult<Self> {
        let data = fs::read_to_string(path)?;
        Self::from_json_str(&data)
    }

    pub fn push(&mut self, procedure: impl Into<String>, response: ReplayResponse) {
        self.responses
            .entry(procedure.into())
            .or_default()
            .push_back(response);
    }
}

impl ProcedureInvoker for ReplayInvoker {
    fn invoke(&mut self, procedure: &str, params: &Params) -> Result<InvocationResult, InvokeError> {
        debug!(procedure, params = params.len(), "replaying response");
        let queue = self
            .responses
            .get_mut(procedure)
            .filter(|queue| !queue.is_empty())
            .ok_or_else(|| {
                InvokeError::new(format!("no replay response for procedure '{procedure}'"))
            })?;

        let response = if queue.len() > 1 {
            queue.pop_front()
        } else {
            queue.front().cloned()
        };

        match response {
            Some(ReplayResponse::Success(result)) => Ok(result),
            Some(ReplayResponse::Failure { error }) => Err(InvokeError::new(error)),
            None => Err(InvokeError::new(format!(
                "no replay response for procedure '{procedure}'"
            ))),
        }
    }
}
