//! In-memory invokers for driving chains without a database.

use common::{InvocationResult, Params};
use invoker::{InvokeError, ProcedureInvoker};
use std::collections::{BTreeMap, VecDeque};

/// One call observed by a test invoker.
#[derive(Clone, Debug, PartialEq)]
pub struct RecordedCall {
    pub procedure: String,
    pub params: Params,
}

#[derive(Clone, Debug)]
enum Scripted {
    Return(InvocationResult),
    Fail(String),
}

/// Invoker with per-procedure scripted answers that records every call.
///
/// Answers for a procedure are consumed in order and the last one repeats.
/// Procedures without a script return [`InvocationResult::no_result`].
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
/// use invoker::ProcedureInvoker;
///
/// let mut db = ScriptedInvoker::new()
///     .respond("Create", outputs([("@id", 1)]))
///     .fail("Create", "duplicate key");
/// assert!(db.invoke("Create", &Default::default()).is_ok());
/// assert!(db.invoke("Create", &Default::default()).is_err());
/// assert_eq!(db.call_count(), 2);
/// ```
#[derive(Clone, Debug, Default)]
pub struct ScriptedInvoker {
    scripts: BTreeMap<String, VecDeque<Scripted>>,
    calls: Vec<RecordedCall>,
}

impl ScriptedInvoker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a successful answer for `procedure`.
    pub fn respond(mut self, procedure: &str, result: InvocationResult) -> Self {
        self.push(procedure, Scripted::Return(result));
        self
    }

    /// Queue a failure for `procedure`.
    pub fn fail(mut self, procedure: &str, message: &str) -> Self {
        self.push(procedure, Scripted::Fail(message.to_string()));
        self
    }

    fn push(&mut self, procedure: &str, answer: Scripted) {
        self.scripts
            .entry(procedure.to_string())
            .or_default()
            .push_back(answer);
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }

    pub fn calls_to(&self, procedure: &str) -> Vec<&RecordedCall> {
        self.calls
            .iter()
            .filter(|call| call.procedure == procedure)
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.len()
    }

    pub fn called_procedures(&self) -> Vec<&str> {
        self.calls.iter().map(|c| c.procedure.as_str()).collect()
    }
}

impl ProcedureInvoker for ScriptedInvoker {
    fn invoke(&mut self, procedure: &str, params: &Params) -> Result<InvocationResult, InvokeError> {
        self.calls.push(RecordedCall {
            procedure: procedure.to_string(),
            params: params.clone(),
        });

        let answer = match self.scripts.get_mut(procedure) {
            Some(queue) if queue.len() > 1 => queue.pop_front(),
            Some(queue) => queue.front().cloned(),
            None => None,
        };

        match answer {
            Some(Scripted::Return(result)) => Ok(result),
            Some(Scripted::Fail(message)) => Err(InvokeError::new(message)),
            None => Ok(InvocationResult::no_result()),
        }
    }
}

/// Invoker backed by a closure, for answers computed from the parameters.
///
/// # Example
///
/// ```
/// use testsupport::prelude::*;
/// use invoker::ProcedureInvoker;
/// use common::InvocationResult;
///
/// let mut echo = FnInvoker::new(|_, params| {
///     Ok(InvocationResult::no_result().with_output("@count", params.len() as i64))
/// });
/// let result = echo.invoke("Count", &Default::default()).unwrap();
/// assert_eq!(result.output("@count"), Some(&types::Value::Int(0)));
/// ```
pub struct FnInvoker<F> {
    func: F,
    calls: Vec<RecordedCall>,
}

impl<F> FnInvoker<F>
where
    F: FnMut(&str, &Params) -> Result<InvocationResult, InvokeError>,
{
    pub fn new(func: F) -> Self {
        Self {
            func,
            calls: Vec::new(),
        }
    }

    pub fn calls(&self) -> &[RecordedCall] {
        &self.calls
    }
}

impl<F> ProcedureInvoker for FnInvoker<F>
where
    F: FnMut(&str, &Params) -> Result<InvocationResult, InvokeError>,
{
    fn invoke(&mut self, procedure: &str, params: &Params) -> Result<InvocationResult, InvokeError> {
        self.calls.push(RecordedCall {
            procedure: procedure.to_string(),
            params: params.clone(),
        });
        (self.func)(procedure, params)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::Value;

    #[test]
    fn unscripted_procedures_return_no_result() {
        let mut db = ScriptedInvoker::new();
        let result = db.invoke("Anything", &Params::new()).unwrap();
        assert_eq!(result, InvocationResult::no_result());
        assert_eq!(db.called_procedures(), vec!["Anything"]);
    }

    #[test]
    fn last_answer_repeats() {
        let mut db = ScriptedInvoker::new()
            .fail("P", "first")
            .respond("P", InvocationResult::no_result().with_output("@n", 1));
        assert!(db.invoke("P", &Params::new()).is_err());
        for _ in 0..2 {
            let result = db.invoke("P", &Params::new()).unwrap();
            assert_eq!(result.output("@n"), Some(&Value::Int(1)));
        }
        assert_eq!(db.calls_to("P").len(), 3);
    }
}
