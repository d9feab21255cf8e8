//! The Procedure Invoker boundary.
//!
//! The harness never talks to a database itself: every call goes through a
//! [`ProcedureInvoker`]. This crate defines that seam plus two pieces that sit
//! on it: [`NormalizingInvoker`], which adjusts parameter values to the
//! procedure's declared types before delegating, and [`ReplayInvoker`], which
//! serves canned results from JSON.

mod normalize;
mod replay;

pub use normalize::{
    NormalizingInvoker, ParameterMetadata, StaticMetadata, TypeMappings, looks_like_date,
    normalize_parameters, normalize_value,
};
pub use replay::{ReplayInvoker, ReplayResponse};

use common::{HarnessError, InvocationResult, Params};
use thiserror::Error;

/// Failure reported by the transport for one call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct InvokeError {
    pub message: String,
}

impl InvokeError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<InvokeError> for HarnessError {
    fn from(err: InvokeError) -> Self {
        HarnessError::Invocation(err.message)
    }
}

/// Executes one stored procedure with named parameters.
///
/// Implementations own the session; one chain drives one invoker from start
/// to finish, so calls are strictly sequential.
pub trait ProcedureInvoker {
    fn invoke(&mut self, procedure: &str, params: &Params) -> Result<InvocationResult, InvokeError>;
}

impl<I: ProcedureInvoker + ?Sized> ProcedureInvoker for &mut I {
    fn invoke(&mut self, procedure: &str, params: &Params) -> Result<InvocationResult, InvokeError> {
        (**self).invoke(procedure, params)
    }
}

impl<I: ProcedureInvoker + ?Sized> ProcedureInvoker for Box<I> {
    fn invoke(&mut self, procedure: &str, params: &Params) -> Result<InvocationResult, InvokeError> {
        (**self).invoke(procedure, params)
    }
}
