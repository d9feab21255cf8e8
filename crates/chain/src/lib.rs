//! Chained stored-procedure execution.
//!
//! A chain is an ordered list of [`Step`]s run against one
//! [`invoker::ProcedureInvoker`]. Each step's `output_mapping` copies named
//! outputs of its result into a chain-scoped variable store; later steps read
//! them back through whole-value `$(name)` references or `input_mapping`.
//!
//! ```
//! use chain::{execute_chain, ChainOutcome};
//! use common::{InvocationResult, Params};
//! use fixtures::Step;
//! use invoker::{InvokeError, ProcedureInvoker};
//! use types::Value;
//!
//! struct Db;
//! impl ProcedureInvoker for Db {
//!     fn invoke(&mut self, name: &str, params: &Params) -> Result<InvocationResult, InvokeError> {
//!         match name {
//!             "Create" => Ok(InvocationResult::no_result().with_output("@id", 42)),
//!             _ => {
//!                 assert_eq!(params["id"], Value::Int(42));
//!                 Ok(InvocationResult::no_result())
//!             }
//!         }
//!     }
//! }
//!
//! let steps = vec![
//!     Step::new(1, "Create").param("name", "A").output("@id", "new_id"),
//!     Step::new(2, "Update").param("id", "$(new_id)").param("name", "B"),
//! ];
//! let outcome: ChainOutcome = execute_chain(&mut Db, &steps);
//! assert!(outcome.success);
//! assert_eq!(outcome.variable("new_id"), Some(&Value::Int(42)));
//! ```

mod executor;
mod outcome;
pub mod template;
mod variables;

pub use executor::{ChainExecutor, ChainOptions, StatusPolicy, execute_chain, find_output};
pub use fixtures::Step;
pub use outcome::{ChainError, ChainOutcome, StepResults};
pub use variables::ChainVariables;
