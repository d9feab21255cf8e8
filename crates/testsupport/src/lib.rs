//! Test support utilities for the stored-procedure harness workspace.
//!
//! This crate provides:
//! - A scripted in-memory [`invoker::ProcedureInvoker`] that records calls
//! - Temporary fixture directories
//! - Builders for steps, cases and invocation results
//! - Property-based test generators for chains
//! - Custom assertion helpers for chain outcomes
//!
//! # Example Usage
//!
//! ```
//! use testsupport::prelude::*;
//!
//! let mut db = ScriptedInvoker::new().respond("Create", outputs([("@id", 42)]));
//! let steps = vec![
//!     step(1, "Create").output("@id", "new_id"),
//!     step(2, "Update").param("id", "$(new_id)"),
//! ];
//! let outcome = chain::execute_chain(&mut db, &steps);
//! assert_chain_succeeded(&outcome);
//! assert_eq!(db.calls_to("Update")[0].params["id"], types::Value::Int(42));
//! ```

pub mod assertions;
pub mod builders;
pub mod context;
pub mod macros;
pub mod proptest_generators;
pub mod scripted;

/// Convenient re-exports for common testing patterns.
pub mod prelude {
    pub use crate::assertions::*;
    pub use crate::builders::*;
    pub use crate::context::*;
    pub use crate::scripted::*;
}
