//! Fixture Store: stored-procedure test cases authored as JSON.
//!
//! A fixture file maps procedure names to ordered case lists:
//!
//! ```json
//! {
//!   "usp_CreateTeam": [
//!     { "case_id": "create_ok", "case_type": "POSITIVE",
//!       "parameters": { "@name": "A" } },
//!     { "case_id": "create_then_rename", "case_type": "edge",
//!       "chain_config": [
//!         { "step": 1, "sp_name": "usp_CreateTeam",
//!           "parameters": { "@name": "A" }, "output_mapping": { "@id": "new_id" } },
//!         { "step": 2, "sp_name": "usp_RenameTeam",
//!           "parameters": { "@id": "$(new_id)", "@name": "B" } }
//!       ] }
//!   ]
//! }
//! ```
//!
//! Cases are validated once, when the file is loaded.

mod model;
mod store;
#[cfg(test)]
mod tests;

pub use model::{CasePayload, CaseType, NameMapping, Step, TestCase};
pub use store::{FixtureSet, FixtureStore};
