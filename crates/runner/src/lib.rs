//! Case selection and console reports.
//!
//! [`CaseSelector`] loads a fixture set, picks the cases recorded for one
//! procedure (optionally one category) and runs each either as a single call
//! or as a chain. The result is a [`RunReport`] that [`render`] turns into the
//! console layout.

mod report;
mod selector;

pub use report::{CaseOutcome, CaseReport, RunReport, render};
pub use selector::{CaseSelector, chain_options};
