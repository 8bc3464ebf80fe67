//! Command handlers for the Silvera CLI.
//!
//! Each command has a pure half that returns its outcome, used by tests,
//! and a printing half that writes to the terminal and picks the exit code.

mod check;
mod explain;

pub use check::{check_project, run_check, CheckFailure, ModuleSummary};
pub use explain::{explain_error, explanation, ExplainError};
