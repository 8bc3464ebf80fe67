//! Silvera compiler driver.
//!
//! Loads a project directory of module descriptions, resolves it, and
//! reports the outcome:
//!
//! ```text
//! <dir>/**/*.si.json ──▶ loader ──▶ lower ──▶ silvera_resolve::resolve
//!                                                    │
//!                             summary on stdout ◀────┴────▶ diagnostic on stderr
//! ```

pub mod commands;
pub mod loader;
pub mod options;
pub mod tracing_setup;

pub use loader::{discover_modules, load_project, LoadError, Project};
pub use options::{parse_check_args, CheckArgs, OptionError};
