//! Diagnostic system for Silvera compiler errors.
//!
//! Every resolution failure becomes one [`Diagnostic`]:
//! - an [`ErrorCode`] for searchability (`silvera explain E3002`)
//! - a message saying what went wrong
//! - labels pointing into the modules involved
//! - notes and suggestions

mod diagnostic;
pub mod emitter;
mod error_code;
pub mod errors;
pub mod span_utils;

pub use diagnostic::{Diagnostic, Label};
pub use error_code::ErrorCode;
pub use errors::ErrorDocs;
