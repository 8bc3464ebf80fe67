//! The `explain` command: display documentation for error codes.

use silvera_diagnostic::{ErrorCode, ErrorDocs};

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ExplainError {
    #[error("unknown error code: {0}")]
    UnknownCode(String),

    #[error("no documentation available for {0}")]
    Undocumented(ErrorCode),
}

/// Documentation text for a code such as `E3002`.
pub fn explanation(code_str: &str) -> Result<&'static str, ExplainError> {
    let code = ErrorCode::parse(code_str).ok_or_else(|| ExplainError::UnknownCode(code_str.to_string()))?;
    ErrorDocs::get(code).ok_or(ExplainError::Undocumented(code))
}

/// Print the documentation for `code_str`; returns the exit code.
pub fn explain_error(code_str: &str) -> i32 {
    match explanation(code_str) {
        Ok(doc) => {
            println!("{doc}");
            0
        }
        Err(e) => {
            eprintln!("{e}");
            eprintln!();
            eprintln!("Codes have the format EXXXX where X is a digit.");
            eprintln!("Examples: E0001, E1001, E3008");
            1
        }
    }
}
