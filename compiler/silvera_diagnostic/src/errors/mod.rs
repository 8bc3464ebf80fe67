//! Embedded error documentation for `silvera explain`.
//!
//! Each error code has a markdown file in this directory, embedded at
//! compile time.

use crate::ErrorCode;

/// Registry of embedded error documentation.
pub struct ErrorDocs;

impl ErrorDocs {
    /// Get the documentation for an error code.
    pub fn get(code: ErrorCode) -> Option<&'static str> {
        DOCS.iter().find(|(c, _)| *c == code).map(|(_, doc)| *doc)
    }

    /// Get all documented error codes.
    pub fn all_codes() -> impl Iterator<Item = ErrorCode> {
        DOCS.iter().map(|(code, _)| *code)
    }

    pub fn has_docs(code: ErrorCode) -> bool {
        DOCS.iter().any(|(c, _)| *c == code)
    }
}

static DOCS: &[(ErrorCode, &str)] = &[
    // Loading and module graph (E0xxx)
    (ErrorCode::E0001, include_str!("E0001.md")),
    (ErrorCode::E0002, include_str!("E0002.md")),
    (ErrorCode::E0003, include_str!("E0003.md")),
    (ErrorCode::E0004, include_str!("E0004.md")),
    (ErrorCode::E0005, include_str!("E0005.md")),
    (ErrorCode::E0006, include_str!("E0006.md")),
    // References (E1xxx)
    (ErrorCode::E1001, include_str!("E1001.md")),
    (ErrorCode::E1002, include_str!("E1002.md")),
    (ErrorCode::E1003, include_str!("E1003.md")),
    // Types (E2xxx)
    (ErrorCode::E2001, include_str!("E2001.md")),
    (ErrorCode::E2002, include_str!("E2002.md")),
    // Messaging (E3xxx)
    (ErrorCode::E3001, include_str!("E3001.md")),
    (ErrorCode::E3002, include_str!("E3002.md")),
    (ErrorCode::E3003, include_str!("E3003.md")),
    (ErrorCode::E3004, include_str!("E3004.md")),
    (ErrorCode::E3005, include_str!("E3005.md")),
    (ErrorCode::E3006, include_str!("E3006.md")),
    (ErrorCode::E3007, include_str!("E3007.md")),
    (ErrorCode::E3008, include_str!("E3008.md")),
    (ErrorCode::E3009, include_str!("E3009.md")),
    (ErrorCode::E3010, include_str!("E3010.md")),
    (ErrorCode::E3011, include_str!("E3011.md")),
    // Inheritance (E4xxx)
    (ErrorCode::E4001, include_str!("E4001.md")),
    (ErrorCode::E4002, include_str!("E4002.md")),
    // Dependencies (E5xxx)
    (ErrorCode::E5001, include_str!("E5001.md")),
    // REST (E6xxx)
    (ErrorCode::E6001, include_str!("E6001.md")),
    (ErrorCode::E6002, include_str!("E6002.md")),
    (ErrorCode::E6003, include_str!("E6003.md")),
    // Internal errors (E9xxx)
    (ErrorCode::E9001, include_str!("E9001.md")),
];
