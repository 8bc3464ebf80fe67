use std::fmt;

/// Error codes for all compiler diagnostics.
///
/// Format: E#### where first digit indicates phase:
/// - E0xxx: Loading and module graph errors
/// - E1xxx: Reference resolution errors
/// - E2xxx: Type errors
/// - E3xxx: Messaging errors
/// - E4xxx: Inheritance errors
/// - E5xxx: Dependency errors
/// - E6xxx: REST mapping errors
/// - E9xxx: Internal compiler errors
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug)]
pub enum ErrorCode {
    // Loading / Module Graph (E0xxx)
    /// Import cycle between modules
    E0001,
    /// Imported module does not exist
    E0002,
    /// Two declarations with the same name in one module
    E0003,
    /// Module loaded twice
    E0004,
    /// Malformed source declaration
    E0005,
    /// Source file could not be read or parsed
    E0006,

    // References (E1xxx)
    /// Unresolved reference
    E1001,
    /// Ambiguous reference
    E1002,
    /// Reference names a declaration of the wrong kind
    E1003,

    // Types (E2xxx)
    /// Unknown type in a service API
    E2001,
    /// Message field uses a non-primitive type
    E2002,

    // Messaging (E3xxx)
    /// More than one message pool
    E3001,
    /// Message group with no messages
    E3002,
    /// Duplicate message group
    E3003,
    /// Duplicate message
    E3004,
    /// Duplicate channel in a broker
    E3005,
    /// Duplicate broker
    E3006,
    /// Broker declared without a message pool
    E3007,
    /// Channel carries an unknown message
    E3008,
    /// Annotation names an unknown message
    E3009,
    /// Annotation names an unknown broker
    E3010,
    /// Annotation names an unknown channel
    E3011,

    // Inheritance (E4xxx)
    /// Derived service redefines an inherited member
    E4001,
    /// Service inherits from itself
    E4002,

    // Dependencies (E5xxx)
    /// Dependency names methods the target does not have
    E5001,

    // REST (E6xxx)
    /// Path placeholder is not a parameter
    E6001,
    /// Query key is not a parameter
    E6002,
    /// REST strategy is not supported
    E6003,

    // Internal Errors (E9xxx)
    /// Internal compiler error
    E9001,
}

impl ErrorCode {
    pub const ALL: &'static [ErrorCode] = &[
        ErrorCode::E0001,
        ErrorCode::E0002,
        ErrorCode::E0003,
        ErrorCode::E0004,
        ErrorCode::E0005,
        ErrorCode::E0006,
        ErrorCode::E1001,
        ErrorCode::E1002,
        ErrorCode::E1003,
        ErrorCode::E2001,
        ErrorCode::E2002,
        ErrorCode::E3001,
        ErrorCode::E3002,
        ErrorCode::E3003,
        ErrorCode::E3004,
        ErrorCode::E3005,
        ErrorCode::E3006,
        ErrorCode::E3007,
        ErrorCode::E3008,
        ErrorCode::E3009,
        ErrorCode::E3010,
        ErrorCode::E3011,
        ErrorCode::E4001,
        ErrorCode::E4002,
        ErrorCode::E5001,
        ErrorCode::E6001,
        ErrorCode::E6002,
        ErrorCode::E6003,
        ErrorCode::E9001,
    ];

    /// Get the string representation of this error code.
    pub fn as_str(&self) -> &'static str {
        match self {
            // Loading
            ErrorCode::E0001 => "E0001",
            ErrorCode::E0002 => "E0002",
            ErrorCode::E0003 => "E0003",
            ErrorCode::E0004 => "E0004",
            ErrorCode::E0005 => "E0005",
            ErrorCode::E0006 => "E0006",
            // References
            ErrorCode::E1001 => "E1001",
            ErrorCode::E1002 => "E1002",
            ErrorCode::E1003 => "E1003",
            // Types
            ErrorCode::E2001 => "E2001",
            ErrorCode::E2002 => "E2002",
            // Messaging
            ErrorCode::E3001 => "E3001",
            ErrorCode::E3002 => "E3002",
            ErrorCode::E3003 => "E3003",
            ErrorCode::E3004 => "E3004",
            ErrorCode::E3005 => "E3005",
            ErrorCode::E3006 => "E3006",
            ErrorCode::E3007 => "E3007",
            ErrorCode::E3008 => "E3008",
            ErrorCode::E3009 => "E3009",
            ErrorCode::E3010 => "E3010",
            ErrorCode::E3011 => "E3011",
            // Inheritance
            ErrorCode::E4001 => "E4001",
            ErrorCode::E4002 => "E4002",
            // Dependencies
            ErrorCode::E5001 => "E5001",
            // REST
            ErrorCode::E6001 => "E6001",
            ErrorCode::E6002 => "E6002",
            ErrorCode::E6003 => "E6003",
            // Internal
            ErrorCode::E9001 => "E9001",
        }
    }

    /// Parse a code such as `E3002` (case-insensitive).
    pub fn parse(text: &str) -> Option<ErrorCode> {
        let upper = text.trim().to_ascii_uppercase();
        Self::ALL.iter().copied().find(|c| c.as_str() == upper)
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
