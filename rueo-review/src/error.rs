/// Error types for the review engine
///
/// Malformed markup is never an error; it is reported as a structural issue
/// on the parsed article. These errors cover broken internal invariants and
/// the I/O done by the driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReviewError {
    /// Internal invariant broken, e.g. a component with no alternatives
    InvariantViolation(String),
    /// Error during phrase expansion
    Expansion(String),
    /// Invalid configuration
    Config(String),
    /// Reading input failed
    Io(String),
    /// JSON encoding or decoding failed
    Serialization(String),
    /// General error with context
    Other(String),
}

impl std::fmt::Display for ReviewError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReviewError::InvariantViolation(msg) => write!(f, "Invariant violation: {}", msg),
            ReviewError::Expansion(msg) => write!(f, "Expansion error: {}", msg),
            ReviewError::Config(msg) => write!(f, "Configuration error: {}", msg),
            ReviewError::Io(msg) => write!(f, "I/O error: {}", msg),
            ReviewError::Serialization(msg) => write!(f, "Serialization error: {}", msg),
            ReviewError::Other(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ReviewError {}

impl From<std::io::Error> for ReviewError {
    fn from(err: std::io::Error) -> Self {
        ReviewError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for ReviewError {
    fn from(err: serde_json::Error) -> Self {
        ReviewError::Serialization(err.to_string())
    }
}

/// Result type for review operations
pub type ReviewResult<T> = Result<T, ReviewError>;
