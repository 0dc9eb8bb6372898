use thiserror::Error;

/// Hard failures of a forensic run.
///
/// Missing line items, non-finite ratios and short histories are not errors:
/// they surface as `None` values plus entries in the output `warnings`.
#[derive(Debug, Error)]
pub enum ForensicError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Fetch failed for {ticker}: {reason}")]
    FetchError { ticker: String, reason: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for ForensicError {
    fn from(e: serde_json::Error) -> Self {
        ForensicError::SerializationError(e.to_string())
    }
}
