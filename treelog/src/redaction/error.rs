//! Errors raised while building or applying a [`Redactor`](super::Redactor).

/// Failure to compile redaction patterns or to decode redaction input.
#[derive(Debug, thiserror::Error)]
pub enum RedactorError {
    #[error("invalid redaction pattern `{pattern}`")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },
    #[error("redaction input is not valid JSON")]
    Decode(#[source] serde_json::Error),
    #[error("failed to encode redacted output")]
    Encode(#[source] serde_json::Error),
}
