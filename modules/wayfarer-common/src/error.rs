use thiserror::Error;

use crate::validate::SchemaViolation;

#[derive(Error, Debug)]
pub enum ItineraryError {
    #[error("No model credential configured ({0} is not set)")]
    MissingCredential(&'static str),

    #[error("Model invocation failed: {0}")]
    Upstream(String),

    #[error("Model output contained no JSON value")]
    MalformedOutput,

    #[error("Model output does not match the itinerary shape: {}", join_violations(.0))]
    InvalidOutput(Vec<SchemaViolation>),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    #[error("Invalid attachment: {0}")]
    InvalidAttachment(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Trip not found: {0}")]
    NotFound(String),
}

impl ItineraryError {
    /// Stable machine-readable kind, carried in HTTP error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::MissingCredential(_) => "missing_credential",
            Self::Upstream(_) => "upstream_failure",
            Self::MalformedOutput => "malformed_output",
            Self::InvalidOutput(_) => "invalid_output",
            Self::InvalidRequest(_) => "invalid_request",
            Self::InvalidAttachment(_) => "invalid_attachment",
            Self::Storage(_) => "storage",
            Self::NotFound(_) => "not_found",
        }
    }

    /// Errors caused by the caller's input rather than by the model or the server.
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::InvalidRequest(_) | Self::InvalidAttachment(_))
    }
}

fn join_violations(violations: &[SchemaViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
