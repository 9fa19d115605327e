use thiserror::Error;

use crate::domain::{FieldKey, Route};

pub const VALIDATION_FAILED_MESSAGE: &str = "All fields are required and must be valid numbers.";
pub const SERVER_ERROR_MESSAGE: &str = "Server error. Please try again.";
pub const TIMED_OUT_MESSAGE: &str = "Request timed out. Please try again.";
pub const CANCELLED_MESSAGE: &str = "Request cancelled.";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown form field `{0}`")]
pub struct UnknownField(pub String);

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("field `{field}` is not a finite number: {raw:?}")]
    NonNumeric { field: FieldKey, raw: String },
}

/// Why a submission attempt ended. `Display` is the text shown to the user.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("{}", VALIDATION_FAILED_MESSAGE)]
    Validation(#[from] ValidationError),
    #[error("{}", SERVER_ERROR_MESSAGE)]
    Transport { detail: String },
    #[error("{0}")]
    ScorerReported(String),
    #[error("{}", TIMED_OUT_MESSAGE)]
    TimedOut,
    #[error("{}", CANCELLED_MESSAGE)]
    Cancelled,
}

/// Raised by the guard instead of rendering a protected view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("authentication required; redirect to {redirect}")]
pub struct AuthRequired {
    pub redirect: Route,
}
