//! Unified error types for all layers of the application.

use serde::{Deserialize, Serialize};
use std::fmt::Debug;
use thiserror::Error;

/// Unified error type for TaskTrack.
///
/// Record-store failures propagate through these variants unchanged; cache
/// failures are represented by [`TrackError::Cache`] but are isolated by the
/// service layer and never reach an HTTP caller.
#[derive(Error, Debug)]
pub enum TrackError {
    // ============ Domain Errors ============
    /// Resource not found
    #[error("{resource_type} not found with the specified {lookup}: {id}")]
    NotFound {
        resource_type: String,
        lookup: &'static str,
        id: String,
    },

    /// Validation error
    #[error("Validation error: {0}")]
    Validation(String),

    /// Conflict error (e.g., duplicate entry)
    #[error("Conflict: {0}")]
    Conflict(String),

    // ============ Infrastructure Errors ============
    /// A list read against the record store failed.
    #[error("Failed to retrieve {resource_type}. Please try again.")]
    RetrievalFailed { resource_type: String },

    /// Record store transport or server error
    #[error("Record store error: {message}")]
    RecordStore {
        status: Option<u16>,
        message: String,
    },

    /// Redis/Cache error
    #[error("Cache error: {0}")]
    Cache(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    // ============ Internal Errors ============
    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),

    /// Generic error wrapper
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl TrackError {
    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> u16 {
        match self {
            Self::NotFound { .. } => 404,
            Self::Validation(_) => 400,
            Self::Conflict(_) => 409,
            Self::RetrievalFailed { .. } => 503,
            Self::RecordStore { .. } => 502,
            Self::Cache(_) | Self::Configuration(_) | Self::Internal(_) | Self::Other(_) => 500,
        }
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "NOT_FOUND",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::RetrievalFailed { .. } => "RETRIEVAL_FAILED",
            Self::RecordStore { .. } => "RECORD_STORE_ERROR",
            Self::Cache(_) => "CACHE_ERROR",
            Self::Configuration(_) => "CONFIGURATION_ERROR",
            Self::Internal(_) | Self::Other(_) => "INTERNAL_ERROR",
        }
    }

    /// Creates a not found error for an id lookup.
    #[must_use]
    pub fn not_found<T: ToString>(resource_type: impl Into<String>, id: T) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            lookup: "ID",
            id: id.to_string(),
        }
    }

    /// Creates a not found error for a filter lookup.
    #[must_use]
    pub fn not_found_by_filter<T: ToString>(resource_type: impl Into<String>, filter: T) -> Self {
        Self::NotFound {
            resource_type: resource_type.into(),
            lookup: "filter",
            id: filter.to_string(),
        }
    }

    /// Creates a validation error.
    #[must_use]
    pub fn validation<T: Into<String>>(message: T) -> Self {
        Self::Validation(message.into())
    }

    /// Creates a conflict error.
    #[must_use]
    pub fn conflict<T: Into<String>>(message: T) -> Self {
        Self::Conflict(message.into())
    }

    /// Creates the generic "please try again" error for a failed list read.
    #[must_use]
    pub fn retrieval_failed(resource_type: impl Into<String>) -> Self {
        Self::RetrievalFailed {
            resource_type: resource_type.into(),
        }
    }

    /// Creates a record store error.
    #[must_use]
    pub fn record_store<T: Into<String>>(status: Option<u16>, message: T) -> Self {
        Self::RecordStore {
            status,
            message: message.into(),
        }
    }

    /// Creates an internal error.
    #[must_use]
    pub fn internal<T: Into<String>>(message: T) -> Self {
        Self::Internal(message.into())
    }

    /// Returns true for [`TrackError::NotFound`].
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

impl From<serde_json::Error> for TrackError {
    fn from(err: serde_json::Error) -> Self {
        Self::Internal(format!("JSON serialization error: {}", err))
    }
}

/// Serializable error response for API responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorResponse {
    /// HTTP status code, mirrored in the body.
    pub status_code: u16,
    /// Machine-readable error code
    pub code: String,
    /// Human-readable error message
    pub message: String,
    /// Optional field-level errors for validation
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Field-level validation error.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FieldError {
    /// Field name
    pub field: String,
    /// Error message
    pub message: String,
    /// Error code
    pub code: String,
}

impl ErrorResponse {
    /// Creates a new error response from a `TrackError`.
    #[must_use]
    pub fn from_error(error: &TrackError) -> Self {
        Self {
            status_code: error.status_code(),
            code: error.error_code().to_string(),
            message: error.to_string(),
            details: None,
        }
    }

    /// Sets field-level validation errors.
    #[must_use]
    pub fn with_details(mut self, details: Vec<FieldError>) -> Self {
        self.details = Some(details);
        self
    }
}

impl From<&TrackError> for ErrorResponse {
    fn from(error: &TrackError) -> Self {
        Self::from_error(error)
    }
}
