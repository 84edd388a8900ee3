//! Error types for Mnemosyne.
//!
//! This module provides the [`ContextError`] type used throughout the
//! resolution layer, plus the serializable envelope returned to clients
//! when a request is short-circuited.
//!
//! Two classes of failure exist:
//!
//! - **Configuration errors** are raised during the startup registration
//!   phase (duplicate names, unknown scheme references). A process must not
//!   begin serving traffic with one of these pending.
//! - **Request-time errors** (unknown strategy, strategy failure, strategy
//!   panic) are server-side defects surfaced to clients as a generic
//!   internal error. The details stay in the logs.

use http::StatusCode;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias using [`ContextError`].
pub type ContextResult<T> = Result<T, ContextError>;

/// Categories of errors for classification and handling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Invalid registration or route binding configuration.
    Configuration,
    /// Server-side defects during request-time resolution.
    Internal,
}

impl ErrorCategory {
    /// Returns the default HTTP status code for this error category.
    ///
    /// Every failure of the resolution layer is a server-side defect, so
    /// both categories map to a 500-class response.
    #[must_use]
    pub const fn default_status_code(&self) -> StatusCode {
        match self {
            Self::Configuration | Self::Internal => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// Standard error type for the context resolution layer.
///
/// # Example
///
/// ```
/// use mnemosyne_core::{ContextError, ErrorCategory};
///
/// let err = ContextError::unknown_strategy("session");
/// assert_eq!(err.category(), ErrorCategory::Internal);
/// ```
#[derive(Error, Debug)]
pub enum ContextError {
    /// Invalid registration or binding configuration.
    #[error("Configuration error: {message}")]
    Configuration {
        /// Human-readable error message.
        message: String,
    },

    /// A route referenced a strategy name absent from the registry.
    #[error("Context strategy not found: {strategy}")]
    UnknownStrategy {
        /// The strategy name that was requested.
        strategy: String,
    },

    /// A strategy's context producer completed with an error.
    #[error("Context strategy `{strategy}` failed: {source}")]
    Resolution {
        /// The strategy that failed.
        strategy: String,
        /// The underlying error (not exposed to clients).
        #[source]
        source: anyhow::Error,
    },

    /// A strategy's context producer panicked.
    ///
    /// The panic is caught at the resolution boundary so it affects only
    /// the request that triggered it.
    #[error("Context strategy `{strategy}` panicked")]
    Panicked {
        /// The strategy that panicked.
        strategy: String,
    },
}

impl ContextError {
    /// Creates a configuration error with a message.
    #[must_use]
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Creates an unknown-strategy error.
    #[must_use]
    pub fn unknown_strategy(strategy: impl Into<String>) -> Self {
        Self::UnknownStrategy {
            strategy: strategy.into(),
        }
    }

    /// Creates a resolution error from a strategy failure.
    pub fn resolution(strategy: impl Into<String>, source: impl Into<anyhow::Error>) -> Self {
        Self::Resolution {
            strategy: strategy.into(),
            source: source.into(),
        }
    }

    /// Creates an error for a strategy that panicked.
    #[must_use]
    pub fn panicked(strategy: impl Into<String>) -> Self {
        Self::Panicked {
            strategy: strategy.into(),
        }
    }

    /// Returns the error category.
    #[must_use]
    pub const fn category(&self) -> ErrorCategory {
        match self {
            Self::Configuration { .. } => ErrorCategory::Configuration,
            Self::UnknownStrategy { .. } | Self::Resolution { .. } | Self::Panicked { .. } => {
                ErrorCategory::Internal
            }
        }
    }

    /// Returns the HTTP status code for this error.
    #[must_use]
    pub const fn status_code(&self) -> StatusCode {
        self.category().default_status_code()
    }

    /// Returns a machine-readable error code.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "CONFIGURATION_ERROR",
            Self::UnknownStrategy { .. } => "UNKNOWN_STRATEGY",
            Self::Resolution { .. } => "CONTEXT_RESOLUTION_FAILED",
            Self::Panicked { .. } => "CONTEXT_RESOLUTION_PANICKED",
        }
    }

    /// Returns the message safe to send to clients.
    ///
    /// Internal detail (strategy names, source errors) stays in the logs;
    /// clients only ever see a generic failure.
    #[must_use]
    pub const fn public_message(&self) -> &'static str {
        match self {
            Self::Configuration { .. } => "Invalid context configuration",
            Self::UnknownStrategy { .. } | Self::Resolution { .. } | Self::Panicked { .. } => {
                "Failed to resolve request context"
            }
        }
    }

    /// Converts this error to a serializable error envelope.
    #[must_use]
    pub fn to_envelope(&self, request_id: Option<&str>) -> ErrorEnvelope {
        ErrorEnvelope {
            error: ErrorDetail {
                code: self.error_code().to_string(),
                message: self.public_message().to_string(),
                category: self.category(),
            },
            request_id: request_id.map(ToString::to_string),
        }
    }
}

/// Serializable error envelope for HTTP responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    /// The error details.
    pub error: ErrorDetail,
    /// The request ID for correlation.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_id: Option<String>,
}

/// Error detail within an envelope.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetail {
    /// Machine-readable error code.
    pub code: String,
    /// Client-safe error message.
    pub message: String,
    /// Error category.
    pub category: ErrorCategory,
}
