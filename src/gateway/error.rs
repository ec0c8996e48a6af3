//! Gateway failure classification.
//!
//! Every rejection a gateway can produce maps to one `GatewayError`. The
//! status class drives what the rest of the client does with it: an
//! unauthorized response ends the session, the other classes become
//! user-visible notifications.

use thiserror::Error;

/// Result alias used by every gateway call.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Errors that can occur while talking to the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GatewayError {
    /// 401: the access token is missing, expired or revoked.
    #[error("{message}")]
    Unauthorized { message: String },

    /// 403
    #[error("{message}")]
    Forbidden { message: String },

    /// 404
    #[error("{message}")]
    NotFound { message: String },

    /// Any 5xx status.
    #[error("{message}")]
    Server { status: u16, message: String },

    /// Any other non-success status.
    #[error("{message}")]
    Api { status: u16, message: String },

    /// Request exceeded the configured timeout
    #[error("Request timeout after {duration}s")]
    Timeout { duration: u64 },

    /// Failed to reach the backend
    #[error("Connection failed: {0}")]
    Connection(String),

    /// Response body did not have the expected shape
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Request could not be built (bad base URL, unserializable body)
    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

/// Coarse classification of a rejection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusClass {
    Unauthorized,
    Forbidden,
    NotFound,
    ServerError,
    Other,
}

impl GatewayError {
    /// Build the error for a non-success HTTP status.
    ///
    /// `message` is the server-provided message when the body carried one.
    pub fn from_status(status: u16, message: Option<String>) -> Self {
        let message = message
            .filter(|m| !m.trim().is_empty())
            .unwrap_or_else(|| format!("Request failed with status code {}", status));
        match status {
            401 => GatewayError::Unauthorized { message },
            403 => GatewayError::Forbidden { message },
            404 => GatewayError::NotFound { message },
            500..=599 => GatewayError::Server { status, message },
            _ => GatewayError::Api { status, message },
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            GatewayError::Unauthorized { .. } => Some(401),
            GatewayError::Forbidden { .. } => Some(403),
            GatewayError::NotFound { .. } => Some(404),
            GatewayError::Server { status, .. } | GatewayError::Api { status, .. } => {
                Some(*status)
            }
            GatewayError::Timeout { .. }
            | GatewayError::Connection(_)
            | GatewayError::Decode(_)
            | GatewayError::InvalidRequest(_) => None,
        }
    }

    pub fn status_class(&self) -> StatusClass {
        match self {
            GatewayError::Unauthorized { .. } => StatusClass::Unauthorized,
            GatewayError::Forbidden { .. } => StatusClass::Forbidden,
            GatewayError::NotFound { .. } => StatusClass::NotFound,
            GatewayError::Server { .. } => StatusClass::ServerError,
            _ => StatusClass::Other,
        }
    }

    /// Human-readable message extracted from the rejection.
    ///
    /// Returns `None` when the rejection carries nothing worth showing, in
    /// which case callers use their own fallback.
    pub fn message(&self) -> Option<String> {
        match self {
            GatewayError::Unauthorized { message }
            | GatewayError::Forbidden { message }
            | GatewayError::NotFound { message }
            | GatewayError::Server { message, .. }
            | GatewayError::Api { message, .. } => {
                Some(message.clone()).filter(|m| !m.trim().is_empty())
            }
            GatewayError::Timeout { .. } | GatewayError::Connection(_) => Some(self.to_string()),
            GatewayError::Decode(_) | GatewayError::InvalidRequest(_) => None,
        }
    }

    /// The message, or `fallback` when there is none.
    pub fn message_or(&self, fallback: &str) -> String {
        self.message().unwrap_or_else(|| fallback.to_string())
    }

    /// Notification text shown to the user for this class of failure.
    pub fn user_message(&self) -> String {
        match self.status_class() {
            StatusClass::Unauthorized => "Your session has expired. Please log in again.".to_string(),
            StatusClass::Forbidden => "You do not have permission to access this resource.".to_string(),
            StatusClass::NotFound => "The requested resource was not found.".to_string(),
            StatusClass::ServerError => "Server error. Please try again later.".to_string(),
            StatusClass::Other => self.message_or("An error occurred. Please try again."),
        }
    }

    /// Error type string for logs.
    pub fn error_type(&self) -> &'static str {
        match self {
            GatewayError::Unauthorized { .. } => "unauthorized",
            GatewayError::Forbidden { .. } => "forbidden",
            GatewayError::NotFound { .. } => "not_found",
            GatewayError::Server { .. } => "server_error",
            GatewayError::Api { .. } => "api_error",
            GatewayError::Timeout { .. } => "timeout",
            GatewayError::Connection(_) => "connection_error",
            GatewayError::Decode(_) => "decode_error",
            GatewayError::InvalidRequest(_) => "invalid_request",
        }
    }
}
