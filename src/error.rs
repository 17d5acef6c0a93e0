// Console Error Types
use serde_json::{json, Value};
use thiserror::Error;

use crate::form::FieldErrors;
use crate::menu::tree::MenuTreeError;

/// Broad error classes. Callers pick their recovery from this rather than
/// matching every variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Credentials rejected at login; surfaced as a toast, no redirect
    Authentication,
    /// Any 401 outside login; the session has already been cleared
    SessionExpired,
    /// Field-level validation; the request was never sent
    Validation,
    /// Server or transport failure on a fetch or mutation
    Request,
    /// Malformed menu structure
    Structural,
    /// Local failures: config, files, encoding
    Local,
}

#[derive(Debug, Error)]
pub enum ConsoleError {
    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Session expired, please log in again")]
    SessionExpired,

    #[error("Not logged in. Run 'erp-admin auth login' first")]
    NotAuthenticated,

    #[error("Validation failed: {}", format_field_errors(.0))]
    Validation(FieldErrors),

    #[error("Request failed ({status}): {message}")]
    Request { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Operation refused: {0}")]
    Refused(String),

    #[error("No data to export")]
    NoData,

    #[error("Invalid menu structure: {0}")]
    MenuStructure(#[from] MenuTreeError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

pub type Result<T> = std::result::Result<T, ConsoleError>;

impl ConsoleError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ConsoleError::AuthenticationFailed(_) => ErrorKind::Authentication,
            ConsoleError::SessionExpired | ConsoleError::NotAuthenticated => {
                ErrorKind::SessionExpired
            }
            ConsoleError::Validation(_) => ErrorKind::Validation,
            ConsoleError::Request { .. }
            | ConsoleError::NotFound(_)
            | ConsoleError::Refused(_)
            | ConsoleError::Transport(_) => ErrorKind::Request,
            ConsoleError::MenuStructure(_) => ErrorKind::Structural,
            ConsoleError::NoData
            | ConsoleError::Config(_)
            | ConsoleError::Url(_)
            | ConsoleError::Io(_)
            | ConsoleError::Json(_)
            | ConsoleError::Csv(_) => ErrorKind::Local,
        }
    }

    /// HTTP status behind the error, when there is one
    pub fn status_code(&self) -> Option<u16> {
        match self {
            ConsoleError::SessionExpired => Some(401),
            ConsoleError::NotFound(_) => Some(404),
            ConsoleError::Request { status, .. } => Some(*status),
            ConsoleError::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }

    /// Stable code for JSON output
    pub fn error_code(&self) -> &'static str {
        match self {
            ConsoleError::AuthenticationFailed(_) => "AUTHENTICATION_FAILED",
            ConsoleError::SessionExpired => "SESSION_EXPIRED",
            ConsoleError::NotAuthenticated => "NOT_AUTHENTICATED",
            ConsoleError::Validation(_) => "VALIDATION_ERROR",
            ConsoleError::Request { .. } => "REQUEST_FAILED",
            ConsoleError::NotFound(_) => "NOT_FOUND",
            ConsoleError::Refused(_) => "REFUSED",
            ConsoleError::NoData => "NO_DATA",
            ConsoleError::MenuStructure(_) => "MENU_STRUCTURE",
            ConsoleError::Config(_) => "CONFIG_ERROR",
            ConsoleError::Transport(_) => "TRANSPORT_ERROR",
            ConsoleError::Url(_) => "INVALID_URL",
            ConsoleError::Io(_) => "IO_ERROR",
            ConsoleError::Json(_) => "JSON_ERROR",
            ConsoleError::Csv(_) => "CSV_ERROR",
        }
    }

    pub fn to_json(&self) -> Value {
        match self {
            ConsoleError::Validation(field_errors) => json!({
                "success": false,
                "error": "Validation failed",
                "error_code": self.error_code(),
                "field_errors": field_errors,
            }),
            _ => json!({
                "success": false,
                "error": self.to_string(),
                "error_code": self.error_code(),
            }),
        }
    }
}

fn format_field_errors(errors: &FieldErrors) -> String {
    errors
        .iter()
        .map(|(field, message)| format!("{}: {}", field, message))
        .collect::<Vec<_>>()
        .join("; ")
}
