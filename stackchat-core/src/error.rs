//! Error types for the Stackchat core library.
//!
//! Every fallible operation in the client returns a [`StackchatError`]. Errors
//! are logged once where they are raised and then handed back to the caller;
//! nothing in this crate retries.
//!
//! # Error Codes Reference
//!
//! | Code Range | Category | Description |
//! |------------|----------|-------------|
//! | E1001-E1099 | Session | Missing credentials, expired session, session store errors |
//! | E2001-E2099 | Config | Config file and validation errors |
//! | E3001-E3099 | API | HTTP status, transport, timeout and decode errors |
//! | E4001-E4099 | Validation | Input rejected before any request is sent |
//! | E9001-E9099 | General | Internal, IO, and serialization errors |

use std::fmt;
use thiserror::Error;
use tracing::{error, warn};

/// The main error type for the Stackchat core library.
#[derive(Debug, Error)]
pub enum StackchatError {
    // ========================================================================
    // Session Errors (E1001-E1099)
    // ========================================================================
    /// No access/refresh token pair is held by the session
    #[error("[E1001] Tokens not found in session")]
    NotAuthenticated,

    /// No training task id is held by the session
    #[error("[E1002] Task ID not found in session")]
    MissingTaskId,

    /// The backend rejected the bearer token
    #[error("[E1003] Session expired while calling {operation}")]
    SessionExpired { operation: &'static str },

    /// Reading or writing the persisted session failed
    #[error("[E1004] Session store error: {0}")]
    SessionStore(String),

    // ========================================================================
    // Configuration Errors (E2001-E2099)
    // ========================================================================
    /// Configuration file parse error
    #[error("[E2002] Failed to parse configuration: {0}")]
    ConfigParseError(String),

    /// Invalid configuration value
    #[error("[E2003] Invalid configuration value for '{key}': {message}")]
    InvalidConfigValue { key: String, message: String },

    /// Configuration error (generic)
    #[error("[E2004] Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // API Errors (E3001-E3099)
    // ========================================================================
    /// Backend answered with a non-success status
    #[error("[E3001] {operation} failed (HTTP {status}){}", detail_suffix(.detail))]
    ApiRequestFailed {
        operation: &'static str,
        status: u16,
        detail: Option<String>,
    },

    /// Response body did not have the expected shape
    #[error("[E3002] Failed to parse API response: {0}")]
    ApiParseError(String),

    /// Backend could not be reached
    #[error("[E3003] API service unavailable: {0}")]
    ApiServiceUnavailable(String),

    /// Request exceeded the configured timeout
    #[error("[E3004] Request timed out: {0}")]
    RequestTimeout(String),

    /// Any other transport failure
    #[error("[E3005] HTTP transport error: {0}")]
    Transport(String),

    // ========================================================================
    // Validation Errors (E4001-E4099)
    // ========================================================================
    /// Chat name was empty or whitespace only
    #[error("[E4001] Chat name cannot be empty")]
    EmptyChatName,

    /// No chat is selected for a message operation
    #[error("[E4002] No chat selected")]
    NoChatSelected,

    /// Prompt was empty or whitespace only
    #[error("[E4003] Message cannot be empty")]
    EmptyPrompt,

    /// Field-level validation failure
    #[error("[E4004] Validation error: {0}")]
    ValidationError(String),

    // ========================================================================
    // General Errors (E9001-E9099)
    // ========================================================================
    /// Internal error (catch-all for unexpected conditions)
    #[error("[E9001] Internal error: {0}")]
    Internal(String),

    /// IO error
    #[error("[E9002] IO error: {0}")]
    IoError(String),

    /// Serialization/deserialization error
    #[error("[E9003] Serialization error: {0}")]
    SerializationError(String),
}

fn detail_suffix(detail: &Option<String>) -> String {
    match detail {
        Some(d) => format!(": {}", d),
        None => String::new(),
    }
}

/// Result type alias for Stackchat operations.
pub type StackchatResult<T> = Result<T, StackchatError>;

// ============================================================================
// From trait implementations for seamless error propagation
// ============================================================================

impl From<reqwest::Error> for StackchatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            StackchatError::RequestTimeout(err.to_string())
        } else if err.is_connect() {
            StackchatError::ApiServiceUnavailable(err.to_string())
        } else if err.is_decode() {
            StackchatError::ApiParseError(err.to_string())
        } else {
            StackchatError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for StackchatError {
    fn from(err: serde_json::Error) -> Self {
        StackchatError::SerializationError(err.to_string())
    }
}

impl From<std::io::Error> for StackchatError {
    fn from(err: std::io::Error) -> Self {
        StackchatError::IoError(err.to_string())
    }
}

impl From<config::ConfigError> for StackchatError {
    fn from(err: config::ConfigError) -> Self {
        match err {
            config::ConfigError::NotFound(key) => StackchatError::InvalidConfigValue {
                key,
                message: "Key not found".to_string(),
            },
            config::ConfigError::FileParse { uri, cause } => StackchatError::ConfigParseError(
                format!("Failed to parse {}: {}", uri.unwrap_or_default(), cause),
            ),
            config::ConfigError::Type {
                origin,
                unexpected,
                expected,
                key,
            } => StackchatError::InvalidConfigValue {
                key: key.unwrap_or_else(|| origin.map(|o| o.to_string()).unwrap_or_default()),
                message: format!("Expected {}, got {}", expected, unexpected),
            },
            _ => StackchatError::ConfigParseError(err.to_string()),
        }
    }
}

impl From<crate::config::ConfigLoadError> for StackchatError {
    fn from(err: crate::config::ConfigLoadError) -> Self {
        match err {
            crate::config::ConfigLoadError::Config(e) => e.into(),
            crate::config::ConfigLoadError::MissingRequired(key) => {
                StackchatError::InvalidConfigValue {
                    key,
                    message: "Missing required value".to_string(),
                }
            }
            crate::config::ConfigLoadError::InvalidValue { key, message } => {
                StackchatError::InvalidConfigValue { key, message }
            }
            crate::config::ConfigLoadError::Io(e) => e.into(),
        }
    }
}

// ============================================================================
// Error categorization helpers
// ============================================================================

impl StackchatError {
    /// Returns true if this error means the user has to log in (again).
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            StackchatError::NotAuthenticated | StackchatError::SessionExpired { .. }
        )
    }

    /// Returns true if this error is related to configuration.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            StackchatError::ConfigParseError(_)
                | StackchatError::InvalidConfigValue { .. }
                | StackchatError::Config(_)
        )
    }

    /// Returns true if this error came from the HTTP layer.
    pub fn is_api_error(&self) -> bool {
        matches!(
            self,
            StackchatError::ApiRequestFailed { .. }
                | StackchatError::ApiParseError(_)
                | StackchatError::ApiServiceUnavailable(_)
                | StackchatError::RequestTimeout(_)
                | StackchatError::Transport(_)
                | StackchatError::SessionExpired { .. }
        )
    }

    /// Returns true if the input was rejected before any request was issued.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            StackchatError::EmptyChatName
                | StackchatError::NoChatSelected
                | StackchatError::EmptyPrompt
                | StackchatError::ValidationError(_)
        )
    }

    /// Returns true if this error is transient and the operation might succeed later.
    pub fn is_transient(&self) -> bool {
        match self {
            StackchatError::ApiServiceUnavailable(_)
            | StackchatError::RequestTimeout(_)
            | StackchatError::Transport(_) => true,
            StackchatError::ApiRequestFailed { status, .. } => *status >= 500 || *status == 429,
            _ => false,
        }
    }

    /// HTTP status carried by the error, if any.
    pub fn status(&self) -> Option<u16> {
        match self {
            StackchatError::ApiRequestFailed { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Returns an error code suitable for logging or external reporting.
    pub fn error_code(&self) -> &'static str {
        match self {
            StackchatError::NotAuthenticated => "E1001",
            StackchatError::MissingTaskId => "E1002",
            StackchatError::SessionExpired { .. } => "E1003",
            StackchatError::SessionStore(_) => "E1004",
            StackchatError::ConfigParseError(_) => "E2002",
            StackchatError::InvalidConfigValue { .. } => "E2003",
            StackchatError::Config(_) => "E2004",
            StackchatError::ApiRequestFailed { .. } => "E3001",
            StackchatError::ApiParseError(_) => "E3002",
            StackchatError::ApiServiceUnavailable(_) => "E3003",
            StackchatError::RequestTimeout(_) => "E3004",
            StackchatError::Transport(_) => "E3005",
            StackchatError::EmptyChatName => "E4001",
            StackchatError::NoChatSelected => "E4002",
            StackchatError::EmptyPrompt => "E4003",
            StackchatError::ValidationError(_) => "E4004",
            StackchatError::Internal(_) => "E9001",
            StackchatError::IoError(_) => "E9002",
            StackchatError::SerializationError(_) => "E9003",
        }
    }

    /// Returns a user-friendly suggestion for how to resolve this error.
    pub fn user_suggestion(&self) -> Option<&'static str> {
        match self {
            StackchatError::NotAuthenticated => Some("Run 'stackchat login' first"),
            StackchatError::SessionExpired { .. } => {
                Some("Your session has expired. Run 'stackchat login' again")
            }
            StackchatError::MissingTaskId => {
                Some("Start a training task with 'stackchat train start'")
            }
            StackchatError::ApiServiceUnavailable(_) => {
                Some("Check that the backend is running and STACKCHAT_API_URL is correct")
            }
            StackchatError::RequestTimeout(_) => {
                Some("Increase api.request_timeout_secs or check the backend load")
            }
            StackchatError::EmptyChatName => Some("Give the chat a name"),
            StackchatError::InvalidConfigValue { .. } | StackchatError::ConfigParseError(_) => {
                Some("Check ~/.stackchat/config.toml and STACKCHAT_* environment variables")
            }
            _ => None,
        }
    }

    /// Log this error with appropriate severity level.
    pub fn log(&self) {
        let code = self.error_code();
        let suggestion = self.user_suggestion();

        if self.is_transient() {
            warn!(
                error_code = %code,
                suggestion = suggestion,
                "Transient error occurred: {}",
                self
            );
        } else {
            error!(
                error_code = %code,
                suggestion = suggestion,
                "Error occurred: {}",
                self
            );
        }
    }
}

// ============================================================================
// User-friendly error formatting for CLI
// ============================================================================

/// Format an error for CLI display with its suggestion.
pub struct CliErrorDisplay<'a> {
    error: &'a StackchatError,
    show_suggestion: bool,
}

impl<'a> CliErrorDisplay<'a> {
    pub fn new(error: &'a StackchatError) -> Self {
        Self {
            error,
            show_suggestion: true,
        }
    }

    pub fn without_suggestion(mut self) -> Self {
        self.show_suggestion = false;
        self
    }
}

impl<'a> fmt::Display for CliErrorDisplay<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.error)?;

        if self.show_suggestion {
            if let Some(suggestion) = self.error.user_suggestion() {
                writeln!(f)?;
                writeln!(f, "  Suggestion: {}", suggestion)?;
            }
        }

        if self.error.is_transient() {
            writeln!(f)?;
            writeln!(f, "  This error may be temporary. Try again shortly.")?;
        }

        Ok(())
    }
}
