//! Error types for cashdesk-core
//!
//! Every collaborator call (record counts, context lookups, action runs)
//! reports failures through [`CoreError`]. None of these errors ever reach the
//! dashboard user directly: they are either recovered locally or turned into a
//! notification by the dispatcher.

use thiserror::Error;
use serde::{Deserialize, Serialize};
use std::io;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Backing collection does not exist
    CollectionUnavailable,
    /// Count query failed on the remote side
    QueryFailed,
    /// Remote call did not answer in time
    Timeout,
    /// Remote context could not be fetched
    ContextUnavailable,
    /// Symbolic action is not registered
    ActionNotRegistered,
    /// Action execution failed
    ActionFailed,
    /// Category key is not configured
    UnknownCategory,
    /// Category list is structurally broken
    InvalidCategory,
    /// Invalid data format
    InvalidFormat,
    /// IO error
    IoError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::CollectionUnavailable => write!(f, "COLLECTION_UNAVAILABLE"),
            ErrorCode::QueryFailed => write!(f, "QUERY_FAILED"),
            ErrorCode::Timeout => write!(f, "TIMEOUT"),
            ErrorCode::ContextUnavailable => write!(f, "CONTEXT_UNAVAILABLE"),
            ErrorCode::ActionNotRegistered => write!(f, "ACTION_NOT_REGISTERED"),
            ErrorCode::ActionFailed => write!(f, "ACTION_FAILED"),
            ErrorCode::UnknownCategory => write!(f, "UNKNOWN_CATEGORY"),
            ErrorCode::InvalidCategory => write!(f, "INVALID_CATEGORY"),
            ErrorCode::InvalidFormat => write!(f, "INVALID_FORMAT"),
            ErrorCode::IoError => write!(f, "IO_ERROR"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    /// Create a new error detail
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Debug information
    Debug,
    /// Informational
    Info,
    /// Warning - operation may be affected
    Warning,
    /// Error - operation failed
    Error,
    /// Critical - application may be unstable
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Debug => write!(f, "debug"),
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
            ErrorSeverity::Critical => write!(f, "critical"),
        }
    }
}

/// Main error type for cashdesk-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Collection not available: {collection}")]
    CollectionUnavailable { collection: String },

    #[error("Query on {collection} failed: {message}")]
    QueryFailed { collection: String, message: String },

    #[error("{operation} timed out after {millis} ms")]
    Timeout { operation: String, millis: u64 },

    #[error("Context unavailable: {message}")]
    ContextUnavailable { message: String },

    #[error("Action not registered: {name}")]
    ActionNotRegistered { name: String },

    #[error("Action failed: {message}")]
    ActionFailed { message: String },

    #[error("Unknown cash category: {key}")]
    UnknownCategory { key: String },

    #[error("Invalid category list: {message}")]
    InvalidCategory { message: String },

    #[error("Invalid format: {message}")]
    InvalidFormat { message: String },

    #[error("IO error occurred")]
    IoError,
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::CollectionUnavailable { .. } => ErrorCode::CollectionUnavailable,
            CoreError::QueryFailed { .. } => ErrorCode::QueryFailed,
            CoreError::Timeout { .. } => ErrorCode::Timeout,
            CoreError::ContextUnavailable { .. } => ErrorCode::ContextUnavailable,
            CoreError::ActionNotRegistered { .. } => ErrorCode::ActionNotRegistered,
            CoreError::ActionFailed { .. } => ErrorCode::ActionFailed,
            CoreError::UnknownCategory { .. } => ErrorCode::UnknownCategory,
            CoreError::InvalidCategory { .. } => ErrorCode::InvalidCategory,
            CoreError::InvalidFormat { .. } => ErrorCode::InvalidFormat,
            CoreError::IoError => ErrorCode::IoError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::CollectionUnavailable { .. } => ErrorSeverity::Info,
            CoreError::QueryFailed { .. } => ErrorSeverity::Warning,
            CoreError::Timeout { .. } => ErrorSeverity::Warning,
            CoreError::ContextUnavailable { .. } => ErrorSeverity::Debug,
            CoreError::ActionNotRegistered { .. } => ErrorSeverity::Info,
            CoreError::ActionFailed { .. } => ErrorSeverity::Error,
            CoreError::UnknownCategory { .. } => ErrorSeverity::Error,
            CoreError::InvalidCategory { .. } => ErrorSeverity::Critical,
            CoreError::InvalidFormat { .. } => ErrorSeverity::Error,
            CoreError::IoError => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::CollectionUnavailable { collection } => {
                details = details.with_detail(serde_json::json!({ "collection": collection }));
                details = details.with_suggestion(
                    "The module providing this cash register may not be installed yet.".to_string()
                );
            }
            CoreError::Timeout { millis, .. } => {
                details = details.with_suggestion(format!(
                    "Raise dashboard.query_timeout_ms above {} if the backend is slow.", millis
                ));
            }
            CoreError::ActionNotRegistered { name } => {
                details = details.with_suggestion(format!(
                    "Add '{}' to dashboard.registered_actions or rely on the generated view.", name
                ));
            }
            CoreError::UnknownCategory { key } => {
                details = details.with_suggestion(format!(
                    "Check that '{}' is listed under dashboard.categories.", key
                ));
            }
            CoreError::InvalidFormat { message } => {
                details = details.with_detail(serde_json::json!({ "format_message": message }));
                details = details.with_suggestion(
                    "Check the syntax of the records file.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<io::Error> for CoreError {
    fn from(_error: io::Error) -> Self {
        CoreError::IoError
    }
}

/// Error context for reporting
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Cash category involved, if any
    pub category: Option<String>,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            category: None,
        }
    }

    /// Add the category involved
    pub fn with_category(mut self, category: &str) -> Self {
        self.category = Some(category.to_string());
        self
    }
}

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a recovered failure
    fn log_recovered(&self, error: &CoreError, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        log::error!(
            target: "cashdesk::error",
            "ERROR [{}] {} - Operation: {} - Category: {:?}",
            error.code(),
            error.to_details(),
            context.operation,
            context.category
        );
    }

    fn log_recovered(&self, error: &CoreError, context: &ErrorContext) {
        log::warn!(
            target: "cashdesk::error",
            "RECOVERED [{}] {} - Operation: {} - Category: {:?}",
            error.code(),
            error,
            context.operation,
            context.category
        );
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_display() {
        assert_eq!(ErrorCode::CollectionUnavailable.to_string(), "COLLECTION_UNAVAILABLE");
        assert_eq!(ErrorCode::ActionNotRegistered.to_string(), "ACTION_NOT_REGISTERED");
        assert_eq!(ErrorCode::Timeout.to_string(), "TIMEOUT");
    }

    #[test]
    fn test_core_error_severity() {
        let error = CoreError::ContextUnavailable { message: "offline".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Debug);

        let error = CoreError::InvalidCategory { message: "empty".to_string() };
        assert_eq!(error.severity(), ErrorSeverity::Critical);
    }

    #[test]
    fn test_error_details_collection_unavailable() {
        let error = CoreError::CollectionUnavailable {
            collection: "distribution.cash".to_string(),
        };
        let details = error.to_details();

        assert_eq!(details.code, ErrorCode::CollectionUnavailable);
        assert!(details.details.is_some());
        assert!(!details.suggestions.is_empty());
        assert!(details.message.contains("distribution.cash"));
    }

    #[test]
    fn test_timeout_message() {
        let error = CoreError::Timeout { operation: "count petty.cash".to_string(), millis: 250 };
        assert_eq!(error.to_string(), "count petty.cash timed out after 250 ms");
        assert!(error.to_details().suggestions[0].contains("250"));
    }

    #[test]
    fn test_error_context() {
        let context = ErrorContext::new("dispatch").with_category("petty_cash");
        assert_eq!(context.operation, "dispatch");
        assert_eq!(context.category.as_deref(), Some("petty_cash"));
    }
}
