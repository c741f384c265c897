//! Error types for the search client

use thiserror::Error;

/// Errors returned by the client
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid user input, raised before any request is sent
    #[error("{0}")]
    User(String),

    /// The API answered with a non-success status code
    #[error("API request failed with status {code}: {description}")]
    Api {
        /// Platform status code (10000 is success)
        code: u32,
        /// Short status description
        description: String,
        /// Longer explanation, may be empty
        details: String,
    },

    /// Non-JSON error body from the server or a proxy
    #[error("HTTP error {status}: {body}")]
    HttpStatus {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Transport level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Payload could not be encoded or decoded
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Local file access failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Settings file could not be parsed
    #[error("Settings error: {0}")]
    Settings(#[from] serde_yaml::Error),
}

impl Error {
    /// Build a user error from a message
    pub fn user(msg: impl Into<String>) -> Self {
        Self::User(msg.into())
    }

    /// Whether this error was caused by invalid caller input
    pub fn is_user_error(&self) -> bool {
        matches!(self, Self::User(_))
    }
}

/// Result alias used throughout the crate
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_error_display() {
        let err = Error::user("Invalid rank or filter input: unknown field `extra`");
        assert!(err.is_user_error());
        assert_eq!(
            err.to_string(),
            "Invalid rank or filter input: unknown field `extra`"
        );
    }

    #[test]
    fn test_api_error_is_not_user_error() {
        let err = Error::Api {
            code: 11102,
            description: "Invalid request".to_string(),
            details: String::new(),
        };
        assert!(!err.is_user_error());
        assert!(err.to_string().contains("11102"));
    }
}
