use crate::validation::FieldErrors;

use thiserror::Error;

/// Result type alias for mealchat-core
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the chat widget and its forms
#[derive(Debug, Error)]
pub enum Error {
    /// I/O error for file operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(String),

    /// User input rejected before any state change
    #[error("validation error: {0}")]
    Validation(#[from] FieldErrors),

    /// Inference call failed
    #[error("inference error: {0}")]
    Inference(#[from] InferenceError),

    /// Identity provider rejected the request
    #[error("auth error: {0}")]
    Auth(#[from] AuthError),

    /// Parse/serialization errors
    #[error("parse error: {0}")]
    Parse(String),

    /// Generic errors
    #[error("{0}")]
    Other(String),
}

/// Failure of a single call to the text-generation service
///
/// These never reach the transcript. The widget replaces them with a fixed
/// fallback reply and logs the cause.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InferenceError {
    /// Prompt was empty or whitespace only; no request was sent
    #[error("prompt is empty")]
    EmptyPrompt,

    /// Connection could not be established or was dropped
    #[error("network error: {0}")]
    Network(String),

    /// Request exceeded the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Provider answered with an error status or error payload
    #[error("provider returned {status}: {message}")]
    Provider { status: u16, message: String },

    /// Response body did not match any known shape
    #[error("could not decode provider response: {0}")]
    Decode(String),
}

impl InferenceError {
    /// Create a provider error from a status code and message
    pub fn provider(status: u16, message: impl Into<String>) -> Self {
        Self::Provider { status, message: message.into() }
    }

    /// Whether a second attempt could plausibly succeed
    pub fn is_transient(&self) -> bool {
        match self {
            Self::Network(_) | Self::Timeout => true,
            Self::Provider { status, .. } => *status == 429 || *status == 503 || (500..600).contains(status),
            Self::EmptyPrompt | Self::Decode(_) => false,
        }
    }
}

/// Rejection from the identity provider
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Unknown email or wrong password
    #[error("email or password is incorrect")]
    InvalidCredentials,

    /// Sign-up for an address that already has an account
    #[error("an account already exists for {0}")]
    EmailInUse(String),

    /// Operation requires a signed-in user
    #[error("no user is signed in")]
    NotSignedIn,

    /// Identity service could not be reached
    #[error("identity service unavailable: {0}")]
    Unavailable(String),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::validation::Field;

    #[test]
    fn test_error_display() {
        let io_err: Error = Error::Io(std::io::Error::new(std::io::ErrorKind::NotFound, "file not found"));
        assert_eq!(io_err.to_string(), "I/O error: file not found");

        let config_err: Error = Error::Config("missing api_token".to_string());
        assert_eq!(config_err.to_string(), "configuration error: missing api_token");

        let parse_err: Error = Error::Parse("invalid TOML".to_string());
        assert_eq!(parse_err.to_string(), "parse error: invalid TOML");

        let other_err: Error = Error::Other("something went wrong".to_string());
        assert_eq!(other_err.to_string(), "something went wrong");
    }

    #[test]
    fn test_inference_error_display() {
        assert_eq!(InferenceError::EmptyPrompt.to_string(), "prompt is empty");
        assert_eq!(InferenceError::Timeout.to_string(), "request timed out");
        assert_eq!(
            InferenceError::provider(503, "Model is loading").to_string(),
            "provider returned 503: Model is loading"
        );
        assert_eq!(
            InferenceError::Network("connection refused".to_string()).to_string(),
            "network error: connection refused"
        );
    }

    #[test]
    fn test_inference_error_is_transient() {
        assert!(InferenceError::Timeout.is_transient());
        assert!(InferenceError::Network("reset".to_string()).is_transient());
        assert!(InferenceError::provider(429, "rate limited").is_transient());
        assert!(InferenceError::provider(502, "bad gateway").is_transient());

        assert!(!InferenceError::provider(401, "unauthorized").is_transient());
        assert!(!InferenceError::provider(400, "bad input").is_transient());
        assert!(!InferenceError::EmptyPrompt.is_transient());
        assert!(!InferenceError::Decode("not json".to_string()).is_transient());
    }

    #[test]
    fn test_auth_error_display() {
        assert_eq!(AuthError::InvalidCredentials.to_string(), "email or password is incorrect");
        assert_eq!(
            AuthError::EmailInUse("a@b.id".to_string()).to_string(),
            "an account already exists for a@b.id"
        );
    }

    #[test]
    fn test_error_from_sub_errors() {
        let error: Error = InferenceError::Timeout.into();
        assert_eq!(error.to_string(), "inference error: request timed out");

        let error: Error = AuthError::NotSignedIn.into();
        assert_eq!(error.to_string(), "auth error: no user is signed in");

        let mut fields = FieldErrors::new();
        fields.insert(Field::Email, "Email tidak valid");
        let error: Error = fields.into();
        assert_eq!(error.to_string(), "validation error: email: Email tidak valid");
    }

    #[test]
    fn test_result_type_alias() {
        let ok: Result<i32> = Ok(42);
        assert!(ok.is_ok());

        let err: Result<i32> = Err(Error::Other("error".to_string()));
        assert!(err.is_err());
    }
}
