//! Error types for the generation path.
//!
//! Every failure of a generation or refinement ends up as one
//! [`GenerationError`] at the controller, which turns it into the single
//! user-visible status.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum GenerationError {
    /// No credential for the external service
    #[error("Missing API credential: {0}")]
    Configuration(String),

    /// The call itself failed (network, TLS, non-2xx status, timeout)
    #[error("Request to the curriculum service failed: {0}")]
    Transport(String),

    /// The call succeeded but carried no content
    #[error("The curriculum service returned an empty response")]
    EmptyResponse,

    /// Content was present but does not match the curriculum schema
    #[error("The curriculum service returned a malformed response: {0}")]
    MalformedResponse(String),

    /// The user stopped the operation
    #[error("Generation cancelled by user.")]
    CancelledByUser,
}

impl GenerationError {
    /// Message shown in place of the loading indicator
    pub fn user_message(&self) -> String {
        match self {
            GenerationError::Configuration(_) => {
                "The curriculum service is not configured. Set GEMINI_API_KEY and try again."
                    .to_string()
            }
            GenerationError::Transport(_) => {
                "Failed to architect your curriculum. Please try again.".to_string()
            }
            GenerationError::EmptyResponse | GenerationError::MalformedResponse(_) => {
                "The curriculum could not be read. Try again or adjust your input.".to_string()
            }
            GenerationError::CancelledByUser => "Generation cancelled by user.".to_string(),
        }
    }

    /// Cancellation is reported like an error but says nothing about the service
    pub fn is_cancellation(&self) -> bool {
        matches!(self, GenerationError::CancelledByUser)
    }
}

impl From<reqwest::Error> for GenerationError {
    fn from(err: reqwest::Error) -> Self {
        GenerationError::Transport(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_and_malformed_share_message() {
        assert_eq!(
            GenerationError::EmptyResponse.user_message(),
            GenerationError::MalformedResponse("x".into()).user_message()
        );
    }

    #[test]
    fn test_cancellation_is_distinguishable() {
        assert!(GenerationError::CancelledByUser.is_cancellation());
        assert!(!GenerationError::Transport("reset".into()).is_cancellation());
        assert_eq!(
            GenerationError::CancelledByUser.user_message(),
            "Generation cancelled by user."
        );
    }
}
