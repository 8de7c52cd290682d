//! Error types for the chatbot core.

use siteline_core::error::SitelineError;

/// Errors from the chat engine.
///
/// Only `EmptyMessage` and `MessageTooLong` reach HTTP callers as client
/// errors; provider and notification failures are recovered inside the
/// engine.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("completion provider error: {0}")]
    Provider(String),
    #[error("completion provider misconfigured: {0}")]
    ProviderConfig(String),
    #[error("session error: {0}")]
    Session(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<SitelineError> for ChatError {
    fn from(err: SitelineError) -> Self {
        ChatError::Storage(err.to_string())
    }
}

impl From<reqwest::Error> for ChatError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ChatError::Provider("request timed out".to_string())
        } else {
            ChatError::Provider(err.to_string())
        }
    }
}
