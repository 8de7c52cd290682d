//! Error types for notification delivery.

use siteline_core::error::SitelineError;

/// Errors raised while building or delivering an email.
#[derive(Debug, thiserror::Error)]
pub enum NotifyError {
    #[error("email is not configured: {0}")]
    NotConfigured(String),
    #[error("invalid address '{address}': {reason}")]
    InvalidAddress { address: String, reason: String },
    #[error("failed to build message: {0}")]
    Build(String),
    #[error("template error: {0}")]
    Template(String),
    #[error("transport error: {0}")]
    Transport(String),
    #[error("delivery timed out after {0} seconds")]
    Timeout(u64),
}

impl From<minijinja::Error> for NotifyError {
    fn from(err: minijinja::Error) -> Self {
        NotifyError::Template(err.to_string())
    }
}

impl From<NotifyError> for SitelineError {
    fn from(err: NotifyError) -> Self {
        SitelineError::Notification(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_notify_error_display() {
        let err = NotifyError::NotConfigured("no recipients".to_string());
        assert_eq!(err.to_string(), "email is not configured: no recipients");

        let err = NotifyError::InvalidAddress {
            address: "nope".to_string(),
            reason: "missing @".to_string(),
        };
        assert_eq!(err.to_string(), "invalid address 'nope': missing @");

        let err = NotifyError::Timeout(8);
        assert_eq!(err.to_string(), "delivery timed out after 8 seconds");
    }

    #[test]
    fn test_notify_error_into_siteline_error() {
        let err: SitelineError = NotifyError::Transport("connection refused".to_string()).into();
        assert!(matches!(err, SitelineError::Notification(_)));
        assert!(err.to_string().contains("connection refused"));
    }
}
