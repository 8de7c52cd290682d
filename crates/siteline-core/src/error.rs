use thiserror::Error;

/// Top-level error type for the Siteline system.
///
/// Subsystem crates define their own error types and implement
/// `From<SubsystemError> for SitelineError` so that `?` works across crate
/// boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum SitelineError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Notification error: {0}")]
    Notification(String),

    #[error("Completion provider error: {0}")]
    Provider(String),

    #[error("API error: {0}")]
    Api(String),
}

impl From<toml::de::Error> for SitelineError {
    fn from(err: toml::de::Error) -> Self {
        SitelineError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for SitelineError {
    fn from(err: toml::ser::Error) -> Self {
        SitelineError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for SitelineError {
    fn from(err: serde_json::Error) -> Self {
        SitelineError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for Siteline operations.
pub type Result<T> = std::result::Result<T, SitelineError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display_all_variants() {
        let cases: Vec<(SitelineError, &str)> = vec![
            (
                SitelineError::Config("bad key".to_string()),
                "Configuration error: bad key",
            ),
            (
                SitelineError::Storage("disk full".to_string()),
                "Storage error: disk full",
            ),
            (
                SitelineError::Serialization("invalid json".to_string()),
                "Serialization error: invalid json",
            ),
            (
                SitelineError::Notification("smtp refused".to_string()),
                "Notification error: smtp refused",
            ),
            (
                SitelineError::Provider("no api key".to_string()),
                "Completion provider error: no api key",
            ),
            (
                SitelineError::Api("bind failed".to_string()),
                "API error: bind failed",
            ),
        ];

        for (error, expected) in cases {
            assert_eq!(error.to_string(), expected);
        }
    }

    #[test]
    fn test_io_error_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: SitelineError = io_err.into();
        match &err {
            SitelineError::Io(e) => assert_eq!(e.kind(), std::io::ErrorKind::NotFound),
            _ => panic!("Expected Io variant"),
        }
        assert!(err.to_string().contains("file not found"));
    }

    #[test]
    fn test_toml_error_maps_to_config() {
        let toml_err = toml::from_str::<toml::Value>("not = [valid").unwrap_err();
        let err: SitelineError = toml_err.into();
        assert!(matches!(err, SitelineError::Config(_)));
    }

    #[test]
    fn test_json_error_maps_to_serialization() {
        let json_err = serde_json::from_str::<serde_json::Value>("{oops").unwrap_err();
        let err: SitelineError = json_err.into();
        assert!(matches!(err, SitelineError::Serialization(_)));
    }
}
