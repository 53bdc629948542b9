//! Error types for `docgate-core`.
//!
//! The admission path itself is infallible (every check either admits or
//! rejects), so the only failures surfaced here happen at construction time.

/// Unified error type for core operations.
#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    /// A limiter setting is out of range or inconsistent with another one.
    #[error("invalid limiter config: {0}")]
    InvalidConfig(String),
}

/// Convenience alias used throughout `docgate-core`.
pub type CoreResult<T> = Result<T, CoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_config_displays_message() {
        let err = CoreError::InvalidConfig("refill interval must be non-zero".to_string());
        assert_eq!(
            err.to_string(),
            "invalid limiter config: refill interval must be non-zero"
        );
    }

    #[test]
    fn core_result_err() {
        let result: CoreResult<()> = Err(CoreError::InvalidConfig("x".to_string()));
        assert!(result.is_err());
    }

    #[test]
    fn error_is_debug() {
        let err = CoreError::InvalidConfig("x".to_string());
        assert!(format!("{:?}", err).contains("InvalidConfig"));
    }
}
