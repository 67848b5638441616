//! Configuration error types.

use std::fmt;

/// Error type for configuration loading.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// Failed to parse an argument or environment variable.
    Parse {
        key: String,
        value: String,
        error: String,
    },
    /// Missing required argument or environment variable.
    Missing { key: String },
    /// Invalid value for an argument or environment variable.
    Invalid { key: String, message: String },
}

impl ConfigError {
    /// Returns true for errors caused by the command line rather than the
    /// environment.
    pub fn is_usage(&self) -> bool {
        let key = match self {
            ConfigError::Parse { key, .. } => key,
            ConfigError::Missing { key } => key,
            ConfigError::Invalid { key, .. } => key,
        };
        key.starts_with('<')
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse { key, value, error } => {
                write!(f, "failed to parse {}='{}': {}", key, value, error)
            }
            ConfigError::Missing { key } => {
                write!(f, "missing required argument: {}", key)
            }
            ConfigError::Invalid { key, message } => {
                write!(f, "invalid value for {}: {}", key, message)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usage_errors_are_argument_errors() {
        let err = ConfigError::Missing {
            key: "<workers>".into(),
        };
        assert!(err.is_usage());
        assert_eq!(err.to_string(), "missing required argument: <workers>");

        let err = ConfigError::Invalid {
            key: "JOB_UNIT".into(),
            message: "unit cannot be zero".into(),
        };
        assert!(!err.is_usage());
    }
}
