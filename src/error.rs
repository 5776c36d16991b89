//! Error types
//!
//! Two families:
//! - [`FilterError`]: why a filter could not be designed (construction time only)
//! - [`ConfigError`]: why a filter configuration could not be loaded

use std::fmt;

/// Filter construction error types
///
/// These can only arise while an engine is being built. Once an engine exists,
/// `filter` cannot fail.
#[derive(Debug, Clone, PartialEq)]
pub enum FilterError {
    /// Design family is not one of butter / cheby1 / cheby2
    InvalidDesignFamily(String),
    /// Filter type is not one of lowpass / highpass / bandpass / bandstop
    InvalidFilterType(String),
    /// Sample rate below zero
    NegativeSampleRate(f64),
    /// The coefficient provider refused an otherwise well-formed request
    ProviderRejected(String),
}

impl fmt::Display for FilterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FilterError::InvalidDesignFamily(name) => write!(
                f,
                "Unknown filter design '{}' (expected butter, cheby1 or cheby2)",
                name
            ),
            FilterError::InvalidFilterType(name) => write!(
                f,
                "Unknown filter type '{}' (expected lowpass, highpass, bandpass or bandstop)",
                name
            ),
            FilterError::NegativeSampleRate(fs) => {
                write!(f, "Sampling frequency must not be negative, got {}", fs)
            }
            FilterError::ProviderRejected(msg) => write!(f, "Filter design rejected: {}", msg),
        }
    }
}

impl std::error::Error for FilterError {}

/// Result type for filter design operations
pub type FilterResult<T> = Result<T, FilterError>;

/// Configuration loading error types
#[derive(Debug)]
pub enum ConfigError {
    /// IO error
    IoError(std::io::Error),
    /// Content was neither valid TOML nor valid JSON
    ParseError(String),
    /// A named filter entry failed validation or design
    InvalidFilter { name: String, source: FilterError },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::IoError(e) => write!(f, "IO error: {}", e),
            ConfigError::ParseError(msg) => write!(f, "Config parse error: {}", msg),
            ConfigError::InvalidFilter { name, source } => {
                write!(f, "Filter '{}' is invalid: {}", name, source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::IoError(e) => Some(e),
            ConfigError::InvalidFilter { source, .. } => Some(source),
            ConfigError::ParseError(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(e: std::io::Error) -> Self {
        ConfigError::IoError(e)
    }
}

/// Result type for configuration loading
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_error_display() {
        let e = FilterError::InvalidDesignFamily("ellip".to_string());
        assert!(e.to_string().contains("'ellip'"));

        let e = FilterError::NegativeSampleRate(-1000.0);
        assert_eq!(
            e.to_string(),
            "Sampling frequency must not be negative, got -1000"
        );
    }

    #[test]
    fn test_config_error_source_chain() {
        let e = ConfigError::InvalidFilter {
            name: "mains".to_string(),
            source: FilterError::InvalidFilterType("notch".to_string()),
        };
        let source = std::error::Error::source(&e).map(|s| s.to_string());
        assert_eq!(
            source.as_deref(),
            Some("Unknown filter type 'notch' (expected lowpass, highpass, bandpass or bandstop)")
        );
    }

    #[test]
    fn test_io_error_conversion() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "missing");
        let e: ConfigError = io.into();
        assert!(matches!(e, ConfigError::IoError(_)));
    }
}
