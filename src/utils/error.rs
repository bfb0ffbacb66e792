use thiserror::Error;

#[derive(Error, Debug)]
pub enum MapperError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Source returned unusable data: {message}")]
    SourceError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Data,
    Storage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl MapperError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            MapperError::ApiError(_) => ErrorCategory::Network,
            MapperError::CsvError(_)
            | MapperError::SerializationError(_)
            | MapperError::SourceError { .. } => ErrorCategory::Data,
            MapperError::IoError(_) => ErrorCategory::Storage,
            MapperError::ConfigValidationError { .. }
            | MapperError::InvalidConfigValueError { .. }
            | MapperError::MissingConfigError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 網路錯誤通常可以重試
            MapperError::ApiError(_) => ErrorSeverity::Medium,
            MapperError::SourceError { .. }
            | MapperError::CsvError(_)
            | MapperError::SerializationError(_) => ErrorSeverity::High,
            MapperError::ConfigValidationError { .. }
            | MapperError::InvalidConfigValueError { .. }
            | MapperError::MissingConfigError { .. } => ErrorSeverity::High,
            MapperError::IoError(_) => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Configuration => {
                "Check the TOML configuration file and the command line overrides"
            }
            ErrorCategory::Network => "Verify the endpoint is reachable and retry",
            ErrorCategory::Data => {
                "Make sure the input is a JSON array of objects or a transform config with `sample_raw`"
            }
            ErrorCategory::Storage => "Check that the paths exist and are writable",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            MapperError::ApiError(e) if e.is_timeout() => {
                "The sample endpoint did not answer in time".to_string()
            }
            MapperError::ApiError(_) => "Could not fetch raw alarm samples".to_string(),
            MapperError::IoError(e) => format!("File access failed: {}", e),
            MapperError::MissingConfigError { field } => {
                format!("Configuration is missing '{}'", field)
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, MapperError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_errors_are_high_severity() {
        let err = MapperError::MissingConfigError {
            field: "source.path".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(
            err.user_friendly_message(),
            "Configuration is missing 'source.path'"
        );
    }

    #[test]
    fn test_io_error_is_critical() {
        let err = MapperError::from(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "denied",
        ));
        assert_eq!(err.category(), ErrorCategory::Storage);
        assert_eq!(err.severity(), ErrorSeverity::Critical);
    }
}
