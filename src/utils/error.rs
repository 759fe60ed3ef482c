use thiserror::Error;

#[derive(Error, Debug)]
pub enum EtlError {
    #[error("HTTP request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[cfg(feature = "chrome")]
    #[error("Browser error: {0}")]
    BrowserError(#[from] chromiumoxide::error::CdpError),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Configuration validation failed for {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Renderer error: {message}")]
    RendererError { message: String },

    #[error("Failed to persist puzzle store '{path}': {source}")]
    StoreSaveError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Browser,
    Storage,
    Configuration,
    Data,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl EtlError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            EtlError::ApiError(_) => ErrorCategory::Network,
            #[cfg(feature = "chrome")]
            EtlError::BrowserError(_) => ErrorCategory::Browser,
            EtlError::RendererError { .. } => ErrorCategory::Browser,
            EtlError::IoError(_) | EtlError::StoreSaveError { .. } => ErrorCategory::Storage,
            EtlError::SerializationError(_) => ErrorCategory::Data,
            EtlError::ConfigError { .. }
            | EtlError::MissingConfigError { .. }
            | EtlError::InvalidConfigValueError { .. }
            | EtlError::ConfigValidationError { .. } => ErrorCategory::Configuration,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            // 單日抓取失敗可重試
            ErrorCategory::Network | ErrorCategory::Browser => ErrorSeverity::Medium,
            ErrorCategory::Configuration | ErrorCategory::Data => ErrorSeverity::High,
            // 無法寫入代表進度不再持久
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check your network connection and the source URL, then re-run",
            ErrorCategory::Browser => {
                "Make sure Chrome/Chromium is installed, or pass --chrome-executable"
            }
            ErrorCategory::Storage => {
                "Check that the output path is writable and the disk is not full"
            }
            ErrorCategory::Configuration => {
                "Review the command line flags and the TOML config file"
            }
            ErrorCategory::Data => "Inspect the puzzle file; it may have been edited by hand",
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            EtlError::MissingConfigError { field } => {
                format!("Missing setting '{}'", field)
            }
            EtlError::InvalidConfigValueError { field, reason, .. } => {
                format!("Setting '{}' is invalid: {}", field, reason)
            }
            EtlError::StoreSaveError { path, .. } => {
                format!("Could not save puzzles to '{}'", path)
            }
            EtlError::RendererError { message } => format!("Browser problem: {}", message),
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, EtlError>;
