use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReconcileError {
    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Prompt failed: {0}")]
    PromptError(#[from] dialoguer::Error),

    #[error("API request failed with {status} {reason}: {body}")]
    ApiError {
        status: u16,
        reason: String,
        body: String,
    },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Failed to parse {source_name}: {message}")]
    ParseError {
        source_name: String,
        message: String,
    },

    #[error("{kind} '{name}' does not exist in IPAM")]
    NotFoundError { kind: String, name: String },

    #[error("Aborted: {message}")]
    Aborted { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Input,
    Configuration,
    Inventory,
    User,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl ReconcileError {
    pub fn parse(source_name: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParseError {
            source_name: source_name.into(),
            message: message.into(),
        }
    }

    pub fn config(message: impl Into<String>) -> Self {
        Self::ConfigError {
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::HttpError(_) => ErrorCategory::Network,
            Self::ApiError { .. } => ErrorCategory::Api,
            Self::ZipError(_)
            | Self::CsvError(_)
            | Self::IoError(_)
            | Self::SerializationError(_)
            | Self::ParseError { .. } => ErrorCategory::Input,
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => ErrorCategory::Configuration,
            Self::NotFoundError { .. } => ErrorCategory::Inventory,
            Self::PromptError(_) | Self::Aborted { .. } => ErrorCategory::User,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::User => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Api => ErrorSeverity::Medium,
            ErrorCategory::Input | ErrorCategory::Inventory => ErrorSeverity::High,
            ErrorCategory::Configuration => ErrorSeverity::Critical,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::HttpError(e) if e.is_timeout() => "IPAM did not answer in time".to_string(),
            Self::HttpError(e) if e.is_connect() => "Could not connect to the API server".to_string(),
            Self::ApiError { status: 401, .. } | Self::ApiError { status: 403, .. } => {
                "The API rejected the token".to_string()
            }
            Self::ApiError { status, reason, .. } => {
                format!("The API answered {} {}", status, reason)
            }
            Self::ParseError {
                source_name,
                message,
            } => format!("Could not read {}: {}", source_name, message),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::HttpError(_) => "Check the URL and that the server is reachable from this host",
            Self::ApiError { status: 401, .. } | Self::ApiError { status: 403, .. } => {
                "Check that the API token is valid and has write permission when updating"
            }
            Self::ApiError { .. } => "Run again with --verbose to see the request that failed",
            Self::ZipError(_) | Self::CsvError(_) | Self::ParseError { .. } => {
                "Check that the input file is a complete, unmodified export"
            }
            Self::IoError(_) => "Check that the file exists and is readable",
            Self::SerializationError(_) => "The response was not the JSON the tool expected",
            Self::ConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingConfigError { .. } => {
                "Pass the value on the command line or set it in ipam-reconcile.toml"
            }
            Self::NotFoundError { .. } => "Create the object in IPAM first or correct the name",
            Self::PromptError(_) | Self::Aborted { .. } => "Nothing was changed",
        }
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
