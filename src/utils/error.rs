use thiserror::Error;

#[derive(Error, Debug)]
pub enum InfosearchError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned status {status}: {message}")]
    ApiStatusError { status: u16, message: String },

    #[error("Rate limit exceeded (429): {message}")]
    RateLimitedError { message: String },

    #[error("Malformed API response: {message}")]
    MalformedResponseError { message: String },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration error in '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing API key in '{path}': {message}")]
    MissingApiKeyError { path: String, message: String },

    #[error("Input error: {message}")]
    InputError { message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Api,
    Configuration,
    Input,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl InfosearchError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::ApiError(_) => ErrorCategory::Network,
            Self::ApiStatusError { .. }
            | Self::RateLimitedError { .. }
            | Self::MalformedResponseError { .. } => ErrorCategory::Api,
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::MissingApiKeyError { .. } => ErrorCategory::Configuration,
            Self::InputError { .. } => ErrorCategory::Input,
            Self::IoError(_) | Self::SerializationError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        if self.is_retryable() {
            return ErrorSeverity::Medium;
        }
        match self.category() {
            ErrorCategory::System => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Whether another attempt of the same request may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::ApiError(e) => e.is_timeout() || e.is_connect() || e.is_request(),
            Self::RateLimitedError { .. } => true,
            Self::ApiStatusError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    pub fn is_rate_limited(&self) -> bool {
        matches!(self, Self::RateLimitedError { .. })
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            Self::ApiError(_) => "Could not reach the generative AI service".to_string(),
            Self::ApiStatusError { status, .. } => {
                format!("The generative AI service rejected the request (HTTP {})", status)
            }
            Self::RateLimitedError { .. } => {
                "The generative AI service is rate limiting requests".to_string()
            }
            Self::MalformedResponseError { .. } => {
                "The generative AI service returned an unexpected reply".to_string()
            }
            Self::MissingApiKeyError { path, .. } => {
                format!("No usable GEMINI_API_KEY found in '{}'", path)
            }
            Self::InputError { message } => format!("Cannot use the input file: {}", message),
            other => other.to_string(),
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            Self::ApiError(_) => "Check your network connection and try again".to_string(),
            Self::RateLimitedError { .. } => {
                "Lower --batch-size or raise --batch-pause-secs and re-run".to_string()
            }
            Self::ApiStatusError { status, .. } if *status >= 500 => {
                "The service is having trouble; try again later".to_string()
            }
            Self::ApiStatusError { .. } => {
                "Verify the API key and the model name (--model)".to_string()
            }
            Self::MalformedResponseError { .. } => {
                "Try a different model or re-run for the affected companies".to_string()
            }
            Self::MissingApiKeyError { path, .. } => {
                format!("Add a line 'GEMINI_API_KEY=<your key>' to '{}' and re-run", path)
            }
            Self::ConfigError { .. }
            | Self::ConfigValidationError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Fix the configuration value (see --help) and re-run".to_string()
            }
            Self::InputError { .. } => {
                "Pass an existing text file with --file (see --help for the format)".to_string()
            }
            Self::IoError(_) | Self::SerializationError(_) => {
                "Check file permissions and free disk space".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, InfosearchError>;
