use thiserror::Error;

#[derive(Error, Debug)]
pub enum LeadError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("API key not configured: set the {env_var} environment variable")]
    MissingApiKey { env_var: String },

    #[error("Provider returned HTTP {status}: {message}")]
    ProviderError { status: u16, message: String },

    #[error("Provider returned no text")]
    EmptyResponse,

    #[error("Unexpected response format: {message}")]
    MalformedResponse { message: String },

    #[error("Response is not valid JSON: {message}")]
    ResponseParseError { message: String },

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Configuration validation failed for '{field}': {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for '{field}': {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("No lead named '{name}' in the lead book")]
    LeadNotFound { name: String },

    #[error("No contact named '{contact}' at '{company}'")]
    ContactNotFound { company: String, contact: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Network,
    Provider,
    ResponseFormat,
    Storage,
    Input,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl LeadError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            LeadError::ApiError(_) => ErrorCategory::Network,
            LeadError::IoError(_) | LeadError::SerializationError(_) => ErrorCategory::Storage,
            LeadError::MissingApiKey { .. }
            | LeadError::ConfigError { .. }
            | LeadError::ConfigValidationError { .. }
            | LeadError::InvalidConfigValueError { .. } => ErrorCategory::Configuration,
            LeadError::ProviderError { .. } => ErrorCategory::Provider,
            LeadError::EmptyResponse
            | LeadError::MalformedResponse { .. }
            | LeadError::ResponseParseError { .. } => ErrorCategory::ResponseFormat,
            LeadError::LeadNotFound { .. } | LeadError::ContactNotFound { .. } => {
                ErrorCategory::Input
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input => ErrorSeverity::Low,
            ErrorCategory::Network | ErrorCategory::Provider | ErrorCategory::ResponseFormat => {
                ErrorSeverity::Medium
            }
            ErrorCategory::Configuration => ErrorSeverity::High,
            ErrorCategory::Storage => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            LeadError::MissingApiKey { env_var } => {
                format!("Export {} or set provider.api_key in the config file", env_var)
            }
            LeadError::ApiError(_) => {
                "Check network connectivity and provider.base_url, then try again".to_string()
            }
            LeadError::ProviderError { status, .. } if *status == 401 || *status == 403 => {
                "Verify that the API key is valid and has access to the model".to_string()
            }
            LeadError::ProviderError { status, .. } if *status == 429 => {
                "The provider is rate limiting requests; wait a moment and retry".to_string()
            }
            LeadError::ProviderError { .. } => {
                "Check the model names in the [provider] section and retry".to_string()
            }
            LeadError::EmptyResponse
            | LeadError::MalformedResponse { .. }
            | LeadError::ResponseParseError { .. } => {
                "Model output varies between runs; retry, or narrow the search criteria"
                    .to_string()
            }
            LeadError::IoError(_) => {
                "Check that storage.lead_book points to a readable, writable location".to_string()
            }
            LeadError::SerializationError(_) => {
                "The lead book file is corrupt; run `lead-scout clear` to reset it".to_string()
            }
            LeadError::ConfigError { .. }
            | LeadError::ConfigValidationError { .. }
            | LeadError::InvalidConfigValueError { .. } => {
                "Fix the configuration file or command-line flags; `lead-scout catalog` lists accepted values".to_string()
            }
            LeadError::LeadNotFound { .. } => {
                "Run `lead-scout list` to see the company names in the lead book".to_string()
            }
            LeadError::ContactNotFound { .. } => {
                "Run `lead-scout list` to see the contacts for that company".to_string()
            }
        }
    }

    /// One-line message suitable for showing to the person running the tool.
    pub fn user_friendly_message(&self) -> String {
        match self {
            LeadError::MissingApiKey { env_var } => {
                format!("{} environment variable not set", env_var)
            }
            LeadError::ApiError(_) => {
                "Could not reach the AI service. Check your network connection.".to_string()
            }
            LeadError::ProviderError { status, message } => {
                format!("The AI service rejected the request ({}): {}", status, message)
            }
            LeadError::EmptyResponse => "The AI model returned an empty response.".to_string(),
            LeadError::MalformedResponse { .. } => {
                "The AI model returned data in an unexpected format.".to_string()
            }
            LeadError::ResponseParseError { .. } => {
                "Failed to parse the response from the AI model. It may have returned invalid JSON."
                    .to_string()
            }
            other => other.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, LeadError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_api_key_is_configuration_error() {
        let err = LeadError::MissingApiKey {
            env_var: "API_KEY".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Configuration);
        assert_eq!(err.severity(), ErrorSeverity::High);
        assert_eq!(err.user_friendly_message(), "API_KEY environment variable not set");
        assert!(err.recovery_suggestion().contains("API_KEY"));
    }

    #[test]
    fn test_response_errors_share_friendly_wording() {
        let malformed = LeadError::MalformedResponse {
            message: "no array".to_string(),
        };
        let invalid = LeadError::ResponseParseError {
            message: "EOF".to_string(),
        };
        assert_eq!(malformed.severity(), ErrorSeverity::Medium);
        assert!(malformed.user_friendly_message().contains("unexpected format"));
        assert!(invalid.user_friendly_message().contains("invalid JSON"));
    }

    #[test]
    fn test_rate_limit_suggestion() {
        let err = LeadError::ProviderError {
            status: 429,
            message: "quota".to_string(),
        };
        assert_eq!(err.category(), ErrorCategory::Provider);
        assert!(err.recovery_suggestion().contains("rate limiting"));
    }

    #[test]
    fn test_lookup_errors_are_low_severity() {
        let err = LeadError::LeadNotFound {
            name: "Acme".to_string(),
        };
        assert_eq!(err.severity(), ErrorSeverity::Low);
        assert_eq!(err.user_friendly_message(), "No lead named 'Acme' in the lead book");
    }
}
