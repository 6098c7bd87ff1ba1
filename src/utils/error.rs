use thiserror::Error;

#[derive(Error, Debug)]
pub enum DmpError {
    #[error("HTTP transport failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Authentication against {service} failed: {message}")]
    Auth { service: String, message: String },

    #[error("No data for id: {id} was found in {service}")]
    NotFound { service: String, id: String },

    #[error("Required field '{field}' is missing from the grant record")]
    MissingField { field: String },

    #[error("Operation aborted by the operator")]
    UserAbort,

    #[error("Request to {service} failed: {message}")]
    Request { service: String, message: String },

    #[error("Unknown funder acronym '{acronym}'")]
    UnknownFunder { acronym: String },

    #[error("Unknown language '{code}'")]
    UnknownLanguage { code: String },

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfig { field: String },

    #[error("Invalid configuration value for {field}: '{value}' ({reason})")]
    InvalidConfigValue {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Network,
    Remote,
    Data,
    Operator,
    Configuration,
    System,
}

impl DmpError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DmpError::Transport(_) => ErrorCategory::Network,
            DmpError::Auth { .. } | DmpError::NotFound { .. } | DmpError::Request { .. } => {
                ErrorCategory::Remote
            }
            DmpError::MissingField { .. } | DmpError::Serialization(_) => ErrorCategory::Data,
            DmpError::UserAbort => ErrorCategory::Operator,
            DmpError::UnknownFunder { .. }
            | DmpError::UnknownLanguage { .. }
            | DmpError::MissingConfig { .. }
            | DmpError::InvalidConfigValue { .. } => ErrorCategory::Configuration,
            DmpError::Io(_) => ErrorCategory::System,
        }
    }

    pub fn is_user_abort(&self) -> bool {
        matches!(self, DmpError::UserAbort)
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            DmpError::Transport(e) => format!("Could not reach the remote service: {}", e),
            DmpError::Auth { .. } => "Authentication request failed! Exiting.".to_string(),
            DmpError::NotFound { service, id } => {
                format!("No data for id: {} was found in {}!", id, service)
            }
            DmpError::MissingField { field } => {
                format!("The grant record has no '{}' field, cannot build a DMP", field)
            }
            DmpError::UserAbort => "OK. Will exit then.".to_string(),
            DmpError::Request { service, message } => format!("Failed! {}: {}", service, message),
            DmpError::UnknownFunder { .. } => format!(
                "Invalid Funder. Allowed values are: {}. Exiting.",
                crate::domain::funder::Funder::ACRONYMS.join(", ")
            ),
            DmpError::UnknownLanguage { code } => {
                format!("Unsupported language '{}', use eng or swe", code)
            }
            DmpError::Io(e) => format!("File system error: {}", e),
            DmpError::Serialization(e) => format!("Could not handle JSON: {}", e),
            DmpError::MissingConfig { field } => {
                format!("{} is not set in the environment", field)
            }
            DmpError::InvalidConfigValue { field, reason, .. } => {
                format!("{} is invalid: {}", field, reason)
            }
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self.category() {
            ErrorCategory::Network => "Check network connectivity and the configured API URLs",
            ErrorCategory::Remote => match self {
                DmpError::Auth { .. } => {
                    "Check DMPONLINE_USER and DMPONLINE_AUTH_CODE against the platform account"
                }
                DmpError::NotFound { .. } => "Check the grant id and funder acronym",
                _ => "Inspect the response body above and the requested identifier",
            },
            ErrorCategory::Data => "The source record is incomplete; fill it in by hand",
            ErrorCategory::Operator => "Run the command again when ready",
            ErrorCategory::Configuration => "Fix the command line flags or environment settings",
            ErrorCategory::System => "Check permissions of the output directory and log file",
        }
    }
}

pub type Result<T> = std::result::Result<T, DmpError>;
