use ruledesk_core::errors::RuleError;
use ruledesk_core::lifecycle::Action;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ClientError>;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// The edit buffer failed local validation; nothing was sent
    #[error("Validation failed: {message}")]
    Validation { message: String },

    /// The server could not be reached or answered with garbage
    #[error("Network error: {message}")]
    Network { message: String },

    /// The server answered with an error body
    #[error("Rejected by server ({status} {code}): {message}")]
    Rejected {
        status: u16,
        code: String,
        message: String,
    },

    /// The action is disabled in the current editor state
    #[error("Action not permitted: {}", action.as_str())]
    NotPermitted { action: Action },
}

impl ClientError {
    /// Stable `ERR_*` code, when the server supplied one
    pub fn code(&self) -> Option<&str> {
        match self {
            ClientError::Rejected { code, .. } => Some(code),
            _ => None,
        }
    }
}

impl From<RuleError> for ClientError {
    fn from(err: RuleError) -> Self {
        ClientError::Validation {
            message: err.to_string(),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        ClientError::Network {
            message: err.to_string(),
        }
    }
}
