use thiserror::Error;

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum Failure {
    #[error("{message}")]
    Transport { message: String },

    #[error("HTTP {code}")]
    HttpStatus { code: u16 },

    #[error("{message}")]
    Validation { message: String },

    #[error("{resource} '{id}' not found")]
    NotFound { resource: String, id: String },
}

impl Failure {
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found(resource: &str, id: &str) -> Self {
        Self::NotFound {
            resource: resource.to_string(),
            id: id.to_string(),
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Transport { .. } => "transport",
            Self::HttpStatus { .. } => "http_status",
            Self::Validation { .. } => "validation",
            Self::NotFound { .. } => "not_found",
        }
    }
}

impl From<reqwest::Error> for Failure {
    fn from(e: reqwest::Error) -> Self {
        Self::transport(e.to_string())
    }
}

impl From<serde_json::Error> for Failure {
    fn from(e: serde_json::Error) -> Self {
        Self::transport(format!("invalid JSON response: {e}"))
    }
}

pub type Result<T> = std::result::Result<T, Failure>;
