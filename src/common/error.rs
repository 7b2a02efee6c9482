use thiserror::Error;

#[derive(Error, Debug)]
pub enum StageError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON deserialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Environment variable error: {0}")]
    Env(#[from] std::env::VarError),
}

impl StageError {
    pub fn validation(message: impl Into<String>) -> Self {
        StageError::Validation(message.into())
    }

    /// HTTP status carried by the error, when the backend produced one
    pub fn status(&self) -> Option<u16> {
        match self {
            StageError::Api { status, .. } => Some(*status),
            StageError::Http(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StageError>;
