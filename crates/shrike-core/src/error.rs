use thiserror::Error;

pub type Result<T> = std::result::Result<T, ShrikeError>;

#[derive(Error, Debug)]
pub enum ShrikeError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Dispatch error: {message}")]
    Dispatch { message: String },

    #[error("Session error: {message}")]
    Session { message: String },

    #[error("Runtime error: {message}")]
    Runtime { message: String },

    #[error("Storage error: {message}")]
    Storage { message: String },
}
