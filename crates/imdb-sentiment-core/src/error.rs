//! Error types for IMDB Sentiment

/// Result type alias using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for model loading and inference
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Weights or base model files missing, unreadable, or incompatible
    #[error("load error: {0}")]
    Load(String),

    /// Invalid configuration values
    #[error("configuration error: {0}")]
    Config(String),

    /// Tokenization or forward pass failures
    #[error("inference error: {0}")]
    Inference(String),

    /// Input exceeds the tokenizer window and the overflow policy rejects it
    #[error("input too long: {tokens} tokens exceeds the maximum of {max}")]
    InputTooLong { tokens: usize, max: usize },

    /// Filesystem errors
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Create a new load error
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Create a new configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a new inference error
    pub fn inference(msg: impl Into<String>) -> Self {
        Self::Inference(msg.into())
    }

    /// Short, stable name of the error kind (used as a metrics label)
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Load(_) => "load",
            Self::Config(_) => "config",
            Self::Inference(_) => "inference",
            Self::InputTooLong { .. } => "input_too_long",
            Self::Io(_) => "io",
            Self::Serialization(_) => "serialization",
        }
    }
}
