//! Custom error types for translation operations

use thiserror::Error;

/// Translation-related errors
#[derive(Error, Debug)]
pub enum TranslationError {
    /// Source or target language missing from the request
    #[error("Source or target language not provided")]
    MissingLanguage,

    /// Nothing left to translate once whitespace is trimmed
    #[error("No text provided")]
    EmptyText,

    /// Request body could not be parsed
    #[error("Invalid request: {message}")]
    InvalidRequest {
        /// Parser message
        message: String,
    },

    /// Model artifacts could not be fetched or deserialized
    #[error("Failed to load model {model_id}: {message}")]
    ModelLoad {
        /// Model that failed to load
        model_id: String,
        /// Cause reported by the provider
        message: String,
    },

    /// Tokenize, generate or decode failed inside a model
    #[error("Model inference failed: {message}")]
    Inference {
        /// Backend message
        message: String,
    },

    /// A chunk failed; the whole request is abandoned
    #[error("Translation failed at chunk {chunk}: {source}")]
    Translation {
        /// Zero-based index of the failing chunk
        chunk: usize,
        /// What went wrong in that chunk
        #[source]
        source: Box<TranslationError>,
    },

    /// Unexpected failure, e.g. a panicked worker
    #[error("Internal error: {0}")]
    InternalError(String),

    /// IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Reqwest error
    #[error("HTTP client error: {0}")]
    HttpError(#[from] reqwest::Error),
}

impl TranslationError {
    /// Errors caused by the caller rather than the service.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            TranslationError::MissingLanguage
                | TranslationError::EmptyText
                | TranslationError::InvalidRequest { .. }
        )
    }

    /// Shorthand for inference failures raised by model backends.
    pub fn inference(message: impl Into<String>) -> Self {
        TranslationError::Inference {
            message: message.into(),
        }
    }
}

impl From<tokio::task::JoinError> for TranslationError {
    fn from(err: tokio::task::JoinError) -> Self {
        TranslationError::InternalError(format!("blocking task failed: {}", err))
    }
}

/// Result type for translation operations
pub type Result<T> = std::result::Result<T, TranslationError>;
