//! Model provider and model handle abstractions

use async_trait::async_trait;
use std::sync::Arc;

use crate::core::errors::Result;

/// A loaded translation model for one language pair.
///
/// Implementations must be safe to share between requests; anything that
/// mutates internal state during inference has to be serialized inside.
pub trait TranslationModel: Send + Sync {
    /// Identifier the model was loaded from
    fn model_id(&self) -> &str;

    /// Tokenize text into model input ids
    fn encode(&self, text: &str) -> Result<Vec<u32>>;

    /// Generate output token sequences, best first
    fn generate(&self, input_ids: &[u32]) -> Result<Vec<Vec<u32>>>;

    /// Turn output ids back into text, special tokens stripped
    fn decode(&self, output_ids: &[u32]) -> Result<String>;
}

/// Shared handle to a loaded model
pub type ModelHandle = Arc<dyn TranslationModel>;

/// Source of model handles, e.g. a model hub or a local directory
#[async_trait]
pub trait ModelProvider: Send + Sync {
    /// Load the model named by `model_id`.
    ///
    /// Errors should be `TranslationError::ModelLoad`; other kinds are
    /// wrapped by the cache.
    async fn load(&self, model_id: &str) -> Result<ModelHandle>;
}
