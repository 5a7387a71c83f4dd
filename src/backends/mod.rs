//! Model backends

pub mod hub;
#[cfg(feature = "candle")]
pub mod marian;

use std::sync::Arc;

use crate::core::config::TranslatorConfig;
use crate::core::errors::Result;
use crate::core::provider::ModelProvider;

/// Provider used by the server and CLI
#[cfg(feature = "candle")]
pub fn default_provider(config: &TranslatorConfig) -> Result<Arc<dyn ModelProvider>> {
    let provider: Arc<dyn ModelProvider> = Arc::new(marian::MarianProvider::new(config)?);
    Ok(provider)
}

/// Provider used by the server and CLI
#[cfg(not(feature = "candle"))]
pub fn default_provider(_config: &TranslatorConfig) -> Result<Arc<dyn ModelProvider>> {
    tracing::warn!("Built without the `candle` feature, models cannot be loaded");
    let provider: Arc<dyn ModelProvider> = Arc::new(unavailable::UnavailableProvider);
    Ok(provider)
}

#[cfg(not(feature = "candle"))]
mod unavailable {
    use async_trait::async_trait;

    use crate::core::errors::{Result, TranslationError};
    use crate::core::provider::{ModelHandle, ModelProvider};

    /// Fails every load with an explanation
    pub struct UnavailableProvider;

    #[async_trait]
    impl ModelProvider for UnavailableProvider {
        async fn load(&self, model_id: &str) -> Result<ModelHandle> {
            Err(TranslationError::ModelLoad {
                model_id: model_id.to_string(),
                message: "this build has no model runtime (enable the `candle` feature)".to_string(),
            })
        }
    }
}
