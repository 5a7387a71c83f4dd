//! Language-pair model cache

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{OnceCell, RwLock};
use tracing::{debug, info, warn};

use crate::core::errors::{Result, TranslationError};
use crate::core::models::{LanguagePair, LoadedModel};
use crate::core::provider::{ModelHandle, ModelProvider};

/// One cached model, initialised at most once
type Slot = Arc<OnceCell<ModelHandle>>;

/// Lazily loads one model per language pair and keeps it for the process lifetime
#[derive(Clone)]
pub struct ModelCache {
    provider: Arc<dyn ModelProvider>,
    model_id_template: Arc<str>,
    slots: Arc<RwLock<HashMap<LanguagePair, Slot>>>,
}

impl ModelCache {
    /// Create an empty cache
    pub fn new(provider: Arc<dyn ModelProvider>, model_id_template: impl Into<String>) -> Self {
        Self {
            provider,
            model_id_template: Arc::from(model_id_template.into()),
            slots: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Model identifier the provider is asked for
    pub fn model_id(&self, pair: &LanguagePair) -> String {
        pair.model_id(&self.model_id_template)
    }

    /// Return the cached model for `pair`, loading it on first use.
    ///
    /// Concurrent first requests for one pair share a single load. A failed
    /// load leaves the slot empty, so the next caller (a waiter included)
    /// asks the provider again and fills the same slot.
    pub async fn get_or_load(&self, pair: &LanguagePair) -> Result<ModelHandle> {
        let slot = self.slot(pair).await;
        if let Some(handle) = slot.get() {
            debug!("Model cache hit for {}", pair);
            return Ok(handle.clone());
        }

        let model_id = self.model_id(pair);
        let result = slot
            .get_or_try_init(|| async {
                info!("Loading model {} for {}", model_id, pair);
                let started = Instant::now();
                let handle = self.provider.load(&model_id).await?;
                info!("Loaded model {} in {:?}", model_id, started.elapsed());
                Ok::<_, TranslationError>(handle)
            })
            .await;

        match result {
            Ok(handle) => Ok(handle.clone()),
            Err(e) => {
                warn!("Failed to load model {}: {}", model_id, e);
                Err(match e {
                    e @ TranslationError::ModelLoad { .. } => e,
                    other => TranslationError::ModelLoad {
                        model_id,
                        message: other.to_string(),
                    },
                })
            }
        }
    }

    /// Whether a loaded model is cached for `pair`
    pub async fn contains(&self, pair: &LanguagePair) -> bool {
        let slots = self.slots.read().await;
        slots.get(pair).is_some_and(|slot| slot.initialized())
    }

    /// All loaded models, ordered by pair
    pub async fn loaded(&self) -> Vec<LoadedModel> {
        let slots = self.slots.read().await;
        let mut models: Vec<LoadedModel> = slots
            .iter()
            .filter_map(|(pair, slot)| {
                slot.get().map(|handle| LoadedModel {
                    id: handle.model_id().to_string(),
                    pair: pair.clone(),
                })
            })
            .collect();
        models.sort_by(|a, b| a.pair.cmp(&b.pair));
        models
    }

    async fn slot(&self, pair: &LanguagePair) -> Slot {
        {
            let slots = self.slots.read().await;
            if let Some(slot) = slots.get(pair) {
                return slot.clone();
            }
        }

        let mut slots = self.slots.write().await;
        slots.entry(pair.clone()).or_default().clone()
    }
}
