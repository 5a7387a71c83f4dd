//! Chunked translation pipeline

use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::core::cache::ModelCache;
use crate::core::chunker::SentenceChunker;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::models::{LoadedModel, TranslationRequest, TranslationResult};
use crate::core::provider::{ModelProvider, TranslationModel};

/// Validates requests, resolves models through the cache and translates chunk by chunk
#[derive(Clone)]
pub struct Translator {
    cache: ModelCache,
    chunker: SentenceChunker,
}

impl Translator {
    /// Create a translator around an existing cache
    pub fn new(cache: ModelCache, chunker: SentenceChunker) -> Self {
        Self { cache, chunker }
    }

    /// Create from configuration and a model provider
    pub fn from_config(config: &TranslatorConfig, provider: Arc<dyn ModelProvider>) -> Self {
        let cache = ModelCache::new(provider, config.model_repo_template.clone());
        Self::new(cache, SentenceChunker::new(config.chunk_size))
    }

    /// Translate a single request
    pub async fn translate(&self, request: &TranslationRequest) -> Result<TranslationResult> {
        let pair = request.pair();
        if pair.source.is_empty() || pair.target.is_empty() {
            return Err(TranslationError::MissingLanguage);
        }

        // Same language: nothing to do, and no reason to load a model
        if pair.is_identity() {
            debug!("Same-language request for {}, returning input", pair.source);
            return Ok(TranslationResult {
                translation: request.text.clone(),
                model_used: None,
                chunks: 0,
            });
        }

        if request.text.trim().is_empty() {
            return Err(TranslationError::EmptyText);
        }

        let model = self.cache.get_or_load(&pair).await?;
        let chunks = self.chunker.chunk(&request.text);
        let chunk_count = chunks.len();
        let model_used = model.model_id().to_string();

        debug!("Translating {} chunk(s) with {}", chunk_count, model_used);
        let started = Instant::now();
        // Inference is CPU-bound and blocking
        let translation =
            tokio::task::spawn_blocking(move || translate_chunks(model.as_ref(), &chunks)).await??;
        info!(
            "Translated {} chunk(s) {} in {:?}",
            chunk_count,
            pair,
            started.elapsed()
        );

        Ok(TranslationResult {
            translation,
            model_used: Some(model_used),
            chunks: chunk_count,
        })
    }

    /// Models loaded so far
    pub async fn loaded_models(&self) -> Vec<LoadedModel> {
        self.cache.loaded().await
    }

    /// Underlying model cache
    pub fn cache(&self) -> &ModelCache {
        &self.cache
    }
}

/// Translate chunks in order and join them with single spaces.
///
/// The first failing chunk aborts the whole run.
pub fn translate_chunks(model: &dyn TranslationModel, chunks: &[String]) -> Result<String> {
    let mut translated = Vec::with_capacity(chunks.len());
    for (index, chunk) in chunks.iter().enumerate() {
        let text = translate_chunk(model, chunk).map_err(|e| TranslationError::Translation {
            chunk: index,
            source: Box::new(e),
        })?;
        translated.push(text);
    }
    Ok(translated.join(" "))
}

fn translate_chunk(model: &dyn TranslationModel, chunk: &str) -> Result<String> {
    let input_ids = model.encode(chunk)?;
    let outputs = model.generate(&input_ids)?;
    let best = outputs
        .first()
        .ok_or_else(|| TranslationError::inference("model produced no output sequence"))?;
    model.decode(best)
}
