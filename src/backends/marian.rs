//! Marian (OPUS-MT) models running on candle

use async_trait::async_trait;
use candle_core::{DType, Device, IndexOp, Tensor, D};
use candle_nn::VarBuilder;
use candle_transformers::models::marian::{Config as MarianConfig, MTModel};
use std::path::Path;
use std::sync::{Arc, Mutex};
use tokenizers::Tokenizer;
use tracing::{debug, info};

use crate::backends::hub::HubClient;
use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};
use crate::core::provider::{ModelHandle, ModelProvider, TranslationModel};

const CONFIG_FILE: &str = "config.json";
const WEIGHTS_FILE: &str = "model.safetensors";
const SOURCE_TOKENIZER_FILE: &str = "tokenizer.json";
/// Optional; the source tokenizer is reused when absent
const TARGET_TOKENIZER_FILE: &str = "target_tokenizer.json";

/// A loaded Marian encoder-decoder with its tokenizers.
pub struct MarianModel {
    model_id: String,
    config: MarianConfig,
    device: Device,
    max_new_tokens: usize,
    source_tokenizer: Tokenizer,
    target_tokenizer: Tokenizer,
    // the decoder keeps a KV cache, so one sequence at a time
    model: Mutex<MTModel>,
}

fn load_error(model_id: &str, what: &str, err: impl std::fmt::Display) -> TranslationError {
    TranslationError::ModelLoad {
        model_id: model_id.to_string(),
        message: format!("{}: {}", what, err),
    }
}

impl MarianModel {
    /// Load config, weights and tokenizers from a model directory. Blocking.
    pub fn load(model_id: &str, dir: &Path, max_new_tokens: usize) -> Result<Self> {
        let raw_config = std::fs::read_to_string(dir.join(CONFIG_FILE))
            .map_err(|e| load_error(model_id, "reading config.json", e))?;
        let config: MarianConfig = serde_json::from_str(&raw_config)
            .map_err(|e| load_error(model_id, "parsing config.json", e))?;
        if config.max_position_embeddings == 0 {
            return Err(load_error(
                model_id,
                "invalid config.json",
                "max_position_embeddings must be greater than 0",
            ));
        }

        let device = Device::Cpu;
        let tensors = candle_core::safetensors::load(dir.join(WEIGHTS_FILE), &device)
            .map_err(|e| load_error(model_id, "reading weights", e))?;
        let vb = VarBuilder::from_tensors(tensors, DType::F32, &device);
        let model = MTModel::new(&config, vb)
            .map_err(|e| load_error(model_id, "building model", e))?;

        let source_tokenizer = Tokenizer::from_file(dir.join(SOURCE_TOKENIZER_FILE))
            .map_err(|e| load_error(model_id, "loading tokenizer", e))?;
        let target_path = dir.join(TARGET_TOKENIZER_FILE);
        let target_tokenizer = if target_path.exists() {
            Tokenizer::from_file(target_path)
                .map_err(|e| load_error(model_id, "loading target tokenizer", e))?
        } else {
            source_tokenizer.clone()
        };

        debug!(
            "Marian config for {}: d_model={}, vocab={}, max positions={}",
            model_id, config.d_model, config.vocab_size, config.max_position_embeddings
        );

        Ok(Self {
            model_id: model_id.to_string(),
            config,
            device,
            max_new_tokens,
            source_tokenizer,
            target_tokenizer,
            model: Mutex::new(model),
        })
    }

    fn greedy_decode(&self, model: &mut MTModel, input_ids: &[u32]) -> candle_core::Result<Vec<u32>> {
        let eos = self.config.eos_token_id;
        let pad = self.config.pad_token_id;

        let input = Tensor::new(input_ids, &self.device)?.unsqueeze(0)?;
        let encoder_output = model.encoder().forward(&input, 0)?;

        let mut output = vec![self.config.decoder_start_token_id];
        for step in 0..self.max_new_tokens {
            // with the KV cache only the newest token is fed each step
            let last = output[output.len() - 1];
            let decoder_input = Tensor::new(&[last], &self.device)?.unsqueeze(0)?;
            let logits = model.decode(&decoder_input, &encoder_output, step)?;

            let seq_len = logits.dim(1)?;
            let next = logits
                .i((.., seq_len - 1, ..))?
                .argmax(D::Minus1)?
                .squeeze(0)?
                .to_scalar::<u32>()?;
            if next == eos || next == pad {
                break;
            }
            output.push(next);
        }

        Ok(output.split_off(1))
    }
}

/// Ensure `ids` ends with `eos` and holds at most `limit` tokens, eos included
fn terminate_and_fit(mut ids: Vec<u32>, eos: u32, limit: usize) -> Vec<u32> {
    if ids.last().copied() != Some(eos) {
        ids.push(eos);
    }
    if ids.len() > limit {
        debug!("Truncating {} input tokens to {}", ids.len(), limit);
        ids.truncate(limit.saturating_sub(1));
        if limit > 0 {
            ids.push(eos);
        }
    }
    ids
}

impl TranslationModel for MarianModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        let encoding = self
            .source_tokenizer
            .encode(text, true)
            .map_err(|e| TranslationError::inference(format!("tokenization failed: {}", e)))?;

        Ok(terminate_and_fit(
            encoding.get_ids().to_vec(),
            self.config.eos_token_id,
            self.config.max_position_embeddings,
        ))
    }

    fn generate(&self, input_ids: &[u32]) -> Result<Vec<Vec<u32>>> {
        if input_ids.is_empty() {
            return Ok(vec![Vec::new()]);
        }

        let mut model = self
            .model
            .lock()
            .map_err(|_| TranslationError::inference("model lock poisoned"))?;

        model.reset_kv_cache();
        let result = self.greedy_decode(&mut model, input_ids);
        model.reset_kv_cache();

        let output = result.map_err(|e| TranslationError::inference(format!("generation failed: {}", e)))?;
        Ok(vec![output])
    }

    fn decode(&self, output_ids: &[u32]) -> Result<String> {
        let ids: Vec<u32> = output_ids
            .iter()
            .copied()
            .filter(|&id| id != self.config.eos_token_id && id != self.config.pad_token_id)
            .collect();

        let text = self
            .target_tokenizer
            .decode(&ids, true)
            .map_err(|e| TranslationError::inference(format!("decoding failed: {}", e)))?;
        Ok(text.trim().to_string())
    }
}

/// Provides Marian models, fetching missing files from the hub
pub struct MarianProvider {
    hub: HubClient,
    max_new_tokens: usize,
}

impl MarianProvider {
    /// Create a provider
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        Ok(Self {
            hub: HubClient::new(config)?,
            max_new_tokens: config.max_new_tokens,
        })
    }
}

#[async_trait]
impl ModelProvider for MarianProvider {
    async fn load(&self, model_id: &str) -> Result<ModelHandle> {
        // config first: an unknown pair fails before the large download
        for file in [CONFIG_FILE, SOURCE_TOKENIZER_FILE, WEIGHTS_FILE] {
            self.hub.fetch(model_id, file).await?;
        }
        self.hub.fetch_optional(model_id, TARGET_TOKENIZER_FILE).await?;

        let dir = self.hub.local_dir(model_id);
        let id = model_id.to_string();
        let max_new_tokens = self.max_new_tokens;
        let model =
            tokio::task::spawn_blocking(move || MarianModel::load(&id, &dir, max_new_tokens)).await??;

        info!("Marian model {} ready", model_id);
        let handle: ModelHandle = Arc::new(model);
        Ok(handle)
    }
}
