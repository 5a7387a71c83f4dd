//! In-memory provider and model used by unit tests

use async_trait::async_trait;
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::core::errors::{Result, TranslationError};
use crate::core::provider::{ModelHandle, ModelProvider, TranslationModel};

/// "Translates" by upper-casing, and remembers every chunk it was given.
pub(crate) struct UppercaseModel {
    model_id: String,
    seen: Arc<Mutex<Vec<String>>>,
    fail_marker: Option<String>,
}

impl TranslationModel for UppercaseModel {
    fn model_id(&self) -> &str {
        &self.model_id
    }

    fn encode(&self, text: &str) -> Result<Vec<u32>> {
        self.seen.lock().unwrap().push(text.to_string());
        Ok(text.chars().map(u32::from).collect())
    }

    fn generate(&self, input_ids: &[u32]) -> Result<Vec<Vec<u32>>> {
        let text: String = input_ids.iter().filter_map(|&id| char::from_u32(id)).collect();
        if let Some(marker) = &self.fail_marker {
            if text.contains(marker.as_str()) {
                return Err(TranslationError::inference("generation blew up"));
            }
        }
        let best = text.to_uppercase().chars().map(u32::from).collect();
        // a worse candidate that must never be picked
        Ok(vec![best, vec![u32::from('?')]])
    }

    fn decode(&self, output_ids: &[u32]) -> Result<String> {
        Ok(output_ids.iter().filter_map(|&id| char::from_u32(id)).collect())
    }
}

/// Provider counting its loads, with configurable failures and latency.
pub(crate) struct FakeProvider {
    loads: AtomicUsize,
    fail_first: usize,
    failing: HashSet<String>,
    io_failing: HashSet<String>,
    delay: Option<Duration>,
    fail_marker: Option<String>,
    seen: Arc<Mutex<Vec<String>>>,
}

impl FakeProvider {
    pub(crate) fn new() -> Self {
        Self {
            loads: AtomicUsize::new(0),
            fail_first: 0,
            failing: HashSet::new(),
            io_failing: HashSet::new(),
            delay: None,
            fail_marker: None,
            seen: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub(crate) fn failing_for(mut self, model_id: &str) -> Self {
        self.failing.insert(model_id.to_string());
        self
    }

    /// The first `count` loads fail, whatever the model
    pub(crate) fn failing_first(mut self, count: usize) -> Self {
        self.fail_first = count;
        self
    }

    pub(crate) fn failing_with_io(mut self, model_id: &str) -> Self {
        self.io_failing.insert(model_id.to_string());
        self
    }

    pub(crate) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Models fail to generate for any chunk containing `marker`
    pub(crate) fn with_fail_marker(mut self, marker: &str) -> Self {
        self.fail_marker = Some(marker.to_string());
        self
    }

    pub(crate) fn load_count(&self) -> usize {
        self.loads.load(Ordering::SeqCst)
    }

    pub(crate) fn seen_chunks(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl ModelProvider for FakeProvider {
    async fn load(&self, model_id: &str) -> Result<ModelHandle> {
        let attempt = self.loads.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }

        if attempt < self.fail_first || self.failing.contains(model_id) {
            return Err(TranslationError::ModelLoad {
                model_id: model_id.to_string(),
                message: "repository not found".to_string(),
            });
        }
        if self.io_failing.contains(model_id) {
            return Err(std::io::Error::new(std::io::ErrorKind::Other, "disk unplugged").into());
        }

        let model: ModelHandle = Arc::new(UppercaseModel {
            model_id: model_id.to_string(),
            seen: self.seen.clone(),
            fail_marker: self.fail_marker.clone(),
        });
        Ok(model)
    }
}
