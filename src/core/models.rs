//! Core data models for translation

use serde::{Deserialize, Serialize};
use std::fmt;

/// Directional source/target language pair, the model cache key
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct LanguagePair {
    /// Source language code, e.g. `en`
    pub source: String,
    /// Target language code
    pub target: String,
}

impl LanguagePair {
    /// Create a pair from two language codes
    pub fn new(source: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
        }
    }

    /// Canonical model identifier for this pair.
    ///
    /// `{src}` and `{tgt}` in the template are replaced with the language
    /// codes, e.g. `Helsinki-NLP/opus-mt-{src}-{tgt}` gives
    /// `Helsinki-NLP/opus-mt-en-fr`.
    pub fn model_id(&self, template: &str) -> String {
        template
            .replace("{src}", &self.source)
            .replace("{tgt}", &self.target)
    }

    /// Source and target are the same language
    pub fn is_identity(&self) -> bool {
        self.source == self.target
    }
}

impl fmt::Display for LanguagePair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.source, self.target)
    }
}

/// Translation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationRequest {
    /// Source language code as sent by the client
    pub source_lang: String,
    /// Target language code as sent by the client
    pub target_lang: String,
    /// Text to translate
    pub text: String,
}

impl TranslationRequest {
    /// Create a request
    pub fn new(
        source_lang: impl Into<String>,
        target_lang: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Self {
            source_lang: source_lang.into(),
            target_lang: target_lang.into(),
            text: text.into(),
        }
    }

    /// Language pair with surrounding whitespace removed from both codes.
    pub fn pair(&self) -> LanguagePair {
        LanguagePair::new(self.source_lang.trim(), self.target_lang.trim())
    }
}

/// Translation result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationResult {
    /// Translated text, chunks joined with single spaces
    pub translation: String,
    /// `None` when no model was needed
    pub model_used: Option<String>,
    /// Number of chunks translated
    pub chunks: usize,
}

/// Loaded model information, as listed by the models endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoadedModel {
    /// Model identifier the provider loaded
    pub id: String,
    /// Pair the model serves
    pub pair: LanguagePair,
}
