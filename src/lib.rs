//! Marian Translate - OPUS-MT translation service
//!
//! This library validates translation requests, caches one model per
//! language pair, and translates long input in sentence chunks. It ships an
//! HTTP API and a small CLI.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod backends;
pub mod cli;
pub mod core;
pub mod server;

// Re-export key types for convenience
pub use crate::core::{
    cache::ModelCache,
    chunker::{split_sentences, SentenceChunker},
    config::TranslatorConfig,
    errors::TranslationError,
    models::{LanguagePair, TranslationRequest, TranslationResult},
    provider::{ModelHandle, ModelProvider, TranslationModel},
    translator::Translator,
};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
