//! Configuration management

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Default model naming convention (OPUS-MT on the Hugging Face hub)
pub const DEFAULT_MODEL_REPO_TEMPLATE: &str = "Helsinki-NLP/opus-mt-{src}-{tgt}";

/// Default number of sentences per model call
pub const DEFAULT_CHUNK_SIZE: usize = 10;

/// Languages offered on the index page when none are configured
const DEFAULT_LANGUAGES: &[(&str, &str)] = &[("en", "English"), ("fr", "French")];

/// Configuration for translator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TranslatorConfig {
    /// Server bind address
    pub host: String,
    /// Server port
    pub port: u16,
    /// Maximum sentences per chunk
    pub chunk_size: usize,
    /// Model id template with `{src}` and `{tgt}` placeholders
    pub model_repo_template: String,
    /// Local directory for downloaded model files
    pub model_dir: PathBuf,
    /// Base URL of the model hub
    pub hub_endpoint: String,
    /// Hub revision (branch, tag or commit) to fetch
    pub model_revision: String,
    /// Bearer token for the hub; never written to config files
    #[serde(skip_serializing)]
    pub hf_token: Option<String>,
    /// Generation limit per chunk
    pub max_new_tokens: usize,
    /// Only use files already in `model_dir`
    pub offline: bool,
    /// Per-file download timeout in milliseconds
    pub download_timeout_ms: u64,
    /// Supported languages, code to display name
    pub languages: BTreeMap<String, String>,
}

impl Default for TranslatorConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
            chunk_size: DEFAULT_CHUNK_SIZE,
            model_repo_template: DEFAULT_MODEL_REPO_TEMPLATE.to_string(),
            model_dir: PathBuf::from("models"),
            hub_endpoint: "https://huggingface.co".to_string(),
            model_revision: "main".to_string(),
            hf_token: None,
            max_new_tokens: 512,
            offline: false,
            download_timeout_ms: 300_000,
            languages: default_languages(),
        }
    }
}

fn default_languages() -> BTreeMap<String, String> {
    DEFAULT_LANGUAGES
        .iter()
        .map(|(code, name)| (code.to_string(), name.to_string()))
        .collect()
}

/// Parse a `code:Name,code:Name` language list.
pub fn parse_languages(raw: &str) -> anyhow::Result<BTreeMap<String, String>> {
    let mut languages = BTreeMap::new();
    for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
        let (code, name) = entry
            .split_once(':')
            .ok_or_else(|| anyhow::anyhow!("Invalid language entry '{}', expected code:Name", entry))?;
        let (code, name) = (code.trim(), name.trim());
        if code.is_empty() || name.is_empty() {
            return Err(anyhow::anyhow!("Invalid language entry '{}'", entry));
        }
        languages.insert(code.to_string(), name.to_string());
    }
    Ok(languages)
}

fn parse_flag(raw: &str) -> anyhow::Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" | "" => Ok(false),
        other => Err(anyhow::anyhow!("Invalid boolean value '{}'", other)),
    }
}

impl TranslatorConfig {
    /// Load configuration from environment variables
    pub fn from_env() -> anyhow::Result<Self> {
        let defaults = Self::default();

        let host = std::env::var("HOST").unwrap_or(defaults.host);

        let port = match std::env::var("PORT") {
            Ok(raw) => raw.parse::<u16>()?,
            Err(_) => defaults.port,
        };

        let chunk_size = match std::env::var("CHUNK_SIZE") {
            Ok(raw) => raw.parse::<usize>()?,
            Err(_) => defaults.chunk_size,
        };

        let model_repo_template =
            std::env::var("MODEL_REPO_TEMPLATE").unwrap_or(defaults.model_repo_template);

        let model_dir = std::env::var("MODEL_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.model_dir);

        let hub_endpoint = std::env::var("HUB_ENDPOINT").unwrap_or(defaults.hub_endpoint);

        let model_revision = std::env::var("MODEL_REVISION").unwrap_or(defaults.model_revision);

        let hf_token = std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty());

        let max_new_tokens = match std::env::var("MAX_NEW_TOKENS") {
            Ok(raw) => raw.parse::<usize>()?,
            Err(_) => defaults.max_new_tokens,
        };

        let offline = match std::env::var("OFFLINE") {
            Ok(raw) => parse_flag(&raw)?,
            Err(_) => defaults.offline,
        };

        let download_timeout_ms = match std::env::var("DOWNLOAD_TIMEOUT_MS") {
            Ok(raw) => raw.parse::<u64>()?,
            Err(_) => defaults.download_timeout_ms,
        };

        let languages = match std::env::var("LANGUAGES") {
            Ok(raw) => parse_languages(&raw)?,
            Err(_) => defaults.languages,
        };

        Ok(Self {
            host,
            port,
            chunk_size,
            model_repo_template,
            model_dir,
            hub_endpoint,
            model_revision,
            hf_token,
            max_new_tokens,
            offline,
            download_timeout_ms,
            languages,
        })
    }

    /// Load from a JSON file if given, otherwise from the environment, then validate.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        let mut config = match path {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                let mut config = Self::from_file(path)?;
                // Tokens never live in config files
                config.hf_token = std::env::var("HF_TOKEN").ok().filter(|t| !t.is_empty());
                config
            }
            None => Self::from_env()?,
        };

        if config.languages.is_empty() {
            config.languages = default_languages();
            info!("Loaded {} default languages", config.languages.len());
        }

        config.validate()?;
        Ok(config)
    }

    /// Load from JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn to_file<P: AsRef<Path>>(&self, path: P) -> anyhow::Result<()> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.chunk_size == 0 {
            return Err(anyhow::anyhow!("chunk_size must be greater than 0"));
        }

        if !self.model_repo_template.contains("{src}") || !self.model_repo_template.contains("{tgt}") {
            return Err(anyhow::anyhow!(
                "model_repo_template must contain {{src}} and {{tgt}}, got '{}'",
                self.model_repo_template
            ));
        }

        if self.max_new_tokens == 0 {
            return Err(anyhow::anyhow!("max_new_tokens must be greater than 0"));
        }

        if !self.offline && self.hub_endpoint.is_empty() {
            return Err(anyhow::anyhow!("hub_endpoint is required unless offline"));
        }

        if self.languages.is_empty() {
            warn!("No languages configured");
        }

        Ok(())
    }

    /// Display name for a language code, falling back to the code itself
    pub fn language_name<'a>(&'a self, code: &'a str) -> &'a str {
        self.languages.get(code).map(String::as_str).unwrap_or(code)
    }
}
