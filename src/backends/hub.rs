//! Model file fetching from a Hugging Face style hub

use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

use crate::core::config::TranslatorConfig;
use crate::core::errors::{Result, TranslationError};

/// Downloads model files on demand into a local model directory
#[derive(Debug, Clone)]
pub struct HubClient {
    client: reqwest::Client,
    endpoint: String,
    revision: String,
    token: Option<String>,
    model_dir: PathBuf,
    offline: bool,
}

impl HubClient {
    /// Create a hub client
    pub fn new(config: &TranslatorConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.download_timeout_ms))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.hub_endpoint.trim_end_matches('/').to_string(),
            revision: config.model_revision.clone(),
            token: config.hf_token.clone(),
            model_dir: config.model_dir.clone(),
            offline: config.offline,
        })
    }

    /// Local directory holding the files of `model_id`
    pub fn local_dir(&self, model_id: &str) -> PathBuf {
        self.model_dir.join(model_id.replace('/', "--"))
    }

    /// Remote location of one model file
    pub fn file_url(&self, model_id: &str, filename: &str) -> String {
        format!(
            "{}/{}/resolve/{}/{}",
            self.endpoint, model_id, self.revision, filename
        )
    }

    /// Local path of a required file, downloading it if missing
    pub async fn fetch(&self, model_id: &str, filename: &str) -> Result<PathBuf> {
        self.fetch_optional(model_id, filename)
            .await?
            .ok_or_else(|| TranslationError::ModelLoad {
                model_id: model_id.to_string(),
                message: if self.offline {
                    format!(
                        "{} is not in {} and downloads are disabled (offline)",
                        filename,
                        self.local_dir(model_id).display()
                    )
                } else {
                    format!("{} not found on hub", filename)
                },
            })
    }

    /// Like [`fetch`](Self::fetch), but a file the hub does not have is `None`.
    /// Offline, any file missing locally is `None`.
    pub async fn fetch_optional(&self, model_id: &str, filename: &str) -> Result<Option<PathBuf>> {
        let local_path = self.local_dir(model_id).join(filename);
        if local_path.exists() {
            debug!("Using cached {}", local_path.display());
            return Ok(Some(local_path));
        }

        if self.offline {
            debug!("{} missing for {} and downloads are disabled", filename, model_id);
            return Ok(None);
        }

        self.download(model_id, filename, &local_path)
            .await
            .map_err(|e| match e {
                e @ TranslationError::ModelLoad { .. } => e,
                other => TranslationError::ModelLoad {
                    model_id: model_id.to_string(),
                    message: format!("downloading {}: {}", filename, other),
                },
            })
    }

    async fn download(&self, model_id: &str, filename: &str, local_path: &Path) -> Result<Option<PathBuf>> {
        let url = self.file_url(model_id, filename);
        info!("Downloading {}", url);

        let mut request = self.client.get(&url);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("Bearer {}", token));
        }

        let response = request.send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            debug!("{} not available for {}", filename, model_id);
            return Ok(None);
        }
        if !status.is_success() {
            return Err(TranslationError::ModelLoad {
                model_id: model_id.to_string(),
                message: format!("failed to download {}: HTTP {}", filename, status),
            });
        }

        let bytes = response.bytes().await?;
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        // Write aside first so an interrupted download is never mistaken for a cached file
        let partial = local_path.with_extension("partial");
        tokio::fs::write(&partial, &bytes).await?;
        tokio::fs::rename(&partial, local_path).await?;

        debug!("Saved {} ({} bytes)", local_path.display(), bytes.len());
        Ok(Some(local_path.to_path_buf()))
    }
}
