//! Retrieval of synthesized audio from `GET {endpoint}/api/audio/{file_id}`.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::synthesis::ArtifactReference;

/// Message used when a 404 reply carries no `error` field.
const NOT_FOUND_MESSAGE: &str = "Audio file not found";

/// Errors that can occur while downloading an artifact.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The service no longer has the file (or never had it).
    #[error("{message}")]
    NotFound { message: String },

    #[error("service returned HTTP {0}")]
    Status(u16),

    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),

    #[error("failed to write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Downloads artifacts referenced by a successful submission.
#[derive(Debug, Clone)]
pub struct ArtifactFetcher {
    client: reqwest::Client,
}

impl ArtifactFetcher {
    pub fn new(client: reqwest::Client) -> Self {
        Self { client }
    }

    /// Download the artifact bytes.
    pub async fn fetch(&self, reference: &ArtifactReference) -> Result<Vec<u8>, FetchError> {
        log::debug!("http: GET {}", reference.url());
        let response = self.client.get(reference.url()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::NOT_FOUND {
            // The service answers 404 with `{"error": "..."}`.
            let body: serde_json::Value = response.json().await.unwrap_or_default();
            let message = body["error"]
                .as_str()
                .filter(|m| !m.is_empty())
                .unwrap_or(NOT_FOUND_MESSAGE)
                .to_string();
            return Err(FetchError::NotFound { message });
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        let bytes = response.bytes().await?;
        log::debug!("http: fetched {} bytes for {}", bytes.len(), reference.file_id());
        Ok(bytes.to_vec())
    }

    /// Download the artifact into `dir` as `{file_id}.wav`.
    ///
    /// `dir` is created if missing. An existing file with the same name is
    /// overwritten. Returns the written path.
    pub async fn download_to(
        &self,
        reference: &ArtifactReference,
        dir: &Path,
    ) -> Result<PathBuf, FetchError> {
        let bytes = self.fetch(reference).await?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|source| FetchError::Io {
                path: dir.to_path_buf(),
                source,
            })?;

        let path = dir.join(reference.download_file_name());
        tokio::fs::write(&path, &bytes)
            .await
            .map_err(|source| FetchError::Io {
                path: path.clone(),
                source,
            })?;

        log::info!("playback: saved {}", path.display());
        Ok(path)
    }
}
