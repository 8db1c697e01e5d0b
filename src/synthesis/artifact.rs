//! Reference to a synthesized audio file held by the service.

use super::Endpoint;

/// Opaque identifier plus the retrieval URL built from it.
///
/// Created on a successful response and replaced by the next submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArtifactReference {
    file_id: String,
    url: String,
}

impl ArtifactReference {
    /// `{endpoint}/api/audio/{file_id}`
    pub fn new(endpoint: &Endpoint, file_id: impl Into<String>) -> Self {
        let file_id = file_id.into();
        let url = endpoint.audio_url(&file_id).to_string();
        Self { file_id, url }
    }

    pub fn file_id(&self) -> &str {
        &self.file_id
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    /// File name used when the artifact is saved locally.
    pub fn download_file_name(&self) -> String {
        let safe: String = self
            .file_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        format!("{safe}.wav")
    }
}

impl std::fmt::Display for ArtifactReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}
