//! User-supplied request material: text, reference voice sample, language.

use std::path::Path;
use std::sync::Arc;

use thiserror::Error;

use super::Language;

// ---------------------------------------------------------------------------
// ReferenceAudioError
// ---------------------------------------------------------------------------

/// Errors raised while loading a reference sample from disk.
#[derive(Debug, Error)]
pub enum ReferenceAudioError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// Only `audio/*` files are accepted, mirroring the file picker filter.
    #[error("{0} is not an audio file")]
    UnsupportedFormat(String),

    #[error("{0} is empty")]
    Empty(String),
}

// ---------------------------------------------------------------------------
// ReferenceAudio
// ---------------------------------------------------------------------------

/// The voice sample whose characteristics the service imitates.
///
/// The bytes sit behind an `Arc` so the encoder can hand them to the HTTP
/// layer without copying or taking them away from the form state.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceAudio {
    file_name: String,
    mime: &'static str,
    bytes: Arc<[u8]>,
}

impl ReferenceAudio {
    /// Wrap in-memory bytes. `file_name` decides the MIME type.
    pub fn from_bytes(
        file_name: impl Into<String>,
        bytes: impl Into<Arc<[u8]>>,
    ) -> Result<Self, ReferenceAudioError> {
        let file_name = file_name.into();
        let mime = mime_for(&file_name)
            .ok_or_else(|| ReferenceAudioError::UnsupportedFormat(file_name.clone()))?;
        let bytes = bytes.into();
        if bytes.is_empty() {
            return Err(ReferenceAudioError::Empty(file_name));
        }
        Ok(Self {
            file_name,
            mime,
            bytes,
        })
    }

    /// Read a sample from disk.
    pub fn from_path(path: &Path) -> Result<Self, ReferenceAudioError> {
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "reference.wav".into());

        // Check the extension first so a huge non-audio file is never read.
        if mime_for(&file_name).is_none() {
            return Err(ReferenceAudioError::UnsupportedFormat(file_name));
        }

        let bytes = std::fs::read(path).map_err(|source| ReferenceAudioError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_bytes(file_name, bytes)
    }

    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    pub fn mime(&self) -> &'static str {
        self.mime
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Shared handle to the sample bytes.
    pub fn shared_bytes(&self) -> Arc<[u8]> {
        Arc::clone(&self.bytes)
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

/// MIME type guessed from the file extension; `None` for non-audio files.
fn mime_for(file_name: &str) -> Option<&'static str> {
    let ext = Path::new(file_name)
        .extension()?
        .to_str()?
        .to_ascii_lowercase();
    let mime = match ext.as_str() {
        "wav" | "wave" => "audio/wav",
        "mp3" => "audio/mpeg",
        "ogg" | "oga" => "audio/ogg",
        "opus" => "audio/opus",
        "flac" => "audio/flac",
        "m4a" | "aac" => "audio/aac",
        "webm" => "audio/webm",
        _ => return None,
    };
    Some(mime)
}

// ---------------------------------------------------------------------------
// SynthesisInput
// ---------------------------------------------------------------------------

/// Everything the user fills in before pressing "Generate Audio".
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SynthesisInput {
    pub text: String,
    pub reference_audio: Option<ReferenceAudio>,
    pub language: Language,
}

impl SynthesisInput {
    pub fn new(
        text: impl Into<String>,
        reference_audio: Option<ReferenceAudio>,
        language: Language,
    ) -> Self {
        Self {
            text: text.into(),
            reference_audio,
            language,
        }
    }
}
