//! Multipart payload for `POST /api/tts`.

use std::sync::Arc;

use reqwest::multipart::{Form, Part};

use super::{Language, ValidatedInput};

/// Multipart field carrying the reference sample.
pub const FIELD_AUDIO: &str = "audio";
/// Multipart field carrying the text to synthesize.
pub const FIELD_TEXT: &str = "text";
/// Multipart field carrying the language code.
pub const FIELD_LANGUAGE: &str = "language";

/// A validated request, ready to become a multipart body.
///
/// Kept as plain data so it can be inspected in tests and handed to any
/// [`SynthesisTransport`](super::SynthesisTransport); the HTTP form is only
/// built at send time by [`EncodedPayload::into_form`].
#[derive(Debug, Clone, PartialEq)]
pub struct EncodedPayload {
    pub audio: Arc<[u8]>,
    pub audio_file_name: String,
    pub audio_mime: &'static str,
    pub text: String,
    pub language: Language,
}

impl EncodedPayload {
    /// Field names in the order they are appended to the form.
    pub fn field_names(&self) -> [&'static str; 3] {
        [FIELD_AUDIO, FIELD_TEXT, FIELD_LANGUAGE]
    }

    /// Build the `multipart/form-data` body.
    ///
    /// The audio bytes are copied verbatim; no transcoding happens here.
    pub fn into_form(self) -> Result<Form, reqwest::Error> {
        let audio = Part::bytes(self.audio.to_vec())
            .file_name(self.audio_file_name)
            .mime_str(self.audio_mime)?;

        Ok(Form::new()
            .part(FIELD_AUDIO, audio)
            .text(FIELD_TEXT, self.text)
            .text(FIELD_LANGUAGE, self.language.as_str()))
    }
}

/// Turn a validated input into a payload. The sample bytes are shared, not copied.
pub fn encode(input: &ValidatedInput<'_>) -> EncodedPayload {
    EncodedPayload {
        audio: input.reference_audio.shared_bytes(),
        audio_file_name: input.reference_audio.file_name().to_string(),
        audio_mime: input.reference_audio.mime(),
        text: input.text.to_string(),
        language: input.language,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synthesis::{validate, ReferenceAudio, SynthesisInput};

    fn input_with(bytes: Vec<u8>) -> SynthesisInput {
        SynthesisInput::new(
            "Merhaba",
            Some(ReferenceAudio::from_bytes("speaker.wav", bytes).unwrap()),
            Language::Turkish,
        )
    }

    #[test]
    fn has_exactly_three_named_fields() {
        let input = input_with(vec![1, 2, 3]);
        let payload = encode(&validate(&input).unwrap());
        assert_eq!(payload.field_names(), ["audio", "text", "language"]);
    }

    #[test]
    fn preserves_audio_bytes() {
        let bytes: Vec<u8> = (0..=255).collect();
        let input = input_with(bytes.clone());
        let payload = encode(&validate(&input).unwrap());

        assert_eq!(&payload.audio[..], &bytes[..]);
        assert_eq!(payload.audio_file_name, "speaker.wav");
        assert_eq!(payload.audio_mime, "audio/wav");
    }

    #[test]
    fn does_not_take_the_sample_away() {
        let input = input_with(vec![7; 32]);
        let payload = encode(&validate(&input).unwrap());

        let held = input.reference_audio.as_ref().unwrap().shared_bytes();
        assert!(Arc::ptr_eq(&payload.audio, &held));
    }

    #[test]
    fn carries_text_and_language_code() {
        let mut input = input_with(vec![0; 4]);
        input.language = Language::English;
        input.text = "Hello there".into();
        let payload = encode(&validate(&input).unwrap());

        assert_eq!(payload.text, "Hello there");
        assert_eq!(payload.language.as_str(), "en");
    }

    #[test]
    fn builds_form() {
        let input = input_with(vec![0; 4]);
        let form = encode(&validate(&input).unwrap()).into_form();
        assert!(form.is_ok());
    }
}
