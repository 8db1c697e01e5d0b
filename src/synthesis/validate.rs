//! Required-field checks performed before any network activity.

use thiserror::Error;

use super::{Language, ReferenceAudio, SynthesisInput};

/// Local validation failures. Only the first violated rule is reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("text is empty")]
    MissingText,

    #[error("no reference audio selected")]
    MissingReferenceAudio,
}

/// Borrowed view of an input that passed [`validate`].
#[derive(Debug, Clone, Copy)]
pub struct ValidatedInput<'a> {
    pub text: &'a str,
    pub reference_audio: &'a ReferenceAudio,
    pub language: Language,
}

/// Check `input` against the required-field rules.
///
/// Text is checked first; the audio check only runs when text is present.
/// Whitespace-only text counts as present, matching what the service accepts.
pub fn validate(input: &SynthesisInput) -> Result<ValidatedInput<'_>, ValidationError> {
    if input.text.is_empty() {
        return Err(ValidationError::MissingText);
    }

    let reference_audio = input
        .reference_audio
        .as_ref()
        .ok_or(ValidationError::MissingReferenceAudio)?;

    Ok(ValidatedInput {
        text: &input.text,
        reference_audio,
        language: input.language,
    })
}
