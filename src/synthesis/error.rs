//! The single error surface shown to the user.

use thiserror::Error;

use super::{TransportError, ValidationError};

/// Shown when the service fails without supplying a message.
pub const GENERIC_SERVER_MESSAGE: &str = "An error occurred while generating audio.";
/// Shown for transport failures and anything not otherwise classified.
pub const UNKNOWN_ERROR_MESSAGE: &str = "An unknown error occurred.";

/// Every way a submission can end without an artifact.
///
/// The `Display` output is for logs; the UI shows [`user_message`](Self::user_message).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SubmissionError {
    #[error("validation: text is empty")]
    MissingText,

    #[error("validation: no reference audio selected")]
    MissingReferenceAudio,

    /// Non-2xx response carrying an `error` string.
    #[error("service error ({status}): {message}")]
    ServerReported { status: u16, message: String },

    /// Non-2xx response without a usable `error` field.
    #[error("service error ({status}) without message")]
    Server { status: u16 },

    /// 2xx response with no usable `file_id`.
    #[error("service reply has no file_id")]
    MalformedResponse,

    /// Network failure or undecodable reply.
    #[error("transport: {0}")]
    Transport(String),

    /// Failures outside the HTTP exchange (encoding, panics, aborted tasks).
    #[error("unexpected: {0}")]
    Unknown(String),
}

impl SubmissionError {
    /// Message rendered inline under the form.
    pub fn user_message(&self) -> String {
        match self {
            SubmissionError::MissingText => "Please enter the text.".into(),
            SubmissionError::MissingReferenceAudio => {
                "Please select a reference audio file.".into()
            }
            SubmissionError::ServerReported { message, .. } => message.clone(),
            SubmissionError::Server { .. } => GENERIC_SERVER_MESSAGE.into(),
            SubmissionError::MalformedResponse => {
                "The service response did not include an audio identifier.".into()
            }
            SubmissionError::Transport(_) | SubmissionError::Unknown(_) => {
                UNKNOWN_ERROR_MESSAGE.into()
            }
        }
    }
}

impl From<ValidationError> for SubmissionError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::MissingText => SubmissionError::MissingText,
            ValidationError::MissingReferenceAudio => SubmissionError::MissingReferenceAudio,
        }
    }
}

impl From<TransportError> for SubmissionError {
    fn from(e: TransportError) -> Self {
        match e {
            // The form could not be built; nothing reached the network.
            TransportError::Encode(msg) => SubmissionError::Unknown(msg),
            other => SubmissionError::Transport(other.to_string()),
        }
    }
}
