//! Client side of the voice-cloning synthesis service.
//!
//! This module provides:
//! * [`validate`] — required-field checks, first failure wins.
//! * [`encode`] / [`EncodedPayload`] — the three-part multipart body.
//! * [`SynthesisTransport`] — async trait for the network exchange.
//! * [`HttpSubmitter`] — `reqwest` transport for `POST /api/tts`.
//! * [`interpret`] — status + JSON body → [`ArtifactReference`] or [`SubmissionError`].
//! * [`Endpoint`] — parsed service base URL.
//!
//! # Quick start
//!
//! ```rust,no_run
//! use voice_cloner::config::ServiceConfig;
//! use voice_cloner::synthesis::{
//!     encode, interpret, validate, HttpSubmitter, Language, ReferenceAudio,
//!     SynthesisInput, SynthesisTransport,
//! };
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ServiceConfig::default();
//!     let endpoint = config.endpoint()?;
//!     let submitter = HttpSubmitter::new(config.http_client(), endpoint.clone());
//!
//!     let sample = ReferenceAudio::from_path("speaker.wav".as_ref())?;
//!     let input = SynthesisInput::new("Merhaba", Some(sample), Language::Turkish);
//!
//!     let payload = encode(&validate(&input)?);
//!     let raw = submitter.submit(payload).await?;
//!     let artifact = interpret(raw.status, &raw.body, &endpoint)?;
//!     println!("{}", artifact.url());
//!     Ok(())
//! }
//! ```

pub mod artifact;
pub mod encode;
pub mod endpoint;
pub mod error;
pub mod input;
pub mod interpret;
pub mod language;
pub mod submitter;
pub mod validate;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use artifact::ArtifactReference;
pub use encode::{encode, EncodedPayload};
pub use endpoint::{Endpoint, EndpointError};
pub use error::SubmissionError;
pub use input::{ReferenceAudio, ReferenceAudioError, SynthesisInput};
pub use interpret::interpret;
pub use language::Language;
pub use submitter::{HttpSubmitter, RawResponse, ServiceHealth, SynthesisTransport, TransportError};
pub use validate::{validate, ValidatedInput, ValidationError};
