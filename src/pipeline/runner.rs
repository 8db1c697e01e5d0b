//! Submission orchestrator: validate → encode → submit → interpret.
//!
//! [`SubmissionOrchestrator`] is the only writer of [`SharedState`]. The UI
//! sends [`SubmissionCommand`]s over a `tokio::sync::mpsc` channel and reads
//! the state every frame.
//!
//! # Flow
//!
//! ```text
//! SubmissionCommand::Submit(input)
//!   └─▶ begin            [Validating]   (rejected if already in flight)
//!         ├─ invalid  ─▶ validation_failed            [Failed]
//!         └─ valid    ─▶ encode, dispatched           [Submitting]
//!               └─▶ transport.submit(payload).await
//!                     └─▶ interpret → settle          [Succeeded | Failed]
//! ```
//!
//! While `Submitting`, an [`InFlight`] guard is alive; if the future is
//! dropped or the transport panics, the guard moves the state to `Failed` so
//! the submit control is never left disabled.

use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;

use crate::synthesis::{
    encode, interpret, validate, Endpoint, SynthesisInput, SynthesisTransport,
};

use super::state::{lock_state, SharedState, SubmissionPhase};

// ---------------------------------------------------------------------------
// SubmitRejected
// ---------------------------------------------------------------------------

/// Returned when a submission is attempted while another one is in flight.
///
/// The state is left untouched; the in-flight request keeps running.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("a synthesis request is already in flight")]
pub struct SubmitRejected;

// ---------------------------------------------------------------------------
// SubmissionCommand
// ---------------------------------------------------------------------------

/// Commands sent from the UI to the orchestrator.
#[derive(Debug, Clone)]
pub enum SubmissionCommand {
    /// Validate and send the given form contents.
    Submit(SynthesisInput),
}

// ---------------------------------------------------------------------------
// InFlight guard
// ---------------------------------------------------------------------------

/// Clears the in-flight phase if the submission ends without settling.
struct InFlight {
    state: SharedState,
}

impl Drop for InFlight {
    fn drop(&mut self) {
        let mut st = lock_state(&self.state);
        if st.is_busy() {
            log::error!("submission: ended without a result, marking as failed");
            *st = st.abandoned("submission ended without a result");
        }
    }
}

// ---------------------------------------------------------------------------
// SubmissionOrchestrator
// ---------------------------------------------------------------------------

/// Drives submissions against a [`SynthesisTransport`].
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use voice_cloner::config::ServiceConfig;
/// use voice_cloner::pipeline::{new_shared_state, SubmissionOrchestrator};
/// use voice_cloner::synthesis::HttpSubmitter;
///
/// # async fn example() -> anyhow::Result<()> {
/// let config = ServiceConfig::default();
/// let endpoint = config.endpoint()?;
/// let state = new_shared_state();
///
/// let orchestrator = Arc::new(SubmissionOrchestrator::new(
///     state.clone(),
///     Arc::new(HttpSubmitter::new(config.http_client(), endpoint.clone())),
///     endpoint,
/// ));
///
/// let (command_tx, command_rx) = tokio::sync::mpsc::channel(8);
/// tokio::spawn(orchestrator.run(command_rx));
/// # drop(command_tx);
/// # Ok(())
/// # }
/// ```
pub struct SubmissionOrchestrator {
    state: SharedState,
    transport: Arc<dyn SynthesisTransport>,
    endpoint: Endpoint,
}

impl SubmissionOrchestrator {
    /// * `state`     — shared state, also read by the UI.
    /// * `transport` — e.g. [`HttpSubmitter`](crate::synthesis::HttpSubmitter).
    /// * `endpoint`  — base used to build artifact URLs.
    pub fn new(
        state: SharedState,
        transport: Arc<dyn SynthesisTransport>,
        endpoint: Endpoint,
    ) -> Self {
        Self {
            state,
            transport,
            endpoint,
        }
    }

    pub fn state(&self) -> &SharedState {
        &self.state
    }

    // -----------------------------------------------------------------------
    // Main async loop
    // -----------------------------------------------------------------------

    /// Run until `command_rx` is closed.
    ///
    /// Each submission runs in its own task so the loop keeps receiving;
    /// overlapping submissions are rejected by the in-flight check.
    pub async fn run(self: Arc<Self>, mut command_rx: mpsc::Receiver<SubmissionCommand>) {
        while let Some(command) = command_rx.recv().await {
            match command {
                SubmissionCommand::Submit(input) => {
                    let this = Arc::clone(&self);
                    tokio::spawn(async move {
                        if let Err(e) = this.submit(input).await {
                            log::warn!("submission: {e}; ignoring");
                        }
                    });
                }
            }
        }

        log::info!("submission: command channel closed, orchestrator shutting down");
    }

    // -----------------------------------------------------------------------
    // Submission
    // -----------------------------------------------------------------------

    /// Run one submission to completion.
    ///
    /// Every outcome, including errors, ends up in the shared state; the only
    /// error returned to the caller is [`SubmitRejected`].
    pub async fn submit(&self, input: SynthesisInput) -> Result<(), SubmitRejected> {
        // ── 1. Claim the state ──────────────────────────────────────────
        {
            let mut st = lock_state(&self.state);
            let next = st.begin().ok_or(SubmitRejected)?;
            *st = next;
        }
        log::debug!("submission: → Validating");

        // ── 2. Validate + encode (synchronous) ──────────────────────────
        let payload = match validate(&input) {
            Ok(valid) => encode(&valid),
            Err(e) => {
                log::info!("submission: validation failed: {e}");
                let mut st = lock_state(&self.state);
                *st = st.validation_failed(e);
                return Ok(());
            }
        };

        // ── 3. Dispatch ─────────────────────────────────────────────────
        let guard = InFlight {
            state: Arc::clone(&self.state),
        };
        {
            let mut st = lock_state(&self.state);
            *st = st.dispatched();
        }
        log::debug!("submission: → Submitting ({})", self.endpoint.synthesis_url());

        let outcome = match self.transport.submit(payload).await {
            Ok(raw) => interpret(raw.status, &raw.body, &self.endpoint),
            Err(e) => Err(e.into()),
        };

        // ── 4. Settle ───────────────────────────────────────────────────
        match &outcome {
            Ok(reference) => log::info!("submission: succeeded → {reference}"),
            Err(e) => log::error!("submission failed: {e}"),
        }
        {
            let mut st = lock_state(&self.state);
            *st = st.settle(outcome);
        }
        drop(guard);

        Ok(())
    }

    /// Current phase, for callers that only need the flag.
    pub fn phase(&self) -> SubmissionPhase {
        lock_state(&self.state).phase()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::state::{new_shared_state, snapshot};
    use crate::synthesis::{
        EncodedPayload, Language, RawResponse, ReferenceAudio, SubmissionError, TransportError,
    };
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use tokio::sync::Notify;

    // -----------------------------------------------------------------------
    // Test doubles
    // -----------------------------------------------------------------------

    /// Replies with a fixed status/body and records what it was sent.
    struct FixedReply {
        status: StatusCode,
        body: Value,
        calls: AtomicUsize,
        last: Mutex<Option<EncodedPayload>>,
    }

    impl FixedReply {
        fn new(status: StatusCode, body: Value) -> Arc<Self> {
            Arc::new(Self {
                status,
                body,
                calls: AtomicUsize::new(0),
                last: Mutex::new(None),
            })
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SynthesisTransport for FixedReply {
        async fn submit(&self, payload: EncodedPayload) -> Result<RawResponse, TransportError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last.lock().unwrap() = Some(payload);
            Ok(RawResponse::new(self.status, self.body.clone()))
        }
    }

    /// Fails immediately, like a refused connection.
    struct Refused;

    #[async_trait]
    impl SynthesisTransport for Refused {
        async fn submit(&self, _payload: EncodedPayload) -> Result<RawResponse, TransportError> {
            Err(TransportError::Request("connection refused".into()))
        }
    }

    /// Blocks until released, then replies with `file_id = "slow"`.
    struct Gated {
        entered: Notify,
        release: Notify,
    }

    #[async_trait]
    impl SynthesisTransport for Gated {
        async fn submit(&self, _payload: EncodedPayload) -> Result<RawResponse, TransportError> {
            self.entered.notify_one();
            self.release.notified().await;
            Ok(RawResponse::new(StatusCode::OK, json!({"file_id": "slow"})))
        }
    }

    struct Panics;

    #[async_trait]
    impl SynthesisTransport for Panics {
        async fn submit(&self, _payload: EncodedPayload) -> Result<RawResponse, TransportError> {
            panic!("transport blew up");
        }
    }

    // -----------------------------------------------------------------------
    // Helpers
    // -----------------------------------------------------------------------

    fn endpoint() -> Endpoint {
        Endpoint::parse("http://localhost:5000").unwrap()
    }

    fn wav() -> ReferenceAudio {
        ReferenceAudio::from_bytes("five_seconds.wav", vec![0x52, 0x49, 0x46, 0x46, 1, 2, 3])
            .unwrap()
    }

    fn valid_input() -> SynthesisInput {
        SynthesisInput::new("Merhaba", Some(wav()), Language::Turkish)
    }

    fn orchestrator(transport: Arc<dyn SynthesisTransport>) -> (SubmissionOrchestrator, SharedState) {
        let state = new_shared_state();
        let orc = SubmissionOrchestrator::new(Arc::clone(&state), transport, endpoint());
        (orc, state)
    }

    fn assert_settled_exclusively(state: &SharedState) {
        let st = snapshot(state);
        assert!(!st.is_busy());
        assert!(
            st.result().is_some() ^ st.error().is_some(),
            "exactly one of result/error must be set: {st:?}"
        );
    }

    // -----------------------------------------------------------------------
    // Scenarios
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn success_sets_result_reference() {
        let transport = FixedReply::new(StatusCode::OK, json!({"success": true, "file_id": "abc123"}));
        let (orc, state) = orchestrator(transport.clone());

        orc.submit(valid_input()).await.unwrap();

        let st = snapshot(&state);
        assert_eq!(st.phase(), SubmissionPhase::Succeeded);
        assert_eq!(
            st.result().map(|r| r.url()),
            Some("http://localhost:5000/api/audio/abc123")
        );
        assert!(st.error_message().is_none());
        assert_eq!(transport.calls(), 1);

        let sent = transport.last.lock().unwrap().clone().unwrap();
        assert_eq!(sent.text, "Merhaba");
        assert_eq!(sent.language, Language::Turkish);
        assert_eq!(&sent.audio[..], wav().bytes());
    }

    #[tokio::test]
    async fn empty_text_fails_without_request() {
        let transport = FixedReply::new(StatusCode::OK, json!({"file_id": "x"}));
        let (orc, state) = orchestrator(transport.clone());

        for audio in [Some(wav()), None] {
            orc.submit(SynthesisInput::new("", audio, Language::Turkish))
                .await
                .unwrap();
            let st = snapshot(&state);
            assert_eq!(st.phase(), SubmissionPhase::Failed);
            assert_eq!(st.error_message().as_deref(), Some("Please enter the text."));
        }
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn missing_audio_fails_without_request() {
        let transport = FixedReply::new(StatusCode::OK, json!({"file_id": "x"}));
        let (orc, state) = orchestrator(transport.clone());

        orc.submit(SynthesisInput::new("Hi", None, Language::English))
            .await
            .unwrap();

        let st = snapshot(&state);
        assert_eq!(st.error(), Some(&SubmissionError::MissingReferenceAudio));
        assert_eq!(
            st.error_message().as_deref(),
            Some("Please select a reference audio file.")
        );
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn server_error_message_is_shown() {
        let transport = FixedReply::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            json!({"error": "voice model unavailable"}),
        );
        let (orc, state) = orchestrator(transport);

        orc.submit(valid_input()).await.unwrap();

        assert_eq!(
            snapshot(&state).error_message().as_deref(),
            Some("voice model unavailable")
        );
        assert_settled_exclusively(&state);
    }

    #[tokio::test]
    async fn server_error_without_message_uses_fallback() {
        let transport = FixedReply::new(StatusCode::INTERNAL_SERVER_ERROR, json!({}));
        let (orc, state) = orchestrator(transport);

        orc.submit(valid_input()).await.unwrap();

        assert_eq!(
            snapshot(&state).error_message().as_deref(),
            Some("An error occurred while generating audio.")
        );
    }

    #[tokio::test]
    async fn transport_failure_is_unknown_error() {
        let (orc, state) = orchestrator(Arc::new(Refused));

        orc.submit(valid_input()).await.unwrap();

        let st = snapshot(&state);
        assert_eq!(st.phase(), SubmissionPhase::Failed);
        assert_eq!(st.error_message().as_deref(), Some("An unknown error occurred."));
        assert!(!st.is_busy());
    }

    #[tokio::test]
    async fn success_without_file_id_is_malformed() {
        let transport = FixedReply::new(StatusCode::OK, json!({"success": true}));
        let (orc, state) = orchestrator(transport);

        orc.submit(valid_input()).await.unwrap();

        let st = snapshot(&state);
        assert_eq!(st.error(), Some(&SubmissionError::MalformedResponse));
        assert!(st.result().is_none());
    }

    #[tokio::test]
    async fn new_submission_replaces_previous_outcome() {
        let transport = FixedReply::new(StatusCode::OK, json!({"file_id": "first"}));
        let (orc, state) = orchestrator(transport);

        orc.submit(valid_input()).await.unwrap();
        assert!(snapshot(&state).result().is_some());

        orc.submit(SynthesisInput::new("", Some(wav()), Language::Turkish))
            .await
            .unwrap();
        let st = snapshot(&state);
        assert!(st.result().is_none());
        assert_eq!(st.error(), Some(&SubmissionError::MissingText));
    }

    #[tokio::test]
    async fn every_valid_submission_settles_exclusively() {
        let replies: Vec<Arc<dyn SynthesisTransport>> = vec![
            FixedReply::new(StatusCode::OK, json!({"file_id": "a"})),
            FixedReply::new(StatusCode::BAD_REQUEST, json!({"error": "No text provided"})),
            FixedReply::new(StatusCode::INTERNAL_SERVER_ERROR, json!(null)),
            FixedReply::new(StatusCode::OK, json!({})),
            Arc::new(Refused),
        ];
        for transport in replies {
            let (orc, state) = orchestrator(transport);
            orc.submit(valid_input()).await.unwrap();
            assert_settled_exclusively(&state);
        }
    }

    // -----------------------------------------------------------------------
    // In-flight guard
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn overlapping_submission_is_rejected() {
        let gated = Arc::new(Gated {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let (orc, state) = orchestrator(gated.clone());
        let orc = Arc::new(orc);

        let first = tokio::spawn({
            let orc = Arc::clone(&orc);
            async move { orc.submit(valid_input()).await }
        });
        gated.entered.notified().await;
        assert_eq!(orc.phase(), SubmissionPhase::Submitting);

        // Second attempt must not disturb the in-flight one.
        assert_eq!(orc.submit(valid_input()).await, Err(SubmitRejected));
        assert_eq!(orc.phase(), SubmissionPhase::Submitting);

        gated.release.notify_one();
        first.await.unwrap().unwrap();

        let st = snapshot(&state);
        assert_eq!(st.phase(), SubmissionPhase::Succeeded);
        assert_eq!(st.result().map(|r| r.file_id()), Some("slow"));
    }

    #[tokio::test]
    async fn panicking_transport_clears_in_flight_flag() {
        let (orc, state) = orchestrator(Arc::new(Panics));
        let orc = Arc::new(orc);

        let handle = tokio::spawn({
            let orc = Arc::clone(&orc);
            async move { orc.submit(valid_input()).await }
        });
        assert!(handle.await.is_err(), "task should have panicked");

        let st = snapshot(&state);
        assert!(!st.is_busy());
        assert_eq!(st.phase(), SubmissionPhase::Failed);
        assert_eq!(st.error_message().as_deref(), Some("An unknown error occurred."));
    }

    #[tokio::test]
    async fn cancelled_submission_clears_in_flight_flag() {
        let gated = Arc::new(Gated {
            entered: Notify::new(),
            release: Notify::new(),
        });
        let (orc, state) = orchestrator(gated.clone());
        let orc = Arc::new(orc);

        let handle = tokio::spawn({
            let orc = Arc::clone(&orc);
            async move { orc.submit(valid_input()).await }
        });
        gated.entered.notified().await;
        handle.abort();
        assert!(handle.await.unwrap_err().is_cancelled());

        let st = snapshot(&state);
        assert!(!st.is_busy());
        assert!(matches!(st.error(), Some(SubmissionError::Unknown(_))));

        // The next submission is accepted again.
        let accepted = tokio::spawn({
            let orc = Arc::clone(&orc);
            async move { orc.submit(valid_input()).await }
        });
        gated.entered.notified().await;
        gated.release.notify_one();
        assert_eq!(accepted.await.unwrap(), Ok(()));
    }

    // -----------------------------------------------------------------------
    // Command loop
    // -----------------------------------------------------------------------

    #[tokio::test]
    async fn run_processes_submit_commands() {
        let transport = FixedReply::new(StatusCode::OK, json!({"file_id": "via-channel"}));
        let (orc, state) = orchestrator(transport.clone());

        let (tx, rx) = mpsc::channel(4);
        let runner = tokio::spawn(Arc::new(orc).run(rx));

        tx.send(SubmissionCommand::Submit(valid_input())).await.unwrap();
        drop(tx);
        runner.await.unwrap();

        // The submission task was spawned by `run`; wait for it to settle.
        for _ in 0..100 {
            if snapshot(&state).phase() == SubmissionPhase::Succeeded {
                break;
            }
            tokio::task::yield_now().await;
        }
        assert_eq!(
            snapshot(&state).result().map(|r| r.file_id()),
            Some("via-channel")
        );
        assert_eq!(transport.calls(), 1);
    }
}
