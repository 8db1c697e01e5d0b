//! Submission state machine and shared state handle.
//!
//! [`SubmissionState`] is the single source of truth the UI renders from. Its
//! transitions are pure: each takes `&self` and returns the next state, and
//! only the orchestrator writes the result back into [`SharedState`].
//!
//! [`SharedState`] is a type alias for `Arc<Mutex<SubmissionState>>`.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use crate::synthesis::{ArtifactReference, SubmissionError, ValidationError};

// ---------------------------------------------------------------------------
// SubmissionPhase
// ---------------------------------------------------------------------------

/// Phases of one submission.
///
/// ```text
/// Idle / Succeeded / Failed ──submit──▶ Validating
/// Validating ──invalid──▶ Failed          (no request sent)
/// Validating ──valid────▶ Submitting
/// Submitting ──artifact─▶ Succeeded
/// Submitting ──error────▶ Failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SubmissionPhase {
    #[default]
    Idle,
    /// Synchronous required-field checks.
    Validating,
    /// The request is on the wire.
    Submitting,
    Succeeded,
    Failed,
}

impl SubmissionPhase {
    /// `true` while a submission is in flight; the submit button is disabled.
    ///
    /// ```
    /// use voice_cloner::pipeline::SubmissionPhase;
    ///
    /// assert!(!SubmissionPhase::Idle.is_busy());
    /// assert!(SubmissionPhase::Validating.is_busy());
    /// assert!(SubmissionPhase::Submitting.is_busy());
    /// assert!(!SubmissionPhase::Succeeded.is_busy());
    /// assert!(!SubmissionPhase::Failed.is_busy());
    /// ```
    pub fn is_busy(&self) -> bool {
        matches!(self, SubmissionPhase::Validating | SubmissionPhase::Submitting)
    }
}

// ---------------------------------------------------------------------------
// SubmissionState
// ---------------------------------------------------------------------------

/// Current phase plus the last outcome.
///
/// `error` and `result` are never both set.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionState {
    phase: SubmissionPhase,
    error: Option<SubmissionError>,
    result: Option<ArtifactReference>,
}

impl SubmissionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.phase
    }

    pub fn is_busy(&self) -> bool {
        self.phase.is_busy()
    }

    pub fn error(&self) -> Option<&SubmissionError> {
        self.error.as_ref()
    }

    /// The inline message shown under the form, if any.
    pub fn error_message(&self) -> Option<String> {
        self.error.as_ref().map(SubmissionError::user_message)
    }

    pub fn result(&self) -> Option<&ArtifactReference> {
        self.result.as_ref()
    }

    // -----------------------------------------------------------------------
    // Transitions
    // -----------------------------------------------------------------------

    /// Start a new submission, clearing the previous outcome.
    ///
    /// Returns `None` while another submission is in flight.
    pub fn begin(&self) -> Option<Self> {
        if self.is_busy() {
            return None;
        }
        Some(Self {
            phase: SubmissionPhase::Validating,
            error: None,
            result: None,
        })
    }

    /// Validation rejected the input; nothing is sent.
    pub fn validation_failed(&self, error: ValidationError) -> Self {
        debug_assert_eq!(self.phase, SubmissionPhase::Validating);
        Self::failed(error.into())
    }

    /// The encoded request has been handed to the transport.
    pub fn dispatched(&self) -> Self {
        debug_assert_eq!(self.phase, SubmissionPhase::Validating);
        Self {
            phase: SubmissionPhase::Submitting,
            error: None,
            result: None,
        }
    }

    /// Record the interpreted outcome of the request.
    pub fn settle(&self, outcome: Result<ArtifactReference, SubmissionError>) -> Self {
        match outcome {
            Ok(reference) => Self {
                phase: SubmissionPhase::Succeeded,
                error: None,
                result: Some(reference),
            },
            Err(error) => Self::failed(error),
        }
    }

    /// The submission ended without settling (panic, cancelled task).
    ///
    /// No-op unless the state is still in flight.
    pub fn abandoned(&self, reason: &str) -> Self {
        if self.is_busy() {
            Self::failed(SubmissionError::Unknown(reason.to_string()))
        } else {
            self.clone()
        }
    }

    fn failed(error: SubmissionError) -> Self {
        Self {
            phase: SubmissionPhase::Failed,
            error: Some(error),
            result: None,
        }
    }
}

// ---------------------------------------------------------------------------
// SharedState
// ---------------------------------------------------------------------------

/// Thread-safe handle to [`SubmissionState`].
///
/// Cheap to clone (`Arc` clone). Lock for a short critical section; do
/// **not** hold the lock across `.await` points.
pub type SharedState = Arc<Mutex<SubmissionState>>;

/// Construct a new [`SharedState`] in the `Idle` phase.
pub fn new_shared_state() -> SharedState {
    Arc::new(Mutex::new(SubmissionState::new()))
}

/// Lock `state`, recovering the data if a previous holder panicked.
///
/// Every writer replaces the whole value, so a poisoned guard never exposes a
/// half-updated state.
pub fn lock_state(state: &SharedState) -> MutexGuard<'_, SubmissionState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Copy of the current state, for readers such as the UI.
pub fn snapshot(state: &SharedState) -> SubmissionState {
    lock_state(state).clone()
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
