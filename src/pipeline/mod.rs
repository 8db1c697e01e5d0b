//! Submission pipeline: the state machine and the orchestrator that drives it.
//!
//! # Architecture
//!
//! ```text
//! SubmissionCommand (mpsc)
//!        │
//!        ▼
//! SubmissionOrchestrator::run()  ← async tokio task
//!        │
//!        └─ Submit(input) → spawn submit()
//!              ├─ begin            (rejected while in flight)
//!              ├─ validate         → Failed on first violation
//!              ├─ encode + dispatch → Submitting
//!              └─ interpret        → Succeeded | Failed
//!
//! SharedState (Arc<Mutex<SubmissionState>>) ←─── read by egui update() each frame
//! ```
//!
//! # Quick start
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use voice_cloner::pipeline::{new_shared_state, snapshot, SubmissionOrchestrator};
//! use voice_cloner::synthesis::{Endpoint, HttpSubmitter, Language, SynthesisInput};
//!
//! #[tokio::main]
//! async fn main() {
//!     let endpoint = Endpoint::parse("http://localhost:5000").unwrap();
//!     let transport = Arc::new(HttpSubmitter::new(reqwest::Client::new(), endpoint.clone()));
//!     let state = new_shared_state();
//!     let orchestrator = SubmissionOrchestrator::new(state.clone(), transport, endpoint);
//!
//!     let input = SynthesisInput::new("Merhaba", None, Language::Turkish);
//!     orchestrator.submit(input).await.unwrap();
//!
//!     // "Please select a reference audio file."
//!     println!("{:?}", snapshot(&state).error_message());
//! }
//! ```

pub mod runner;
pub mod state;

// ---------------------------------------------------------------------------
// Public re-exports
// ---------------------------------------------------------------------------

pub use runner::{SubmissionCommand, SubmissionOrchestrator, SubmitRejected};
pub use state::{
    lock_state, new_shared_state, snapshot, SharedState, SubmissionPhase, SubmissionState,
};
