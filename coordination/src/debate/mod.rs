//! Debate Orchestration: Scientist vs. Philosopher, judged
//!
//! Two debaters alternate for a fixed turn budget; a judge then reads the
//! whole transcript and names a single winner.
//!
//! # Engine Flow
//!
//! ```text
//! Init → Debating ──┐
//!   │       ▲       │ router: next speaker → invoke → append turn
//!   │       └───────┘
//!   │       │ router: terminal (budget spent)
//!   │       ▼
//!   │    Judging → Done
//!   │       │
//!   └───────┴──→ Failed (invalid input, generation failure,
//!                        malformed verdict, cancellation)
//! ```

pub mod guardrails;
pub mod orchestrator;
pub mod participant;
pub mod persistence;
pub mod prompts;
pub mod router;
pub mod state;

pub use guardrails::{GuardrailConfig, GuardrailEngine, GuardrailOutcome, RepetitionPolicy};
pub use orchestrator::{
    CompletedDebate, DebateConfig, DebateEngine, DebateError, EnginePhase, FailureCause,
    DEFAULT_MAX_TURNS,
};
pub use participant::{Debater, Judge, Participant, ParticipantError, ParticipantOutput};
pub use persistence::{DebateRecord, PersistenceError};
pub use router::{route, Route};
pub use state::{DebateState, DebateStatus, RoleId, StateSnapshot, TransitionError, Turn, Verdict};
