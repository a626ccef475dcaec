//! Debate coordination library
//!
//! This library provides:
//! - The debate engine: shared state, routing, participants and judging
//! - A text-generation seam that keeps model access out of the core
//! - Structured events for persistence and display collaborators
//!
//! # Usage
//!
//! ```ignore
//! use std::sync::Arc;
//! use debate_coordination::{DebateEngine, EventLog, RoleId};
//!
//! let log = Arc::new(EventLog::new());
//! let engine = DebateEngine::new(generator, log.clone());
//! let verdict = engine
//!     .run_debate("Is free will an illusion?", 8, RoleId::Scientist)
//!     .await?;
//! println!("{} wins: {}", verdict.winner, verdict.justification);
//! ```

pub mod debate;
pub mod events;
pub mod generation;

// Re-export key debate types
pub use debate::{
    route, CompletedDebate, DebateConfig, DebateEngine, DebateError, DebateRecord, DebateState,
    DebateStatus, EnginePhase, FailureCause, GuardrailConfig, Participant, ParticipantError,
    RepetitionPolicy, RoleId, Route, StateSnapshot, TransitionError, Turn, Verdict,
    DEFAULT_MAX_TURNS,
};

// Re-export key event types
pub use events::{DebateEvent, EventBus, EventLog, EventSink, NullSink, SharedEventBus};

// Re-export generation types
pub use generation::{GenerationError, Generator, Prompt, TimeoutGenerator};
