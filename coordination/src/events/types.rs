//! Event types emitted by the debate engine.
//!
//! These are the only thing the engine tells the outside world; logging
//! collaborators turn them into files or console output.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::debate::state::{RoleId, Turn, Verdict};

/// Unique identifier for a debate run.
pub type RunId = String;

/// All debate lifecycle events.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum DebateEvent {
    /// A run passed validation and entered the debating phase.
    DebateStarted {
        run_id: RunId,
        topic: String,
        max_turns: u32,
        first_speaker: RoleId,
        timestamp: DateTime<Utc>,
    },

    /// A debater's turn was committed to the transcript.
    TurnProduced {
        run_id: RunId,
        turn: Turn,
        timestamp: DateTime<Utc>,
    },

    /// The judge's verdict was recorded.
    VerdictProduced {
        run_id: RunId,
        verdict: Verdict,
        timestamp: DateTime<Utc>,
    },

    /// The run ended without a verdict.
    RunFailed {
        run_id: RunId,
        reason: String,
        partial_transcript: Vec<Turn>,
        timestamp: DateTime<Utc>,
    },
}

impl DebateEvent {
    pub fn run_id(&self) -> &str {
        match self {
            DebateEvent::DebateStarted { run_id, .. } => run_id,
            DebateEvent::TurnProduced { run_id, .. } => run_id,
            DebateEvent::VerdictProduced { run_id, .. } => run_id,
            DebateEvent::RunFailed { run_id, .. } => run_id,
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            DebateEvent::DebateStarted { timestamp, .. } => *timestamp,
            DebateEvent::TurnProduced { timestamp, .. } => *timestamp,
            DebateEvent::VerdictProduced { timestamp, .. } => *timestamp,
            DebateEvent::RunFailed { timestamp, .. } => *timestamp,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            DebateEvent::DebateStarted { .. } => "debate_started",
            DebateEvent::TurnProduced { .. } => "turn_produced",
            DebateEvent::VerdictProduced { .. } => "verdict_produced",
            DebateEvent::RunFailed { .. } => "run_failed",
        }
    }

    /// Whether no further events will follow for this run.
    pub fn is_final(&self) -> bool {
        matches!(
            self,
            DebateEvent::VerdictProduced { .. } | DebateEvent::RunFailed { .. }
        )
    }

    /// Generate a new run ID.
    pub fn new_run_id() -> RunId {
        uuid::Uuid::new_v4().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serialized_tag() {
        let event = DebateEvent::TurnProduced {
            run_id: "run-1".to_string(),
            turn: Turn::new(RoleId::Scientist, "Evidence first.", 0),
            timestamp: Utc::now(),
        };
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "turn_produced");
        assert_eq!(json["turn"]["speaker"], "scientist");

        let back: DebateEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }

    #[test]
    fn test_accessors() {
        let event = DebateEvent::RunFailed {
            run_id: "run-2".to_string(),
            reason: "cancelled".to_string(),
            partial_transcript: vec![],
            timestamp: Utc::now(),
        };
        assert_eq!(event.run_id(), "run-2");
        assert_eq!(event.event_type(), "run_failed");
        assert!(event.is_final());
        assert_ne!(DebateEvent::new_run_id(), DebateEvent::new_run_id());
    }
}
