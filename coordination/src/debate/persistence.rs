//! Run records: versioned JSON snapshots of a finished or failed debate.
//!
//! The engine does not write them; collaborators build a record from the
//! engine's result and decide where it goes.

use serde::{Deserialize, Serialize};

use super::orchestrator::{CompletedDebate, DebateError};
use super::prompts::PROMPT_VERSION;
use super::state::{DebateStatus, StateSnapshot, Verdict};

/// How a recorded run ended, when it did not produce a verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordedFailure {
    /// Engine phase in which the run failed.
    pub phase: String,
    pub reason: String,
}

/// A complete run record for serialization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebateRecord {
    /// Schema version for forward compatibility.
    pub version: u32,
    pub run_id: String,
    /// Persona wording the run was generated with.
    #[serde(default)]
    pub prompt_version: String,
    pub state: StateSnapshot,
    pub verdict: Option<Verdict>,
    pub failure: Option<RecordedFailure>,
}

impl DebateRecord {
    /// Current schema version.
    pub const CURRENT_VERSION: u32 = 1;

    pub fn completed(run_id: &str, done: &CompletedDebate) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            run_id: run_id.to_string(),
            prompt_version: PROMPT_VERSION.to_string(),
            state: done.state.clone(),
            verdict: Some(done.verdict.clone()),
            failure: None,
        }
    }

    pub fn failed(run_id: &str, err: &DebateError) -> Self {
        Self {
            version: Self::CURRENT_VERSION,
            run_id: run_id.to_string(),
            prompt_version: PROMPT_VERSION.to_string(),
            state: err.state.clone(),
            verdict: None,
            failure: Some(RecordedFailure {
                phase: err.phase.to_string(),
                reason: err.cause.to_string(),
            }),
        }
    }

    pub fn is_complete(&self) -> bool {
        self.verdict.is_some() && self.state.status == DebateStatus::Complete
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> Result<String, PersistenceError> {
        serde_json::to_string_pretty(self).map_err(|e| PersistenceError::SerializeFailed {
            reason: e.to_string(),
        })
    }

    /// Deserialize from JSON string.
    pub fn from_json(json: &str) -> Result<Self, PersistenceError> {
        let record: Self =
            serde_json::from_str(json).map_err(|e| PersistenceError::DeserializeFailed {
                reason: e.to_string(),
            })?;

        if record.version > Self::CURRENT_VERSION {
            return Err(PersistenceError::VersionMismatch {
                expected: Self::CURRENT_VERSION,
                found: record.version,
            });
        }

        if record.state.turn_index as usize != record.state.transcript.len() {
            return Err(PersistenceError::IntegrityCheckFailed {
                reason: format!(
                    "turn_index {} does not match {} recorded turns",
                    record.state.turn_index,
                    record.state.transcript.len()
                ),
            });
        }

        Ok(record)
    }
}

/// Error during persistence operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PersistenceError {
    #[error("serialize failed: {reason}")]
    SerializeFailed { reason: String },

    #[error("deserialize failed: {reason}")]
    DeserializeFailed { reason: String },

    #[error("version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("integrity check failed: {reason}")]
    IntegrityCheckFailed { reason: String },
}
