//! Debate state: topic, transcript, turn counter, and status.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier for a debate participant's persona.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoleId {
    /// Evidence-driven debater.
    Scientist,
    /// Ethics- and logic-driven debater.
    Philosopher,
    /// Neutral evaluator of the finished transcript.
    Judge,
}

impl RoleId {
    /// The two roles that take ordinary turns.
    pub const DEBATERS: [RoleId; 2] = [RoleId::Scientist, RoleId::Philosopher];

    /// Whether this role takes ordinary turns.
    pub fn is_debater(self) -> bool {
        matches!(self, Self::Scientist | Self::Philosopher)
    }

    /// The opposing debater. The judge has no opponent.
    pub fn opponent(self) -> Option<RoleId> {
        match self {
            Self::Scientist => Some(Self::Philosopher),
            Self::Philosopher => Some(Self::Scientist),
            Self::Judge => None,
        }
    }

    /// Parse a role name, case-insensitively.
    pub fn parse(name: &str) -> Option<RoleId> {
        match name.trim().to_ascii_lowercase().as_str() {
            "scientist" => Some(Self::Scientist),
            "philosopher" => Some(Self::Philosopher),
            "judge" => Some(Self::Judge),
            _ => None,
        }
    }
}

impl std::fmt::Display for RoleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Scientist => write!(f, "Scientist"),
            Self::Philosopher => write!(f, "Philosopher"),
            Self::Judge => write!(f, "Judge"),
        }
    }
}

/// Lifecycle status of the shared debate record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DebateStatus {
    /// Debaters are still taking turns.
    InProgress,
    /// Turn budget spent; waiting for the judge.
    AwaitingJudgment,
    /// Verdict recorded.
    Complete,
}

impl std::fmt::Display for DebateStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InProgress => write!(f, "in_progress"),
            Self::AwaitingJudgment => write!(f, "awaiting_judgment"),
            Self::Complete => write!(f, "complete"),
        }
    }
}

/// One argument, attributed to a debater at a fixed position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke.
    pub speaker: RoleId,
    /// The argument text.
    pub content: String,
    /// Zero-based position in the transcript.
    pub turn_index: u32,
    /// When the turn was produced.
    pub produced_at: DateTime<Utc>,
}

impl Turn {
    pub fn new(speaker: RoleId, content: impl Into<String>, turn_index: u32) -> Self {
        Self {
            speaker,
            content: content.into(),
            turn_index,
            produced_at: Utc::now(),
        }
    }

    /// One-based round number, as shown to humans.
    pub fn round(&self) -> u32 {
        self.turn_index + 1
    }
}

/// The judge's single-winner decision.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Verdict {
    pub winner: RoleId,
    pub summary: String,
    pub justification: String,
}

/// Error for invalid state mutations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid transition in {status}: {reason}")]
pub struct TransitionError {
    /// Status at the time of the rejected mutation.
    pub status: DebateStatus,
    pub reason: String,
}

impl TransitionError {
    fn new(status: DebateStatus, reason: impl Into<String>) -> Self {
        Self {
            status,
            reason: reason.into(),
        }
    }
}

/// Read-only copy of the debate state handed to routers and participants.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateSnapshot {
    pub topic: String,
    pub transcript: Vec<Turn>,
    pub turn_index: u32,
    pub max_turns: u32,
    pub first_speaker: RoleId,
    pub status: DebateStatus,
    pub verdict: Option<Verdict>,
}

impl StateSnapshot {
    /// Who should speak at the current index, ignoring budget and status.
    pub fn expected_speaker(&self) -> RoleId {
        speaker_at(self.first_speaker, self.turn_index)
    }
}

/// Strict alternation starting from `first`.
pub(crate) fn speaker_at(first: RoleId, turn_index: u32) -> RoleId {
    if turn_index % 2 == 0 {
        first
    } else {
        first.opponent().unwrap_or(first)
    }
}

/// The shared debate record. Only the engine holds a mutable handle.
#[derive(Debug, Clone)]
pub struct DebateState {
    topic: String,
    transcript: Vec<Turn>,
    turn_index: u32,
    max_turns: u32,
    first_speaker: RoleId,
    status: DebateStatus,
    verdict: Option<Verdict>,
}

impl DebateState {
    /// Create a fresh state. Validation of the inputs is the engine's job.
    pub fn new(topic: impl Into<String>, max_turns: u32, first_speaker: RoleId) -> Self {
        let status = if max_turns == 0 {
            DebateStatus::AwaitingJudgment
        } else {
            DebateStatus::InProgress
        };
        Self {
            topic: topic.into(),
            transcript: Vec::new(),
            turn_index: 0,
            max_turns,
            first_speaker,
            status,
            verdict: None,
        }
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    pub fn transcript(&self) -> &[Turn] {
        &self.transcript
    }

    pub fn turn_index(&self) -> u32 {
        self.turn_index
    }

    pub fn max_turns(&self) -> u32 {
        self.max_turns
    }

    pub fn first_speaker(&self) -> RoleId {
        self.first_speaker
    }

    pub fn status(&self) -> DebateStatus {
        self.status
    }

    pub fn verdict(&self) -> Option<&Verdict> {
        self.verdict.as_ref()
    }

    /// Who should speak next under strict alternation.
    pub fn expected_speaker(&self) -> RoleId {
        speaker_at(self.first_speaker, self.turn_index)
    }

    /// Ordinary turns left in the budget.
    pub fn remaining_turns(&self) -> u32 {
        self.max_turns.saturating_sub(self.turn_index)
    }

    /// Append a debater's turn, advancing the counter.
    ///
    /// Moves the status to `AwaitingJudgment` when the budget is reached.
    pub fn append_turn(&mut self, turn: Turn) -> Result<(), TransitionError> {
        if self.status != DebateStatus::InProgress {
            return Err(TransitionError::new(
                self.status,
                "turns can only be appended while the debate is in progress",
            ));
        }
        if self.turn_index >= self.max_turns {
            return Err(TransitionError::new(
                self.status,
                format!("turn budget of {} already spent", self.max_turns),
            ));
        }
        if turn.turn_index != self.turn_index {
            return Err(TransitionError::new(
                self.status,
                format!(
                    "turn index {} does not follow {}",
                    turn.turn_index, self.turn_index
                ),
            ));
        }
        let expected = self.expected_speaker();
        if turn.speaker != expected {
            return Err(TransitionError::new(
                self.status,
                format!("expected {} to speak, got {}", expected, turn.speaker),
            ));
        }

        self.transcript.push(turn);
        self.turn_index += 1;
        debug_assert_eq!(self.turn_index as usize, self.transcript.len());

        if self.turn_index >= self.max_turns {
            self.status = DebateStatus::AwaitingJudgment;
        }
        Ok(())
    }

    /// Record the judge's verdict and close the debate.
    pub fn record_verdict(&mut self, verdict: Verdict) -> Result<(), TransitionError> {
        if self.status != DebateStatus::AwaitingJudgment {
            return Err(TransitionError::new(
                self.status,
                "a verdict can only be recorded while awaiting judgment",
            ));
        }
        if !verdict.winner.is_debater() {
            return Err(TransitionError::new(
                self.status,
                format!("{} cannot win the debate", verdict.winner),
            ));
        }
        self.verdict = Some(verdict);
        self.status = DebateStatus::Complete;
        Ok(())
    }

    pub fn snapshot(&self) -> StateSnapshot {
        StateSnapshot {
            topic: self.topic.clone(),
            transcript: self.transcript.clone(),
            turn_index: self.turn_index,
            max_turns: self.max_turns,
            first_speaker: self.first_speaker,
            status: self.status,
            verdict: self.verdict.clone(),
        }
    }

    /// Compact status line.
    pub fn status_line(&self) -> String {
        format!(
            "[{}] turn {}/{} | next={} | topic={}",
            self.status,
            self.turn_index,
            self.max_turns,
            self.expected_speaker(),
            self.topic
        )
    }
}
