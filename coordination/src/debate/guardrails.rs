//! Argument guardrails applied before a turn is committed.

use serde::{Deserialize, Serialize};

use super::state::Turn;

/// Stand-in argument used by [`RepetitionPolicy::Substitute`].
pub const RESTATEMENT_FALLBACK: &str =
    "I will restate my previous point to emphasize its importance.";

/// What to do when a debater repeats an earlier argument verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepetitionPolicy {
    /// Keep the repeated argument.
    Allow,
    /// Replace it with [`RESTATEMENT_FALLBACK`].
    #[default]
    Substitute,
    /// Fail the turn.
    Reject,
}

impl std::fmt::Display for RepetitionPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Allow => write!(f, "allow"),
            Self::Substitute => write!(f, "substitute"),
            Self::Reject => write!(f, "reject"),
        }
    }
}

impl std::str::FromStr for RepetitionPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "allow" => Ok(Self::Allow),
            "substitute" => Ok(Self::Substitute),
            "reject" => Ok(Self::Reject),
            other => Err(format!(
                "unknown repetition policy '{}' (expected allow, substitute or reject)",
                other
            )),
        }
    }
}

/// Configuration for argument guardrails.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GuardrailConfig {
    pub repetition: RepetitionPolicy,
}

/// Outcome of checking a candidate argument.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GuardrailOutcome {
    /// Commit the argument as given.
    Accept(String),
    /// Commit this replacement instead; `repeated_round` is the earlier round.
    Substituted {
        argument: String,
        repeated_round: u32,
    },
    /// Do not commit; the turn fails.
    Rejected { reason: String },
}

impl GuardrailOutcome {
    /// The text to commit, if any.
    pub fn argument(&self) -> Option<&str> {
        match self {
            Self::Accept(argument) | Self::Substituted { argument, .. } => Some(argument),
            Self::Rejected { .. } => None,
        }
    }
}

/// Evaluates candidate arguments against the transcript.
#[derive(Debug, Clone, Default)]
pub struct GuardrailEngine {
    config: GuardrailConfig,
}

impl GuardrailEngine {
    pub fn new(config: GuardrailConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &GuardrailConfig {
        &self.config
    }

    /// Check `candidate` against every earlier turn.
    pub fn evaluate(&self, candidate: String, transcript: &[Turn]) -> GuardrailOutcome {
        let repeated = transcript
            .iter()
            .find(|turn| turn.content.trim() == candidate.trim());

        let Some(earlier) = repeated else {
            return GuardrailOutcome::Accept(candidate);
        };

        match self.config.repetition {
            RepetitionPolicy::Allow => GuardrailOutcome::Accept(candidate),
            RepetitionPolicy::Substitute => GuardrailOutcome::Substituted {
                argument: RESTATEMENT_FALLBACK.to_string(),
                repeated_round: earlier.round(),
            },
            RepetitionPolicy::Reject => GuardrailOutcome::Rejected {
                reason: format!("argument repeats round {} verbatim", earlier.round()),
            },
        }
    }
}
