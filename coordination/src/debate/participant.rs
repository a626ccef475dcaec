//! Participants: the debaters and the judge.
//!
//! Personas are a closed set of variants sharing one capability,
//! [`Participant::invoke`]. The router and engine only ever see a
//! [`RoleId`], so adding a persona never touches the control loop.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::prompts;
use super::state::{RoleId, StateSnapshot, Verdict};
use crate::generation::{GenerationError, Generator};

/// Failure of a single participant invocation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParticipantError {
    /// The generator failed or produced nothing usable.
    #[error("{role} generation failed: {source}")]
    GenerationFailure {
        role: RoleId,
        #[source]
        source: GenerationError,
    },

    /// The judge's output did not have the required shape.
    #[error("malformed verdict: {reason}")]
    MalformedVerdict { reason: String, raw: String },
}

/// What a participant hands back to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ParticipantOutput {
    /// A debater's argument (trimmed, non-empty).
    Argument(String),
    /// The judge's decision.
    Verdict(Verdict),
}

/// A debating persona facing a fixed opponent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Debater {
    role: RoleId,
    opponent: RoleId,
}

impl Debater {
    /// `None` for the judge, who does not debate.
    pub fn new(role: RoleId) -> Option<Self> {
        let opponent = role.opponent()?;
        Some(Self { role, opponent })
    }

    pub fn role(&self) -> RoleId {
        self.role
    }

    pub fn opponent(&self) -> RoleId {
        self.opponent
    }

    /// Produce the next argument from the transcript so far.
    pub async fn argue(
        &self,
        generator: &dyn Generator,
        state: &StateSnapshot,
    ) -> Result<String, ParticipantError> {
        let prompt =
            prompts::debater_prompt(self.role, self.opponent, &state.topic, &state.transcript);
        let raw = generator
            .generate(&prompt)
            .await
            .map_err(|source| ParticipantError::GenerationFailure {
                role: self.role,
                source,
            })?;

        let argument = raw.trim();
        if argument.is_empty() {
            return Err(ParticipantError::GenerationFailure {
                role: self.role,
                source: GenerationError::Empty,
            });
        }
        Ok(argument.to_string())
    }
}

/// The neutral evaluator. Must pick one of two contenders; no draws.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Judge {
    contenders: [RoleId; 2],
}

impl Default for Judge {
    fn default() -> Self {
        Self {
            contenders: RoleId::DEBATERS,
        }
    }
}

impl Judge {
    pub fn contenders(&self) -> [RoleId; 2] {
        self.contenders
    }

    /// Evaluate the full transcript and return a validated verdict.
    pub async fn judge(
        &self,
        generator: &dyn Generator,
        state: &StateSnapshot,
    ) -> Result<Verdict, ParticipantError> {
        let prompt = prompts::judge_prompt(&state.topic, &state.transcript);
        let raw = generator
            .generate(&prompt)
            .await
            .map_err(|source| ParticipantError::GenerationFailure {
                role: RoleId::Judge,
                source,
            })?;

        if raw.trim().is_empty() {
            return Err(ParticipantError::GenerationFailure {
                role: RoleId::Judge,
                source: GenerationError::Empty,
            });
        }
        self.parse_verdict(&raw)
    }

    /// Parse `SUMMARY:` / `WINNER:` / `JUSTIFICATION:` sections.
    pub fn parse_verdict(&self, raw: &str) -> Result<Verdict, ParticipantError> {
        let malformed = |reason: String| ParticipantError::MalformedVerdict {
            reason,
            raw: raw.to_string(),
        };

        let locate = |marker: &str| {
            find_marker(raw, marker)
                .ok_or_else(|| malformed(format!("missing {} section", marker)))
        };
        let (summary_start, summary_body) = locate("SUMMARY:")?;
        let (winner_start, winner_body) = locate("WINNER:")?;
        let (justification_start, justification_body) = locate("JUSTIFICATION:")?;

        if !(summary_start < winner_start && winner_start < justification_start) {
            return Err(malformed(
                "sections must appear as SUMMARY, WINNER, JUSTIFICATION".to_string(),
            ));
        }

        let summary = clean_section(&raw[summary_body..winner_start]);
        let winner_text = clean_winner(&raw[winner_body..justification_start]);
        let justification = clean_section(&raw[justification_body..]);

        if summary.is_empty() {
            return Err(malformed("empty summary".to_string()));
        }
        if justification.is_empty() {
            return Err(malformed("empty justification".to_string()));
        }

        let winner = RoleId::parse(winner_text)
            .filter(|role| self.contenders.contains(role))
            .ok_or_else(|| {
                malformed(format!(
                    "winner '{}' is not one of {} or {}",
                    winner_text, self.contenders[0], self.contenders[1]
                ))
            })?;

        Ok(Verdict {
            winner,
            summary: summary.to_string(),
            justification: justification.to_string(),
        })
    }
}

/// Byte range of the first `marker` that opens a line, ignoring case and any
/// leading whitespace or markdown emphasis. Returns (line start, body start).
fn find_marker(raw: &str, marker: &str) -> Option<(usize, usize)> {
    let mut offset = 0;
    for line in raw.split_inclusive('\n') {
        let rest = line.trim_start_matches(|c: char| c.is_whitespace() || matches!(c, '*' | '#'));
        let lead = line.len() - rest.len();
        let opens = rest
            .get(..marker.len())
            .is_some_and(|head| head.eq_ignore_ascii_case(marker));
        if opens {
            return Some((offset, offset + lead + marker.len()));
        }
        offset += line.len();
    }
    None
}

fn clean_section(text: &str) -> &str {
    text.trim_matches(|c: char| c.is_whitespace() || c == '*')
}

fn clean_winner(text: &str) -> &str {
    text.trim_matches(|c: char| {
        c.is_whitespace() || matches!(c, '*' | '[' | ']' | '"' | '\'' | '.' | '!' | '(' | ')')
    })
}

/// Tagged persona: the single capability the engine dispatches on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Participant {
    Debater(Debater),
    Judge(Judge),
}

impl Participant {
    /// The participant that plays `role`.
    pub fn for_role(role: RoleId) -> Self {
        match Debater::new(role) {
            Some(debater) => Self::Debater(debater),
            None => Self::Judge(Judge::default()),
        }
    }

    pub fn role(&self) -> RoleId {
        match self {
            Self::Debater(debater) => debater.role(),
            Self::Judge(_) => RoleId::Judge,
        }
    }

    /// Run this participant against a read-only snapshot.
    pub async fn invoke(
        &self,
        generator: &dyn Generator,
        state: &StateSnapshot,
    ) -> Result<ParticipantOutput, ParticipantError> {
        match self {
            Self::Debater(debater) => debater
                .argue(generator, state)
                .await
                .map(ParticipantOutput::Argument),
            Self::Judge(judge) => judge
                .judge(generator, state)
                .await
                .map(ParticipantOutput::Verdict),
        }
    }
}
