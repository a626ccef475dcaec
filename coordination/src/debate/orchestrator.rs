//! Debate engine: drives the route → invoke → apply → check loop.
//!
//! Ties together the state record, router, participants and guardrails
//! to run a complete debate end-to-end, reporting every step as an event.

use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};

use super::guardrails::{GuardrailConfig, GuardrailEngine, GuardrailOutcome};
use super::participant::{Participant, ParticipantError, ParticipantOutput};
use super::prompts;
use super::router::{route, Route};
use super::state::{
    DebateState, DebateStatus, RoleId, StateSnapshot, TransitionError, Turn, Verdict,
};
use crate::events::{DebateEvent, EventSink};
use crate::generation::{GenerationError, Generator};

/// Turn budget used when the caller has no preference: four turns each.
pub const DEFAULT_MAX_TURNS: u32 = 8;

/// Phase of a single engine run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnginePhase {
    /// Inputs not yet validated.
    Init,
    /// Debaters are taking turns.
    Debating,
    /// Waiting on the judge.
    Judging,
    /// Verdict recorded.
    Done,
    /// Run halted with an error.
    Failed,
}

impl EnginePhase {
    /// Every phase, in lifecycle order.
    pub const ALL: [EnginePhase; 5] = [
        Self::Init,
        Self::Debating,
        Self::Judging,
        Self::Done,
        Self::Failed,
    ];

    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }

    /// Valid transitions from this phase.
    pub fn valid_transitions(self) -> &'static [EnginePhase] {
        match self {
            Self::Init => &[Self::Debating, Self::Failed],
            Self::Debating => &[Self::Debating, Self::Judging, Self::Failed],
            Self::Judging => &[Self::Done, Self::Failed],
            Self::Done | Self::Failed => &[],
        }
    }
}

impl std::fmt::Display for EnginePhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Init => write!(f, "init"),
            Self::Debating => write!(f, "debating"),
            Self::Judging => write!(f, "judging"),
            Self::Done => write!(f, "done"),
            Self::Failed => write!(f, "failed"),
        }
    }
}

/// Why a run failed.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FailureCause {
    /// Topic, budget or first speaker rejected before the debate began.
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal invariant violation. Indicates an engine defect.
    #[error(transparent)]
    InvalidTransition(#[from] TransitionError),

    #[error("{role} generation failed: {source}")]
    GenerationFailure {
        role: RoleId,
        #[source]
        source: GenerationError,
    },

    #[error("malformed verdict: {reason}")]
    MalformedVerdict { reason: String, raw: String },

    #[error("cancelled")]
    Cancelled,
}

impl From<ParticipantError> for FailureCause {
    fn from(err: ParticipantError) -> Self {
        match err {
            ParticipantError::GenerationFailure { role, source } => {
                Self::GenerationFailure { role, source }
            }
            ParticipantError::MalformedVerdict { reason, raw } => {
                Self::MalformedVerdict { reason, raw }
            }
        }
    }
}

/// Error returned to callers of the engine.
///
/// Carries the cause, the phase the run was in, and the state exactly as
/// it stood when the run halted.
#[derive(Debug, Clone, Error)]
#[error("debate failed during {phase}: {cause}")]
pub struct DebateError {
    #[source]
    pub cause: FailureCause,
    pub phase: EnginePhase,
    pub state: StateSnapshot,
}

impl DebateError {
    /// Turns accumulated before the failure.
    pub fn transcript(&self) -> &[Turn] {
        &self.state.transcript
    }

    pub fn is_cancelled(&self) -> bool {
        self.cause == FailureCause::Cancelled
    }
}

/// A finished run: final state plus the verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompletedDebate {
    pub state: StateSnapshot,
    pub verdict: Verdict,
}

/// Configuration for the debate engine.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DebateConfig {
    pub guardrails: GuardrailConfig,
}

/// Sequential driver for debate runs.
///
/// Each run owns its own [`DebateState`]; the engine itself holds only the
/// collaborators, so one engine can serve any number of runs.
pub struct DebateEngine {
    generator: Arc<dyn Generator>,
    sink: Arc<dyn EventSink>,
    guardrails: GuardrailEngine,
    cancel: CancellationToken,
}

impl DebateEngine {
    pub fn new(generator: Arc<dyn Generator>, sink: Arc<dyn EventSink>) -> Self {
        Self::with_config(generator, sink, DebateConfig::default())
    }

    pub fn with_config(
        generator: Arc<dyn Generator>,
        sink: Arc<dyn EventSink>,
        config: DebateConfig,
    ) -> Self {
        Self {
            generator,
            sink,
            guardrails: GuardrailEngine::new(config.guardrails),
            cancel: CancellationToken::new(),
        }
    }

    /// Use an externally owned cancellation token.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Token that aborts in-flight and future runs when cancelled.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Run a debate and return the judge's verdict.
    pub async fn run_debate(
        &self,
        topic: &str,
        max_turns: u32,
        first_speaker: RoleId,
    ) -> Result<Verdict, DebateError> {
        self.run(topic, max_turns, first_speaker)
            .await
            .map(|done| done.verdict)
    }

    /// Run a debate under a fresh run ID and return the full final state.
    pub async fn run(
        &self,
        topic: &str,
        max_turns: u32,
        first_speaker: RoleId,
    ) -> Result<CompletedDebate, DebateError> {
        let run_id = DebateEvent::new_run_id();
        self.run_with_id(&run_id, topic, max_turns, first_speaker)
            .await
    }

    /// Run a debate under a caller-chosen run ID.
    pub async fn run_with_id(
        &self,
        run_id: &str,
        topic: &str,
        max_turns: u32,
        first_speaker: RoleId,
    ) -> Result<CompletedDebate, DebateError> {
        let span = tracing::info_span!("debate", run_id = %run_id);
        let mut run = Run {
            run_id: run_id.to_string(),
            phase: EnginePhase::Init,
            state: DebateState::new(topic.trim(), max_turns, first_speaker),
        };
        self.drive(&mut run).instrument(span).await
    }

    async fn drive(&self, run: &mut Run) -> Result<CompletedDebate, DebateError> {
        let validated = validate(
            run.state.topic(),
            run.state.max_turns(),
            run.state.first_speaker(),
        );
        if let Err(reason) = validated {
            return Err(self.fail(run, FailureCause::InvalidConfig(reason)));
        }

        run.advance(EnginePhase::Debating);
        info!(
            max_turns = run.state.max_turns(),
            first_speaker = %run.state.first_speaker(),
            topic = %run.state.topic(),
            prompt_version = prompts::PROMPT_VERSION,
            "debate started"
        );
        self.sink.emit(DebateEvent::DebateStarted {
            run_id: run.run_id.clone(),
            topic: run.state.topic().to_string(),
            max_turns: run.state.max_turns(),
            first_speaker: run.state.first_speaker(),
            timestamp: Utc::now(),
        });

        loop {
            if self.cancel.is_cancelled() {
                return Err(self.fail(run, FailureCause::Cancelled));
            }

            let snapshot = run.state.snapshot();
            let role = match route(&snapshot) {
                Route::NextSpeaker(role) => role,
                Route::Terminal => break,
            };
            debug!(status = %run.state.status_line(), "routing to {}", role);

            let argument = match self.invoke(Participant::for_role(role), &snapshot).await {
                Ok(ParticipantOutput::Argument(argument)) => argument,
                Ok(ParticipantOutput::Verdict(_)) => {
                    let cause = TransitionError {
                        status: snapshot.status,
                        reason: format!("{} returned a verdict instead of an argument", role),
                    };
                    return Err(self.fail(run, cause.into()));
                }
                Err(cause) => return Err(self.fail(run, cause)),
            };

            let argument = match self.guardrails.evaluate(argument, &snapshot.transcript) {
                GuardrailOutcome::Accept(argument) => argument,
                GuardrailOutcome::Substituted {
                    argument,
                    repeated_round,
                } => {
                    warn!(speaker = %role, repeated_round, "repeated argument substituted");
                    argument
                }
                GuardrailOutcome::Rejected { reason } => {
                    let cause = FailureCause::GenerationFailure {
                        role,
                        source: GenerationError::Unusable(reason),
                    };
                    return Err(self.fail(run, cause));
                }
            };

            let turn = Turn::new(role, argument, snapshot.turn_index);
            if let Err(e) = run.state.append_turn(turn.clone()) {
                return Err(self.fail(run, e.into()));
            }
            run.advance(EnginePhase::Debating);
            info!(round = turn.round(), speaker = %role, "turn produced");
            self.sink.emit(DebateEvent::TurnProduced {
                run_id: run.run_id.clone(),
                turn,
                timestamp: Utc::now(),
            });
        }

        run.advance(EnginePhase::Judging);
        if run.state.status() != DebateStatus::AwaitingJudgment {
            let cause = TransitionError {
                status: run.state.status(),
                reason: "router ended the debate before the turn budget was spent".to_string(),
            };
            return Err(self.fail(run, cause.into()));
        }
        if self.cancel.is_cancelled() {
            return Err(self.fail(run, FailureCause::Cancelled));
        }
        info!(turns = run.state.turn_index(), "debate awaiting judgment");

        let snapshot = run.state.snapshot();
        let verdict = match self.invoke(Participant::for_role(RoleId::Judge), &snapshot).await {
            Ok(ParticipantOutput::Verdict(verdict)) => verdict,
            Ok(ParticipantOutput::Argument(_)) => {
                let cause = TransitionError {
                    status: snapshot.status,
                    reason: "judge returned an argument instead of a verdict".to_string(),
                };
                return Err(self.fail(run, cause.into()));
            }
            Err(cause) => return Err(self.fail(run, cause)),
        };

        if let Err(e) = run.state.record_verdict(verdict.clone()) {
            return Err(self.fail(run, e.into()));
        }
        run.advance(EnginePhase::Done);
        info!(winner = %verdict.winner, "verdict recorded");
        self.sink.emit(DebateEvent::VerdictProduced {
            run_id: run.run_id.clone(),
            verdict: verdict.clone(),
            timestamp: Utc::now(),
        });

        Ok(CompletedDebate {
            state: run.state.snapshot(),
            verdict,
        })
    }

    /// Invoke one participant, racing it against cancellation.
    async fn invoke(
        &self,
        participant: Participant,
        snapshot: &StateSnapshot,
    ) -> Result<ParticipantOutput, FailureCause> {
        tokio::select! {
            biased;
            _ = self.cancel.cancelled() => {
                warn!(role = %participant.role(), "generation cancelled; discarding partial turn");
                Err(FailureCause::Cancelled)
            }
            result = participant.invoke(&*self.generator, snapshot) => {
                result.map_err(FailureCause::from)
            }
        }
    }

    /// Halt the run: emit `RunFailed` and build the caller's error.
    fn fail(&self, run: &mut Run, cause: FailureCause) -> DebateError {
        let failed_in = run.phase;
        run.advance(EnginePhase::Failed);
        warn!(
            phase = %failed_in,
            turns = run.state.turn_index(),
            error = %cause,
            "debate run failed"
        );
        self.sink.emit(DebateEvent::RunFailed {
            run_id: run.run_id.clone(),
            reason: cause.to_string(),
            partial_transcript: run.state.transcript().to_vec(),
            timestamp: Utc::now(),
        });
        DebateError {
            cause,
            phase: failed_in,
            state: run.state.snapshot(),
        }
    }
}

/// Per-run bookkeeping. Dropped when the run returns.
struct Run {
    run_id: String,
    phase: EnginePhase,
    state: DebateState,
}

impl Run {
    fn advance(&mut self, to: EnginePhase) {
        debug_assert!(
            self.phase.valid_transitions().contains(&to),
            "invalid engine transition {} → {}",
            self.phase,
            to
        );
        debug!(from = %self.phase, to = %to, "engine transition");
        self.phase = to;
    }
}

fn validate(topic: &str, max_turns: u32, first_speaker: RoleId) -> Result<(), String> {
    if topic.is_empty() {
        return Err("topic must not be blank".to_string());
    }
    if max_turns == 0 {
        return Err("max_turns must be at least 1".to_string());
    }
    if !first_speaker.is_debater() {
        return Err(format!("{} cannot open the debate", first_speaker));
    }
    Ok(())
}
