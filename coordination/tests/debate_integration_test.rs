//! Mocked debate integration test: exercises the full debate loop
//! with deterministic scripted generators (no LLM calls).
//!
//! Covers: engine ↔ router ↔ participants ↔ events ↔ run records
//! running together in a single pass.

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use debate_coordination::debate::{DebateRecord, DEFAULT_MAX_TURNS};
use debate_coordination::{
    DebateEngine, DebateEvent, DebateStatus, EnginePhase, EventBus, EventLog, FailureCause,
    GenerationError, Generator, Prompt, RoleId, TimeoutGenerator,
};

/// Helper: a generator that answers like the real personas would,
/// keyed on the turn request in the user message.
struct PersonaScript {
    winner: &'static str,
    prompts: Mutex<Vec<Prompt>>,
}

impl PersonaScript {
    fn new(winner: &'static str) -> Self {
        Self {
            winner,
            prompts: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl Generator for PersonaScript {
    async fn generate(&self, prompt: &Prompt) -> Result<String, GenerationError> {
        let n = {
            let mut prompts = self.prompts.lock().unwrap();
            prompts.push(prompt.clone());
            prompts.len()
        };
        if prompt.user.contains("Scientist") {
            Ok(format!("Measured claim number {}.", n))
        } else if prompt.user.contains("Philosopher") {
            Ok(format!("Conceptual claim number {}.", n))
        } else {
            Ok(format!(
                "SUMMARY: Eight rounds on agency.\nWINNER: {}\nJUSTIFICATION: Clearer throughout.",
                self.winner
            ))
        }
    }
}

/// Helper: replays fixed replies, then errors.
struct Replay(Mutex<VecDeque<Result<String, GenerationError>>>);

impl Replay {
    fn new(replies: Vec<Result<String, GenerationError>>) -> Self {
        Self(Mutex::new(replies.into()))
    }
}

#[async_trait]
impl Generator for Replay {
    async fn generate(&self, _prompt: &Prompt) -> Result<String, GenerationError> {
        self.0
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(Err(GenerationError::Empty))
    }
}

/// Helper: never finishes within any reasonable deadline.
struct Stalled;

#[async_trait]
impl Generator for Stalled {
    async fn generate(&self, _prompt: &Prompt) -> Result<String, GenerationError> {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok("too late".to_string())
    }
}

// ── End-to-end: free will, eight turns ─────────────────────────────

#[tokio::test]
async fn test_free_will_debate_end_to_end() {
    let gen = Arc::new(PersonaScript::new("Philosopher"));
    let log = Arc::new(EventLog::new());
    let engine = DebateEngine::new(gen.clone(), log.clone());

    let verdict = engine
        .run_debate("Is free will an illusion?", DEFAULT_MAX_TURNS, RoleId::Scientist)
        .await
        .unwrap();
    assert!(RoleId::DEBATERS.contains(&verdict.winner));
    assert_eq!(verdict.winner, RoleId::Philosopher);

    let turns = log.turns();
    assert_eq!(turns.len(), 8);
    for (i, turn) in turns.iter().enumerate() {
        let expected = if i % 2 == 0 {
            RoleId::Scientist
        } else {
            RoleId::Philosopher
        };
        assert_eq!(turn.speaker, expected, "turn {}", i);
        assert_eq!(turn.turn_index as usize, i);
    }
    assert_eq!(
        turns.iter().filter(|t| t.speaker == RoleId::Scientist).count(),
        4
    );
    assert_eq!(log.verdicts().len(), 1);

    // Every participant saw the complete prior transcript.
    let prompts = gen.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 9);
    assert!(prompts[0].system.contains("The debate has not started yet."));
    assert!(prompts[7].system.contains("[Round 7] Scientist: Measured claim number 7."));
    assert!(prompts[8].system.contains("[Round 8] Philosopher: Conceptual claim number 8."));
}

// ── Event ordering through the broadcast bus ───────────────────────

#[tokio::test]
async fn test_events_stream_in_order_over_bus() {
    let bus = EventBus::new().shared();
    let mut rx = bus.subscribe();
    let engine = DebateEngine::new(Arc::new(PersonaScript::new("Scientist")), bus.clone());

    engine
        .run("Should we colonize Mars?", 4, RoleId::Philosopher)
        .await
        .unwrap();

    let mut types = Vec::new();
    while let Ok(event) = rx.try_recv() {
        types.push(event.event_type());
        if event.is_final() {
            break;
        }
    }
    assert_eq!(
        types,
        vec![
            "debate_started",
            "turn_produced",
            "turn_produced",
            "turn_produced",
            "turn_produced",
            "verdict_produced"
        ]
    );
}

// ── Failure on turn 3 of 8 ─────────────────────────────────────────

#[tokio::test]
async fn test_failure_on_third_turn_preserves_two_turns() {
    let log = Arc::new(EventLog::new());
    let engine = DebateEngine::new(
        Arc::new(Replay::new(vec![
            Ok("first".to_string()),
            Ok("second".to_string()),
            Err(GenerationError::Status {
                status: 503,
                body: "overloaded".to_string(),
            }),
        ])),
        log.clone(),
    );

    let err = engine
        .run_debate("Is free will an illusion?", 8, RoleId::Scientist)
        .await
        .unwrap_err();

    assert_eq!(err.transcript().len(), 2);
    assert_eq!(err.state.status, DebateStatus::InProgress);
    assert_eq!(err.phase, EnginePhase::Debating);
    assert!(matches!(err.cause, FailureCause::GenerationFailure { .. }));

    let events = log.events();
    assert_eq!(events.len(), 4);
    match events.last().unwrap() {
        DebateEvent::RunFailed {
            partial_transcript, ..
        } => assert_eq!(partial_transcript.len(), 2),
        other => panic!("unexpected final event {:?}", other),
    }
}

// ── Malformed judge output ─────────────────────────────────────────

#[tokio::test]
async fn test_invalid_winner_is_malformed_verdict() {
    let engine = DebateEngine::new(
        Arc::new(Replay::new(vec![
            Ok("a".to_string()),
            Ok("b".to_string()),
            Ok("SUMMARY: even\nWINNER: Tie\nJUSTIFICATION: both good".to_string()),
        ])),
        Arc::new(EventLog::new()),
    );
    let err = engine.run("topic", 2, RoleId::Scientist).await.unwrap_err();
    assert!(matches!(err.cause, FailureCause::MalformedVerdict { .. }));
    assert_ne!(err.state.status, DebateStatus::Complete);
}

// ── Externally imposed timeout ─────────────────────────────────────

#[tokio::test(start_paused = true)]
async fn test_timeout_wrapper_fails_run() {
    let gen = TimeoutGenerator::new(Stalled, Duration::from_secs(30));
    let engine = DebateEngine::new(Arc::new(gen), Arc::new(EventLog::new()));
    let err = engine.run("topic", 2, RoleId::Scientist).await.unwrap_err();
    assert_eq!(
        err.cause,
        FailureCause::GenerationFailure {
            role: RoleId::Scientist,
            source: GenerationError::Timeout(Duration::from_secs(30)),
        }
    );
    assert!(err.transcript().is_empty());
}

// ── External cancellation while a call is in flight ────────────────

#[tokio::test(start_paused = true)]
async fn test_external_cancel_aborts_between_turns() {
    let engine = Arc::new(DebateEngine::new(
        Arc::new(Stalled),
        Arc::new(EventLog::new()),
    ));
    let token = engine.cancellation_token();

    let runner = engine.clone();
    let handle = tokio::spawn(async move { runner.run("topic", 4, RoleId::Scientist).await });

    tokio::time::sleep(Duration::from_secs(5)).await;
    token.cancel();

    let err = handle.await.unwrap().unwrap_err();
    assert!(err.is_cancelled());
    assert!(err.transcript().is_empty());
}

// ── Run records ────────────────────────────────────────────────────

#[tokio::test]
async fn test_record_round_trip() {
    let engine = DebateEngine::new(
        Arc::new(PersonaScript::new("Scientist")),
        Arc::new(EventLog::new()),
    );
    let done = engine
        .run_with_id("run-42", "topic", 2, RoleId::Scientist)
        .await
        .unwrap();

    let record = DebateRecord::completed("run-42", &done);
    let restored = DebateRecord::from_json(&record.to_json().unwrap()).unwrap();
    assert!(restored.is_complete());
    assert_eq!(restored.state.transcript, done.state.transcript);
    assert_eq!(restored.verdict.unwrap().winner, RoleId::Scientist);
}
