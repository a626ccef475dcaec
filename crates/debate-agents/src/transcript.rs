//! Transcript collaborator: mirrors engine events to a log file and the console.

use std::fs::File;
use std::io::{self, Write};
use std::path::Path;
use std::sync::Mutex;

use chrono::Utc;
use debate_coordination::{DebateEvent, EventSink};
use tokio::sync::broadcast::{self, error::RecvError};
use tracing::warn;

/// Writes every event as a timestamped log line and renders the
/// transcript and verdict for a human reader.
pub struct Transcript {
    log: Mutex<Box<dyn Write + Send>>,
    console: Mutex<Box<dyn Write + Send>>,
}

impl Transcript {
    pub fn new(log: Box<dyn Write + Send>, console: Box<dyn Write + Send>) -> Self {
        Self {
            log: Mutex::new(log),
            console: Mutex::new(console),
        }
    }

    /// Truncate `path` and log there, printing to stdout.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = File::create(path)?;
        Ok(Self::new(Box::new(file), Box::new(io::stdout())))
    }

    /// Mirror events from `rx` until the run's final event or the bus closes.
    pub async fn follow(self, mut rx: broadcast::Receiver<DebateEvent>) {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    let last = event.is_final();
                    self.emit(event);
                    if last {
                        break;
                    }
                }
                Err(RecvError::Lagged(skipped)) => self.note_gap(skipped),
                Err(RecvError::Closed) => break,
            }
        }
    }

    /// Record in the log that events were lost to a slow subscriber.
    pub fn note_gap(&self, skipped: u64) {
        warn!(skipped, "transcript fell behind");
        let line = format!(
            "{} - transcript_gap - skipped {} events\n",
            Utc::now().to_rfc3339(),
            skipped
        );
        if let Err(e) = write_locked(&self.log, &line) {
            warn!(error = %e, "failed to write transcript log");
        }
    }

    fn log_line(event: &DebateEvent) -> String {
        let message = match event {
            DebateEvent::DebateStarted {
                topic,
                max_turns,
                first_speaker,
                ..
            } => format!(
                "Debate topic: {} ({} turns, {} opens)",
                topic, max_turns, first_speaker
            ),
            DebateEvent::TurnProduced { turn, .. } => format!(
                "[Round {}] {}: {}",
                turn.round(),
                turn.speaker,
                turn.content
            ),
            DebateEvent::VerdictProduced { verdict, .. } => format!(
                "Final summary: {} | Winner: {} | Justification: {}",
                verdict.summary, verdict.winner, verdict.justification
            ),
            DebateEvent::RunFailed {
                reason,
                partial_transcript,
                ..
            } => format!(
                "Debate failed after {} turns: {}",
                partial_transcript.len(),
                reason
            ),
        };
        format!(
            "{} - {} - {} - {}",
            event.timestamp().to_rfc3339(),
            event.run_id(),
            event.event_type(),
            message
        )
    }

    fn console_text(event: &DebateEvent) -> Option<String> {
        match event {
            DebateEvent::DebateStarted { .. } => {
                Some("\nStarting debate between Scientist and Philosopher...\n".to_string())
            }
            DebateEvent::TurnProduced { turn, .. } => Some(format!(
                "[Round {}] {}: {}\n",
                turn.round(),
                turn.speaker,
                turn.content
            )),
            DebateEvent::VerdictProduced { verdict, .. } => Some(format!(
                "\n--- Debate Concluded ---\n\n[Judge] Summary of debate:\n{}\n\n[Judge] Winner: {}\n[Judge] Reason: {}\n",
                verdict.summary, verdict.winner, verdict.justification
            )),
            DebateEvent::RunFailed { reason, .. } => {
                Some(format!("\n--- Debate Aborted ---\n{}\n", reason))
            }
        }
    }
}

fn write_locked(target: &Mutex<Box<dyn Write + Send>>, text: &str) -> io::Result<()> {
    let mut out = target.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
    out.write_all(text.as_bytes())?;
    out.flush()
}

impl EventSink for Transcript {
    fn emit(&self, event: DebateEvent) {
        let line = format!("{}\n", Self::log_line(&event));
        if let Err(e) = write_locked(&self.log, &line) {
            warn!(error = %e, "failed to write transcript log");
        }
        if let Some(text) = Self::console_text(&event) {
            if let Err(e) = write_locked(&self.console, &text) {
                warn!(error = %e, "failed to write transcript to console");
            }
        }
    }
}
