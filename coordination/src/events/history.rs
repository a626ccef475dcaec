//! In-memory event history.

use std::sync::Mutex;

use super::types::DebateEvent;
use super::EventSink;
use crate::debate::state::{Turn, Verdict};

/// Ordered, in-memory record of every event a run emitted.
#[derive(Debug, Default)]
pub struct EventLog {
    events: Mutex<Vec<DebateEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of all events in emission order.
    pub fn events(&self) -> Vec<DebateEvent> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    /// Event type names in emission order.
    pub fn event_types(&self) -> Vec<&'static str> {
        self.lock().iter().map(DebateEvent::event_type).collect()
    }

    /// Turns carried by `TurnProduced` events.
    pub fn turns(&self) -> Vec<Turn> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                DebateEvent::TurnProduced { turn, .. } => Some(turn.clone()),
                _ => None,
            })
            .collect()
    }

    /// Verdicts carried by `VerdictProduced` events.
    pub fn verdicts(&self) -> Vec<Verdict> {
        self.lock()
            .iter()
            .filter_map(|event| match event {
                DebateEvent::VerdictProduced { verdict, .. } => Some(verdict.clone()),
                _ => None,
            })
            .collect()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<DebateEvent>> {
        // A poisoned log still holds every event pushed before the panic.
        self.events.lock().unwrap_or_else(|e| e.into_inner())
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: DebateEvent) {
        self.lock().push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::state::RoleId;
    use chrono::Utc;

    #[test]
    fn test_records_in_order() {
        let log = EventLog::new();
        assert!(log.is_empty());

        log.emit(DebateEvent::TurnProduced {
            run_id: "r".to_string(),
            turn: Turn::new(RoleId::Scientist, "a", 0),
            timestamp: Utc::now(),
        });
        log.emit(DebateEvent::VerdictProduced {
            run_id: "r".to_string(),
            verdict: Verdict {
                winner: RoleId::Scientist,
                summary: "s".to_string(),
                justification: "j".to_string(),
            },
            timestamp: Utc::now(),
        });

        assert_eq!(log.len(), 2);
        assert_eq!(log.event_types(), vec!["turn_produced", "verdict_produced"]);
        assert_eq!(log.turns()[0].content, "a");
        assert_eq!(log.verdicts()[0].winner, RoleId::Scientist);
    }
}
