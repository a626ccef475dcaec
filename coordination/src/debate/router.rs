//! Router: picks the next speaker or signals that judging should begin.

use serde::{Deserialize, Serialize};

use super::state::{speaker_at, DebateStatus, RoleId, StateSnapshot};

/// Routing decision for the engine loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Route {
    /// This debater speaks next.
    NextSpeaker(RoleId),
    /// No more ordinary turns; hand off to the judge.
    Terminal,
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NextSpeaker(role) => write!(f, "next_speaker({})", role),
            Self::Terminal => write!(f, "terminal"),
        }
    }
}

/// Decide what happens next. Reads only status, turn index, budget and the
/// first speaker.
pub fn route(state: &StateSnapshot) -> Route {
    if state.status != DebateStatus::InProgress {
        return Route::Terminal;
    }
    if state.turn_index >= state.max_turns {
        return Route::Terminal;
    }
    Route::NextSpeaker(speaker_at(state.first_speaker, state.turn_index))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debate::state::{DebateState, Turn};

    fn snapshot(max_turns: u32, first: RoleId) -> StateSnapshot {
        DebateState::new("topic", max_turns, first).snapshot()
    }

    #[test]
    fn test_first_speaker_opens() {
        assert_eq!(
            route(&snapshot(4, RoleId::Scientist)),
            Route::NextSpeaker(RoleId::Scientist)
        );
        assert_eq!(
            route(&snapshot(4, RoleId::Philosopher)),
            Route::NextSpeaker(RoleId::Philosopher)
        );
    }

    #[test]
    fn test_alternates_by_parity() {
        let mut snap = snapshot(8, RoleId::Scientist);
        let expected = [
            RoleId::Scientist,
            RoleId::Philosopher,
            RoleId::Scientist,
            RoleId::Philosopher,
        ];
        for (i, role) in expected.iter().enumerate() {
            snap.turn_index = i as u32;
            assert_eq!(route(&snap), Route::NextSpeaker(*role));
        }
    }

    #[test]
    fn test_budget_exhausted_is_terminal() {
        let mut snap = snapshot(2, RoleId::Scientist);
        snap.turn_index = 2;
        assert_eq!(route(&snap), Route::Terminal);
    }

    #[test]
    fn test_non_in_progress_is_terminal() {
        let mut snap = snapshot(8, RoleId::Scientist);
        snap.status = DebateStatus::AwaitingJudgment;
        assert_eq!(route(&snap), Route::Terminal);
        snap.status = DebateStatus::Complete;
        assert_eq!(route(&snap), Route::Terminal);
    }

    #[test]
    fn test_deterministic_and_content_blind() {
        let mut state = DebateState::new("topic", 6, RoleId::Philosopher);
        state
            .append_turn(Turn::new(RoleId::Philosopher, "opening", 0))
            .unwrap();
        let snap = state.snapshot();
        assert_eq!(route(&snap), route(&snap));

        let mut other = snap.clone();
        other.topic = "something else".to_string();
        other.transcript[0].content = "different words".to_string();
        assert_eq!(route(&snap), route(&other));
        assert_eq!(route(&snap), Route::NextSpeaker(RoleId::Scientist));
    }

    #[test]
    fn test_route_display() {
        assert_eq!(
            Route::NextSpeaker(RoleId::Scientist).to_string(),
            "next_speaker(Scientist)"
        );
        assert_eq!(Route::Terminal.to_string(), "terminal");
    }
}
