//! Structured events for persistence and display collaborators.
//!
//! The engine never writes files or formats text for humans. It emits an
//! ordered stream of [`DebateEvent`]s into an [`EventSink`]:
//!
//! ```text
//! DebateStarted → TurnProduced × N → VerdictProduced
//!                              └───→ RunFailed
//! ```
//!
//! Sinks provided here:
//! - [`EventBus`]: broadcast fan-out to async subscribers.
//! - [`EventLog`]: in-memory ordered record.
//! - [`NullSink`]: drops everything.

pub mod bus;
pub mod history;
pub mod types;

pub use bus::{EventBus, SharedEventBus};
pub use history::EventLog;
pub use types::{DebateEvent, RunId};

use std::sync::Arc;

/// Receiver of engine events. Called synchronously, in order.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: DebateEvent);
}

impl<S: EventSink + ?Sized> EventSink for Arc<S> {
    fn emit(&self, event: DebateEvent) {
        (**self).emit(event);
    }
}

/// Sink that discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: DebateEvent) {}
}
