#![forbid(unsafe_code)]

//! Encounter change events.
//!
//! The engine never binds to a host event bus directly. The host pushes
//! [`EncounterEvent`]s into an [`EventQueue`] (or calls the controller's
//! notify entry point straight away) and the runtime drains the queue at
//! frame boundaries. Any bus (hooks, signals, a test harness) can adapt
//! onto this surface.

use std::collections::VecDeque;

use crate::model::ParticipantId;

/// A change notification from the host.
///
/// The engine's only contract is "recompute and re-render or close in
/// response"; payloads carry just enough to trace the trigger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EncounterEvent {
    /// The host finished booting; panels should be created and, if an
    /// encounter is already running, force-rendered.
    Ready,
    /// An encounter was created.
    EncounterCreated,
    /// The encounter's state changed (turn advanced, initiative edited, …).
    EncounterUpdated,
    /// An encounter was deleted. Whether another remains active decides
    /// close versus refresh.
    EncounterDeleted,
    /// A participant joined.
    ParticipantCreated(ParticipantId),
    /// A participant's record changed (including spotlight toggles).
    ParticipantUpdated(ParticipantId),
    /// A participant was removed.
    ParticipantDeleted(ParticipantId),
    /// The host's roster chrome re-rendered; the panels refresh alongside.
    RosterRendered,
    /// The navigation shortcut was activated: show everything or close
    /// everything, based on the aggregate rendered state.
    NavToggle,
}

/// A FIFO buffer of host events, drained once per frame.
#[derive(Debug, Default)]
pub struct EventQueue {
    events: VecDeque<EncounterEvent>,
}

impl EventQueue {
    /// Create an empty queue.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Push an event from the host side.
    pub fn emit(&mut self, event: EncounterEvent) {
        tracing::debug!(?event, "host event queued");
        self.events.push_back(event);
    }

    /// Drain all pending events in arrival order.
    pub fn drain(&mut self) -> Vec<EncounterEvent> {
        self.events.drain(..).collect()
    }

    /// Whether any events are pending.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}
