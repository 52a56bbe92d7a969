#![forbid(unsafe_code)]

//! The panel registry: idempotent creation and bulk lifecycle fan-out.
//!
//! The registry is an explicit object owned by the composition root and
//! injected wherever panels are reached, never module-level state, so
//! tests can construct isolated registries.
//!
//! `render_all`/`close_all` fan the single-panel operation out to every
//! registered instance independently: one panel's failure neither cancels
//! nor hides its siblings' outcomes. Each call returns a [`BulkTicket`]
//! that settles only once every targeted operation reached a terminal
//! state; for closes, that includes the exit animation.

use std::time::Duration;

use limelight_core::MotionPolicy;
use limelight_core::model::{EncounterSnapshot, ParticipantId, SpotlightUpdate};
use limelight_core::order::compute_rows;
use limelight_render::TemplateRenderer;

use crate::panel::{PanelConfig, PanelError, PanelId, PanelInstance};

/// Options for a bulk render.
#[derive(Debug, Clone, Copy, Default)]
pub struct RenderOptions {
    /// Mount panels that are not currently visible. Without this, only
    /// already-visible panels refresh.
    pub force: bool,
}

/// Per-panel outcome of a bulk operation.
#[derive(Debug)]
pub struct BulkOutcome {
    pub panel: PanelId,
    pub result: Result<(), PanelError>,
}

/// Settled-when-all-complete handle for a bulk operation.
///
/// Immediate per-panel results (e.g. template failures) are in
/// `outcomes`; animation completion is tracked against the registry with
/// [`PanelRegistry::is_settled`].
#[derive(Debug)]
pub struct BulkTicket {
    entries: Vec<(PanelId, u64)>,
    pub outcomes: Vec<BulkOutcome>,
}

impl BulkTicket {
    /// Panels targeted by this operation.
    #[must_use]
    pub fn panels(&self) -> impl Iterator<Item = &PanelId> {
        self.entries.iter().map(|(id, _)| id)
    }

    /// Whether any panel reported an immediate failure.
    #[must_use]
    pub fn has_failures(&self) -> bool {
        self.outcomes.iter().any(|o| o.result.is_err())
    }
}

/// Registry of the live panel instances.
#[derive(Debug, Default)]
pub struct PanelRegistry {
    panels: Vec<PanelInstance>,
}

impl PanelRegistry {
    /// An empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create the panel for `config`'s faction, or return the existing
    /// instance's id: creation is idempotent per derived id, including
    /// re-entrant calls made while a render is in flight.
    pub fn create(&mut self, config: PanelConfig, policy: &MotionPolicy) -> PanelId {
        let id = PanelId::for_faction(config.faction);
        if self.panels.iter().any(|p| p.id() == &id) {
            tracing::debug!(panel = %id, "create: returning existing instance");
            return id;
        }
        tracing::debug!(panel = %id, mount = %config.mount, "create: registering panel");
        self.panels.push(PanelInstance::new(config, policy));
        id
    }

    /// Look up a panel by id.
    #[must_use]
    pub fn get(&self, id: &PanelId) -> Option<&PanelInstance> {
        self.panels.iter().find(|p| p.id() == id)
    }

    /// Mutable lookup by id.
    pub fn get_mut(&mut self, id: &PanelId) -> Option<&mut PanelInstance> {
        self.panels.iter_mut().find(|p| p.id() == id)
    }

    /// Iterate panels in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &PanelInstance> {
        self.panels.iter()
    }

    /// Number of registered panels.
    #[must_use]
    pub fn len(&self) -> usize {
        self.panels.len()
    }

    /// Whether no panels are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.panels.is_empty()
    }

    /// True only if every registered panel is fully rendered.
    ///
    /// Vacuously true for an empty registry, matching the aggregate's use
    /// as a "show or hide everything" toggle input.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.panels.iter().all(PanelInstance::is_rendered)
    }

    /// Render every panel from one snapshot, collecting every outcome.
    pub fn render_all(
        &mut self,
        options: RenderOptions,
        snapshot: Option<&EncounterSnapshot>,
        viewer_is_privileged: bool,
        renderer: &dyn TemplateRenderer,
        policy: &MotionPolicy,
    ) -> BulkTicket {
        let mut entries = Vec::with_capacity(self.panels.len());
        let mut outcomes = Vec::with_capacity(self.panels.len());
        for panel in &mut self.panels {
            let rows = compute_rows(snapshot, panel.faction(), viewer_is_privileged);
            let result = panel.render(options.force, &rows, renderer, policy);
            entries.push((panel.id().clone(), panel.op_seq()));
            outcomes.push(BulkOutcome {
                panel: panel.id().clone(),
                result,
            });
        }
        BulkTicket { entries, outcomes }
    }

    /// Begin closing every panel, collecting every outcome. The returned
    /// ticket settles only after each exit animation has completed.
    pub fn close_all(&mut self, policy: &MotionPolicy) -> BulkTicket {
        let mut entries = Vec::with_capacity(self.panels.len());
        let mut outcomes = Vec::with_capacity(self.panels.len());
        for panel in &mut self.panels {
            panel.close(policy);
            entries.push((panel.id().clone(), panel.op_seq()));
            outcomes.push(BulkOutcome {
                panel: panel.id().clone(),
                result: Ok(()),
            });
        }
        BulkTicket { entries, outcomes }
    }

    /// Whether every operation in `ticket` reached a terminal state
    /// (completed, or superseded by a newer operation on the same panel).
    #[must_use]
    pub fn is_settled(&self, ticket: &BulkTicket) -> bool {
        ticket.entries.iter().all(|(id, seq)| {
            self.get(id)
                .is_none_or(|panel| panel.settled_seq() >= *seq)
        })
    }

    /// Advance every panel's animations; returns retract writes released
    /// this frame.
    pub fn tick(&mut self, dt: Duration) -> Vec<(ParticipantId, SpotlightUpdate)> {
        let mut released = Vec::new();
        for panel in &mut self.panels {
            released.extend(panel.tick(dt));
        }
        released
    }
}
