#![forbid(unsafe_code)]

//! The composition root and change-event adapter.
//!
//! [`TrackerController`] owns the registry, the action table, the motion
//! policy, and the host collaborators, and is constructed once at startup.
//! Host change notifications arrive as [`EncounterEvent`]s, pushed
//! directly through [`TrackerController::notify`] or buffered in an
//! [`EventQueue`] and drained with [`TrackerController::pump`], and every
//! response is the same shape: recompute, then re-render or close.
//!
//! Data flows one direction per update cycle: host event → recompute →
//! reconcile/animate → interaction rebinding. The controller never mutates
//! encounter state on its own; even the deferred spotlight-withdrawal
//! writes released by the frame pump go through the document model.

use std::time::Duration;

use web_time::Instant;

use limelight_core::event::{EncounterEvent, EventQueue};
use limelight_core::model::{Faction, ParticipantId};
use limelight_core::MotionPolicy;
use limelight_render::TemplateRenderer;

use crate::actions::{ActionContext, ActionOutcome, ActionTable};
use crate::bridge::{self, DocumentError, DocumentModel, Stage};
use crate::panel::{PanelConfig, PanelId};
use crate::registry::{BulkTicket, PanelRegistry, RenderOptions};

/// Where the host should insert the tracker's navigation shortcut, and
/// what the control should say. The host owns the actual insertion; on
/// activation it sends [`EncounterEvent::NavToggle`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NavShortcut {
    pub icon: &'static str,
    pub tooltip: &'static str,
    pub aria_label: &'static str,
}

/// The tracker's navigation shortcut control.
pub const NAV_SHORTCUT: NavShortcut = NavShortcut {
    icon: "icon-spotlight",
    tooltip: "Toggle Spotlight Tracker",
    aria_label: "Toggle Spotlight Tracker",
};

/// Mount selectors for the two default panels.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelMounts {
    pub left: String,
    pub right: String,
}

impl Default for PanelMounts {
    fn default() -> Self {
        Self {
            left: "#ui-left-column-2".to_string(),
            right: "#ui-right-column-1".to_string(),
        }
    }
}

/// Composition root: registry + collaborators + policy, wired once.
pub struct TrackerController<D, S, R> {
    registry: PanelRegistry,
    actions: ActionTable,
    document: D,
    stage: S,
    renderer: R,
    policy: MotionPolicy,
    mounts: PanelMounts,
    last_frame: Option<Instant>,
}

impl<D, S, R> TrackerController<D, S, R>
where
    D: DocumentModel,
    S: Stage,
    R: TemplateRenderer,
{
    /// Wire a controller with an empty registry.
    #[must_use]
    pub fn new(document: D, stage: S, renderer: R, policy: MotionPolicy) -> Self {
        Self {
            registry: PanelRegistry::new(),
            actions: ActionTable::new(),
            document,
            stage,
            renderer,
            policy: policy.validated(),
            mounts: PanelMounts::default(),
            last_frame: None,
        }
    }

    /// Override the default panel mounts (builder pattern).
    #[must_use]
    pub fn with_mounts(mut self, mounts: PanelMounts) -> Self {
        self.mounts = mounts;
        self
    }

    /// The panel registry.
    #[must_use]
    pub fn registry(&self) -> &PanelRegistry {
        &self.registry
    }

    /// Mutable access to the registry, for hosts that drive individual
    /// panels outside the bulk operations.
    pub fn registry_mut(&mut self) -> &mut PanelRegistry {
        &mut self.registry
    }

    /// The host document model.
    #[must_use]
    pub fn document(&self) -> &D {
        &self.document
    }

    /// Mutable access to the host document model.
    pub fn document_mut(&mut self) -> &mut D {
        &mut self.document
    }

    /// The motion policy in force.
    #[must_use]
    pub fn policy(&self) -> &MotionPolicy {
        &self.policy
    }

    /// The navigation shortcut the host should install.
    #[must_use]
    pub fn nav_shortcut(&self) -> NavShortcut {
        NAV_SHORTCUT
    }

    /// Create (or return) a panel. Idempotent per faction.
    pub fn create(&mut self, config: PanelConfig) -> PanelId {
        self.registry.create(config, &self.policy)
    }

    /// Ensure the two default panels exist: allied on the left mount,
    /// opposing on the right.
    pub fn ensure_panels(&mut self) {
        self.create(PanelConfig {
            faction: Faction::Allied,
            mount: self.mounts.left.clone(),
            css_classes: vec!["left-zone".to_string()],
        });
        self.create(PanelConfig {
            faction: Faction::Opposing,
            mount: self.mounts.right.clone(),
            css_classes: vec!["right-zone".to_string()],
        });
    }

    /// Recompute and render every panel from the current snapshot.
    pub fn render_all(&mut self, options: RenderOptions) -> BulkTicket {
        let snapshot = self.document.snapshot();
        self.registry.render_all(
            options,
            snapshot.as_ref(),
            self.document.viewer_is_privileged(),
            &self.renderer,
            &self.policy,
        )
    }

    /// Begin closing every panel.
    pub fn close_all(&mut self) -> BulkTicket {
        self.registry.close_all(&self.policy)
    }

    /// True only when every panel is fully rendered.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.registry.is_rendered()
    }

    /// Whether a bulk operation has fully settled (exit animations
    /// included).
    #[must_use]
    pub fn is_settled(&self, ticket: &BulkTicket) -> bool {
        self.registry.is_settled(ticket)
    }

    /// React to one host event.
    ///
    /// The nav toggle reads the aggregate rendered state only: when the
    /// two panels disagree, the aggregate is false and both are
    /// force-rendered, the already-visible one redundantly.
    pub fn notify(&mut self, event: EncounterEvent) -> Option<BulkTicket> {
        tracing::debug!(?event, "handling host event");
        match event {
            EncounterEvent::Ready => {
                self.ensure_panels();
                if self.document.snapshot().is_some() {
                    Some(self.render_all(RenderOptions { force: true }))
                } else {
                    None
                }
            }
            EncounterEvent::EncounterCreated
            | EncounterEvent::EncounterUpdated
            | EncounterEvent::RosterRendered
            | EncounterEvent::ParticipantCreated(_)
            | EncounterEvent::ParticipantUpdated(_)
            | EncounterEvent::ParticipantDeleted(_) => {
                Some(self.render_all(RenderOptions::default()))
            }
            EncounterEvent::EncounterDeleted => {
                if self.document.snapshot().is_none() {
                    Some(self.close_all())
                } else {
                    Some(self.render_all(RenderOptions::default()))
                }
            }
            EncounterEvent::NavToggle => {
                if self.is_rendered() {
                    Some(self.close_all())
                } else {
                    Some(self.render_all(RenderOptions { force: true }))
                }
            }
        }
    }

    /// Drain a host event queue, handling each event in arrival order.
    pub fn pump(&mut self, queue: &mut EventQueue) -> Vec<BulkTicket> {
        queue.drain().into_iter().filter_map(|e| self.notify(e)).collect()
    }

    /// Advance all animation by `dt` and release any deferred spotlight
    /// withdrawals whose retract finished. A rejected write is swallowed
    /// with a warning: the row simply reverts on the next recompute.
    pub fn tick(&mut self, dt: Duration) {
        for (participant, update) in self.registry.tick(dt) {
            if let Err(err) = self.document.update_participant(&participant, update) {
                tracing::warn!(%participant, error = %err, "deferred spotlight write failed");
            }
        }
    }

    /// Frame-pump entry point: computes the delta from the previous frame
    /// and ticks.
    pub fn frame(&mut self, now: Instant) {
        let dt = match self.last_frame.replace(now) {
            Some(prev) => now.saturating_duration_since(prev),
            None => Duration::ZERO,
        };
        if !dt.is_zero() {
            self.tick(dt);
        }
    }

    /// Dispatch a row action by name against a panel. Unknown panels and
    /// unknown actions are silent no-ops.
    pub fn dispatch(
        &mut self,
        panel: &PanelId,
        action: &str,
        target: Option<&ParticipantId>,
    ) -> Result<ActionOutcome, DocumentError> {
        let Some(instance) = self.registry.get_mut(panel) else {
            tracing::debug!(%panel, action, "dispatch ignored: unknown panel");
            return Ok(ActionOutcome::Ignored);
        };
        let mut cx = ActionContext {
            panel: instance,
            document: &mut self.document,
            stage: &mut self.stage,
            policy: &self.policy,
        };
        let result = self.actions.dispatch(action, &mut cx, target);
        if let Err(err) = &result {
            tracing::warn!(%panel, action, error = %err, "action failed");
        }
        result
    }

    /// Pointer entered a row.
    pub fn pointer_enter(&mut self, panel: &PanelId, participant: &ParticipantId) {
        if let Some(instance) = self.registry.get_mut(panel) {
            bridge::pointer_enter(instance, &mut self.stage, participant);
        }
    }

    /// Pointer left a row.
    pub fn pointer_leave(&mut self, panel: &PanelId, participant: &ParticipantId) {
        if let Some(instance) = self.registry.get_mut(panel) {
            bridge::pointer_leave(instance, &mut self.stage, participant);
        }
    }

    /// Double-click on a row: open the participant's sheet when permitted.
    pub fn double_click(&mut self, participant: &ParticipantId) {
        bridge::double_click(&mut self.document, participant);
    }
}

impl<D, S, R> std::fmt::Debug for TrackerController<D, S, R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TrackerController")
            .field("panels", &self.registry.len())
            .field("mounts", &self.mounts)
            .finish_non_exhaustive()
    }
}
