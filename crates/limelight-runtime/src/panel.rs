#![forbid(unsafe_code)]

//! One panel instance: a per-faction roster view and its lifecycle.
//!
//! # State machine
//!
//! `Unrendered → Rendering → Rendered → Closing → Closed`, with
//! `Closed → Rendering` re-entry when a panel is reopened. Render settles
//! synchronously (markup substitution either fully succeeds or leaves the
//! previous tree intact); the entrance animation that follows is cosmetic.
//! Close is different: the instance stays `Closing` until the reversed
//! stagger exit finishes, and only then reports `Closed`, so a reopen
//! issued after a close settles never races a still-animating removal.
//!
//! # Operation sequencing
//!
//! Every render/close bumps an operation sequence number; `settled_seq`
//! trails it and records the newest operation that reached a terminal
//! state. A superseded operation (render arriving mid-close, or the
//! reverse) is considered settled by the operation that replaced it:
//! last-writer-wins, never a half-applied tree.

use std::fmt;
use std::time::Duration;

use limelight_core::MotionPolicy;
use limelight_core::animation::presets::{self, item_label};
use limelight_core::animation::{Animation, AnimationGroup, Fade};
use limelight_core::model::{Faction, ParticipantId, SpotlightUpdate, TokenId};
use limelight_core::order::DisplayRow;
use limelight_render::reconcile::{ReconcileError, reconcile};
use limelight_render::{Fragment, TemplateRenderer, Transition};

/// Configuration for creating a panel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelConfig {
    /// Which faction this panel lists.
    pub faction: Faction,
    /// Host selector the panel mounts under.
    pub mount: String,
    /// Extra CSS classes on the panel root.
    pub css_classes: Vec<String>,
}

/// Stable panel identity, templated from the faction side.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PanelId(String);

impl PanelId {
    /// The id a panel for `faction` will carry.
    #[must_use]
    pub fn for_faction(faction: Faction) -> Self {
        Self(format!("limelight-tracker-{}", faction.side()))
    }

    /// Borrow the raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for PanelId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Render lifecycle state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderState {
    /// Never rendered.
    Unrendered,
    /// A render is in flight (observable only mid-call).
    Rendering,
    /// Visible with settled markup.
    Rendered,
    /// Exit animation running.
    Closing,
    /// Fully closed; may be reopened.
    Closed,
}

/// A panel operation failed; the live tree was left at its last
/// known-good state.
#[derive(Debug)]
pub enum PanelError {
    /// Reconciliation failed (template collaborator error).
    Reconcile(ReconcileError),
}

impl fmt::Display for PanelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PanelError::Reconcile(err) => write!(f, "panel render failed: {err}"),
        }
    }
}

impl std::error::Error for PanelError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PanelError::Reconcile(err) => Some(err),
        }
    }
}

impl From<ReconcileError> for PanelError {
    fn from(err: ReconcileError) -> Self {
        PanelError::Reconcile(err)
    }
}

/// A spotlight withdrawal waiting for its retract animation before the
/// write is sent.
#[derive(Debug)]
struct PendingRetract {
    participant: ParticipantId,
    update: SpotlightUpdate,
    anim: Fade,
}

/// One live per-faction roster panel.
#[derive(Debug)]
pub struct PanelInstance {
    id: PanelId,
    faction: Faction,
    mount: String,
    state: RenderState,
    fragment: Fragment,
    entrance: Option<AnimationGroup>,
    exit: Option<AnimationGroup>,
    transition: Option<Transition>,
    pending_retracts: Vec<PendingRetract>,
    highlighted: Option<TokenId>,
    op_seq: u64,
    settled_seq: u64,
    slide_distance: f64,
}

impl PanelInstance {
    /// Create an unrendered panel for `config`.
    #[must_use]
    pub fn new(config: PanelConfig, policy: &MotionPolicy) -> Self {
        let id = PanelId::for_faction(config.faction);
        let fragment = Fragment::new(id.as_str(), config.css_classes, policy);
        Self {
            id,
            faction: config.faction,
            mount: config.mount,
            state: RenderState::Unrendered,
            fragment,
            entrance: None,
            exit: None,
            transition: None,
            pending_retracts: Vec::new(),
            highlighted: None,
            op_seq: 0,
            settled_seq: 0,
            slide_distance: policy.layout.slide_distance,
        }
    }

    /// The panel's stable id.
    #[must_use]
    pub fn id(&self) -> &PanelId {
        &self.id
    }

    /// The faction this panel lists.
    #[must_use]
    pub fn faction(&self) -> Faction {
        self.faction
    }

    /// Host selector the panel mounts under.
    #[must_use]
    pub fn mount(&self) -> &str {
        &self.mount
    }

    /// Current lifecycle state.
    #[must_use]
    pub fn state(&self) -> RenderState {
        self.state
    }

    /// Whether the panel is fully rendered.
    #[must_use]
    pub fn is_rendered(&self) -> bool {
        self.state == RenderState::Rendered
    }

    /// The live element tree.
    #[must_use]
    pub fn fragment(&self) -> &Fragment {
        &self.fragment
    }

    /// Mutable access for the interaction bridge.
    pub fn fragment_mut(&mut self) -> &mut Fragment {
        &mut self.fragment
    }

    /// Sequence number of the newest started operation.
    #[must_use]
    pub fn op_seq(&self) -> u64 {
        self.op_seq
    }

    /// Sequence number of the newest settled operation.
    #[must_use]
    pub fn settled_seq(&self) -> u64 {
        self.settled_seq
    }

    /// Whether any lifecycle or reconcile animation is still running.
    #[must_use]
    pub fn is_animating(&self) -> bool {
        self.entrance.is_some() || self.exit.is_some() || self.transition.is_some()
    }

    /// The token currently hover-highlighted from this panel.
    #[must_use]
    pub fn highlighted(&self) -> Option<&TokenId> {
        self.highlighted.as_ref()
    }

    /// Record `token` as highlighted, returning the previous holder.
    pub fn set_highlighted(&mut self, token: TokenId) -> Option<TokenId> {
        self.highlighted.replace(token)
    }

    /// Clear and return the highlighted token.
    pub fn take_highlighted(&mut self) -> Option<TokenId> {
        self.highlighted.take()
    }

    /// Horizontal slide offset for entrance/exit: allied panels travel
    /// through the left edge, opposing through the right.
    fn side_offset(&self) -> f64 {
        match self.faction {
            Faction::Allied => -self.slide_distance,
            Faction::Opposing => self.slide_distance,
        }
    }

    /// Render or refresh the panel from precomputed rows.
    ///
    /// Not-yet-visible panels render only when `force` is set; visible
    /// panels always refresh. First mounts play the staggered entrance,
    /// refreshes reconcile with a layout transition. On failure the
    /// previous state (tree and lifecycle both) is kept.
    pub fn render(
        &mut self,
        force: bool,
        rows: &[DisplayRow],
        renderer: &dyn TemplateRenderer,
        policy: &MotionPolicy,
    ) -> Result<(), PanelError> {
        let visible = matches!(
            self.state,
            RenderState::Rendering | RenderState::Rendered | RenderState::Closing
        );
        if !visible && !force {
            return Ok(());
        }

        self.op_seq += 1;
        let prev_state = self.state;
        let first_mount = !visible || self.fragment.is_empty();
        self.state = RenderState::Rendering;

        match reconcile(&mut self.fragment, rows, renderer, policy) {
            Ok(transition) => {
                if first_mount {
                    // Fresh tree: discard the reflow plan and stagger in.
                    self.transition = None;
                    let entrance = presets::entrance(
                        self.fragment.len(),
                        policy.mount_item(),
                        policy.mount_stagger(),
                        policy.mount.easing.resolve(),
                    );
                    self.apply_entrance(&entrance);
                    self.entrance = (!entrance.is_complete()).then_some(entrance);
                } else {
                    self.entrance = None;
                    self.transition = Some(transition);
                }
                self.exit = None;
                self.state = RenderState::Rendered;
                self.settled_seq = self.op_seq;
                tracing::debug!(panel = %self.id, rows = self.fragment.len(), first_mount, "rendered");
                Ok(())
            }
            Err(err) => {
                self.state = prev_state;
                self.settled_seq = self.op_seq;
                tracing::warn!(panel = %self.id, error = %err, "render failed; keeping prior tree");
                Err(err.into())
            }
        }
    }

    /// Begin closing. The panel reaches `Closed` when the reversed stagger
    /// exit completes (immediately, when there is nothing to animate).
    pub fn close(&mut self, policy: &MotionPolicy) {
        match self.state {
            RenderState::Unrendered | RenderState::Closed => {
                // Already closed: the operation settles at once.
                self.op_seq += 1;
                self.settled_seq = self.op_seq;
            }
            RenderState::Closing => {
                // A close is in flight; this one settles with it.
                self.op_seq += 1;
            }
            RenderState::Rendering | RenderState::Rendered => {
                self.op_seq += 1;
                self.entrance = None;
                self.transition = None;
                self.fragment.clear_leaving();
                if self.fragment.is_empty() {
                    self.finish_close();
                } else {
                    self.state = RenderState::Closing;
                    self.exit = Some(presets::exit(
                        self.fragment.len(),
                        policy.mount_item(),
                        policy.mount_stagger(),
                        policy.mount.easing.resolve(),
                    ));
                    tracing::debug!(panel = %self.id, "closing");
                }
            }
        }
    }

    fn finish_close(&mut self) {
        self.exit = None;
        self.fragment.clear();
        self.highlighted = None;
        self.state = RenderState::Closed;
        self.settled_seq = self.op_seq;
        tracing::debug!(panel = %self.id, "closed");
    }

    /// Queue a spotlight withdrawal: the orbit retract plays first, and the
    /// atomic write is released by `tick` once the animation completes.
    pub fn queue_retract(
        &mut self,
        participant: ParticipantId,
        update: SpotlightUpdate,
        policy: &MotionPolicy,
    ) {
        self.pending_retracts.push(PendingRetract {
            participant,
            update,
            anim: presets::retract(policy.retract()),
        });
    }

    /// Number of withdrawals still animating.
    #[must_use]
    pub fn pending_retracts(&self) -> usize {
        self.pending_retracts.len()
    }

    /// Advance every animation by `dt`.
    ///
    /// Returns the spotlight writes whose retract animation finished this
    /// frame; the caller sends them to the document model.
    pub fn tick(&mut self, dt: Duration) -> Vec<(ParticipantId, SpotlightUpdate)> {
        self.fragment.tick(dt);

        if let Some(transition) = self.transition.as_mut() {
            transition.tick(dt);
            transition.apply_to(&mut self.fragment);
            if transition.is_complete() {
                self.transition = None;
            }
        }

        if let Some(mut entrance) = self.entrance.take() {
            entrance.tick(dt);
            self.apply_entrance(&entrance);
            if !entrance.is_complete() {
                self.entrance = Some(entrance);
            }
        }

        if let Some(mut exit) = self.exit.take() {
            exit.tick(dt);
            self.apply_exit(&exit);
            if exit.is_complete() {
                self.finish_close();
            } else {
                self.exit = Some(exit);
            }
        }

        self.advance_retracts(dt)
    }

    fn advance_retracts(&mut self, dt: Duration) -> Vec<(ParticipantId, SpotlightUpdate)> {
        let mut released = Vec::new();
        let mut index = 0;
        while index < self.pending_retracts.len() {
            self.pending_retracts[index].anim.tick(dt);
            let shrink = 1.0 - f64::from(self.pending_retracts[index].anim.value());
            let key = self.pending_retracts[index].participant.clone();
            if let Some(node) = self.fragment.node_mut(&key) {
                node.set_orbit_shrink(shrink);
            }
            if self.pending_retracts[index].anim.is_complete() {
                let done = self.pending_retracts.swap_remove(index);
                released.push((done.participant, done.update));
            } else {
                index += 1;
            }
        }
        released
    }

    fn apply_entrance(&mut self, entrance: &AnimationGroup) {
        let offset = self.side_offset();
        for index in 0..self.fragment.len() {
            let progress = entrance
                .value_of(&item_label(index))
                .unwrap_or(1.0);
            if let Some(node) = self.fragment.node_at_mut(index) {
                let target = node.target();
                node.set_rect(target.translated(offset * f64::from(1.0 - progress), 0.0));
                node.set_opacity(f64::from(progress.clamp(0.0, 1.0)));
            }
        }
    }

    fn apply_exit(&mut self, exit: &AnimationGroup) {
        let offset = self.side_offset();
        for index in 0..self.fragment.len() {
            let progress = exit.value_of(&item_label(index)).unwrap_or(1.0);
            if let Some(node) = self.fragment.node_at_mut(index) {
                let target = node.target();
                node.set_rect(target.translated(offset * f64::from(progress), 0.0));
                node.set_opacity(f64::from(1.0 - progress.clamp(0.0, 1.0)));
            }
        }
    }
}
