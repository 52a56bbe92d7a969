#![forbid(unsafe_code)]

//! The live element tree a panel presents.
//!
//! A [`Fragment`] is the panel's root element; its children are
//! [`RowNode`]s in display order plus, transiently, the ghost nodes of
//! rows that are still fading out of view. The fragment exclusively owns
//! the mapping from row identity to live node for its panel.
//!
//! Visual channels split by ownership: a reconcile transition drives
//! `rect`, `scale`, and `opacity`; the fragment's own `tick` drives the
//! continuously running state (orbit rotation, satellite pulse, gradient
//! sweep, hover reveals). External code nudges per-row factors (hover,
//! orbit shrink) through accessors.

use std::time::Duration;

use limelight_core::MotionPolicy;
use limelight_core::animation::loops::{Pulse, Reveal, Rotation};
use limelight_core::animation::{Animation, Fade, back_out, sine_in_out};
use limelight_core::geometry::{Rect, lerp};
use limelight_core::model::ParticipantId;
use limelight_core::order::RowFlags;

/// The rotating request indicator attached to a requesting row.
///
/// Rotation phase is the auxiliary state that must survive a wholesale
/// content replace; the satellite intro/pulse restarts from its neutral
/// default on replace, matching how a fresh node begins dimmed and slightly
/// shrunk before settling into its loop.
#[derive(Debug)]
pub struct OrbitState {
    orbit_id: String,
    rotation: Rotation,
    satellite_intro: Fade,
    satellite_pulse: Pulse,
}

impl OrbitState {
    /// A fresh orbit in its neutral default state.
    #[must_use]
    pub fn new(orbit_id: impl Into<String>, policy: &MotionPolicy) -> Self {
        Self {
            orbit_id: orbit_id.into(),
            rotation: Rotation::new(policy.orbit_period()),
            satellite_intro: Fade::new(policy.satellite_intro()).easing(back_out),
            satellite_pulse: Pulse::new(policy.satellite_pulse()).easing(sine_in_out),
        }
    }

    /// Stable id the reconciler uses to carry rotation phase across
    /// replaces.
    #[must_use]
    pub fn orbit_id(&self) -> &str {
        &self.orbit_id
    }

    /// Current ring rotation in degrees.
    #[must_use]
    pub fn rotation_deg(&self) -> f64 {
        self.rotation.degrees()
    }

    /// Restore a captured rotation phase.
    pub fn set_rotation_deg(&mut self, degrees: f64) {
        self.rotation.set_degrees(degrees);
    }

    /// Satellite scale: settles from 1.0 to 0.9, then pulses 0.9–1.1.
    #[must_use]
    pub fn satellite_scale(&self) -> f64 {
        if self.satellite_intro.is_complete() {
            lerp(0.9, 1.1, f64::from(self.satellite_pulse.value()))
        } else {
            lerp(1.0, 0.9, f64::from(self.satellite_intro.value().clamp(0.0, 1.0)))
        }
    }

    /// Satellite opacity: settles from 1.0 to 0.8, then pulses 0.8–1.0.
    #[must_use]
    pub fn satellite_opacity(&self) -> f64 {
        if self.satellite_intro.is_complete() {
            lerp(0.8, 1.0, f64::from(self.satellite_pulse.value()))
        } else {
            lerp(1.0, 0.8, f64::from(self.satellite_intro.value().clamp(0.0, 1.0)))
        }
    }

    fn tick(&mut self, dt: Duration) {
        self.rotation.tick(dt);
        if self.satellite_intro.is_complete() {
            self.satellite_pulse.tick(dt);
        } else {
            self.satellite_intro.tick(dt);
        }
    }
}

/// One rendered row: markup plus its animated visual state.
#[derive(Debug)]
pub struct RowNode {
    key: ParticipantId,
    markup: String,
    flags: RowFlags,
    /// Current animated geometry.
    rect: Rect,
    /// Resting slot in the panel's stack.
    target: Rect,
    opacity: f64,
    scale: f64,
    orbit: Option<OrbitState>,
    /// Externally applied shrink factor on the orbit (withdrawal retract).
    orbit_shrink: f64,
    hover: Reveal,
    anchor: Reveal,
    hover_scale: f64,
}

impl RowNode {
    /// Build a node resting at `target`.
    #[must_use]
    pub fn new(
        key: ParticipantId,
        markup: String,
        flags: RowFlags,
        target: Rect,
        policy: &MotionPolicy,
    ) -> Self {
        let orbit = flags
            .contains(RowFlags::REQUESTING)
            .then(|| OrbitState::new(key.as_str(), policy));
        Self {
            key,
            markup,
            flags,
            rect: target,
            target,
            opacity: 1.0,
            scale: 1.0,
            orbit,
            orbit_shrink: 1.0,
            hover: Reveal::new(policy.hover_scale_time()),
            anchor: Reveal::new(policy.anchor_reveal()).easing(back_out),
            hover_scale: policy.hover.scale,
        }
    }

    /// Row identity; also the FLIP key.
    #[must_use]
    pub fn key(&self) -> &ParticipantId {
        &self.key
    }

    /// The markup this node currently presents.
    #[must_use]
    pub fn markup(&self) -> &str {
        &self.markup
    }

    /// Presentation flags the row was rendered with.
    #[must_use]
    pub fn flags(&self) -> RowFlags {
        self.flags
    }

    /// Current animated geometry.
    #[must_use]
    pub fn rect(&self) -> Rect {
        self.rect
    }

    /// Resting slot.
    #[must_use]
    pub fn target(&self) -> Rect {
        self.target
    }

    /// Current opacity in `[0, 1]`.
    #[must_use]
    pub fn opacity(&self) -> f64 {
        self.opacity
    }

    /// Transition-driven scale, excluding hover feedback.
    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    /// Scale as presented: transition scale times hover feedback.
    #[must_use]
    pub fn display_scale(&self) -> f64 {
        self.scale * lerp(1.0, self.hover_scale, f64::from(self.hover.value()))
    }

    /// Spotlight-anchor reveal progress (0 hidden, 1 fully offered).
    #[must_use]
    pub fn anchor_reveal(&self) -> f64 {
        f64::from(self.anchor.value().clamp(0.0, 2.0))
    }

    /// The request orbit, if this row is requesting.
    #[must_use]
    pub fn orbit(&self) -> Option<&OrbitState> {
        self.orbit.as_ref()
    }

    /// Mutable access to the orbit for phase restore.
    pub fn orbit_mut(&mut self) -> Option<&mut OrbitState> {
        self.orbit.as_mut()
    }

    /// Externally applied orbit shrink factor (1.0 = none, 0.0 = gone).
    #[must_use]
    pub fn orbit_shrink(&self) -> f64 {
        self.orbit_shrink
    }

    /// Apply the withdrawal retract factor for this frame.
    pub fn set_orbit_shrink(&mut self, factor: f64) {
        self.orbit_shrink = factor.clamp(0.0, 1.0);
    }

    /// Steer the hover feedback (row scale + anchor reveal together).
    pub fn set_hovered(&mut self, hovered: bool) {
        self.hover.set_forward(hovered);
        self.anchor.set_forward(hovered);
    }

    pub fn set_rect(&mut self, rect: Rect) {
        self.rect = rect;
    }

    pub fn set_opacity(&mut self, opacity: f64) {
        self.opacity = opacity.clamp(0.0, 1.0);
    }

    pub(crate) fn set_scale(&mut self, scale: f64) {
        self.scale = scale;
    }

    fn tick(&mut self, dt: Duration) {
        self.hover.tick(dt);
        self.anchor.tick(dt);
        if let Some(orbit) = &mut self.orbit {
            orbit.tick(dt);
        }
    }
}

/// A panel's live element tree.
#[derive(Debug)]
pub struct Fragment {
    id: String,
    css_classes: Vec<String>,
    nodes: Vec<RowNode>,
    leaving: Vec<RowNode>,
    gradient: Pulse,
}

impl Fragment {
    /// An empty fragment mounted under the given element id.
    #[must_use]
    pub fn new(id: impl Into<String>, css_classes: Vec<String>, policy: &MotionPolicy) -> Self {
        Self {
            id: id.into(),
            css_classes,
            nodes: Vec::new(),
            leaving: Vec::new(),
            gradient: Pulse::new(policy.gradient_sweep()).easing(sine_in_out),
        }
    }

    /// The fragment's element id.
    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// CSS classes on the root element.
    #[must_use]
    pub fn css_classes(&self) -> &[String] {
        &self.css_classes
    }

    /// Current rows in display order (excludes exit ghosts).
    #[must_use]
    pub fn nodes(&self) -> &[RowNode] {
        &self.nodes
    }

    /// Rows still fading out of view.
    #[must_use]
    pub fn leaving(&self) -> &[RowNode] {
        &self.leaving
    }

    /// Number of live rows.
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Whether the fragment presents no rows.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Look up a row by identity.
    #[must_use]
    pub fn node(&self, key: &ParticipantId) -> Option<&RowNode> {
        self.nodes.iter().find(|n| n.key() == key)
    }

    /// Mutable row lookup by identity.
    pub fn node_mut(&mut self, key: &ParticipantId) -> Option<&mut RowNode> {
        self.nodes.iter_mut().find(|n| n.key() == key)
    }

    /// Mutable row access by display position.
    pub fn node_at_mut(&mut self, index: usize) -> Option<&mut RowNode> {
        self.nodes.get_mut(index)
    }

    /// The gradient middle-stop offset, in percent, for the spotlight sweep.
    #[must_use]
    pub fn gradient_offset_percent(&self) -> f64 {
        lerp(0.0, 50.0, f64::from(self.gradient.value()))
    }

    /// Replace the child rows wholesale. Prior nodes are returned so the
    /// reconciler can turn the removed ones into exit ghosts.
    pub(crate) fn replace_nodes(&mut self, nodes: Vec<RowNode>) -> Vec<RowNode> {
        std::mem::replace(&mut self.nodes, nodes)
    }

    pub(crate) fn push_leaving(&mut self, node: RowNode) {
        self.leaving.push(node);
    }

    pub(crate) fn leaving_mut(&mut self) -> &mut [RowNode] {
        &mut self.leaving
    }

    /// Drop any exit ghosts immediately (their fade was superseded).
    pub fn clear_leaving(&mut self) {
        self.leaving.clear();
    }

    /// Drop all children immediately (close completed; no animation).
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.leaving.clear();
    }

    /// Advance the continuously running visual state.
    pub fn tick(&mut self, dt: Duration) {
        self.gradient.tick(dt);
        for node in &mut self.nodes {
            node.tick(dt);
        }
        for ghost in &mut self.leaving {
            ghost.tick(dt);
        }
    }
}
