#![forbid(unsafe_code)]

//! Capture / apply / transition: layout continuity across a content replace.
//!
//! The reconciler replaces a fragment's children wholesale, so visual
//! continuity has to be reconstructed from state captured beforehand:
//!
//! 1. [`LayoutSnapshot::capture`] records each node's geometry keyed by row
//!    id, plus each orbit's rotation phase keyed by orbit id.
//! 2. The fragment's content is substituted.
//! 3. [`LayoutSnapshot::restore_aux`] re-seeds matching orbits; unmatched
//!    ones keep their neutral default.
//! 4. [`Transition::between`] pairs captured geometry with the new resting
//!    slots and animates moved rows, entering rows, and exit ghosts
//!    concurrently.
//!
//! Nothing in this interface names an animation backend; any tween engine
//! that can produce a progress value per frame could sit behind it.
//!
//! # Invariants
//!
//! 1. A row present before and after a replace never jumps: its first
//!    post-replace frame renders at exactly the captured geometry.
//! 2. Enter and exit fades run concurrently with moves, not sequenced.
//! 3. `apply_to` after completion is a no-op apart from clearing ghosts.

use std::time::Duration;

use ahash::AHashMap;
use limelight_core::MotionPolicy;
use limelight_core::animation::{Animation, Fade};
use limelight_core::geometry::{Rect, lerp};
use limelight_core::model::ParticipantId;

use crate::fragment::{Fragment, RowNode};

/// Geometry of one node at capture time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CapturedNode {
    pub rect: Rect,
    pub scale: f64,
    pub opacity: f64,
}

/// Layout and auxiliary state captured immediately before a replace.
#[derive(Debug, Default)]
pub struct LayoutSnapshot {
    nodes: AHashMap<ParticipantId, CapturedNode>,
    orbit_phase: AHashMap<String, f64>,
}

impl LayoutSnapshot {
    /// Capture the fragment's current child state.
    #[must_use]
    pub fn capture(fragment: &Fragment) -> Self {
        let mut nodes = AHashMap::with_capacity(fragment.len());
        let mut orbit_phase = AHashMap::new();
        for node in fragment.nodes() {
            nodes.insert(
                node.key().clone(),
                CapturedNode {
                    rect: node.rect(),
                    scale: node.scale(),
                    opacity: node.opacity(),
                },
            );
            if let Some(orbit) = node.orbit() {
                orbit_phase.insert(orbit.orbit_id().to_string(), orbit.rotation_deg());
            }
        }
        Self { nodes, orbit_phase }
    }

    /// Captured geometry for a row, if it existed.
    #[must_use]
    pub fn node(&self, key: &ParticipantId) -> Option<&CapturedNode> {
        self.nodes.get(key)
    }

    /// Captured orbit phase by orbit id.
    #[must_use]
    pub fn orbit_phase(&self, orbit_id: &str) -> Option<f64> {
        self.orbit_phase.get(orbit_id).copied()
    }

    /// Re-seed auxiliary state into freshly substituted nodes by id.
    /// Nodes without a captured match keep their neutral default.
    pub fn restore_aux(&self, fragment: &mut Fragment) {
        for index in 0..fragment.len() {
            let Some(node) = fragment.node_at_mut(index) else {
                break;
            };
            if let Some(orbit) = node.orbit_mut() {
                if let Some(phase) = self.orbit_phase.get(orbit.orbit_id()).copied() {
                    orbit.set_rotation_deg(phase);
                }
            }
        }
    }
}

/// One row gliding from its captured geometry to its new slot.
#[derive(Debug, Clone)]
struct MoveSpec {
    key: ParticipantId,
    from: CapturedNode,
    to: Rect,
}

/// The animated plan produced by a reconcile.
///
/// Drive with `tick(dt)` then `apply_to(fragment)` once per frame until
/// [`Transition::is_complete`]. Moves, enters, and exits all progress
/// concurrently; ghosts are dropped from the fragment when the fades end.
#[derive(Debug)]
pub struct Transition {
    move_anim: Fade,
    fade_anim: Fade,
    moves: Vec<MoveSpec>,
    enters: Vec<ParticipantId>,
    has_exits: bool,
    ghosts_cleared: bool,
}

impl Transition {
    fn with_parts(
        moves: Vec<MoveSpec>,
        enters: Vec<ParticipantId>,
        has_exits: bool,
        policy: &MotionPolicy,
    ) -> Self {
        Self {
            move_anim: Fade::new(policy.reflow_move()).easing(policy.reflow.easing.resolve()),
            fade_anim: Fade::new(policy.reflow_fade()),
            moves,
            enters,
            has_exits,
            ghosts_cleared: !has_exits,
        }
    }

    /// Build the plan for a fragment whose content was just substituted.
    ///
    /// `before` is the pre-substitution capture; rows present in both states
    /// become moves (their node is snapped to the captured geometry so the
    /// first frame is continuous), rows only in the new state fade in from
    /// their slot, and `ghost_count` rows were pushed onto the fragment's
    /// leaving list to fade out in place.
    #[must_use]
    pub fn between(
        before: &LayoutSnapshot,
        fragment: &mut Fragment,
        ghost_count: usize,
        policy: &MotionPolicy,
    ) -> Self {
        let mut moves = Vec::new();
        let mut enters = Vec::new();

        for index in 0..fragment.len() {
            let Some(node) = fragment.node_at_mut(index) else {
                break;
            };
            let key = node.key().clone();
            match before.node(&key) {
                Some(captured) => {
                    node.set_rect(captured.rect);
                    node.set_scale(captured.scale);
                    node.set_opacity(captured.opacity);
                    moves.push(MoveSpec {
                        key,
                        from: *captured,
                        to: node.target(),
                    });
                }
                None => {
                    node.set_opacity(0.0);
                    enters.push(key);
                }
            }
        }

        Self::with_parts(moves, enters, ghost_count > 0, policy)
    }

    /// Advance the plan.
    pub fn tick(&mut self, dt: Duration) {
        self.move_anim.tick(dt);
        self.fade_anim.tick(dt);
    }

    /// Write the current frame's geometry and opacity into the fragment.
    pub fn apply_to(&mut self, fragment: &mut Fragment) {
        let move_v = f64::from(self.move_anim.value());
        for spec in &self.moves {
            if let Some(node) = fragment.node_mut(&spec.key) {
                node.set_rect(spec.from.rect.lerp(&spec.to, move_v));
                node.set_scale(lerp(spec.from.scale, 1.0, move_v));
                node.set_opacity(lerp(spec.from.opacity, 1.0, move_v));
            }
        }

        let fade_v = f64::from(self.fade_anim.value());
        for key in &self.enters {
            if let Some(node) = fragment.node_mut(key) {
                node.set_opacity(fade_v);
            }
        }

        if self.has_exits {
            for ghost in fragment.leaving_mut() {
                ghost.set_opacity(1.0 - fade_v);
            }
            if self.fade_anim.is_complete() && !self.ghosts_cleared {
                fragment.clear_leaving();
                self.ghosts_cleared = true;
            }
        }
    }

    /// Whether every strand of the plan has finished.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.move_anim.is_complete() && self.fade_anim.is_complete()
    }
}
