#![forbid(unsafe_code)]

//! The steady-state reconciler.
//!
//! Converts a sorted row list into fresh markup, substitutes the panel
//! fragment's children wholesale, and produces the [`Transition`] that
//! keeps the change visually continuous. First-mount and close motions are
//! the panel's concern (they use the entrance/exit presets instead of a
//! reflow transition); this module covers every re-render in between.
//!
//! Failure policy: every row is rendered to markup *before* the fragment
//! is touched. A template failure therefore leaves the previous children
//! fully intact: no partial substitution, no state advance.

use std::fmt;

use limelight_core::MotionPolicy;
use limelight_core::geometry::Rect;
use limelight_core::order::DisplayRow;

use crate::flip::{LayoutSnapshot, Transition};
use crate::fragment::{Fragment, RowNode};
use crate::template::{ROW_TEMPLATE, TemplateError, TemplateRenderer};

/// Reconciliation failed; the fragment was left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileError {
    /// The markup collaborator failed on a row.
    Template(TemplateError),
}

impl fmt::Display for ReconcileError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReconcileError::Template(err) => write!(f, "reconcile aborted: {err}"),
        }
    }
}

impl std::error::Error for ReconcileError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ReconcileError::Template(err) => Some(err),
        }
    }
}

impl From<TemplateError> for ReconcileError {
    fn from(err: TemplateError) -> Self {
        ReconcileError::Template(err)
    }
}

/// Replace `fragment`'s children with `rows` and plan the transition.
///
/// Guarantees, in order:
///
/// 1. Empty `rows` empties the fragment's live children (the mount point
///    and any still-fading ghosts remain; this is a refresh to empty, not
///    a close).
/// 2. Current geometry and orbit phase are captured keyed by stable ids
///    before anything is replaced.
/// 3. All markup is generated up front; the first failure aborts with the
///    fragment at its last known-good state.
/// 4. Captured orbit phase is re-seeded into matching new nodes; unmatched
///    nodes start from the neutral default.
/// 5. The returned [`Transition`] animates moves, enters, and exits
///    concurrently from the captured state.
pub fn reconcile(
    fragment: &mut Fragment,
    rows: &[DisplayRow],
    renderer: &dyn TemplateRenderer,
    policy: &MotionPolicy,
) -> Result<Transition, ReconcileError> {
    // (3) Render every row before touching the live tree.
    let mut rendered = Vec::with_capacity(rows.len());
    for row in rows {
        rendered.push(renderer.render(ROW_TEMPLATE, row)?);
    }

    // (2) Capture, then substitute. Ghosts of a superseded transition are
    // dropped outright: last writer wins.
    let before = LayoutSnapshot::capture(fragment);
    fragment.clear_leaving();

    let new_nodes: Vec<RowNode> = rows
        .iter()
        .zip(rendered)
        .enumerate()
        .map(|(index, (row, markup))| {
            let slot = Rect::new(
                0.0,
                policy.row_slot(index),
                policy.layout.row_width,
                policy.layout.row_height,
            );
            RowNode::new(row.participant_id.clone(), markup, row.flags(), slot, policy)
        })
        .collect();

    let old_nodes = fragment.replace_nodes(new_nodes);

    // Rows that vanished become exit ghosts, fading out in place.
    let mut ghost_count = 0;
    for old in old_nodes {
        if fragment.node(old.key()).is_none() {
            ghost_count += 1;
            fragment.push_leaving(old);
        }
    }

    // (4) Carry continuous visual state across the replace.
    before.restore_aux(fragment);

    tracing::debug!(
        fragment = fragment.id(),
        rows = fragment.len(),
        ghosts = ghost_count,
        "reconciled"
    );

    // (5) Plan the concurrent move/enter/exit animation.
    Ok(Transition::between(&before, fragment, ghost_count, policy))
}
