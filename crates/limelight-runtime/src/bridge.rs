#![forbid(unsafe_code)]

//! Host collaborator seams and pointer interactions.
//!
//! The engine mutates nothing itself: encounter truth lives behind
//! [`DocumentModel`], and canvas selection/highlighting behind [`Stage`].
//! Hover, click, and double-click land here and either adjust per-row
//! visual state or delegate to a collaborator. Every entry point is
//! idempotent-safe against missing targets: an unresolvable participant or
//! token is a silent no-op, never an error.

use std::fmt;

use limelight_core::model::{EncounterSnapshot, ParticipantId, SpotlightUpdate, TokenId};

use crate::panel::PanelInstance;

/// A mutation or query against the host document model failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DocumentError {
    /// The viewer lacks the right to perform this write.
    PermissionDenied,
    /// The host rejected the write (validation, connectivity, …).
    Rejected(String),
}

impl fmt::Display for DocumentError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DocumentError::PermissionDenied => f.write_str("permission denied"),
            DocumentError::Rejected(reason) => write!(f, "update rejected: {reason}"),
        }
    }
}

impl std::error::Error for DocumentError {}

/// The host's encounter/participant store.
///
/// Owns all encounter truth. The engine reads immutable snapshots and
/// writes back through the mutation entry points, each of which applies
/// atomically.
pub trait DocumentModel {
    /// The active encounter, or `None` when no encounter is running.
    fn snapshot(&self) -> Option<EncounterSnapshot>;

    /// Whether the viewing user holds the privileged (director) role.
    fn viewer_is_privileged(&self) -> bool;

    /// Whether the viewer may inspect this participant's details.
    fn can_observe(&self, id: &ParticipantId) -> bool;

    /// Atomically write a participant's spotlight sub-record.
    fn update_participant(
        &mut self,
        id: &ParticipantId,
        update: SpotlightUpdate,
    ) -> Result<(), DocumentError>;

    /// Mark a participant as the holder of shared attention.
    fn assign_spotlight(&mut self, id: &ParticipantId) -> Result<(), DocumentError>;

    /// Open the participant's detail sheet.
    fn open_sheet(&mut self, id: &ParticipantId);
}

/// The host's canvas: token lookup, selection, viewport, and hover rings.
pub trait Stage {
    /// The stage token placed for a participant, if any.
    fn token_of(&self, id: &ParticipantId) -> Option<TokenId>;

    /// Whether the viewer may hover-highlight this token.
    fn can_hover(&self, token: &TokenId) -> bool;

    /// Set or clear the hover highlight on a token. Setting suppresses
    /// hover highlights elsewhere on the stage.
    fn set_hover(&mut self, token: &TokenId, hovered: bool);

    /// Whether the viewer may take control of this token.
    fn can_select(&self, token: &TokenId) -> bool;

    /// Select the token, releasing any other selection. Returns whether
    /// the selection took effect.
    fn select_exclusive(&mut self, token: &TokenId) -> bool;

    /// Center the viewport on a token.
    fn pan_to(&mut self, token: &TokenId);
}

/// Pointer entered a row.
///
/// Plays the row's local hover feedback and transfers the panel's single
/// token highlight: entering a new row before leaving the previous one
/// moves the highlight, it never stacks.
pub fn pointer_enter(
    panel: &mut PanelInstance,
    stage: &mut dyn Stage,
    participant: &ParticipantId,
) {
    if let Some(node) = panel.fragment_mut().node_mut(participant) {
        node.set_hovered(true);
    }

    let Some(token) = stage.token_of(participant) else {
        return;
    };
    if !stage.can_hover(&token) {
        return;
    }
    if let Some(previous) = panel.set_highlighted(token.clone())
        && previous != token
    {
        stage.set_hover(&previous, false);
    }
    stage.set_hover(&token, true);
}

/// Pointer left a row. Clears the row feedback and the panel's token
/// highlight, if one is held.
pub fn pointer_leave(
    panel: &mut PanelInstance,
    stage: &mut dyn Stage,
    participant: &ParticipantId,
) {
    if let Some(node) = panel.fragment_mut().node_mut(participant) {
        node.set_hovered(false);
    }
    if let Some(token) = panel.take_highlighted() {
        stage.set_hover(&token, false);
    }
}

/// Double-click on a row: open the participant's sheet when the viewer has
/// observer rights. Anything unresolvable is a silent no-op.
pub fn double_click(document: &mut dyn DocumentModel, participant: &ParticipantId) {
    if document.can_observe(participant) {
        document.open_sheet(participant);
    } else {
        tracing::debug!(%participant, "double click ignored: not observable");
    }
}
