#![forbid(unsafe_code)]

//! Explicit action dispatch.
//!
//! Rows carry `data-action` names; the host resolves a click to an action
//! name plus the participant id of the row it landed on and hands both to
//! [`ActionTable::dispatch`]. Handlers are plain functions receiving the
//! owning panel and the collaborators explicitly; there is no implicit
//! receiver binding.
//!
//! Missing or unresolvable targets are silent no-ops ([`ActionOutcome::Ignored`]);
//! only a host mutation failure surfaces as an error.

use ahash::AHashMap;

use limelight_core::MotionPolicy;
use limelight_core::model::{ParticipantId, SpotlightUpdate};
use limelight_core::order::next_priority_token;

use crate::bridge::{DocumentError, DocumentModel, Stage};
use crate::panel::PanelInstance;

/// Action names the default table knows.
pub const ACTION_ASSIGN_SPOTLIGHT: &str = "assign-spotlight";
pub const ACTION_SELECT_PARTICIPANT: &str = "select-participant";
pub const ACTION_REQUEST_SPOTLIGHT: &str = "request-spotlight";

/// What a dispatched action did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ActionOutcome {
    /// The action ran.
    Handled,
    /// Nothing to do: unknown action, missing target, or a gate filtered it.
    Ignored,
}

/// Everything a handler may touch, passed explicitly.
pub struct ActionContext<'a> {
    pub panel: &'a mut PanelInstance,
    pub document: &'a mut dyn DocumentModel,
    pub stage: &'a mut dyn Stage,
    pub policy: &'a MotionPolicy,
}

/// An action handler: owning panel and target come in as parameters.
pub type ActionHandler =
    fn(&mut ActionContext<'_>, Option<&ParticipantId>) -> Result<ActionOutcome, DocumentError>;

/// Name-to-handler map.
pub struct ActionTable {
    handlers: AHashMap<&'static str, ActionHandler>,
}

impl std::fmt::Debug for ActionTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ActionTable")
            .field("actions", &self.handlers.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl Default for ActionTable {
    fn default() -> Self {
        let mut handlers: AHashMap<&'static str, ActionHandler> = AHashMap::new();
        handlers.insert(ACTION_ASSIGN_SPOTLIGHT, assign_spotlight);
        handlers.insert(ACTION_SELECT_PARTICIPANT, select_participant);
        handlers.insert(ACTION_REQUEST_SPOTLIGHT, request_spotlight);
        Self { handlers }
    }
}

impl ActionTable {
    /// The table with the built-in tracker actions.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace a handler.
    pub fn insert(&mut self, name: &'static str, handler: ActionHandler) {
        self.handlers.insert(name, handler);
    }

    /// Dispatch `name` against a target. Unknown names are ignored.
    pub fn dispatch(
        &self,
        name: &str,
        cx: &mut ActionContext<'_>,
        target: Option<&ParticipantId>,
    ) -> Result<ActionOutcome, DocumentError> {
        match self.handlers.get(name) {
            Some(handler) => handler(cx, target),
            None => {
                tracing::debug!(action = name, "unknown action ignored");
                Ok(ActionOutcome::Ignored)
            }
        }
    }
}

/// Privileged-only: hand the shared spotlight to the target participant.
/// Purely a delegation; the visual change arrives with the next recompute.
fn assign_spotlight(
    cx: &mut ActionContext<'_>,
    target: Option<&ParticipantId>,
) -> Result<ActionOutcome, DocumentError> {
    let Some(id) = target else {
        return Ok(ActionOutcome::Ignored);
    };
    if !cx.document.viewer_is_privileged() {
        // The anchor is only rendered for privileged viewers; reaching
        // here means a stale tree, so drop it quietly.
        tracing::warn!(%id, "spotlight assignment attempted without privilege");
        return Ok(ActionOutcome::Ignored);
    }
    cx.document.assign_spotlight(id)?;
    Ok(ActionOutcome::Handled)
}

/// Select the participant's stage token exclusively and center the
/// viewport on it.
fn select_participant(
    cx: &mut ActionContext<'_>,
    target: Option<&ParticipantId>,
) -> Result<ActionOutcome, DocumentError> {
    let Some(id) = target else {
        return Ok(ActionOutcome::Ignored);
    };
    let Some(token) = cx.stage.token_of(id) else {
        return Ok(ActionOutcome::Ignored);
    };
    if !cx.stage.can_select(&token) {
        return Ok(ActionOutcome::Ignored);
    }
    if cx.stage.select_exclusive(&token) {
        cx.stage.pan_to(&token);
        Ok(ActionOutcome::Handled)
    } else {
        Ok(ActionOutcome::Ignored)
    }
}

/// Toggle the target's spotlight request.
///
/// Turning on assigns the next priority token scoped to the participant's
/// own faction and writes immediately. Turning off queues the retract
/// animation on the panel; the write is released when it completes, so the
/// orbit never vanishes abruptly.
fn request_spotlight(
    cx: &mut ActionContext<'_>,
    target: Option<&ParticipantId>,
) -> Result<ActionOutcome, DocumentError> {
    let Some(id) = target else {
        return Ok(ActionOutcome::Ignored);
    };
    let Some(snapshot) = cx.document.snapshot() else {
        return Ok(ActionOutcome::Ignored);
    };
    let Some(participant) = snapshot.participant(id) else {
        return Ok(ActionOutcome::Ignored);
    };

    if participant.spotlight.requesting {
        let update = SpotlightUpdate {
            requesting: false,
            order_index: 0,
        };
        cx.panel.queue_retract(id.clone(), update, cx.policy);
        Ok(ActionOutcome::Handled)
    } else {
        let order_index = next_priority_token(&snapshot.participants, participant.faction);
        cx.document.update_participant(
            id,
            SpotlightUpdate {
                requesting: true,
                order_index,
            },
        )?;
        Ok(ActionOutcome::Handled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::panel::{PanelConfig, PanelInstance};
    use limelight_core::model::{
        EncounterSnapshot, Faction, Participant, SpotlightRequest, TokenId,
    };

    #[derive(Default)]
    struct FakeDocument {
        snapshot: Option<EncounterSnapshot>,
        privileged: bool,
        updates: Vec<(ParticipantId, SpotlightUpdate)>,
        assigned: Vec<ParticipantId>,
        reject_writes: bool,
    }

    impl DocumentModel for FakeDocument {
        fn snapshot(&self) -> Option<EncounterSnapshot> {
            self.snapshot.clone()
        }
        fn viewer_is_privileged(&self) -> bool {
            self.privileged
        }
        fn can_observe(&self, _id: &ParticipantId) -> bool {
            true
        }
        fn update_participant(
            &mut self,
            id: &ParticipantId,
            update: SpotlightUpdate,
        ) -> Result<(), DocumentError> {
            if self.reject_writes {
                return Err(DocumentError::Rejected("offline".into()));
            }
            self.updates.push((id.clone(), update));
            Ok(())
        }
        fn assign_spotlight(&mut self, id: &ParticipantId) -> Result<(), DocumentError> {
            self.assigned.push(id.clone());
            Ok(())
        }
        fn open_sheet(&mut self, _id: &ParticipantId) {}
    }

    #[derive(Default)]
    struct FakeStage {
        tokens: Vec<(ParticipantId, TokenId)>,
        selectable: bool,
        selected: Vec<TokenId>,
        panned: Vec<TokenId>,
    }

    impl Stage for FakeStage {
        fn token_of(&self, id: &ParticipantId) -> Option<TokenId> {
            self.tokens
                .iter()
                .find(|(pid, _)| pid == id)
                .map(|(_, t)| t.clone())
        }
        fn can_hover(&self, _token: &TokenId) -> bool {
            true
        }
        fn set_hover(&mut self, _token: &TokenId, _hovered: bool) {}
        fn can_select(&self, _token: &TokenId) -> bool {
            self.selectable
        }
        fn select_exclusive(&mut self, token: &TokenId) -> bool {
            self.selected.push(token.clone());
            true
        }
        fn pan_to(&mut self, token: &TokenId) {
            self.panned.push(token.clone());
        }
    }

    fn panel() -> PanelInstance {
        PanelInstance::new(
            PanelConfig {
                faction: Faction::Allied,
                mount: "#left".into(),
                css_classes: Vec::new(),
            },
            &MotionPolicy::default(),
        )
    }

    fn roster() -> EncounterSnapshot {
        EncounterSnapshot::new(vec![
            Participant::new("a", "Ayla", Faction::Allied),
            Participant::new("b", "Borg", Faction::Allied)
                .with_spotlight(SpotlightRequest::active(2)),
            Participant::new("x", "Xan", Faction::Opposing)
                .with_spotlight(SpotlightRequest::active(9)),
        ])
    }

    fn run(
        document: &mut FakeDocument,
        stage: &mut FakeStage,
        panel: &mut PanelInstance,
        action: &str,
        target: Option<&ParticipantId>,
    ) -> Result<ActionOutcome, DocumentError> {
        let policy = MotionPolicy::default();
        let table = ActionTable::new();
        let mut cx = ActionContext {
            panel,
            document,
            stage,
            policy: &policy,
        };
        table.dispatch(action, &mut cx, target)
    }

    #[test]
    fn unknown_action_is_ignored() {
        let mut doc = FakeDocument::default();
        let mut stage = FakeStage::default();
        let mut p = panel();
        let outcome = run(&mut doc, &mut stage, &mut p, "explode", Some(&"a".into()));
        assert_eq!(outcome, Ok(ActionOutcome::Ignored));
    }

    #[test]
    fn missing_target_is_ignored() {
        let mut doc = FakeDocument::default();
        let mut stage = FakeStage::default();
        let mut p = panel();
        for action in [
            ACTION_ASSIGN_SPOTLIGHT,
            ACTION_SELECT_PARTICIPANT,
            ACTION_REQUEST_SPOTLIGHT,
        ] {
            assert_eq!(
                run(&mut doc, &mut stage, &mut p, action, None),
                Ok(ActionOutcome::Ignored)
            );
        }
    }

    #[test]
    fn assign_requires_privilege() {
        let mut doc = FakeDocument {
            snapshot: Some(roster()),
            ..FakeDocument::default()
        };
        let mut stage = FakeStage::default();
        let mut p = panel();

        let outcome = run(
            &mut doc,
            &mut stage,
            &mut p,
            ACTION_ASSIGN_SPOTLIGHT,
            Some(&"a".into()),
        );
        assert_eq!(outcome, Ok(ActionOutcome::Ignored));
        assert!(doc.assigned.is_empty());

        doc.privileged = true;
        let outcome = run(
            &mut doc,
            &mut stage,
            &mut p,
            ACTION_ASSIGN_SPOTLIGHT,
            Some(&"a".into()),
        );
        assert_eq!(outcome, Ok(ActionOutcome::Handled));
        assert_eq!(doc.assigned, vec![ParticipantId::from("a")]);
    }

    #[test]
    fn select_pans_only_after_successful_selection() {
        let mut doc = FakeDocument::default();
        let mut stage = FakeStage {
            tokens: vec![("a".into(), TokenId::from("tok-a"))],
            selectable: true,
            ..FakeStage::default()
        };
        let mut p = panel();

        let outcome = run(
            &mut doc,
            &mut stage,
            &mut p,
            ACTION_SELECT_PARTICIPANT,
            Some(&"a".into()),
        );
        assert_eq!(outcome, Ok(ActionOutcome::Handled));
        assert_eq!(stage.panned, vec![TokenId::from("tok-a")]);

        // Without selection rights nothing happens.
        stage.selectable = false;
        stage.panned.clear();
        let outcome = run(
            &mut doc,
            &mut stage,
            &mut p,
            ACTION_SELECT_PARTICIPANT,
            Some(&"a".into()),
        );
        assert_eq!(outcome, Ok(ActionOutcome::Ignored));
        assert!(stage.panned.is_empty());
    }

    #[test]
    fn toggle_on_assigns_next_faction_token() {
        let mut doc = FakeDocument {
            snapshot: Some(roster()),
            ..FakeDocument::default()
        };
        let mut stage = FakeStage::default();
        let mut p = panel();

        let outcome = run(
            &mut doc,
            &mut stage,
            &mut p,
            ACTION_REQUEST_SPOTLIGHT,
            Some(&"a".into()),
        );
        assert_eq!(outcome, Ok(ActionOutcome::Handled));
        // Allied max token is 2 (b); the opposing 9 must not leak in.
        assert_eq!(
            doc.updates,
            vec![(
                ParticipantId::from("a"),
                SpotlightUpdate {
                    requesting: true,
                    order_index: 3,
                }
            )]
        );
    }

    #[test]
    fn toggle_off_defers_the_write_behind_the_retract() {
        let mut doc = FakeDocument {
            snapshot: Some(roster()),
            ..FakeDocument::default()
        };
        let mut stage = FakeStage::default();
        let mut p = panel();

        let outcome = run(
            &mut doc,
            &mut stage,
            &mut p,
            ACTION_REQUEST_SPOTLIGHT,
            Some(&"b".into()),
        );
        assert_eq!(outcome, Ok(ActionOutcome::Handled));
        assert!(doc.updates.is_empty(), "write waits for the retract");
        assert_eq!(p.pending_retracts(), 1);
    }

    #[test]
    fn rejected_write_propagates() {
        let mut doc = FakeDocument {
            snapshot: Some(roster()),
            reject_writes: true,
            ..FakeDocument::default()
        };
        let mut stage = FakeStage::default();
        let mut p = panel();

        let outcome = run(
            &mut doc,
            &mut stage,
            &mut p,
            ACTION_REQUEST_SPOTLIGHT,
            Some(&"a".into()),
        );
        assert!(matches!(outcome, Err(DocumentError::Rejected(_))));
    }

    #[test]
    fn toggle_on_unknown_participant_is_ignored() {
        let mut doc = FakeDocument {
            snapshot: Some(roster()),
            ..FakeDocument::default()
        };
        let mut stage = FakeStage::default();
        let mut p = panel();
        let outcome = run(
            &mut doc,
            &mut stage,
            &mut p,
            ACTION_REQUEST_SPOTLIGHT,
            Some(&"ghost".into()),
        );
        assert_eq!(outcome, Ok(ActionOutcome::Ignored));
    }
}
