//! End-to-end lifecycle tests: a fake host drives the controller the way
//! a real integration would: boot, change notifications, pointer and
//! action dispatch, and the frame pump.

use std::time::Duration;

use limelight_core::MotionPolicy;
use limelight_core::event::{EncounterEvent, EventQueue};
use limelight_core::model::{
    EncounterSnapshot, Faction, Participant, ParticipantId, SpotlightRequest, SpotlightUpdate,
    TokenId,
};
use limelight_render::RowTemplate;
use limelight_runtime::actions::ACTION_REQUEST_SPOTLIGHT;
use limelight_runtime::{
    DocumentError, DocumentModel, PanelId, RenderState, Stage, TrackerController,
};

const MS: fn(u64) -> Duration = Duration::from_millis;

/// Host document whose writes land in its own snapshot, like a real store.
#[derive(Default)]
struct HostDocument {
    encounter: Option<EncounterSnapshot>,
    privileged: bool,
    unobservable: bool,
    opened: Vec<ParticipantId>,
}

impl DocumentModel for HostDocument {
    fn snapshot(&self) -> Option<EncounterSnapshot> {
        self.encounter.clone()
    }

    fn viewer_is_privileged(&self) -> bool {
        self.privileged
    }

    fn can_observe(&self, _id: &ParticipantId) -> bool {
        !self.unobservable
    }

    fn update_participant(
        &mut self,
        id: &ParticipantId,
        update: SpotlightUpdate,
    ) -> Result<(), DocumentError> {
        let encounter = self
            .encounter
            .as_mut()
            .ok_or_else(|| DocumentError::Rejected("no encounter".into()))?;
        let participant = encounter
            .participants
            .iter_mut()
            .find(|p| &p.id == id)
            .ok_or_else(|| DocumentError::Rejected("unknown participant".into()))?;
        participant.spotlight = SpotlightRequest {
            requesting: update.requesting,
            order_index: update.order_index,
        };
        Ok(())
    }

    fn assign_spotlight(&mut self, _id: &ParticipantId) -> Result<(), DocumentError> {
        Ok(())
    }

    fn open_sheet(&mut self, id: &ParticipantId) {
        self.opened.push(id.clone());
    }
}

#[derive(Default)]
struct HostStage;

impl Stage for HostStage {
    fn token_of(&self, id: &ParticipantId) -> Option<TokenId> {
        Some(TokenId(format!("tok-{id}")))
    }
    fn can_hover(&self, _token: &TokenId) -> bool {
        true
    }
    fn set_hover(&mut self, _token: &TokenId, _hovered: bool) {}
    fn can_select(&self, _token: &TokenId) -> bool {
        true
    }
    fn select_exclusive(&mut self, _token: &TokenId) -> bool {
        true
    }
    fn pan_to(&mut self, _token: &TokenId) {}
}

fn roster() -> EncounterSnapshot {
    // Turn order: B (allied), X (opposing), A (allied, requesting with
    // token 3). The active turn is B's.
    EncounterSnapshot::new(vec![
        Participant::new("b", "Borg", Faction::Allied),
        Participant::new("x", "Xan", Faction::Opposing),
        Participant::new("a", "Ayla", Faction::Allied)
            .with_spotlight(SpotlightRequest::active(3)),
    ])
    .with_active_turn(0)
}

fn controller(
    encounter: Option<EncounterSnapshot>,
) -> TrackerController<HostDocument, HostStage, RowTemplate> {
    let document = HostDocument {
        encounter,
        ..HostDocument::default()
    };
    TrackerController::new(document, HostStage, RowTemplate, MotionPolicy::default())
}

fn left() -> PanelId {
    PanelId::for_faction(Faction::Allied)
}

fn right() -> PanelId {
    PanelId::for_faction(Faction::Opposing)
}

fn row_ids(
    tracker: &TrackerController<HostDocument, HostStage, RowTemplate>,
    panel: &PanelId,
) -> Vec<String> {
    tracker
        .registry()
        .get(panel)
        .expect("panel exists")
        .fragment()
        .nodes()
        .iter()
        .map(|n| n.key().as_str().to_string())
        .collect()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

#[test]
fn ready_with_active_encounter_mounts_both_panels() {
    init_tracing();
    let mut tracker = controller(Some(roster()));
    let ticket = tracker.notify(EncounterEvent::Ready).expect("renders");

    assert!(!ticket.has_failures());
    assert!(tracker.is_rendered());
    assert_eq!(row_ids(&tracker, &left()), ["b", "a"]);
    assert_eq!(row_ids(&tracker, &right()), ["x"]);
}

#[test]
fn ready_without_encounter_creates_panels_but_renders_nothing() {
    let mut tracker = controller(None);
    assert!(tracker.notify(EncounterEvent::Ready).is_none());
    assert_eq!(tracker.registry().len(), 2);
    assert!(!tracker.is_rendered());
}

#[test]
fn current_turn_row_leads_despite_spotlight_order() {
    // A carries spotlight token 3 but B holds the active turn: [B, A].
    let mut tracker = controller(Some(roster()));
    tracker.notify(EncounterEvent::Ready);
    assert_eq!(row_ids(&tracker, &left()), ["b", "a"]);
}

#[test]
fn nav_toggle_round_trips_show_and_hide() {
    let mut tracker = controller(Some(roster()));
    tracker.notify(EncounterEvent::Ready);
    tracker.tick(MS(1500));
    assert!(tracker.is_rendered());

    // Everything visible: toggle closes.
    let close = tracker.notify(EncounterEvent::NavToggle).expect("closes");
    assert!(!tracker.is_settled(&close));
    tracker.tick(MS(1300));
    assert!(tracker.is_settled(&close));
    assert!(!tracker.is_rendered());

    // Everything hidden: toggle force-renders fresh panels.
    tracker.notify(EncounterEvent::NavToggle);
    assert!(tracker.is_rendered());
    let panel = tracker.registry().get(&left()).unwrap();
    assert!(panel.is_animating(), "reopen replays the entrance");
}

#[test]
fn mixed_panel_states_force_render_both() {
    let mut tracker = controller(Some(roster()));
    tracker.notify(EncounterEvent::Ready);
    tracker.tick(MS(1500));

    // Close just the left panel behind the adapter's back.
    let policy = MotionPolicy::default();
    tracker
        .registry_mut()
        .get_mut(&left())
        .unwrap()
        .close(&policy);
    tracker.tick(MS(1300));
    let states: Vec<RenderState> = tracker.registry().iter().map(|p| p.state()).collect();
    assert_eq!(states, [RenderState::Closed, RenderState::Rendered]);
    assert!(!tracker.is_rendered(), "aggregate follows the weakest panel");

    // The toggle reads only the aggregate: both get force-rendered, the
    // already-visible right panel redundantly.
    tracker
        .notify(EncounterEvent::NavToggle)
        .expect("force render");
    assert!(tracker.is_rendered());
    let states: Vec<RenderState> = tracker.registry().iter().map(|p| p.state()).collect();
    assert_eq!(states, [RenderState::Rendered, RenderState::Rendered]);
}

#[test]
fn encounter_deleted_closes_only_when_none_remains() {
    let mut tracker = controller(Some(roster()));
    tracker.notify(EncounterEvent::Ready);
    tracker.tick(MS(1500));

    // Another encounter still active: refresh, not close.
    tracker.notify(EncounterEvent::EncounterDeleted);
    assert!(tracker.is_rendered());

    // Last encounter gone: close all.
    tracker.document_mut().encounter = None;
    let close = tracker
        .notify(EncounterEvent::EncounterDeleted)
        .expect("closes");
    tracker.tick(MS(1300));
    assert!(tracker.is_settled(&close));
    assert!(!tracker.is_rendered());
}

#[test]
fn sequential_spotlight_requests_get_tokens_one_and_two() {
    let encounter = EncounterSnapshot::new(vec![
        Participant::new("p1", "One", Faction::Allied),
        Participant::new("p2", "Two", Faction::Allied),
        Participant::new("p3", "Three", Faction::Allied),
    ]);
    let mut tracker = controller(Some(encounter));
    tracker.notify(EncounterEvent::Ready);

    tracker
        .dispatch(&left(), ACTION_REQUEST_SPOTLIGHT, Some(&"p2".into()))
        .unwrap();
    tracker.notify(EncounterEvent::ParticipantUpdated("p2".into()));
    tracker
        .dispatch(&left(), ACTION_REQUEST_SPOTLIGHT, Some(&"p3".into()))
        .unwrap();
    tracker.notify(EncounterEvent::ParticipantUpdated("p3".into()));

    let snapshot = tracker.document().snapshot().unwrap();
    assert_eq!(snapshot.participant(&"p2".into()).unwrap().spotlight.order_index, 1);
    assert_eq!(snapshot.participant(&"p3".into()).unwrap().spotlight.order_index, 2);

    // FIFO among requesters, idle rows last.
    assert_eq!(row_ids(&tracker, &left()), ["p2", "p3", "p1"]);
}

#[test]
fn rerequest_after_withdrawal_gets_a_fresh_greater_token() {
    let encounter = EncounterSnapshot::new(vec![
        Participant::new("p1", "One", Faction::Allied),
        Participant::new("p2", "Two", Faction::Allied),
    ]);
    let mut tracker = controller(Some(encounter));
    tracker.notify(EncounterEvent::Ready);

    // p1 on (token 1), p2 on (token 2), p1 off, p1 on again.
    tracker
        .dispatch(&left(), ACTION_REQUEST_SPOTLIGHT, Some(&"p1".into()))
        .unwrap();
    tracker
        .dispatch(&left(), ACTION_REQUEST_SPOTLIGHT, Some(&"p2".into()))
        .unwrap();
    tracker.notify(EncounterEvent::ParticipantUpdated("p1".into()));

    tracker
        .dispatch(&left(), ACTION_REQUEST_SPOTLIGHT, Some(&"p1".into()))
        .unwrap();
    tracker.tick(MS(500)); // retract completes, withdrawal write lands
    assert_eq!(
        tracker
            .document()
            .snapshot()
            .unwrap()
            .participant(&"p1".into())
            .unwrap()
            .spotlight,
        SpotlightRequest::default()
    );

    tracker
        .dispatch(&left(), ACTION_REQUEST_SPOTLIGHT, Some(&"p1".into()))
        .unwrap();
    let token = tracker
        .document()
        .snapshot()
        .unwrap()
        .participant(&"p1".into())
        .unwrap()
        .spotlight
        .order_index;
    assert_eq!(token, 3, "withdrawn token 1 is never reused");
}

#[test]
fn withdrawal_write_waits_for_the_retract_animation() {
    let encounter = EncounterSnapshot::new(vec![
        Participant::new("p1", "One", Faction::Allied).with_spotlight(SpotlightRequest::active(1)),
    ]);
    let mut tracker = controller(Some(encounter));
    tracker.notify(EncounterEvent::Ready);

    tracker
        .dispatch(&left(), ACTION_REQUEST_SPOTLIGHT, Some(&"p1".into()))
        .unwrap();

    // Mid-retract: the document still shows the request as open.
    tracker.tick(MS(200));
    assert!(
        tracker
            .document()
            .snapshot()
            .unwrap()
            .participant(&"p1".into())
            .unwrap()
            .spotlight
            .requesting
    );

    tracker.tick(MS(300));
    assert!(
        !tracker
            .document()
            .snapshot()
            .unwrap()
            .participant(&"p1".into())
            .unwrap()
            .spotlight
            .requesting
    );
}

#[test]
fn frame_pump_derives_deltas_from_instants() {
    use web_time::Instant;

    let encounter = EncounterSnapshot::new(vec![
        Participant::new("p1", "One", Faction::Allied).with_spotlight(SpotlightRequest::active(1)),
    ]);
    let mut tracker = controller(Some(encounter));
    tracker.notify(EncounterEvent::Ready);
    tracker
        .dispatch(&left(), ACTION_REQUEST_SPOTLIGHT, Some(&"p1".into()))
        .unwrap();

    // First frame establishes the baseline; the second spans the retract.
    let t0 = Instant::now();
    tracker.frame(t0);
    tracker.frame(t0 + MS(450));

    assert!(
        !tracker
            .document()
            .snapshot()
            .unwrap()
            .participant(&"p1".into())
            .unwrap()
            .spotlight
            .requesting
    );
}

#[test]
fn event_queue_pump_handles_buffered_events_in_order() {
    let mut tracker = controller(Some(roster()));
    let mut queue = EventQueue::new();
    queue.emit(EncounterEvent::Ready);
    queue.emit(EncounterEvent::EncounterUpdated);

    let tickets = tracker.pump(&mut queue);
    assert_eq!(tickets.len(), 2);
    assert!(tracker.is_rendered());
    assert!(queue.is_empty());
}

#[test]
fn double_click_opens_sheet_only_with_observer_rights() {
    let mut tracker = controller(Some(roster()));
    tracker.notify(EncounterEvent::Ready);

    tracker.double_click(&"a".into());
    assert_eq!(tracker.document().opened, vec![ParticipantId::from("a")]);

    tracker.document_mut().unobservable = true;
    tracker.double_click(&"b".into());
    assert_eq!(tracker.document().opened.len(), 1);
}

#[test]
fn hover_highlight_transfers_between_rows() {
    let mut tracker = controller(Some(roster()));
    tracker.notify(EncounterEvent::Ready);

    tracker.pointer_enter(&left(), &"b".into());
    tracker.pointer_enter(&left(), &"a".into());
    let highlighted = tracker
        .registry()
        .get(&left())
        .unwrap()
        .highlighted()
        .cloned();
    assert_eq!(highlighted, Some(TokenId("tok-a".into())));

    tracker.pointer_leave(&left(), &"a".into());
    assert!(tracker.registry().get(&left()).unwrap().highlighted().is_none());
}

#[test]
fn participant_update_reorders_with_continuity() {
    let mut tracker = controller(Some(roster()));
    tracker.notify(EncounterEvent::Ready);
    tracker.tick(MS(2000)); // entrance done

    // The active turn moves to A; A should lead the allied panel now.
    tracker.document_mut().encounter = Some(roster().with_active_turn(2));
    tracker.notify(EncounterEvent::EncounterUpdated);
    assert_eq!(row_ids(&tracker, &left()), ["a", "b"]);

    // Mid-transition the rows are between their old and new slots.
    let panel = tracker.registry().get(&left()).unwrap();
    assert!(panel.is_animating());
    tracker.tick(MS(600));
    let panel = tracker.registry().get(&left()).unwrap();
    assert!(!panel.is_animating());
    let policy = MotionPolicy::default();
    assert_eq!(panel.fragment().nodes()[0].rect().y, policy.row_slot(0));
    assert_eq!(panel.fragment().nodes()[1].rect().y, policy.row_slot(1));
}
