#![forbid(unsafe_code)]

//! Ordering engine and spotlight priority tokens.
//!
//! [`compute_rows`] projects an encounter snapshot into the sorted display
//! list for one panel, and [`next_priority_token`] assigns the monotonic
//! tokens that give FIFO ordering among concurrent requesters.
//!
//! # Invariants
//!
//! 1. Rows are partitioned disjointly by faction: the union of both panels'
//!    rows equals the snapshot's full participant set.
//! 2. The current-turn row, when present in a panel, sorts first regardless
//!    of its spotlight order.
//! 3. Non-current rows sort by ascending spotlight order; ties preserve
//!    snapshot order (the sort is stable).
//! 4. Tokens assigned on one faction are strictly increasing and never
//!    reused, even after a request is withdrawn and re-raised.

use bitflags::bitflags;

use crate::model::{EncounterSnapshot, Faction, Participant, ParticipantId, TokenId};

bitflags! {
    /// Presentation flags derived per row for template consumption.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct RowFlags: u8 {
        /// The row holds the active turn.
        const CURRENT = 1 << 0;
        /// The row has an open spotlight request.
        const REQUESTING = 1 << 1;
        /// The viewer may use privileged actions on this row.
        const PRIVILEGED = 1 << 2;
    }
}

/// One row of a panel's display list.
///
/// Ephemeral: recomputed on every cycle and never persisted. `spotlight_order`
/// is the participant's priority token with 0 (not queued) remapped to
/// `+inf` so non-requesting rows sort last.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayRow {
    pub participant_id: ParticipantId,
    pub name: String,
    pub token: Option<TokenId>,
    /// Index of this participant in the snapshot's turn sequence.
    pub turn: usize,
    pub is_current: bool,
    pub is_requesting: bool,
    pub spotlight_order: f64,
    /// Pass-through annotation for downstream action gating; the ordering
    /// engine does not itself enforce permission.
    pub viewer_is_privileged: bool,
}

impl DisplayRow {
    /// The row's presentation flags.
    #[must_use]
    pub fn flags(&self) -> RowFlags {
        let mut flags = RowFlags::empty();
        if self.is_current {
            flags |= RowFlags::CURRENT;
        }
        if self.is_requesting {
            flags |= RowFlags::REQUESTING;
        }
        if self.viewer_is_privileged {
            flags |= RowFlags::PRIVILEGED;
        }
        flags
    }
}

/// Project a snapshot into the sorted display list for one panel.
///
/// Filters to `faction`, remaps a zero order index to `+inf`, then sorts
/// current-turn-first and ascending spotlight order. The sort is stable, so
/// equal spotlight orders (typically two non-requesting rows, both `+inf`)
/// keep the snapshot's relative order.
///
/// `None` (no active encounter) yields an empty list.
#[must_use]
pub fn compute_rows(
    snapshot: Option<&EncounterSnapshot>,
    faction: Faction,
    viewer_is_privileged: bool,
) -> Vec<DisplayRow> {
    let Some(snapshot) = snapshot else {
        return Vec::new();
    };

    let mut rows: Vec<DisplayRow> = snapshot
        .participants
        .iter()
        .enumerate()
        .filter(|(_, p)| p.faction == faction)
        .map(|(turn, p)| DisplayRow {
            participant_id: p.id.clone(),
            name: p.name.clone(),
            token: p.token.clone(),
            turn,
            is_current: snapshot.active_turn == Some(turn),
            is_requesting: p.spotlight.requesting,
            spotlight_order: if p.spotlight.order_index == 0 {
                f64::INFINITY
            } else {
                f64::from(p.spotlight.order_index)
            },
            viewer_is_privileged,
        })
        .collect();

    rows.sort_by(|a, b| {
        b.is_current
            .cmp(&a.is_current)
            .then_with(|| a.spotlight_order.total_cmp(&b.spotlight_order))
    });
    rows
}

/// Compute the next spotlight priority token for `faction`.
///
/// Returns `max(order_index on that faction) + 1`, or 1 when nobody on the
/// faction has ever requested. Withdrawn requests keep their (now inert)
/// token value in history but contribute nothing here only if the host
/// zeroed them on withdrawal; either way the result is strictly greater
/// than every token currently visible on the faction, so relative FIFO
/// order among live requesters is preserved and tokens are never reused.
#[must_use]
pub fn next_priority_token(participants: &[Participant], faction: Faction) -> u32 {
    participants
        .iter()
        .filter(|p| p.faction == faction)
        .map(|p| p.spotlight.order_index)
        .max()
        .unwrap_or(0)
        .saturating_add(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SpotlightRequest;

    use proptest::prelude::*;

    fn participant(
        id: &str,
        faction: Faction,
        requesting: bool,
        order_index: u32,
    ) -> Participant {
        Participant::new(id, id.to_uppercase(), faction).with_spotlight(SpotlightRequest {
            requesting,
            order_index,
        })
    }

    #[test]
    fn no_encounter_yields_no_rows() {
        assert!(compute_rows(None, Faction::Allied, false).is_empty());
    }

    #[test]
    fn current_turn_sorts_first_despite_spotlight_order() {
        // A is at turn 2 with a token, B at turn 0 without; turn 0 is active.
        let snap = EncounterSnapshot::new(vec![
            participant("b", Faction::Allied, false, 0),
            participant("x", Faction::Opposing, false, 0),
            participant("a", Faction::Allied, true, 3),
        ])
        .with_active_turn(0);

        let rows = compute_rows(Some(&snap), Faction::Allied, false);
        let ids: Vec<_> = rows.iter().map(|r| r.participant_id.as_str()).collect();
        assert_eq!(ids, ["b", "a"]);
        assert!(rows[0].is_current);
        assert_eq!(rows[1].spotlight_order, 3.0);
    }

    #[test]
    fn requesting_rows_sort_before_idle_rows() {
        let snap = EncounterSnapshot::new(vec![
            participant("idle", Faction::Allied, false, 0),
            participant("late", Faction::Allied, true, 7),
            participant("early", Faction::Allied, true, 2),
        ]);

        let rows = compute_rows(Some(&snap), Faction::Allied, false);
        let ids: Vec<_> = rows.iter().map(|r| r.participant_id.as_str()).collect();
        assert_eq!(ids, ["early", "late", "idle"]);
        assert_eq!(rows[2].spotlight_order, f64::INFINITY);
    }

    #[test]
    fn ties_preserve_snapshot_order() {
        let snap = EncounterSnapshot::new(vec![
            participant("first", Faction::Opposing, false, 0),
            participant("second", Faction::Opposing, false, 0),
            participant("third", Faction::Opposing, false, 0),
        ]);

        let rows = compute_rows(Some(&snap), Faction::Opposing, false);
        let ids: Vec<_> = rows.iter().map(|r| r.participant_id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }

    #[test]
    fn privilege_is_annotated_not_filtered() {
        let snap = EncounterSnapshot::new(vec![participant("a", Faction::Allied, false, 0)]);
        let rows = compute_rows(Some(&snap), Faction::Allied, true);
        assert!(rows[0].viewer_is_privileged);
        assert!(rows[0].flags().contains(RowFlags::PRIVILEGED));
    }

    #[test]
    fn first_token_on_quiet_faction_is_one() {
        let roster = [participant("a", Faction::Allied, false, 0)];
        assert_eq!(next_priority_token(&roster, Faction::Allied), 1);
        assert_eq!(next_priority_token(&[], Faction::Allied), 1);
    }

    #[test]
    fn sequential_toggles_get_one_then_two() {
        let mut roster = vec![
            participant("a", Faction::Allied, false, 0),
            participant("b", Faction::Allied, false, 0),
        ];

        let first = next_priority_token(&roster, Faction::Allied);
        assert_eq!(first, 1);
        roster[0].spotlight = SpotlightRequest::active(first);

        let second = next_priority_token(&roster, Faction::Allied);
        assert_eq!(second, 2);
        roster[1].spotlight = SpotlightRequest::active(second);

        let snap = EncounterSnapshot::new(roster);
        let ids: Vec<_> = compute_rows(Some(&snap), Faction::Allied, false)
            .into_iter()
            .map(|r| r.participant_id)
            .collect();
        assert_eq!(ids, [ParticipantId::from("a"), ParticipantId::from("b")]);
    }

    #[test]
    fn tokens_ignore_the_other_faction() {
        let roster = [
            participant("ally", Faction::Allied, true, 9),
            participant("foe", Faction::Opposing, false, 0),
        ];
        assert_eq!(next_priority_token(&roster, Faction::Opposing), 1);
        assert_eq!(next_priority_token(&roster, Faction::Allied), 10);
    }

    #[test]
    fn off_then_on_never_reuses_a_token() {
        // "a" requested (token 4) and withdrew, keeping the stale index.
        let mut roster = vec![
            participant("a", Faction::Allied, false, 4),
            participant("b", Faction::Allied, true, 3),
        ];
        let reissued = next_priority_token(&roster, Faction::Allied);
        assert_eq!(reissued, 5);
        roster[0].spotlight = SpotlightRequest::active(reissued);
        // The re-raised request now sorts after the still-open earlier one.
        let snap = EncounterSnapshot::new(roster);
        let ids: Vec<_> = compute_rows(Some(&snap), Faction::Allied, false)
            .into_iter()
            .map(|r| r.participant_id)
            .collect();
        assert_eq!(ids, [ParticipantId::from("b"), ParticipantId::from("a")]);
    }

    fn arb_snapshot() -> impl Strategy<Value = EncounterSnapshot> {
        prop::collection::vec((any::<bool>(), any::<bool>(), 0u32..64), 0..12).prop_map(|seeds| {
            let participants = seeds
                .into_iter()
                .enumerate()
                .map(|(i, (opposing, requesting, order))| {
                    let faction = if opposing {
                        Faction::Opposing
                    } else {
                        Faction::Allied
                    };
                    participant(&format!("p{i}"), faction, requesting, order)
                })
                .collect();
            EncounterSnapshot::new(participants)
        })
    }

    proptest! {
        #[test]
        fn factions_partition_the_snapshot(snap in arb_snapshot()) {
            let left = compute_rows(Some(&snap), Faction::Allied, false);
            let right = compute_rows(Some(&snap), Faction::Opposing, false);

            prop_assert_eq!(left.len() + right.len(), snap.participants.len());

            let mut seen: Vec<_> = left
                .iter()
                .chain(right.iter())
                .map(|r| r.participant_id.clone())
                .collect();
            seen.sort();
            let mut expected: Vec<_> = snap.participants.iter().map(|p| p.id.clone()).collect();
            expected.sort();
            prop_assert_eq!(seen, expected);
        }

        #[test]
        fn current_row_is_always_first(snap in arb_snapshot(), turn_seed in any::<prop::sample::Index>()) {
            if snap.participants.is_empty() {
                return Ok(());
            }
            let turn = turn_seed.index(snap.participants.len());
            let snap = snap.with_active_turn(turn);
            let faction = snap.participants[turn].faction;

            let rows = compute_rows(Some(&snap), faction, false);
            prop_assert!(rows[0].is_current);
            prop_assert!(rows.iter().skip(1).all(|r| !r.is_current));
        }

        #[test]
        fn assigned_tokens_are_strictly_increasing(count in 1usize..10) {
            let mut roster: Vec<Participant> = (0..count)
                .map(|i| participant(&format!("p{i}"), Faction::Allied, false, 0))
                .collect();

            let mut last = 0;
            for i in 0..count {
                let token = next_priority_token(&roster, Faction::Allied);
                prop_assert!(token > last, "token {token} not above {last}");
                last = token;
                roster[i].spotlight = SpotlightRequest::active(token);
            }
        }
    }
}
