#![forbid(unsafe_code)]

//! Encounter snapshot records.
//!
//! All types here are read-only projections of host-owned state. The host
//! document model supplies an [`EncounterSnapshot`] at recompute time and
//! the snapshot is immutable for the duration of one recompute cycle.
//! Writes go back through the host as a single atomic [`SpotlightUpdate`].

use std::fmt;

use serde::{Deserialize, Serialize};

/// Stable identity of one encounter participant.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ParticipantId(pub String);

impl ParticipantId {
    /// Borrow the raw id string.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Identity of the stage token associated with a participant.
///
/// Tokens live on the host's canvas; a participant may have none (e.g. an
/// off-stage entrant), in which case selection and hover actions no-op.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TokenId(pub String);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TokenId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

/// Which of the two roster panels a participant belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Faction {
    /// The viewer's side; shown in the left panel.
    Allied,
    /// The opposing side; shown in the right panel.
    Opposing,
}

impl Faction {
    /// The panel side suffix used when templating panel ids.
    #[must_use]
    pub const fn side(self) -> &'static str {
        match self {
            Faction::Allied => "left",
            Faction::Opposing => "right",
        }
    }

    /// The other faction.
    #[must_use]
    pub const fn other(self) -> Faction {
        match self {
            Faction::Allied => Faction::Opposing,
            Faction::Opposing => Faction::Allied,
        }
    }
}

impl fmt::Display for Faction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.side())
    }
}

/// A participant's spotlight-request sub-record.
///
/// `order_index == 0` means "never requested / not currently queued". Any
/// positive value is a priority token: lower = requested earlier. Tokens
/// are never renumbered when a request is withdrawn, so gaps are normal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotlightRequest {
    /// Whether the participant currently requests the spotlight.
    pub requesting: bool,
    /// Priority token; 0 when not queued.
    pub order_index: u32,
}

impl SpotlightRequest {
    /// An active request carrying the given priority token.
    #[must_use]
    pub const fn active(order_index: u32) -> Self {
        Self {
            requesting: true,
            order_index,
        }
    }
}

/// The atomic write shape sent back to the host document model when a
/// spotlight request is toggled. Both fields are always written together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SpotlightUpdate {
    pub requesting: bool,
    pub order_index: u32,
}

/// One entrant in an encounter. Read-only to this engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    pub id: ParticipantId,
    pub name: String,
    pub faction: Faction,
    /// The participant's stage token, when one is placed.
    pub token: Option<TokenId>,
    pub spotlight: SpotlightRequest,
}

impl Participant {
    /// A participant with no token and no active request.
    #[must_use]
    pub fn new(id: impl Into<ParticipantId>, name: impl Into<String>, faction: Faction) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            faction,
            token: None,
            spotlight: SpotlightRequest::default(),
        }
    }

    /// Attach a stage token (builder pattern).
    #[must_use]
    pub fn with_token(mut self, token: impl Into<TokenId>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// Set the spotlight request state (builder pattern).
    #[must_use]
    pub fn with_spotlight(mut self, spotlight: SpotlightRequest) -> Self {
        self.spotlight = spotlight;
        self
    }
}

/// An immutable view of one encounter: the ordered turn sequence plus the
/// current-turn pointer. "No encounter" is expressed as `None` at the
/// document-model seam, not as an empty snapshot.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EncounterSnapshot {
    /// Participants in turn order.
    pub participants: Vec<Participant>,
    /// Index into `participants` of the active turn, if the encounter has
    /// started.
    pub active_turn: Option<usize>,
}

impl EncounterSnapshot {
    /// Snapshot with the given participants and no active turn.
    #[must_use]
    pub fn new(participants: Vec<Participant>) -> Self {
        Self {
            participants,
            active_turn: None,
        }
    }

    /// Set the active turn index (builder pattern).
    #[must_use]
    pub fn with_active_turn(mut self, turn: usize) -> Self {
        self.active_turn = Some(turn);
        self
    }

    /// Look up a participant by id.
    #[must_use]
    pub fn participant(&self, id: &ParticipantId) -> Option<&Participant> {
        self.participants.iter().find(|p| &p.id == id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn faction_sides_are_distinct() {
        assert_eq!(Faction::Allied.side(), "left");
        assert_eq!(Faction::Opposing.side(), "right");
        assert_eq!(Faction::Allied.other(), Faction::Opposing);
    }

    #[test]
    fn default_request_is_unqueued() {
        let req = SpotlightRequest::default();
        assert!(!req.requesting);
        assert_eq!(req.order_index, 0);
    }

    #[test]
    fn snapshot_lookup_by_id() {
        let snap = EncounterSnapshot::new(vec![
            Participant::new("a", "Ayla", Faction::Allied),
            Participant::new("b", "Borg", Faction::Opposing),
        ]);
        assert_eq!(snap.participant(&"b".into()).map(|p| p.name.as_str()), Some("Borg"));
        assert!(snap.participant(&"zz".into()).is_none());
    }
}
