//! # Participant Ledger
//!
//! The complete persisted state of a raffle: who contributed how much, and how
//! many tickets that bought them.
//!
//! Participants are keyed by an opaque platform id and kept in id order, so
//! every listing derived from a ledger is deterministic.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;

/// Opaque, stable participant identifier (the chat platform's user id).
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    /// Creates an id from anything string-like.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the id as a string slice.
    #[inline]
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

impl Borrow<str> for ParticipantId {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self(id.to_owned())
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

impl From<u64> for ParticipantId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

/// One participant's record.
///
/// Legacy records written with `name`, `fe_total` and `tickets` keys are
/// accepted on load; saving always uses the field names below.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participant {
    /// Label shown in listings, refreshed on every contribution.
    #[serde(alias = "name")]
    pub display_name: String,
    /// Sum of every accepted contribution.
    #[serde(alias = "fe_total")]
    pub total_contributed: u64,
    /// Tickets held. Stored, never recomputed from `total_contributed`.
    #[serde(alias = "tickets")]
    pub ticket_count: u64,
}

/// Aggregate figures over a whole ledger.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Standings {
    /// Number of participants with a record.
    pub participants: usize,
    /// Tickets across all participants.
    pub total_tickets: u64,
    /// Value contributed across all participants.
    pub total_contributed: u64,
}

/// Mapping of participant id to record.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ledger {
    #[serde(default)]
    participants: BTreeMap<ParticipantId, Participant>,
}

impl Ledger {
    /// Creates an empty ledger.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of participants with a record.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.participants.len()
    }

    /// Returns true if nobody has a record.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.participants.is_empty()
    }

    /// Looks up a participant by id.
    #[must_use]
    pub fn get(&self, id: &str) -> Option<&Participant> {
        self.participants.get(id)
    }

    /// Iterates participants in id order.
    pub fn iter(&self) -> impl Iterator<Item = (&ParticipantId, &Participant)> {
        self.participants.iter()
    }

    /// Restores a record exactly as given, replacing any existing one.
    ///
    /// Used when importing records; the ticket invariant is not checked.
    pub fn insert(&mut self, id: ParticipantId, participant: Participant) -> Option<Participant> {
        self.participants.insert(id, participant)
    }

    /// Computes aggregate figures. Sums saturate at `u64::MAX`.
    #[must_use]
    pub fn standings(&self) -> Standings {
        self.participants.values().fold(
            Standings {
                participants: self.participants.len(),
                ..Standings::default()
            },
            |acc, p| Standings {
                total_tickets: acc.total_tickets.saturating_add(p.ticket_count),
                total_contributed: acc.total_contributed.saturating_add(p.total_contributed),
                ..acc
            },
        )
    }

    /// Returns the record for `id`, creating a zeroed one if absent.
    pub(crate) fn record_mut(&mut self, id: ParticipantId) -> &mut Participant {
        self.participants.entry(id).or_default()
    }
}

impl FromIterator<(ParticipantId, Participant)> for Ledger {
    fn from_iter<I: IntoIterator<Item = (ParticipantId, Participant)>>(iter: I) -> Self {
        Self {
            participants: iter.into_iter().collect(),
        }
    }
}
