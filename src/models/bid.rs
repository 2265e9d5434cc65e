//! Bid model, status rules and decision outcomes

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a bid.
///
/// Canonical wire strings are `Created`, `Published` and `Canceled`.
/// `Closed` belongs to the tender status set and is rejected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidStatus {
    Created,
    Published,
    Canceled,
}

impl BidStatus {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Created" => Some(Self::Created),
            "Published" => Some(Self::Published),
            "Canceled" => Some(Self::Canceled),
            _ => None,
        }
    }

    pub fn is_valid(s: &str) -> bool {
        Self::parse(s).is_some()
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Created => "Created",
            Self::Published => "Published",
            Self::Canceled => "Canceled",
        }
    }

    /// Whether `next` is reachable from `self` in the bid state machine
    /// (`Created -> Published -> Canceled`). Re-asserting the current
    /// status is always allowed. Only consulted when the
    /// `enforce_status_transitions` policy flag is on.
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next
            || matches!(
                (self, next),
                (Self::Created, Self::Published) | (Self::Published, Self::Canceled)
            )
    }
}

impl std::fmt::Display for BidStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal decision recorded on a bid. Once written it is the final
/// outcome; no further transition is modeled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BidDecision {
    Approved,
    Rejected,
}

impl BidDecision {
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Approved" => Some(Self::Approved),
            "Rejected" => Some(Self::Rejected),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Approved => "Approved",
            Self::Rejected => "Rejected",
        }
    }
}

impl std::fmt::Display for BidDecision {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Bid {
    pub id: Uuid,
    pub tender_id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: BidStatus,
    pub decision: Option<BidDecision>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator_username: String,
}

/// Input for bid creation. The status is set by the lifecycle service,
/// never taken from the caller.
#[derive(Debug, Clone)]
pub struct NewBid {
    pub tender_id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: String,
    pub status: BidStatus,
    pub creator_username: String,
}

/// Partial update for a bid: only title and description are editable
/// this way. Empty strings count as "not supplied".
#[derive(Debug, Clone, Default)]
pub struct BidPatch {
    pub title: Option<String>,
    pub description: Option<String>,
}

impl BidPatch {
    /// Drop empty-string fields; the wire treats them as absent.
    pub fn normalize(mut self) -> Self {
        self.title = self.title.filter(|s| !s.is_empty());
        self.description = self.description.filter(|s| !s.is_empty());
        self
    }
}
