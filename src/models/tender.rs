//! Tender model and status rules

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Lifecycle status of a tender.
///
/// The canonical wire strings are `Created`, `Published` and `Closed`
/// (case-sensitive). `Canceled` belongs to the bid status set and is
/// rejected here.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TenderStatus {
    Created,
    Published,
    Closed,
}

impl TenderStatus {
    /// Parse a canonical status string. Anything outside the set
    /// (including the empty string) yields `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Created" => Some(Self::Created),
            "Published" => Some(Self::Published),
            "Closed" => Some(Self::Closed),
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
            Self::Closed => "Closed",
        }
    }

    /// Whether `next` is reachable from `self` in the tender state
    /// machine (`Created -> Published -> Closed`). Re-asserting the
    /// current status is always allowed. Only consulted when the
    /// `enforce_status_transitions` policy flag is on; the default mode
    /// accepts any valid status at any state.
    pub fn can_transition_to(self, next: Self) -> bool {
        self == next
            || matches!(
                (self, next),
                (Self::Created, Self::Published) | (Self::Published, Self::Closed)
            )
    }
}

impl std::fmt::Display for TenderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tender {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub status: TenderStatus,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub creator_username: String,
}

/// Input for tender creation. The status is set by the lifecycle
/// service, never taken from the caller.
#[derive(Debug, Clone)]
pub struct NewTender {
    pub organization_id: Uuid,
    pub title: String,
    pub description: String,
    pub service_type: String,
    pub status: TenderStatus,
    pub creator_username: String,
}

/// Partial update for a tender. The wire treats empty strings as "not
/// supplied". The status string is validated by the lifecycle service
/// before it reaches storage.
#[derive(Debug, Clone, Default)]
pub struct TenderPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
}

impl TenderPatch {
    /// Drop empty-string fields; the wire treats them as absent.
    pub fn normalize(mut self) -> Self {
        self.title = self.title.filter(|s| !s.is_empty());
        self.description = self.description.filter(|s| !s.is_empty());
        self.status = self.status.filter(|s| !s.is_empty());
        self
    }
}
