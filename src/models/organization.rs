//! Organization and employee reference entities
//!
//! These establish the authorization graph: an `OrganizationResponsible`
//! row links an employee to an organization they may act for. The
//! lifecycle services read this graph but own no create/delete
//! operations for it; rows are seeded by migrations or admin tooling.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OrganizationType {
    IE,
    LLC,
    JSC,
}

impl OrganizationType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::IE => "IE",
            Self::LLC => "LLC",
            Self::JSC => "JSC",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Organization {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub org_type: OrganizationType,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Employee {
    pub id: Uuid,
    pub username: String,
    pub first_name: String,
    pub last_name: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Membership fact: the named employee may act on behalf of the
/// organization.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OrganizationResponsible {
    pub id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
}
