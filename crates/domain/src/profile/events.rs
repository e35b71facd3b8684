//! Buyer profile events.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;

use super::ProfilePatch;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum BuyerProfileEvent {
    /// Carries only the fields that changed.
    ProfileUpdated(ProfileUpdatedData),
}

impl DomainEvent for BuyerProfileEvent {
    fn event_type(&self) -> &'static str {
        match self {
            BuyerProfileEvent::ProfileUpdated(_) => "ProfileUpdated",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfileUpdatedData {
    pub user_id: UserId,
    pub changes: ProfilePatch,
    pub updated_at: DateTime<Utc>,
}
