//! Seller profile events.

use chrono::{DateTime, Utc};
use common::UserId;
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::PostalAddress;

use super::SellerDocuments;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SellerProfileEvent {
    /// A first application or a resubmission replacing the previous one.
    ApplicationSubmitted(ApplicationSubmittedData),

    SellerApproved(SellerApprovedData),
}

impl DomainEvent for SellerProfileEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SellerProfileEvent::ApplicationSubmitted(_) => "SellerApplicationSubmitted",
            SellerProfileEvent::SellerApproved(_) => "SellerApproved",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApplicationSubmittedData {
    pub user_id: UserId,
    pub shop_name: String,
    pub gst_number: String,
    pub address: PostalAddress,
    pub documents: SellerDocuments,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SellerApprovedData {
    pub approved_by: UserId,
    pub approved_at: DateTime<Utc>,
}
