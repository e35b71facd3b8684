//! Seller profile aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, SellerId, UserId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;
use crate::value_objects::PostalAddress;

use super::{ApplicationSubmittedData, SellerApprovedData, SellerError, SellerProfileEvent};

/// The identity documents an applicant uploads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DocumentKind {
    PanCardFront,
    PanCardBack,
    AadharCardFront,
    AadharCardBack,
}

impl DocumentKind {
    pub const ALL: [DocumentKind; 4] = [
        DocumentKind::PanCardFront,
        DocumentKind::PanCardBack,
        DocumentKind::AadharCardFront,
        DocumentKind::AadharCardBack,
    ];

    /// Name used in upload paths and blob keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentKind::PanCardFront => "panCardFront",
            DocumentKind::PanCardBack => "panCardBack",
            DocumentKind::AadharCardFront => "aadharCardFront",
            DocumentKind::AadharCardBack => "aadharCardBack",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|k| k.as_str() == s)
    }
}

/// Blob URLs of the uploaded identity documents.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SellerDocuments {
    #[serde(alias = "panCardFront")]
    pub pan_card_front: Option<String>,
    #[serde(alias = "panCardBack")]
    pub pan_card_back: Option<String>,
    #[serde(alias = "aadharCardFront")]
    pub aadhar_card_front: Option<String>,
    #[serde(alias = "aadharCardBack")]
    pub aadhar_card_back: Option<String>,
}

impl SellerDocuments {
    pub fn get(&self, kind: DocumentKind) -> Option<&str> {
        match kind {
            DocumentKind::PanCardFront => self.pan_card_front.as_deref(),
            DocumentKind::PanCardBack => self.pan_card_back.as_deref(),
            DocumentKind::AadharCardFront => self.aadhar_card_front.as_deref(),
            DocumentKind::AadharCardBack => self.aadhar_card_back.as_deref(),
        }
    }

    pub fn is_complete(&self) -> bool {
        DocumentKind::ALL
            .iter()
            .all(|k| self.get(*k).is_some_and(|url| !url.trim().is_empty()))
    }
}

/// Input for applying to become a seller.
#[derive(Debug, Clone)]
pub struct SellerApplication {
    pub shop_name: String,
    pub gst_number: String,
    pub address: PostalAddress,
    pub documents: SellerDocuments,
}

/// A user's seller profile, keyed by the user id.
#[derive(Debug, Clone, Default)]
pub struct SellerProfile {
    user_id: Option<UserId>,
    version: Version,
    shop_name: String,
    gst_number: String,
    address: PostalAddress,
    documents: SellerDocuments,
    requested: bool,
    approved: bool,
    submitted_at: Option<DateTime<Utc>>,
    approved_at: Option<DateTime<Utc>>,
}

impl Aggregate for SellerProfile {
    type Event = SellerProfileEvent;
    type Error = SellerError;

    fn aggregate_type() -> &'static str {
        "SellerProfile"
    }

    fn id(&self) -> Option<AggregateId> {
        self.user_id.map(AggregateId::from)
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            SellerProfileEvent::ApplicationSubmitted(data) => {
                self.user_id = Some(data.user_id);
                self.shop_name = data.shop_name;
                self.gst_number = data.gst_number;
                self.address = data.address;
                self.documents = data.documents;
                self.requested = true;
                self.submitted_at = Some(data.submitted_at);
            }
            SellerProfileEvent::SellerApproved(data) => {
                self.approved = true;
                self.approved_at = Some(data.approved_at);
            }
        }
    }
}

// Query methods
impl SellerProfile {
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn seller_id(&self) -> Option<SellerId> {
        self.user_id.map(SellerId::for_user)
    }

    pub fn shop_name(&self) -> &str {
        &self.shop_name
    }

    pub fn gst_number(&self) -> &str {
        &self.gst_number
    }

    pub fn address(&self) -> &PostalAddress {
        &self.address
    }

    pub fn documents(&self) -> &SellerDocuments {
        &self.documents
    }

    /// Applied to become a seller.
    pub fn is_requested(&self) -> bool {
        self.requested
    }

    /// Approved by an administrator; gates every seller operation.
    pub fn is_approved(&self) -> bool {
        self.approved
    }

    pub fn submitted_at(&self) -> Option<DateTime<Utc>> {
        self.submitted_at
    }

    pub fn approved_at(&self) -> Option<DateTime<Utc>> {
        self.approved_at
    }

    /// Returns the seller id if this profile is approved.
    pub fn ensure_approved(&self) -> Result<SellerId, SellerError> {
        match self.seller_id() {
            Some(id) if self.approved => Ok(id),
            _ => Err(SellerError::NotApproved),
        }
    }
}

// Command methods (return events)
impl SellerProfile {
    /// Submits or resubmits an application. Approval survives resubmission.
    pub fn apply_for(
        &self,
        user_id: UserId,
        application: SellerApplication,
    ) -> Result<Vec<SellerProfileEvent>, SellerError> {
        let shop_name = application.shop_name.trim();
        let gst_number = application.gst_number.trim();
        if shop_name.is_empty() || gst_number.is_empty() {
            return Err(SellerError::IncompleteApplication(
                "Shop name and GST number are required",
            ));
        }
        if !application.address.is_complete() {
            return Err(SellerError::IncompleteApplication(
                "Complete address is required",
            ));
        }
        if !application.documents.is_complete() {
            return Err(SellerError::IncompleteApplication(
                "All document images (PAN front/back, Aadhaar front/back) are required",
            ));
        }

        Ok(vec![SellerProfileEvent::ApplicationSubmitted(
            ApplicationSubmittedData {
                user_id,
                shop_name: shop_name.to_string(),
                gst_number: gst_number.to_string(),
                address: application.address.trimmed(),
                documents: application.documents,
                submitted_at: Utc::now(),
            },
        )])
    }

    /// Approves the applicant. Approving twice records nothing.
    pub fn approve(&self, approved_by: UserId) -> Result<Vec<SellerProfileEvent>, SellerError> {
        if !self.requested {
            return Err(SellerError::NotApplied);
        }
        if self.approved {
            return Ok(vec![]);
        }
        Ok(vec![SellerProfileEvent::SellerApproved(SellerApprovedData {
            approved_by,
            approved_at: Utc::now(),
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn application() -> SellerApplication {
        SellerApplication {
            shop_name: " Weaves of Kanchi ".into(),
            gst_number: "33ABCDE1234F1Z5".into(),
            address: PostalAddress {
                district: None,
                street: Some("4 Gandhi Rd".into()),
                city: Some("Kanchipuram".into()),
                state: Some("TN".into()),
                zip_code: Some("631501".into()),
                country: Some("India".into()),
            },
            documents: SellerDocuments {
                pan_card_front: Some("https://blob/pf".into()),
                pan_card_back: Some("https://blob/pb".into()),
                aadhar_card_front: Some("https://blob/af".into()),
                aadhar_card_back: Some("https://blob/ab".into()),
            },
        }
    }

    #[test]
    fn apply_then_approve() {
        let user = UserId::new();
        let mut profile = SellerProfile::default();
        let events = profile.apply_for(user, application()).unwrap();
        profile.apply_events(events);

        assert!(profile.is_requested());
        assert_eq!(profile.shop_name(), "Weaves of Kanchi");
        assert_eq!(profile.ensure_approved(), Err(SellerError::NotApproved));

        let events = profile.approve(UserId::new()).unwrap();
        profile.apply_events(events);
        assert_eq!(profile.ensure_approved(), Ok(SellerId::for_user(user)));
        assert!(profile.approve(UserId::new()).unwrap().is_empty());
    }

    #[test]
    fn application_requires_every_part() {
        let profile = SellerProfile::default();
        let user = UserId::new();

        let mut app = application();
        app.gst_number = " ".into();
        assert_eq!(
            profile.apply_for(user, app).unwrap_err(),
            SellerError::IncompleteApplication("Shop name and GST number are required")
        );

        let mut app = application();
        app.address.country = None;
        assert_eq!(
            profile.apply_for(user, app).unwrap_err(),
            SellerError::IncompleteApplication("Complete address is required")
        );

        let mut app = application();
        app.documents.aadhar_card_back = None;
        assert!(matches!(
            profile.apply_for(user, app),
            Err(SellerError::IncompleteApplication(_))
        ));
    }

    #[test]
    fn approve_requires_application() {
        assert_eq!(
            SellerProfile::default().approve(UserId::new()).unwrap_err(),
            SellerError::NotApplied
        );
    }

    #[test]
    fn resubmission_keeps_approval() {
        let user = UserId::new();
        let mut profile = SellerProfile::default();
        let events = profile.apply_for(user, application()).unwrap();
        profile.apply_events(events);
        let events = profile.approve(UserId::new()).unwrap();
        profile.apply_events(events);

        let mut app = application();
        app.shop_name = "Kanchi Looms".into();
        let events = profile.apply_for(user, app).unwrap();
        profile.apply_events(events);

        assert!(profile.is_approved());
        assert_eq!(profile.shop_name(), "Kanchi Looms");
    }

    #[test]
    fn document_kinds_parse() {
        assert_eq!(DocumentKind::parse("panCardBack"), Some(DocumentKind::PanCardBack));
        assert_eq!(DocumentKind::parse("passport"), None);
    }
}
