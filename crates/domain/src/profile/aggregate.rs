//! Buyer profile aggregate implementation.

use std::convert::Infallible;

use chrono::{DateTime, Utc};
use common::{AggregateId, UserId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::Aggregate;

use super::{BuyerProfileEvent, ProfileUpdatedData};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    Male,
    Female,
    Other,
}

impl Gender {
    /// Case-insensitive; anything else is None.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "male" => Some(Gender::Male),
            "female" => Some(Gender::Female),
            "other" => Some(Gender::Other),
            _ => None,
        }
    }
}

/// A partial profile update. `None` leaves the stored value alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfilePatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weight: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
}

impl ProfilePatch {
    pub fn is_empty(&self) -> bool {
        *self == ProfilePatch::default()
    }
}

/// A user's buyer profile, keyed by the user id.
#[derive(Debug, Clone, Default)]
pub struct BuyerProfile {
    user_id: Option<UserId>,
    version: Version,
    first_name: Option<String>,
    last_name: Option<String>,
    phone: Option<String>,
    age: Option<u32>,
    height: Option<f64>,
    weight: Option<f64>,
    gender: Option<Gender>,
    updated_at: Option<DateTime<Utc>>,
}

impl Aggregate for BuyerProfile {
    type Event = BuyerProfileEvent;
    type Error = Infallible;

    fn aggregate_type() -> &'static str {
        "BuyerProfile"
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
            BuyerProfileEvent::ProfileUpdated(data) => {
                let changes = data.changes;
                self.user_id = Some(data.user_id);
                self.first_name = changes.first_name.or(self.first_name.take());
                self.last_name = changes.last_name.or(self.last_name.take());
                self.phone = changes.phone.or(self.phone.take());
                self.age = changes.age.or(self.age);
                self.height = changes.height.or(self.height);
                self.weight = changes.weight.or(self.weight);
                self.gender = changes.gender.or(self.gender);
                self.updated_at = Some(data.updated_at);
            }
        }
    }
}

// Query methods
impl BuyerProfile {
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn phone(&self) -> Option<&str> {
        self.phone.as_deref()
    }

    pub fn age(&self) -> Option<u32> {
        self.age
    }

    pub fn height(&self) -> Option<f64> {
        self.height
    }

    pub fn weight(&self) -> Option<f64> {
        self.weight
    }

    pub fn gender(&self) -> Option<Gender> {
        self.gender
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        self.updated_at
    }

    /// First and last name joined by a space, or None if both are missing.
    pub fn full_name(&self) -> Option<String> {
        let parts: Vec<&str> = [self.first_name(), self.last_name()]
            .into_iter()
            .flatten()
            .collect();
        (!parts.is_empty()).then(|| parts.join(" "))
    }
}

// Command methods (return events)
impl BuyerProfile {
    /// Merges `patch` into the profile, creating it on first use.
    ///
    /// Blank strings and non-finite measurements are ignored, as are fields
    /// equal to what is already stored. Nothing left means no event.
    pub fn update(&self, user_id: UserId, patch: &ProfilePatch) -> Vec<BuyerProfileEvent> {
        fn text(new: &Option<String>, old: &Option<String>) -> Option<String> {
            new.as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty() && Some(*s) != old.as_deref())
                .map(str::to_string)
        }
        fn measure(new: Option<f64>, old: Option<f64>) -> Option<f64> {
            new.filter(|n| n.is_finite() && Some(*n) != old)
        }

        let changes = ProfilePatch {
            first_name: text(&patch.first_name, &self.first_name),
            last_name: text(&patch.last_name, &self.last_name),
            phone: text(&patch.phone, &self.phone),
            age: patch.age.filter(|a| Some(*a) != self.age),
            height: measure(patch.height, self.height),
            weight: measure(patch.weight, self.weight),
            gender: patch.gender.filter(|g| Some(*g) != self.gender),
        };
        if changes.is_empty() {
            return vec![];
        }
        vec![BuyerProfileEvent::ProfileUpdated(ProfileUpdatedData {
            user_id,
            changes,
            updated_at: Utc::now(),
        })]
    }
}
