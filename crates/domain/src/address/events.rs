//! Address book events.

use chrono::{DateTime, Utc};
use common::{AddressId, UserId};
use serde::{Deserialize, Serialize};

use crate::aggregate::DomainEvent;
use crate::value_objects::PostalAddress;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum AddressBookEvent {
    AddressAdded(AddressAddedData),
    AddressUpdated(AddressUpdatedData),
    AddressRemoved(AddressRemovedData),

    /// The given address became the default; any previous default lost it.
    DefaultAddressSet(DefaultAddressData),

    /// The given address stopped being the default, leaving none.
    DefaultAddressCleared(DefaultAddressData),
}

impl DomainEvent for AddressBookEvent {
    fn event_type(&self) -> &'static str {
        match self {
            AddressBookEvent::AddressAdded(_) => "AddressAdded",
            AddressBookEvent::AddressUpdated(_) => "AddressUpdated",
            AddressBookEvent::AddressRemoved(_) => "AddressRemoved",
            AddressBookEvent::DefaultAddressSet(_) => "DefaultAddressSet",
            AddressBookEvent::DefaultAddressCleared(_) => "DefaultAddressCleared",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressAddedData {
    pub owner_id: UserId,
    pub address_id: AddressId,
    pub address: PostalAddress,
    pub added_at: DateTime<Utc>,
}

/// Full replacement value after the update was merged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressUpdatedData {
    pub address_id: AddressId,
    pub address: PostalAddress,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddressRemovedData {
    pub address_id: AddressId,
    pub removed_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DefaultAddressData {
    pub address_id: AddressId,
}
