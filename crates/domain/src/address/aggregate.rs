//! Address book aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AddressId, AggregateId, UserId};
use event_store::Version;

use crate::aggregate::Aggregate;
use crate::value_objects::PostalAddress;

use super::{
    AddressAddedData, AddressBookEvent, AddressError, AddressRemovedData, AddressUpdatedData,
    DefaultAddressData,
};

/// An address as the buyer sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAddress {
    pub id: AddressId,
    pub address: PostalAddress,
    pub is_default: bool,
    pub created_at: DateTime<Utc>,
}

/// Partial update. `None` leaves a field as it is.
#[derive(Debug, Clone, Default)]
pub struct AddressPatch {
    pub district: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub zip_code: Option<String>,
    pub country: Option<String>,
    pub is_default: Option<bool>,
}

impl AddressPatch {
    fn merged_into(&self, current: &PostalAddress) -> PostalAddress {
        let pick = |patch: &Option<String>, old: &Option<String>| patch.clone().or_else(|| old.clone());
        PostalAddress {
            district: pick(&self.district, &current.district),
            street: pick(&self.street, &current.street),
            city: pick(&self.city, &current.city),
            state: pick(&self.state, &current.state),
            zip_code: pick(&self.zip_code, &current.zip_code),
            country: pick(&self.country, &current.country),
        }
    }
}

#[derive(Debug, Clone)]
struct Entry {
    id: AddressId,
    address: PostalAddress,
    created_at: DateTime<Utc>,
}

/// A buyer's delivery addresses, keyed by the buyer's user id.
///
/// The default is a single optional id, so two defaults can never coexist.
#[derive(Debug, Clone, Default)]
pub struct AddressBook {
    owner_id: Option<UserId>,
    version: Version,
    entries: Vec<Entry>,
    default: Option<AddressId>,
}

impl Aggregate for AddressBook {
    type Event = AddressBookEvent;
    type Error = AddressError;

    fn aggregate_type() -> &'static str {
        "AddressBook"
    }

    fn id(&self) -> Option<AggregateId> {
        self.owner_id.map(AggregateId::from)
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            AddressBookEvent::AddressAdded(data) => {
                self.owner_id.get_or_insert(data.owner_id);
                self.entries.push(Entry {
                    id: data.address_id,
                    address: data.address,
                    created_at: data.added_at,
                });
            }
            AddressBookEvent::AddressUpdated(data) => {
                if let Some(entry) = self.entries.iter_mut().find(|e| e.id == data.address_id) {
                    entry.address = data.address;
                }
            }
            AddressBookEvent::AddressRemoved(data) => {
                self.entries.retain(|e| e.id != data.address_id);
                if self.default == Some(data.address_id) {
                    self.default = None;
                }
            }
            AddressBookEvent::DefaultAddressSet(data) => self.default = Some(data.address_id),
            AddressBookEvent::DefaultAddressCleared(data) => {
                if self.default == Some(data.address_id) {
                    self.default = None;
                }
            }
        }
    }
}

// Query methods
impl AddressBook {
    pub fn owner_id(&self) -> Option<UserId> {
        self.owner_id
    }

    pub fn default_address(&self) -> Option<AddressId> {
        self.default
    }

    pub fn contains(&self, address_id: AddressId) -> bool {
        self.entries.iter().any(|e| e.id == address_id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, address_id: AddressId) -> Option<UserAddress> {
        self.entries
            .iter()
            .find(|e| e.id == address_id)
            .map(|e| self.view(e))
    }

    /// All addresses, default first, then oldest first.
    pub fn list(&self) -> Vec<UserAddress> {
        let mut list: Vec<UserAddress> = self.entries.iter().map(|e| self.view(e)).collect();
        list.sort_by_key(|a| !a.is_default);
        list
    }

    fn view(&self, entry: &Entry) -> UserAddress {
        UserAddress {
            id: entry.id,
            address: entry.address.clone(),
            is_default: self.default == Some(entry.id),
            created_at: entry.created_at,
        }
    }
}

// Command methods (return events)
impl AddressBook {
    /// Adds an address. The first address, or one added with
    /// `make_default`, becomes the default.
    pub fn add(
        &self,
        owner_id: UserId,
        address_id: AddressId,
        address: PostalAddress,
        make_default: bool,
    ) -> Vec<AddressBookEvent> {
        let mut events = vec![AddressBookEvent::AddressAdded(AddressAddedData {
            owner_id,
            address_id,
            address: address.trimmed(),
            added_at: Utc::now(),
        })];
        if make_default || self.entries.is_empty() {
            events.push(AddressBookEvent::DefaultAddressSet(DefaultAddressData {
                address_id,
            }));
        }
        events
    }

    pub fn update(
        &self,
        address_id: AddressId,
        patch: &AddressPatch,
    ) -> Result<Vec<AddressBookEvent>, AddressError> {
        let entry = self
            .entries
            .iter()
            .find(|e| e.id == address_id)
            .ok_or(AddressError::NotFound)?;

        let mut events = Vec::new();
        let merged = patch.merged_into(&entry.address).trimmed();
        if merged != entry.address {
            events.push(AddressBookEvent::AddressUpdated(AddressUpdatedData {
                address_id,
                address: merged,
                updated_at: Utc::now(),
            }));
        }

        let is_default = self.default == Some(address_id);
        match patch.is_default {
            Some(true) if !is_default => {
                events.push(AddressBookEvent::DefaultAddressSet(DefaultAddressData {
                    address_id,
                }));
            }
            Some(false) if is_default => {
                events.push(AddressBookEvent::DefaultAddressCleared(DefaultAddressData {
                    address_id,
                }));
            }
            _ => {}
        }
        Ok(events)
    }

    pub fn remove(&self, address_id: AddressId) -> Result<Vec<AddressBookEvent>, AddressError> {
        if !self.contains(address_id) {
            return Err(AddressError::NotFound);
        }
        Ok(vec![AddressBookEvent::AddressRemoved(AddressRemovedData {
            address_id,
            removed_at: Utc::now(),
        })])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(city: &str) -> PostalAddress {
        PostalAddress {
            street: Some("1 Temple Rd".into()),
            city: Some(city.into()),
            ..Default::default()
        }
    }

    fn add(book: &mut AddressBook, owner: UserId, city: &str, make_default: bool) -> AddressId {
        let id = AddressId::new();
        let events = book.add(owner, id, address(city), make_default);
        book.apply_events(events);
        id
    }

    fn defaults(book: &AddressBook) -> usize {
        book.list().iter().filter(|a| a.is_default).count()
    }

    #[test]
    fn first_address_becomes_default() {
        let owner = UserId::new();
        let mut book = AddressBook::default();
        let first = add(&mut book, owner, "Surat", false);
        let second = add(&mut book, owner, "Jaipur", false);

        assert_eq!(book.default_address(), Some(first));
        assert_eq!(book.list()[0].id, first);
        assert!(!book.get(second).unwrap().is_default);
    }

    #[test]
    fn at_most_one_default_after_every_step() {
        let owner = UserId::new();
        let mut book = AddressBook::default();
        let a = add(&mut book, owner, "Surat", false);
        assert_eq!(defaults(&book), 1);
        let b = add(&mut book, owner, "Jaipur", true);
        assert_eq!(defaults(&book), 1);
        assert_eq!(book.list()[0].id, b);

        let patch = AddressPatch {
            is_default: Some(true),
            ..Default::default()
        };
        let events = book.update(a, &patch).unwrap();
        book.apply_events(events);
        assert_eq!(defaults(&book), 1);
        assert_eq!(book.default_address(), Some(a));

        let events = book.remove(a).unwrap();
        book.apply_events(events);
        assert_eq!(defaults(&book), 0);
        assert_eq!(book.len(), 1);
    }

    #[test]
    fn update_merges_fields() {
        let owner = UserId::new();
        let mut book = AddressBook::default();
        let id = add(&mut book, owner, "Surat", false);

        let patch = AddressPatch {
            city: Some(" Vadodara ".into()),
            zip_code: Some("390001".into()),
            ..Default::default()
        };
        let events = book.update(id, &patch).unwrap();
        book.apply_events(events);

        let stored = book.get(id).unwrap();
        assert_eq!(stored.address.city.as_deref(), Some("Vadodara"));
        assert_eq!(stored.address.street.as_deref(), Some("1 Temple Rd"));
        assert_eq!(stored.address.zip_code.as_deref(), Some("390001"));
    }

    #[test]
    fn clearing_default_leaves_none() {
        let owner = UserId::new();
        let mut book = AddressBook::default();
        let id = add(&mut book, owner, "Surat", false);
        let patch = AddressPatch {
            is_default: Some(false),
            ..Default::default()
        };
        let events = book.update(id, &patch).unwrap();
        book.apply_events(events);
        assert_eq!(book.default_address(), None);
    }

    #[test]
    fn unknown_address_is_not_found() {
        let book = AddressBook::default();
        assert_eq!(
            book.remove(AddressId::new()).unwrap_err(),
            AddressError::NotFound
        );
        assert_eq!(
            book.update(AddressId::new(), &AddressPatch::default())
                .unwrap_err(),
            AddressError::NotFound
        );
    }
}
