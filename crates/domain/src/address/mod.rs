//! Address book aggregate: a buyer's delivery addresses.

mod aggregate;
mod events;

pub use aggregate::{AddressBook, AddressPatch, UserAddress};
pub use events::{
    AddressAddedData, AddressBookEvent, AddressRemovedData, AddressUpdatedData, DefaultAddressData,
};

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AddressError {
    /// Absent, or owned by someone else.
    #[error("Address not found")]
    NotFound,
}
