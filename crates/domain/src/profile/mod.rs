//! Buyer profile aggregate: personal details kept alongside the account.

mod aggregate;
mod events;

pub use aggregate::{BuyerProfile, Gender, ProfilePatch};
pub use events::{BuyerProfileEvent, ProfileUpdatedData};
