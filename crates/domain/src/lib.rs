//! Domain layer of the storefront.
//!
//! This crate provides:
//! - the [`Aggregate`] and [`DomainEvent`] traits
//! - the storefront aggregates: [`Product`] (catalog entry and stock ledger),
//!   [`Cart`], [`Order`] with its per-seller status machine, [`AddressBook`],
//!   [`BuyerProfile`] and [`SellerProfile`]
//! - [`SkuClaim`], the stream that keeps product SKUs unique
//! - [`UnitOfWork`], which commits changes to several aggregates atomically

pub mod address;
pub mod aggregate;
pub mod cart;
pub mod error;
pub mod order;
pub mod product;
pub mod profile;
pub mod seller;
pub mod unit_of_work;
pub mod value_objects;

pub use address::{AddressBook, AddressBookEvent, AddressError, AddressPatch, UserAddress};
pub use aggregate::{Aggregate, DomainEvent};
pub use cart::{Cart, CartError, CartEvent, CartLine};
pub use error::DomainError;
pub use order::{
    Order, OrderError, OrderEvent, OrderItem, OrderStatus, OrderTotals, PaymentMethod,
    PaymentStatus, PlaceOrder, SellerAction, SellerFulfillment, ShippingMethod,
};
pub use product::{NewProduct, Product, ProductError, ProductEvent, SkuClaim, SkuEvent};
pub use profile::{BuyerProfile, BuyerProfileEvent, Gender, ProfilePatch};
pub use seller::{
    DocumentKind, SellerApplication, SellerDocuments, SellerError, SellerProfile,
    SellerProfileEvent,
};
pub use unit_of_work::UnitOfWork;
pub use value_objects::{Money, PostalAddress};
