//! Value objects shared across aggregates.

use serde::{Deserialize, Serialize};

/// Money amount in cents.
///
/// Serialized as the bare cent count.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest unit price a product may carry.
    ///
    /// Line and order totals still use checked arithmetic, since quantities
    /// are unbounded.
    pub const MAX_UNIT_PRICE: Money = Money(100_000_000_000);

    pub fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    pub fn zero() -> Self {
        Self(0)
    }

    pub fn cents(&self) -> i64 {
        self.0
    }

    pub fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Within `(0, MAX_UNIT_PRICE]`.
    pub fn is_valid_unit_price(&self) -> bool {
        self.is_positive() && *self <= Self::MAX_UNIT_PRICE
    }

    /// Price of `quantity` units at this unit price, or None on overflow.
    pub fn checked_times(&self, quantity: u32) -> Option<Money> {
        self.0.checked_mul(i64::from(quantity)).map(Money)
    }

    pub fn checked_add(&self, rhs: Money) -> Option<Money> {
        self.0.checked_add(rhs.0).map(Money)
    }

    pub fn checked_sub(&self, rhs: Money) -> Option<Money> {
        self.0.checked_sub(rhs.0).map(Money)
    }

    /// Sum of `amounts`, or None if any partial sum overflows.
    pub fn checked_sum(amounts: impl IntoIterator<Item = Money>) -> Option<Money> {
        amounts
            .into_iter()
            .try_fold(Money::zero(), |acc, m| acc.checked_add(m))
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

/// A postal address. Every field is optional; callers that need a complete
/// address check [`PostalAddress::is_complete`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PostalAddress {
    pub district: Option<String>,
    pub street: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    #[serde(alias = "zipCode")]
    pub zip_code: Option<String>,
    pub country: Option<String>,
}

impl PostalAddress {
    /// Street, city, state, zip code and country are all present and non-blank.
    pub fn is_complete(&self) -> bool {
        [
            &self.street,
            &self.city,
            &self.state,
            &self.zip_code,
            &self.country,
        ]
        .iter()
        .all(|field| field.as_deref().is_some_and(|s| !s.trim().is_empty()))
    }

    /// Copy with every field trimmed and blank fields dropped.
    pub fn trimmed(&self) -> Self {
        fn clean(field: &Option<String>) -> Option<String> {
            field
                .as_deref()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        }

        Self {
            district: clean(&self.district),
            street: clean(&self.street),
            city: clean(&self.city),
            state: clean(&self.state),
            zip_code: clean(&self.zip_code),
            country: clean(&self.country),
        }
    }
}
