//! Catalog-wide SKU uniqueness.
//!
//! Each SKU owns one stream whose id is derived from the SKU itself. Listing
//! a product with a SKU loads that stream in the same unit of work and claims
//! it, so two listings racing for the same SKU conflict on the stream version
//! and only one commits.

use chrono::{DateTime, Utc};
use common::{AggregateId, ProductId, SellerId};
use event_store::Version;
use serde::{Deserialize, Serialize};

use crate::aggregate::{Aggregate, DomainEvent};

use super::ProductError;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum SkuEvent {
    SkuClaimed(SkuClaimedData),
}

impl DomainEvent for SkuEvent {
    fn event_type(&self) -> &'static str {
        match self {
            SkuEvent::SkuClaimed(_) => "SkuClaimed",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkuClaimedData {
    pub sku: String,
    pub product_id: ProductId,
    pub seller_id: SellerId,
    pub claimed_at: DateTime<Utc>,
}

/// The claim on one SKU.
#[derive(Debug, Clone, Default)]
pub struct SkuClaim {
    sku: Option<String>,
    version: Version,
    product_id: Option<ProductId>,
}

impl SkuClaim {
    /// Stream id of the claim on `sku`.
    pub fn stream_for(sku: &str) -> AggregateId {
        AggregateId::for_key(Self::aggregate_type(), sku)
    }

    /// The product holding the SKU, if claimed.
    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }

    /// Claims `sku` for a new product.
    pub fn claim(
        &self,
        sku: &str,
        product_id: ProductId,
        seller_id: SellerId,
    ) -> Result<Vec<SkuEvent>, ProductError> {
        if self.product_id.is_some() {
            return Err(ProductError::DuplicateSku);
        }
        Ok(vec![SkuEvent::SkuClaimed(SkuClaimedData {
            sku: sku.to_string(),
            product_id,
            seller_id,
            claimed_at: Utc::now(),
        })])
    }
}

impl Aggregate for SkuClaim {
    type Event = SkuEvent;
    type Error = ProductError;

    fn aggregate_type() -> &'static str {
        "Sku"
    }

    fn id(&self) -> Option<AggregateId> {
        self.sku.as_deref().map(Self::stream_for)
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            SkuEvent::SkuClaimed(data) => {
                self.sku = Some(data.sku);
                self.product_id = Some(data.product_id);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn second_claim_is_refused() {
        let mut claim = SkuClaim::default();
        let events = claim.claim("BAN-001", ProductId::new(), SellerId::new()).unwrap();
        claim.apply_events(events);

        assert_eq!(claim.id(), Some(SkuClaim::stream_for("BAN-001")));
        let err = claim
            .claim("BAN-001", ProductId::new(), SellerId::new())
            .unwrap_err();
        assert_eq!(err, ProductError::DuplicateSku);
        assert_eq!(err.to_string(), "SKU already exists");
    }
}
