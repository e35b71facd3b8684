//! Product aggregate implementation.

use chrono::{DateTime, Utc};
use common::{AggregateId, OrderId, ProductId, SellerId};
use event_store::Version;

use crate::aggregate::Aggregate;
use crate::value_objects::Money;

use super::{ProductError, ProductEvent, ProductListedData};

/// Input for listing a new product.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub category: String,
    pub images: Vec<String>,
    pub price: Money,
    /// List price before discount, shown struck through.
    pub mrp: Option<Money>,
    pub sub_category: Option<String>,
    pub tags: Vec<String>,
    /// Seller's stock keeping unit. Unique across the catalog.
    pub sku: Option<String>,
    pub stock: u32,
}

impl NewProduct {
    /// The trimmed SKU, if one was given.
    pub fn normalized_sku(&self) -> Option<String> {
        trimmed(self.sku.as_deref())
    }
}

fn trimmed(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// A catalog product and its stock ledger.
///
/// Stock is a `u32` and every command that lowers it checks the current
/// level first, so the ledger can never go negative.
#[derive(Debug, Clone, Default)]
pub struct Product {
    id: Option<ProductId>,
    version: Version,
    seller_id: Option<SellerId>,
    name: String,
    description: String,
    category: String,
    images: Vec<String>,
    price: Money,
    mrp: Option<Money>,
    sub_category: Option<String>,
    tags: Vec<String>,
    sku: Option<String>,
    stock: u32,
    available: bool,
    listed_at: Option<DateTime<Utc>>,
}

impl Aggregate for Product {
    type Event = ProductEvent;
    type Error = ProductError;

    fn aggregate_type() -> &'static str {
        "Product"
    }

    fn id(&self) -> Option<AggregateId> {
        self.id.map(AggregateId::from)
    }

    fn version(&self) -> Version {
        self.version
    }

    fn set_version(&mut self, version: Version) {
        self.version = version;
    }

    fn apply(&mut self, event: Self::Event) {
        match event {
            ProductEvent::ProductListed(data) => self.apply_listed(data),
            ProductEvent::StockDecremented(data) => {
                self.stock = self.stock.saturating_sub(data.quantity);
            }
            ProductEvent::StockIncremented(data) => {
                self.stock = self.stock.saturating_add(data.quantity);
            }
            ProductEvent::StockOverwritten(data) => self.stock = data.stock,
            ProductEvent::PriceChanged(data) => self.price = data.price,
            ProductEvent::AvailabilityChanged(data) => self.available = data.available,
        }
    }
}

// Query methods
impl Product {
    pub fn product_id(&self) -> Option<ProductId> {
        self.id
    }

    pub fn seller_id(&self) -> Option<SellerId> {
        self.seller_id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn category(&self) -> &str {
        &self.category
    }

    pub fn images(&self) -> &[String] {
        &self.images
    }

    pub fn price(&self) -> Money {
        self.price
    }

    pub fn mrp(&self) -> Option<Money> {
        self.mrp
    }

    pub fn sub_category(&self) -> Option<&str> {
        self.sub_category.as_deref()
    }

    pub fn tags(&self) -> &[String] {
        &self.tags
    }

    pub fn sku(&self) -> Option<&str> {
        self.sku.as_deref()
    }

    pub fn stock(&self) -> u32 {
        self.stock
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn listed_at(&self) -> Option<DateTime<Utc>> {
        self.listed_at
    }

    /// Returns true if `seller` owns this product.
    pub fn is_owned_by(&self, seller: SellerId) -> bool {
        self.seller_id == Some(seller)
    }
}

// Command methods (return events)
impl Product {
    /// Lists a new product for `seller_id`.
    pub fn list(
        &self,
        product_id: ProductId,
        seller_id: SellerId,
        listing: NewProduct,
    ) -> Result<Vec<ProductEvent>, ProductError> {
        if self.id.is_some() {
            return Err(ProductError::AlreadyListed);
        }

        let name = listing.name.trim();
        let description = listing.description.trim();
        let category = listing.category.trim();
        if name.is_empty() {
            return Err(ProductError::InvalidListing("Product name is required"));
        }
        if description.is_empty() {
            return Err(ProductError::InvalidListing("Description is required"));
        }
        if !listing.price.is_valid_unit_price() {
            return Err(ProductError::InvalidPrice {
                cents: listing.price.cents(),
            });
        }
        if listing.mrp.is_some_and(|mrp| !mrp.is_valid_unit_price()) {
            return Err(ProductError::InvalidListing("MRP must be a valid price"));
        }
        if category.is_empty() {
            return Err(ProductError::InvalidListing("Category is required"));
        }
        if listing.images.is_empty() {
            return Err(ProductError::InvalidListing("At least one image is required"));
        }

        let sku = listing.normalized_sku();
        Ok(vec![ProductEvent::ProductListed(ProductListedData {
            product_id,
            seller_id,
            name: name.to_string(),
            description: description.to_string(),
            category: category.to_string(),
            images: listing.images,
            price: listing.price,
            mrp: listing.mrp,
            sub_category: trimmed(listing.sub_category.as_deref()),
            tags: listing
                .tags
                .iter()
                .filter_map(|tag| trimmed(Some(tag)))
                .collect(),
            sku,
            stock: listing.stock,
            listed_at: Utc::now(),
        })])
    }

    /// Checks that `quantity` units can be promised right now.
    ///
    /// Records nothing; the caller decrements inside the same unit of work if
    /// its stock policy takes stock at this point.
    pub fn reserve(&self, quantity: u32) -> Result<(), ProductError> {
        if quantity == 0 {
            return Err(ProductError::ZeroQuantity);
        }
        if !self.available {
            return Err(ProductError::Unavailable {
                name: self.name.clone(),
            });
        }
        self.ensure_stock(quantity)
    }

    /// Takes `quantity` units out of stock.
    pub fn decrement(
        &self,
        quantity: u32,
        order_id: Option<OrderId>,
    ) -> Result<Vec<ProductEvent>, ProductError> {
        if quantity == 0 {
            return Ok(vec![]);
        }
        self.ensure_stock(quantity)?;
        Ok(vec![ProductEvent::stock_decremented(
            quantity,
            order_id,
            self.stock - quantity,
        )])
    }

    /// Returns `quantity` units to stock.
    pub fn increment(&self, quantity: u32, order_id: Option<OrderId>) -> Vec<ProductEvent> {
        if quantity == 0 {
            return vec![];
        }
        vec![ProductEvent::stock_incremented(
            quantity,
            order_id,
            self.stock.saturating_add(quantity),
        )]
    }

    /// Replaces the stock count. Not a ledger movement.
    pub fn overwrite_stock(&self, stock: u32) -> Vec<ProductEvent> {
        if stock == self.stock {
            return vec![];
        }
        vec![ProductEvent::stock_overwritten(self.stock, stock)]
    }

    /// Changes the list price. Orders already placed keep their snapshot.
    pub fn change_price(&self, price: Money) -> Result<Vec<ProductEvent>, ProductError> {
        if !price.is_valid_unit_price() {
            return Err(ProductError::InvalidPrice {
                cents: price.cents(),
            });
        }
        if price == self.price {
            return Ok(vec![]);
        }
        Ok(vec![ProductEvent::price_changed(self.price, price)])
    }

    pub fn set_availability(&self, available: bool) -> Vec<ProductEvent> {
        if available == self.available {
            return vec![];
        }
        vec![ProductEvent::availability_changed(available)]
    }

    fn ensure_stock(&self, quantity: u32) -> Result<(), ProductError> {
        if quantity > self.stock {
            return Err(ProductError::InsufficientStock {
                name: self.name.clone(),
                requested: quantity,
                available: self.stock,
            });
        }
        Ok(())
    }
}

// Apply event helpers
impl Product {
    fn apply_listed(&mut self, data: ProductListedData) {
        self.id = Some(data.product_id);
        self.seller_id = Some(data.seller_id);
        self.name = data.name;
        self.description = data.description;
        self.category = data.category;
        self.images = data.images;
        self.price = data.price;
        self.mrp = data.mrp;
        self.sub_category = data.sub_category;
        self.tags = data.tags;
        self.sku = data.sku;
        self.stock = data.stock;
        self.available = true;
        self.listed_at = Some(data.listed_at);
    }
}
