//! Seller catalog: listing products and adjusting price, availability and
//! stock.

use common::ProductId;
use domain::{Money, NewProduct, Product, SkuClaim, UnitOfWork};
use event_store::{EventEnvelope, EventStore};

use crate::accounts::approved_seller;
use crate::collaborators::Principal;
use crate::error::{Result, ServiceError};
use crate::storefront::Storefront;

/// Partial product update. Absent fields are left as they are.
#[derive(Debug, Clone, Default)]
pub struct ProductUpdate {
    pub price: Option<Money>,
    pub is_available: Option<bool>,
    /// Absolute stock count. Negative values are rejected.
    pub stock: Option<i64>,
}

impl ProductUpdate {
    pub fn stock(stock: i64) -> Self {
        Self {
            stock: Some(stock),
            ..Default::default()
        }
    }
}

impl<S: EventStore + Clone + 'static> Storefront<S> {
    #[tracing::instrument(skip(self, listing), fields(user = %principal.user_id))]
    pub async fn create_product(&self, principal: Principal, listing: NewProduct) -> Result<Product> {
        let product = self
            .execute("create_product", || {
                self.try_create_product(principal, listing.clone())
            })
            .await?;
        tracing::info!(product_id = ?product.product_id(), name = product.name(), "product listed");
        Ok(product)
    }

    async fn try_create_product(
        &self,
        principal: Principal,
        listing: NewProduct,
    ) -> Result<(Product, Vec<EventEnvelope>)> {
        let mut uow = UnitOfWork::new(&self.store);
        let seller = approved_seller(&mut uow, principal).await?;

        let product_id = ProductId::new();
        let sku = listing.normalized_sku();
        let mut product = Product::default();
        let events = product.list(product_id, seller, listing)?;
        uow.record(&mut product, events)?;

        // Racing listings of one SKU conflict on the claim stream.
        if let Some(sku) = sku {
            let mut claim: SkuClaim = uow.load(SkuClaim::stream_for(&sku)).await?;
            let events = claim.claim(&sku, product_id, seller)?;
            uow.record(&mut claim, events)?;
        }

        let committed = uow.commit().await?;
        Ok((product, committed))
    }

    /// The caller's products, newest first.
    #[tracing::instrument(skip(self), fields(user = %principal.user_id))]
    pub async fn seller_products(&self, principal: Principal) -> Result<Vec<Product>> {
        let mut uow = UnitOfWork::new(&self.store);
        let seller = approved_seller(&mut uow, principal).await?;
        Ok(self.catalog.products_of(seller).await)
    }

    /// Applies `update` to one of the caller's products.
    ///
    /// A stock value overwrites the count outright; it is not a ledger
    /// movement and is not reconciled against pending orders.
    #[tracing::instrument(skip(self, update), fields(user = %principal.user_id))]
    pub async fn update_product(
        &self,
        principal: Principal,
        product_id: ProductId,
        update: ProductUpdate,
    ) -> Result<Product> {
        let stock = match update.stock {
            Some(s) if s < 0 => return Err(ServiceError::validation("Stock must be 0 or greater")),
            Some(s) => Some(
                u32::try_from(s).map_err(|_| ServiceError::validation("Valid stock is required"))?,
            ),
            None => None,
        };

        let product = self
            .execute("update_product", || {
                self.try_update_product(principal, product_id, &update, stock)
            })
            .await?;
        if stock.is_some() {
            metrics::counter!("stock_movements_total", "direction" => "overwrite").increment(1);
        }
        Ok(product)
    }

    /// Overwrites the stock count of one of the caller's products.
    pub async fn overwrite_stock(
        &self,
        principal: Principal,
        product_id: ProductId,
        stock: i64,
    ) -> Result<Product> {
        self.update_product(principal, product_id, ProductUpdate::stock(stock))
            .await
    }

    async fn try_update_product(
        &self,
        principal: Principal,
        product_id: ProductId,
        update: &ProductUpdate,
        stock: Option<u32>,
    ) -> Result<(Product, Vec<EventEnvelope>)> {
        let mut uow = UnitOfWork::new(&self.store);
        let seller = approved_seller(&mut uow, principal).await?;

        let mut product: Product = uow
            .load_existing(product_id)
            .await?
            .filter(|p: &Product| p.is_owned_by(seller))
            .ok_or_else(|| ServiceError::not_found("Product not found or not yours"))?;

        if let Some(price) = update.price {
            let events = product.change_price(price)?;
            uow.record(&mut product, events)?;
        }
        if let Some(available) = update.is_available {
            let events = product.set_availability(available);
            uow.record(&mut product, events)?;
        }
        if let Some(stock) = stock {
            let events = product.overwrite_stock(stock);
            uow.record(&mut product, events)?;
        }

        let committed = uow.commit().await?;
        Ok((product, committed))
    }
}
