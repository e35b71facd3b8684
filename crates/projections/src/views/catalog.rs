//! Seller catalog read model: each seller's products, newest first.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use async_trait::async_trait;
use common::{ProductId, SellerId};
use domain::Product;
use event_store::EventEnvelope;
use tokio::sync::RwLock;

use crate::Result;
use crate::projection::{Projection, ProjectionPosition};
use crate::read_model::ReadModel;
use crate::replica::StreamReplicas;

struct CatalogState {
    products: StreamReplicas<Product>,
    by_seller: HashMap<SellerId, HashSet<ProductId>>,
    position: ProjectionPosition,
}

/// Read model view of the products each seller has listed.
#[derive(Clone)]
pub struct CatalogView {
    state: Arc<RwLock<CatalogState>>,
}

impl CatalogView {
    pub fn new() -> Self {
        Self {
            state: Arc::new(RwLock::new(CatalogState {
                products: StreamReplicas::new(),
                by_seller: HashMap::new(),
                position: ProjectionPosition::zero(),
            })),
        }
    }

    /// The seller's products, newest first.
    pub async fn products_of(&self, seller: SellerId) -> Vec<Product> {
        let state = self.state.read().await;
        let mut products: Vec<Product> = state
            .by_seller
            .get(&seller)
            .into_iter()
            .flatten()
            .filter_map(|id| state.products.get(*id).cloned())
            .collect();
        products.sort_by(|a, b| b.listed_at().cmp(&a.listed_at()));
        products
    }

    pub async fn product(&self, product_id: ProductId) -> Option<Product> {
        self.state.read().await.products.get(product_id).cloned()
    }
}

impl Default for CatalogView {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Projection for CatalogView {
    fn name(&self) -> &'static str {
        "CatalogView"
    }

    fn subscriptions(&self) -> &'static [&'static str] {
        &["Product"]
    }

    async fn handle(&self, event: &EventEnvelope) -> Result<()> {
        let mut state = self.state.write().await;
        let listed = state
            .products
            .apply(event)?
            .and_then(|p| Some((p.seller_id()?, p.product_id()?)));
        if let Some((seller, product_id)) = listed {
            state.by_seller.entry(seller).or_default().insert(product_id);
        }
        state.position = state.position.advance();
        Ok(())
    }

    async fn position(&self) -> ProjectionPosition {
        self.state.read().await.position
    }

    async fn reset(&self) -> Result<()> {
        let mut state = self.state.write().await;
        state.products.clear();
        state.by_seller.clear();
        state.position = ProjectionPosition::zero();
        Ok(())
    }
}

impl ReadModel for CatalogView {
    fn name(&self) -> &'static str {
        "CatalogView"
    }

    fn count(&self) -> usize {
        self.state
            .try_read()
            .map(|s| s.products.len())
            .unwrap_or(0)
    }
}
