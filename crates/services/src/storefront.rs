//! The storefront context shared by every operation.

use std::future::Future;
use std::sync::Arc;

use common::AggregateId;
use domain::{Aggregate, UnitOfWork};
use event_store::{EventEnvelope, EventStore};
use projections::{
    BuyerOrdersView, CatalogView, ProjectionProcessor, ReadModel, SellerOrdersView,
};

use crate::checkout::StockPolicy;
use crate::collaborators::{BlobStore, InMemoryBlobStore};
use crate::error::Result;
use crate::retry::RetryPolicy;

/// Event store, read models and policies behind the storefront operations.
///
/// Operations live in their own modules (`checkout`, `fulfillment`, `cart`,
/// `catalog`, `accounts`, `orders`) as methods on this type.
pub struct Storefront<S: EventStore + Clone + 'static> {
    pub(crate) store: S,
    processor: ProjectionProcessor<S>,
    pub(crate) buyer_orders: BuyerOrdersView,
    pub(crate) seller_orders: SellerOrdersView,
    pub(crate) catalog: CatalogView,
    pub(crate) blobs: Arc<dyn BlobStore>,
    pub(crate) stock_policy: StockPolicy,
    retry: RetryPolicy,
}

impl<S: EventStore + Clone + 'static> Storefront<S> {
    /// Creates a storefront with default policies and in-memory blob storage.
    pub fn new(store: S) -> Self {
        let buyer_orders = BuyerOrdersView::new();
        let seller_orders = SellerOrdersView::new();
        let catalog = CatalogView::new();

        let mut processor = ProjectionProcessor::new(store.clone());
        processor.register(Box::new(buyer_orders.clone()));
        processor.register(Box::new(seller_orders.clone()));
        processor.register(Box::new(catalog.clone()));

        Self {
            store,
            processor,
            buyer_orders,
            seller_orders,
            catalog,
            blobs: Arc::new(InMemoryBlobStore::new()),
            stock_policy: StockPolicy::default(),
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_stock_policy(mut self, policy: StockPolicy) -> Self {
        self.stock_policy = policy;
        self
    }

    pub fn with_retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry = policy;
        self
    }

    pub fn with_blob_store(mut self, blobs: Arc<dyn BlobStore>) -> Self {
        self.blobs = blobs;
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn stock_policy(&self) -> StockPolicy {
        self.stock_policy
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    /// The read models, for health reporting.
    pub fn read_models(&self) -> [&dyn ReadModel; 3] {
        [&self.buyer_orders, &self.seller_orders, &self.catalog]
    }

    /// Brings the read models up to date with the store.
    pub async fn catch_up(&self) -> Result<()> {
        Ok(self.processor.run_catch_up().await?)
    }

    /// Runs `attempt` under the retry policy, then feeds what it committed
    /// to the read models.
    pub(crate) async fn execute<T, F, Fut>(&self, operation: &'static str, attempt: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<(T, Vec<EventEnvelope>)>>,
    {
        let (value, committed) = self.retry.run(operation, attempt).await?;
        self.publish(&committed).await;
        Ok(value)
    }

    /// Current state of one aggregate, read without guarding anything.
    pub(crate) async fn read<A: Aggregate>(&self, id: impl Into<AggregateId>) -> Result<A> {
        let mut uow = UnitOfWork::new(&self.store);
        Ok(uow.load(id).await?)
    }

    async fn publish(&self, committed: &[EventEnvelope]) {
        if committed.is_empty() {
            return;
        }
        // The write stands either way; the next catch-up redelivers it.
        if let Err(err) = self.processor.process_events(committed).await {
            tracing::error!(error = %err, "read model update failed");
        }
    }
}
