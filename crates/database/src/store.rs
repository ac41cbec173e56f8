use crate::DbError;
use async_trait::async_trait;
use core_types::{NewPurchase, Product, PurchaseRecord, PurchaseStats, PurchaseView, RateSnapshot};
use financing::FinancingPolicy;
use rust_decimal::Decimal;

/// The storage contract the web layer depends on.
///
/// Implementations must make `create_purchase` atomic: the product lookup,
/// the price check, the snapshot read and the insert either all take effect
/// or none do.
#[async_trait]
pub trait SalesStore: Send + Sync {
    /// Inserts a product. A reused identifier yields `DbError::Duplicate`.
    async fn insert_product(&self, product: &Product) -> Result<(), DbError>;

    /// Prices `purchase` against its product and the current snapshot rate,
    /// then stores it.
    async fn create_purchase(
        &self,
        purchase: &NewPurchase,
        policy: &FinancingPolicy,
    ) -> Result<PurchaseRecord, DbError>;

    /// Overwrites the snapshot row. No-op when the row is missing.
    async fn save_rate_snapshot(&self, rate: Decimal, start: &str, end: &str) -> Result<(), DbError>;

    /// The current snapshot, if one exists.
    async fn current_rate_snapshot(&self) -> Result<Option<RateSnapshot>, DbError>;

    /// Every purchase joined with its product, most recent first.
    async fn list_purchases(&self) -> Result<Vec<PurchaseView>, DbError>;

    /// Count, totals and averages over every purchase.
    async fn purchase_stats(&self) -> Result<PurchaseStats, DbError>;
}
