use crate::{DbError, SalesStore};
use async_trait::async_trait;
use core_types::{
    NewPurchase, Product, PurchaseRecord, PurchaseStats, PurchaseView, RateSnapshot, round_currency,
};
use financing::FinancingPolicy;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

#[derive(Debug)]
struct Tables {
    products: HashMap<Uuid, Product>,
    /// Insertion order doubles as purchase time.
    purchases: Vec<PurchaseRecord>,
    snapshots: Vec<RateSnapshot>,
}

/// Stores `value` the way a `NUMERIC(p, 2)` column with `integer_digits`
/// digits left of the point would: rounded to cents, or rejected.
fn to_numeric(
    value: Decimal,
    integer_digits: u32,
    column: &'static str,
) -> Result<Decimal, DbError> {
    let limit = Decimal::from(10u64.pow(integer_digits));
    let stored = round_currency(value);
    if stored.abs() >= limit {
        return Err(DbError::OutOfRange(column));
    }
    Ok(stored)
}

/// A process-local `SalesStore`.
///
/// Holding the write lock for the whole of `create_purchase` gives it the same
/// all-or-nothing behaviour as the PostgreSQL transaction. Starts with one
/// zero-rate snapshot row, like a freshly migrated database. Amounts are kept
/// at the precision and range of the PostgreSQL columns.
#[derive(Debug)]
pub struct MemoryRepository {
    tables: RwLock<Tables>,
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self {
            tables: RwLock::new(Tables {
                products: HashMap::new(),
                purchases: Vec::new(),
                snapshots: vec![RateSnapshot {
                    rate: Decimal::ZERO,
                    start_date: None,
                    end_date: None,
                }],
            }),
        }
    }

    /// Drops every snapshot row, as if the seed row had never been inserted.
    pub async fn clear_rate_snapshots(&self) {
        self.tables.write().await.snapshots.clear();
    }
}

impl Default for MemoryRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SalesStore for MemoryRepository {
    async fn insert_product(&self, product: &Product) -> Result<(), DbError> {
        let stored = Product {
            price: to_numeric(product.price, 13, "produtos.valor")?,
            ..product.clone()
        };
        let mut tables = self.tables.write().await;
        if tables.products.contains_key(&product.id) {
            return Err(DbError::Duplicate("product"));
        }
        tables.products.insert(product.id, stored);
        Ok(())
    }

    async fn create_purchase(
        &self,
        purchase: &NewPurchase,
        policy: &FinancingPolicy,
    ) -> Result<PurchaseRecord, DbError> {
        let mut tables = self.tables.write().await;

        let price = tables
            .products
            .get(&purchase.product_id)
            .map(|product| product.price)
            .ok_or(DbError::ProductNotFound(purchase.product_id))?;
        let snapshot_rate = tables
            .snapshots
            .last()
            .map(|snapshot| snapshot.rate)
            .unwrap_or(Decimal::ZERO);

        let quote = policy.quote(
            price,
            purchase.down_payment,
            purchase.installments,
            snapshot_rate,
        )?;

        if tables.purchases.iter().any(|existing| existing.id == purchase.id) {
            return Err(DbError::Duplicate("purchase"));
        }

        let record = PurchaseRecord {
            id: purchase.id,
            product_id: purchase.product_id,
            down_payment: to_numeric(purchase.down_payment, 13, "compras.valor_entrada")?,
            installments: purchase.installments,
            installment_amount: quote.installment_amount,
            interest_rate: quote.applied_rate,
        };
        tables.purchases.push(record.clone());
        Ok(record)
    }

    async fn save_rate_snapshot(&self, rate: Decimal, start: &str, end: &str) -> Result<(), DbError> {
        let rate = to_numeric(rate, 8, "juros.taxa_selic")?;
        let mut tables = self.tables.write().await;
        match tables.snapshots.first_mut() {
            Some(snapshot) => {
                snapshot.rate = rate;
                snapshot.start_date = Some(start.to_string());
                snapshot.end_date = Some(end.to_string());
            }
            None => tracing::warn!("No interest-rate snapshot row to update."),
        }
        Ok(())
    }

    async fn current_rate_snapshot(&self) -> Result<Option<RateSnapshot>, DbError> {
        Ok(self.tables.read().await.snapshots.last().cloned())
    }

    async fn list_purchases(&self) -> Result<Vec<PurchaseView>, DbError> {
        let tables = self.tables.read().await;
        let views = tables
            .purchases
            .iter()
            .rev()
            .filter_map(|purchase| {
                let product = tables.products.get(&purchase.product_id)?;
                Some(PurchaseView {
                    purchase_id: purchase.id,
                    product_name: product.name.clone(),
                    product_kind: product.kind.clone(),
                    product_price: product.price,
                    down_payment: purchase.down_payment,
                    installments: i32::try_from(purchase.installments).unwrap_or(i32::MAX),
                    installment_amount: purchase.installment_amount,
                    interest_rate: purchase.interest_rate,
                })
            })
            .collect();
        Ok(views)
    }

    async fn purchase_stats(&self) -> Result<PurchaseStats, DbError> {
        let views = self.list_purchases().await?;
        let count = i64::try_from(views.len()).unwrap_or(i64::MAX);
        let sum: Decimal = views.iter().map(PurchaseView::total_paid).sum();
        let sum_tx: Decimal = views
            .iter()
            .map(|view| view.total_paid() - view.product_price)
            .sum();
        Ok(PurchaseStats::from_totals(count, sum, sum_tx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn tv() -> Product {
        Product {
            id: Uuid::parse_str("11111111-1111-1111-1111-111111111111").unwrap(),
            name: "TV".to_string(),
            kind: None,
            price: dec!(1000),
        }
    }

    fn purchase(id: u128, down_payment: Decimal, installments: u32) -> NewPurchase {
        NewPurchase {
            id: Uuid::from_u128(id),
            product_id: tv().id,
            down_payment,
            installments,
        }
    }

    #[tokio::test]
    async fn duplicate_product_is_rejected() {
        let store = MemoryRepository::new();
        store.insert_product(&tv()).await.unwrap();
        let second = store.insert_product(&tv()).await;
        assert!(matches!(second, Err(DbError::Duplicate("product"))));
    }

    #[tokio::test]
    async fn purchase_reads_the_current_snapshot() {
        let store = MemoryRepository::new();
        let policy = FinancingPolicy::default();
        store.insert_product(&tv()).await.unwrap();
        store
            .save_rate_snapshot(dec!(5.0), "2024-01-01", "2024-01-31")
            .await
            .unwrap();

        let record = store
            .create_purchase(&purchase(2, dec!(200), 10), &policy)
            .await
            .unwrap();
        assert_eq!(record.installment_amount, dec!(84.00));
        assert_eq!(record.interest_rate, dec!(5.0));
    }

    #[tokio::test]
    async fn missing_snapshot_means_zero_rate() {
        let store = MemoryRepository::new();
        store.clear_rate_snapshots().await;
        store.insert_product(&tv()).await.unwrap();

        // With no row, the update is a no-op.
        store.save_rate_snapshot(dec!(9), "a", "b").await.unwrap();
        assert_eq!(store.current_rate_snapshot().await.unwrap(), None);

        let record = store
            .create_purchase(&purchase(2, dec!(0), 10), &FinancingPolicy::default())
            .await
            .unwrap();
        assert_eq!(record.interest_rate, Decimal::ZERO);
        assert_eq!(record.installment_amount, dec!(100));
    }

    #[tokio::test]
    async fn rejected_purchases_leave_no_row() {
        let store = MemoryRepository::new();
        let policy = FinancingPolicy::default();
        store.insert_product(&tv()).await.unwrap();

        let too_much = store.create_purchase(&purchase(2, dec!(1500), 10), &policy).await;
        assert!(matches!(too_much, Err(DbError::Financing(_))));

        let mut orphan = purchase(3, dec!(0), 2);
        orphan.product_id = Uuid::from_u128(99);
        let missing = store.create_purchase(&orphan, &policy).await;
        assert!(matches!(missing, Err(DbError::ProductNotFound(_))));

        assert!(store.list_purchases().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn listing_is_most_recent_first_and_stats_add_up() {
        let store = MemoryRepository::new();
        let policy = FinancingPolicy::default();
        store.insert_product(&tv()).await.unwrap();
        store.save_rate_snapshot(dec!(5), "x", "y").await.unwrap();

        store.create_purchase(&purchase(1, dec!(200), 10), &policy).await.unwrap();
        store.create_purchase(&purchase(2, dec!(200), 3), &policy).await.unwrap();

        let listing = store.list_purchases().await.unwrap();
        assert_eq!(listing.len(), 2);
        assert_eq!(listing[0].purchase_id, Uuid::from_u128(2));
        assert_eq!(listing[1].purchase_id, Uuid::from_u128(1));

        // 200 + 10 * 84.00 = 1040 and 200 + 3 * 266.67 = 1000.01
        let stats = store.purchase_stats().await.unwrap();
        assert_eq!(stats.count, 2);
        assert_eq!(stats.sum, dec!(2040.01));
        assert_eq!(stats.sum_tx, dec!(40.01));
        assert_eq!(stats.avg, dec!(1020.01));
        assert_eq!(stats.avg_tx, dec!(20.01));
    }

    #[tokio::test]
    async fn amounts_are_kept_at_column_precision() {
        let store = MemoryRepository::new();
        let policy = FinancingPolicy::default();
        let half_cent = Product {
            price: dec!(0.005),
            ..tv()
        };
        store.insert_product(&half_cent).await.unwrap();

        // The price is stored as 0.01, so a 0.01 down payment fits.
        let record = store
            .create_purchase(&purchase(1, dec!(0.01), 1), &policy)
            .await
            .unwrap();
        assert_eq!(record.installment_amount, Decimal::ZERO);

        let listing = store.list_purchases().await.unwrap();
        assert_eq!(listing[0].product_price, dec!(0.01));
        assert_eq!(listing[0].down_payment, dec!(0.01));
    }

    #[tokio::test]
    async fn amounts_beyond_column_range_are_rejected() {
        let store = MemoryRepository::new();
        let huge = Product {
            price: Decimal::from_scientific("7e28").unwrap(),
            ..tv()
        };
        assert!(matches!(
            store.insert_product(&huge).await,
            Err(DbError::OutOfRange("produtos.valor"))
        ));

        let rate = store.save_rate_snapshot(dec!(100000000), "a", "b").await;
        assert!(matches!(rate, Err(DbError::OutOfRange("juros.taxa_selic"))));
        assert_eq!(
            store.current_rate_snapshot().await.unwrap().unwrap().rate,
            Decimal::ZERO
        );
    }

    #[tokio::test]
    async fn duplicate_purchase_is_rejected() {
        let store = MemoryRepository::new();
        let policy = FinancingPolicy::default();
        store.insert_product(&tv()).await.unwrap();
        store.create_purchase(&purchase(7, dec!(0), 1), &policy).await.unwrap();
        let again = store.create_purchase(&purchase(7, dec!(0), 1), &policy).await;
        assert!(matches!(again, Err(DbError::Duplicate("purchase"))));
        assert_eq!(store.list_purchases().await.unwrap().len(), 1);
    }
}
