use crate::{DbError, SalesStore};
use async_trait::async_trait;
use core_types::{NewPurchase, Product, PurchaseRecord, PurchaseStats, PurchaseView, RateSnapshot};
use financing::FinancingPolicy;
use rust_decimal::Decimal;
use sqlx::postgres::PgPool;

/// The `DbRepository` provides a high-level, application-specific interface
/// to the database. It encapsulates all SQL queries and data access logic.
#[derive(Debug, Clone)]
pub struct DbRepository {
    pool: PgPool,
}

impl DbRepository {
    /// Creates a new `DbRepository` with a shared database connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SalesStore for DbRepository {
    async fn insert_product(&self, product: &Product) -> Result<(), DbError> {
        sqlx::query("INSERT INTO produtos (id, nome, tipo, valor) VALUES ($1, $2, $3, $4)")
            .bind(product.id)
            .bind(&product.name)
            .bind(product.kind.as_deref())
            .bind(product.price)
            .execute(&self.pool)
            .await
            .map_err(|e| DbError::on_insert(e, "product"))?;
        Ok(())
    }

    /// Runs the whole purchase inside one transaction. Every early return
    /// drops `tx`, which rolls it back.
    async fn create_purchase(
        &self,
        purchase: &NewPurchase,
        policy: &FinancingPolicy,
    ) -> Result<PurchaseRecord, DbError> {
        let mut tx = self.pool.begin().await?;

        // The share lock keeps the product row stable until commit.
        let price: Option<Decimal> =
            sqlx::query_scalar("SELECT valor FROM produtos WHERE id = $1 FOR SHARE")
                .bind(purchase.product_id)
                .fetch_optional(&mut *tx)
                .await?;
        let price = price.ok_or(DbError::ProductNotFound(purchase.product_id))?;

        let snapshot_rate: Option<Decimal> =
            sqlx::query_scalar("SELECT taxa_selic FROM juros ORDER BY id DESC LIMIT 1")
                .fetch_optional(&mut *tx)
                .await?;

        let quote = policy.quote(
            price,
            purchase.down_payment,
            purchase.installments,
            snapshot_rate.unwrap_or(Decimal::ZERO),
        )?;

        let record = PurchaseRecord {
            id: purchase.id,
            product_id: purchase.product_id,
            down_payment: purchase.down_payment,
            installments: purchase.installments,
            installment_amount: quote.installment_amount,
            interest_rate: quote.applied_rate,
        };

        sqlx::query(
            r#"
            INSERT INTO compras (id, id_produto, valor_entrada, qtd_parcelas, valor_parcela, taxa_juros)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(record.id)
        .bind(record.product_id)
        .bind(record.down_payment)
        // Bounded to i32 by request validation.
        .bind(i32::try_from(record.installments).unwrap_or(i32::MAX))
        .bind(record.installment_amount)
        .bind(record.interest_rate)
        .execute(&mut *tx) // Note: must use the transaction object `tx` here
        .await
        .map_err(|e| DbError::on_insert(e, "purchase"))?;

        tx.commit().await?;
        Ok(record)
    }

    async fn save_rate_snapshot(&self, rate: Decimal, start: &str, end: &str) -> Result<(), DbError> {
        let result = sqlx::query(
            r#"
            UPDATE juros
            SET taxa_selic = $1, data_inicio = $2, data_final = $3
            WHERE id = (SELECT MIN(id) FROM juros)
            "#,
        )
        .bind(rate)
        .bind(start)
        .bind(end)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            tracing::warn!("No interest-rate snapshot row to update.");
        }
        Ok(())
    }

    async fn current_rate_snapshot(&self) -> Result<Option<RateSnapshot>, DbError> {
        let snapshot = sqlx::query_as::<_, RateSnapshot>(
            r#"
            SELECT taxa_selic AS rate, data_inicio AS start_date, data_final AS end_date
            FROM juros
            ORDER BY id DESC
            LIMIT 1
            "#,
        )
        .fetch_optional(&self.pool)
        .await?;
        Ok(snapshot)
    }

    async fn list_purchases(&self) -> Result<Vec<PurchaseView>, DbError> {
        let purchases = sqlx::query_as::<_, PurchaseView>(
            r#"
            SELECT
                c.id AS purchase_id,
                p.nome AS product_name,
                p.tipo AS product_kind,
                p.valor AS product_price,
                c.valor_entrada AS down_payment,
                c.qtd_parcelas AS installments,
                c.valor_parcela AS installment_amount,
                c.taxa_juros AS interest_rate
            FROM
                compras AS c
            JOIN
                produtos AS p ON c.id_produto = p.id
            ORDER BY
                c.data_compra DESC
            "#,
        )
        .fetch_all(&self.pool)
        .await?;
        Ok(purchases)
    }

    async fn purchase_stats(&self) -> Result<PurchaseStats, DbError> {
        let (count, sum, sum_tx): (i64, Option<Decimal>, Option<Decimal>) = sqlx::query_as(
            r#"
            SELECT
                COUNT(c.id),
                SUM(c.valor_entrada + (c.qtd_parcelas * c.valor_parcela)),
                SUM((c.valor_entrada + (c.qtd_parcelas * c.valor_parcela)) - p.valor)
            FROM
                compras AS c
            JOIN
                produtos AS p ON c.id_produto = p.id
            "#,
        )
        .fetch_one(&self.pool)
        .await?;

        Ok(PurchaseStats::from_totals(
            count,
            sum.unwrap_or(Decimal::ZERO),
            sum_tx.unwrap_or(Decimal::ZERO),
        ))
    }
}
