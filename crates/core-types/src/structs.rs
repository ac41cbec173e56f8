use crate::money::round_currency;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// A priced catalog item. Immutable once registered.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Product {
    pub id: Uuid,
    pub name: String,
    /// Free-form category; `None` is stored as NULL.
    pub kind: Option<String>,
    pub price: Decimal,
}

/// The validated terms of a purchase request, before any pricing happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPurchase {
    pub id: Uuid,
    pub product_id: Uuid,
    pub down_payment: Decimal,
    pub installments: u32,
}

/// A purchase as persisted, with its computed economics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PurchaseRecord {
    pub id: Uuid,
    pub product_id: Uuid,
    pub down_payment: Decimal,
    pub installments: u32,
    pub installment_amount: Decimal,
    pub interest_rate: Decimal,
}

/// One row of the purchase listing: a purchase joined with its product.
#[derive(Debug, Clone, PartialEq, FromRow, Serialize)]
pub struct PurchaseView {
    #[serde(rename = "idCompra")]
    pub purchase_id: Uuid,
    #[serde(rename = "nomeProduto")]
    pub product_name: String,
    #[serde(rename = "tipoProduto")]
    pub product_kind: Option<String>,
    #[serde(rename = "valorProduto", with = "rust_decimal::serde::float")]
    pub product_price: Decimal,
    #[serde(rename = "valorEntrada", with = "rust_decimal::serde::float")]
    pub down_payment: Decimal,
    #[serde(rename = "qtdParcelas")]
    pub installments: i32,
    #[serde(rename = "valorParcela", with = "rust_decimal::serde::float")]
    pub installment_amount: Decimal,
    #[serde(rename = "taxaJuros", with = "rust_decimal::serde::float")]
    pub interest_rate: Decimal,
}

impl PurchaseView {
    /// Down payment plus every installment.
    pub fn total_paid(&self) -> Decimal {
        self.down_payment + Decimal::from(self.installments) * self.installment_amount
    }
}

/// Aggregates over every purchase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PurchaseStats {
    pub count: i64,
    #[serde(with = "rust_decimal::serde::float")]
    pub sum: Decimal,
    #[serde(with = "rust_decimal::serde::float")]
    pub avg: Decimal,
    #[serde(rename = "sumTx", with = "rust_decimal::serde::float")]
    pub sum_tx: Decimal,
    #[serde(rename = "avgTx", with = "rust_decimal::serde::float")]
    pub avg_tx: Decimal,
}

impl PurchaseStats {
    /// Builds the report from raw totals. Averages use the unrounded sums.
    pub fn from_totals(count: i64, sum: Decimal, sum_tx: Decimal) -> Self {
        if count <= 0 {
            return Self::default();
        }
        let divisor = Decimal::from(count);
        Self {
            count,
            sum: round_currency(sum),
            avg: round_currency(sum / divisor),
            sum_tx: round_currency(sum_tx),
            avg_tx: round_currency(sum_tx / divisor),
        }
    }
}

impl Default for PurchaseStats {
    fn default() -> Self {
        Self {
            count: 0,
            sum: Decimal::ZERO,
            avg: Decimal::ZERO,
            sum_tx: Decimal::ZERO,
            avg_tx: Decimal::ZERO,
        }
    }
}

/// The current accumulated interest rate and the window it was computed over.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct RateSnapshot {
    pub rate: Decimal,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn empty_stats_are_all_zero() {
        let stats = PurchaseStats::from_totals(0, Decimal::ZERO, Decimal::ZERO);
        assert_eq!(stats, PurchaseStats::default());
        assert_eq!(stats.count, 0);
        assert_eq!(stats.avg_tx, Decimal::ZERO);
    }

    #[test]
    fn averages_are_rounded_after_division() {
        let stats = PurchaseStats::from_totals(3, dec!(1000.01), dec!(40));
        assert_eq!(stats.sum, dec!(1000.01));
        assert_eq!(stats.avg, dec!(333.34));
        assert_eq!(stats.sum_tx, dec!(40));
        assert_eq!(stats.avg_tx, dec!(13.33));
    }

    #[test]
    fn stats_serialize_with_wire_names() {
        let stats = PurchaseStats::from_totals(1, dec!(1040), dec!(40));
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["count"], 1);
        assert_eq!(json["sum"], 1040.0);
        assert_eq!(json["sumTx"], 40.0);
        assert_eq!(json["avgTx"], 40.0);
    }

    #[test]
    fn total_paid_includes_down_payment() {
        let view = PurchaseView {
            purchase_id: Uuid::nil(),
            product_name: "TV".to_string(),
            product_kind: None,
            product_price: dec!(1000),
            down_payment: dec!(200),
            installments: 10,
            installment_amount: dec!(84.00),
            interest_rate: dec!(5),
        };
        assert_eq!(view.total_paid(), dec!(1040));
    }
}
