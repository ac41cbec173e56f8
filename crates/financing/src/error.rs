use rust_decimal::Decimal;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum FinancingError {
    #[error("The down payment ({down_payment}) exceeds the product price ({price}).")]
    DownPaymentExceedsPrice { down_payment: Decimal, price: Decimal },

    #[error("The down payment ({0}) is negative.")]
    NegativeDownPayment(Decimal),

    #[error("A purchase needs at least one installment.")]
    NoInstallments,

    /// The figures do not fit in a `Decimal`.
    #[error("Arithmetic overflow while computing {0}.")]
    Overflow(&'static str),
}
