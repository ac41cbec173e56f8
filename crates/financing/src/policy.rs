use crate::error::FinancingError;
use configuration::FinancingSettings;
use core_types::round_currency;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// The economics of one purchase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Quote {
    /// Product price minus down payment.
    pub financed_amount: Decimal,
    /// Financed amount with the applied rate added.
    pub total_with_interest: Decimal,
    /// Rounded to cents.
    pub installment_amount: Decimal,
    /// Percent units; zero for interest-free purchases.
    pub applied_rate: Decimal,
}

/// Decides when interest applies and computes installment amounts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FinancingPolicy {
    interest_free_installments: u32,
}

impl FinancingPolicy {
    /// Creates a policy where up to `interest_free_installments` installments carry no interest.
    pub fn new(interest_free_installments: u32) -> Self {
        Self {
            interest_free_installments,
        }
    }

    pub fn interest_free_installments(&self) -> u32 {
        self.interest_free_installments
    }

    /// The rate a purchase with `installments` pays, given the current snapshot rate.
    pub fn applied_rate(&self, installments: u32, snapshot_rate: Decimal) -> Decimal {
        if installments <= self.interest_free_installments {
            Decimal::ZERO
        } else {
            snapshot_rate
        }
    }

    /// Prices a purchase of a product costing `price`.
    pub fn quote(
        &self,
        price: Decimal,
        down_payment: Decimal,
        installments: u32,
        snapshot_rate: Decimal,
    ) -> Result<Quote, FinancingError> {
        // --- 1. Validation ---
        if installments == 0 {
            return Err(FinancingError::NoInstallments);
        }
        if down_payment < Decimal::ZERO {
            return Err(FinancingError::NegativeDownPayment(down_payment));
        }
        if down_payment > price {
            return Err(FinancingError::DownPaymentExceedsPrice {
                down_payment,
                price,
            });
        }

        // --- 2. Interest ---
        let applied_rate = self.applied_rate(installments, snapshot_rate);
        let financed_amount = price
            .checked_sub(down_payment)
            .ok_or(FinancingError::Overflow("the financed amount"))?;
        let total_with_interest = (applied_rate / dec!(100))
            .checked_add(dec!(1))
            .and_then(|factor| financed_amount.checked_mul(factor))
            .ok_or(FinancingError::Overflow("the total with interest"))?;

        // --- 3. Installments ---
        let installment_amount = total_with_interest
            .checked_div(Decimal::from(installments))
            .map(round_currency)
            .ok_or(FinancingError::Overflow("the installment amount"))?;

        tracing::debug!(
            %financed_amount,
            %total_with_interest,
            %installment_amount,
            %applied_rate,
            "Purchase quoted."
        );

        Ok(Quote {
            financed_amount,
            total_with_interest,
            installment_amount,
            applied_rate,
        })
    }
}

impl Default for FinancingPolicy {
    fn default() -> Self {
        FinancingSettings::default().into()
    }
}

impl From<&FinancingSettings> for FinancingPolicy {
    fn from(settings: &FinancingSettings) -> Self {
        Self::new(settings.interest_free_installments)
    }
}

impl From<FinancingSettings> for FinancingPolicy {
    fn from(settings: FinancingSettings) -> Self {
        Self::from(&settings)
    }
}

/// Sums a daily rate series and rounds the total to two places.
pub fn accumulate_rates<I>(daily_rates: I) -> Result<Decimal, FinancingError>
where
    I: IntoIterator<Item = Decimal>,
{
    daily_rates
        .into_iter()
        .try_fold(Decimal::ZERO, |total, rate| total.checked_add(rate))
        .map(round_currency)
        .ok_or(FinancingError::Overflow("the accumulated rate"))
}
