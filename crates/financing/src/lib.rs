//! # Financing Crate
//!
//! Pure decimal arithmetic for installment purchases: which interest rate a
//! purchase pays, how much each installment costs, and how a daily rate
//! series accumulates into a snapshot rate. Nothing here touches storage or
//! the network, so both persistence backends share the exact same numbers.
//!
//! ## Public API
//!
//! - `FinancingPolicy`: decides the applied rate and produces a `Quote`.
//! - `accumulate_rates`: folds a daily series into a rounded snapshot rate.
//! - `FinancingError`: the business-rule violations a quote can hit.

pub mod error;
pub mod policy;

pub use error::FinancingError;
pub use policy::{FinancingPolicy, Quote, accumulate_rates};
