pub mod error;
pub mod money;
pub mod requests;
pub mod structs;
pub mod window;

// Re-export the core types to provide a clean public API.
pub use error::CoreError;
pub use money::{parse_decimal, round_currency};
pub use structs::{NewPurchase, Product, PurchaseRecord, PurchaseStats, PurchaseView, RateSnapshot};
pub use window::RateWindow;
