//! # Database Crate
//!
//! This crate is the persistence layer for products, purchases, and the
//! interest-rate snapshot.
//!
//! ## Architectural Principles
//!
//! - **Adapter:** All SQL lives here. The rest of the application sees the
//!   `SalesStore` trait and never the underlying queries.
//! - **Explicit handle:** The `PgPool` is created once by `connect` and owned by
//!   `DbRepository`; nothing in this crate reaches for a global connection.
//! - **Atomic purchases:** Pricing and inserting a purchase happen inside one
//!   transaction, which rolls back when dropped on any error path.
//!
//! ## Public API
//!
//! - `connect` / `run_migrations`: build the pool and bring the schema up to date.
//! - `SalesStore`: the storage contract used by the web layer.
//! - `DbRepository`: the PostgreSQL implementation.
//! - `MemoryRepository`: an in-process implementation with the same semantics.
//! - `DbError`: the specific error types that can be returned from this crate.

// Declare the modules that constitute this crate.
pub mod connection;
pub mod error;
pub mod memory;
pub mod repository;
pub mod store;

#[cfg(test)]
mod test_db;

// Re-export the key components to create a clean, public-facing API.
pub use connection::{connect, run_migrations};
pub use error::DbError;
pub use memory::MemoryRepository;
pub use repository::DbRepository;
pub use store::SalesStore;
