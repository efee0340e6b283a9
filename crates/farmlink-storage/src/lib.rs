//! Storage abstraction for FarmLink.
//!
//! Backend crates (e.g., farmlink-store-sqlite, farmlink-store-memory) implement the
//! [`TenantStore`] trait so `farmlink-entitlements` doesn't depend on any specific
//! database engine or schema details.

use thiserror::Error;

mod store;
pub mod types;

pub use store::TenantStore;
pub use types::*;

#[cfg(feature = "test-support")]
pub use store::MockTenantStore;

/// Uniform error type for all storage backends.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found")]
    NotFound,
    #[error("already exists")]
    AlreadyExists,
    /// A write referenced a row that does not exist (e.g., a transaction
    /// bound to a deleted farm).
    #[error("conflict")]
    Conflict,
    /// A quota-checked write found the tenant already at its cap.
    #[error("resource limit reached")]
    LimitReached,
    #[error("backend error: {0}")]
    Backend(String),
}
