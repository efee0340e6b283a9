//! farmlink-entitlements - Subscription entitlement engine for FarmLink
//!
//! This crate decides, for a tenant and a resource kind, whether one more
//! resource creation is allowed:
//! - [`catalog`]: static quota and feature-flag tables per plan tier
//! - [`trial`]: free-trial window arithmetic (read-only status, never blocks writes)
//! - [`gate`]: the allow/deny authority consulted before every quota-bound write
//!
//! # Architecture
//!
//! The gate is pure decision logic over data supplied by a
//! [`TenantStore`](farmlink_storage::TenantStore) backend: it reads the
//! tenant's tier and the live count for the resource kind, looks the quota
//! up in the catalog, and returns an [`EntitlementDecision`] value. Denial
//! is an expected outcome, not an error; only "tenant not found" and
//! storage failures surface as errors, and neither ever resolves to a
//! silent allow.

use thiserror::Error;

pub mod catalog;
pub mod gate;
pub mod trial;

pub use catalog::{FeatureFlag, Quota, ResourceQuotas};
pub use gate::{EntitlementDecision, EntitlementGate};
pub use trial::{TrialStatus, TRIAL_DAYS};

use farmlink_storage::StoreError;

/// Entitlement engine errors.
///
/// Quota denial is *not* here: it is a normal [`EntitlementDecision`]
/// return value.
#[derive(Debug, Error)]
pub enum EntitlementError {
    /// The supplied tenant id does not resolve. Callers map this to an
    /// authorization/not-found response, never to "allowed".
    #[error("tenant not found")]
    TenantNotFound,

    /// Storage failure. Callers must fail closed: surface an error, never
    /// default to "allowed".
    #[error("storage error: {0}")]
    Storage(StoreError),
}

impl From<StoreError> for EntitlementError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound => EntitlementError::TenantNotFound,
            other => EntitlementError::Storage(other),
        }
    }
}
