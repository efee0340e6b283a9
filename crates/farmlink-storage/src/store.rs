//! The TenantStore trait that backends implement.

use chrono::{DateTime, Utc};

use crate::types::*;
use crate::StoreError;

/// The storage trait `farmlink-entitlements` depends on.
///
/// Reads are what the entitlement gate consumes; `count_resource`
/// encapsulates the per-kind counting rules (including the task ownership
/// join) so the gate stays free of query knowledge.
///
/// Quota-checked writes take the caller-supplied cap (`None` = unlimited)
/// and must re-count and insert inside a single critical section, returning
/// [`StoreError::LimitReached`] when the tenant is already at the cap. Two
/// concurrent creations must never both succeed past the cap.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait TenantStore: Send + Sync {
    // ───────────────────────────────────── Tenants ────────────────────────────────────────

    /// Create a new tenant (returns generated ID).
    async fn create_tenant(&self, params: &CreateTenantParams) -> Result<TenantId, StoreError>;

    /// Get tenant by ID.
    async fn get_tenant(&self, tenant_id: &TenantId) -> Result<Tenant, StoreError>;

    /// Change a tenant's plan tier (driven by billing events).
    async fn set_tenant_plan(&self, tenant_id: &TenantId, plan: PlanTier)
        -> Result<(), StoreError>;

    /// Record the trial start. Set once; overwriting an existing start is an
    /// administrative backfill and is allowed.
    async fn start_trial(&self, tenant_id: &TenantId, at: DateTime<Utc>)
        -> Result<(), StoreError>;

    // ───────────────────────────────────── Counting ───────────────────────────────────────

    /// Live usage count for one resource kind:
    /// - `Farms`, `TeamMembers`: rows owned directly by the tenant.
    /// - `Expenses`: transaction rows of kind `expense` only.
    /// - `Tasks`: rows owned through the tenant's team members (join).
    /// - `Parcels`: counts the tenant's farms (reproduced approximation).
    /// - `WeatherApiCalls`: per-tenant monotonic counter.
    async fn count_resource(
        &self,
        tenant_id: &TenantId,
        kind: ResourceKind,
    ) -> Result<u64, StoreError>;

    // ─────────────────────────────── Quota-checked writes ─────────────────────────────────

    /// Create a farm, enforcing `cap` atomically against the farm count.
    async fn create_farm(
        &self,
        params: &CreateFarmParams,
        cap: Option<u64>,
    ) -> Result<FarmId, StoreError>;

    /// Create a team member, enforcing `cap` atomically.
    async fn create_team_member(
        &self,
        params: &CreateTeamMemberParams,
        cap: Option<u64>,
    ) -> Result<TeamMemberId, StoreError>;

    /// Record a money transaction. `cap` applies only when the kind is
    /// `expense`; revenue rows are never quota-bound.
    async fn record_transaction(
        &self,
        params: &CreateTransactionParams,
        cap: Option<u64>,
    ) -> Result<TransactionId, StoreError>;

    /// Create a field task for a team member, enforcing `cap` against the
    /// owning tenant's task count. Fails with `NotFound` if the team member
    /// does not exist.
    async fn create_task(
        &self,
        params: &CreateTaskParams,
        cap: Option<u64>,
    ) -> Result<TaskId, StoreError>;

    /// Bump the tenant's weather API call counter, enforcing `cap`.
    /// Returns the new counter value.
    async fn record_weather_call(
        &self,
        tenant_id: &TenantId,
        cap: Option<u64>,
    ) -> Result<u64, StoreError>;
}
