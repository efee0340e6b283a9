//! In-memory TenantStore implementation.
//!
//! This implementation is suitable for:
//! - Development and testing
//! - Single-process deployments
//!
//! State lives in plain maps behind one mutex, so a quota-checked create
//! (count, compare, insert) is a single critical section: two concurrent
//! creations can never both slip under the cap. Multi-replica deployments
//! need a shared backend (see farmlink-store-sqlite) instead.

use std::collections::HashMap;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use farmlink_storage::{
    CreateFarmParams, CreateTaskParams, CreateTeamMemberParams, CreateTenantParams,
    CreateTransactionParams, Farm, FarmId, FieldTask, MoneyTransaction, PlanTier, ResourceKind,
    StoreError, TaskId, TeamMember, TeamMemberId, Tenant, TenantId, TenantStore, TransactionId,
    TransactionKind,
};

#[derive(Default)]
struct Inner {
    tenants: HashMap<TenantId, Tenant>,
    farms: HashMap<FarmId, Farm>,
    team_members: HashMap<TeamMemberId, TeamMember>,
    transactions: HashMap<TransactionId, MoneyTransaction>,
    tasks: HashMap<TaskId, FieldTask>,
    weather_calls: HashMap<TenantId, u64>,
}

impl Inner {
    fn count(&self, tenant_id: &TenantId, kind: ResourceKind) -> u64 {
        match kind {
            ResourceKind::Farms => self
                .farms
                .values()
                .filter(|f| &f.tenant_id == tenant_id)
                .count() as u64,
            // The parcel quota is enforced against the farm count, not
            // parcel rows. Known approximation carried over from the
            // production system; see DESIGN.md before "fixing" this.
            ResourceKind::Parcels => self.count(tenant_id, ResourceKind::Farms),
            ResourceKind::TeamMembers => self
                .team_members
                .values()
                .filter(|m| &m.tenant_id == tenant_id)
                .count() as u64,
            ResourceKind::Expenses => self
                .transactions
                .values()
                .filter(|t| &t.tenant_id == tenant_id && t.kind == TransactionKind::Expense)
                .count() as u64,
            ResourceKind::Tasks => self
                .tasks
                .values()
                .filter(|t| {
                    self.team_members
                        .get(&t.team_member_id)
                        .map(|m| &m.tenant_id == tenant_id)
                        .unwrap_or(false)
                })
                .count() as u64,
            ResourceKind::WeatherApiCalls => {
                self.weather_calls.get(tenant_id).copied().unwrap_or(0)
            }
        }
    }

    fn check_cap(
        &self,
        tenant_id: &TenantId,
        kind: ResourceKind,
        cap: Option<u64>,
    ) -> Result<(), StoreError> {
        if let Some(max) = cap {
            if self.count(tenant_id, kind) >= max {
                return Err(StoreError::LimitReached);
            }
        }
        Ok(())
    }
}

/// In-memory tenant store.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Inner>, StoreError> {
        self.inner
            .lock()
            .map_err(|_| StoreError::Backend("store mutex poisoned".into()))
    }
}

#[async_trait::async_trait]
impl TenantStore for MemoryStore {
    async fn create_tenant(&self, params: &CreateTenantParams) -> Result<TenantId, StoreError> {
        let mut inner = self.lock()?;
        if inner.tenants.values().any(|t| t.email == params.email) {
            return Err(StoreError::AlreadyExists);
        }
        let id = TenantId(Uuid::now_v7());
        let now = Utc::now();
        inner.tenants.insert(
            id.clone(),
            Tenant {
                id: id.clone(),
                email: params.email.clone(),
                plan: params.plan,
                trial_started_at: None,
                created_at: now,
                updated_at: now,
            },
        );
        tracing::info!(tenant_id = %id.0, "tenant created");
        Ok(id)
    }

    async fn get_tenant(&self, tenant_id: &TenantId) -> Result<Tenant, StoreError> {
        let inner = self.lock()?;
        inner.tenants.get(tenant_id).cloned().ok_or(StoreError::NotFound)
    }

    async fn set_tenant_plan(
        &self,
        tenant_id: &TenantId,
        plan: PlanTier,
    ) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let tenant = inner.tenants.get_mut(tenant_id).ok_or(StoreError::NotFound)?;
        tenant.plan = plan;
        tenant.updated_at = Utc::now();
        Ok(())
    }

    async fn start_trial(&self, tenant_id: &TenantId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let mut inner = self.lock()?;
        let tenant = inner.tenants.get_mut(tenant_id).ok_or(StoreError::NotFound)?;
        tenant.trial_started_at = Some(at);
        tenant.updated_at = Utc::now();
        Ok(())
    }

    async fn count_resource(
        &self,
        tenant_id: &TenantId,
        kind: ResourceKind,
    ) -> Result<u64, StoreError> {
        let inner = self.lock()?;
        Ok(inner.count(tenant_id, kind))
    }

    async fn create_farm(
        &self,
        params: &CreateFarmParams,
        cap: Option<u64>,
    ) -> Result<FarmId, StoreError> {
        let mut inner = self.lock()?;
        if !inner.tenants.contains_key(&params.tenant_id) {
            return Err(StoreError::NotFound);
        }
        inner.check_cap(&params.tenant_id, ResourceKind::Farms, cap)?;
        let id = FarmId(Uuid::now_v7());
        inner.farms.insert(
            id.clone(),
            Farm {
                id: id.clone(),
                tenant_id: params.tenant_id.clone(),
                name: params.name.clone(),
                location: params.location.clone(),
                created_at: Utc::now(),
            },
        );
        tracing::info!(tenant_id = %params.tenant_id.0, farm_id = %id.0, "farm created");
        Ok(id)
    }

    async fn create_team_member(
        &self,
        params: &CreateTeamMemberParams,
        cap: Option<u64>,
    ) -> Result<TeamMemberId, StoreError> {
        let mut inner = self.lock()?;
        if !inner.tenants.contains_key(&params.tenant_id) {
            return Err(StoreError::NotFound);
        }
        inner.check_cap(&params.tenant_id, ResourceKind::TeamMembers, cap)?;
        let id = TeamMemberId(Uuid::now_v7());
        inner.team_members.insert(
            id.clone(),
            TeamMember {
                id: id.clone(),
                tenant_id: params.tenant_id.clone(),
                name: params.name.clone(),
                email: params.email.clone(),
                created_at: Utc::now(),
            },
        );
        tracing::info!(
            tenant_id = %params.tenant_id.0,
            team_member_id = %id.0,
            "team member created"
        );
        Ok(id)
    }

    async fn record_transaction(
        &self,
        params: &CreateTransactionParams,
        cap: Option<u64>,
    ) -> Result<TransactionId, StoreError> {
        let mut inner = self.lock()?;
        if !inner.tenants.contains_key(&params.tenant_id) {
            return Err(StoreError::NotFound);
        }
        // A transaction must not reference a farm that does not exist.
        if let Some(farm_id) = &params.farm_id {
            if !inner.farms.contains_key(farm_id) {
                return Err(StoreError::Conflict);
            }
        }
        // The cap binds expenses only; revenue is never quota-bound.
        if params.kind == TransactionKind::Expense {
            inner.check_cap(&params.tenant_id, ResourceKind::Expenses, cap)?;
        }
        let id = TransactionId(Uuid::now_v7());
        inner.transactions.insert(
            id.clone(),
            MoneyTransaction {
                id: id.clone(),
                tenant_id: params.tenant_id.clone(),
                farm_id: params.farm_id.clone(),
                kind: params.kind,
                amount: params.amount,
                label: params.label.clone(),
                created_at: Utc::now(),
            },
        );
        tracing::info!(
            tenant_id = %params.tenant_id.0,
            transaction_id = %id.0,
            kind = params.kind.as_str(),
            "transaction recorded"
        );
        Ok(id)
    }

    async fn create_task(
        &self,
        params: &CreateTaskParams,
        cap: Option<u64>,
    ) -> Result<TaskId, StoreError> {
        let mut inner = self.lock()?;
        let tenant_id = inner
            .team_members
            .get(&params.team_member_id)
            .map(|m| m.tenant_id.clone())
            .ok_or(StoreError::NotFound)?;
        inner.check_cap(&tenant_id, ResourceKind::Tasks, cap)?;
        let id = TaskId(Uuid::now_v7());
        inner.tasks.insert(
            id.clone(),
            FieldTask {
                id: id.clone(),
                team_member_id: params.team_member_id.clone(),
                title: params.title.clone(),
                due_at: params.due_at,
                created_at: Utc::now(),
            },
        );
        tracing::info!(
            tenant_id = %tenant_id.0,
            team_member_id = %params.team_member_id.0,
            task_id = %id.0,
            "task created"
        );
        Ok(id)
    }

    async fn record_weather_call(
        &self,
        tenant_id: &TenantId,
        cap: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut inner = self.lock()?;
        if !inner.tenants.contains_key(tenant_id) {
            return Err(StoreError::NotFound);
        }
        let current = inner.weather_calls.get(tenant_id).copied().unwrap_or(0);
        if let Some(max) = cap {
            if current >= max {
                return Err(StoreError::LimitReached);
            }
        }
        inner.weather_calls.insert(tenant_id.clone(), current + 1);
        tracing::info!(tenant_id = %tenant_id.0, calls = current + 1, "weather call recorded");
        Ok(current + 1)
    }
}
