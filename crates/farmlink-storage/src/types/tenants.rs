//! Tenant types for plan and trial scoping.

use chrono::{DateTime, Utc};

use super::{PlanTier, TenantId};

/// Tenant record (the unit of quota and plan-tier scoping).
#[derive(Clone, Debug)]
pub struct Tenant {
    pub id: TenantId,
    pub email: String,
    pub plan: PlanTier,
    /// Set once by an explicit "start trial" action; `None` until then.
    pub trial_started_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Tenant {
    /// The timestamp the trial window is measured from: the explicit trial
    /// start when one was recorded, otherwise account creation.
    pub fn trial_reference(&self) -> DateTime<Utc> {
        self.trial_started_at.unwrap_or(self.created_at)
    }
}

/// Parameters for creating a tenant
#[derive(Clone, Debug)]
pub struct CreateTenantParams {
    pub email: String,
    pub plan: PlanTier,
}
