//! Static plan catalog: per-tier resource quotas and feature flags.
//!
//! The tables are immutable `const` data resolved at compile time and
//! exposed only through pure accessors. Every tier defines every resource
//! kind and every feature flag by construction (struct fields, not maps),
//! so a missing key can never be misread as "unlimited". Changing a limit
//! is a deployment, not a data mutation.

use serde::{Deserialize, Serialize};

use farmlink_storage::{PlanTier, ResourceKind};

/// A resource limit: a hard cap or explicitly unlimited.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Quota {
    Limited(u64),
    Unlimited,
}

impl Quota {
    /// Whether one more creation is allowed at the given current count.
    pub fn allows(&self, current: u64) -> bool {
        match self {
            Quota::Unlimited => true,
            Quota::Limited(max) => current < *max,
        }
    }

    /// The numeric cap, `None` when unlimited.
    pub fn cap(&self) -> Option<u64> {
        match self {
            Quota::Unlimited => None,
            Quota::Limited(max) => Some(*max),
        }
    }
}

/// Plan-gated boolean capabilities.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
    AdvancedAnalytics,
    ExportData,
    PrioritySupport,
    CustomReports,
    ApiAccess,
}

/// All feature flags, for cross-product iteration.
pub const ALL_FEATURE_FLAGS: [FeatureFlag; 5] = [
    FeatureFlag::AdvancedAnalytics,
    FeatureFlag::ExportData,
    FeatureFlag::PrioritySupport,
    FeatureFlag::CustomReports,
    FeatureFlag::ApiAccess,
];

/// The quota set of one plan tier. One field per [`ResourceKind`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ResourceQuotas {
    pub farms: Quota,
    pub parcels: Quota,
    pub team_members: Quota,
    pub expenses: Quota,
    pub tasks: Quota,
    pub weather_api_calls: Quota,
}

impl ResourceQuotas {
    /// Look up the quota for a resource kind.
    pub fn get(&self, kind: ResourceKind) -> Quota {
        match kind {
            ResourceKind::Farms => self.farms,
            ResourceKind::Parcels => self.parcels,
            ResourceKind::TeamMembers => self.team_members,
            ResourceKind::Expenses => self.expenses,
            ResourceKind::Tasks => self.tasks,
            ResourceKind::WeatherApiCalls => self.weather_api_calls,
        }
    }
}

const FREE_QUOTAS: ResourceQuotas = ResourceQuotas {
    farms: Quota::Limited(3),
    parcels: Quota::Limited(5),
    team_members: Quota::Limited(2),
    expenses: Quota::Limited(50),
    tasks: Quota::Limited(20),
    weather_api_calls: Quota::Limited(50),
};

const BASIC_QUOTAS: ResourceQuotas = ResourceQuotas {
    farms: Quota::Limited(10),
    parcels: Quota::Limited(20),
    team_members: Quota::Limited(5),
    expenses: Quota::Limited(500),
    tasks: Quota::Limited(200),
    weather_api_calls: Quota::Limited(500),
};

const BUSINESS_QUOTAS: ResourceQuotas = ResourceQuotas {
    farms: Quota::Limited(50),
    parcels: Quota::Limited(100),
    team_members: Quota::Limited(20),
    expenses: Quota::Unlimited,
    tasks: Quota::Unlimited,
    weather_api_calls: Quota::Limited(5000),
};

const ENTERPRISE_QUOTAS: ResourceQuotas = ResourceQuotas {
    farms: Quota::Unlimited,
    parcels: Quota::Unlimited,
    team_members: Quota::Unlimited,
    expenses: Quota::Unlimited,
    tasks: Quota::Unlimited,
    weather_api_calls: Quota::Unlimited,
};

/// The quota set for a tier. Total over all tiers; never partial.
pub fn limits_for(tier: PlanTier) -> &'static ResourceQuotas {
    match tier {
        PlanTier::Free => &FREE_QUOTAS,
        PlanTier::Basic => &BASIC_QUOTAS,
        PlanTier::Business => &BUSINESS_QUOTAS,
        PlanTier::Enterprise => &ENTERPRISE_QUOTAS,
    }
}

/// Whether a tier carries a feature flag.
pub fn has_feature(tier: PlanTier, flag: FeatureFlag) -> bool {
    match tier {
        PlanTier::Free => false,
        PlanTier::Basic => matches!(flag, FeatureFlag::ExportData),
        PlanTier::Business => matches!(
            flag,
            FeatureFlag::ExportData
                | FeatureFlag::AdvancedAnalytics
                | FeatureFlag::PrioritySupport
                | FeatureFlag::CustomReports
        ),
        PlanTier::Enterprise => true,
    }
}
