//! Quota-bound resource kinds and the domain rows they count.

use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{FarmId, TaskId, TeamMemberId, TenantId, TransactionId};

/// A category of tenant-owned entity subject to a quota.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Farms,
    Parcels,
    TeamMembers,
    Expenses,
    Tasks,
    WeatherApiCalls,
}

/// All resource kinds, for cross-product iteration.
pub const ALL_RESOURCE_KINDS: [ResourceKind; 6] = [
    ResourceKind::Farms,
    ResourceKind::Parcels,
    ResourceKind::TeamMembers,
    ResourceKind::Expenses,
    ResourceKind::Tasks,
    ResourceKind::WeatherApiCalls,
];

impl FromStr for ResourceKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "farms" => Ok(ResourceKind::Farms),
            "parcels" => Ok(ResourceKind::Parcels),
            "team_members" => Ok(ResourceKind::TeamMembers),
            "expenses" => Ok(ResourceKind::Expenses),
            "tasks" => Ok(ResourceKind::Tasks),
            "weather_api_calls" => Ok(ResourceKind::WeatherApiCalls),
            _ => Err(format!("invalid resource kind: {}", s)),
        }
    }
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Farms => "farms",
            ResourceKind::Parcels => "parcels",
            ResourceKind::TeamMembers => "team_members",
            ResourceKind::Expenses => "expenses",
            ResourceKind::Tasks => "tasks",
            ResourceKind::WeatherApiCalls => "weather_api_calls",
        }
    }

    /// Human-readable noun for denial messages.
    pub fn noun(&self) -> &'static str {
        match self {
            ResourceKind::Farms => "farms",
            ResourceKind::Parcels => "parcels",
            ResourceKind::TeamMembers => "team members",
            ResourceKind::Expenses => "expenses",
            ResourceKind::Tasks => "tasks",
            ResourceKind::WeatherApiCalls => "weather API calls",
        }
    }
}

/// Kind of a money transaction row. Only `Expense` rows count against the
/// expense quota; revenue rows are excluded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Expense,
    Revenue,
}

impl FromStr for TransactionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "expense" => Ok(TransactionKind::Expense),
            "revenue" => Ok(TransactionKind::Revenue),
            _ => Err(format!("invalid transaction kind: {}", s)),
        }
    }
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Expense => "expense",
            TransactionKind::Revenue => "revenue",
        }
    }
}

/// Farm record.
#[derive(Clone, Debug)]
pub struct Farm {
    pub id: FarmId,
    pub tenant_id: TenantId,
    pub name: String,
    pub location: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Team member record (directly owned by the tenant).
#[derive(Clone, Debug)]
pub struct TeamMember {
    pub id: TeamMemberId,
    pub tenant_id: TenantId,
    pub name: String,
    pub email: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Money transaction record (expense or revenue).
#[derive(Clone, Debug)]
pub struct MoneyTransaction {
    pub id: TransactionId,
    pub tenant_id: TenantId,
    pub farm_id: Option<FarmId>,
    pub kind: TransactionKind,
    /// Amount in the smallest currency unit (CFA francs).
    pub amount: i64,
    pub label: String,
    pub created_at: DateTime<Utc>,
}

/// Field task record. Ownership is indirect: a task belongs to a team
/// member, and the team member belongs to the tenant.
#[derive(Clone, Debug)]
pub struct FieldTask {
    pub id: TaskId,
    pub team_member_id: TeamMemberId,
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// Parameters for creating a farm
#[derive(Clone, Debug)]
pub struct CreateFarmParams {
    pub tenant_id: TenantId,
    pub name: String,
    pub location: Option<String>,
}

/// Parameters for creating a team member
#[derive(Clone, Debug)]
pub struct CreateTeamMemberParams {
    pub tenant_id: TenantId,
    pub name: String,
    pub email: Option<String>,
}

/// Parameters for recording a money transaction
#[derive(Clone, Debug)]
pub struct CreateTransactionParams {
    pub tenant_id: TenantId,
    pub farm_id: Option<FarmId>,
    pub kind: TransactionKind,
    pub amount: i64,
    pub label: String,
}

/// Parameters for creating a field task
#[derive(Clone, Debug)]
pub struct CreateTaskParams {
    pub team_member_id: TeamMemberId,
    pub title: String,
    pub due_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_kind_roundtrip() {
        for kind in ALL_RESOURCE_KINDS {
            let s = kind.as_str();
            let parsed: ResourceKind = s.parse().unwrap();
            assert_eq!(kind, parsed);
        }
    }

    #[test]
    fn test_resource_kind_parse_invalid() {
        assert!("plots".parse::<ResourceKind>().is_err());
        assert!("Farms".parse::<ResourceKind>().is_err()); // Case sensitive
    }

    #[test]
    fn test_transaction_kind_roundtrip() {
        for kind in [TransactionKind::Expense, TransactionKind::Revenue] {
            let parsed: TransactionKind = kind.as_str().parse().unwrap();
            assert_eq!(kind, parsed);
        }
        assert!("income".parse::<TransactionKind>().is_err());
    }

    #[test]
    fn test_all_resource_kinds_are_distinct() {
        use std::collections::HashSet;
        let set: HashSet<_> = ALL_RESOURCE_KINDS.iter().collect();
        assert_eq!(set.len(), ALL_RESOURCE_KINDS.len());
    }
}
