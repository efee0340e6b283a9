//! The entitlement gate: the single authority consulted before creating
//! any quota-bound resource.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use farmlink_storage::{ResourceKind, StoreError, TenantId, TenantStore};

use crate::catalog;
use crate::catalog::Quota;
use crate::EntitlementError;

/// The allow/deny verdict for a single resource-creation attempt.
///
/// Constructed fresh per call, never persisted. `limit` is absent when the
/// tier's quota for the resource is unlimited.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct EntitlementDecision {
    pub allowed: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    pub current_count: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u64>,
}

/// Read-only pre-condition check for resource creation.
///
/// Side-effect free: callers invoke [`check`](EntitlementGate::check)
/// immediately before the actual write and abort on a denial. The
/// tier+count snapshot is recomputed fresh on every call; nothing is
/// cached across requests.
pub struct EntitlementGate<S> {
    store: Arc<S>,
}

impl<S: TenantStore> EntitlementGate<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Decide whether `tenant_id` may create one more resource of `kind`.
    ///
    /// Errors are reserved for "tenant not found" and storage failures;
    /// both must be surfaced by the caller, never treated as an allow.
    pub async fn check(
        &self,
        tenant_id: &TenantId,
        kind: ResourceKind,
    ) -> Result<EntitlementDecision, EntitlementError> {
        let tenant = self.store.get_tenant(tenant_id).await.map_err(|e| match e {
            StoreError::NotFound => EntitlementError::TenantNotFound,
            other => EntitlementError::Storage(other),
        })?;

        let current = self.store.count_resource(tenant_id, kind).await?;
        let quota = catalog::limits_for(tenant.plan).get(kind);

        let limit = match quota {
            Quota::Unlimited => {
                return Ok(EntitlementDecision {
                    allowed: true,
                    message: None,
                    current_count: current,
                    limit: None,
                })
            }
            Quota::Limited(max) if current < max => {
                return Ok(EntitlementDecision {
                    allowed: true,
                    message: None,
                    current_count: current,
                    limit: Some(max),
                })
            }
            Quota::Limited(max) => max,
        };

        tracing::debug!(
            tenant_id = %tenant_id.0,
            resource = kind.as_str(),
            plan = tenant.plan.as_str(),
            current,
            limit,
            "quota denial"
        );

        Ok(EntitlementDecision {
            allowed: false,
            message: Some(format!(
                "Your {} plan allows at most {} {} (you have {}). Upgrade your plan to add more.",
                tenant.plan.label(),
                limit,
                kind.noun(),
                current
            )),
            current_count: current,
            limit: Some(limit),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use farmlink_storage::MockTenantStore;
    use uuid::Uuid;

    #[tokio::test]
    async fn storage_failure_surfaces_as_error_not_allow() {
        let mut store = MockTenantStore::new();
        store
            .expect_get_tenant()
            .returning(|_| Err(StoreError::Backend("db down".into())));

        let gate = EntitlementGate::new(Arc::new(store));
        let err = gate
            .check(&TenantId(Uuid::new_v4()), ResourceKind::Farms)
            .await
            .unwrap_err();
        assert!(matches!(err, EntitlementError::Storage(_)));
    }

    #[test]
    fn decision_serializes_without_absent_fields() {
        let allowed = EntitlementDecision {
            allowed: true,
            message: None,
            current_count: 2,
            limit: None,
        };
        let json = serde_json::to_value(&allowed).unwrap();
        assert_eq!(json["allowed"], true);
        assert_eq!(json["current_count"], 2);
        assert!(json.get("limit").is_none());
        assert!(json.get("message").is_none());
    }

    #[test]
    fn decision_serializes_denial_fields() {
        let denied = EntitlementDecision {
            allowed: false,
            message: Some("Your FREE plan allows at most 3 farms (you have 3).".to_string()),
            current_count: 3,
            limit: Some(3),
        };
        let json = serde_json::to_value(&denied).unwrap();
        assert_eq!(json["allowed"], false);
        assert_eq!(json["limit"], 3);
        assert!(json["message"].as_str().unwrap().contains("FREE"));
    }
}
