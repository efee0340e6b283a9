//! Smoke tests for the SQLite backend against an in-memory database.

use uuid::Uuid;

use farmlink_storage::{
    CreateFarmParams, CreateTaskParams, CreateTeamMemberParams, CreateTenantParams,
    CreateTransactionParams, FarmId, PlanTier, ResourceKind, StoreError, TeamMemberId, TenantId,
    TenantStore, TransactionKind,
};
use farmlink_store_sqlite::SqliteStore;

async fn store_with_tenant(plan: PlanTier) -> (SqliteStore, TenantId) {
    let store = SqliteStore::open_in_memory().await.unwrap();
    let tenant_id = store
        .create_tenant(&CreateTenantParams {
            email: "grower@example.com".to_string(),
            plan,
        })
        .await
        .unwrap();
    (store, tenant_id)
}

fn farm_params(tenant_id: &TenantId, name: &str) -> CreateFarmParams {
    CreateFarmParams {
        tenant_id: tenant_id.clone(),
        name: name.to_string(),
        location: Some("Thiès".to_string()),
    }
}

#[tokio::test]
async fn tenant_roundtrip() {
    let (store, tenant_id) = store_with_tenant(PlanTier::Basic).await;

    let t = store.get_tenant(&tenant_id).await.unwrap();
    assert_eq!(t.email, "grower@example.com");
    assert_eq!(t.plan, PlanTier::Basic);
    assert!(t.trial_started_at.is_none());

    assert!(matches!(
        store.get_tenant(&TenantId(Uuid::new_v4())).await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn duplicate_email_maps_to_already_exists() {
    let (store, _tenant_id) = store_with_tenant(PlanTier::Free).await;
    let dup = store
        .create_tenant(&CreateTenantParams {
            email: "grower@example.com".to_string(),
            plan: PlanTier::Free,
        })
        .await;
    assert!(matches!(dup, Err(StoreError::AlreadyExists)));
}

#[tokio::test]
async fn plan_and_trial_updates_persist() {
    let (store, tenant_id) = store_with_tenant(PlanTier::Free).await;

    store
        .set_tenant_plan(&tenant_id, PlanTier::Enterprise)
        .await
        .unwrap();
    let at = chrono::Utc::now();
    store.start_trial(&tenant_id, at).await.unwrap();

    let t = store.get_tenant(&tenant_id).await.unwrap();
    assert_eq!(t.plan, PlanTier::Enterprise);
    // Stored at second precision.
    assert_eq!(
        t.trial_started_at.unwrap().timestamp(),
        at.timestamp()
    );

    assert!(matches!(
        store
            .set_tenant_plan(&TenantId(Uuid::new_v4()), PlanTier::Free)
            .await,
        Err(StoreError::NotFound)
    ));
}

#[tokio::test]
async fn farm_cap_enforced_in_transaction() {
    let (store, tenant_id) = store_with_tenant(PlanTier::Free).await;

    for i in 0..3 {
        store
            .create_farm(&farm_params(&tenant_id, &format!("farm-{i}")), Some(3))
            .await
            .unwrap();
    }
    let over = store
        .create_farm(&farm_params(&tenant_id, "one-too-many"), Some(3))
        .await;
    assert!(matches!(over, Err(StoreError::LimitReached)));
    assert_eq!(
        store
            .count_resource(&tenant_id, ResourceKind::Farms)
            .await
            .unwrap(),
        3
    );

    // Unchecked write still goes through.
    store
        .create_farm(&farm_params(&tenant_id, "extra"), None)
        .await
        .unwrap();
}

#[tokio::test]
async fn expense_count_excludes_revenue_rows() {
    let (store, tenant_id) = store_with_tenant(PlanTier::Free).await;

    for kind in [
        TransactionKind::Expense,
        TransactionKind::Expense,
        TransactionKind::Expense,
        TransactionKind::Revenue,
        TransactionKind::Revenue,
    ] {
        store
            .record_transaction(
                &CreateTransactionParams {
                    tenant_id: tenant_id.clone(),
                    farm_id: None,
                    kind,
                    amount: 10_000,
                    label: "ledger row".to_string(),
                },
                None,
            )
            .await
            .unwrap();
    }

    assert_eq!(
        store
            .count_resource(&tenant_id, ResourceKind::Expenses)
            .await
            .unwrap(),
        3
    );

    // Expense cap of 3 now denies an expense but not a revenue row.
    let denied = store
        .record_transaction(
            &CreateTransactionParams {
                tenant_id: tenant_id.clone(),
                farm_id: None,
                kind: TransactionKind::Expense,
                amount: 5_000,
                label: "diesel".to_string(),
            },
            Some(3),
        )
        .await;
    assert!(matches!(denied, Err(StoreError::LimitReached)));

    store
        .record_transaction(
            &CreateTransactionParams {
                tenant_id: tenant_id.clone(),
                farm_id: None,
                kind: TransactionKind::Revenue,
                amount: 90_000,
                label: "harvest sale".to_string(),
            },
            Some(3),
        )
        .await
        .unwrap();
}

#[tokio::test]
async fn transaction_with_dangling_farm_is_a_conflict() {
    let (store, tenant_id) = store_with_tenant(PlanTier::Free).await;

    let res = store
        .record_transaction(
            &CreateTransactionParams {
                tenant_id: tenant_id.clone(),
                farm_id: Some(FarmId(Uuid::new_v4())),
                kind: TransactionKind::Expense,
                amount: 7_000,
                label: "diesel".to_string(),
            },
            None,
        )
        .await;
    assert!(matches!(res, Err(StoreError::Conflict)));
}

#[tokio::test]
async fn tasks_count_through_owning_team_member() {
    let (store, tenant_id) = store_with_tenant(PlanTier::Free).await;
    let other_id = store
        .create_tenant(&CreateTenantParams {
            email: "neighbor@example.com".to_string(),
            plan: PlanTier::Free,
        })
        .await
        .unwrap();

    let own_member = store
        .create_team_member(
            &CreateTeamMemberParams {
                tenant_id: tenant_id.clone(),
                name: "Awa".to_string(),
                email: None,
            },
            None,
        )
        .await
        .unwrap();
    let other_member = store
        .create_team_member(
            &CreateTeamMemberParams {
                tenant_id: other_id.clone(),
                name: "Binta".to_string(),
                email: None,
            },
            None,
        )
        .await
        .unwrap();

    for member in [&own_member, &own_member, &other_member] {
        store
            .create_task(
                &CreateTaskParams {
                    team_member_id: (*member).clone(),
                    title: "plowing".to_string(),
                    due_at: None,
                },
                None,
            )
            .await
            .unwrap();
    }

    assert_eq!(
        store
            .count_resource(&tenant_id, ResourceKind::Tasks)
            .await
            .unwrap(),
        2
    );
    assert_eq!(
        store
            .count_resource(&other_id, ResourceKind::Tasks)
            .await
            .unwrap(),
        1
    );

    // Task cap applies to the owning tenant's total.
    let denied = store
        .create_task(
            &CreateTaskParams {
                team_member_id: own_member.clone(),
                title: "one too many".to_string(),
                due_at: None,
            },
            Some(2),
        )
        .await;
    assert!(matches!(denied, Err(StoreError::LimitReached)));

    let missing = store
        .create_task(
            &CreateTaskParams {
                team_member_id: TeamMemberId(Uuid::new_v4()),
                title: "orphan".to_string(),
                due_at: None,
            },
            None,
        )
        .await;
    assert!(matches!(missing, Err(StoreError::NotFound)));
}

#[tokio::test]
async fn parcels_count_mirrors_farms() {
    let (store, tenant_id) = store_with_tenant(PlanTier::Free).await;
    for i in 0..2 {
        store
            .create_farm(&farm_params(&tenant_id, &format!("farm-{i}")), None)
            .await
            .unwrap();
    }

    assert_eq!(
        store
            .count_resource(&tenant_id, ResourceKind::Parcels)
            .await
            .unwrap(),
        store
            .count_resource(&tenant_id, ResourceKind::Farms)
            .await
            .unwrap(),
    );
}

#[tokio::test]
async fn weather_counter_caps_atomically() {
    let (store, tenant_id) = store_with_tenant(PlanTier::Free).await;

    assert_eq!(
        store.record_weather_call(&tenant_id, Some(2)).await.unwrap(),
        1
    );
    assert_eq!(
        store.record_weather_call(&tenant_id, Some(2)).await.unwrap(),
        2
    );
    assert!(matches!(
        store.record_weather_call(&tenant_id, Some(2)).await,
        Err(StoreError::LimitReached)
    ));
    assert_eq!(
        store
            .count_resource(&tenant_id, ResourceKind::WeatherApiCalls)
            .await
            .unwrap(),
        2
    );

    // Uncapped calls keep counting.
    assert_eq!(
        store.record_weather_call(&tenant_id, None).await.unwrap(),
        3
    );
}

#[tokio::test]
async fn gate_works_against_sqlite_backend() {
    use farmlink_entitlements::EntitlementGate;
    use std::sync::Arc;

    let (store, tenant_id) = store_with_tenant(PlanTier::Free).await;
    let store = Arc::new(store);
    for i in 0..3 {
        store
            .create_farm(&farm_params(&tenant_id, &format!("farm-{i}")), Some(3))
            .await
            .unwrap();
    }

    let gate = EntitlementGate::new(Arc::clone(&store));
    let decision = gate.check(&tenant_id, ResourceKind::Farms).await.unwrap();
    assert!(!decision.allowed);
    assert_eq!(decision.current_count, 3);
    assert_eq!(decision.limit, Some(3));
    assert!(decision.message.unwrap().contains("FREE"));
}
