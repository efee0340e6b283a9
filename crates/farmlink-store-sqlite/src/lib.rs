//! SQLite TenantStore backend.
//!
//! Quota-checked writes recount inside a single transaction on a
//! single-connection pool, so a concurrent creation cannot observe a stale
//! count and slip past the cap. The weather API counter is a conditional
//! atomic UPDATE instead of a recount.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{SqliteConnection, SqlitePool};
use uuid::Uuid;

use farmlink_storage::{
    CreateFarmParams, CreateTaskParams, CreateTeamMemberParams, CreateTenantParams,
    CreateTransactionParams, FarmId, PlanTier, ResourceKind, StoreError, TaskId, TeamMemberId,
    Tenant, TenantId, TenantStore, TransactionId, TransactionKind,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// `~/.farmlink/store.db` (creates dir with 0700 perms on unix)
    pub async fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| StoreError::Backend("no home dir".into()))?
            .join(".farmlink");
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.to_string()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let path = dir.join("store.db");
        let url = format!("sqlite://{}?mode=rwc", path.to_string_lossy());
        Self::open(&url).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

fn ts_to_datetime(ts: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp(ts, 0)
        .ok_or_else(|| StoreError::Backend(format!("bad timestamp: {ts}")))
}

fn map_constraint(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else if s.contains("FOREIGN KEY") {
        StoreError::Conflict
    } else {
        StoreError::Backend(s)
    }
}

/// Live count for one resource kind, runnable on a pool connection or
/// inside a transaction.
async fn count_on(
    conn: &mut SqliteConnection,
    tenant_id: &TenantId,
    kind: ResourceKind,
) -> Result<u64, StoreError> {
    let tenant = tenant_id.0.to_string();
    let count: i64 = match kind {
        // The parcel quota counts farms, not parcel rows. Carried over
        // from the production system; see DESIGN.md before changing.
        ResourceKind::Farms | ResourceKind::Parcels => {
            sqlx::query_scalar("SELECT COUNT(*) FROM farms WHERE tenant_id=?")
                .bind(&tenant)
                .fetch_one(conn)
                .await
        }
        ResourceKind::TeamMembers => {
            sqlx::query_scalar("SELECT COUNT(*) FROM team_members WHERE tenant_id=?")
                .bind(&tenant)
                .fetch_one(conn)
                .await
        }
        // Revenue rows never count against the expense quota.
        ResourceKind::Expenses => sqlx::query_scalar(
            "SELECT COUNT(*) FROM transactions WHERE tenant_id=? AND kind='expense'",
        )
        .bind(&tenant)
        .fetch_one(conn)
        .await,
        ResourceKind::Tasks => sqlx::query_scalar(
            "SELECT COUNT(*) FROM tasks t
             JOIN team_members m ON m.id=t.team_member_id
             WHERE m.tenant_id=?",
        )
        .bind(&tenant)
        .fetch_one(conn)
        .await,
        ResourceKind::WeatherApiCalls => sqlx::query_scalar(
            "SELECT COALESCE((SELECT calls FROM weather_call_counters WHERE tenant_id=?), 0)",
        )
        .bind(&tenant)
        .fetch_one(conn)
        .await,
    }
    .map_err(|e| StoreError::Backend(e.to_string()))?;
    Ok(count as u64)
}

async fn tenant_exists(
    conn: &mut SqliteConnection,
    tenant_id: &TenantId,
) -> Result<(), StoreError> {
    let found: Option<(i64,)> = sqlx::query_as("SELECT 1 FROM tenants WHERE id=?")
        .bind(tenant_id.0.to_string())
        .fetch_optional(conn)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
    match found {
        Some(_) => Ok(()),
        None => Err(StoreError::NotFound),
    }
}

fn check_cap(current: u64, cap: Option<u64>) -> Result<(), StoreError> {
    if let Some(max) = cap {
        if current >= max {
            return Err(StoreError::LimitReached);
        }
    }
    Ok(())
}

#[async_trait::async_trait]
impl TenantStore for SqliteStore {
    // ───────────────────────────────────── Tenants ────────────────────────────────────────

    async fn create_tenant(&self, params: &CreateTenantParams) -> Result<TenantId, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now().timestamp();
        sqlx::query(
            "INSERT INTO tenants(id,email,plan,trial_started_at,created_at,updated_at)
             VALUES(?,?,?,NULL,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.email)
        .bind(params.plan.as_str())
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(map_constraint)?;
        tracing::info!(tenant_id = %id, "tenant created");
        Ok(TenantId(id))
    }

    async fn get_tenant(&self, tenant_id: &TenantId) -> Result<Tenant, StoreError> {
        let row = sqlx::query_as::<_, (String, String, Option<i64>, i64, i64)>(
            "SELECT email,plan,trial_started_at,created_at,updated_at FROM tenants WHERE id=?",
        )
        .bind(tenant_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        match row {
            None => Err(StoreError::NotFound),
            Some((email, plan, trial, created, updated)) => Ok(Tenant {
                id: tenant_id.clone(),
                email,
                // A bad plan column degrades to FREE semantics rather than
                // failing the read.
                plan: PlanTier::parse_lossy(&plan),
                trial_started_at: trial.map(ts_to_datetime).transpose()?,
                created_at: ts_to_datetime(created)?,
                updated_at: ts_to_datetime(updated)?,
            }),
        }
    }

    async fn set_tenant_plan(
        &self,
        tenant_id: &TenantId,
        plan: PlanTier,
    ) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE tenants SET plan=?, updated_at=? WHERE id=?")
            .bind(plan.as_str())
            .bind(Utc::now().timestamp())
            .bind(tenant_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn start_trial(&self, tenant_id: &TenantId, at: DateTime<Utc>) -> Result<(), StoreError> {
        let res = sqlx::query("UPDATE tenants SET trial_started_at=?, updated_at=? WHERE id=?")
            .bind(at.timestamp())
            .bind(Utc::now().timestamp())
            .bind(tenant_id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        if res.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ───────────────────────────────────── Counting ───────────────────────────────────────

    async fn count_resource(
        &self,
        tenant_id: &TenantId,
        kind: ResourceKind,
    ) -> Result<u64, StoreError> {
        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        count_on(&mut conn, tenant_id, kind).await
    }

    // ─────────────────────────────── Quota-checked writes ─────────────────────────────────

    async fn create_farm(
        &self,
        params: &CreateFarmParams,
        cap: Option<u64>,
    ) -> Result<FarmId, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tenant_exists(&mut tx, &params.tenant_id).await?;
        let current = count_on(&mut tx, &params.tenant_id, ResourceKind::Farms).await?;
        check_cap(current, cap)?;

        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO farms(id,tenant_id,name,location,created_at) VALUES(?,?,?,?,?)")
            .bind(id.to_string())
            .bind(params.tenant_id.0.to_string())
            .bind(&params.name)
            .bind(&params.location)
            .bind(Utc::now().timestamp())
            .execute(&mut *tx)
            .await
            .map_err(map_constraint)?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!(tenant_id = %params.tenant_id.0, farm_id = %id, "farm created");
        Ok(FarmId(id))
    }

    async fn create_team_member(
        &self,
        params: &CreateTeamMemberParams,
        cap: Option<u64>,
    ) -> Result<TeamMemberId, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tenant_exists(&mut tx, &params.tenant_id).await?;
        let current = count_on(&mut tx, &params.tenant_id, ResourceKind::TeamMembers).await?;
        check_cap(current, cap)?;

        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO team_members(id,tenant_id,name,email,created_at) VALUES(?,?,?,?,?)")
            .bind(id.to_string())
            .bind(params.tenant_id.0.to_string())
            .bind(&params.name)
            .bind(&params.email)
            .bind(Utc::now().timestamp())
            .execute(&mut *tx)
            .await
            .map_err(map_constraint)?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!(
            tenant_id = %params.tenant_id.0,
            team_member_id = %id,
            "team member created"
        );
        Ok(TeamMemberId(id))
    }

    async fn record_transaction(
        &self,
        params: &CreateTransactionParams,
        cap: Option<u64>,
    ) -> Result<TransactionId, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tenant_exists(&mut tx, &params.tenant_id).await?;
        // The cap binds expenses only; revenue is never quota-bound.
        if params.kind == TransactionKind::Expense {
            let current = count_on(&mut tx, &params.tenant_id, ResourceKind::Expenses).await?;
            check_cap(current, cap)?;
        }

        let id = Uuid::now_v7();
        sqlx::query(
            "INSERT INTO transactions(id,tenant_id,farm_id,kind,amount,label,created_at)
             VALUES(?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.tenant_id.0.to_string())
        .bind(params.farm_id.as_ref().map(|f| f.0.to_string()))
        .bind(params.kind.as_str())
        .bind(params.amount)
        .bind(&params.label)
        .bind(Utc::now().timestamp())
        .execute(&mut *tx)
        .await
        // A dangling farm_id trips the FK constraint and maps to Conflict.
        .map_err(map_constraint)?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!(
            tenant_id = %params.tenant_id.0,
            transaction_id = %id,
            kind = params.kind.as_str(),
            "transaction recorded"
        );
        Ok(TransactionId(id))
    }

    async fn create_task(
        &self,
        params: &CreateTaskParams,
        cap: Option<u64>,
    ) -> Result<TaskId, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Resolve the owning tenant through the team member.
        let owner: Option<(String,)> =
            sqlx::query_as("SELECT tenant_id FROM team_members WHERE id=?")
                .bind(params.team_member_id.0.to_string())
                .fetch_optional(&mut *tx)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        let tenant_id = match owner {
            Some((id,)) => TenantId(
                Uuid::try_parse(&id).map_err(|e| StoreError::Backend(e.to_string()))?,
            ),
            None => return Err(StoreError::NotFound),
        };

        let current = count_on(&mut tx, &tenant_id, ResourceKind::Tasks).await?;
        check_cap(current, cap)?;

        let id = Uuid::now_v7();
        sqlx::query("INSERT INTO tasks(id,team_member_id,title,due_at,created_at) VALUES(?,?,?,?,?)")
            .bind(id.to_string())
            .bind(params.team_member_id.0.to_string())
            .bind(&params.title)
            .bind(params.due_at.map(|t| t.timestamp()))
            .bind(Utc::now().timestamp())
            .execute(&mut *tx)
            .await
            .map_err(map_constraint)?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!(
            tenant_id = %tenant_id.0,
            team_member_id = %params.team_member_id.0,
            task_id = %id,
            "task created"
        );
        Ok(TaskId(id))
    }

    async fn record_weather_call(
        &self,
        tenant_id: &TenantId,
        cap: Option<u64>,
    ) -> Result<u64, StoreError> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tenant_exists(&mut tx, tenant_id).await?;

        let tenant = tenant_id.0.to_string();
        sqlx::query(
            "INSERT INTO weather_call_counters(tenant_id,calls) VALUES(?,0)
             ON CONFLICT(tenant_id) DO NOTHING",
        )
        .bind(&tenant)
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;

        // Conditional increment; zero rows affected means the cap is hit.
        let res = sqlx::query(
            "UPDATE weather_call_counters SET calls = calls + 1
             WHERE tenant_id=? AND (? IS NULL OR calls < ?)",
        )
        .bind(&tenant)
        .bind(cap.map(|c| c as i64))
        .bind(cap.map(|c| c as i64))
        .execute(&mut *tx)
        .await
        .map_err(|e| StoreError::Backend(e.to_string()))?;
        if res.rows_affected() == 0 {
            return Err(StoreError::LimitReached);
        }

        let calls: i64 =
            sqlx::query_scalar("SELECT calls FROM weather_call_counters WHERE tenant_id=?")
                .bind(&tenant)
                .fetch_one(&mut *tx)
                .await
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        tx.commit()
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;
        tracing::info!(tenant_id = %tenant_id.0, calls, "weather call recorded");
        Ok(calls as u64)
    }
}
