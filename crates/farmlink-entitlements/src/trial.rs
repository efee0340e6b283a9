//! Free-trial window arithmetic.
//!
//! Pure functions of time; no storage access and no mutation. The trial
//! only binds FREE-tier tenants: any paid tier reports "not expired, zero
//! days left" regardless of its trial timestamp.
//!
//! These functions feed a read-only trial-status banner. Nothing here
//! blocks writes; creation endpoints are gated by quotas alone.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use farmlink_storage::{PlanTier, Tenant};

/// Fixed trial duration in days.
pub const TRIAL_DAYS: i64 = 7;

const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Read-only trial status returned to handlers. `{0, false}` for any paid
/// tier.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialStatus {
    pub days_left: i64,
    pub is_expired: bool,
}

fn trial_end(trial_start: DateTime<Utc>) -> DateTime<Utc> {
    trial_start + Duration::days(TRIAL_DAYS)
}

/// Whether the trial window has elapsed.
///
/// Strict comparison: exactly `TRIAL_DAYS` elapsed is not yet expired; one
/// second past is.
pub fn is_trial_expired(tier: PlanTier, trial_start: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    if tier != PlanTier::Free {
        return false;
    }
    now > trial_end(trial_start)
}

/// Whole days remaining in the trial window, floored at zero.
///
/// Uses a whole-day ceiling of the remaining duration so that "1 hour
/// left" reports 1 day left, not 0.
pub fn days_left(tier: PlanTier, trial_start: DateTime<Utc>, now: DateTime<Utc>) -> i64 {
    if tier != PlanTier::Free {
        return 0;
    }
    let remaining = trial_end(trial_start) - now;
    let millis = remaining.num_milliseconds();
    if millis <= 0 {
        return 0;
    }
    // Ceiling division on milliseconds.
    (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
}

/// Combined status for a tenant, defaulting a never-started trial to the
/// account creation time.
pub fn trial_status(tenant: &Tenant, now: DateTime<Utc>) -> TrialStatus {
    let start = tenant.trial_reference();
    TrialStatus {
        days_left: days_left(tenant.plan, start, now),
        is_expired: is_trial_expired(tenant.plan, start, now),
    }
}
