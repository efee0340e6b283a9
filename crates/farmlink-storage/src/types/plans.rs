//! Subscription plan tiers.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Subscription plan tier governing quotas and feature flags.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanTier {
    Free,
    Basic,
    Business,
    Enterprise,
}

impl FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "basic" => Ok(PlanTier::Basic),
            "business" => Ok(PlanTier::Business),
            "enterprise" => Ok(PlanTier::Enterprise),
            _ => Err(format!("invalid plan tier: {}", s)),
        }
    }
}

impl PlanTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Basic => "basic",
            PlanTier::Business => "business",
            PlanTier::Enterprise => "enterprise",
        }
    }

    /// Uppercase label used in user-facing messages ("FREE", "BASIC", ...).
    pub fn label(&self) -> &'static str {
        match self {
            PlanTier::Free => "FREE",
            PlanTier::Basic => "BASIC",
            PlanTier::Business => "BUSINESS",
            PlanTier::Enterprise => "ENTERPRISE",
        }
    }

    /// Parse a tier string, mapping anything unrecognized to `Free`.
    ///
    /// Quota enforcement must never treat an unknown tier as more permissive
    /// than the free plan, so rows with a bad `plan` column degrade to FREE
    /// semantics instead of erroring.
    pub fn parse_lossy(s: &str) -> PlanTier {
        s.parse().unwrap_or(PlanTier::Free)
    }

    /// Whether this is a paid tier (everything above `Free`).
    pub fn is_paid(&self) -> bool {
        !matches!(self, PlanTier::Free)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plan_tier_roundtrip() {
        for tier in [
            PlanTier::Free,
            PlanTier::Basic,
            PlanTier::Business,
            PlanTier::Enterprise,
        ] {
            let s = tier.as_str();
            let parsed: PlanTier = s.parse().unwrap();
            assert_eq!(tier, parsed);
        }
    }

    #[test]
    fn test_plan_tier_parse_invalid() {
        assert!("gold".parse::<PlanTier>().is_err());
        assert!("FREE".parse::<PlanTier>().is_err()); // Case sensitive
        assert!("".parse::<PlanTier>().is_err());
    }

    #[test]
    fn test_parse_lossy_falls_back_to_free() {
        assert_eq!(PlanTier::parse_lossy("basic"), PlanTier::Basic);
        assert_eq!(PlanTier::parse_lossy("gold"), PlanTier::Free);
        assert_eq!(PlanTier::parse_lossy(""), PlanTier::Free);
    }

    #[test]
    fn test_is_paid() {
        assert!(!PlanTier::Free.is_paid());
        assert!(PlanTier::Basic.is_paid());
        assert!(PlanTier::Business.is_paid());
        assert!(PlanTier::Enterprise.is_paid());
    }

    #[test]
    fn test_label_is_uppercase() {
        assert_eq!(PlanTier::Free.label(), "FREE");
        assert_eq!(PlanTier::Enterprise.label(), "ENTERPRISE");
    }
}
