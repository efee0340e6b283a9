//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// Tenant identifier (one user account, the unit of quota scoping).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TenantId(pub Uuid);

/// Farm identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FarmId(pub Uuid);

/// Team member identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TeamMemberId(pub Uuid);

/// Money transaction identifier (expense or revenue row).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TransactionId(pub Uuid);

/// Field task identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct TaskId(pub Uuid);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tenant_id_debug() {
        let uuid = Uuid::new_v4();
        let tenant_id = TenantId(uuid);
        assert!(format!("{:?}", tenant_id).contains(&uuid.to_string()));
    }

    #[test]
    fn test_typed_ids_equality() {
        let uuid = Uuid::new_v4();
        let id1 = FarmId(uuid);
        let id2 = FarmId(uuid);
        assert_eq!(id1, id2);

        let different = FarmId(Uuid::new_v4());
        assert_ne!(id1, different);
    }

    #[test]
    fn test_typed_ids_inner_access() {
        let uuid = Uuid::new_v4();
        assert_eq!(TenantId(uuid).0, uuid);
        assert_eq!(TeamMemberId(uuid).0, uuid);
        assert_eq!(TransactionId(uuid).0, uuid);
        assert_eq!(TaskId(uuid).0, uuid);
    }

    #[test]
    fn test_typed_ids_hash() {
        use std::collections::HashSet;

        let uuid = Uuid::new_v4();
        let mut set = HashSet::new();
        set.insert(TenantId(uuid));
        assert!(set.contains(&TenantId(uuid)));
    }
}
