//! The ownership-registry seam.
//!
//! Identity and possession facts live outside the engine. The engine only
//! ever asks two questions -- does this entity exist, and who owns it --
//! through the [`OwnershipRegistry`] trait, and never writes back.
//! Issuance, transfer, and destruction semantics are the registry's
//! concern.
//!
//! [`StaticRegistry`] is the in-memory implementation used by tests and by
//! embedders that run their own registry in-process.

use dashmap::DashMap;

use bondling_types::{EntityId, OwnerId};

/// Read-only view of the external ownership registry.
pub trait OwnershipRegistry: Send + Sync {
    /// Whether the entity has been issued and still exists.
    fn exists(&self, id: EntityId) -> bool;

    /// The current owner of the entity, or `None` if it does not exist.
    fn owner_of(&self, id: EntityId) -> Option<OwnerId>;
}

/// In-memory ownership registry.
#[derive(Debug, Default)]
pub struct StaticRegistry {
    owners: DashMap<EntityId, OwnerId>,
}

impl StaticRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            owners: DashMap::new(),
        }
    }

    /// Record `owner` as the owner of `id`.
    ///
    /// Returns the previous owner if the entity was already registered.
    pub fn register(&self, id: EntityId, owner: OwnerId) -> Option<OwnerId> {
        self.owners.insert(id, owner)
    }

    /// Reassign `id` to `new_owner`.
    ///
    /// Returns `false` (and changes nothing) if the entity is not
    /// registered.
    pub fn transfer(&self, id: EntityId, new_owner: OwnerId) -> bool {
        match self.owners.get_mut(&id) {
            Some(mut entry) => {
                *entry = new_owner;
                true
            }
            None => false,
        }
    }
}

impl OwnershipRegistry for StaticRegistry {
    fn exists(&self, id: EntityId) -> bool {
        self.owners.contains_key(&id)
    }

    fn owner_of(&self, id: EntityId) -> Option<OwnerId> {
        self.owners.get(&id).map(|entry| *entry.value())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unregistered_entity_does_not_exist() {
        let registry = StaticRegistry::new();
        assert!(!registry.exists(EntityId(1)));
        assert!(registry.owner_of(EntityId(1)).is_none());
    }

    #[test]
    fn register_then_lookup() {
        let registry = StaticRegistry::new();
        let owner = OwnerId::new();
        assert!(registry.register(EntityId(1), owner).is_none());
        assert!(registry.exists(EntityId(1)));
        assert_eq!(registry.owner_of(EntityId(1)), Some(owner));
    }

    #[test]
    fn transfer_changes_owner() {
        let registry = StaticRegistry::new();
        let first = OwnerId::new();
        let second = OwnerId::new();
        registry.register(EntityId(1), first);
        assert!(registry.transfer(EntityId(1), second));
        assert_eq!(registry.owner_of(EntityId(1)), Some(second));
    }

    #[test]
    fn transfer_of_unregistered_entity_fails() {
        let registry = StaticRegistry::new();
        assert!(!registry.transfer(EntityId(1), OwnerId::new()));
    }
}
