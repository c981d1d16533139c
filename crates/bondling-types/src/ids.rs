//! Type-safe identifier wrappers.
//!
//! The ownership registry issues entity identifiers as opaque unsigned
//! integers; owner addresses are opaque UUIDs. Both are wrapped in newtypes
//! so the compiler prevents accidental mixing of identifiers. The engine
//! never generates an [`EntityId`] -- it only consumes what the registry
//! hands out. [`OwnerId::new`] exists for app-side generation (tests,
//! embedding callers that also run the registry).

use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

/// Unique identifier for a personality-bearing entity.
///
/// Issued by the external ownership registry and treated as fully opaque:
/// the engine neither generates nor reuses these values.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct EntityId(pub u64);

impl EntityId {
    /// Return the inner integer value.
    pub const fn into_inner(self) -> u64 {
        self.0
    }
}

impl core::fmt::Display for EntityId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for EntityId {
    fn from(id: u64) -> Self {
        Self(id)
    }
}

impl From<EntityId> for u64 {
    fn from(id: EntityId) -> Self {
        id.0
    }
}

/// Opaque owner address as reported by the ownership registry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub struct OwnerId(pub Uuid);

impl OwnerId {
    /// Create a new owner address using UUID v7 (time-ordered).
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }

    /// Return the inner [`Uuid`] value.
    pub const fn into_inner(self) -> Uuid {
        self.0
    }
}

impl Default for OwnerId {
    fn default() -> Self {
        Self::new()
    }
}

impl core::fmt::Display for OwnerId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<Uuid> for OwnerId {
    fn from(id: Uuid) -> Self {
        Self(id)
    }
}

impl From<OwnerId> for Uuid {
    fn from(id: OwnerId) -> Self {
        id.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_distinct_types() {
        let entity = EntityId(7);
        let owner = OwnerId::new();
        // These are different types -- the compiler enforces no mixing.
        assert_eq!(entity.into_inner(), 7);
        assert_ne!(owner.into_inner(), Uuid::nil());
    }

    #[test]
    fn entity_id_roundtrip_serde() {
        let original = EntityId(42);
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<EntityId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn owner_id_roundtrip_serde() {
        let original = OwnerId::new();
        let json = serde_json::to_string(&original).ok();
        assert!(json.is_some());
        let restored: Result<OwnerId, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(original));
    }

    #[test]
    fn entity_id_display_matches_inner() {
        let id = EntityId(1234);
        assert_eq!(id.to_string(), "1234");
    }

    #[test]
    fn owner_id_display_matches_uuid() {
        let id = OwnerId::new();
        assert_eq!(id.to_string(), id.into_inner().to_string());
    }
}
