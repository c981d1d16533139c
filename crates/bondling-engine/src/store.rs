//! The trait store: per-entity personality records.
//!
//! A concurrent map from [`EntityId`] to [`Personality`]. Keys are unique
//! and unordered. The store holds data and nothing else -- invariant
//! maintenance (bounds, counters, cooldowns) is entirely the interaction
//! processor's responsibility before it writes.
//!
//! Mutation is serialized per entity: the processor holds the entity's map
//! entry for the full read-check-modify-write sequence, so two concurrent
//! interactions on the same entity cannot interleave, while distinct
//! entities proceed independently. There is deliberately no store-wide
//! lock.

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use bondling_types::{EntityId, Personality};

use crate::error::EngineError;

/// Concurrent mapping from entity to personality record.
#[derive(Debug, Default)]
pub struct TraitStore {
    entries: DashMap<EntityId, Personality>,
}

impl TraitStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            entries: DashMap::new(),
        }
    }

    /// A copy of the current record for `id`.
    pub fn get(&self, id: EntityId) -> Result<Personality, EngineError> {
        self.entries
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(EngineError::NotFound { entity_id: id })
    }

    /// Create the record for `id` with every trait at `baseline`.
    ///
    /// A personality is created exactly once per entity; a second call
    /// fails with [`EngineError::AlreadyExists`] and changes nothing.
    pub fn initialize(
        &self,
        id: EntityId,
        baseline: u32,
        now: DateTime<Utc>,
    ) -> Result<Personality, EngineError> {
        match self.entries.entry(id) {
            Entry::Occupied(_) => Err(EngineError::AlreadyExists { entity_id: id }),
            Entry::Vacant(vacant) => {
                let personality = Personality::baseline(baseline, now);
                vacant.insert(personality.clone());
                Ok(personality)
            }
        }
    }

    /// Total replace of the record for `id`.
    ///
    /// The caller is solely responsible for invariant maintenance before
    /// calling this.
    pub fn put(&self, id: EntityId, personality: Personality) {
        self.entries.insert(id, personality);
    }

    /// Whether a record exists for `id`.
    pub fn contains(&self, id: EntityId) -> bool {
        self.entries.contains_key(&id)
    }

    /// Number of records in the store.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the store holds no records.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Exclusive handle on the record slot for `id`.
    ///
    /// The processor holds this across an entire read-check-modify-write
    /// so same-entity interactions serialize.
    pub(crate) fn entry(&self, id: EntityId) -> Entry<'_, EntityId, Personality> {
        self.entries.entry(id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    #[test]
    fn get_missing_record_fails() {
        let store = TraitStore::new();
        assert_eq!(
            store.get(EntityId(1)),
            Err(EngineError::NotFound {
                entity_id: EntityId(1)
            })
        );
    }

    #[test]
    fn initialize_creates_baseline_record() {
        let store = TraitStore::new();
        let created = store.initialize(EntityId(1), 10, now());
        assert!(created.is_ok());
        let fetched = store.get(EntityId(1)).ok();
        assert_eq!(fetched.as_ref().map(|p| p.bonding_level), Some(10));
        assert_eq!(fetched.as_ref().map(|p| p.interaction_count), Some(0));
    }

    #[test]
    fn initialize_twice_fails() {
        let store = TraitStore::new();
        let _ = store.initialize(EntityId(1), 10, now());
        assert_eq!(
            store.initialize(EntityId(1), 10, now()),
            Err(EngineError::AlreadyExists {
                entity_id: EntityId(1)
            })
        );
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn put_replaces_the_whole_record() {
        let store = TraitStore::new();
        let _ = store.initialize(EntityId(1), 10, now());
        let mut updated = Personality::baseline(10, now());
        updated.bonding_level = 55;
        updated.interaction_count = 9;
        store.put(EntityId(1), updated.clone());
        assert_eq!(store.get(EntityId(1)).ok(), Some(updated));
    }

    #[test]
    fn contains_and_len_track_records() {
        let store = TraitStore::new();
        assert!(store.is_empty());
        let _ = store.initialize(EntityId(1), 10, now());
        let _ = store.initialize(EntityId(2), 10, now());
        assert!(store.contains(EntityId(1)));
        assert!(!store.contains(EntityId(3)));
        assert_eq!(store.len(), 2);
    }
}
