//! The interaction processor.
//!
//! [`Engine`] owns the trait store and applies owner-authorized
//! interactions to it. Each call runs the same pipeline:
//!
//! 1. Ownership check (registry existence + owner match).
//! 2. Load the personality; lazily stage a baseline record if the
//!    creation policy allows it.
//! 3. Cooldown check.
//! 4. Resolve the interaction kind against the configured delta table.
//! 5. Apply saturating trait deltas, bump the interaction counter, stamp
//!    the timestamp.
//! 6. Persist and emit notifications.
//!
//! All validation (1--4) precedes all mutation (5--6): a failed call
//! leaves the store untouched and emits nothing. The entity's store entry
//! is held across steps 2--6, so concurrent calls against the same entity
//! serialize while distinct entities proceed independently.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use dashmap::mapref::entry::Entry;
use parking_lot::RwLock;
use tracing::{debug, info};

use bondling_types::{EntityId, InteractionKind, Notification, OwnerId, Personality, TraitKind};

use crate::config::{BatchAtomicity, CreationPolicy, EngineConfig};
use crate::error::EngineError;
use crate::guard;
use crate::notify::NotificationSink;
use crate::registry::OwnershipRegistry;
use crate::store::TraitStore;

/// Result of one accepted interaction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InteractionReceipt {
    /// The entity that was interacted with.
    pub entity_id: EntityId,
    /// The kind of interaction applied.
    pub kind: InteractionKind,
    /// Whether this call lazily created the personality.
    pub initialized: bool,
    /// Traits that actually changed, with their new values, in
    /// [`TraitKind::ALL`] order. A trait already at the cap is absent.
    pub changed: Vec<(TraitKind, u32)>,
    /// The full record as persisted.
    pub personality: Personality,
}

/// Result of a batch interaction, shaped by the configured atomicity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BatchOutcome {
    /// Per-item mode: one result per input pair, in input order. Earlier
    /// successes survive later failures.
    PerItem(Vec<Result<InteractionReceipt, EngineError>>),
    /// All-or-nothing mode: receipts for every pair; any failure rejects
    /// the whole batch before any pair is applied.
    Atomic(Vec<InteractionReceipt>),
}

/// The personality evolution engine.
pub struct Engine {
    config: EngineConfig,
    store: TraitStore,
    registry: Arc<dyn OwnershipRegistry>,
    sink: Arc<dyn NotificationSink>,
    /// Single interactions take the read side; all-or-nothing batches
    /// take the write side so their validate-then-apply sequence cannot
    /// interleave with other mutations.
    batch_gate: RwLock<()>,
}

impl Engine {
    /// Create an engine over an empty store.
    pub fn new(
        config: EngineConfig,
        registry: Arc<dyn OwnershipRegistry>,
        sink: Arc<dyn NotificationSink>,
    ) -> Self {
        Self {
            config,
            store: TraitStore::new(),
            registry,
            sink,
            batch_gate: RwLock::new(()),
        }
    }

    /// The engine's configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Apply one interaction to the entity's personality.
    pub fn interact(
        &self,
        id: EntityId,
        kind: InteractionKind,
        caller: OwnerId,
        now: DateTime<Utc>,
    ) -> Result<InteractionReceipt, EngineError> {
        let _gate = self.batch_gate.read();
        self.interact_locked(id, kind, caller, now)
    }

    /// Apply interactions to `(entity, kind)` pairs in input order.
    ///
    /// Semantics follow the configured [`BatchAtomicity`]. In per-item
    /// mode each pair is an independent transaction; in all-or-nothing
    /// mode every pair is validated (projecting intra-batch cooldown
    /// effects per entity) before any pair is applied.
    pub fn interact_batch(
        &self,
        pairs: &[(EntityId, InteractionKind)],
        caller: OwnerId,
        now: DateTime<Utc>,
    ) -> Result<BatchOutcome, EngineError> {
        match self.config.batch_atomicity {
            BatchAtomicity::PerItem => {
                let _gate = self.batch_gate.read();
                let results = pairs
                    .iter()
                    .map(|&(id, kind)| self.interact_locked(id, kind, caller, now))
                    .collect();
                Ok(BatchOutcome::PerItem(results))
            }
            BatchAtomicity::AllOrNothing => {
                let _gate = self.batch_gate.write();
                self.validate_batch(pairs, caller, now)?;
                let mut receipts = Vec::with_capacity(pairs.len());
                for &(id, kind) in pairs {
                    // Validation ran under the exclusive gate, so these
                    // applies cannot fail short of counter overflow.
                    receipts.push(self.interact_locked(id, kind, caller, now)?);
                }
                Ok(BatchOutcome::Atomic(receipts))
            }
        }
    }

    /// Batch entry point taking parallel sequences.
    ///
    /// Fails with [`EngineError::LengthMismatch`] before processing any
    /// pair if the sequences differ in length.
    pub fn interact_batch_seq(
        &self,
        ids: &[EntityId],
        kinds: &[InteractionKind],
        caller: OwnerId,
        now: DateTime<Utc>,
    ) -> Result<BatchOutcome, EngineError> {
        if ids.len() != kinds.len() {
            return Err(EngineError::LengthMismatch {
                ids: ids.len(),
                kinds: kinds.len(),
            });
        }
        let pairs: Vec<(EntityId, InteractionKind)> =
            ids.iter().copied().zip(kinds.iter().copied()).collect();
        self.interact_batch(&pairs, caller, now)
    }

    /// A copy of the entity's current personality.
    pub fn personality(&self, id: EntityId) -> Result<Personality, EngineError> {
        self.store.get(id)
    }

    /// Explicitly create the entity's personality at baseline values.
    ///
    /// Used by deployments running [`CreationPolicy::ExplicitOnly`];
    /// ownership-gated like any mutation.
    pub fn initialize(
        &self,
        id: EntityId,
        caller: OwnerId,
        now: DateTime<Utc>,
    ) -> Result<Personality, EngineError> {
        guard::check_ownership(self.registry.as_ref(), id, caller)?;
        let personality = self.store.initialize(id, self.config.baseline_trait, now)?;
        info!(entity_id = %id, "personality initialized");
        Ok(personality)
    }

    /// When the entity's cooldown allows the next interaction.
    ///
    /// `Ok(None)` means an interaction at `now` would pass the cooldown;
    /// `Ok(Some(t))` means the caller should retry at `t`. Fails with
    /// [`EngineError::NotFound`] if no personality exists.
    pub fn next_valid_at(
        &self,
        id: EntityId,
        now: DateTime<Utc>,
    ) -> Result<Option<DateTime<Utc>>, EngineError> {
        let personality = self.store.get(id)?;
        let Some(last) = personality.last_interaction_at else {
            return Ok(None);
        };
        let next = last
            .checked_add_signed(self.config.cooldown_window())
            .ok_or_else(|| EngineError::ArithmeticOverflow {
                context: String::from("cooldown deadline overflow"),
            })?;
        Ok((now < next).then_some(next))
    }

    /// One full validate-and-apply pass, with the entity's entry held
    /// throughout. Callers must hold the batch gate.
    fn interact_locked(
        &self,
        id: EntityId,
        kind: InteractionKind,
        caller: OwnerId,
        now: DateTime<Utc>,
    ) -> Result<InteractionReceipt, EngineError> {
        let result = self.interact_inner(id, kind, caller, now);
        match &result {
            Ok(receipt) => info!(
                entity_id = %id,
                kind = ?kind,
                interaction_count = receipt.personality.interaction_count,
                initialized = receipt.initialized,
                "interaction accepted"
            ),
            Err(err) => debug!(
                entity_id = %id,
                kind = ?kind,
                caller = %caller,
                error = %err,
                "interaction rejected"
            ),
        }
        result
    }

    fn interact_inner(
        &self,
        id: EntityId,
        kind: InteractionKind,
        caller: OwnerId,
        now: DateTime<Utc>,
    ) -> Result<InteractionReceipt, EngineError> {
        // Ownership first: an unauthorized caller learns nothing about
        // rate-limit or existence state beyond the registry's answer.
        guard::check_ownership(self.registry.as_ref(), id, caller)?;

        let entry = self.store.entry(id);
        let (current, initialized) = match &entry {
            Entry::Occupied(occupied) => (occupied.get().clone(), false),
            Entry::Vacant(_) => {
                if self.config.creation == CreationPolicy::ExplicitOnly {
                    return Err(EngineError::NotFound { entity_id: id });
                }
                // Registry existence was confirmed above; stage a baseline
                // record. It is persisted only if the whole call succeeds.
                (
                    Personality::baseline(self.config.baseline_trait, now),
                    true,
                )
            }
        };

        guard::check_cooldown(&current, id, now, self.config.cooldown_window())?;
        let deltas = self.resolve_deltas(kind)?;
        let (updated, changed) = Self::apply(current, deltas, self.config.trait_cap, now)?;

        let receipt = InteractionReceipt {
            entity_id: id,
            kind,
            initialized,
            changed,
            personality: updated,
        };
        // Persist, then emit while still holding the entry so the
        // notification stream for one entity matches its state order.
        match entry {
            Entry::Occupied(mut occupied) => {
                occupied.insert(receipt.personality.clone());
                self.emit(&receipt);
            }
            Entry::Vacant(vacant) => {
                let _slot = vacant.insert(receipt.personality.clone());
                self.emit(&receipt);
            }
        }
        Ok(receipt)
    }

    /// The delta set for `kind`, rejecting unmapped or empty kinds.
    fn resolve_deltas(
        &self,
        kind: InteractionKind,
    ) -> Result<&BTreeMap<TraitKind, u32>, EngineError> {
        match self.config.deltas_for(kind) {
            Some(deltas) if !deltas.is_empty() => Ok(deltas),
            Some(_) => Err(EngineError::InvalidInteraction {
                kind,
                reason: String::from("kind maps to an empty delta set"),
            }),
            None => Err(EngineError::InvalidInteraction {
                kind,
                reason: String::from("no delta mapping configured for kind"),
            }),
        }
    }

    /// Apply the resolved deltas to a copy of the record.
    ///
    /// Trait updates saturate at `cap` and never wrap; a trait that does
    /// not move is excluded from the changed list. The interaction counter
    /// uses checked arithmetic.
    fn apply(
        mut personality: Personality,
        deltas: &BTreeMap<TraitKind, u32>,
        cap: u32,
        now: DateTime<Utc>,
    ) -> Result<(Personality, Vec<(TraitKind, u32)>), EngineError> {
        let mut changed = Vec::new();
        for trait_kind in TraitKind::ALL {
            let Some(delta) = deltas.get(&trait_kind) else {
                continue;
            };
            let current = personality.trait_value(trait_kind);
            let new_value = current.saturating_add(*delta).min(cap);
            if new_value != current {
                personality.set_trait(trait_kind, new_value);
                changed.push((trait_kind, new_value));
            }
        }
        personality.interaction_count = personality
            .interaction_count
            .checked_add(1)
            .ok_or_else(|| EngineError::ArithmeticOverflow {
                context: String::from("interaction count overflow"),
            })?;
        personality.last_interaction_at = Some(now);
        Ok((personality, changed))
    }

    /// Validation-only pass for all-or-nothing batches.
    ///
    /// Projects the effect of each pair onto an in-memory copy so that a
    /// later pair touching the same entity is checked against the state
    /// the earlier pair would leave behind (in particular, its cooldown).
    fn validate_batch(
        &self,
        pairs: &[(EntityId, InteractionKind)],
        caller: OwnerId,
        now: DateTime<Utc>,
    ) -> Result<(), EngineError> {
        let window = self.config.cooldown_window();
        let mut projected: BTreeMap<EntityId, Personality> = BTreeMap::new();
        for &(id, kind) in pairs {
            guard::check_ownership(self.registry.as_ref(), id, caller)?;
            let current = match projected.get(&id) {
                Some(personality) => personality.clone(),
                None => match self.store.get(id) {
                    Ok(personality) => personality,
                    Err(EngineError::NotFound { .. })
                        if self.config.creation == CreationPolicy::OnFirstInteraction =>
                    {
                        Personality::baseline(self.config.baseline_trait, now)
                    }
                    Err(err) => return Err(err),
                },
            };
            guard::check_cooldown(&current, id, now, window)?;
            let deltas = self.resolve_deltas(kind)?;
            let (updated, _) = Self::apply(current, deltas, self.config.trait_cap, now)?;
            projected.insert(id, updated);
        }
        Ok(())
    }

    /// Emit the notification burst for one accepted interaction:
    /// registered, then one per changed trait, then the full record.
    fn emit(&self, receipt: &InteractionReceipt) {
        self.sink.publish(&Notification::InteractionRegistered {
            entity_id: receipt.entity_id,
            kind: receipt.kind,
        });
        for &(trait_kind, new_value) in &receipt.changed {
            self.sink.publish(&Notification::TraitIncreased {
                entity_id: receipt.entity_id,
                trait_kind,
                new_value,
            });
        }
        self.sink.publish(&Notification::PersonalityUpdated {
            entity_id: receipt.entity_id,
            personality: receipt.personality.clone(),
        });
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use crate::notify::BufferSink;
    use crate::registry::StaticRegistry;

    use super::*;

    fn base_time() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    fn engine_with(config: EngineConfig) -> (Engine, OwnerId) {
        let registry = StaticRegistry::new();
        let owner = OwnerId::new();
        registry.register(EntityId(7), owner);
        let engine = Engine::new(config, Arc::new(registry), Arc::new(BufferSink::new()));
        (engine, owner)
    }

    #[test]
    fn first_interaction_initializes_lazily() {
        let (engine, owner) = engine_with(EngineConfig::default());
        let receipt = engine.interact(EntityId(7), InteractionKind::Gentle, owner, base_time());
        assert!(receipt.is_ok());
        if let Ok(receipt) = receipt {
            assert!(receipt.initialized);
            assert_eq!(receipt.personality.bonding_level, 11);
            assert_eq!(receipt.personality.interaction_count, 1);
            assert_eq!(receipt.personality.last_interaction_at, Some(base_time()));
        }
    }

    #[test]
    fn explicit_only_policy_requires_initialize() {
        let config = EngineConfig {
            creation: CreationPolicy::ExplicitOnly,
            ..EngineConfig::default()
        };
        let (engine, owner) = engine_with(config);
        let result = engine.interact(EntityId(7), InteractionKind::Gentle, owner, base_time());
        assert_eq!(
            result,
            Err(EngineError::NotFound {
                entity_id: EntityId(7)
            })
        );
        // After an explicit initialize the same call passes.
        assert!(engine.initialize(EntityId(7), owner, base_time()).is_ok());
        let result = engine.interact(EntityId(7), InteractionKind::Gentle, owner, base_time());
        assert!(result.is_ok());
    }

    #[test]
    fn reserved_kind_rejected_until_configured() {
        let (engine, owner) = engine_with(EngineConfig::default());
        let result =
            engine.interact(EntityId(7), InteractionKind::LongPress, owner, base_time());
        assert!(matches!(
            result,
            Err(EngineError::InvalidInteraction {
                kind: InteractionKind::LongPress,
                ..
            })
        ));
        // Rejection leaves no record behind.
        assert_eq!(
            engine.personality(EntityId(7)),
            Err(EngineError::NotFound {
                entity_id: EntityId(7)
            })
        );
    }

    #[test]
    fn configured_long_press_applies_its_table_entry() {
        let mut config = EngineConfig::default();
        config.deltas.insert(
            InteractionKind::LongPress,
            BTreeMap::from([(TraitKind::BondingLevel, 2)]),
        );
        let (engine, owner) = engine_with(config);
        let receipt =
            engine.interact(EntityId(7), InteractionKind::LongPress, owner, base_time());
        assert_eq!(
            receipt.map(|r| r.personality.bonding_level),
            Ok(12)
        );
    }

    #[test]
    fn saturated_trait_is_not_reported_as_changed() {
        let config = EngineConfig {
            baseline_trait: 100,
            ..EngineConfig::default()
        };
        let (engine, owner) = engine_with(config);
        let receipt = engine.interact(EntityId(7), InteractionKind::Gentle, owner, base_time());
        assert!(receipt.is_ok());
        if let Ok(receipt) = receipt {
            assert!(receipt.changed.is_empty());
            assert_eq!(receipt.personality.bonding_level, 100);
            assert_eq!(receipt.personality.interaction_count, 1);
        }
    }

    #[test]
    fn next_valid_at_tracks_the_cooldown() {
        let (engine, owner) = engine_with(EngineConfig::default());
        let _ = engine.interact(EntityId(7), InteractionKind::Gentle, owner, base_time());
        let deadline = base_time()
            .checked_add_signed(chrono::Duration::hours(1))
            .unwrap_or_else(base_time);
        assert_eq!(
            engine.next_valid_at(EntityId(7), base_time()),
            Ok(Some(deadline))
        );
        assert_eq!(engine.next_valid_at(EntityId(7), deadline), Ok(None));
    }

    #[test]
    fn initialize_is_ownership_gated() {
        let (engine, _owner) = engine_with(EngineConfig::default());
        let stranger = OwnerId::new();
        let result = engine.initialize(EntityId(7), stranger, base_time());
        assert_eq!(
            result,
            Err(EngineError::Unauthorized {
                entity_id: EntityId(7),
                caller: stranger,
            })
        );
    }
}
