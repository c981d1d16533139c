//! Observer notifications.
//!
//! Every accepted interaction produces an ordered burst of notifications:
//! one [`Notification::InteractionRegistered`], then one
//! [`Notification::TraitIncreased`] per trait whose value actually changed
//! (in [`TraitKind::ALL`] order), then exactly one
//! [`Notification::PersonalityUpdated`] carrying the full record.
//!
//! Notifications are observational only: they carry no engine state beyond
//! the values shown, and delivery is at-least-once. Rejected interactions
//! emit nothing.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::{InteractionKind, TraitKind};
use crate::ids::EntityId;
use crate::structs::Personality;

/// A state-transition notification emitted to external observers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub enum Notification {
    /// An interaction was accepted for the entity.
    InteractionRegistered {
        /// The entity that was interacted with.
        entity_id: EntityId,
        /// The kind of interaction applied.
        kind: InteractionKind,
    },
    /// A single trait changed value as part of an accepted interaction.
    ///
    /// Emitted once per trait that actually moved; a trait already at the
    /// cap produces no notification.
    TraitIncreased {
        /// The entity whose trait changed.
        entity_id: EntityId,
        /// Which trait changed.
        trait_kind: TraitKind,
        /// The trait's value after the change.
        new_value: u32,
    },
    /// The full personality record after an accepted interaction.
    PersonalityUpdated {
        /// The entity whose personality was updated.
        entity_id: EntityId,
        /// Owned copy of the record as persisted.
        personality: Personality,
    },
}

impl Notification {
    /// The entity this notification concerns.
    pub const fn entity_id(&self) -> EntityId {
        match self {
            Self::InteractionRegistered { entity_id, .. }
            | Self::TraitIncreased { entity_id, .. }
            | Self::PersonalityUpdated { entity_id, .. } => *entity_id,
        }
    }
}
