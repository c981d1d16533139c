//! The personality record.
//!
//! A [`Personality`] is the only state the engine owns for an entity. It is
//! created exactly once per entity, mutated only by the interaction
//! processor, and never deleted -- destruction of the owning entity is the
//! external registry's concern.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::enums::TraitKind;

/// The evolving trait vector for one entity.
///
/// Invariants, maintained by the interaction processor:
///
/// - every trait value lies in `[0, trait_cap]` at all times, including
///   immediately after initialization and after every update;
/// - `interaction_count` increases by exactly 1 per accepted interaction
///   and never otherwise;
/// - `last_interaction_at` is the timestamp of the most recently accepted
///   interaction, and `None` before the first one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export, export_to = "bindings/")]
pub struct Personality {
    /// Attachment between the entity and its owner.
    pub bonding_level: u32,
    /// Capacity to read and mirror the owner's mood.
    pub emotional_iq: u32,
    /// Inclination toward games and spontaneous behavior.
    pub playfulness: u32,
    /// Responsiveness to the owner's presence and cues.
    pub attentiveness: u32,
    /// Number of accepted interactions since initialization.
    pub interaction_count: u64,
    /// When this personality was initialized.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recently accepted interaction.
    ///
    /// `None` until the first interaction is accepted, so the cooldown
    /// check always passes for a fresh personality.
    pub last_interaction_at: Option<DateTime<Utc>>,
}

impl Personality {
    /// Create a fresh personality with every trait at `baseline`.
    pub const fn baseline(baseline: u32, created_at: DateTime<Utc>) -> Self {
        Self {
            bonding_level: baseline,
            emotional_iq: baseline,
            playfulness: baseline,
            attentiveness: baseline,
            interaction_count: 0,
            created_at,
            last_interaction_at: None,
        }
    }

    /// Current value of the given trait.
    pub const fn trait_value(&self, kind: TraitKind) -> u32 {
        match kind {
            TraitKind::BondingLevel => self.bonding_level,
            TraitKind::EmotionalIq => self.emotional_iq,
            TraitKind::Playfulness => self.playfulness,
            TraitKind::Attentiveness => self.attentiveness,
        }
    }

    /// Overwrite the given trait with `value`.
    ///
    /// Bounds enforcement is the caller's responsibility; the processor
    /// only writes values it has already clamped.
    pub const fn set_trait(&mut self, kind: TraitKind, value: u32) {
        match kind {
            TraitKind::BondingLevel => self.bonding_level = value,
            TraitKind::EmotionalIq => self.emotional_iq = value,
            TraitKind::Playfulness => self.playfulness = value,
            TraitKind::Attentiveness => self.attentiveness = value,
        }
    }

    /// Whether every trait lies within `[0, cap]`.
    pub const fn within_cap(&self, cap: u32) -> bool {
        self.bonding_level <= cap
            && self.emotional_iq <= cap
            && self.playfulness <= cap
            && self.attentiveness <= cap
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap_or_default()
    }

    #[test]
    fn baseline_sets_all_traits() {
        let p = Personality::baseline(10, now());
        for kind in TraitKind::ALL {
            assert_eq!(p.trait_value(kind), 10);
        }
        assert_eq!(p.interaction_count, 0);
        assert!(p.last_interaction_at.is_none());
        assert_eq!(p.created_at, now());
    }

    #[test]
    fn set_trait_targets_one_field() {
        let mut p = Personality::baseline(10, now());
        p.set_trait(TraitKind::Playfulness, 42);
        assert_eq!(p.playfulness, 42);
        assert_eq!(p.bonding_level, 10);
        assert_eq!(p.emotional_iq, 10);
        assert_eq!(p.attentiveness, 10);
    }

    #[test]
    fn within_cap_checks_every_trait() {
        let mut p = Personality::baseline(10, now());
        assert!(p.within_cap(100));
        assert!(p.within_cap(10));
        p.set_trait(TraitKind::EmotionalIq, 101);
        assert!(!p.within_cap(100));
    }

    #[test]
    fn personality_roundtrip_serde() {
        let mut p = Personality::baseline(10, now());
        p.interaction_count = 3;
        p.last_interaction_at = Some(now());
        let json = serde_json::to_string(&p).ok();
        let restored: Result<Personality, _> =
            serde_json::from_str(json.as_deref().unwrap_or(""));
        assert_eq!(restored.ok(), Some(p));
    }
}
