//! Closed enumerations for the Bondling personality engine.
//!
//! Interaction kinds and trait names are closed sets so dispatch is
//! exhaustiveness-checked by the compiler instead of compared as strings.
//! Which trait deltas an interaction kind produces is *not* encoded here --
//! that mapping is a configuration table in `bondling-engine`, so new kinds
//! extend the table rather than the processor's control flow.

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A named category of owner action applied to an entity.
///
/// Every kind maps to a set of trait deltas via the engine's configuration
/// table. A kind with no configured mapping is rejected, not silently
/// ignored.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum InteractionKind {
    /// A calm, affectionate interaction. Default mapping raises bonding
    /// level and emotional IQ.
    Gentle,
    /// An energetic, game-like interaction. Default mapping raises
    /// playfulness and attentiveness.
    Playful,
    /// A sustained press gesture. Reserved: carries no default mapping and
    /// is rejected until a deployment configures one.
    LongPress,
}

/// One bounded numeric attribute of a [`Personality`].
///
/// [`Personality`]: crate::structs::Personality
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS,
)]
#[ts(export, export_to = "bindings/")]
pub enum TraitKind {
    /// Attachment between the entity and its owner. Non-decreasing under
    /// the default interaction set.
    BondingLevel,
    /// Capacity to read and mirror the owner's mood.
    EmotionalIq,
    /// Inclination toward games and spontaneous behavior.
    Playfulness,
    /// Responsiveness to the owner's presence and cues.
    Attentiveness,
}

impl TraitKind {
    /// All traits, in the canonical order used for notification emission.
    pub const ALL: [Self; 4] = [
        Self::BondingLevel,
        Self::EmotionalIq,
        Self::Playfulness,
        Self::Attentiveness,
    ];

    /// Stable snake_case name, used in logs and external records.
    pub const fn name(self) -> &'static str {
        match self {
            Self::BondingLevel => "bonding_level",
            Self::EmotionalIq => "emotional_iq",
            Self::Playfulness => "playfulness",
            Self::Attentiveness => "attentiveness",
        }
    }
}

impl core::fmt::Display for TraitKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.name())
    }
}
