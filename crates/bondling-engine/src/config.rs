//! Engine configuration and the interaction-kind delta table.
//!
//! The canonical configuration lives in a `bondling.yaml` file supplied by
//! the embedding deployment. This module defines the strongly-typed
//! [`EngineConfig`] that mirrors the YAML structure, a loader that reads
//! and validates the file, and defaults matching the documented behavior:
//! one-hour cooldown, trait cap 100, baseline 10.
//!
//! The delta table is data, not code: adding a new interaction kind (or
//! giving the reserved `LongPress` a meaning) is a configuration change
//! that never touches the processor's control flow.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::Duration;
use serde::Deserialize;

use bondling_types::{InteractionKind, TraitKind};

/// Errors that can occur when loading configuration.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Failed to read the configuration file from disk.
    #[error("failed to read config file: {source}")]
    Io {
        /// The underlying I/O error.
        #[from]
        source: std::io::Error,
    },

    /// Failed to parse YAML content.
    #[error("failed to parse config YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// The parsed configuration violates an engine invariant.
    #[error("invalid config: {reason}")]
    Invalid {
        /// Description of the violated invariant.
        reason: String,
    },
}

impl From<serde_yml::Error> for ConfigError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

/// When a personality record is created for an entity.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum CreationPolicy {
    /// Create the personality lazily inside `interact`, gated on the
    /// ownership registry confirming the entity exists.
    #[default]
    OnFirstInteraction,
    /// Require an explicit `initialize` call; `interact` on an absent
    /// personality fails with `NotFound`.
    ExplicitOnly,
}

/// Failure semantics for batch interactions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum BatchAtomicity {
    /// Each pair is an independent transaction: a failure on one pair
    /// never rolls back earlier successes in the same batch.
    #[default]
    PerItem,
    /// Validate every pair up front and apply only if all pass; any
    /// validation failure rejects the whole batch with no mutation.
    AllOrNothing,
}

/// Tunable parameters for the personality engine.
///
/// All fields fall back to their defaults when absent from the YAML file,
/// so a deployment only specifies what it overrides.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Minimum spacing between accepted interactions per entity, in
    /// seconds (default: 3600).
    pub cooldown_secs: u64,

    /// Saturation ceiling for all trait values (default: 100).
    pub trait_cap: u32,

    /// Initial value for every trait at personality creation
    /// (default: 10).
    pub baseline_trait: u32,

    /// When personality records are created (default: on first
    /// interaction).
    pub creation: CreationPolicy,

    /// Failure semantics for batch interactions (default: per item).
    pub batch_atomicity: BatchAtomicity,

    /// The interaction-kind table: which trait deltas each kind applies.
    ///
    /// Kinds absent from this table (or mapped to an empty set) are
    /// rejected as invalid. Defaults: `Gentle` raises bonding level and
    /// emotional IQ by 1; `Playful` raises playfulness and attentiveness
    /// by 1; `LongPress` is reserved and unmapped.
    pub deltas: BTreeMap<InteractionKind, BTreeMap<TraitKind, u32>>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cooldown_secs: 3600,
            trait_cap: 100,
            baseline_trait: 10,
            creation: CreationPolicy::default(),
            batch_atomicity: BatchAtomicity::default(),
            deltas: default_deltas(),
        }
    }
}

/// The baseline interaction-kind table.
fn default_deltas() -> BTreeMap<InteractionKind, BTreeMap<TraitKind, u32>> {
    BTreeMap::from([
        (
            InteractionKind::Gentle,
            BTreeMap::from([(TraitKind::BondingLevel, 1), (TraitKind::EmotionalIq, 1)]),
        ),
        (
            InteractionKind::Playful,
            BTreeMap::from([(TraitKind::Playfulness, 1), (TraitKind::Attentiveness, 1)]),
        ),
    ])
}

impl EngineConfig {
    /// Load and validate configuration from a YAML file.
    pub fn from_yaml_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&contents)
    }

    /// Parse and validate configuration from a YAML string.
    pub fn from_yaml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Check the configuration invariants.
    ///
    /// The baseline must not exceed the cap (a fresh personality must
    /// already satisfy the bound invariant), and every configured kind
    /// must map to a non-empty delta set (an empty mapping would make the
    /// kind silently ignored rather than rejected).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.baseline_trait > self.trait_cap {
            return Err(ConfigError::Invalid {
                reason: format!(
                    "baseline_trait {} exceeds trait_cap {}",
                    self.baseline_trait, self.trait_cap
                ),
            });
        }
        for (kind, deltas) in &self.deltas {
            if deltas.is_empty() {
                return Err(ConfigError::Invalid {
                    reason: format!("interaction kind {kind:?} maps to an empty delta set"),
                });
            }
        }
        Ok(())
    }

    /// The cooldown window as a [`Duration`].
    pub fn cooldown_window(&self) -> Duration {
        i64::try_from(self.cooldown_secs)
            .map(Duration::seconds)
            .unwrap_or(Duration::MAX)
    }

    /// The delta set configured for `kind`, if any.
    pub fn deltas_for(&self, kind: InteractionKind) -> Option<&BTreeMap<TraitKind, u32>> {
        self.deltas.get(&kind)
    }
}
