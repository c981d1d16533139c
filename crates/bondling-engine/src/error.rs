//! Error types for the Bondling engine.
//!
//! All operations that can fail return typed errors rather than panicking.
//! Every error is caller-visible and terminal for that single interaction
//! attempt -- the engine never retries on its own, and no partial mutation
//! is ever visible after a failed call.

use chrono::{DateTime, Utc};

use bondling_types::{EntityId, InteractionKind, OwnerId};

/// Errors that can occur during engine operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The entity does not exist in the ownership registry, or no
    /// personality exists where one is required.
    #[error("entity not found: {entity_id}")]
    NotFound {
        /// The entity that was looked up.
        entity_id: EntityId,
    },

    /// The caller is not the registered owner of the entity.
    #[error("caller {caller} is not the owner of entity {entity_id}")]
    Unauthorized {
        /// The entity the caller tried to act on.
        entity_id: EntityId,
        /// The rejected caller.
        caller: OwnerId,
    },

    /// The cooldown window has not elapsed since the last accepted
    /// interaction.
    #[error("entity {entity_id} is rate limited until {next_valid_at}")]
    RateLimited {
        /// The entity whose cooldown is still running.
        entity_id: EntityId,
        /// Earliest timestamp at which a retry can succeed.
        next_valid_at: DateTime<Utc>,
    },

    /// The interaction kind has no configured trait-delta mapping.
    #[error("invalid interaction {kind:?}: {reason}")]
    InvalidInteraction {
        /// The rejected kind.
        kind: InteractionKind,
        /// Why the kind was rejected.
        reason: String,
    },

    /// Batch input sequences differ in length.
    ///
    /// Detected before any pair is processed.
    #[error("batch length mismatch: {ids} entity ids vs {kinds} kinds")]
    LengthMismatch {
        /// Number of entity ids supplied.
        ids: usize,
        /// Number of interaction kinds supplied.
        kinds: usize,
    },

    /// A personality already exists for the entity.
    #[error("personality already exists for entity {entity_id}")]
    AlreadyExists {
        /// The entity that was initialized twice.
        entity_id: EntityId,
    },

    /// An arithmetic overflow occurred while updating a counter or
    /// timestamp.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}
