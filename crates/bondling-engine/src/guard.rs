//! Access and rate guards.
//!
//! The guard pipeline runs two stages, in order, before any mutation:
//!
//! 1. Ownership -- does the entity exist in the registry, and is the
//!    caller its owner?
//! 2. Cooldown -- has the cooldown window elapsed since the last accepted
//!    interaction?
//!
//! Both stages are read-only: they update nothing, so a rejected call
//! leaves no trace. The order is fixed -- ownership before cooldown --
//! so an unauthorized caller never learns rate-limit state.

use chrono::{DateTime, Duration, Utc};

use bondling_types::{EntityId, OwnerId, Personality};

use crate::error::EngineError;
use crate::registry::OwnershipRegistry;

/// Stage 1: ownership check.
///
/// Fails with [`EngineError::NotFound`] if the registry does not know the
/// entity (or reports no owner for it), and [`EngineError::Unauthorized`]
/// if the caller is not the registered owner.
pub fn check_ownership(
    registry: &dyn OwnershipRegistry,
    id: EntityId,
    caller: OwnerId,
) -> Result<(), EngineError> {
    if !registry.exists(id) {
        return Err(EngineError::NotFound { entity_id: id });
    }
    match registry.owner_of(id) {
        // An existing entity without an owner is a registry inconsistency;
        // treat it the same as absence.
        None => Err(EngineError::NotFound { entity_id: id }),
        Some(owner) if owner != caller => Err(EngineError::Unauthorized {
            entity_id: id,
            caller,
        }),
        Some(_) => Ok(()),
    }
}

/// Stage 2: cooldown check.
///
/// Fails with [`EngineError::RateLimited`] carrying `next_valid_at` if
/// less than `window` has elapsed since the last accepted interaction.
/// A personality with no prior interaction always passes.
pub fn check_cooldown(
    personality: &Personality,
    id: EntityId,
    now: DateTime<Utc>,
    window: Duration,
) -> Result<(), EngineError> {
    let Some(last) = personality.last_interaction_at else {
        return Ok(());
    };
    let next_valid_at =
        last.checked_add_signed(window)
            .ok_or_else(|| EngineError::ArithmeticOverflow {
                context: String::from("cooldown deadline overflow"),
            })?;
    if now < next_valid_at {
        return Err(EngineError::RateLimited {
            entity_id: id,
            next_valid_at,
        });
    }
    Ok(())
}
