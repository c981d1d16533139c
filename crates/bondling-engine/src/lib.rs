//! The Bondling personality evolution engine.
//!
//! Owns each entity's trait vector, validates and applies
//! owner-authorized interactions against it, enforces the numeric and
//! temporal invariants (bounded traits, per-entity cooldown), and emits a
//! deterministic stream of state-transition notifications.
//!
//! Identity and possession facts live outside the engine: it consumes an
//! ownership check through [`OwnershipRegistry`] and never writes
//! identity data. Everything else -- the store, the guards, the
//! processor -- lives here.
//!
//! # Modules
//!
//! - [`config`] -- Tunables and the interaction-kind delta table
//!   ([`EngineConfig`])
//! - [`error`] -- Error taxonomy for all engine operations
//!   ([`EngineError`])
//! - [`guard`] -- Ordered, read-only ownership and cooldown checks
//! - [`notify`] -- Notification delivery ([`NotificationSink`] and sinks)
//! - [`processor`] -- The interaction pipeline ([`Engine`])
//! - [`registry`] -- The ownership-registry seam ([`OwnershipRegistry`])
//! - [`store`] -- Per-entity personality records ([`TraitStore`])

pub mod config;
pub mod error;
pub mod guard;
pub mod notify;
pub mod processor;
pub mod registry;
pub mod store;

// Re-export the public surface at crate root for convenience.
pub use config::{BatchAtomicity, ConfigError, CreationPolicy, EngineConfig};
pub use error::EngineError;
pub use notify::{BroadcastSink, BufferSink, NotificationSink, TracingSink};
pub use processor::{BatchOutcome, Engine, InteractionReceipt};
pub use registry::{OwnershipRegistry, StaticRegistry};
pub use store::TraitStore;
