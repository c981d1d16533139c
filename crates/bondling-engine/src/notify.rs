//! Notification delivery to external observers.
//!
//! The processor publishes [`Notification`]s through the
//! [`NotificationSink`] trait after each accepted interaction. Delivery is
//! at-least-once and fire-and-forget: a sink must not fail, block
//! indefinitely, or call back into the engine (the processor publishes
//! while holding the entity's store entry).

use parking_lot::Mutex;
use tokio::sync::broadcast;
use tracing::info;

use bondling_types::Notification;

/// Receives notifications emitted by the interaction processor.
pub trait NotificationSink: Send + Sync {
    /// Deliver one notification.
    fn publish(&self, notification: &Notification);
}

/// Sink that buffers notifications in memory.
///
/// The test observer: assertions drain the buffer and inspect ordering.
#[derive(Debug, Default)]
pub struct BufferSink {
    buffer: Mutex<Vec<Notification>>,
}

impl BufferSink {
    /// Create an empty buffer sink.
    pub const fn new() -> Self {
        Self {
            buffer: Mutex::new(Vec::new()),
        }
    }

    /// Remove and return everything published so far, in order.
    pub fn drain(&self) -> Vec<Notification> {
        core::mem::take(&mut *self.buffer.lock())
    }

    /// Number of buffered notifications.
    pub fn len(&self) -> usize {
        self.buffer.lock().len()
    }

    /// Whether nothing has been published since the last drain.
    pub fn is_empty(&self) -> bool {
        self.buffer.lock().is_empty()
    }
}

impl NotificationSink for BufferSink {
    fn publish(&self, notification: &Notification) {
        self.buffer.lock().push(notification.clone());
    }
}

/// Sink that logs each notification at `info` with structured fields.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl NotificationSink for TracingSink {
    fn publish(&self, notification: &Notification) {
        match notification {
            Notification::InteractionRegistered { entity_id, kind } => {
                info!(entity_id = %entity_id, kind = ?kind, "interaction registered");
            }
            Notification::TraitIncreased {
                entity_id,
                trait_kind,
                new_value,
            } => {
                info!(
                    entity_id = %entity_id,
                    trait_kind = %trait_kind,
                    new_value,
                    "trait increased"
                );
            }
            Notification::PersonalityUpdated { entity_id, personality } => {
                info!(
                    entity_id = %entity_id,
                    interaction_count = personality.interaction_count,
                    "personality updated"
                );
            }
        }
    }
}

/// Default capacity of the broadcast channel.
///
/// Slow receivers that fall more than this many notifications behind
/// observe a `Lagged` error and skip ahead -- observers are told the
/// stream is at-least-once, not gapless.
const BROADCAST_CAPACITY: usize = 256;

/// Sink that fans notifications out over a bounded broadcast channel.
#[derive(Debug)]
pub struct BroadcastSink {
    tx: broadcast::Sender<Notification>,
}

impl BroadcastSink {
    /// Create a sink with the default channel capacity.
    pub fn new() -> Self {
        Self::with_capacity(BROADCAST_CAPACITY)
    }

    /// Create a sink with an explicit channel capacity (minimum 1).
    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    /// Subscribe to the live notification stream.
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.tx.subscribe()
    }

    /// Number of currently attached receivers.
    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

impl Default for BroadcastSink {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationSink for BroadcastSink {
    fn publish(&self, notification: &Notification) {
        // A send error just means no receiver is attached right now;
        // the stream is fire-and-forget.
        let _ = self.tx.send(notification.clone());
    }
}

#[cfg(test)]
mod tests {
    use bondling_types::{EntityId, InteractionKind};

    use super::*;

    fn sample() -> Notification {
        Notification::InteractionRegistered {
            entity_id: EntityId(7),
            kind: InteractionKind::Gentle,
        }
    }

    #[test]
    fn buffer_sink_preserves_order() {
        let sink = BufferSink::new();
        sink.publish(&sample());
        sink.publish(&Notification::TraitIncreased {
            entity_id: EntityId(7),
            trait_kind: bondling_types::TraitKind::BondingLevel,
            new_value: 11,
        });
        assert_eq!(sink.len(), 2);
        let drained = sink.drain();
        assert_eq!(drained.first(), Some(&sample()));
        assert!(sink.is_empty());
    }

    #[test]
    fn broadcast_sink_delivers_to_subscribers() {
        let sink = BroadcastSink::with_capacity(8);
        let mut rx = sink.subscribe();
        sink.publish(&sample());
        assert_eq!(rx.try_recv().ok(), Some(sample()));
    }

    #[test]
    fn broadcast_sink_without_receivers_is_silent() {
        let sink = BroadcastSink::new();
        assert_eq!(sink.receiver_count(), 0);
        // Must not panic or error.
        sink.publish(&sample());
    }
}
