use serde::Serialize;
use serde_json::Value as JsonValue;

use vault_events::{Event, EventBus, EventEnvelope};

/// Publish events that are already committed.
///
/// `last_sequence` is the aggregate version after the final event was applied.
/// Failures are logged and dropped: the state change has happened regardless.
pub(crate) fn publish_committed<B, E>(bus: &B, aggregate_type: &str, last_sequence: u64, events: &[E])
where
    B: EventBus<EventEnvelope<JsonValue>>,
    E: Event + Serialize,
{
    let first = (last_sequence + 1).saturating_sub(events.len() as u64);

    for (offset, event) in events.iter().enumerate() {
        let envelope = match EventEnvelope::from_typed(aggregate_type, first + offset as u64, event) {
            Ok(envelope) => envelope,
            Err(err) => {
                tracing::warn!(event_type = event.event_type(), error = %err, "failed to encode committed event");
                continue;
            }
        };

        if let Err(err) = bus.publish(envelope) {
            tracing::warn!(event_type = event.event_type(), error = ?err, "event publication failed after commit");
        }
    }
}
