use chrono::{DateTime, Utc};
use std::hash::{Hash, Hasher};

/// An envelope around a user payload of type `T`.
///
/// Equality and hashing are defined over exactly `(id, payload, created_at)`, per the
/// data model: `processed_at` and `acknowledged_at` only ever appear on values returned
/// to callers and must never influence equality.
#[derive(Debug, Clone)]
pub struct QueueMessage<T> {
    /// Globally unique id within the queue's lifetime.
    pub id: String,
    /// The user's payload.
    pub payload: T,
    /// Wall-clock time this message was constructed. Used for retention.
    pub created_at: DateTime<Utc>,
    /// Time of the most recent dequeue. Only set on the copy returned to consumers, never
    /// on the stored record.
    pub processed_at: Option<DateTime<Utc>>,
    /// Time of successful acknowledge. Only present on values returned to external
    /// observers; never part of any stored invariant.
    pub acknowledged_at: Option<DateTime<Utc>>,
}

impl<T> QueueMessage<T> {
    /// Construct a fresh message with a given id, payload and creation time. `processed_at`
    /// and `acknowledged_at` start out unset, as they are.
    #[must_use]
    pub fn new(id: String, payload: T, created_at: DateTime<Utc>) -> Self {
        QueueMessage {
            id,
            payload,
            created_at,
            processed_at: None,
            acknowledged_at: None,
        }
    }
}

impl<T: PartialEq> PartialEq for QueueMessage<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id && self.payload == other.payload && self.created_at == other.created_at
    }
}

impl<T: Eq> Eq for QueueMessage<T> {}

impl<T: Hash> Hash for QueueMessage<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
        self.payload.hash(state);
        self.created_at.hash(state);
    }
}
