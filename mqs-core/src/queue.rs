use async_trait::async_trait;

use crate::{error::MqsError, message::QueueMessage};

/// The abstract contract every Queue backend must satisfy. Semantics are binding: every
/// implementation is expected to follow the exact rules documented on each method.
///
/// Declared `async` throughout so that a backend which needs to await I/O (a remote
/// queue service, or dead-letter routing into another async `Queue`) can suspend at any
/// operation. The reference in-memory engine completes every operation synchronously
/// except when it awaits a dead-letter queue's own `enqueue`.
#[async_trait]
pub trait Queue<T, S>: Send + Sync {
    /// Enqueue a fully constructed message.
    ///
    /// If retention is configured and the message's `created_at` is already older than
    /// the retention period, this is a silent no-op: no error, no append. Otherwise the
    /// payload is serialized (if a serializer is configured) and appended to the tail.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured serializer fails to convert the payload.
    async fn enqueue(&self, msg: QueueMessage<T>) -> Result<(), MqsError>;

    /// Construct a message from a payload (fresh id, `created_at = now`) and enqueue it.
    /// Equivalent to calling [`Queue::enqueue`] with that constructed message.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured serializer fails to convert the payload.
    async fn enqueue_payload(&self, payload: T) -> Result<(), MqsError>;

    /// Sweep retention and visibility, then return the first visible, non-poisoned
    /// message, making it invisible for this queue's configured visibility timeout.
    ///
    /// Returns `Ok(None)` if no such message exists.
    ///
    /// # Errors
    ///
    /// Returns an error if a stored value fails to deserialize, or if dead-letter
    /// routing of a poisoned message fails.
    async fn dequeue(&self) -> Result<Option<QueueMessage<T>>, MqsError>;

    /// Remove a message by id, terminating its lifecycle successfully.
    ///
    /// # Errors
    ///
    /// Returns [`MqsError::MessageNotFound`] if `id` is not currently present.
    async fn acknowledge(&self, id: &str) -> Result<(), MqsError>;

    /// Remove a message by id. If `requeue` is true the stored record is appended back
    /// to the tail, immediately visible, with its receive count preserved. If false, the
    /// message is dropped entirely.
    ///
    /// # Errors
    ///
    /// Returns [`MqsError::MessageNotFound`] if `id` is not currently present.
    async fn reject(&self, id: &str, requeue: bool) -> Result<QueueMessage<T>, MqsError>;

    /// Stop the background sweep and release resources. Behavior after disposal is
    /// unspecified; callers must not use the Queue again.
    async fn dispose(&self);
}
