use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, Utc};
use std::{
    collections::{HashMap, VecDeque},
    sync::{Arc, Mutex as StdMutex},
    time::Duration,
};
use tokio::{sync::Mutex as AsyncMutex, task::JoinHandle};
use uuid::Uuid;

use crate::{
    config::QueueConfig,
    error::MqsError,
    message::QueueMessage,
    queue::Queue,
    serializer::Serializer,
};

const SWEEP_PERIOD: Duration = Duration::from_secs(1);

struct StoredRecord<S> {
    id:         String,
    payload:    S,
    created_at: DateTime<Utc>,
}

struct QueueState<S> {
    sequence:        VecDeque<StoredRecord<S>>,
    invisible_until: HashMap<String, DateTime<Utc>>,
    receive_count:   HashMap<String, u32>,
}

impl<S> QueueState<S> {
    fn new() -> Self {
        QueueState {
            sequence:        VecDeque::new(),
            invisible_until: HashMap::new(),
            receive_count:   HashMap::new(),
        }
    }
}

struct SharedState<S> {
    config: QueueConfig,
    inner:  AsyncMutex<QueueState<S>>,
}

fn to_chrono(d: Duration) -> ChronoDuration {
    ChronoDuration::from_std(d).unwrap_or_else(|_| ChronoDuration::max_value())
}

/// Sweep retention: drop every record whose age exceeds the configured retention
/// period, clearing its side-table entries. First step of the dequeue algorithm, also
/// run periodically by the background sweep.
fn sweep_retention<S>(state: &mut QueueState<S>, config: &QueueConfig, now: DateTime<Utc>) {
    let Some(retention) = config.message_retention_period else {
        return;
    };
    let retention = to_chrono(retention);
    let expired: Vec<String> = state
        .sequence
        .iter()
        .filter(|r| now.signed_duration_since(r.created_at) > retention)
        .map(|r| r.id.clone())
        .collect();
    if expired.is_empty() {
        return;
    }
    state.sequence.retain(|r| !expired.contains(&r.id));
    for id in &expired {
        state.invisible_until.remove(id);
        state.receive_count.remove(id);
    }
    debug!("retention sweep purged {} expired message(s)", expired.len());
}

/// Restore visibility: drop every `invisible_until` entry whose deadline has passed.
/// Second step of the dequeue algorithm.
fn restore_visibility<S>(state: &mut QueueState<S>, now: DateTime<Utc>) {
    let expired: Vec<String> = state
        .invisible_until
        .iter()
        .filter(|(_, deadline)| **deadline <= now)
        .map(|(id, _)| id.clone())
        .collect();
    for id in expired {
        state.invisible_until.remove(&id);
    }
}

fn spawn_sweep<S: Send + Sync + 'static>(shared: Arc<SharedState<S>>) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(SWEEP_PERIOD).await;
            let now = Utc::now();
            let mut guard = shared.inner.lock().await;
            sweep_retention(&mut guard, &shared.config, now);
            restore_visibility(&mut guard, now);
        }
    })
}

/// A `Serializer` used when no serializer is configured and `T = S`: payloads pass
/// through unchanged. Only implements `Serializer<T, T>`, so it is only constructible
/// when the stored type really is the payload type, enforcing that requirement at
/// compile time rather than at runtime.
struct IdentitySerializer;

impl<T: Clone + Send + Sync> Serializer<T, T> for IdentitySerializer {
    fn serialize(&self, payload: &T) -> Result<T, MqsError> {
        Ok(payload.clone())
    }

    fn deserialize(&self, stored: &T) -> Result<T, MqsError> {
        Ok(stored.clone())
    }
}

/// Options which customize an [`InMemoryQueue`] beyond its configuration and (for
/// non-identity instances) its serializer: a dead-letter queue and a custom id
/// generator.
pub struct InMemoryQueueOptions<T, S = T> {
    /// A non-owning reference to a dead-letter queue poisoned messages are routed to.
    /// Disposing this queue must not dispose the dead-letter queue - it is a relation,
    /// not ownership.
    pub dead_letter_queue: Option<Arc<dyn Queue<T, S> + Send + Sync>>,
    /// A function producing fresh message ids. Defaults to a random UUID v4 in
    /// canonical hyphenated form.
    pub id_generator: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl<T, S> Default for InMemoryQueueOptions<T, S> {
    fn default() -> Self {
        InMemoryQueueOptions {
            dead_letter_queue: None,
            id_generator:      None,
        }
    }
}

/// The reference Queue implementation: an ordered, in-process collection of messages
/// with visibility tracking, receive-count accounting, dead-letter routing, and
/// retention expiry.
pub struct InMemoryQueue<T, S = T> {
    shared:            Arc<SharedState<S>>,
    serializer:        Arc<dyn Serializer<T, S> + Send + Sync>,
    id_generator:      Arc<dyn Fn() -> String + Send + Sync>,
    dead_letter_queue: Option<Arc<dyn Queue<T, S> + Send + Sync>>,
    sweep_handle:      StdMutex<Option<JoinHandle<()>>>,
}

impl<T, S> InMemoryQueue<T, S>
where
    T: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    /// Build a queue with an explicit serializer and no dead-letter queue or custom id
    /// generator.
    #[must_use]
    pub fn with_serializer(config: QueueConfig, serializer: Arc<dyn Serializer<T, S> + Send + Sync>) -> Self {
        Self::with_serializer_and_options(config, serializer, InMemoryQueueOptions::default())
    }

    /// Build a queue with an explicit serializer and options.
    #[must_use]
    pub fn with_serializer_and_options(
        config: QueueConfig,
        serializer: Arc<dyn Serializer<T, S> + Send + Sync>,
        options: InMemoryQueueOptions<T, S>,
    ) -> Self {
        let shared = Arc::new(SharedState {
            config,
            inner: AsyncMutex::new(QueueState::new()),
        });
        let sweep_handle = spawn_sweep(Arc::clone(&shared));
        InMemoryQueue {
            shared,
            serializer,
            id_generator: options
                .id_generator
                .unwrap_or_else(|| Arc::new(|| Uuid::new_v4().to_string())),
            dead_letter_queue: options.dead_letter_queue,
            sweep_handle: StdMutex::new(Some(sweep_handle)),
        }
    }
}

impl<T> InMemoryQueue<T, T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Build a queue with no serializer configured (`T = S`) and no dead-letter queue or
    /// custom id generator.
    #[must_use]
    pub fn new(config: QueueConfig) -> Self {
        Self::with_options(config, InMemoryQueueOptions::default())
    }

    /// Build a queue with no serializer configured (`T = S`) and the given options.
    #[must_use]
    pub fn with_options(config: QueueConfig, options: InMemoryQueueOptions<T, T>) -> Self {
        Self::with_serializer_and_options(config, Arc::new(IdentitySerializer), options)
    }
}

#[async_trait]
impl<T, S> Queue<T, S> for InMemoryQueue<T, S>
where
    T: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    async fn enqueue(&self, msg: QueueMessage<T>) -> Result<(), MqsError> {
        let now = Utc::now();
        if let Some(retention) = self.shared.config.message_retention_period {
            if now.signed_duration_since(msg.created_at) > to_chrono(retention) {
                debug!("enqueue of message {} skipped: already past retention", msg.id);
                return Ok(());
            }
        }

        let stored = self.serializer.serialize(&msg.payload)?;
        let mut guard = self.shared.inner.lock().await;
        guard.sequence.push_back(StoredRecord {
            id: msg.id.clone(),
            payload: stored,
            created_at: msg.created_at,
        });
        guard.receive_count.insert(msg.id.clone(), 0);
        Ok(())
    }

    async fn enqueue_payload(&self, payload: T) -> Result<(), MqsError> {
        let id = (self.id_generator)();
        let now = Utc::now();
        self.enqueue(QueueMessage::new(id, payload, now)).await
    }

    async fn dequeue(&self) -> Result<Option<QueueMessage<T>>, MqsError> {
        let now = Utc::now();
        let mut guard = self.shared.inner.lock().await;
        sweep_retention(&mut guard, &self.shared.config, now);
        restore_visibility(&mut guard, now);

        loop {
            let index = match guard.sequence.iter().position(|r| !guard.invisible_until.contains_key(&r.id)) {
                Some(index) => index,
                None => return Ok(None),
            };
            let id = guard.sequence[index].id.clone();
            let receive_count = {
                let count = guard.receive_count.entry(id.clone()).or_insert(0);
                *count += 1;
                *count
            };

            if receive_count > self.shared.config.max_receive_count {
                let record = guard.sequence.remove(index).expect("index was just located");
                guard.receive_count.remove(&id);
                drop(guard);

                warn!("message {} exceeded max receive count, routing to dead letter queue", id);
                if let Some(dead_letter_queue) = &self.dead_letter_queue {
                    let payload = self.serializer.deserialize(&record.payload)?;
                    let poisoned = QueueMessage::new(record.id.clone(), payload, record.created_at);
                    dead_letter_queue.enqueue(poisoned).await?;
                } else {
                    warn!("message {} dropped: no dead letter queue configured", id);
                }

                guard = self.shared.inner.lock().await;
                continue;
            }

            let invisible_until = now + to_chrono(self.shared.config.visibility_timeout);
            guard.invisible_until.insert(id.clone(), invisible_until);
            let payload = self.serializer.deserialize(&guard.sequence[index].payload)?;
            let created_at = guard.sequence[index].created_at;
            let mut message = QueueMessage::new(id, payload, created_at);
            message.processed_at = Some(now);
            return Ok(Some(message));
        }
    }

    async fn acknowledge(&self, id: &str) -> Result<(), MqsError> {
        let mut guard = self.shared.inner.lock().await;
        let index = guard
            .sequence
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| MqsError::MessageNotFound {
                message_id: id.to_string(),
            })?;
        guard.sequence.remove(index);
        guard.invisible_until.remove(id);
        guard.receive_count.remove(id);
        Ok(())
    }

    async fn reject(&self, id: &str, requeue: bool) -> Result<QueueMessage<T>, MqsError> {
        let mut guard = self.shared.inner.lock().await;
        let index = guard
            .sequence
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| MqsError::MessageNotFound {
                message_id: id.to_string(),
            })?;
        let record = guard.sequence.remove(index).expect("index was just located");
        guard.invisible_until.remove(id);

        let payload = self.serializer.deserialize(&record.payload)?;
        let message = QueueMessage::new(record.id.clone(), payload, record.created_at);

        if requeue {
            // receive_count is intentionally preserved: a message that keeps failing
            // must still eventually poison out.
            guard.sequence.push_back(record);
        } else {
            guard.receive_count.remove(id);
        }

        Ok(message)
    }

    async fn dispose(&self) {
        if let Ok(mut handle) = self.sweep_handle.lock() {
            if let Some(handle) = handle.take() {
                handle.abort();
            }
        }
    }
}
