use std::{collections::HashMap, sync::Arc};

use tokio::sync::RwLock;

use crate::{
    config::QueueConfig,
    error::MqsError,
    memory::{InMemoryQueue, InMemoryQueueOptions},
    queue::Queue,
    serializer::Serializer,
};

/// Options which apply to every queue a [`QueueFactory`] creates: a default serializer
/// and a default id generator.
pub struct QueueFactoryOptions<T, S> {
    /// Serializer handed to every queue created through this factory.
    pub serializer: Arc<dyn Serializer<T, S> + Send + Sync>,
    /// Id generator handed to every queue created through this factory. `None` means
    /// each queue falls back to a random UUID v4.
    pub id_generator: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

/// A named registry of [`InMemoryQueue`] instances, all sharing the same payload and
/// stored types.
///
/// Per-type safety is enforced statically: a `QueueFactory<T, S>` can only ever create
/// or hand out `Queue<T, S>` references, so there is no runtime type tag to check.
pub struct QueueFactory<T, S = T> {
    queues:       RwLock<HashMap<String, Arc<InMemoryQueue<T, S>>>>,
    serializer:   Arc<dyn Serializer<T, S> + Send + Sync>,
    id_generator: Option<Arc<dyn Fn() -> String + Send + Sync>>,
}

impl<T, S> QueueFactory<T, S>
where
    T: Send + Sync + 'static,
    S: Send + Sync + 'static,
{
    /// Build a factory with an explicit default serializer and no default id generator.
    #[must_use]
    pub fn new(serializer: Arc<dyn Serializer<T, S> + Send + Sync>) -> Self {
        Self::with_options(QueueFactoryOptions {
            serializer,
            id_generator: None,
        })
    }

    /// Build a factory with the given options.
    #[must_use]
    pub fn with_options(options: QueueFactoryOptions<T, S>) -> Self {
        QueueFactory {
            queues:       RwLock::new(HashMap::new()),
            serializer:   options.serializer,
            id_generator: options.id_generator,
        }
    }

    /// Register a new, empty queue under `name` with the given configuration and no
    /// dead-letter queue.
    ///
    /// # Errors
    ///
    /// Returns [`MqsError::QueueAlreadyExists`] if `name` is already registered.
    pub async fn create_queue(&self, name: &str, config: QueueConfig) -> Result<Arc<dyn Queue<T, S> + Send + Sync>, MqsError> {
        self.create_queue_with_dead_letter_queue(name, config, None).await
    }

    /// Register a new, empty queue under `name`, routing poisoned messages to
    /// `dead_letter_queue` if given.
    ///
    /// # Errors
    ///
    /// Returns [`MqsError::QueueAlreadyExists`] if `name` is already registered.
    pub async fn create_queue_with_dead_letter_queue(
        &self,
        name: &str,
        config: QueueConfig,
        dead_letter_queue: Option<Arc<dyn Queue<T, S> + Send + Sync>>,
    ) -> Result<Arc<dyn Queue<T, S> + Send + Sync>, MqsError> {
        let mut queues = self.queues.write().await;
        if queues.contains_key(name) {
            return Err(MqsError::QueueAlreadyExists {
                queue_name: name.to_string(),
            });
        }

        let options = InMemoryQueueOptions {
            dead_letter_queue,
            id_generator: self.id_generator.clone(),
        };
        let queue = Arc::new(InMemoryQueue::with_serializer_and_options(
            config,
            Arc::clone(&self.serializer),
            options,
        ));
        queues.insert(name.to_string(), Arc::clone(&queue));
        info!("created queue {}", name);
        Ok(queue)
    }

    /// Look up a previously created queue by name.
    ///
    /// # Errors
    ///
    /// Returns [`MqsError::QueueDoesNotExist`] if `name` is not registered.
    pub async fn get_queue(&self, name: &str) -> Result<Arc<dyn Queue<T, S> + Send + Sync>, MqsError> {
        let queues = self.queues.read().await;
        queues
            .get(name)
            .map(|q| Arc::clone(q) as Arc<dyn Queue<T, S> + Send + Sync>)
            .ok_or_else(|| MqsError::QueueDoesNotExist {
                queue_name: name.to_string(),
            })
    }

    /// Remove a queue from the registry and dispose it.
    ///
    /// # Errors
    ///
    /// Returns [`MqsError::QueueDoesNotExist`] if `name` is not registered.
    pub async fn delete_queue(&self, name: &str) -> Result<(), MqsError> {
        let mut queues = self.queues.write().await;
        let queue = queues.remove(name).ok_or_else(|| MqsError::QueueDoesNotExist {
            queue_name: name.to_string(),
        })?;
        drop(queues);
        queue.dispose().await;
        info!("deleted queue {}", name);
        Ok(())
    }

    /// Dispose every registered queue and clear the registry.
    pub async fn dispose_all(&self) {
        let mut queues = self.queues.write().await;
        for (name, queue) in queues.drain() {
            queue.dispose().await;
            debug!("disposed queue {}", name);
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::serializer::JsonSerializer;

    fn factory() -> QueueFactory<String, Vec<u8>> {
        QueueFactory::new(Arc::new(JsonSerializer))
    }

    #[tokio::test]
    async fn create_then_get_returns_same_queue() {
        let factory = factory();
        factory.create_queue("orders", QueueConfig::default()).await.unwrap();

        let queue = factory.get_queue("orders").await.unwrap();
        queue.enqueue_payload("hello".to_string()).await.unwrap();

        let same = factory.get_queue("orders").await.unwrap();
        let message = same.dequeue().await.unwrap().unwrap();
        assert_eq!(message.payload, "hello");
    }

    #[tokio::test]
    async fn create_queue_twice_errors() {
        let factory = factory();
        factory.create_queue("orders", QueueConfig::default()).await.unwrap();

        let err = factory.create_queue("orders", QueueConfig::default()).await.unwrap_err();
        assert!(matches!(err, MqsError::QueueAlreadyExists { .. }));
    }

    #[tokio::test]
    async fn get_unknown_queue_errors() {
        let factory = factory();
        let err = factory.get_queue("missing").await.unwrap_err();
        assert!(matches!(err, MqsError::QueueDoesNotExist { .. }));
    }

    #[tokio::test]
    async fn delete_queue_removes_it_from_the_registry() {
        let factory = factory();
        factory.create_queue("orders", QueueConfig::default()).await.unwrap();
        factory.delete_queue("orders").await.unwrap();

        let err = factory.get_queue("orders").await.unwrap_err();
        assert!(matches!(err, MqsError::QueueDoesNotExist { .. }));

        let err = factory.delete_queue("orders").await.unwrap_err();
        assert!(matches!(err, MqsError::QueueDoesNotExist { .. }));
    }

    #[tokio::test]
    async fn dispose_all_clears_the_registry() {
        let factory = factory();
        factory.create_queue("a", QueueConfig::default()).await.unwrap();
        factory.create_queue("b", QueueConfig::default()).await.unwrap();

        factory.dispose_all().await;

        assert!(matches!(factory.get_queue("a").await.unwrap_err(), MqsError::QueueDoesNotExist { .. }));
        assert!(matches!(factory.get_queue("b").await.unwrap_err(), MqsError::QueueDoesNotExist { .. }));
    }
}
