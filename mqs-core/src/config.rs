use std::time::Duration;

/// Per-queue policy: how many times a message may be received before it is poisoned,
/// how long a received message stays invisible, and how long a message may live before
/// it is silently purged.
#[derive(Debug, Clone, Copy)]
pub struct QueueConfig {
    /// Threshold beyond which a message is considered poisoned. A message whose receive
    /// count strictly exceeds this value is routed to the dead-letter queue (or dropped).
    pub max_receive_count: u32,
    /// How long a dequeued message remains invisible to subsequent `dequeue` calls.
    pub visibility_timeout: Duration,
    /// Maximum age from `created_at` after which a message is silently purged. `None`
    /// means messages are kept indefinitely.
    pub message_retention_period: Option<Duration>,
}

impl QueueConfig {
    /// The default preset: 3 receives, 30 second visibility timeout, no retention.
    ///
    /// ```
    /// use mqs_core::QueueConfig;
    /// use std::time::Duration;
    ///
    /// let config = QueueConfig::default();
    /// assert_eq!(config.max_receive_count, 3);
    /// assert_eq!(config.visibility_timeout, Duration::from_secs(30));
    /// assert_eq!(config.message_retention_period, None);
    /// ```
    #[must_use]
    pub const fn default() -> Self {
        QueueConfig {
            max_receive_count:         3,
            visibility_timeout:        Duration::from_secs(30),
            message_retention_period: None,
        }
    }

    /// A preset tuned for high-throughput queues: 5 receives, 2 minute visibility
    /// timeout, no retention.
    #[must_use]
    pub const fn high_throughput() -> Self {
        QueueConfig {
            max_receive_count:        5,
            visibility_timeout:       Duration::from_secs(120),
            message_retention_period: None,
        }
    }

    /// A preset tuned for tests: 2 receives, 100ms visibility timeout, 5 minute
    /// retention.
    #[must_use]
    pub const fn testing() -> Self {
        QueueConfig {
            max_receive_count:        2,
            visibility_timeout:       Duration::from_millis(100),
            message_retention_period: Some(Duration::from_secs(5 * 60)),
        }
    }
}

impl Default for QueueConfig {
    fn default() -> Self {
        Self::default()
    }
}
