#![warn(
    missing_docs,
    rust_2018_idioms,
    future_incompatible,
    trivial_numeric_casts,
    unsafe_code,
    unused,
    unused_qualifications,
    variant_size_differences
)]
#![cfg_attr(test, deny(warnings))]

//! An embeddable, backend-agnostic message queue engine.
//!
//! The central abstraction is the [`Queue`] trait: `enqueue`, `enqueue_payload`,
//! `dequeue`, `acknowledge`, `reject`, and `dispose`. This crate ships one
//! implementation, [`InMemoryQueue`], with visibility timeouts, receive-count
//! accounting, dead-letter routing and retention, plus a [`QueueFactory`] for managing
//! a set of named queues sharing the same payload and stored types.
//!
//! ```
//! use mqs_core::{InMemoryQueue, Queue, QueueConfig};
//!
//! # async fn example() -> Result<(), mqs_core::MqsError> {
//! let queue: InMemoryQueue<String> = InMemoryQueue::new(QueueConfig::default());
//! queue.enqueue_payload("hello".to_string()).await?;
//!
//! let message = queue.dequeue().await?.expect("message was just enqueued");
//! queue.acknowledge(&message.id).await?;
//! # Ok(())
//! # }
//! ```

#[macro_use]
extern crate log;

mod config;
mod error;
mod factory;
mod memory;
mod message;
mod queue;
mod serializer;

pub use config::QueueConfig;
pub use error::MqsError;
pub use factory::{QueueFactory, QueueFactoryOptions};
pub use memory::{InMemoryQueue, InMemoryQueueOptions};
pub use message::QueueMessage;
pub use queue::Queue;
pub use serializer::{JsonSerializer, Serializer};
