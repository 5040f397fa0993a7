use std::{
    error::Error as StdError,
    fmt::{Debug, Display, Formatter},
};

/// All failure kinds a Queue or a Queue Factory can surface.
///
/// Mirrors the shape of `mqs_client::ClientError`: one variant per failure kind instead
/// of a shared base type, since Rust has no need for a marker class to unify them.
#[derive(Debug)]
pub enum MqsError {
    /// `acknowledge` or `reject` was called with an id that is not currently present in
    /// the queue.
    MessageNotFound {
        /// The id which could not be found.
        message_id: String,
    },
    /// A payload could not be converted into the queue's stored representation.
    Serialization {
        /// A human readable description of the failure.
        message: String,
        /// The underlying error which caused serialization to fail, if any.
        cause:   Option<Box<dyn StdError + Send + Sync>>,
    },
    /// A stored value could not be converted back into the payload type.
    Deserialization {
        /// A human readable description of the failure.
        message: String,
        /// A debug rendering of the raw stored value which failed to convert.
        raw:     String,
        /// The underlying error which caused deserialization to fail, if any.
        cause:   Option<Box<dyn StdError + Send + Sync>>,
    },
    /// `create_queue` was called with a name which is already registered.
    QueueAlreadyExists {
        /// The name which was already registered.
        queue_name: String,
    },
    /// `get_queue` or `delete_queue` was called with a name which is not registered.
    QueueDoesNotExist {
        /// The name which was not registered.
        queue_name: String,
    },
}

impl MqsError {
    /// Build a `Serialization` error with no underlying cause.
    #[must_use]
    pub fn serialization(message: impl Into<String>) -> Self {
        MqsError::Serialization {
            message: message.into(),
            cause:   None,
        }
    }

    /// Build a `Serialization` error wrapping an underlying cause.
    pub fn serialization_from(message: impl Into<String>, cause: impl StdError + Send + Sync + 'static) -> Self {
        MqsError::Serialization {
            message: message.into(),
            cause:   Some(Box::new(cause)),
        }
    }

    /// Build a `Deserialization` error with no underlying cause.
    pub fn deserialization(message: impl Into<String>, raw: impl Debug) -> Self {
        MqsError::Deserialization {
            message: message.into(),
            raw:     format!("{:?}", raw),
            cause:   None,
        }
    }

    /// Build a `Deserialization` error wrapping an underlying cause.
    pub fn deserialization_from(
        message: impl Into<String>,
        raw: impl Debug,
        cause: impl StdError + Send + Sync + 'static,
    ) -> Self {
        MqsError::Deserialization {
            message: message.into(),
            raw:     format!("{:?}", raw),
            cause:   Some(Box::new(cause)),
        }
    }
}

impl Display for MqsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            MqsError::MessageNotFound { message_id } => write!(f, "message {} not found", message_id),
            MqsError::Serialization { message, .. } => write!(f, "failed to serialize message: {}", message),
            MqsError::Deserialization { message, .. } => write!(f, "failed to deserialize message: {}", message),
            MqsError::QueueAlreadyExists { queue_name } => write!(f, "queue {} already exists", queue_name),
            MqsError::QueueDoesNotExist { queue_name } => write!(f, "queue {} does not exist", queue_name),
        }
    }
}

impl StdError for MqsError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            MqsError::Serialization { cause, .. } | MqsError::Deserialization { cause, .. } => {
                cause.as_ref().map(|c| c.as_ref() as &(dyn StdError + 'static))
            },
            MqsError::MessageNotFound { .. } | MqsError::QueueAlreadyExists { .. } | MqsError::QueueDoesNotExist { .. } => {
                None
            },
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn display_message_not_found() {
        let err = MqsError::MessageNotFound {
            message_id: "abc".to_string(),
        };
        assert_eq!(format!("{}", err), "message abc not found");
    }

    #[test]
    fn serialization_without_cause_has_no_source() {
        let err = MqsError::serialization("bad payload");
        assert!(err.source().is_none());
        assert_eq!(format!("{}", err), "failed to serialize message: bad payload");
    }

    #[test]
    fn serialization_with_cause_has_source() {
        let cause = std::io::Error::new(std::io::ErrorKind::Other, "disk full");
        let err = MqsError::serialization_from("bad payload", cause);
        assert!(err.source().is_some());
    }

    #[test]
    fn queue_errors_display_name() {
        let err = MqsError::QueueAlreadyExists {
            queue_name: "orders".to_string(),
        };
        assert_eq!(format!("{}", err), "queue orders already exists");

        let err = MqsError::QueueDoesNotExist {
            queue_name: "orders".to_string(),
        };
        assert_eq!(format!("{}", err), "queue orders does not exist");
    }
}
