use serde::{de::DeserializeOwned, Serialize};

use crate::error::MqsError;

/// A pure capability bridging a payload type `T` and the type `S` a Queue actually
/// stores. Implemented as a pair of functions on a small trait rather than something
/// the payload must extend: the serializer is a capability, not inheritance.
pub trait Serializer<T, S>: Send + Sync {
    /// Convert a payload into its stored representation.
    ///
    /// # Errors
    ///
    /// Returns an error if the payload cannot be represented as `S`.
    fn serialize(&self, payload: &T) -> Result<S, MqsError>;

    /// Convert a stored representation back into a payload.
    ///
    /// # Errors
    ///
    /// Returns an error if the stored value cannot be converted back into `T`.
    fn deserialize(&self, stored: &S) -> Result<T, MqsError>;
}

/// A `Serializer` which stores payloads as JSON encoded bytes, built on `serde_json` -
/// the same crate the reference server already uses for every wire payload it sends.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonSerializer;

impl<T: Serialize + DeserializeOwned + Send + Sync> Serializer<T, Vec<u8>> for JsonSerializer {
    fn serialize(&self, payload: &T) -> Result<Vec<u8>, MqsError> {
        serde_json::to_vec(payload).map_err(|e| MqsError::serialization_from("failed to encode payload as json", e))
    }

    fn deserialize(&self, stored: &Vec<u8>) -> Result<T, MqsError> {
        serde_json::from_slice(stored.as_slice())
            .map_err(|e| MqsError::deserialization_from("failed to decode payload from json", stored, e))
    }
}
