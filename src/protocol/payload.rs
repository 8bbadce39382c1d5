// ABOUTME: FromPayload constructor for decoded JSON objects
// ABOUTME: Blanket implementation over every deserializable type

use crate::error::Error;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// Build a typed value from an already-decoded JSON object.
pub trait FromPayload: Sized {
    /// Decode `payload` into `Self`, failing with [`Error::Protocol`] on a shape mismatch.
    fn from_payload(payload: &Value) -> Result<Self, Error>;
}

impl<T: DeserializeOwned> FromPayload for T {
    fn from_payload(payload: &Value) -> Result<Self, Error> {
        T::deserialize(payload).map_err(|e| Error::Protocol(e.to_string()))
    }
}
