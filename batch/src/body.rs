//! Serde representation of message bodies as text.
//!
//! Bytes that are not valid UTF-8 are replaced with U+FFFD when serialized.

use serde::{Deserialize, Deserializer, Serializer};

pub fn serialize<S, T>(body: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
    T: AsRef<[u8]>,
{
    serializer.serialize_str(&String::from_utf8_lossy(body.as_ref()))
}

pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    String::deserialize(deserializer).map(String::into_bytes)
}
