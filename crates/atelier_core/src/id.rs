//! Record identity.
//!
//! Records reach the backend carrying either a server-assigned integer id or
//! a temporary token generated on a device while it was offline. Temporary
//! tokens are strings carrying the [`TEMP_ID_PREFIX`] marker; the sync
//! reconciler replaces them with freshly allocated server ids and reports
//! the mapping back to the device.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;

/// Marker prefix for client-generated temporary ids.
pub const TEMP_ID_PREFIX: &str = "temp_";

/// Identity of a record as submitted by a caller.
///
/// On the wire an assigned id is a JSON integer and a temporary id is a
/// string beginning with [`TEMP_ID_PREFIX`]. Any other string fails
/// deserialization, so prefix sniffing never leaks past this type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum RecordId {
    /// A server-assigned integer id.
    Assigned(i64),
    /// A client-generated temporary token, prefix included.
    Temporary(String),
}

impl RecordId {
    /// Returns true for a temporary token.
    pub fn is_temporary(&self) -> bool {
        matches!(self, RecordId::Temporary(_))
    }

    /// Returns the assigned id, if this is one.
    pub fn as_assigned(&self) -> Option<i64> {
        match self {
            RecordId::Assigned(id) => Some(*id),
            RecordId::Temporary(_) => None,
        }
    }

    /// Returns the temporary token, if this is one.
    pub fn as_temporary(&self) -> Option<&str> {
        match self {
            RecordId::Assigned(_) => None,
            RecordId::Temporary(token) => Some(token),
        }
    }
}

impl fmt::Display for RecordId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordId::Assigned(id) => write!(f, "{id}"),
            RecordId::Temporary(token) => write!(f, "{token}"),
        }
    }
}

impl From<i64> for RecordId {
    fn from(id: i64) -> Self {
        RecordId::Assigned(id)
    }
}

impl Serialize for RecordId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            RecordId::Assigned(id) => serializer.serialize_i64(*id),
            RecordId::Temporary(token) => serializer.serialize_str(token),
        }
    }
}

impl<'de> Deserialize<'de> for RecordId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct RecordIdVisitor;

        impl<'de> Visitor<'de> for RecordIdVisitor {
            type Value = RecordId;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "an integer id or a `{TEMP_ID_PREFIX}`-prefixed string")
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<RecordId, E> {
                Ok(RecordId::Assigned(v))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<RecordId, E> {
                i64::try_from(v)
                    .map(RecordId::Assigned)
                    .map_err(|_| E::custom(format!("id {v} out of range")))
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<RecordId, E> {
                if v.starts_with(TEMP_ID_PREFIX) {
                    Ok(RecordId::Temporary(v.to_string()))
                } else {
                    Err(E::custom(format!(
                        "string id must carry the `{TEMP_ID_PREFIX}` prefix, got `{v}`"
                    )))
                }
            }
        }

        deserializer.deserialize_any(RecordIdVisitor)
    }
}
