use std::fmt;

use serde::de::Deserializer;
use serde::ser::Serializer;
use serde::{Deserialize, Serialize};

/// Capacity of every text field except the port.
pub const FIELD_CAPACITY: usize = 40;
/// Capacity of the numeric-text port field.
pub const PORT_CAPACITY: usize = 6;

/// A capacity-bounded text field.
///
/// All ingress goes through [`Field::new`], which strips control characters
/// and truncates at the capacity boundary. Values read back from the
/// configuration file pass through the same path, so a persisted document
/// can never seed downstream code with bytes a portal form could not have
/// produced.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Field<const N: usize>(heapless::String<N>);

impl<const N: usize> Field<N> {
    /// Builds a field from arbitrary input, sanitizing and truncating.
    ///
    /// Truncation happens on character boundaries; a multi-byte character
    /// that would straddle the capacity limit is dropped entirely.
    pub fn new(raw: &str) -> Self {
        let mut buf = heapless::String::new();
        for ch in raw.chars().filter(|c| !c.is_control()) {
            if buf.push(ch).is_err() {
                log::warn!("field value truncated at {} bytes", N);
                break;
            }
        }
        Self(buf)
    }

    pub fn as_str(&self) -> &str {
        self.0.as_str()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<const N: usize> fmt::Display for Field<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl<const N: usize> Serialize for Field<N> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de, const N: usize> Deserialize<'de> for Field<N> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Field::new(&raw))
    }
}

/// The persisted device configuration.
///
/// A record is either absent (never provisioned, or wiped) or complete.
/// Every field is required in the persisted document; a document missing
/// any field fails to parse and the store reports it as absent, so a
/// partially-populated record is never seen downstream.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigRecord {
    pub wifi_hostname: Field<FIELD_CAPACITY>,
    pub ota_password: Field<FIELD_CAPACITY>,
    pub remote_host: Field<FIELD_CAPACITY>,
    pub remote_port: Field<PORT_CAPACITY>,
    pub remote_username: Field<FIELD_CAPACITY>,
    pub remote_password: Field<FIELD_CAPACITY>,
}

impl ConfigRecord {
    /// True if every field is empty, i.e. the all-defaults seed record.
    pub fn is_blank(&self) -> bool {
        self.wifi_hostname.is_empty()
            && self.ota_password.is_empty()
            && self.remote_host.is_empty()
            && self.remote_port.is_empty()
            && self.remote_username.is_empty()
            && self.remote_password.is_empty()
    }
}
