//! Configuration snapshot
//!
//! A copy of the attribute store that can be cached in internal flash after
//! registration, so the agent can come back up with the credentials it was
//! issued. Serialized with postcard and guarded by magic, version and CRC.

use serde::{Deserialize, Serialize};

use super::schema::{Attribute, ATTRIBUTE_COUNT};
use super::store::{AttributeStore, Value};

/// Magic number to identify a snapshot ("BCFG")
pub const SNAPSHOT_MAGIC: u32 = 0x4243_4647;

/// Current snapshot format version
pub const SNAPSHOT_VERSION: u8 = 1;

/// Upper bound on the serialized size
pub const MAX_SNAPSHOT_SIZE: usize = 1088;

/// Snapshot errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SnapshotError {
    /// Serialization failed (buffer too small)
    Serialize,
    /// Deserialization failed
    Deserialize,
    /// Invalid magic or version
    InvalidFormat,
    /// CRC check failed
    CrcMismatch,
}

/// Defined attribute values at the time of capture
///
/// Undefined attributes are stored as `None` so defaults still come from the
/// schema of the firmware that restores the snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfigSnapshot {
    /// Magic number for validation
    pub magic: u32,
    /// Data format version
    pub version: u8,
    /// Defined values in schema order
    pub values: [Option<Value>; ATTRIBUTE_COUNT],
    /// CRC32 over magic, version and values
    pub crc: u32,
}

impl ConfigSnapshot {
    /// Capture the defined values of a store
    pub fn capture(store: &AttributeStore) -> Self {
        let mut values: [Option<Value>; ATTRIBUTE_COUNT] = Default::default();
        for (slot_value, (_, _, slot)) in values.iter_mut().zip(store.iter()) {
            *slot_value = slot.value_bytes().and_then(|v| Value::from_slice(v).ok());
        }

        let mut snapshot = Self {
            magic: SNAPSHOT_MAGIC,
            version: SNAPSHOT_VERSION,
            values,
            crc: 0,
        };
        snapshot.update_crc();
        snapshot
    }

    /// Check magic and version
    pub fn is_valid(&self) -> bool {
        self.magic == SNAPSHOT_MAGIC && self.version == SNAPSHOT_VERSION
    }

    /// Rebuild a store from this snapshot
    pub fn restore(&self) -> Result<AttributeStore, SnapshotError> {
        if !self.is_valid() {
            return Err(SnapshotError::InvalidFormat);
        }
        if !self.verify_crc() {
            return Err(SnapshotError::CrcMismatch);
        }

        let mut store = AttributeStore::new();
        for (attr, value) in Attribute::ALL.iter().zip(self.values.iter()) {
            if let Some(value) = value {
                store
                    .define_owned(*attr, value.clone())
                    .map_err(|_| SnapshotError::InvalidFormat)?;
            }
        }
        Ok(store)
    }

    /// Serialize into `buffer`, returning the used part
    pub fn to_bytes<'b>(&self, buffer: &'b mut [u8]) -> Result<&'b mut [u8], SnapshotError> {
        postcard::to_slice(self, buffer).map_err(|_| SnapshotError::Serialize)
    }

    /// Deserialize and validate
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, SnapshotError> {
        let snapshot: Self =
            postcard::from_bytes(bytes).map_err(|_| SnapshotError::Deserialize)?;
        if !snapshot.is_valid() {
            return Err(SnapshotError::InvalidFormat);
        }
        if !snapshot.verify_crc() {
            return Err(SnapshotError::CrcMismatch);
        }
        Ok(snapshot)
    }

    /// Calculate CRC32 over everything except the crc field
    pub fn calculate_crc(&self) -> u32 {
        let mut crc: u32 = 0xFFFFFFFF;

        crc = crc32_update(crc, &self.magic.to_le_bytes());
        crc = crc32_update(crc, &[self.version]);

        for value in &self.values {
            match value {
                Some(bytes) => {
                    crc = crc32_update(crc, &[1, bytes.len() as u8]);
                    crc = crc32_update(crc, bytes);
                }
                None => crc = crc32_update(crc, &[0]),
            }
        }

        !crc
    }

    /// Update the CRC field
    pub fn update_crc(&mut self) {
        self.crc = self.calculate_crc();
    }

    /// Verify the CRC is correct
    pub fn verify_crc(&self) -> bool {
        self.crc == self.calculate_crc()
    }
}

/// CRC32 update (IEEE 802.3 polynomial)
fn crc32_update(crc: u32, data: &[u8]) -> u32 {
    const POLY: u32 = 0xEDB88320;
    let mut crc = crc;

    for &byte in data {
        crc ^= byte as u32;
        for _ in 0..8 {
            if crc & 1 != 0 {
                crc = (crc >> 1) ^ POLY;
            } else {
                crc >>= 1;
            }
        }
    }

    crc
}
