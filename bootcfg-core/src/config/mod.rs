//! Configuration schema, storage and typed access
//!
//! The schema is fixed at build time. Parsed values live in an
//! [`AttributeStore`]; [`Config`] reads them back as typed values with
//! default fallback.

pub mod facade;
pub mod schema;
pub mod snapshot;
pub mod store;

pub use facade::{parse_flag, parse_int, Config};
pub use schema::{Attribute, SchemaEntry, ATTRIBUTE_COUNT, SCHEMA};
pub use snapshot::{ConfigSnapshot, SnapshotError, MAX_SNAPSHOT_SIZE};
pub use store::{AttributeStore, Slot, StoreError, Value, MAX_VALUE_LEN};
