//! Attribute store
//!
//! One slot per schema entry, holding the raw bytes read from the file and
//! whether the file defined it at all. The store is an ordinary value owned
//! by whoever drives the parse; nothing here is global.
//!
//! Values are kept as bytes: an SSID or password may be in any encoding.
//! The `&str` views stop at the first byte that is not valid UTF-8.

use heapless::Vec;

use super::schema::{Attribute, SchemaEntry, ATTRIBUTE_COUNT};
use crate::parser::MAX_TOKEN_LEN;

/// Maximum stored value length. Matches the token bound so any value the
/// tokenizer produces fits.
pub const MAX_VALUE_LEN: usize = MAX_TOKEN_LEN;

/// Raw attribute value
pub type Value = Vec<u8, MAX_VALUE_LEN>;

/// Errors from direct store updates
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StoreError {
    /// The attribute already holds a value from this parse
    AlreadyDefined(Attribute),
    /// Value exceeds [`MAX_VALUE_LEN`]
    ValueTooLong(Attribute),
}

/// Run-time storage for one attribute
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Slot {
    value: Value,
    defined: bool,
}

impl Slot {
    /// Whether the configuration file set this attribute
    pub fn is_defined(&self) -> bool {
        self.defined
    }

    /// The raw value, only if defined
    pub fn value_bytes(&self) -> Option<&[u8]> {
        if self.defined {
            Some(self.value.as_slice())
        } else {
            None
        }
    }

    /// The value as text, only if defined
    pub fn value(&self) -> Option<&str> {
        self.value_bytes().map(utf8_prefix)
    }

    fn clear(&mut self) {
        self.value.clear();
        self.defined = false;
    }

    fn set(&mut self, value: Value) {
        self.value = value;
        self.defined = true;
    }
}

/// Table of attribute slots, indexed in schema order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeStore {
    slots: [Slot; ATTRIBUTE_COUNT],
}

impl AttributeStore {
    /// Create a store with every slot undefined
    pub fn new() -> Self {
        Self::default()
    }

    /// Clear every slot back to undefined
    ///
    /// Call before each parse; a store that already holds a parse result
    /// reports every re-assignment as a duplicate.
    pub fn reset(&mut self) {
        for slot in &mut self.slots {
            slot.clear();
        }
    }

    /// Slot for an attribute
    pub fn slot(&self, attr: Attribute) -> &Slot {
        &self.slots[attr.index()]
    }

    /// Whether the file defined this attribute
    pub fn is_defined(&self, attr: Attribute) -> bool {
        self.slot(attr).is_defined()
    }

    /// Resolve an attribute to its defined value or its schema default
    pub fn resolve_bytes(&self, attr: Attribute) -> &[u8] {
        match self.slot(attr).value_bytes() {
            Some(value) => value,
            None => attr.default_value().as_bytes(),
        }
    }

    /// [`resolve_bytes`](Self::resolve_bytes) as text, cut at the first
    /// byte that is not valid UTF-8
    pub fn resolve(&self, attr: Attribute) -> &str {
        utf8_prefix(self.resolve_bytes(attr))
    }

    /// Set an attribute that has not been defined yet
    ///
    /// Each attribute may be defined once per parse.
    pub fn define(&mut self, attr: Attribute, value: impl AsRef<[u8]>) -> Result<(), StoreError> {
        let value = bounded(attr, value.as_ref())?;
        self.define_owned(attr, value)
    }

    /// [`define`](Self::define) for a value already known to fit; the
    /// parser's write path
    pub(crate) fn define_owned(&mut self, attr: Attribute, value: Value) -> Result<(), StoreError> {
        let slot = &mut self.slots[attr.index()];
        if slot.defined {
            return Err(StoreError::AlreadyDefined(attr));
        }
        slot.set(value);
        Ok(())
    }

    /// Overwrite an attribute regardless of its current state
    ///
    /// Used after registration to install credentials received from the
    /// broker without re-reading the file.
    pub fn assign(&mut self, attr: Attribute, value: impl AsRef<[u8]>) -> Result<(), StoreError> {
        let value = bounded(attr, value.as_ref())?;
        self.slots[attr.index()].set(value);
        Ok(())
    }

    /// Number of attributes defined by the file
    pub fn defined_count(&self) -> usize {
        self.slots.iter().filter(|s| s.defined).count()
    }

    /// Iterate over every attribute with its schema entry and slot
    pub fn iter(&self) -> impl Iterator<Item = (Attribute, &'static SchemaEntry, &Slot)> {
        Attribute::ALL
            .iter()
            .zip(self.slots.iter())
            .map(|(attr, slot)| (*attr, attr.entry(), slot))
    }
}

fn bounded(attr: Attribute, value: &[u8]) -> Result<Value, StoreError> {
    Vec::from_slice(value).map_err(|_| StoreError::ValueTooLong(attr))
}

/// Longest prefix of `bytes` that is valid UTF-8
pub(crate) fn utf8_prefix(bytes: &[u8]) -> &str {
    match core::str::from_utf8(bytes) {
        Ok(text) => text,
        Err(e) => core::str::from_utf8(&bytes[..e.valid_up_to()]).unwrap_or_default(),
    }
}
