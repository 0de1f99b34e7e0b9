//! Boot mode selection
//!
//! A device starts unregistered: CONFIG.TXT carries network and broker
//! settings but no MQTT credentials. Registration appends `MQTTUSER` and
//! `MQTTPASSWORD` to the file, and the next boot runs in operation mode.

use crate::config::{Attribute, AttributeStore};

/// Lifecycle phase selected from the parsed configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BootMode {
    /// No credentials yet; connect to the bootstrap broker and wait for them
    Registration,
    /// Credentials present; connect and stream measurements
    Operation,
}

/// Pick the boot mode: registration while the MQTT user still resolves to
/// its compiled default
pub fn boot_mode(store: &AttributeStore) -> BootMode {
    let user = store.resolve_bytes(Attribute::MqttUser);
    if user == Attribute::MqttUser.default_value().as_bytes() {
        BootMode::Registration
    } else {
        BootMode::Operation
    }
}
