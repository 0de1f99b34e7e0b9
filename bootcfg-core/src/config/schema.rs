//! Attribute schema
//!
//! The fixed, build-time list of attribute names recognized in CONFIG.TXT.
//! Order matters: an attribute's position in [`SCHEMA`] is the index of its
//! slot in the [`AttributeStore`](super::store::AttributeStore).

/// Number of attributes in the schema
pub const ATTRIBUTE_COUNT: usize = 16;

/// Default broker host
pub const DEFAULT_BROKER_NAME: &str = "mqtt.cumulocity.com";

/// Default broker port (TLS)
pub const DEFAULT_BROKER_PORT: &str = "8883";

/// Default measurement stream rate in milliseconds
pub const DEFAULT_STREAM_RATE: &str = "5000";

/// Default SNTP server
pub const DEFAULT_SNTP_NAME: &str = "0.de.pool.ntp.org";

/// Default SNTP port
pub const DEFAULT_SNTP_PORT: &str = "123";

/// Default MQTT user. A device still carrying this value has not been
/// registered yet.
pub const DEFAULT_MQTT_USER: &str = "";

const TRUE: &str = "TRUE";
const FALSE: &str = "FALSE";

/// One recognized attribute
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct SchemaEntry {
    /// Attribute name as written in the file (case-sensitive)
    pub name: &'static str,
    /// Value used when the file does not define the attribute
    pub default_value: &'static str,
    /// Deprecated attributes are still parsed but flagged in listings
    pub deprecated: bool,
}

impl SchemaEntry {
    const fn new(name: &'static str, default_value: &'static str) -> Self {
        Self {
            name,
            default_value,
            deprecated: false,
        }
    }
}

/// The attribute schema, indexed by [`Attribute`]
pub static SCHEMA: [SchemaEntry; ATTRIBUTE_COUNT] = [
    SchemaEntry::new("WIFISSID", ""),
    SchemaEntry::new("WIFIPASSWORD", ""),
    SchemaEntry::new("MQTTBROKERNAME", DEFAULT_BROKER_NAME),
    SchemaEntry::new("MQTTBROKERPORT", DEFAULT_BROKER_PORT),
    SchemaEntry::new("MQTTSECURE", TRUE),
    SchemaEntry::new("MQTTUSER", DEFAULT_MQTT_USER),
    SchemaEntry::new("MQTTPASSWORD", ""),
    SchemaEntry::new("MQTTANONYMOUS", FALSE),
    SchemaEntry::new("STREAMRATE", DEFAULT_STREAM_RATE),
    SchemaEntry::new("ACCELENABLED", TRUE),
    SchemaEntry::new("GYROENABLED", TRUE),
    SchemaEntry::new("MAGENABLED", TRUE),
    SchemaEntry::new("ENVENABLED", TRUE),
    SchemaEntry::new("LIGHTENABLED", TRUE),
    SchemaEntry::new("SNTPNAME", DEFAULT_SNTP_NAME),
    SchemaEntry::new("SNTPPORT", DEFAULT_SNTP_PORT),
];

/// Attribute identifiers, in schema order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum Attribute {
    WifiSsid = 0,
    WifiPassword = 1,
    BrokerName = 2,
    BrokerPort = 3,
    Secure = 4,
    MqttUser = 5,
    MqttPassword = 6,
    Anonymous = 7,
    StreamRate = 8,
    AccelEnabled = 9,
    GyroEnabled = 10,
    MagEnabled = 11,
    EnvEnabled = 12,
    LightEnabled = 13,
    SntpName = 14,
    SntpPort = 15,
}

impl Attribute {
    /// Every attribute, in schema order
    pub const ALL: [Attribute; ATTRIBUTE_COUNT] = [
        Attribute::WifiSsid,
        Attribute::WifiPassword,
        Attribute::BrokerName,
        Attribute::BrokerPort,
        Attribute::Secure,
        Attribute::MqttUser,
        Attribute::MqttPassword,
        Attribute::Anonymous,
        Attribute::StreamRate,
        Attribute::AccelEnabled,
        Attribute::GyroEnabled,
        Attribute::MagEnabled,
        Attribute::EnvEnabled,
        Attribute::LightEnabled,
        Attribute::SntpName,
        Attribute::SntpPort,
    ];

    /// Slot index of this attribute
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Schema entry for this attribute
    pub fn entry(self) -> &'static SchemaEntry {
        &SCHEMA[self.index()]
    }

    /// Name as written in the configuration file
    pub fn name(self) -> &'static str {
        self.entry().name
    }

    /// Compiled default value
    pub fn default_value(self) -> &'static str {
        self.entry().default_value
    }

    /// Look up an attribute by slot index
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// Look up an attribute by its exact (case-sensitive) name
    ///
    /// A plain ordered scan; the schema is small.
    pub fn from_name(name: &[u8]) -> Option<Self> {
        Self::ALL
            .iter()
            .copied()
            .find(|attr| attr.name().as_bytes() == name)
    }
}
