//! Typed configuration accessors
//!
//! Every getter resolves its attribute through the store (defined value or
//! schema default) and converts the text. Conversions are deliberately
//! permissive: a bad integer reads as zero and only `TRUE` or `1` are true.
//!
//! Text getters stop at the first byte that is not valid UTF-8. The WLAN
//! credentials have `_bytes` variants since an SSID is arbitrary octets.

use super::schema::Attribute;
use super::store::AttributeStore;

/// Read-only typed view over an [`AttributeStore`]
#[derive(Debug, Clone, Copy)]
pub struct Config<'a> {
    store: &'a AttributeStore,
}

impl<'a> Config<'a> {
    pub fn new(store: &'a AttributeStore) -> Self {
        Self { store }
    }

    /// Resolved raw value of any attribute
    pub fn bytes(&self, attr: Attribute) -> &'a [u8] {
        self.store.resolve_bytes(attr)
    }

    /// Resolved text of any attribute
    pub fn text(&self, attr: Attribute) -> &'a str {
        self.store.resolve(attr)
    }

    /// Resolved value of any attribute read as an integer
    pub fn int(&self, attr: Attribute) -> i32 {
        parse_int(self.text(attr))
    }

    /// Resolved value of any attribute read as a flag
    pub fn flag(&self, attr: Attribute) -> bool {
        parse_flag(self.text(attr))
    }

    pub fn wlan_ssid(&self) -> &'a str {
        self.text(Attribute::WifiSsid)
    }

    pub fn wlan_password(&self) -> &'a str {
        self.text(Attribute::WifiPassword)
    }

    pub fn wlan_ssid_bytes(&self) -> &'a [u8] {
        self.bytes(Attribute::WifiSsid)
    }

    pub fn wlan_password_bytes(&self) -> &'a [u8] {
        self.bytes(Attribute::WifiPassword)
    }

    pub fn broker_name(&self) -> &'a str {
        self.text(Attribute::BrokerName)
    }

    pub fn broker_port(&self) -> i32 {
        self.int(Attribute::BrokerPort)
    }

    /// TLS to the broker
    pub fn is_secure(&self) -> bool {
        self.flag(Attribute::Secure)
    }

    /// Connect without credentials (non-Cumulocity brokers only)
    pub fn is_anonymous(&self) -> bool {
        self.flag(Attribute::Anonymous)
    }

    pub fn mqtt_user(&self) -> &'a str {
        self.text(Attribute::MqttUser)
    }

    pub fn mqtt_password(&self) -> &'a str {
        self.text(Attribute::MqttPassword)
    }

    /// Measurement publish interval in milliseconds
    pub fn stream_rate(&self) -> i32 {
        self.int(Attribute::StreamRate)
    }

    pub fn accel_enabled(&self) -> bool {
        self.flag(Attribute::AccelEnabled)
    }

    pub fn gyro_enabled(&self) -> bool {
        self.flag(Attribute::GyroEnabled)
    }

    pub fn mag_enabled(&self) -> bool {
        self.flag(Attribute::MagEnabled)
    }

    pub fn env_enabled(&self) -> bool {
        self.flag(Attribute::EnvEnabled)
    }

    pub fn light_enabled(&self) -> bool {
        self.flag(Attribute::LightEnabled)
    }

    pub fn sntp_name(&self) -> &'a str {
        self.text(Attribute::SntpName)
    }

    pub fn sntp_port(&self) -> i32 {
        self.int(Attribute::SntpPort)
    }
}

/// Parse a decimal integer the way C `atol` does
///
/// Leading whitespace and one sign are accepted, then digits up to the first
/// non-digit. No digits yields 0. Out-of-range values saturate.
pub fn parse_int(text: &str) -> i32 {
    let bytes = text.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() && matches!(bytes[pos], b' ' | b'\t' | b'\n' | b'\r' | 0x0B | 0x0C) {
        pos += 1;
    }

    let negative = match bytes.get(pos) {
        Some(b'-') => {
            pos += 1;
            true
        }
        Some(b'+') => {
            pos += 1;
            false
        }
        _ => false,
    };

    let mut value: i64 = 0;
    while let Some(&b) = bytes.get(pos) {
        if !b.is_ascii_digit() {
            break;
        }
        value = (value * 10 + (b - b'0') as i64).min(i32::MAX as i64 + 1);
        pos += 1;
    }

    let value = if negative { -value } else { value };
    value.clamp(i32::MIN as i64, i32::MAX as i64) as i32
}

/// Parse a flag: true exactly for `TRUE` or `1`
pub fn parse_flag(text: &str) -> bool {
    matches!(text, "TRUE" | "1")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_int() {
        assert_eq!(parse_int("8883"), 8883);
        assert_eq!(parse_int("abc"), 0);
        assert_eq!(parse_int(""), 0);
        assert_eq!(parse_int("  42"), 42);
        assert_eq!(parse_int("-17"), -17);
        assert_eq!(parse_int("+5"), 5);
        assert_eq!(parse_int("1883 # plain"), 1883);
        assert_eq!(parse_int("12ab"), 12);
        assert_eq!(parse_int("-"), 0);
    }

    #[test]
    fn test_parse_int_saturates() {
        assert_eq!(parse_int("99999999999999999999"), i32::MAX);
        assert_eq!(parse_int("-99999999999999999999"), i32::MIN);
        assert_eq!(parse_int("2147483647"), i32::MAX);
        assert_eq!(parse_int("-2147483648"), i32::MIN);
    }

    #[test]
    fn test_parse_flag() {
        assert!(parse_flag("TRUE"));
        assert!(parse_flag("1"));
        assert!(!parse_flag("true"));
        assert!(!parse_flag("True"));
        assert!(!parse_flag("YES"));
        assert!(!parse_flag(""));
        assert!(!parse_flag("TRUE "));
        assert!(!parse_flag("FALSE"));
    }

    #[test]
    fn test_defaults_through_facade() {
        let store = AttributeStore::new();
        let config = Config::new(&store);
        assert_eq!(config.wlan_ssid(), "");
        assert_eq!(config.broker_name(), "mqtt.cumulocity.com");
        assert_eq!(config.broker_port(), 8883);
        assert!(config.is_secure());
        assert!(!config.is_anonymous());
        assert_eq!(config.stream_rate(), 5000);
        assert!(config.accel_enabled());
        assert!(config.light_enabled());
        assert_eq!(config.sntp_port(), 123);
    }

    #[test]
    fn test_defined_values_through_facade() {
        let mut store = AttributeStore::new();
        store.define(Attribute::BrokerPort, "1883").unwrap();
        store.define(Attribute::Secure, "true").unwrap();
        store.define(Attribute::GyroEnabled, "1").unwrap();
        store.define(Attribute::StreamRate, "fast").unwrap();
        store.define(Attribute::MagEnabled, "").unwrap();

        let config = Config::new(&store);
        assert_eq!(config.broker_port(), 1883);
        assert!(!config.is_secure());
        assert!(config.gyro_enabled());
        assert_eq!(config.stream_rate(), 0);
        assert!(!config.mag_enabled());
    }

    #[test]
    fn test_wlan_bytes() {
        let mut store = AttributeStore::new();
        store.define(Attribute::WifiSsid, b"Stra\xdfe").unwrap();
        store.define(Attribute::WifiPassword, "plain").unwrap();

        let config = Config::new(&store);
        assert_eq!(config.wlan_ssid_bytes(), b"Stra\xdfe");
        assert_eq!(config.wlan_ssid(), "Stra");
        assert_eq!(config.wlan_password_bytes(), b"plain");
        assert_eq!(config.bytes(Attribute::SntpPort), b"123");
    }
}
