//! Bootstrap broker, topics and message templates

/// Broker every unregistered device talks to
pub const REGISTRATION_BROKER: &str = "mqtt.cumulocity.com";
pub const REGISTRATION_PORT: u16 = 8883;

// Topics
pub const TOPIC_REGISTRATION: &str = "s/ucr";
pub const TOPIC_CREDENTIAL: &str = "s/dcr";

/// Payload published on [`TOPIC_REGISTRATION`] while waiting
pub const REGISTRATION_REQUEST: &[u8] = b"  \n";

/// Static template id of a device credentials message
pub const TEMPLATE_CREDENTIALS: &str = "70";
