//! Device bootstrap registration
//!
//! A board without `MQTTUSER` in its configuration connects to the bootstrap
//! broker and asks for credentials. The exchange is text based:
//!
//! ```text
//! device  --[ s/ucr ]-->  platform     "  \n" (repeated until answered)
//! device  <--[ s/dcr ]--  platform     "70,<tenant>,<user>,<password>"
//! ```
//!
//! The received credentials are appended to CONFIG.TXT as a record the
//! configuration parser reads on the next boot.

#![no_std]
#![deny(unsafe_code)]

pub mod credentials;
pub mod topics;

pub use credentials::{CredentialError, Credentials, MAX_FIELD_LEN, MAX_RECORD_LEN};
pub use topics::{
    REGISTRATION_BROKER, REGISTRATION_PORT, REGISTRATION_REQUEST, TEMPLATE_CREDENTIALS,
    TOPIC_CREDENTIAL, TOPIC_REGISTRATION,
};
