//! Device credentials message
//!
//! Format on [`TOPIC_CREDENTIAL`](crate::TOPIC_CREDENTIAL):
//! - TEMPLATE: `70`, terminated by `,`
//! - TENANT, USER, PASSWORD: separated by `,` or space; empty fields are
//!   skipped
//!
//! The MQTT username is `<tenant>/<user>`. Username and password must be
//! valid CONFIG.TXT values, otherwise the record written after registration
//! could not be read back.

use bootcfg_core::config::{Attribute, MAX_VALUE_LEN};
use heapless::String;

use crate::topics::TEMPLATE_CREDENTIALS;

/// Longest username or password, matching the attribute value bound
pub const MAX_FIELD_LEN: usize = MAX_VALUE_LEN;

/// Capacity of the CONFIG.TXT record built by [`Credentials::encode_record`]
pub const MAX_RECORD_LEN: usize = 160;

/// Errors that can occur while decoding a credentials message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CredentialError {
    /// Payload is not text
    InvalidUtf8,
    /// First field is not the credentials template id
    WrongTemplate,
    /// Tenant, user or password missing
    MissingField,
    /// More fields than the template defines
    UnexpectedField,
    /// Username or password exceeds [`MAX_FIELD_LEN`]
    FieldTooLong,
    /// Username or password cannot be written as a CONFIG.TXT value: it
    /// contains TAB, CR or LF, starts with `=`, or is an attribute name
    InvalidField,
}

/// Credentials issued to the device by the platform
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Credentials {
    /// `<tenant>/<user>`
    pub username: String<MAX_FIELD_LEN>,
    pub password: String<MAX_FIELD_LEN>,
}

impl Credentials {
    /// Decode a payload received on the credential topic
    pub fn decode(payload: &[u8]) -> Result<Self, CredentialError> {
        let text = core::str::from_utf8(payload).map_err(|_| CredentialError::InvalidUtf8)?;

        let text = text.trim_start_matches(',');
        let (template, rest) = text.split_once(',').unwrap_or((text, ""));
        if template != TEMPLATE_CREDENTIALS {
            return Err(CredentialError::WrongTemplate);
        }

        let mut fields = rest
            .split(|c: char| c == ',' || c == ' ')
            .filter(|field| !field.is_empty());
        let tenant = fields.next().ok_or(CredentialError::MissingField)?;
        let user = fields.next().ok_or(CredentialError::MissingField)?;
        let password = fields.next().ok_or(CredentialError::MissingField)?;
        if fields.next().is_some() {
            return Err(CredentialError::UnexpectedField);
        }

        let mut username: String<MAX_FIELD_LEN> = String::new();
        for part in [tenant, "/", user] {
            username
                .push_str(part)
                .map_err(|_| CredentialError::FieldTooLong)?;
        }

        let password: String<MAX_FIELD_LEN> =
            String::try_from(password).map_err(|_| CredentialError::FieldTooLong)?;

        check_value(&username)?;
        check_value(&password)?;

        Ok(Self { username, password })
    }

    /// CONFIG.TXT text assigning these credentials
    ///
    /// Starts with a newline so it can be appended to a file whose last line
    /// is unterminated.
    pub fn encode_record(&self) -> String<MAX_RECORD_LEN> {
        let mut record = String::new();
        // Capacity covers both fields at their bound
        for part in [
            "\n",
            Attribute::MqttUser.name(),
            "=",
            self.username.as_str(),
            "\n",
            Attribute::MqttPassword.name(),
            "=",
            self.password.as_str(),
            "\n",
        ] {
            let _ = record.push_str(part);
        }
        record
    }
}

/// Reject text the CONFIG.TXT tokenizer would not return as one value
fn check_value(value: &str) -> Result<(), CredentialError> {
    let breaks_line = value.bytes().any(|b| matches!(b, b'\t' | b'\r' | b'\n'));
    if breaks_line || value.starts_with('=') || Attribute::from_name(value.as_bytes()).is_some() {
        return Err(CredentialError::InvalidField);
    }
    Ok(())
}
