//! Human-readable configuration dump
//!
//! Printed on the console after parsing so an operator can see which values
//! came from the card and which are compiled defaults:
//!
//! ```text
//! [           WIFISSID] = [home]
//! [     MQTTBROKERNAME] * [mqtt.cumulocity.com] (DEFAULT)
//! ```
//!
//! Value bytes that are not valid UTF-8 are printed as `\xNN`.

use core::fmt::{self, Write};

use crate::config::{AttributeStore, SchemaEntry, Slot};

/// Write the listing for every attribute in the store
///
/// With `defaults_only`, undefined attributes are listed without the
/// `(DEFAULT)` marker and skipped entirely when their default is empty.
pub fn write_listing<W: Write>(
    store: &AttributeStore,
    out: &mut W,
    title: &str,
    defaults_only: bool,
) -> fmt::Result {
    write_entries(
        out,
        store.iter().map(|(_, entry, slot)| (entry, slot)),
        title,
        defaults_only,
    )
}

fn write_entries<'a, W: Write>(
    out: &mut W,
    entries: impl Iterator<Item = (&'a SchemaEntry, &'a Slot)>,
    title: &str,
    defaults_only: bool,
) -> fmt::Result {
    writeln!(out, "{}", title)?;

    for (entry, slot) in entries {
        match (entry.deprecated, slot.value_bytes()) {
            (false, Some(value)) => {
                write!(out, "[{:>19}] = [", entry.name)?;
                write_escaped(out, value)?;
                writeln!(out, "]")?;
            }
            (false, None) if defaults_only => {
                if !entry.default_value.is_empty() {
                    writeln!(out, "[{:>19}] * [{}]", entry.name, entry.default_value)?;
                }
            }
            (false, None) => writeln!(
                out,
                "[{:>19}] * [{}] (DEFAULT)",
                entry.name, entry.default_value
            )?,
            (true, Some(_)) => writeln!(
                out,
                "[{:>19}] is deprecated and should be removed",
                entry.name
            )?,
            (true, None) => {}
        }
    }

    Ok(())
}

fn write_escaped<W: Write>(out: &mut W, mut bytes: &[u8]) -> fmt::Result {
    loop {
        match core::str::from_utf8(bytes) {
            Ok(text) => return out.write_str(text),
            Err(e) => {
                let (valid, rest) = bytes.split_at(e.valid_up_to());
                out.write_str(core::str::from_utf8(valid).unwrap_or_default())?;
                let bad = e.error_len().unwrap_or(rest.len());
                for byte in &rest[..bad] {
                    write!(out, "\\x{:02X}", byte)?;
                }
                bytes = &rest[bad..];
            }
        }
    }
}
