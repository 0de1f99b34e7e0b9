//! Boot-time configuration bring-up
//!
//! Glues the configuration reader to storage:
//!
//! 1. Read CONFIG.TXT from the card and parse it into an attribute store
//! 2. Decide between registration and operation mode
//! 3. In registration mode, install the credentials received from the
//!    bootstrap broker by appending them to CONFIG.TXT
//! 4. Cache the resolved configuration in internal flash
//!
//! Rebooting after registration is left to the caller.

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod loader;
pub mod shared;

pub use loader::{BootLoader, LoadError, CONFIG_FILENAME, LISTING_CAPACITY, MAX_FILE_SIZE};
pub use shared::SharedStore;
