//! Board-agnostic configuration reader
//!
//! This crate contains everything between the raw bytes of CONFIG.TXT and
//! the typed settings the agent runs on, with no hardware dependencies:
//!
//! - Attribute schema with compiled defaults
//! - Tokenizer and three-state parser
//! - Attribute store with defined-vs-default resolution
//! - Typed accessors (strings, lenient integers and flags)
//! - Boot mode selection (registration vs. operation)
//! - Console listing and flash snapshot of the parsed configuration

#![no_std]
#![deny(unsafe_code)]

// This mod MUST go first, so that the others see its macros.
pub(crate) mod fmt;

pub mod config;
pub mod listing;
pub mod mode;
pub mod parser;

pub use config::{Attribute, AttributeStore, Config};
pub use mode::{boot_mode, BootMode};
pub use parser::{parse, ParseError, ParseSummary};
