//! bootcfg Hardware Abstraction Layer
//!
//! This crate defines the storage traits the configuration reader consumes.
//! Board support packages implement them on top of their SD card driver and
//! internal flash; host tests implement them over in-memory buffers.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │  bootcfg-loader (bring-up)              │
//! └─────────────────────────────────────────┘
//!                     │
//!                     ▼
//! ┌─────────────────────────────────────────┐
//! │  bootcfg-hal (this crate - traits)      │
//! └─────────────────────────────────────────┘
//!                     │
//!         ┌───────────┴───────────┐
//!         ▼                       ▼
//! ┌───────────────┐       ┌───────────────┐
//! │  SD card FAT  │       │ internal flash│
//! │  (CONFIG.TXT) │       │  (snapshot)   │
//! └───────────────┘       └───────────────┘
//! ```
//!
//! # Traits
//!
//! - [`file::ConfigFile`] - Whole-file reads and appends on removable storage
//! - [`flash::FlashStorage`] - Persistent key-value storage

#![no_std]
#![deny(unsafe_code)]

pub mod file;
pub mod flash;

// Re-export key traits at crate root for convenience
pub use file::{ConfigFile, StorageError};
pub use flash::{FlashError, FlashStorage, StorageKey};
