//! Internal flash storage
//!
//! The resolved configuration is cached here after a successful load so the
//! agent can come up even when the card is removed.

/// Keys for data kept in internal flash
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum StorageKey {
    /// Resolved configuration snapshot (binary postcard format)
    ConfigSnapshot = 0,
}

impl StorageKey {
    /// Byte identifying the key on flash
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// Errors from flash storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum FlashError {
    /// Nothing stored under the key
    NotFound,
    /// Buffer too small for the stored data
    BufferTooSmall,
    /// No room left for the data
    Full,
}

/// Key-value storage in internal flash
pub trait FlashStorage {
    /// Read a value by key into the provided buffer
    ///
    /// # Returns
    /// The number of bytes read, or an error.
    fn read(
        &mut self,
        key: StorageKey,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, FlashError>>;

    /// Write a value by key, replacing any previous value
    fn write(
        &mut self,
        key: StorageKey,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), FlashError>>;

    /// Check if a key exists in storage
    fn exists(&mut self, key: StorageKey) -> impl core::future::Future<Output = bool>;
}
