//! Removable storage abstractions
//!
//! The configuration file lives on a FAT-formatted SD card. The reader only
//! ever needs two operations: load a whole file into a caller buffer, and
//! append text to the end of a file.

/// Errors from removable storage operations
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Card missing or file system could not be mounted
    Mount,
    /// File does not exist
    NotFound,
    /// Read failed part way through
    Read,
    /// Write or append failed
    Write,
    /// Closing the file failed (data may not be flushed)
    Close,
    /// File is larger than the caller's buffer
    BufferTooSmall,
}

/// Whole-file access to removable storage
pub trait ConfigFile {
    /// Read an entire file into `buffer`
    ///
    /// # Arguments
    /// * `path` - File name on the card, e.g. `CONFIG.TXT`
    /// * `buffer` - Destination; its length is the maximum file size accepted
    ///
    /// # Returns
    /// The number of bytes read, or an error. A file that does not fit is
    /// reported as [`StorageError::BufferTooSmall`] rather than truncated.
    fn read_whole_file(
        &mut self,
        path: &str,
        buffer: &mut [u8],
    ) -> impl core::future::Future<Output = Result<usize, StorageError>>;

    /// Append `data` to the end of a file, creating it if missing
    fn append_bytes(
        &mut self,
        path: &str,
        data: &[u8],
    ) -> impl core::future::Future<Output = Result<(), StorageError>>;
}
