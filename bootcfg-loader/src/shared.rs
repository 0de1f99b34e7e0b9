//! Attribute store shared between tasks
//!
//! The console task may re-read CONFIG.TXT while the sensor and MQTT tasks
//! hold typed views of the configuration. Every access goes through an
//! async mutex, so a reader never sees a half-parsed store.

use embassy_sync::blocking_mutex::raw::RawMutex;
use embassy_sync::mutex::Mutex;

use bootcfg_core::config::ConfigSnapshot;
use bootcfg_core::{boot_mode, parse, AttributeStore, BootMode, Config, ParseError, ParseSummary};

/// Mutex-guarded attribute store
pub struct SharedStore<M: RawMutex> {
    inner: Mutex<M, AttributeStore>,
}

impl<M: RawMutex> SharedStore<M> {
    /// Wrap an already loaded store
    pub fn new(store: AttributeStore) -> Self {
        Self {
            inner: Mutex::new(store),
        }
    }

    /// Reset the store and parse `input` into it
    ///
    /// On error the store keeps the attributes assigned before the error,
    /// exactly like a first parse.
    pub async fn reparse(&self, input: &[u8]) -> Result<ParseSummary, ParseError> {
        let mut store = self.inner.lock().await;
        store.reset();
        let summary = parse(input, &mut store)?;
        debug!("Re-parsed configuration, {} attributes", summary.assigned);
        Ok(summary)
    }

    /// Run `f` with a typed view of the configuration
    pub async fn with_config<R>(&self, f: impl FnOnce(Config<'_>) -> R) -> R {
        let store = self.inner.lock().await;
        f(Config::new(&store))
    }

    /// Replace the whole store
    pub async fn replace(&self, store: AttributeStore) {
        *self.inner.lock().await = store;
    }

    /// Current boot mode
    pub async fn mode(&self) -> BootMode {
        boot_mode(&*self.inner.lock().await)
    }

    /// Capture a snapshot for persisting
    pub async fn snapshot(&self) -> ConfigSnapshot {
        ConfigSnapshot::capture(&*self.inner.lock().await)
    }
}
