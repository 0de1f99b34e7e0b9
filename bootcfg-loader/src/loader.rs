//! Configuration loading
//!
//! Reads CONFIG.TXT from removable storage into an attribute store.
//! A snapshot of the result can be cached in internal flash and used when
//! the card is unavailable.

use core::fmt;

use heapless::String;

use bootcfg_core::config::{ConfigSnapshot, SnapshotError, StoreError, MAX_SNAPSHOT_SIZE};
use bootcfg_core::listing::write_listing;
use bootcfg_core::{boot_mode, parse, Attribute, AttributeStore, BootMode, Config, ParseError};
use bootcfg_hal::{ConfigFile, FlashError, FlashStorage, StorageError, StorageKey};
use bootcfg_protocol::{CredentialError, Credentials};

/// Configuration file name on the card
pub const CONFIG_FILENAME: &str = "CONFIG.TXT";

/// Largest CONFIG.TXT accepted
pub const MAX_FILE_SIZE: usize = 2048;

/// Capacity of a rendered configuration listing
pub const LISTING_CAPACITY: usize = 2048;

/// Configuration loading errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LoadError {
    /// Card operation failed
    Storage(StorageError),
    /// CONFIG.TXT exists but holds no bytes
    EmptyFile,
    /// CONFIG.TXT is malformed
    Parse(ParseError),
    /// Credentials message rejected
    Credentials(CredentialError),
    /// Store update rejected
    Store(StoreError),
    /// Snapshot could not be encoded or decoded
    Snapshot(SnapshotError),
    /// Flash operation failed
    Flash(FlashError),
    /// CONFIG.TXT already assigns device credentials
    AlreadyRegistered,
}

impl From<StorageError> for LoadError {
    fn from(e: StorageError) -> Self {
        LoadError::Storage(e)
    }
}

impl From<ParseError> for LoadError {
    fn from(e: ParseError) -> Self {
        LoadError::Parse(e)
    }
}

impl From<CredentialError> for LoadError {
    fn from(e: CredentialError) -> Self {
        LoadError::Credentials(e)
    }
}

impl From<StoreError> for LoadError {
    fn from(e: StoreError) -> Self {
        LoadError::Store(e)
    }
}

impl From<SnapshotError> for LoadError {
    fn from(e: SnapshotError) -> Self {
        LoadError::Snapshot(e)
    }
}

impl From<FlashError> for LoadError {
    fn from(e: FlashError) -> Self {
        LoadError::Flash(e)
    }
}

/// Owns the card driver and the parsed configuration
pub struct BootLoader<S> {
    storage: S,
    store: AttributeStore,
}

impl<S: ConfigFile> BootLoader<S> {
    /// Create a loader with an empty store; every attribute resolves to its
    /// default until [`load`](Self::load) succeeds
    pub fn new(storage: S) -> Self {
        Self {
            storage,
            store: AttributeStore::new(),
        }
    }

    /// Consume the loader and return the card driver
    pub fn into_storage(self) -> S {
        self.storage
    }

    /// Read and parse CONFIG.TXT
    ///
    /// The store is reset first. On a parse error the attributes assigned
    /// before the error stay in the store.
    pub async fn load(&mut self) -> Result<BootMode, LoadError> {
        info!("Loading {} from card...", CONFIG_FILENAME);
        self.store.reset();

        let mut buffer = [0u8; MAX_FILE_SIZE];
        let len = self
            .storage
            .read_whole_file(CONFIG_FILENAME, &mut buffer)
            .await?;

        debug!("Read {} bytes of configuration", len);

        if len == 0 {
            warn!("{} is empty", CONFIG_FILENAME);
            return Err(LoadError::EmptyFile);
        }

        let summary = parse(&buffer[..len], &mut self.store).map_err(|e| {
            warn!("Failed to parse {}: {:?}", CONFIG_FILENAME, e);
            LoadError::Parse(e)
        })?;

        if summary.truncated > 0 {
            warn!("{} overlong tokens were truncated", summary.truncated);
        }

        let mode = boot_mode(&self.store);
        log_config_summary(&self.store, mode);
        Ok(mode)
    }

    /// Install credentials received from the bootstrap broker
    ///
    /// Appends the credential record to CONFIG.TXT and assigns the values in
    /// the store. The new values take effect from the file after a reboot.
    ///
    /// Refused when the file already names `MQTTUSER` or `MQTTPASSWORD`,
    /// even with an empty value, since a second assignment would make the
    /// file unreadable.
    pub async fn register(&mut self, payload: &[u8]) -> Result<Credentials, LoadError> {
        if self.store.is_defined(Attribute::MqttUser)
            || self.store.is_defined(Attribute::MqttPassword)
        {
            warn!("{} already assigns credentials", CONFIG_FILENAME);
            return Err(LoadError::AlreadyRegistered);
        }

        let credentials = Credentials::decode(payload).map_err(|e| {
            warn!("Rejected credentials message: {:?}", e);
            LoadError::Credentials(e)
        })?;

        info!("Received credentials for {}", credentials.username.as_str());

        let record = credentials.encode_record();
        self.storage
            .append_bytes(CONFIG_FILENAME, record.as_bytes())
            .await?;

        self.store
            .assign(Attribute::MqttUser, credentials.username.as_str())?;
        self.store
            .assign(Attribute::MqttPassword, credentials.password.as_str())?;

        info!("Credentials appended to {}", CONFIG_FILENAME);
        Ok(credentials)
    }

    /// Typed view of the current configuration
    pub fn config(&self) -> Config<'_> {
        Config::new(&self.store)
    }

    /// The underlying attribute store
    pub fn store(&self) -> &AttributeStore {
        &self.store
    }

    /// Current boot mode
    pub fn mode(&self) -> BootMode {
        boot_mode(&self.store)
    }

    /// Render the configuration listing
    ///
    /// With `defaults_only`, attributes without a value are omitted.
    pub fn listing(&self, defaults_only: bool) -> Result<String<LISTING_CAPACITY>, fmt::Error> {
        let mut out = String::new();
        write_listing(&self.store, &mut out, "Configuration:", defaults_only)?;
        Ok(out)
    }

    /// Cache the configuration in internal flash
    ///
    /// Returns the number of bytes written.
    pub async fn persist_snapshot<F: FlashStorage>(
        &self,
        flash: &mut F,
    ) -> Result<usize, LoadError> {
        let snapshot = ConfigSnapshot::capture(&self.store);

        let mut buffer = [0u8; MAX_SNAPSHOT_SIZE];
        let bytes = snapshot.to_bytes(&mut buffer)?;

        debug!("Saving {} bytes of configuration snapshot", bytes.len());
        flash.write(StorageKey::ConfigSnapshot, bytes).await?;

        info!("Saved configuration snapshot to flash");
        Ok(bytes.len())
    }

    /// Replace the store with the snapshot cached in internal flash
    ///
    /// The store is left untouched if the snapshot is missing or invalid.
    pub async fn restore_snapshot<F: FlashStorage>(
        &mut self,
        flash: &mut F,
    ) -> Result<BootMode, LoadError> {
        let mut buffer = [0u8; MAX_SNAPSHOT_SIZE];
        let len = flash.read(StorageKey::ConfigSnapshot, &mut buffer).await?;

        debug!("Read {} bytes of configuration snapshot", len);

        let snapshot = ConfigSnapshot::from_bytes(&buffer[..len]).map_err(|e| {
            warn!("Configuration snapshot rejected: {:?}", e);
            LoadError::Snapshot(e)
        })?;
        self.store = snapshot.restore()?;

        let mode = boot_mode(&self.store);
        log_config_summary(&self.store, mode);
        Ok(mode)
    }
}

/// Log a summary of the loaded configuration
fn log_config_summary(store: &AttributeStore, mode: BootMode) {
    let config = Config::new(store);
    info!("Configuration loaded successfully");
    debug!("  {} attributes defined", store.defined_count());
    debug!("  broker {}:{}", config.broker_name(), config.broker_port());
    debug!("  stream rate {} ms", config.stream_rate());
    match mode {
        BootMode::Registration => info!("No device credentials, starting registration"),
        BootMode::Operation => info!("Device credentials present, starting operation"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embassy_futures::block_on;
    use heapless::Vec;

    /// In-memory card holding a single CONFIG.TXT
    struct MemCard {
        file: Option<Vec<u8, 4096>>,
        fail_append: bool,
    }

    impl MemCard {
        fn with(content: &[u8]) -> Self {
            Self {
                file: Some(Vec::from_slice(content).unwrap()),
                fail_append: false,
            }
        }

        fn missing() -> Self {
            Self {
                file: None,
                fail_append: false,
            }
        }
    }

    impl ConfigFile for MemCard {
        async fn read_whole_file(
            &mut self,
            path: &str,
            buffer: &mut [u8],
        ) -> Result<usize, StorageError> {
            assert_eq!(path, CONFIG_FILENAME);
            let file = self.file.as_ref().ok_or(StorageError::NotFound)?;
            if file.len() > buffer.len() {
                return Err(StorageError::BufferTooSmall);
            }
            buffer[..file.len()].copy_from_slice(file);
            Ok(file.len())
        }

        async fn append_bytes(&mut self, path: &str, data: &[u8]) -> Result<(), StorageError> {
            assert_eq!(path, CONFIG_FILENAME);
            if self.fail_append {
                return Err(StorageError::Write);
            }
            self.file
                .get_or_insert_with(Vec::new)
                .extend_from_slice(data)
                .map_err(|_| StorageError::Write)
        }
    }

    /// In-memory flash with one slot per key
    #[derive(Default)]
    struct MemFlash {
        slots: [Option<Vec<u8, MAX_SNAPSHOT_SIZE>>; 1],
    }

    impl FlashStorage for MemFlash {
        async fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, FlashError> {
            let data = self.slots[key.as_u8() as usize]
                .as_ref()
                .ok_or(FlashError::NotFound)?;
            if data.len() > buffer.len() {
                return Err(FlashError::BufferTooSmall);
            }
            buffer[..data.len()].copy_from_slice(data);
            Ok(data.len())
        }

        async fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), FlashError> {
            let data = Vec::from_slice(data).map_err(|_| FlashError::Full)?;
            self.slots[key.as_u8() as usize] = Some(data);
            Ok(())
        }

        async fn exists(&mut self, key: StorageKey) -> bool {
            self.slots[key.as_u8() as usize].is_some()
        }
    }

    const OPERATION_FILE: &[u8] = b"WIFISSID=home\r\n\
WIFIPASSWORD=secret\r\n\
MQTTUSER=t1234/device_1\r\n\
MQTTPASSWORD=pw\r\n\
STREAMRATE=1000\r\n";

    #[test]
    fn test_load_operation_mode() {
        let mut loader = BootLoader::new(MemCard::with(OPERATION_FILE));
        let mode = block_on(loader.load()).unwrap();
        assert_eq!(mode, BootMode::Operation);
        assert_eq!(loader.config().wlan_ssid(), "home");
        assert_eq!(loader.config().stream_rate(), 1000);
        assert_eq!(loader.config().broker_port(), 8883);
        assert_eq!(loader.store().defined_count(), 5);
    }

    #[test]
    fn test_load_registration_mode() {
        let mut loader = BootLoader::new(MemCard::with(b"WIFISSID=home\nWIFIPASSWORD=x\n"));
        assert_eq!(block_on(loader.load()), Ok(BootMode::Registration));
        assert_eq!(loader.mode(), BootMode::Registration);
    }

    #[test]
    fn test_load_missing_file() {
        let mut loader = BootLoader::new(MemCard::missing());
        assert_eq!(
            block_on(loader.load()),
            Err(LoadError::Storage(StorageError::NotFound))
        );
    }

    #[test]
    fn test_load_empty_file() {
        let mut loader = BootLoader::new(MemCard::with(b""));
        assert_eq!(block_on(loader.load()), Err(LoadError::EmptyFile));
    }

    #[test]
    fn test_load_oversized_file() {
        let mut card = MemCard::with(b"");
        card.file = Some(Vec::from_slice(&[b'#'; MAX_FILE_SIZE + 1]).unwrap());
        let mut loader = BootLoader::new(card);
        assert_eq!(
            block_on(loader.load()),
            Err(LoadError::Storage(StorageError::BufferTooSmall))
        );
    }

    #[test]
    fn test_load_parse_error_keeps_earlier_values() {
        let mut loader = BootLoader::new(MemCard::with(b"WIFISSID=home\nBOGUS=1\n"));
        assert!(matches!(
            block_on(loader.load()),
            Err(LoadError::Parse(ParseError::UnexpectedToken { .. }))
        ));
        assert_eq!(loader.config().wlan_ssid(), "home");
    }

    #[test]
    fn test_reload_resets_store() {
        let mut loader = BootLoader::new(MemCard::with(OPERATION_FILE));
        block_on(loader.load()).unwrap();
        // Second load must not report duplicates
        assert_eq!(block_on(loader.load()), Ok(BootMode::Operation));
    }

    #[test]
    fn test_register_appends_and_assigns() {
        let mut loader = BootLoader::new(MemCard::with(b"WIFISSID=home"));
        assert_eq!(block_on(loader.load()), Ok(BootMode::Registration));

        let creds = block_on(loader.register(b"70,acme,dev_1,s3cret")).unwrap();
        assert_eq!(creds.username.as_str(), "acme/dev_1");
        assert_eq!(loader.mode(), BootMode::Operation);
        assert_eq!(loader.config().mqtt_user(), "acme/dev_1");
        assert_eq!(loader.config().mqtt_password(), "s3cret");

        // Next boot reads the appended record
        let mut loader = BootLoader::new(loader.into_storage());
        assert_eq!(block_on(loader.load()), Ok(BootMode::Operation));
        assert_eq!(loader.config().wlan_ssid(), "home");
        assert_eq!(loader.config().mqtt_user(), "acme/dev_1");
    }

    #[test]
    fn test_register_rejects_bad_message() {
        let mut loader = BootLoader::new(MemCard::with(b"WIFISSID=home\n"));
        block_on(loader.load()).unwrap();
        assert_eq!(
            block_on(loader.register(b"71,a,b,c")),
            Err(LoadError::Credentials(CredentialError::WrongTemplate))
        );
        assert_eq!(loader.mode(), BootMode::Registration);

        let card = loader.into_storage();
        assert_eq!(card.file.unwrap().as_slice(), b"WIFISSID=home\n");
    }

    #[test]
    fn test_register_refused_when_file_names_credentials() {
        // Blank user still counts as registered by the file
        let original: &[u8] = b"WIFISSID=home\nMQTTUSER=\n";
        let mut loader = BootLoader::new(MemCard::with(original));
        assert_eq!(block_on(loader.load()), Ok(BootMode::Registration));

        assert_eq!(
            block_on(loader.register(b"70,acme,dev,pw")),
            Err(LoadError::AlreadyRegistered)
        );
        assert_eq!(loader.config().mqtt_user(), "");

        // File is untouched and still loads on the next boot
        let card = loader.into_storage();
        assert_eq!(card.file.as_ref().unwrap().as_slice(), original);
        let mut loader = BootLoader::new(card);
        assert_eq!(block_on(loader.load()), Ok(BootMode::Registration));

        let mut loader = BootLoader::new(MemCard::with(b"MQTTPASSWORD=old\n"));
        block_on(loader.load()).unwrap();
        assert_eq!(
            block_on(loader.register(b"70,acme,dev,pw")),
            Err(LoadError::AlreadyRegistered)
        );
    }

    #[test]
    fn test_register_append_failure() {
        let mut card = MemCard::with(b"WIFISSID=home\n");
        card.fail_append = true;
        let mut loader = BootLoader::new(card);
        block_on(loader.load()).unwrap();
        assert_eq!(
            block_on(loader.register(b"70,a,b,c")),
            Err(LoadError::Storage(StorageError::Write))
        );
        // Store only changes once the record is on the card
        assert_eq!(loader.mode(), BootMode::Registration);
    }

    #[test]
    fn test_snapshot_roundtrip_through_flash() {
        let mut flash = MemFlash::default();
        let mut loader = BootLoader::new(MemCard::with(OPERATION_FILE));
        block_on(loader.load()).unwrap();
        let written = block_on(loader.persist_snapshot(&mut flash)).unwrap();
        assert!(written > 0);
        assert!(block_on(flash.exists(StorageKey::ConfigSnapshot)));

        let mut fresh = BootLoader::new(MemCard::missing());
        assert_eq!(
            block_on(fresh.restore_snapshot(&mut flash)),
            Ok(BootMode::Operation)
        );
        assert_eq!(fresh.store(), loader.store());
    }

    #[test]
    fn test_restore_without_snapshot() {
        let mut flash = MemFlash::default();
        let mut loader = BootLoader::new(MemCard::missing());
        assert_eq!(
            block_on(loader.restore_snapshot(&mut flash)),
            Err(LoadError::Flash(FlashError::NotFound))
        );
    }

    #[test]
    fn test_restore_corrupted_snapshot() {
        let mut flash = MemFlash::default();
        let mut loader = BootLoader::new(MemCard::with(OPERATION_FILE));
        block_on(loader.load()).unwrap();
        block_on(loader.persist_snapshot(&mut flash)).unwrap();

        // Flip a byte inside the stored values
        let slot = flash.slots[0].as_mut().unwrap();
        let idx = slot.len() / 2;
        slot[idx] ^= 0x01;

        let mut fresh = BootLoader::new(MemCard::missing());
        assert!(matches!(
            block_on(fresh.restore_snapshot(&mut flash)),
            Err(LoadError::Snapshot(_))
        ));
        assert_eq!(fresh.store().defined_count(), 0);
    }

    #[test]
    fn test_listing() {
        let mut loader = BootLoader::new(MemCard::with(OPERATION_FILE));
        block_on(loader.load()).unwrap();

        let full = loader.listing(false).unwrap();
        assert!(full.starts_with("Configuration:\n"));
        assert!(full.contains("[           WIFISSID] = [home]\n"));
        assert!(full.contains("[           SNTPPORT] * [123] (DEFAULT)\n"));

        let defaults = loader.listing(true).unwrap();
        assert!(!defaults.contains("(DEFAULT)"));
    }
}
