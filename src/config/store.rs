//! Settings storage backends.
//!
//! Settings are a flat key→string map. `JsonSettingsStore` keeps the map as
//! a JSON object on disk; `MemorySettingsStore` keeps it in memory and can be
//! told to fail, which is how tests exercise the degraded paths.

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::Value;
use tracing::debug;

use super::error::StoreError;

/// File name of the persisted settings.
pub const CONFIG_FILE_NAME: &str = "user-config.json";

/// Directory created under the platform config directory.
const CONFIG_DIR_NAME: &str = "eyeshade";

/// Raw settings as stored: setting name to stringified value.
pub type Settings = BTreeMap<String, String>;

/// Returns the well-known settings path, if the platform has a config directory.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME))
}

/// Trait for settings storage implementations.
pub trait SettingsStore: Send {
    /// Reads every stored setting.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage exists but cannot be read.
    fn read(&self) -> Result<Settings, StoreError>;

    /// Replaces the stored settings.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be written.
    fn write(&self, settings: &Settings) -> Result<(), StoreError>;

    /// Human-readable location, used in log messages.
    fn location(&self) -> String;
}

// ============================================================================
// JsonSettingsStore
// ============================================================================

/// Settings persisted as a JSON object of strings.
#[derive(Debug, Clone)]
pub struct JsonSettingsStore {
    path: PathBuf,
}

impl JsonSettingsStore {
    /// Creates a store backed by the given file.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the settings file path.
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for JsonSettingsStore {
    fn read(&self) -> Result<Settings, StoreError> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                debug!("Settings file {:?} not found, starting from defaults", self.path);
                return Ok(Settings::new());
            }
            Err(source) => {
                return Err(StoreError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };

        let object: serde_json::Map<String, Value> =
            serde_json::from_str(&text).map_err(|source| StoreError::Format {
                path: self.path.clone(),
                source,
            })?;

        // Non-scalar values cannot be settings; drop them like unknown keys.
        Ok(object
            .into_iter()
            .filter_map(|(key, value)| match value {
                Value::String(s) => Some((key, s)),
                Value::Number(n) => Some((key, n.to_string())),
                Value::Bool(b) => Some((key, b.to_string())),
                _ => None,
            })
            .collect())
    }

    fn write(&self, settings: &Settings) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|source| StoreError::Io {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let json = serde_json::to_string_pretty(settings).map_err(|source| StoreError::Format {
            path: self.path.clone(),
            source,
        })?;

        fs::write(&self.path, json).map_err(|source| StoreError::Io {
            path: self.path.clone(),
            source,
        })
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

// ============================================================================
// MemorySettingsStore
// ============================================================================

/// In-memory settings store for testing.
///
/// Clones share the same map, so a test can keep one handle and give
/// another to `UserConfig`.
#[derive(Debug, Clone, Default)]
pub struct MemorySettingsStore {
    entries: Arc<Mutex<Settings>>,
    fail_reads: Arc<AtomicBool>,
    fail_writes: Arc<AtomicBool>,
    write_count: Arc<AtomicUsize>,
}

impl MemorySettingsStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store pre-populated with the given entries.
    #[must_use]
    pub fn with_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        {
            let mut map = store.entries.lock().unwrap_or_else(|e| e.into_inner());
            for (key, value) in entries {
                map.insert(key.into(), value.into());
            }
        }
        store
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.fail_reads.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of the stored entries.
    #[must_use]
    pub fn entries(&self) -> Settings {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Returns one stored value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .get(key)
            .cloned()
    }

    /// Returns how many successful writes happened.
    #[must_use]
    pub fn write_count(&self) -> usize {
        self.write_count.load(Ordering::SeqCst)
    }
}

impl SettingsStore for MemorySettingsStore {
    fn read(&self) -> Result<Settings, StoreError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(StoreError::Other("Mock read failure".to_string()));
        }
        Ok(self.entries())
    }

    fn write(&self, settings: &Settings) -> Result<(), StoreError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(StoreError::Other("Mock write failure".to_string()));
        }
        *self.entries.lock().unwrap_or_else(|e| e.into_inner()) = settings.clone();
        self.write_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

// ============================================================================
// Tests
// ============================================================================
