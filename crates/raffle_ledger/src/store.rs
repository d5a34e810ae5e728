//! # Ledger Store
//!
//! **Whole-record persistence.**
//!
//! The ledger is stored as one JSON document:
//!
//! ```text
//! {
//!   "participants": {
//!     "<id>": { "display_name": "...", "total_contributed": 0, "ticket_count": 0 }
//!   }
//! }
//! ```
//!
//! ## Guarantees
//!
//! 1. **No record is not an error**: a missing, empty or whitespace-only file
//!    loads as an empty ledger
//! 2. **No silent resets**: anything else that does not parse is `CorruptState`
//! 3. **Atomic overwrite**: `save` writes a sibling temp file, syncs it and
//!    renames it over the record, so `load` never sees a half-written file
//!
//! There is no locking here. Callers that can run concurrently must serialize
//! load-mutate-save themselves.

use parking_lot::Mutex;
use std::fs::{self, File};
use std::io::{BufWriter, ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};

use crate::error::{RaffleError, RaffleResult};
use crate::ledger::Ledger;

/// Durable home of a [`Ledger`].
pub trait LedgerStore: Send + Sync {
    /// Loads the stored ledger, or an empty one if nothing is stored yet.
    ///
    /// # Errors
    ///
    /// `CorruptState` if the record does not parse, `StorageUnavailable` if it
    /// cannot be read.
    fn load(&self) -> RaffleResult<Ledger>;

    /// Replaces the stored ledger with `ledger`.
    ///
    /// # Errors
    ///
    /// `StorageUnavailable` if the record cannot be written.
    fn save(&self, ledger: &Ledger) -> RaffleResult<()>;

    /// Human-readable location, used in error messages and logs.
    fn location(&self) -> String;
}

/// Decodes a stored record.
fn decode(bytes: &[u8], location: &str) -> RaffleResult<Ledger> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Ledger::new());
    }
    let corrupt = |reason: String| {
        tracing::error!("Ledger record at {} is corrupt: {}", location, reason);
        RaffleError::CorruptState {
            path: location.to_string(),
            reason,
        }
    };
    let value: serde_json::Value = serde_json::from_slice(bytes).map_err(|e| corrupt(e.to_string()))?;
    // Derived struct deserialization also accepts a sequence; only a map is a ledger.
    if !value.is_object() {
        return Err(corrupt(format!("expected a JSON object, found {}", json_kind(&value))));
    }
    serde_json::from_value(value).map_err(|e| corrupt(e.to_string()))
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}

/// Encodes a ledger as pretty JSON with a trailing newline.
fn encode(ledger: &Ledger, location: &str) -> RaffleResult<Vec<u8>> {
    let mut bytes = serde_json::to_vec_pretty(ledger).map_err(|e| RaffleError::StorageUnavailable {
        path: location.to_string(),
        reason: e.to_string(),
    })?;
    bytes.push(b'\n');
    Ok(bytes)
}

/// JSON file on the local filesystem.
#[derive(Clone, Debug)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the record at `path`. Nothing is touched until
    /// the first `load` or `save`.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Path of the record.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Sibling path the next record is staged at before the rename.
    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(std::ffi::OsStr::to_os_string)
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    fn unavailable(&self, err: &std::io::Error) -> RaffleError {
        tracing::error!("Ledger storage at {} unavailable: {}", self.path.display(), err);
        RaffleError::StorageUnavailable {
            path: self.location(),
            reason: err.to_string(),
        }
    }

    fn write_staged(&self, staging: &Path, bytes: &[u8]) -> std::io::Result<()> {
        let file = File::create(staging)?;
        let mut writer = BufWriter::new(file);
        writer.write_all(bytes)?;
        writer.flush()?;
        let file = writer.into_inner().map_err(std::io::IntoInnerError::into_error)?;
        file.sync_all()?;
        fs::rename(staging, &self.path)
    }
}

impl LedgerStore for JsonFileStore {
    fn load(&self) -> RaffleResult<Ledger> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::debug!("No ledger record at {}, starting empty", self.path.display());
                return Ok(Ledger::new());
            }
            Err(e) => return Err(self.unavailable(&e)),
        };

        let ledger = decode(&bytes, &self.location())?;
        tracing::debug!(
            "Loaded {} participant(s) from {}",
            ledger.len(),
            self.path.display()
        );
        Ok(ledger)
    }

    fn save(&self, ledger: &Ledger) -> RaffleResult<()> {
        let bytes = encode(ledger, &self.location())?;
        let staging = self.staging_path();

        if let Err(e) = self.write_staged(&staging, &bytes) {
            // Best effort: a stale staging file is harmless but untidy.
            let _ = fs::remove_file(&staging);
            return Err(self.unavailable(&e));
        }

        tracing::debug!(
            "Saved {} participant(s) to {}",
            ledger.len(),
            self.path.display()
        );
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

/// In-memory record, encoded exactly like the file store.
///
/// Useful for embedding and for tests that need to plant a corrupt record or
/// simulate an unavailable backend.
#[derive(Debug)]
pub struct MemoryStore {
    record: Mutex<Option<Vec<u8>>>,
    available: AtomicBool,
}

impl MemoryStore {
    /// Creates a store with no record.
    #[must_use]
    pub fn new() -> Self {
        Self {
            record: Mutex::new(None),
            available: AtomicBool::new(true),
        }
    }

    /// Creates a store holding raw record bytes.
    #[must_use]
    pub fn with_record(bytes: impl Into<Vec<u8>>) -> Self {
        let store = Self::new();
        *store.record.lock() = Some(bytes.into());
        store
    }

    /// Makes every subsequent `load`/`save` fail with `StorageUnavailable`.
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    /// Raw bytes of the current record.
    #[must_use]
    pub fn record(&self) -> Option<Vec<u8>> {
        self.record.lock().clone()
    }

    fn check_available(&self) -> RaffleResult<()> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(RaffleError::StorageUnavailable {
                path: self.location(),
                reason: "backend offline".to_string(),
            })
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for MemoryStore {
    fn load(&self) -> RaffleResult<Ledger> {
        self.check_available()?;
        match self.record.lock().as_deref() {
            Some(bytes) => decode(bytes, &self.location()),
            None => Ok(Ledger::new()),
        }
    }

    fn save(&self, ledger: &Ledger) -> RaffleResult<()> {
        self.check_available()?;
        let bytes = encode(ledger, &self.location())?;
        *self.record.lock() = Some(bytes);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}
