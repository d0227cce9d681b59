use std::path::{Path, PathBuf};
use std::sync::Mutex;

use super::format::{self, StateEnvelope};
use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::settings::Settings;

/// The persistence boundary, injected into the facade.
///
/// One implementation per storage backing. The facade saves after every
/// mutating operation and loads once at startup; a store is best-effort
/// and must never be the reason a trade is rejected.
pub trait LedgerStore: Send + Sync {
    /// Persist the full state. Overwrites any previous save.
    fn save(&self, ledger: &Ledger, settings: &Settings) -> Result<(), CoreError>;

    /// Load the previously saved state, or `Ok(None)` when nothing has
    /// been saved yet. Corrupt data is an error — the caller decides
    /// whether to fall back to defaults.
    fn load(&self) -> Result<Option<StateEnvelope>, CoreError>;
}

/// File-backed store writing the JSON envelope to a single path.
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl LedgerStore for JsonFileStore {
    fn save(&self, ledger: &Ledger, settings: &Settings) -> Result<(), CoreError> {
        let bytes = format::encode(ledger, settings)?;
        std::fs::write(&self.path, bytes)?;
        Ok(())
    }

    fn load(&self) -> Result<Option<StateEnvelope>, CoreError> {
        let bytes = match std::fs::read(&self.path) {
            Ok(b) => b,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        format::decode(&bytes).map(Some)
    }
}

/// In-memory store. Used in tests and anywhere a host application wants
/// to own the bytes itself (it can read them back out after a save).
#[derive(Default)]
pub struct MemoryStore {
    bytes: Mutex<Option<Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last saved envelope bytes, if any.
    #[must_use]
    pub fn saved_bytes(&self) -> Option<Vec<u8>> {
        self.bytes.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    /// Seed the store with pre-existing bytes (as if previously saved).
    pub fn with_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes: Mutex::new(Some(bytes)),
        }
    }
}

impl LedgerStore for MemoryStore {
    fn save(&self, ledger: &Ledger, settings: &Settings) -> Result<(), CoreError> {
        let encoded = format::encode(ledger, settings)?;
        *self.bytes.lock().unwrap_or_else(|e| e.into_inner()) = Some(encoded);
        Ok(())
    }

    fn load(&self) -> Result<Option<StateEnvelope>, CoreError> {
        let guard = self.bytes.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_deref() {
            Some(bytes) => format::decode(bytes).map(Some),
            None => Ok(None),
        }
    }
}
