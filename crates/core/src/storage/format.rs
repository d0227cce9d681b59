use serde::{Deserialize, Serialize};

use crate::errors::CoreError;
use crate::models::ledger::Ledger;
use crate::models::settings::Settings;

/// Current saved-state version.
pub const CURRENT_VERSION: u32 = 1;

/// The full persisted state: a versioned JSON envelope around the
/// ledger and settings.
///
/// The version field is validated on load so a future format change can
/// migrate (or reject) old blobs explicitly instead of failing on a
/// random missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StateEnvelope {
    pub version: u32,
    pub ledger: Ledger,
    pub settings: Settings,
}

impl StateEnvelope {
    pub fn new(ledger: Ledger, settings: Settings) -> Self {
        Self {
            version: CURRENT_VERSION,
            ledger,
            settings,
        }
    }
}

/// Serialize ledger + settings into envelope bytes.
pub fn encode(ledger: &Ledger, settings: &Settings) -> Result<Vec<u8>, CoreError> {
    let envelope = StateEnvelope {
        version: CURRENT_VERSION,
        ledger: ledger.clone(),
        settings: settings.clone(),
    };
    serde_json::to_vec_pretty(&envelope)
        .map_err(|e| CoreError::Serialization(format!("Failed to serialize state: {e}")))
}

/// Parse and validate envelope bytes.
pub fn decode(bytes: &[u8]) -> Result<StateEnvelope, CoreError> {
    let envelope: StateEnvelope = serde_json::from_slice(bytes)
        .map_err(|e| CoreError::Deserialization(format!("Failed to parse saved state: {e}")))?;

    if envelope.version == 0 || envelope.version > CURRENT_VERSION {
        return Err(CoreError::UnsupportedVersion(envelope.version));
    }

    Ok(envelope)
}
