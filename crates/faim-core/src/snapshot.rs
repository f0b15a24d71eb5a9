//! # Snapshot Codec
//!
//! Lossless, human-readable JSON encoding of an [`ApplicationState`].
//!
//! ## Format
//!
//! ```text
//! {
//!   "schemaVersion": 2,
//!   "agents": [ ... ],
//!   "world": { "Ctx": ..., "GateConfig": ..., ..., "Privacy": ... }
//! }
//! ```
//!
//! Fields are written in declaration order and never sorted, so consecutive
//! exports diff cleanly.
//!
//! ## Import
//!
//! 1. Size is checked BEFORE parsing.
//! 2. The `schemaVersion` header is validated BEFORE the payload. A missing
//!    header means a version 1 document; a newer version is rejected.
//! 3. `GateConfig`, `Constructors` and `Privacy` are back-filled with the
//!    defaults of a fresh world when absent. Every other world field and the
//!    agent list are required.

use crate::primitives::{
    LEGACY_SNAPSHOT_VERSION, MAX_SNAPSHOT_SIZE, SNAPSHOT_VERSION, SNAPSHOT_VERSION_FIELD,
};
use crate::types::{ApplicationState, FaimError};
use serde::Serialize;
use serde_json::{Map, Value};

// =============================================================================
// HEADER
// =============================================================================

/// Schema header of a snapshot document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SnapshotHeader {
    pub version: u64,
}

impl SnapshotHeader {
    /// Header written by this build.
    #[must_use]
    pub fn current() -> Self {
        Self {
            version: u64::from(SNAPSHOT_VERSION),
        }
    }

    /// Read the header from a parsed document, removing the header field.
    fn take_from(document: &mut Map<String, Value>) -> Result<Self, FaimError> {
        let version = match document.remove(SNAPSHOT_VERSION_FIELD) {
            None => u64::from(LEGACY_SNAPSHOT_VERSION),
            Some(value) => value.as_u64().ok_or_else(|| {
                FaimError::Parse(format!("{} must be a positive integer", SNAPSHOT_VERSION_FIELD))
            })?,
        };
        Ok(Self { version })
    }

    /// Validate the header.
    pub fn validate(&self) -> Result<(), FaimError> {
        if self.version == 0 {
            return Err(FaimError::Parse(format!(
                "{} must be a positive integer",
                SNAPSHOT_VERSION_FIELD
            )));
        }
        if self.version > u64::from(SNAPSHOT_VERSION) {
            return Err(FaimError::UnsupportedVersion {
                found: self.version,
                supported: SNAPSHOT_VERSION,
            });
        }
        Ok(())
    }
}

#[derive(Serialize)]
struct SnapshotDocument<'a> {
    #[serde(rename = "schemaVersion")]
    schema_version: u64,
    #[serde(flatten)]
    state: &'a ApplicationState,
}

// =============================================================================
// CODEC
// =============================================================================

/// Encode a state as pretty-printed JSON.
///
/// # Errors
///
/// Returns `FaimError::Serialization` if encoding fails.
pub fn serialize_snapshot(state: &ApplicationState) -> Result<String, FaimError> {
    let document = SnapshotDocument {
        schema_version: SnapshotHeader::current().version,
        state,
    };
    serde_json::to_string_pretty(&document)
        .map_err(|e| FaimError::Serialization(format!("Snapshot: {}", e)))
}

/// Decode a snapshot produced by this or an earlier schema version.
///
/// # Errors
///
/// - `FaimError::SnapshotTooLarge` if the text exceeds [`MAX_SNAPSHOT_SIZE`]
/// - `FaimError::UnsupportedVersion` if written by a newer schema
/// - `FaimError::Parse` if the text is malformed or a required field is missing
pub fn deserialize_snapshot(text: &str) -> Result<ApplicationState, FaimError> {
    if text.len() > MAX_SNAPSHOT_SIZE {
        return Err(FaimError::SnapshotTooLarge {
            size: text.len(),
            max: MAX_SNAPSHOT_SIZE,
        });
    }

    let value: Value = serde_json::from_str(text)
        .map_err(|e| FaimError::Parse(format!("Malformed snapshot: {}", e)))?;
    let Value::Object(mut document) = value else {
        return Err(FaimError::Parse(
            "Snapshot must be a JSON object".to_string(),
        ));
    };

    let header = SnapshotHeader::take_from(&mut document)?;
    header.validate()?;

    serde_json::from_value(Value::Object(document))
        .map_err(|e| FaimError::Parse(format!("Invalid snapshot: {}", e)))
}

// =============================================================================
// DIGEST
// =============================================================================

/// BLAKE3 digest of the exported snapshot text, as 64 hex characters.
///
/// # Requires
///
/// Only available with the `crypto-hash` feature enabled.
#[cfg(feature = "crypto-hash")]
pub fn snapshot_digest(state: &ApplicationState) -> Result<String, FaimError> {
    let text = serialize_snapshot(state)?;
    Ok(blake3::hash(text.as_bytes()).to_hex().to_string())
}

/// Check a state against a previously recorded digest.
#[cfg(feature = "crypto-hash")]
pub fn verify_snapshot_digest(state: &ApplicationState, expected: &str) -> Result<bool, FaimError> {
    Ok(snapshot_digest(state)?.eq_ignore_ascii_case(expected.trim()))
}

// =============================================================================
// TESTS
// =============================================================================
