//! # Innate Primitives
//!
//! Hardcoded constants for the FAIM-QIRF rule engine.
//!
//! The engine starts from fixed defaults. These values are compiled into the
//! binary and are immutable at runtime; anything a user may change lives in
//! the `World` record instead.

use crate::types::EvidenceType;

/// Evidence types that form the admissibility baseline.
///
/// Coverage is measured against this set. `EvidenceType::Other` is never part
/// of the baseline.
pub const BASELINE_EVIDENCE: [EvidenceType; 3] = [
    EvidenceType::Text,
    EvidenceType::Empirical,
    EvidenceType::Lived,
];

/// Term week a fresh world starts in.
pub const DEFAULT_TERM_WEEK: u32 = 6;

/// Weeks until a new glossary entry is due for review.
pub const DEFAULT_REVIEW_WEEKS: u32 = 6;

/// Author tag used when a glossary term is proposed without one.
pub const DEFAULT_AUTHOR: &str = "student";

/// Name given to agents created without one.
pub const DEFAULT_AGENT_NAME: &str = "Agent";

/// Upper bound of an ATCF score.
pub const MAX_ATCF_SCORE: u8 = 100;

/// Milliseconds in one day, used for audit latency.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

// =============================================================================
// SNAPSHOT FORMAT
// =============================================================================

/// Current snapshot schema version.
///
/// Increment this when adding substructures that older snapshots lack, and
/// add the matching back-fill default.
pub const SNAPSHOT_VERSION: u32 = 2;

/// Version assumed for snapshots that carry no `schemaVersion` field.
pub const LEGACY_SNAPSHOT_VERSION: u32 = 1;

/// Name of the top-level schema version field.
pub const SNAPSHOT_VERSION_FIELD: &str = "schemaVersion";

/// Conventional file name for exported snapshots.
pub const SNAPSHOT_FILE_NAME: &str = "faim-qirf-demo.json";

/// Maximum accepted snapshot size (16 MiB).
///
/// Checked BEFORE parsing so oversized input never reaches the JSON parser.
pub const MAX_SNAPSHOT_SIZE: usize = 16 * 1024 * 1024;

// =============================================================================
// INPUT VALIDATION LIMITS
// =============================================================================

/// Maximum length for free-text operator inputs (names, terms, memos).
pub const MAX_TEXT_LENGTH: usize = 4096;
