//! # faim-core
//!
//! The FAIM-QIRF epistemic-justice rule engine - THE LOGIC.
//!
//! This crate models agents with standpoint attributes and a shared world of
//! admissibility gates, assessment tracks, rubric criteria, a glossary and an
//! append-only audit log. It derives gate verdicts, rubric recalibrations,
//! track-parity checks and dashboard metrics from that state, and encodes
//! the whole state as a lossless JSON snapshot.
//!
//! ## Architectural Constraints
//!
//! - The caller owns the single [`ApplicationState`]; the core never retains it
//! - Every operation is a synchronous transform that runs to completion
//! - Gates are stored as declarative [`GateConfig`] data, never as code
//! - Time and identifiers come from an injected [`Provenance`]
//! - Has NO async, NO network, NO file I/O (pure Rust)

// =============================================================================
// MODULES
// =============================================================================

pub mod atcf;
pub mod audit;
pub mod factory;
pub mod gates;
pub mod lexicon;
pub mod metrics;
pub mod operators;
pub mod primitives;
pub mod provenance;
pub mod rubric;
pub mod snapshot;
pub mod tracks;
pub mod types;

// =============================================================================
// RE-EXPORTS: Core Types (from types module)
// =============================================================================

pub use types::{
    Agent, AgentId, AnalysisRequirement, ApplicationState, Atcf, Claim, Context, Criterion,
    EntryId, EvidenceType, FaimError, GateConfig, GlossaryEntry, MetaCons, Notes, Privacy,
    RubricCategory, StandingRule, Track, World,
};

// =============================================================================
// RE-EXPORTS: Rule Engine
// =============================================================================

pub use atcf::compute_atcf;
pub use audit::{AuditLog, GateChangeEntry, LogEntry, TrcEntry, TrcInput};
pub use factory::{initial_state, new_agent, new_world, sample_claims};
pub use gates::{ClaimVerdict, Gates};
pub use lexicon::{due_for_review, lexicon_extend};
pub use metrics::{Metrics, MetricsHealth, compute_metrics, scheduled_latency_days};
pub use operators::{
    AgentDraft, add_agent, extend_lexicon, recalibrate_rubric, reconfigure_gates, record_trc,
    remove_agent, rescore_agent, set_privacy, set_term_week, split_list,
};
pub use provenance::{Clock, IdGenerator, ManualClock, Provenance, RandomIds, SequentialIds, SystemClock};
pub use rubric::recalibrate;
pub use tracks::{equal_standing, first_divergence, strict_equal_standing};

// =============================================================================
// RE-EXPORTS: Snapshot Codec
// =============================================================================

pub use snapshot::{SnapshotHeader, deserialize_snapshot, serialize_snapshot};

#[cfg(feature = "crypto-hash")]
pub use snapshot::{snapshot_digest, verify_snapshot_digest};
