//! # Core Type Definitions
//!
//! This module contains the data model of the FAIM-QIRF rule engine:
//! - Identifiers (`AgentId`, `EntryId`)
//! - Standpoint records (`Agent`, `Atcf`, `Notes`)
//! - World configuration (`World`, `GateConfig`, `Track`, `RubricCategory`, ...)
//! - Ephemeral inputs (`Claim`)
//! - The single unit of truth (`ApplicationState`)
//! - Error types (`FaimError`)
//!
//! ## Wire Names
//!
//! Every field serializes under the exact name used by exported snapshots
//! (`IK`, `SPTS`, `GateConfig`, `evidenceAllowed`, ...). Sets use `BTreeSet`
//! so that comparison is order-insensitive and output is stable.

use crate::audit::AuditLog;
use crate::primitives::{BASELINE_EVIDENCE, DEFAULT_TERM_WEEK, MAX_ATCF_SCORE};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use uuid::Uuid;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of an agent. Assigned at creation, never changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AgentId(pub Uuid);

impl fmt::Display for AgentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

impl FromStr for AgentId {
    type Err = FaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| FaimError::InvalidInput(format!("agent id '{}': {}", s, e)))
    }
}

/// Identifier of an audit log entry. Never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(pub Uuid);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

// =============================================================================
// EVIDENCE & STANDING
// =============================================================================

/// Kind of evidence a claim rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvidenceType {
    Text,
    Empirical,
    Lived,
    Other,
}

impl EvidenceType {
    /// Every evidence type, in declaration order.
    pub const ALL: [EvidenceType; 4] = [
        EvidenceType::Text,
        EvidenceType::Empirical,
        EvidenceType::Lived,
        EvidenceType::Other,
    ];

    /// Wire name of this evidence type.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            EvidenceType::Text => "text",
            EvidenceType::Empirical => "empirical",
            EvidenceType::Lived => "lived",
            EvidenceType::Other => "other",
        }
    }
}

impl fmt::Display for EvidenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for EvidenceType {
    type Err = FaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        EvidenceType::ALL
            .into_iter()
            .find(|t| t.as_str() == wanted)
            .ok_or_else(|| FaimError::InvalidInput(format!("unknown evidence type '{}'", s)))
    }
}

/// Rule deciding which agents have voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum StandingRule {
    /// Every agent has voice.
    #[default]
    #[serde(rename = "any")]
    Any,
    /// Only agents holding at least one required SPTS tag have voice.
    #[serde(rename = "requiresSPTS")]
    RequiresSpts,
}

impl StandingRule {
    /// Wire name of this rule.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            StandingRule::Any => "any",
            StandingRule::RequiresSpts => "requiresSPTS",
        }
    }
}

impl fmt::Display for StandingRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StandingRule {
    type Err = FaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(StandingRule::Any),
            "requiresspts" | "requires-spts" | "requires_spts" => Ok(StandingRule::RequiresSpts),
            _ => Err(FaimError::InvalidInput(format!(
                "unknown standing rule '{}'",
                s
            ))),
        }
    }
}

// =============================================================================
// FREE-TEXT NOTES
// =============================================================================

/// A field that older snapshots store either as one string or as a list.
///
/// Used for assembly history (`AH`) and track goals.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Notes {
    Text(String),
    Items(Vec<String>),
}

impl Default for Notes {
    fn default() -> Self {
        Notes::Items(Vec::new())
    }
}

impl Notes {
    /// Non-blank entries, trimmed, in stored order.
    ///
    /// A single text value reads as a one-item list, so `"x"` and `["x"]`
    /// compare equal through this view.
    #[must_use]
    pub fn entries(&self) -> Vec<&str> {
        match self {
            Notes::Text(text) => {
                let text = text.trim();
                if text.is_empty() { Vec::new() } else { vec![text] }
            }
            Notes::Items(items) => items
                .iter()
                .map(|s| s.trim())
                .filter(|s| !s.is_empty())
                .collect(),
        }
    }

    /// Number of characters across all entries, ignoring surrounding whitespace.
    #[must_use]
    pub fn char_count(&self) -> usize {
        self.entries().iter().map(|s| s.chars().count()).sum()
    }

    /// True when there is no non-blank entry.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries().is_empty()
    }
}

// =============================================================================
// AGENT
// =============================================================================

/// Placeholder coherence score attached to an agent.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Atcf {
    /// Score in `0..=100`, absent until assigned.
    #[serde(default, deserialize_with = "lenient_score")]
    pub score: Option<u8>,
    #[serde(default)]
    pub notes: String,
}

/// Accepts `null` or any JSON number. Fractions round half up and the result
/// is clamped to `0..=100`, so hand-entered scores like `72.5` still import.
fn lenient_score<'de, D>(deserializer: D) -> Result<Option<u8>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(number) = Option::<serde_json::Number>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let score = match (number.as_u64(), number.as_i64()) {
        (Some(n), _) => n,
        (None, Some(_)) => 0,
        (None, None) => number.as_f64().map_or(0, |f| f.round() as u64),
    };
    Ok(Some(score.min(u64::from(MAX_ATCF_SCORE)) as u8))
}

/// An agent and its standpoint attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Agent {
    pub id: AgentId,
    pub name: String,
    /// Identity kernel descriptors.
    #[serde(rename = "IK", default)]
    pub identity_kernel: Vec<String>,
    /// Assembly history notes.
    #[serde(rename = "AH", default)]
    pub assembly_history: Notes,
    /// Standpoint tags (skills, practices, tools, standards).
    #[serde(rename = "SPTS", default)]
    pub standpoints: BTreeSet<String>,
    /// Beliefs/rules/ontology/authenticity notes.
    #[serde(rename = "BROA", default)]
    pub broa: Map<String, Value>,
    /// Phenomenal reference space notes.
    #[serde(rename = "PRS", default)]
    pub prs: Map<String, Value>,
    #[serde(rename = "ATCF", default)]
    pub atcf: Atcf,
}

// =============================================================================
// CLAIM
// =============================================================================

/// A claim offered to the evidence gate. Never stored in the world.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: String,
    /// Evidence type; a claim without one never passes the gate.
    #[serde(rename = "type", default)]
    pub evidence: Option<EvidenceType>,
    #[serde(default)]
    pub label: String,
}

impl Claim {
    /// Create a claim of the given evidence type.
    #[must_use]
    pub fn new(id: impl Into<String>, evidence: EvidenceType, label: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            evidence: Some(evidence),
            label: label.into(),
        }
    }
}

// =============================================================================
// GATE CONFIGURATION
// =============================================================================

/// Declarative admissibility configuration.
///
/// Gate predicates are derived from this data on demand (see [`crate::gates`]);
/// nothing executable is ever stored in state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    #[serde(rename = "evidenceAllowed")]
    pub evidence_allowed: BTreeSet<EvidenceType>,
    #[serde(rename = "requireSPTS")]
    pub require_spts: BTreeSet<String>,
    #[serde(rename = "standingRule")]
    pub standing_rule: StandingRule,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            evidence_allowed: BASELINE_EVIDENCE.into_iter().collect(),
            require_spts: BTreeSet::new(),
            standing_rule: StandingRule::Any,
        }
    }
}

// =============================================================================
// TRACKS
// =============================================================================

/// Analysis requirement of a track: a plain flag or a set of named items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AnalysisRequirement {
    Flag(bool),
    Items(BTreeSet<String>),
}

impl Default for AnalysisRequirement {
    fn default() -> Self {
        AnalysisRequirement::Flag(false)
    }
}

/// An assessment track students may follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    #[serde(alias = "label")]
    pub name: String,
    #[serde(default)]
    pub goals: Notes,
    #[serde(rename = "evidenceReq", default)]
    pub evidence_req: BTreeSet<EvidenceType>,
    #[serde(rename = "analysisReq", default)]
    pub analysis_req: AnalysisRequirement,
    #[serde(rename = "objectionReq", default)]
    pub objection_req: bool,
    #[serde(rename = "consentRequired", default)]
    pub consent_required: bool,
    #[serde(rename = "redactionEnabled", default)]
    pub redaction_enabled: bool,
}

// =============================================================================
// RUBRIC
// =============================================================================

/// A single grading item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criterion {
    #[serde(alias = "label")]
    pub name: String,
    /// Missing reads as non-observable, so recalibration removes it.
    #[serde(default)]
    pub observable: bool,
}

impl Criterion {
    #[must_use]
    pub fn new(name: impl Into<String>, observable: bool) -> Self {
        Self {
            name: name.into(),
            observable,
        }
    }
}

/// A rubric category and its ordered criteria.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RubricCategory {
    pub id: String,
    pub label: String,
    #[serde(default)]
    pub criteria: Vec<Criterion>,
}

// =============================================================================
// GLOSSARY
// =============================================================================

/// A proposed glossary term. Glossary entries are append-only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlossaryEntry {
    /// Absent on entries written before terms carried identifiers.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<EntryId>,
    pub term: String,
    /// Author tag.
    pub by: String,
    pub date: DateTime<Utc>,
    #[serde(rename = "nextReviewWeeks")]
    pub next_review_weeks: u32,
}

// =============================================================================
// WORLD
// =============================================================================

/// Term context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Context {
    #[serde(rename = "termWeek")]
    pub term_week: u32,
}

impl Default for Context {
    fn default() -> Self {
        Self {
            term_week: DEFAULT_TERM_WEEK,
        }
    }
}

/// Meta-constructor record holding the audit log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MetaCons {
    #[serde(rename = "changeLog", default)]
    pub change_log: AuditLog,
}

/// Privacy switches for lived-experience evidence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Privacy {
    #[serde(rename = "requireConsent")]
    pub require_consent: bool,
    #[serde(rename = "allowNoLivedPath")]
    pub allow_no_lived_path: bool,
    #[serde(rename = "redactionText")]
    pub redaction_text: String,
}

impl Default for Privacy {
    fn default() -> Self {
        Self {
            require_consent: true,
            allow_no_lived_path: true,
            redaction_text: String::new(),
        }
    }
}

/// The shared world: gates, tracks, rubric, glossary and audit log.
///
/// `GateConfig`, `Constructors` and `Privacy` are optional on import and
/// back-filled with defaults; the other fields are required.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct World {
    #[serde(rename = "Ctx")]
    pub ctx: Context,
    #[serde(rename = "GateConfig", default)]
    pub gate_config: GateConfig,
    #[serde(rename = "Glossary")]
    pub glossary: Vec<GlossaryEntry>,
    #[serde(rename = "Tracks")]
    pub tracks: Vec<Track>,
    #[serde(rename = "Rubric")]
    pub rubric: Vec<RubricCategory>,
    /// Unused extension point, carried through unchanged.
    #[serde(rename = "Constructors", default)]
    pub constructors: Vec<Value>,
    #[serde(rename = "MetaCons")]
    pub meta_cons: MetaCons,
    #[serde(rename = "Privacy", default)]
    pub privacy: Privacy,
}

impl World {
    /// The append-only audit log.
    #[must_use]
    pub fn change_log(&self) -> &AuditLog {
        &self.meta_cons.change_log
    }
}

// =============================================================================
// APPLICATION STATE
// =============================================================================

/// The sole unit of truth held by the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApplicationState {
    pub agents: Vec<Agent>,
    pub world: World,
    /// Ephemeral preview claims; omitted from snapshots when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub claims: Vec<Claim>,
}

impl ApplicationState {
    /// State with no agents and the given world.
    #[must_use]
    pub fn new(world: World) -> Self {
        Self {
            agents: Vec::new(),
            world,
            claims: Vec::new(),
        }
    }

    /// Look up an agent by id.
    #[must_use]
    pub fn agent(&self, id: AgentId) -> Option<&Agent> {
        self.agents.iter().find(|a| a.id == id)
    }
}

// =============================================================================
// ERROR TYPES
// =============================================================================

/// Errors that can occur in the FAIM-QIRF engine.
///
/// - No silent failures for caller input
/// - Degenerate metric denominators are NOT errors (they yield 0 or `None`)
/// - The engine never panics; all errors are recoverable by the caller
#[derive(Debug, Error)]
pub enum FaimError {
    /// Snapshot text is malformed or lacks a required field.
    #[error("Parse error: {0}")]
    Parse(String),

    /// Snapshot was written by a newer schema.
    #[error("Unsupported snapshot version: {found} (newest supported {supported})")]
    UnsupportedVersion { found: u64, supported: u32 },

    /// Snapshot exceeds the accepted size.
    #[error("Snapshot of {size} bytes exceeds maximum allowed {max} bytes")]
    SnapshotTooLarge { size: usize, max: usize },

    /// Encoding a snapshot failed.
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Caller supplied an unusable parameter.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An SPTS requirement change was attempted without a memo.
    #[error("A memo is required to change the SPTS requirement")]
    MissingMemo,

    /// No agent with the given id exists.
    #[error("Agent not found: {0}")]
    AgentNotFound(AgentId),

    /// An I/O error occurred (front ends only; the core performs no I/O).
    #[error("I/O error: {0}")]
    Io(String),
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evidence_type_wire_names() {
        let json = serde_json::to_string(&EvidenceType::Empirical).expect("serialize");
        assert_eq!(json, "\"empirical\"");
        let back: EvidenceType = serde_json::from_str("\"lived\"").expect("parse");
        assert_eq!(back, EvidenceType::Lived);
    }

    #[test]
    fn evidence_type_from_str_is_case_insensitive() {
        assert_eq!("TEXT".parse::<EvidenceType>().expect("parse"), EvidenceType::Text);
        assert!("interview".parse::<EvidenceType>().is_err());
    }

    #[test]
    fn standing_rule_wire_names() {
        let json = serde_json::to_string(&StandingRule::RequiresSpts).expect("serialize");
        assert_eq!(json, "\"requiresSPTS\"");
        assert_eq!(
            "requires-spts".parse::<StandingRule>().expect("parse"),
            StandingRule::RequiresSpts
        );
    }

    #[test]
    fn notes_text_and_single_item_agree() {
        let text = Notes::Text("  Demonstrate understanding ".to_string());
        let items = Notes::Items(vec!["Demonstrate understanding".to_string()]);
        assert_eq!(text.entries(), items.entries());
        assert!(Notes::Text("   ".to_string()).is_empty());
    }

    #[test]
    fn notes_accepts_both_shapes() {
        let a: Notes = serde_json::from_str("\"free text\"").expect("text");
        let b: Notes = serde_json::from_str("[\"one\", \"two\"]").expect("list");
        assert_eq!(a, Notes::Text("free text".to_string()));
        assert_eq!(b.char_count(), 6);
    }

    #[test]
    fn analysis_requirement_compares_as_set() {
        let a: AnalysisRequirement =
            serde_json::from_str("[\"concepts\", \"relations\"]").expect("parse");
        let b: AnalysisRequirement =
            serde_json::from_str("[\"relations\", \"concepts\"]").expect("parse");
        assert_eq!(a, b);
        let flag: AnalysisRequirement = serde_json::from_str("true").expect("parse");
        assert_eq!(flag, AnalysisRequirement::Flag(true));
    }

    #[test]
    fn claim_without_type_parses_as_untyped() {
        let claim: Claim = serde_json::from_str(r#"{"id":"c9","label":"?"}"#).expect("parse");
        assert_eq!(claim.evidence, None);
    }

    #[test]
    fn criterion_accepts_label_alias() {
        let c: Criterion =
            serde_json::from_str(r#"{"key":"vibes","label":"Feels sophisticated"}"#)
                .expect("parse");
        assert_eq!(c.name, "Feels sophisticated");
        assert!(!c.observable);
    }

    #[test]
    fn partial_gate_config_fills_defaults() {
        let cfg: GateConfig = serde_json::from_str(r#"{"standingRule":"requiresSPTS"}"#)
            .expect("parse");
        assert_eq!(cfg.standing_rule, StandingRule::RequiresSpts);
        assert_eq!(cfg.evidence_allowed, GateConfig::default().evidence_allowed);
    }

    #[test]
    fn agent_id_parse_rejects_garbage() {
        assert!("not-a-uuid".parse::<AgentId>().is_err());
        let id: AgentId = "00000000-0000-0000-0000-000000000001".parse().expect("parse");
        assert_eq!(id, AgentId(Uuid::from_u128(1)));
    }

    #[test]
    fn atcf_score_rounds_and_clamps() {
        let score = |json: &str| serde_json::from_str::<Atcf>(json).expect("parse").score;
        assert_eq!(score(r#"{"score":72.5}"#), Some(73));
        assert_eq!(score(r#"{"score":72.4}"#), Some(72));
        assert_eq!(score(r#"{"score":250}"#), Some(100));
        assert_eq!(score(r#"{"score":-3}"#), Some(0));
        assert_eq!(score(r#"{"score":null}"#), None);
        assert_eq!(score("{}"), None);
        assert!(serde_json::from_str::<Atcf>(r#"{"score":"high"}"#).is_err());
    }

    #[test]
    fn glossary_entry_id_is_optional() {
        let legacy: GlossaryEntry = serde_json::from_str(
            r#"{"term":"praxis","by":"student","date":"2024-01-01T00:00:00Z","nextReviewWeeks":6}"#,
        )
        .expect("parse");
        assert_eq!(legacy.id, None);
        let json = serde_json::to_value(&legacy).expect("serialize");
        assert!(json.get("id").is_none());
    }
}
