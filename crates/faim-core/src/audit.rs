//! # Audit Log
//!
//! Append-only record of Truth-Recognition-Remedy (TRC) entries and gate
//! configuration changes.
//!
//! ## Guarantees
//!
//! - Entries are ordered by insertion, not by `createdAt`.
//! - [`AuditLog`] has no operation that removes, edits or reorders an entry.
//!   The only way to grow it is `append_trc` / `append_gate_change`, which
//!   consume the log and return the extended one.
//! - Gate-change entries own copies of both configurations, so later changes
//!   to the live config never reach a logged snapshot.
//! - A new entry never reuses an identifier already present in the log.

use crate::provenance::Provenance;
use crate::types::{EntryId, GateConfig};
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

// =============================================================================
// ENTRIES
// =============================================================================

/// A Truth-Recognition-Remedy record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrcEntry {
    pub id: EntryId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub truth: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub recognition: String,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub remedy: String,
    #[serde(rename = "reviewDate", default, deserialize_with = "review_date")]
    pub review_date: Option<NaiveDate>,
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// A change of gate configuration with its rationale.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateChangeEntry {
    pub id: EntryId,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub memo: String,
    pub previous: GateConfig,
    pub next: GateConfig,
    #[serde(rename = "createdAt", with = "chrono::serde::ts_milliseconds")]
    pub created_at: DateTime<Utc>,
}

/// One audit log entry, tagged by `kind` on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind")]
pub enum LogEntry {
    #[serde(rename = "TRC")]
    Trc(TrcEntry),
    #[serde(rename = "GATE_CHANGE")]
    GateChange(GateChangeEntry),
}

impl LogEntry {
    #[must_use]
    pub fn id(&self) -> EntryId {
        match self {
            LogEntry::Trc(e) => e.id,
            LogEntry::GateChange(e) => e.id,
        }
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        match self {
            LogEntry::Trc(e) => e.created_at,
            LogEntry::GateChange(e) => e.created_at,
        }
    }

    /// Wire tag of this entry.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            LogEntry::Trc(_) => "TRC",
            LogEntry::GateChange(_) => "GATE_CHANGE",
        }
    }
}

/// Fields of a TRC record as supplied by the caller.
///
/// Every field is optional; an empty input still produces an entry.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TrcInput {
    pub truth: String,
    pub recognition: String,
    pub remedy: String,
    pub review_date: Option<NaiveDate>,
}

// =============================================================================
// AUDIT LOG
// =============================================================================

/// The append-only change log.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuditLog {
    entries: Vec<LogEntry>,
}

impl AuditLog {
    /// Create an empty log.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, LogEntry> {
        self.entries.iter()
    }

    /// Entries as a slice, in insertion order.
    #[must_use]
    pub fn as_slice(&self) -> &[LogEntry] {
        &self.entries
    }

    /// The most recently appended entry.
    #[must_use]
    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.last()
    }

    /// Find an entry by id.
    #[must_use]
    pub fn get(&self, id: EntryId) -> Option<&LogEntry> {
        self.entries.iter().find(|e| e.id() == id)
    }

    #[must_use]
    pub fn contains(&self, id: EntryId) -> bool {
        self.get(id).is_some()
    }

    /// TRC entries only, in insertion order.
    pub fn trc_entries(&self) -> impl Iterator<Item = &TrcEntry> {
        self.entries.iter().filter_map(|e| match e {
            LogEntry::Trc(trc) => Some(trc),
            LogEntry::GateChange(_) => None,
        })
    }

    /// Gate-change entries only, in insertion order.
    pub fn gate_changes(&self) -> impl Iterator<Item = &GateChangeEntry> {
        self.entries.iter().filter_map(|e| match e {
            LogEntry::GateChange(change) => Some(change),
            LogEntry::Trc(_) => None,
        })
    }

    /// Append a TRC entry stamped with a fresh id and the current time.
    #[must_use]
    pub fn append_trc(mut self, input: TrcInput, provenance: &Provenance<'_>) -> Self {
        let entry = TrcEntry {
            id: self.fresh_entry_id(provenance),
            truth: input.truth,
            recognition: input.recognition,
            remedy: input.remedy,
            review_date: input.review_date,
            created_at: provenance.now(),
        };
        self.entries.push(LogEntry::Trc(entry));
        self
    }

    /// Append a gate-change entry holding copies of both configurations.
    ///
    /// An empty memo is accepted here; requiring one is the caller's policy
    /// (see [`crate::operators::reconfigure_gates`]).
    #[must_use]
    pub fn append_gate_change(
        mut self,
        memo: impl Into<String>,
        previous: &GateConfig,
        next: &GateConfig,
        provenance: &Provenance<'_>,
    ) -> Self {
        let entry = GateChangeEntry {
            id: self.fresh_entry_id(provenance),
            memo: memo.into(),
            previous: previous.clone(),
            next: next.clone(),
            created_at: provenance.now(),
        };
        self.entries.push(LogEntry::GateChange(entry));
        self
    }

    fn fresh_entry_id(&self, provenance: &Provenance<'_>) -> EntryId {
        EntryId(provenance.fresh_id_where(|id| self.contains(EntryId(id))))
    }
}

impl<'a> IntoIterator for &'a AuditLog {
    type Item = &'a LogEntry;
    type IntoIter = std::slice::Iter<'a, LogEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

// =============================================================================
// WIRE HELPERS
// =============================================================================

fn null_as_empty<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

/// Accepts `null`, `""`, `YYYY-MM-DD`, or a full RFC 3339 timestamp.
fn review_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Ok(Some(date));
    }
    DateTime::parse_from_rfc3339(raw)
        .map(|dt| Some(dt.with_timezone(&Utc).date_naive()))
        .map_err(|_| serde::de::Error::custom(format!("invalid reviewDate '{}'", raw)))
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::provenance::{ManualClock, SequentialIds};
    use crate::types::StandingRule;
    use uuid::Uuid;

    fn fixture() -> (ManualClock, SequentialIds) {
        (ManualClock::at_millis(1_700_000_000_000), SequentialIds::default())
    }

    #[test]
    fn append_trc_defaults_empty_fields() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);

        let log = AuditLog::new().append_trc(TrcInput::default(), &prov);

        assert_eq!(log.len(), 1);
        match log.last() {
            Some(LogEntry::Trc(entry)) => {
                assert_eq!(entry.id, EntryId(Uuid::from_u128(1)));
                assert!(entry.truth.is_empty());
                assert!(entry.recognition.is_empty());
                assert!(entry.remedy.is_empty());
                assert_eq!(entry.review_date, None);
                assert_eq!(entry.created_at.timestamp_millis(), 1_700_000_000_000);
            }
            other => panic!("expected TRC entry, got {:?}", other),
        }
    }

    #[test]
    fn append_preserves_prior_entries_in_order() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);

        let log = AuditLog::new()
            .append_trc(
                TrcInput {
                    truth: "first".to_string(),
                    ..TrcInput::default()
                },
                &prov,
            )
            .append_gate_change("tighten", &GateConfig::default(), &GateConfig::default(), &prov);
        let before = log.clone();
        let log = log.append_trc(TrcInput::default(), &prov);

        assert_eq!(log.len(), before.len() + 1);
        assert_eq!(&log.as_slice()[..before.len()], before.as_slice());
        assert_eq!(log.as_slice()[0].kind(), "TRC");
        assert_eq!(log.as_slice()[1].kind(), "GATE_CHANGE");
    }

    #[test]
    fn gate_change_snapshots_do_not_alias_live_config() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);

        let mut live = GateConfig::default();
        let previous = live.clone();
        live.standing_rule = StandingRule::RequiresSpts;
        live.require_spts.insert("free_male_greek".to_string());

        let log = AuditLog::new().append_gate_change("restrict voice", &previous, &live, &prov);

        live.require_spts.clear();
        live.standing_rule = StandingRule::Any;

        let change = log.gate_changes().next().expect("one gate change");
        assert_eq!(change.previous, GateConfig::default());
        assert_eq!(change.next.standing_rule, StandingRule::RequiresSpts);
        assert!(change.next.require_spts.contains("free_male_greek"));
    }

    #[test]
    fn colliding_ids_are_redrawn() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);
        let log = AuditLog::new().append_trc(TrcInput::default(), &prov);

        let replay = SequentialIds::default();
        let replay_prov = Provenance::new(&clock, &replay);
        let log = log.append_trc(TrcInput::default(), &replay_prov);

        let first = log.as_slice()[0].id();
        let second = log.as_slice()[1].id();
        assert_ne!(first, second);
    }

    #[test]
    fn replayed_generator_never_reuses_ids() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);
        let mut log = AuditLog::new();
        for _ in 0..8 {
            log = log.append_trc(TrcInput::default(), &prov);
        }

        let replay = SequentialIds::default();
        let replay_prov = Provenance::new(&clock, &replay);
        let log = log
            .append_trc(TrcInput::default(), &replay_prov)
            .append_gate_change("replay", &GateConfig::default(), &GateConfig::default(), &replay_prov);

        let unique: std::collections::BTreeSet<_> = log.iter().map(LogEntry::id).collect();
        assert_eq!(unique.len(), log.len());
        assert_eq!(log.as_slice()[8].id(), EntryId(Uuid::from_u128(9)));
    }

    #[test]
    fn trc_entry_wire_format() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);
        let log = AuditLog::new().append_trc(
            TrcInput {
                truth: "t".to_string(),
                review_date: NaiveDate::from_ymd_opt(2024, 5, 1),
                ..TrcInput::default()
            },
            &prov,
        );

        let json = serde_json::to_value(&log).expect("serialize");
        let entry = &json[0];
        assert_eq!(entry["kind"], "TRC");
        assert_eq!(entry["reviewDate"], "2024-05-01");
        assert_eq!(entry["createdAt"], 1_700_000_000_000_i64);
    }

    #[test]
    fn legacy_trc_with_blank_review_date_and_nulls() {
        let json = r#"[{
            "id": "00000000-0000-0000-0000-00000000002a",
            "kind": "TRC",
            "truth": null,
            "remedy": "fund tutoring",
            "reviewDate": "",
            "createdAt": 1700000000000
        }]"#;
        let log: AuditLog = serde_json::from_str(json).expect("parse");
        let entry = log.trc_entries().next().expect("trc");
        assert_eq!(entry.truth, "");
        assert_eq!(entry.recognition, "");
        assert_eq!(entry.remedy, "fund tutoring");
        assert_eq!(entry.review_date, None);
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let json = r#"[{"id":"00000000-0000-0000-0000-000000000001","kind":"DELETE","createdAt":0}]"#;
        assert!(serde_json::from_str::<AuditLog>(json).is_err());
    }
}
