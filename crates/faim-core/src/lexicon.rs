//! # Lexicon
//!
//! Append-only glossary extension. Entries are never edited or removed.

use crate::primitives::DEFAULT_REVIEW_WEEKS;
use crate::provenance::Provenance;
use crate::types::{EntryId, GlossaryEntry};
use chrono::{DateTime, Duration, Utc};

/// Append a proposed term, dated now and due for review in six weeks.
///
/// The new entry's id is not shared with any entry already in `glossary`.
#[must_use]
pub fn lexicon_extend(
    glossary: &[GlossaryEntry],
    term: impl Into<String>,
    by: impl Into<String>,
    provenance: &Provenance<'_>,
) -> Vec<GlossaryEntry> {
    let id = provenance.fresh_id_where(|id| glossary.iter().any(|e| e.id == Some(EntryId(id))));
    let mut next = glossary.to_vec();
    next.push(GlossaryEntry {
        id: Some(EntryId(id)),
        term: term.into(),
        by: by.into(),
        date: provenance.now(),
        next_review_weeks: DEFAULT_REVIEW_WEEKS,
    });
    next
}

/// When the entry is next due for review.
#[must_use]
pub fn review_due(entry: &GlossaryEntry) -> DateTime<Utc> {
    entry
        .date
        .checked_add_signed(Duration::weeks(i64::from(entry.next_review_weeks)))
        .unwrap_or(entry.date)
}

/// Entries whose review date is at or before `now`, in glossary order.
#[must_use]
pub fn due_for_review(glossary: &[GlossaryEntry], now: DateTime<Utc>) -> Vec<&GlossaryEntry> {
    glossary.iter().filter(|e| review_due(e) <= now).collect()
}
