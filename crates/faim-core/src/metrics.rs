//! # Metrics Aggregator
//!
//! Dashboard figures derived from an [`ApplicationState`].
//!
//! Metrics are recomputed from scratch on every call. Nothing is cached and
//! nothing in the state is touched, so the same state always yields the same
//! figures.
//!
//! All arithmetic is integer-only; percentages and means round half up.

use crate::audit::TrcEntry;
use crate::gates::Gates;
use crate::primitives::{BASELINE_EVIDENCE, MILLIS_PER_DAY};
use crate::types::{ApplicationState, World};
use serde::{Deserialize, Serialize};

/// Voice share at or above which the dashboard reports a healthy world.
pub const HEALTHY_VOICE_PERCENT: u64 = 80;

/// Evidence coverage at or above which the dashboard reports a healthy world.
pub const HEALTHY_COVERAGE_PERCENT: u64 = 66;

/// Average TRC latency at or below which the dashboard reports a healthy world.
pub const HEALTHY_LATENCY_DAYS: u64 = 28;

// =============================================================================
// ROUNDING
// =============================================================================

/// `round(num / den)`, half up. Zero when `den` is zero.
#[must_use]
pub fn rounded_div(num: u64, den: u64) -> u64 {
    if den == 0 {
        return 0;
    }
    num.saturating_mul(2).saturating_add(den) / den.saturating_mul(2)
}

/// `round(100 · num / den)`, half up. Zero when `den` is zero.
#[must_use]
pub fn percent(num: u64, den: u64) -> u64 {
    rounded_div(num.saturating_mul(100), den)
}

// =============================================================================
// METRICS
// =============================================================================

/// The five dashboard figures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Metrics {
    /// Share of agents with voice, in percent (0 with no agents).
    #[serde(rename = "percentVoice")]
    pub percent_voice: u64,
    /// Share of baseline evidence types admitted, in percent.
    pub coverage: u64,
    /// Number of glossary entries.
    #[serde(rename = "lexiconSize")]
    pub lexicon_size: usize,
    /// Mean days from TRC creation to review (0 with no TRC entries).
    #[serde(rename = "avgLatencyDays")]
    pub avg_latency_days: u64,
    /// Mean ATCF score, absent when no agent has one.
    #[serde(rename = "avgATCF")]
    pub avg_atcf: Option<u64>,
}

impl Metrics {
    /// Compute metrics from a state.
    #[must_use]
    pub fn from_state(state: &ApplicationState) -> Self {
        compute_metrics(state)
    }

    /// Thresholds met, in dashboard order: voice, coverage, latency.
    #[must_use]
    pub fn health(&self) -> MetricsHealth {
        MetricsHealth {
            voice: self.percent_voice >= HEALTHY_VOICE_PERCENT,
            coverage: self.coverage >= HEALTHY_COVERAGE_PERCENT,
            latency: self.avg_latency_days <= HEALTHY_LATENCY_DAYS,
        }
    }
}

/// Which dashboard thresholds a [`Metrics`] value meets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsHealth {
    pub voice: bool,
    pub coverage: bool,
    pub latency: bool,
}

impl MetricsHealth {
    #[must_use]
    pub fn all_ok(&self) -> bool {
        self.voice && self.coverage && self.latency
    }
}

/// Compute the five dashboard metrics.
#[must_use]
pub fn compute_metrics(state: &ApplicationState) -> Metrics {
    let world = &state.world;
    let gates = Gates::from_config(&world.gate_config);

    let voiced = state.agents.iter().filter(|a| gates.voice(a)).count();
    let percent_voice = percent(voiced as u64, state.agents.len() as u64);

    let coverage = percent(
        gates.baseline_admitted() as u64,
        BASELINE_EVIDENCE.len() as u64,
    );

    Metrics {
        percent_voice,
        coverage,
        lexicon_size: world.glossary.len(),
        avg_latency_days: avg_latency_days(world),
        avg_atcf: avg_atcf(state),
    }
}

// =============================================================================
// LATENCY
// =============================================================================

/// Milliseconds from creation to the review date, floored at zero.
///
/// The review date is taken at UTC midnight. `None` when no review date is set.
fn review_latency_ms(entry: &TrcEntry) -> Option<u64> {
    let review = entry.review_date?.and_hms_opt(0, 0, 0)?.and_utc();
    let delta = review
        .timestamp_millis()
        .saturating_sub(entry.created_at.timestamp_millis());
    Some(delta.max(0) as u64)
}

fn mean_days(total_ms: u64, count: u64) -> u64 {
    rounded_div(total_ms, count.saturating_mul(MILLIS_PER_DAY as u64))
}

/// Mean review latency over all TRC entries, in days.
///
/// Entries without a review date count as zero latency rather than being
/// skipped. See [`scheduled_latency_days`] for the mean over dated entries.
#[must_use]
pub fn avg_latency_days(world: &World) -> u64 {
    let (total, count) = world
        .change_log()
        .trc_entries()
        .fold((0u64, 0u64), |(total, count), entry| {
            let ms = review_latency_ms(entry).unwrap_or(0);
            (total.saturating_add(ms), count + 1)
        });
    mean_days(total, count)
}

/// Mean review latency over TRC entries that have a review date.
///
/// `None` when no TRC entry is dated.
#[must_use]
pub fn scheduled_latency_days(world: &World) -> Option<u64> {
    let (total, count) = world
        .change_log()
        .trc_entries()
        .filter_map(review_latency_ms)
        .fold((0u64, 0u64), |(total, count), ms| {
            (total.saturating_add(ms), count + 1)
        });
    (count > 0).then(|| mean_days(total, count))
}

/// Rounded mean of present ATCF scores.
fn avg_atcf(state: &ApplicationState) -> Option<u64> {
    let scores: Vec<u64> = state
        .agents
        .iter()
        .filter_map(|a| a.atcf.score)
        .map(u64::from)
        .collect();
    if scores.is_empty() {
        return None;
    }
    Some(rounded_div(scores.iter().sum(), scores.len() as u64))
}

// =============================================================================
// TESTS
// =============================================================================
