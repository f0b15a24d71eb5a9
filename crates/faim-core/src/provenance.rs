//! # Provenance
//!
//! Injectable time and identifier sources.
//!
//! Every record the engine creates (agents, audit entries, glossary terms)
//! carries an identifier and/or a timestamp. Those come from a [`Provenance`]
//! passed in by the caller rather than from global state, so tests can assert
//! exact audit-entry contents.
//!
//! Timestamps are truncated to whole milliseconds, the precision of the
//! snapshot format, so that export followed by import is lossless.

use chrono::{DateTime, Duration, Utc};
use std::cell::Cell;
use uuid::Uuid;

/// Draws taken from the injected generator before switching to random ids.
const MAX_ID_DRAWS: usize = 64;

// =============================================================================
// TRAITS
// =============================================================================

/// Source of the current time.
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;
}

/// Source of fresh identifiers.
pub trait IdGenerator {
    fn next_id(&self) -> Uuid;
}

// =============================================================================
// SYSTEM SOURCES
// =============================================================================

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Random version-4 UUIDs (122 random bits).
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomIds;

impl IdGenerator for RandomIds {
    fn next_id(&self) -> Uuid {
        Uuid::new_v4()
    }
}

// =============================================================================
// DETERMINISTIC SOURCES
// =============================================================================

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    now: Cell<DateTime<Utc>>,
}

impl ManualClock {
    #[must_use]
    pub fn new(start: DateTime<Utc>) -> Self {
        Self {
            now: Cell::new(start),
        }
    }

    /// Clock starting at the given Unix time in milliseconds.
    ///
    /// Out-of-range values start at the Unix epoch.
    #[must_use]
    pub fn at_millis(millis: i64) -> Self {
        Self::new(DateTime::from_timestamp_millis(millis).unwrap_or_default())
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        let next = self.now.get().checked_add_signed(by).unwrap_or(self.now.get());
        self.now.set(next);
    }

    /// Set the clock to an absolute instant.
    pub fn set(&self, to: DateTime<Utc>) {
        self.now.set(to);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> DateTime<Utc> {
        self.now.get()
    }
}

/// Identifiers `1, 2, 3, ...` encoded as UUIDs.
#[derive(Debug)]
pub struct SequentialIds {
    next: Cell<u128>,
}

impl SequentialIds {
    /// Sequence whose first identifier is `first`.
    #[must_use]
    pub fn starting_at(first: u128) -> Self {
        Self {
            next: Cell::new(first),
        }
    }
}

impl Default for SequentialIds {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl IdGenerator for SequentialIds {
    fn next_id(&self) -> Uuid {
        let id = self.next.get();
        self.next.set(id.wrapping_add(1));
        Uuid::from_u128(id)
    }
}

// =============================================================================
// PROVENANCE
// =============================================================================

/// The pair of sources handed to every operation that creates records.
#[derive(Clone, Copy)]
pub struct Provenance<'a> {
    pub clock: &'a dyn Clock,
    pub ids: &'a dyn IdGenerator,
}

impl Provenance<'static> {
    /// Wall clock and random identifiers.
    #[must_use]
    pub fn system() -> Self {
        Self {
            clock: &SystemClock,
            ids: &RandomIds,
        }
    }
}

impl<'a> Provenance<'a> {
    #[must_use]
    pub fn new(clock: &'a dyn Clock, ids: &'a dyn IdGenerator) -> Self {
        Self { clock, ids }
    }

    /// Current time, truncated to whole milliseconds.
    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        let now = self.clock.now();
        DateTime::from_timestamp_millis(now.timestamp_millis()).unwrap_or(now)
    }

    /// A fresh identifier.
    #[must_use]
    pub fn fresh_id(&self) -> Uuid {
        self.ids.next_id()
    }

    /// A fresh identifier for which `taken` is false.
    ///
    /// A generator that keeps producing taken ids is abandoned after
    /// `MAX_ID_DRAWS` draws in favour of random v4 ids.
    #[must_use]
    pub fn fresh_id_where(&self, taken: impl Fn(Uuid) -> bool) -> Uuid {
        for _ in 0..MAX_ID_DRAWS {
            let id = self.ids.next_id();
            if !taken(id) {
                return id;
            }
        }
        loop {
            let id = Uuid::new_v4();
            if !taken(id) {
                return id;
            }
        }
    }
}

impl std::fmt::Debug for Provenance<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Provenance").finish_non_exhaustive()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequential_ids_increment() {
        let ids = SequentialIds::default();
        assert_eq!(ids.next_id(), Uuid::from_u128(1));
        assert_eq!(ids.next_id(), Uuid::from_u128(2));
    }

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::at_millis(1_000);
        clock.advance(Duration::milliseconds(500));
        assert_eq!(clock.now().timestamp_millis(), 1_500);
    }

    #[test]
    fn provenance_truncates_to_millis() {
        let start = DateTime::from_timestamp(1_700_000_000, 123_456_789).expect("valid instant");
        let clock = ManualClock::new(start);
        let ids = SequentialIds::default();
        let prov = Provenance::new(&clock, &ids);

        let now = prov.now();
        assert_eq!(now.timestamp_subsec_nanos(), 123_000_000);
        assert_eq!(now.timestamp_millis(), start.timestamp_millis());
    }

    struct StuckIds;

    impl IdGenerator for StuckIds {
        fn next_id(&self) -> Uuid {
            Uuid::from_u128(7)
        }
    }

    #[test]
    fn fresh_id_where_skips_taken_ids() {
        let clock = ManualClock::at_millis(0);
        let ids = SequentialIds::default();
        let prov = Provenance::new(&clock, &ids);

        let id = prov.fresh_id_where(|id| id.as_u128() <= 10);
        assert_eq!(id, Uuid::from_u128(11));
    }

    #[test]
    fn fresh_id_where_leaves_a_stuck_generator() {
        let clock = ManualClock::at_millis(0);
        let prov = Provenance::new(&clock, &StuckIds);

        let id = prov.fresh_id_where(|id| id == Uuid::from_u128(7));
        assert_ne!(id, Uuid::from_u128(7));
        assert_eq!(id.get_version_num(), 4);
    }

    #[test]
    fn random_ids_are_v4() {
        let id = RandomIds.next_id();
        assert_eq!(id.get_version_num(), 4);
        assert_ne!(id, RandomIds.next_id());
    }
}
