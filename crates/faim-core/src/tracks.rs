//! # Track Equality Checker
//!
//! Advisory parity check across assessment tracks.
//!
//! Tracks have equal standing when they demand the same goals, the same
//! analysis and the same handling of objections. The evidence each track
//! accepts (`evidenceReq`) is the axis along which alternative tracks are
//! allowed to differ, so [`equal_standing`] does not compare it;
//! [`strict_equal_standing`] additionally requires identical evidence sets.
//!
//! Every projection is canonical: set-valued fields are `BTreeSet`s, and a
//! goal stored as a single string reads the same as a one-item goal list.
//! The verdict does not depend on track order.

use crate::types::{AnalysisRequirement, EvidenceType, Track};
use std::collections::BTreeSet;

/// Canonical view of the policy-relevant fields of one track.
#[derive(Debug, PartialEq, Eq)]
struct Projection<'a> {
    goals: Vec<&'a str>,
    evidence_req: Option<&'a BTreeSet<EvidenceType>>,
    analysis_req: &'a AnalysisRequirement,
    objection_req: bool,
}

impl<'a> Projection<'a> {
    fn of(track: &'a Track, include_evidence: bool) -> Self {
        Self {
            goals: track.goals.entries(),
            evidence_req: include_evidence.then_some(&track.evidence_req),
            analysis_req: &track.analysis_req,
            objection_req: track.objection_req,
        }
    }
}

fn divergence(tracks: &[Track], include_evidence: bool) -> Option<&Track> {
    let (first, rest) = tracks.split_first()?;
    let reference = Projection::of(first, include_evidence);
    rest.iter()
        .find(|track| Projection::of(track, include_evidence) != reference)
}

/// Do all tracks have equal standing?
///
/// Vacuously true for fewer than two tracks.
#[must_use]
pub fn equal_standing(tracks: &[Track]) -> bool {
    divergence(tracks, false).is_none()
}

/// Equal standing that also requires identical `evidenceReq` sets.
#[must_use]
pub fn strict_equal_standing(tracks: &[Track]) -> bool {
    divergence(tracks, true).is_none()
}

/// The first track whose policy fields differ from the first track's.
#[must_use]
pub fn first_divergence(tracks: &[Track]) -> Option<&Track> {
    divergence(tracks, false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::default_tracks;
    use crate::types::Notes;

    #[test]
    fn default_tracks_have_equal_standing() {
        let tracks = default_tracks();
        assert!(equal_standing(&tracks));
        assert!(!strict_equal_standing(&tracks));
    }

    #[test]
    fn fewer_than_two_tracks_is_vacuous() {
        assert!(equal_standing(&[]));
        let one = vec![default_tracks().remove(0)];
        assert!(equal_standing(&one));
        assert!(strict_equal_standing(&one));
    }

    #[test]
    fn differing_goals_break_standing() {
        let mut tracks = default_tracks();
        tracks[1].goals = Notes::Text("Recite the canon".to_string());

        assert!(!equal_standing(&tracks));
        assert_eq!(first_divergence(&tracks).map(|t| t.id.as_str()), Some("B"));
    }

    #[test]
    fn differing_objection_breaks_standing() {
        let mut tracks = default_tracks();
        tracks[0].objection_req = false;
        assert!(!equal_standing(&tracks));
    }

    #[test]
    fn analysis_sets_compare_as_sets() {
        let mut tracks = default_tracks();
        tracks[0].analysis_req = AnalysisRequirement::Items(
            ["concepts", "relations"].into_iter().map(String::from).collect(),
        );
        tracks[1].analysis_req = AnalysisRequirement::Items(
            ["relations", "concepts"].into_iter().map(String::from).collect(),
        );
        assert!(equal_standing(&tracks));
    }

    #[test]
    fn goal_text_matches_single_item_list() {
        let mut tracks = default_tracks();
        tracks[1].goals = Notes::Items(vec!["Demonstrate understanding".to_string()]);
        assert!(equal_standing(&tracks));
    }

    #[test]
    fn order_does_not_matter() {
        let mut tracks = default_tracks();
        tracks[1].goals = Notes::Text("other".to_string());
        let mut reversed = tracks.clone();
        reversed.reverse();
        assert_eq!(equal_standing(&tracks), equal_standing(&reversed));
    }
}
