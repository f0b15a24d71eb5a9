//! # Entity Factories
//!
//! Default `Agent`, `World` and demo state records.
//!
//! `new_world()` is also the source of every back-fill default used by the
//! snapshot codec: its gate config, privacy switches and constructor list are
//! what older snapshots receive when they lack those substructures.

use crate::audit::AuditLog;
use crate::provenance::Provenance;
use crate::types::{
    Agent, AgentId, AnalysisRequirement, ApplicationState, Atcf, Claim, Context, Criterion,
    EvidenceType, GateConfig, MetaCons, Notes, Privacy, RubricCategory, Track, World,
};
use serde_json::Map;
use std::collections::BTreeSet;

/// Create an agent with a fresh identifier and empty attributes.
#[must_use]
pub fn new_agent(name: impl Into<String>, provenance: &Provenance<'_>) -> Agent {
    Agent {
        id: AgentId(provenance.fresh_id()),
        name: name.into(),
        identity_kernel: Vec::new(),
        assembly_history: Notes::default(),
        standpoints: BTreeSet::new(),
        broa: Map::new(),
        prs: Map::new(),
        atcf: Atcf::default(),
    }
}

/// The default, inclusive world.
///
/// The two seeded tracks differ only in `evidenceReq`, so they have equal
/// standing; the rubric mixes observable and non-observable criteria, so
/// recalibration visibly changes it.
#[must_use]
pub fn new_world() -> World {
    World {
        ctx: Context::default(),
        gate_config: GateConfig::default(),
        glossary: Vec::new(),
        tracks: default_tracks(),
        rubric: default_rubric(),
        constructors: Vec::new(),
        meta_cons: MetaCons {
            change_log: AuditLog::new(),
        },
        privacy: Privacy::default(),
    }
}

/// Textual and relational tracks.
#[must_use]
pub fn default_tracks() -> Vec<Track> {
    let goals = || Notes::Text("Demonstrate understanding".to_string());
    vec![
        Track {
            id: "A".to_string(),
            name: "Textual".to_string(),
            goals: goals(),
            evidence_req: [EvidenceType::Text, EvidenceType::Empirical].into(),
            analysis_req: AnalysisRequirement::Flag(true),
            objection_req: true,
            consent_required: false,
            redaction_enabled: false,
        },
        Track {
            id: "B".to_string(),
            name: "Relational".to_string(),
            goals: goals(),
            evidence_req: [EvidenceType::Lived, EvidenceType::Empirical].into(),
            analysis_req: AnalysisRequirement::Flag(true),
            objection_req: true,
            consent_required: true,
            redaction_enabled: true,
        },
    ]
}

/// Sample rubric: each category has one observable and one non-observable criterion.
#[must_use]
pub fn default_rubric() -> Vec<RubricCategory> {
    vec![
        RubricCategory {
            id: "goals".to_string(),
            label: "States goals clearly".to_string(),
            criteria: vec![
                Criterion::new("States 2–3 goals explicitly", true),
                Criterion::new("Shows scholarly voice", false),
            ],
        },
        RubricCategory {
            id: "analysis".to_string(),
            label: "Analysis quality".to_string(),
            criteria: vec![
                Criterion::new("Explains 3+ core concepts", true),
                Criterion::new("Uses prestigious sources", false),
            ],
        },
    ]
}

/// One preview claim per evidence type.
#[must_use]
pub fn sample_claims() -> Vec<Claim> {
    vec![
        Claim::new("c1", EvidenceType::Text, "Textual citation: Nussbaum (2011)"),
        Claim::new("c2", EvidenceType::Empirical, "Empirical stat: Census data"),
        Claim::new("c3", EvidenceType::Lived, "Lived experience interview (IRB OK)"),
        Claim::new("c4", EvidenceType::Other, "Artwork without context"),
    ]
}

/// Starter state with two illustrative agents and the sample claims.
#[must_use]
pub fn initial_state(provenance: &Provenance<'_>) -> ApplicationState {
    let mut aristotle = new_agent("Aristotle", provenance);
    aristotle.standpoints = ["free_male_greek", "scientist_philosopher"]
        .into_iter()
        .map(String::from)
        .collect();
    aristotle.identity_kernel = vec!["Eudaimonia".to_string(), "Teleology".to_string()];
    aristotle.atcf.score = Some(62);

    let mut collins = new_agent("Patricia Hill Collins", provenance);
    if collins.id == aristotle.id {
        collins.id = AgentId(provenance.fresh_id_where(|id| AgentId(id) == aristotle.id));
    }
    collins.standpoints = ["black_woman", "community_scholar"]
        .into_iter()
        .map(String::from)
        .collect();
    collins.identity_kernel = vec![
        "Lived experience counts".to_string(),
        "Standpoint methodology".to_string(),
    ];
    collins.atcf.score = Some(85);

    ApplicationState {
        agents: vec![aristotle, collins],
        world: new_world(),
        claims: sample_claims(),
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitives::DEFAULT_TERM_WEEK;
    use crate::provenance::{ManualClock, SequentialIds};
    use crate::types::StandingRule;

    #[test]
    fn new_agent_is_empty() {
        let clock = ManualClock::at_millis(0);
        let ids = SequentialIds::default();
        let agent = new_agent("Ada", &Provenance::new(&clock, &ids));

        assert_eq!(agent.name, "Ada");
        assert!(agent.identity_kernel.is_empty());
        assert!(agent.assembly_history.is_empty());
        assert!(agent.standpoints.is_empty());
        assert!(agent.broa.is_empty() && agent.prs.is_empty());
        assert_eq!(agent.atcf.score, None);
    }

    #[test]
    fn new_agents_get_distinct_ids() {
        let prov = Provenance::system();
        let a = new_agent("a", &prov);
        let b = new_agent("b", &prov);
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn new_world_defaults() {
        let world = new_world();
        assert_eq!(world.ctx.term_week, DEFAULT_TERM_WEEK);
        assert_eq!(
            world.gate_config.evidence_allowed,
            BTreeSet::from([
                EvidenceType::Text,
                EvidenceType::Empirical,
                EvidenceType::Lived
            ])
        );
        assert!(world.gate_config.require_spts.is_empty());
        assert_eq!(world.gate_config.standing_rule, StandingRule::Any);
        assert!(world.glossary.is_empty());
        assert!(world.change_log().is_empty());
        assert_eq!(world.tracks.len(), 2);
        assert_ne!(world.tracks[0].evidence_req, world.tracks[1].evidence_req);
    }

    #[test]
    fn default_rubric_has_non_observable_criteria() {
        let rubric = default_rubric();
        assert!(rubric.iter().flat_map(|c| &c.criteria).any(|c| !c.observable));
        assert!(rubric.iter().flat_map(|c| &c.criteria).any(|c| c.observable));
    }

    #[test]
    fn initial_state_has_two_scored_agents() {
        let state = initial_state(&Provenance::system());
        assert_eq!(state.agents.len(), 2);
        assert_eq!(state.agents[0].atcf.score, Some(62));
        assert_eq!(state.agents[1].atcf.score, Some(85));
        assert_eq!(state.claims.len(), 4);
    }
}
