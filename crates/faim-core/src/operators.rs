//! # State Operators
//!
//! Whole-state transitions for the user actions a front end offers.
//!
//! Every operator consumes an [`ApplicationState`] and returns the next one.
//! On error the consumed state is dropped; callers that want to retry keep a
//! clone.
//!
//! Operators validate caller input (blank names, out-of-range scores, unknown
//! agents, missing memos). The component functions they delegate to do not.

use crate::atcf::compute_atcf;
use crate::audit::TrcInput;
use crate::factory::new_agent;
use crate::lexicon::lexicon_extend;
use crate::primitives::{DEFAULT_AUTHOR, MAX_ATCF_SCORE, MAX_TEXT_LENGTH};
use crate::provenance::Provenance;
use crate::rubric::recalibrate;
use crate::types::{AgentId, ApplicationState, FaimError, GateConfig, Notes, Privacy};

// =============================================================================
// INPUT
// =============================================================================

/// Attributes of an agent about to be created.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AgentDraft {
    pub name: String,
    pub identity_kernel: Vec<String>,
    pub assembly_history: Vec<String>,
    pub standpoints: Vec<String>,
    /// ATCF score; `None` leaves the agent unscored.
    pub score: Option<u32>,
}

impl AgentDraft {
    #[must_use]
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Split a comma-separated field into trimmed, non-empty items.
#[must_use]
pub fn split_list(text: &str) -> Vec<String> {
    text.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn require_text(field: &str, value: &str) -> Result<String, FaimError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(FaimError::InvalidInput(format!("{} must not be blank", field)));
    }
    check_length(field, trimmed)?;
    Ok(trimmed.to_string())
}

fn check_length(field: &str, value: &str) -> Result<(), FaimError> {
    if value.len() > MAX_TEXT_LENGTH {
        return Err(FaimError::InvalidInput(format!(
            "{} exceeds maximum length of {} bytes",
            field, MAX_TEXT_LENGTH
        )));
    }
    Ok(())
}

fn clean_items(items: Vec<String>) -> Vec<String> {
    items
        .into_iter()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

// =============================================================================
// AGENTS
// =============================================================================

/// Append a new agent built from a draft.
///
/// # Errors
///
/// `FaimError::InvalidInput` for a blank name or a score above 100.
pub fn add_agent(
    mut state: ApplicationState,
    draft: AgentDraft,
    provenance: &Provenance<'_>,
) -> Result<ApplicationState, FaimError> {
    let name = require_text("agent name", &draft.name)?;
    let score = match draft.score {
        Some(s) if s > u32::from(MAX_ATCF_SCORE) => {
            return Err(FaimError::InvalidInput(format!(
                "ATCF score {} is outside 0..={}",
                s, MAX_ATCF_SCORE
            )));
        }
        other => other.map(|s| s as u8),
    };

    let mut agent = new_agent(name, provenance);
    if state.agent(agent.id).is_some() {
        agent.id = AgentId(provenance.fresh_id_where(|id| state.agent(AgentId(id)).is_some()));
    }
    agent.identity_kernel = clean_items(draft.identity_kernel);
    agent.assembly_history = Notes::Items(clean_items(draft.assembly_history));
    agent.standpoints = clean_items(draft.standpoints).into_iter().collect();
    agent.atcf.score = score;

    state.agents.push(agent);
    Ok(state)
}

/// Remove an agent by id.
///
/// # Errors
///
/// `FaimError::AgentNotFound` if no agent has the id.
pub fn remove_agent(mut state: ApplicationState, id: AgentId) -> Result<ApplicationState, FaimError> {
    let before = state.agents.len();
    state.agents.retain(|a| a.id != id);
    if state.agents.len() == before {
        return Err(FaimError::AgentNotFound(id));
    }
    Ok(state)
}

/// Replace an agent's ATCF score with the placeholder computation.
///
/// # Errors
///
/// `FaimError::AgentNotFound` if no agent has the id.
pub fn rescore_agent(mut state: ApplicationState, id: AgentId) -> Result<ApplicationState, FaimError> {
    let agent = state
        .agents
        .iter_mut()
        .find(|a| a.id == id)
        .ok_or(FaimError::AgentNotFound(id))?;
    agent.atcf.score = Some(compute_atcf(agent));
    Ok(state)
}

// =============================================================================
// WORLD
// =============================================================================

/// Strip non-observable criteria from the world rubric.
#[must_use]
pub fn recalibrate_rubric(mut state: ApplicationState) -> ApplicationState {
    state.world.rubric = recalibrate(&state.world.rubric);
    state
}

/// Propose a glossary term. A blank author falls back to `"student"`.
///
/// # Errors
///
/// `FaimError::InvalidInput` for a blank or oversized term.
pub fn extend_lexicon(
    mut state: ApplicationState,
    term: &str,
    by: &str,
    provenance: &Provenance<'_>,
) -> Result<ApplicationState, FaimError> {
    let term = require_text("term", term)?;
    let by = match by.trim() {
        "" => DEFAULT_AUTHOR.to_string(),
        other => {
            check_length("author", other)?;
            other.to_string()
        }
    };
    state.world.glossary = lexicon_extend(&state.world.glossary, term, by, provenance);
    Ok(state)
}

/// Append a TRC record. Every field may be empty.
///
/// # Errors
///
/// `FaimError::InvalidInput` if a field exceeds the text length limit.
pub fn record_trc(
    mut state: ApplicationState,
    input: TrcInput,
    provenance: &Provenance<'_>,
) -> Result<ApplicationState, FaimError> {
    check_length("truth", &input.truth)?;
    check_length("recognition", &input.recognition)?;
    check_length("remedy", &input.remedy)?;

    let log = std::mem::take(&mut state.world.meta_cons.change_log);
    state.world.meta_cons.change_log = log.append_trc(input, provenance);
    Ok(state)
}

/// Replace the gate configuration, logging the change.
///
/// Returns the state unchanged when `next` equals the current configuration.
/// Every effective change appends a gate-change entry; a change to the
/// required SPTS tags additionally needs a non-blank memo.
///
/// # Errors
///
/// `FaimError::MissingMemo` if `requireSPTS` changes and the memo is blank.
pub fn reconfigure_gates(
    mut state: ApplicationState,
    memo: &str,
    next: GateConfig,
    provenance: &Provenance<'_>,
) -> Result<ApplicationState, FaimError> {
    let previous = &state.world.gate_config;
    if *previous == next {
        return Ok(state);
    }

    let memo = memo.trim();
    if previous.require_spts != next.require_spts && memo.is_empty() {
        return Err(FaimError::MissingMemo);
    }
    check_length("memo", memo)?;

    let log = std::mem::take(&mut state.world.meta_cons.change_log);
    state.world.meta_cons.change_log = log.append_gate_change(memo, previous, &next, provenance);
    state.world.gate_config = next;
    Ok(state)
}

/// Replace the privacy switches.
#[must_use]
pub fn set_privacy(mut state: ApplicationState, privacy: Privacy) -> ApplicationState {
    state.world.privacy = privacy;
    state
}

/// Move the term context to another week.
#[must_use]
pub fn set_term_week(mut state: ApplicationState, week: u32) -> ApplicationState {
    state.world.ctx.term_week = week;
    state
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::audit::LogEntry;
    use crate::factory::{initial_state, new_world};
    use crate::provenance::{ManualClock, SequentialIds};
    use crate::types::{EvidenceType, StandingRule};

    fn fixture() -> (ManualClock, SequentialIds) {
        (ManualClock::at_millis(1_704_067_200_000), SequentialIds::default())
    }

    #[test]
    fn split_list_trims_and_drops_blanks() {
        assert_eq!(split_list(" a, b ,, c ,"), vec!["a", "b", "c"]);
        assert!(split_list("  ").is_empty());
    }

    #[test]
    fn add_agent_cleans_draft() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);
        let draft = AgentDraft {
            name: "  bell hooks ".to_string(),
            identity_kernel: vec!["love ethic".to_string(), " ".to_string()],
            assembly_history: split_list("Kentucky, Stanford"),
            standpoints: split_list("black_woman, teacher, teacher"),
            score: Some(70),
        };

        let state = add_agent(ApplicationState::new(new_world()), draft, &prov).expect("add");
        let agent = &state.agents[0];
        assert_eq!(agent.name, "bell hooks");
        assert_eq!(agent.identity_kernel, vec!["love ethic"]);
        assert_eq!(agent.assembly_history.entries(), vec!["Kentucky", "Stanford"]);
        assert_eq!(agent.standpoints.len(), 2);
        assert_eq!(agent.atcf.score, Some(70));
    }

    #[test]
    fn add_agent_rejects_bad_input() {
        let prov = Provenance::system();
        let empty = ApplicationState::new(new_world());

        let blank = add_agent(empty.clone(), AgentDraft::named("   "), &prov);
        assert!(matches!(blank, Err(FaimError::InvalidInput(_))));

        let draft = AgentDraft {
            score: Some(101),
            ..AgentDraft::named("x")
        };
        assert!(matches!(add_agent(empty, draft, &prov), Err(FaimError::InvalidInput(_))));
    }

    #[test]
    fn remove_and_rescore() {
        let (clock, ids) = fixture();
        let state = initial_state(&Provenance::new(&clock, &ids));
        let first = state.agents[0].id;

        let rescored = rescore_agent(state, first).expect("rescore");
        // 2 IK, 2 SPTS, no AH
        assert_eq!(rescored.agents[0].atcf.score, Some(36));

        let removed = remove_agent(rescored, first).expect("remove");
        assert_eq!(removed.agents.len(), 1);
        assert!(matches!(
            remove_agent(removed, first),
            Err(FaimError::AgentNotFound(id)) if id == first
        ));
    }

    #[test]
    fn replayed_generator_never_duplicates_agent_ids() {
        let (clock, ids) = fixture();
        let state = initial_state(&Provenance::new(&clock, &ids));

        let replay = SequentialIds::default();
        let state = add_agent(state, AgentDraft::named("Hypatia"), &Provenance::new(&clock, &replay))
            .expect("add");

        let unique: std::collections::BTreeSet<_> = state.agents.iter().map(|a| a.id).collect();
        assert_eq!(unique.len(), 3);

        let first = state.agents[0].id;
        let remaining = remove_agent(state, first).expect("remove");
        assert_eq!(remaining.agents.len(), 2);
    }

    #[test]
    fn lexicon_defaults_author() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);
        let state = extend_lexicon(ApplicationState::new(new_world()), " praxis ", "", &prov)
            .expect("extend");
        assert_eq!(state.world.glossary[0].term, "praxis");
        assert_eq!(state.world.glossary[0].by, DEFAULT_AUTHOR);

        let blank = extend_lexicon(state, "  ", "instructor", &prov);
        assert!(matches!(blank, Err(FaimError::InvalidInput(_))));
    }

    #[test]
    fn record_trc_accepts_empty_input() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);
        let state = record_trc(ApplicationState::new(new_world()), TrcInput::default(), &prov)
            .expect("trc");
        assert_eq!(state.world.change_log().trc_entries().count(), 1);
    }

    #[test]
    fn spts_change_requires_memo() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);
        let state = ApplicationState::new(new_world());

        let mut next = state.world.gate_config.clone();
        next.require_spts.insert("free_male_greek".to_string());
        next.standing_rule = StandingRule::RequiresSpts;

        let denied = reconfigure_gates(state.clone(), "  ", next.clone(), &prov);
        assert!(matches!(denied, Err(FaimError::MissingMemo)));

        let state = reconfigure_gates(state, "historical gate", next.clone(), &prov).expect("gate");
        assert_eq!(state.world.gate_config, next);
        match state.world.change_log().last() {
            Some(LogEntry::GateChange(change)) => {
                assert_eq!(change.memo, "historical gate");
                assert_eq!(change.previous, new_world().gate_config);
                assert_eq!(change.next, next);
            }
            other => panic!("expected gate change, got {:?}", other),
        }
    }

    #[test]
    fn evidence_toggle_is_logged_without_memo() {
        let (clock, ids) = fixture();
        let prov = Provenance::new(&clock, &ids);
        let state = ApplicationState::new(new_world());

        let mut next = state.world.gate_config.clone();
        next.evidence_allowed.remove(&EvidenceType::Lived);

        let state = reconfigure_gates(state, "", next, &prov).expect("gate");
        assert_eq!(state.world.change_log().gate_changes().count(), 1);
        assert!(!state.world.gate_config.evidence_allowed.contains(&EvidenceType::Lived));
    }

    #[test]
    fn unchanged_config_is_a_no_op() {
        let state = ApplicationState::new(new_world());
        let same = state.world.gate_config.clone();
        let after = reconfigure_gates(state.clone(), "", same, &Provenance::system()).expect("gate");
        assert_eq!(after, state);
    }

    #[test]
    fn world_setters() {
        let state = recalibrate_rubric(ApplicationState::new(new_world()));
        assert!(crate::rubric::is_calibrated(&state.world.rubric));

        let privacy = Privacy {
            redaction_text: "[redacted]".to_string(),
            ..Privacy::default()
        };
        let state = set_privacy(state, privacy.clone());
        assert_eq!(state.world.privacy, privacy);
        assert_eq!(set_term_week(state, 9).world.ctx.term_week, 9);
    }
}
