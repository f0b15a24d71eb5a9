//! # Gate Evaluator
//!
//! Admissibility predicates derived from a [`GateConfig`].
//!
//! Gates are never stored. [`Gates`] borrows the configuration and answers
//! questions about it, so rebuilding the gates after every config change is
//! free and exported state stays pure data.
//!
//! All gates fail closed: a claim without an evidence type, or an agent
//! without standpoint tags under a restrictive rule, does not pass.

use crate::primitives::BASELINE_EVIDENCE;
use crate::types::{Agent, Claim, EvidenceType, GateConfig, StandingRule};

/// The three admissibility predicates for one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Gates<'a> {
    config: &'a GateConfig,
}

impl<'a> Gates<'a> {
    /// Derive the gates for a configuration.
    #[must_use]
    pub fn from_config(config: &'a GateConfig) -> Self {
        Self { config }
    }

    /// Does the agent have voice?
    ///
    /// Always true under `StandingRule::Any`. Under `RequiresSpts` the agent
    /// needs at least one tag from `requireSPTS`; an empty requirement set
    /// therefore silences everyone.
    #[must_use]
    pub fn voice(&self, agent: &Agent) -> bool {
        match self.config.standing_rule {
            StandingRule::Any => true,
            StandingRule::RequiresSpts => agent
                .standpoints
                .iter()
                .any(|tag| self.config.require_spts.contains(tag)),
        }
    }

    /// Does the agent have standing? No policy restricts standing yet.
    #[must_use]
    pub fn standing(&self, _agent: &Agent) -> bool {
        true
    }

    /// Is the claim's evidence admissible?
    #[must_use]
    pub fn evidence(&self, claim: &Claim) -> bool {
        claim.evidence.is_some_and(|kind| self.admits(kind))
    }

    /// Probe the evidence gate with a bare evidence type.
    #[must_use]
    pub fn admits(&self, kind: EvidenceType) -> bool {
        self.config.evidence_allowed.contains(&kind)
    }

    /// Number of baseline evidence types currently admitted.
    #[must_use]
    pub fn baseline_admitted(&self) -> usize {
        BASELINE_EVIDENCE
            .iter()
            .filter(|kind| self.admits(**kind))
            .count()
    }

    /// Gate verdict for each claim, in input order.
    #[must_use]
    pub fn preview<'c>(&self, claims: &'c [Claim]) -> Vec<ClaimVerdict<'c>> {
        claims
            .iter()
            .map(|claim| ClaimVerdict {
                claim,
                admitted: self.evidence(claim),
            })
            .collect()
    }

    /// Rounded percentage of claims that pass the evidence gate (0 when empty).
    #[must_use]
    pub fn evidence_pass_rate(&self, claims: &[Claim]) -> u64 {
        let passed = claims.iter().filter(|c| self.evidence(c)).count();
        crate::metrics::percent(passed as u64, claims.len() as u64)
    }
}

/// Outcome of the evidence gate for one claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClaimVerdict<'c> {
    pub claim: &'c Claim,
    pub admitted: bool,
}

// =============================================================================
// TESTS
// =============================================================================
