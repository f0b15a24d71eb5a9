//! # ATCF Placeholder Score
//!
//! An illustrative "adaptive temporal coherence" score. It is NOT a scoring
//! model: it rewards filled-in standpoint fields so the dashboard has
//! something to average.
//!
//! `score = min(100, round(10·|IK| + 8·|SPTS| + min(len(AH) / 10, 40)))`
//!
//! Computed in tenths with integer arithmetic.

use crate::primitives::MAX_ATCF_SCORE;
use crate::types::Agent;

const IK_WEIGHT_TENTHS: u64 = 100;
const SPTS_WEIGHT_TENTHS: u64 = 80;
/// Assembly history contributes one tenth per character, capped at 40 points.
const AH_CAP_TENTHS: u64 = 400;

/// Placeholder score for an agent, in `0..=100`.
#[must_use]
pub fn compute_atcf(agent: &Agent) -> u8 {
    let ik = agent.identity_kernel.len() as u64;
    let spts = agent.standpoints.len() as u64;
    let ah = (agent.assembly_history.char_count() as u64).min(AH_CAP_TENTHS);

    let tenths = ik
        .saturating_mul(IK_WEIGHT_TENTHS)
        .saturating_add(spts.saturating_mul(SPTS_WEIGHT_TENTHS))
        .saturating_add(ah);
    let rounded = tenths.saturating_add(5) / 10;

    rounded.min(MAX_ATCF_SCORE as u64) as u8
}
