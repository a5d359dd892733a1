//! Candidate ranking: longest distinguishing prefix wins.
//!
//! When several issuers match the same number, the one whose pattern
//! constrains the most leading digits is the real claim — a number inside
//! a 6-digit Elo BIN range is an Elo card even though it also starts with
//! the Visa `4`.

use crate::matcher::MatchCandidate;

/// Sorts candidates descending by prefix-match specificity.
///
/// The sort is stable: candidates with equal specificity keep their rule
/// declaration order, so ties resolve to the earlier rule.
pub fn rank(candidates: &mut [MatchCandidate<'_>]) {
    candidates.sort_by(|a, b| b.pattern_match.cmp(&a.pattern_match));
}
