//! Issuer matching: scoring a candidate number against the ruleset.
//!
//! Several networks can claim the same leading digits at different
//! specificities (a 16-digit number starting `401178` satisfies both the
//! Visa `4` prefix and an Elo BIN range), so matching produces the full
//! list of candidates with a specificity score instead of a single answer.
//! Ranking happens separately in [`crate::rank`].

use crate::rules::{PatternSpec, Ruleset};

/// One issuer that matched a candidate number.
///
/// `pattern_match` is the number of leading digits the winning pattern
/// constrains; a longer prefix means a more specific claim on the number.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchCandidate<'a> {
    /// Name of the matching issuer, borrowed from the ruleset.
    pub issuer: &'a str,
    /// Decimal length of the matched pattern's base value.
    pub pattern_match: usize,
    /// The candidate's own length.
    pub length_match: usize,
}

/// Scores `number` against every rule in the set.
///
/// Returns one [`MatchCandidate`] per rule whose length list and one of
/// whose patterns accept the number, in rule declaration order. Any
/// non-digit character in the input disqualifies it entirely.
///
/// Per rule, patterns are tried in declaration order and the first match
/// wins; a rule contributes at most one candidate.
///
/// # Example
///
/// ```
/// use pancheck::{matcher, Ruleset};
///
/// let ruleset = Ruleset::from_json(
///     r#"[{"name": "Visa", "lengths": [16], "patterns": [4]}]"#,
/// ).unwrap();
///
/// let found = matcher::candidates(&ruleset, "4111111111111111");
/// assert_eq!(found.len(), 1);
/// assert_eq!(found[0].issuer, "Visa");
/// assert_eq!(found[0].pattern_match, 1);
/// assert_eq!(found[0].length_match, 16);
/// ```
pub fn candidates<'a>(ruleset: &'a Ruleset, number: &str) -> Vec<MatchCandidate<'a>> {
    // Non-digit input is rejected before any length or pattern check.
    if number.bytes().any(|b| !b.is_ascii_digit()) {
        return Vec::new();
    }

    let len = number.len();
    let mut found = Vec::new();

    for rule in ruleset.rules() {
        // Lengths are discrete values, not a min..max span: a length miss
        // disqualifies the rule before any pattern is examined.
        if !rule.lengths.contains(&len) {
            continue;
        }

        for pattern in &rule.patterns {
            if !pattern_matches(pattern, number) {
                continue;
            }

            let base_len = base_length(pattern);
            found.push(MatchCandidate {
                issuer: rule.name.as_str(),
                pattern_match: if len >= base_len { base_len } else { 0 },
                length_match: len,
            });
            break;
        }
    }

    found
}

/// Decimal-string length of the pattern's base value.
fn base_length(pattern: &PatternSpec) -> usize {
    match *pattern {
        PatternSpec::Exact(value) => value.to_string().len(),
        PatternSpec::Range { min, .. } => min.to_string().len(),
    }
}

fn pattern_matches(pattern: &PatternSpec, number: &str) -> bool {
    match *pattern {
        PatternSpec::Exact(value) => {
            let prefix = value.to_string();
            prefix.len() <= number.len() && number.as_bytes()[..prefix.len()] == *prefix.as_bytes()
        }
        PatternSpec::Range { min, max } => {
            // The minimum value's digit count sets the compared prefix
            // length; both bounds are truncated to that same length before
            // the numeric comparison. Variable-length BIN ranges depend on
            // this truncation, so it must not be "simplified".
            let min_s = min.to_string();
            let base_len = min_s.len();
            if base_len > number.len() {
                return false;
            }

            let sub = &number[..base_len];
            let candidate: u64 = match sub.parse() {
                Ok(v) => v,
                Err(_) => return false,
            };
            let lo: u64 = match min_s[..sub.len()].parse() {
                Ok(v) => v,
                Err(_) => return false,
            };
            let max_s = max.to_string();
            let hi: u64 = match max_s.get(..sub.len()).and_then(|s| s.parse().ok()) {
                Some(v) => v,
                None => return false,
            };

            candidate >= lo && candidate <= hi
        }
    }
}
