//! Validation orchestration: issuer matching combined with the Luhn check.
//!
//! A [`Validator`] owns a shared, read-only [`Ruleset`] and turns a raw
//! number string into a [`Verdict`]. Per-call outcomes — unknown issuer,
//! checksum failure, success — are data on the verdict, never errors; only
//! ruleset loading can fail.

use crate::luhn;
use crate::matcher;
use crate::rank;
use crate::rules::Ruleset;
use std::fmt;
use std::sync::Arc;

/// Outcome class of a validation call.
///
/// The numeric value is part of the wire contract and must stay stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum VerdictCode {
    /// The number matched an issuer and passed the checksum.
    Success = 0,
    /// No issuer rule matched the number's length and prefix.
    UnknownIssuer = 1,
    /// An issuer matched but the Luhn checksum failed.
    ChecksumFailed = 2,
}

impl VerdictCode {
    /// Stable numeric code for the wire.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Human-readable message for this outcome.
    pub fn message(self) -> &'static str {
        match self {
            Self::Success => "Success",
            Self::UnknownIssuer => "Unknown Card Number.",
            Self::ChecksumFailed => "Issuer is found but number failed checksum verification.",
        }
    }
}

impl fmt::Display for VerdictCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// The result of validating one card number.
///
/// Produced fresh per call; nothing is shared with other calls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    /// True only when an issuer matched and the checksum passed.
    pub valid: bool,
    /// Best-matching issuer name, or `"Unknown"` when nothing matched.
    pub issuer: String,
    /// Outcome class.
    pub code: VerdictCode,
    /// Specificity of the winning pattern (leading digits constrained).
    pub pattern_match: usize,
    /// The candidate length the winning rule accepted.
    pub length_match: usize,
}

impl Verdict {
    /// Human-readable message for the verdict's outcome.
    pub fn message(&self) -> &'static str {
        self.code.message()
    }

    fn unknown() -> Self {
        Self {
            valid: false,
            issuer: "Unknown".to_string(),
            code: VerdictCode::UnknownIssuer,
            pattern_match: 0,
            length_match: 0,
        }
    }
}

/// Validates card numbers against an injected, shared ruleset.
///
/// Cloning a `Validator` is cheap (it clones the `Arc`), so one can be
/// handed to every request handler. The ruleset is never mutated after
/// load; replacing it means building a new `Ruleset` and constructing a
/// new `Validator` around it.
#[derive(Debug, Clone)]
pub struct Validator {
    ruleset: Arc<Ruleset>,
}

impl Validator {
    /// Creates a validator over the given ruleset.
    pub fn new(ruleset: Arc<Ruleset>) -> Self {
        Self { ruleset }
    }

    /// The ruleset this validator consults.
    pub fn ruleset(&self) -> &Ruleset {
        &self.ruleset
    }

    /// Validates a raw number string and returns the verdict.
    ///
    /// The input is matched and checksummed exactly as given — no
    /// separator stripping or reformatting happens here.
    ///
    /// # Example
    ///
    /// ```
    /// use std::sync::Arc;
    /// use pancheck::{Ruleset, Validator, VerdictCode};
    ///
    /// let ruleset = Ruleset::from_json(
    ///     r#"[{"name": "Visa", "lengths": [13, 16, 19], "patterns": [4]}]"#,
    /// ).unwrap();
    /// let validator = Validator::new(Arc::new(ruleset));
    ///
    /// let verdict = validator.validate("4111111111111111");
    /// assert!(verdict.valid);
    /// assert_eq!(verdict.issuer, "Visa");
    /// assert_eq!(verdict.code, VerdictCode::Success);
    /// ```
    pub fn validate(&self, number: &str) -> Verdict {
        let mut found = matcher::candidates(&self.ruleset, number);

        // No issuer claim at all: the checksum is not even consulted.
        if found.is_empty() {
            return Verdict::unknown();
        }

        rank::rank(&mut found);
        let top = found[0];

        if !luhn::is_valid(number) {
            return Verdict {
                valid: false,
                issuer: top.issuer.to_string(),
                code: VerdictCode::ChecksumFailed,
                pattern_match: top.pattern_match,
                length_match: top.length_match,
            };
        }

        Verdict {
            valid: true,
            issuer: top.issuer.to_string(),
            code: VerdictCode::Success,
            pattern_match: top.pattern_match,
            length_match: top.length_match,
        }
    }
}
