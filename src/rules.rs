//! Issuer ruleset loading.
//!
//! Card issuers are described by a JSON document rather than hard-coded
//! tables, so adding a network or adjusting a BIN range is a data change.
//! Each rule carries the issuer name, the card lengths it accepts, and an
//! ordered list of prefix patterns.
//!
//! # Format
//!
//! ```json
//! [
//!   {
//!     "name": "Visa",
//!     "lengths": [13, 16, 19],
//!     "patterns": [4]
//!   },
//!   {
//!     "name": "MasterCard",
//!     "lengths": 16,
//!     "patterns": [[51, 55], [2221, 2720]]
//!   }
//! ]
//! ```
//!
//! `lengths` may be a single integer or a list. Each pattern entry is
//! either a single non-negative integer (an exact prefix) or a two-element
//! `[min, max]` list (an inclusive prefix range). Anything else fails the
//! load with an error naming the offending field.
//!
//! A ruleset is built completely before it is returned; a failed load can
//! never leave a half-applied ruleset behind.

use serde::Deserialize;
use serde_json::Value;
use std::fmt;
use std::fs;
use std::io::Read;
use std::path::Path;

/// A single prefix constraint, decided at parse time.
///
/// Issuers use both plain prefixes (Visa numbers start with `4`) and
/// inclusive ranges (MasterCard spans `51`-`55` and `2221`-`2720`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatternSpec {
    /// The candidate's leading digits must equal this value exactly.
    Exact(u64),
    /// The candidate's prefix, truncated to the digit-length of `min`,
    /// must fall within the inclusive range.
    Range {
        /// Lower bound; its decimal length is the compared prefix length.
        min: u64,
        /// Upper bound, inclusive.
        max: u64,
    },
}

/// One issuer's accepted lengths and prefix patterns.
///
/// Patterns are kept in declaration order; the matcher stops at the first
/// pattern that matches a candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuerRule {
    /// Issuer display name, e.g. `"Visa"`.
    pub name: String,
    /// Accepted card lengths. Discrete values, not a range: Discover and
    /// Diners both skip lengths in the middle of their spans.
    pub lengths: Vec<usize>,
    /// Prefix patterns, evaluated in order.
    pub patterns: Vec<PatternSpec>,
}

/// An immutable collection of issuer rules.
///
/// Loaded once at startup and shared read-only across request handlers
/// (typically behind an `Arc`). Replacing it means loading a complete new
/// `Ruleset` and swapping the `Arc` in one step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ruleset {
    rules: Vec<IssuerRule>,
}

impl Ruleset {
    /// Loads a ruleset from a JSON file.
    ///
    /// An empty path or an unreadable file is a fatal configuration
    /// problem and fails the load.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, RulesetError> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(RulesetError::EmptyPath);
        }
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Loads a ruleset from a reader.
    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self, RulesetError> {
        let mut content = String::new();
        reader.read_to_string(&mut content)?;
        Self::from_json(&content)
    }

    /// Parses a ruleset from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, RulesetError> {
        if json.trim().is_empty() {
            return Err(RulesetError::EmptyDocument);
        }

        let raw: Vec<RawRule> = serde_json::from_str(json).map_err(RulesetError::Json)?;

        let mut rules = Vec::with_capacity(raw.len());
        for entry in raw {
            rules.push(entry.into_rule()?);
        }

        Ok(Self { rules })
    }

    /// The loaded rules, in declaration order.
    pub fn rules(&self) -> &[IssuerRule] {
        &self.rules
    }

    /// Returns the number of rules in the set.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Returns true if the set contains no rules.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

/// Raw rule as it appears on the wire, before field validation.
///
/// `lengths` and `patterns` are captured as loose JSON values so the
/// conversion step can produce field-specific errors instead of a generic
/// serde type mismatch.
#[derive(Debug, Deserialize)]
struct RawRule {
    name: String,
    #[serde(default)]
    lengths: Value,
    #[serde(default)]
    patterns: Vec<Value>,
}

impl RawRule {
    fn into_rule(self) -> Result<IssuerRule, RulesetError> {
        let lengths = parse_lengths(&self.lengths)?;

        if self.patterns.is_empty() {
            return Err(RulesetError::parse(RuleField::Patterns, ParseFault::EmptyList));
        }
        let mut patterns = Vec::with_capacity(self.patterns.len());
        for value in &self.patterns {
            patterns.push(parse_pattern(value)?);
        }

        Ok(IssuerRule {
            name: self.name,
            lengths,
            patterns,
        })
    }
}

fn parse_lengths(value: &Value) -> Result<Vec<usize>, RulesetError> {
    match value {
        Value::Array(items) => {
            if items.is_empty() {
                return Err(RulesetError::parse(RuleField::Lengths, ParseFault::EmptyList));
            }
            items.iter().map(parse_length).collect()
        }
        // A lone integer is shorthand for a one-element list.
        Value::Number(_) => Ok(vec![parse_length(value)?]),
        _ => Err(RulesetError::parse(RuleField::Lengths, ParseFault::Unparseable)),
    }
}

fn parse_length(value: &Value) -> Result<usize, RulesetError> {
    let n = value
        .as_i64()
        .ok_or_else(|| RulesetError::parse(RuleField::Lengths, ParseFault::NotPositiveInteger))?;
    if n < 0 {
        return Err(RulesetError::parse(RuleField::Lengths, ParseFault::NegativeValue));
    }
    Ok(n as usize)
}

fn parse_pattern(value: &Value) -> Result<PatternSpec, RulesetError> {
    match value {
        Value::Array(items) => match items.len() {
            0 => Err(RulesetError::parse(RuleField::Patterns, ParseFault::EmptyRange)),
            1 => Err(RulesetError::parse(RuleField::Patterns, ParseFault::MissingMax)),
            _ => {
                let min = parse_bound(&items[0])?;
                let max = parse_bound(&items[1])?;
                Ok(PatternSpec::Range { min, max })
            }
        },
        Value::Number(_) => Ok(PatternSpec::Exact(parse_bound(value)?)),
        _ => Err(RulesetError::parse(RuleField::Patterns, ParseFault::NotPositiveInteger)),
    }
}

fn parse_bound(value: &Value) -> Result<u64, RulesetError> {
    let n = value
        .as_i64()
        .ok_or_else(|| RulesetError::parse(RuleField::Patterns, ParseFault::NotPositiveInteger))?;
    if n < 0 {
        return Err(RulesetError::parse(RuleField::Patterns, ParseFault::NegativeValue));
    }
    Ok(n as u64)
}

/// Which rule field a parse failure occurred in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RuleField {
    /// The `lengths` field.
    Lengths,
    /// The `patterns` field.
    Patterns,
}

impl fmt::Display for RuleField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lengths => write!(f, "Lengths:"),
            Self::Patterns => write!(f, "Patterns:"),
        }
    }
}

/// What went wrong with a rule field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParseFault {
    /// The value was not a plain non-negative integer.
    NotPositiveInteger,
    /// The value was a negative integer.
    NegativeValue,
    /// A range was given as `[]`.
    EmptyRange,
    /// A range was given with only a minimum value.
    MissingMax,
    /// The field's list contained no entries.
    EmptyList,
    /// The field had an unrecognized shape.
    Unparseable,
}

impl fmt::Display for ParseFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotPositiveInteger => write!(f, "Value should be a valid positive integer."),
            Self::NegativeValue => write!(f, "Value cannot be a negative integer."),
            Self::EmptyRange => write!(f, "Unable to parse an empty range []."),
            Self::MissingMax => write!(f, "Unable to parse range without max value [min, max]."),
            Self::EmptyList => write!(f, "Unable to parse an empty list []."),
            Self::Unparseable => write!(f, "Unable to parse value."),
        }
    }
}

/// Error type for ruleset loading.
///
/// All variants are fatal at startup: either the source could not be
/// opened (configuration class) or a rule definition was malformed
/// (parse class, with a field-specific message).
#[derive(Debug)]
pub enum RulesetError {
    /// The ruleset path was empty.
    EmptyPath,
    /// The ruleset document contained no data.
    EmptyDocument,
    /// Failed to read the ruleset file.
    Io(std::io::Error),
    /// The document was not well-formed JSON.
    Json(serde_json::Error),
    /// A rule field had an invalid shape or value.
    Parse {
        /// Which field failed.
        field: RuleField,
        /// Why it failed.
        fault: ParseFault,
    },
}

impl RulesetError {
    fn parse(field: RuleField, fault: ParseFault) -> Self {
        Self::Parse { field, fault }
    }
}

impl fmt::Display for RulesetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::EmptyPath => write!(f, "Unable to open file from an empty path"),
            Self::EmptyDocument => write!(f, "Ruleset document is empty"),
            Self::Io(e) => write!(f, "IO error: {}", e),
            Self::Json(e) => write!(f, "JSON parse error: {}", e),
            Self::Parse { field, fault } => write!(f, "{} {}", field, fault),
        }
    }
}

impl std::error::Error for RulesetError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<std::io::Error> for RulesetError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_exact_and_range_patterns() {
        let ruleset = Ruleset::from_json(
            r#"[
                {
                    "name": "Visa",
                    "lengths": [13, 16, 19],
                    "patterns": [4]
                },
                {
                    "name": "MasterCard",
                    "lengths": [16],
                    "patterns": [[51, 55], [2221, 2720]]
                }
            ]"#,
        )
        .unwrap();

        assert_eq!(ruleset.len(), 2);

        let visa = &ruleset.rules()[0];
        assert_eq!(visa.name, "Visa");
        assert_eq!(visa.lengths, vec![13, 16, 19]);
        assert_eq!(visa.patterns, vec![PatternSpec::Exact(4)]);

        let mc = &ruleset.rules()[1];
        assert_eq!(
            mc.patterns,
            vec![
                PatternSpec::Range { min: 51, max: 55 },
                PatternSpec::Range { min: 2221, max: 2720 },
            ]
        );
    }

    #[test]
    fn test_single_integer_lengths() {
        let ruleset = Ruleset::from_json(
            r#"[{"name": "American Express", "lengths": 15, "patterns": [34, 37]}]"#,
        )
        .unwrap();
        assert_eq!(ruleset.rules()[0].lengths, vec![15]);
    }

    #[test]
    fn test_empty_path() {
        let err = Ruleset::from_path("").unwrap_err();
        assert!(matches!(err, RulesetError::EmptyPath));
    }

    #[test]
    fn test_missing_file() {
        let err = Ruleset::from_path("no/such/card_types.json").unwrap_err();
        assert!(matches!(err, RulesetError::Io(_)));
    }

    #[test]
    fn test_empty_document() {
        let err = Ruleset::from_json("   ").unwrap_err();
        assert!(matches!(err, RulesetError::EmptyDocument));
    }

    #[test]
    fn test_empty_range() {
        let err =
            Ruleset::from_json(r#"[{"name": "X", "lengths": [16], "patterns": [[]]}]"#).unwrap_err();
        assert_eq!(err.to_string(), "Patterns: Unable to parse an empty range [].");
    }

    #[test]
    fn test_range_missing_max() {
        let err =
            Ruleset::from_json(r#"[{"name": "X", "lengths": [16], "patterns": [[51]]}]"#)
                .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Patterns: Unable to parse range without max value [min, max]."
        );
    }

    #[test]
    fn test_negative_pattern() {
        let err =
            Ruleset::from_json(r#"[{"name": "X", "lengths": [16], "patterns": [-4]}]"#).unwrap_err();
        assert_eq!(err.to_string(), "Patterns: Value cannot be a negative integer.");

        let err = Ruleset::from_json(r#"[{"name": "X", "lengths": [16], "patterns": [[-1, 55]]}]"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Patterns: Value cannot be a negative integer.");
    }

    #[test]
    fn test_non_numeric_pattern() {
        let err = Ruleset::from_json(r#"[{"name": "X", "lengths": [16], "patterns": ["4"]}]"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Patterns: Value should be a valid positive integer."
        );
    }

    #[test]
    fn test_empty_patterns_list() {
        let err =
            Ruleset::from_json(r#"[{"name": "X", "lengths": [16], "patterns": []}]"#).unwrap_err();
        assert_eq!(err.to_string(), "Patterns: Unable to parse an empty list [].");
    }

    #[test]
    fn test_negative_length() {
        let err = Ruleset::from_json(r#"[{"name": "X", "lengths": [-16], "patterns": [4]}]"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Lengths: Value cannot be a negative integer.");
    }

    #[test]
    fn test_non_numeric_length() {
        let err = Ruleset::from_json(r#"[{"name": "X", "lengths": ["16"], "patterns": [4]}]"#)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Lengths: Value should be a valid positive integer."
        );
    }

    #[test]
    fn test_lengths_wrong_shape() {
        let err = Ruleset::from_json(r#"[{"name": "X", "lengths": "16", "patterns": [4]}]"#)
            .unwrap_err();
        assert_eq!(err.to_string(), "Lengths: Unable to parse value.");
    }

    #[test]
    fn test_empty_lengths_list() {
        let err =
            Ruleset::from_json(r#"[{"name": "X", "lengths": [], "patterns": [4]}]"#).unwrap_err();
        assert_eq!(err.to_string(), "Lengths: Unable to parse an empty list [].");
    }

    #[test]
    fn test_malformed_json() {
        let err = Ruleset::from_json("not valid json").unwrap_err();
        assert!(matches!(err, RulesetError::Json(_)));
    }

    #[test]
    fn test_extra_range_elements_ignored() {
        // A range with trailing entries keeps the first two as [min, max].
        let ruleset =
            Ruleset::from_json(r#"[{"name": "X", "lengths": [16], "patterns": [[51, 55, 99]]}]"#)
                .unwrap();
        assert_eq!(
            ruleset.rules()[0].patterns,
            vec![PatternSpec::Range { min: 51, max: 55 }]
        );
    }
}
