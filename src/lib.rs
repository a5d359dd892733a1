//! # pancheck
//!
//! Card issuer detection and Luhn checksum validation.
//!
//! Given a numeric card-number string, `pancheck` answers two questions:
//! which network's numbering rules does it match (Visa, MasterCard, ...),
//! and is its mod-10 check digit correct. Issuers are described by a
//! data-driven JSON ruleset loaded once at startup, so BIN ranges are a
//! data change rather than a code change.
//!
//! ## Quick Start
//!
//! ```rust
//! use std::sync::Arc;
//! use pancheck::{Ruleset, Validator, VerdictCode};
//!
//! let ruleset = Ruleset::from_json(r#"[
//!     {"name": "Visa", "lengths": [13, 16, 19], "patterns": [4]},
//!     {"name": "MasterCard", "lengths": [16], "patterns": [[51, 55], [2221, 2720]]}
//! ]"#).unwrap();
//!
//! let validator = Validator::new(Arc::new(ruleset));
//!
//! let verdict = validator.validate("4111111111111111");
//! assert!(verdict.valid);
//! assert_eq!(verdict.issuer, "Visa");
//!
//! // Matched issuer, wrong check digit
//! let verdict = validator.validate("4111111111111112");
//! assert_eq!(verdict.code, VerdictCode::ChecksumFailed);
//! assert_eq!(verdict.issuer, "Visa");
//!
//! // Nothing matches: the checksum is never consulted
//! let verdict = validator.validate("0000000000000000");
//! assert_eq!(verdict.code, VerdictCode::UnknownIssuer);
//! assert_eq!(verdict.issuer, "Unknown");
//! ```
//!
//! ## How matching works
//!
//! Every rule lists accepted lengths and prefix patterns — exact values
//! (`4`) or inclusive ranges (`[2221, 2720]`). A candidate is scored
//! against every rule; when several issuers claim the same number, the
//! pattern constraining the most leading digits wins, so a 6-digit Elo
//! BIN range beats the 1-digit Visa prefix on the same input.
//!
//! The Luhn check runs independently of matching and only when an issuer
//! matched; per-call outcomes are carried as data on [`Verdict`], never
//! as errors.
//!
//! ## Server
//!
//! The `server` feature (on by default) builds `pancheck-server`, a small
//! axum service exposing the validator at `POST /card/api/verify`:
//!
//! ```bash
//! pancheck-server --config config.toml --port 8080
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Description |
//! |---------|-------------|
//! | `server` | REST API binary (axum, tokio, tracing, clap) |

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod config;
pub mod luhn;
pub mod matcher;
pub mod rank;
pub mod rules;
pub mod validate;

// Re-export main types at crate root
pub use config::{Config, ConfigError, HttpConfig};
pub use matcher::MatchCandidate;
pub use rules::{IssuerRule, PatternSpec, Ruleset, RulesetError};
pub use validate::{Validator, Verdict, VerdictCode};
