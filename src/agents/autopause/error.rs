//! Typed errors for the autopause agent.

use thiserror::Error;

/// Run-fatal configuration problems.
///
/// Acting on bad configuration would be wrong for every cluster, so these
/// fail the sweep before any API call is made.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("lookback minutes must be positive, got {0}")]
    NonPositiveLookback(i64),

    #[error("excluded project list contains a blank name")]
    BlankExcludedProject,

    #[error("ignored account list contains a blank account id")]
    BlankIgnoredAccount,
}

/// An access log timestamp the boundary parser could not make sense of.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("unrecognized access log timestamp: {0:?}")]
pub struct TimestampParseError(pub String);
