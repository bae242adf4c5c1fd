//! Autopause Domain Types
//!
//! Core types for representing projects, clusters, access history and the
//! sweep configuration.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use super::error::{ConfigError, TimestampParseError};

/// Access logs are collected in 30-minute batches, so any shorter lookback
/// would read an incomplete window.
pub const MIN_LOOKBACK_MINUTES: i64 = 30;

/// Lookback used when the operator does not configure one.
pub const DEFAULT_LOOKBACK_MINUTES: i64 = 60;

/// Non-human principals whose access never counts as activity.
pub const SYSTEM_ACCOUNTS: &[&str] = &["mms-automation", "mms-monitoring-agent"];

/// A project grouping clusters under the organization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Cluster tier as far as pausing is concerned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ClusterTier {
    /// Dedicated deployment, can be paused
    Dedicated,
    /// Shared/tenant deployment, cannot be paused via this mechanism
    Tenant,
}

impl ClusterTier {
    pub fn is_pausable(self) -> bool {
        matches!(self, ClusterTier::Dedicated)
    }
}

impl std::fmt::Display for ClusterTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ClusterTier::Dedicated => write!(f, "dedicated"),
            ClusterTier::Tenant => write!(f, "tenant"),
        }
    }
}

/// A cluster as observed at the start of the sweep
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClusterTarget {
    /// Project the cluster belongs to
    pub project_id: String,
    /// Cluster name, unique within the project
    pub name: String,
    /// Tier, decides pausability
    pub tier: ClusterTier,
    /// Observed pause state; paused clusters are not evaluated
    pub paused: bool,
}

/// One database access, normalized from the raw API record
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccessLogEntry {
    /// Principal that opened the connection
    pub account_id: String,
    /// Instant of the access
    pub timestamp: DateTime<Utc>,
}

impl AccessLogEntry {
    /// Build an entry from the raw account id and timestamp string.
    pub fn parse(account_id: &str, raw_timestamp: &str) -> Result<Self, TimestampParseError> {
        Ok(Self {
            account_id: account_id.to_string(),
            timestamp: parse_access_timestamp(raw_timestamp)?,
        })
    }
}

/// Parse an access log timestamp.
///
/// The admin API delivers JavaScript-style date strings such as
/// `"Wed Apr 28 2021 21:52:39 GMT+0000 (Greenwich Mean Time)"`; the
/// parenthesized zone name is dropped before parsing. RFC 3339 input is
/// accepted as a fallback.
pub fn parse_access_timestamp(raw: &str) -> Result<DateTime<Utc>, TimestampParseError> {
    let trimmed = raw.trim();

    let without_zone_name = match trimmed.find(" (") {
        Some(idx) => trimmed[..idx].trim_end(),
        None => trimmed,
    };

    if let Ok(parsed) = DateTime::parse_from_str(without_zone_name, "%a %b %d %Y %H:%M:%S GMT%z") {
        return Ok(parsed.with_timezone(&Utc));
    }

    if let Ok(parsed) = DateTime::parse_from_rfc3339(trimmed) {
        return Ok(parsed.with_timezone(&Utc));
    }

    Err(TimestampParseError(raw.to_string()))
}

/// The lookback window one sweep evaluates clusters against.
///
/// Constructed from the requested lookback and an explicit `now`; the
/// effective window is clamped to [`MIN_LOOKBACK_MINUTES`] so callers can
/// never reduce protection below the log collection granularity.
#[derive(Debug, Clone, Copy)]
pub struct InactivityWindow {
    requested_minutes: i64,
    effective_minutes: i64,
    now: DateTime<Utc>,
    cutoff: DateTime<Utc>,
}

impl InactivityWindow {
    pub fn new(requested_minutes: i64, now: DateTime<Utc>) -> Self {
        let effective_minutes = requested_minutes.max(MIN_LOOKBACK_MINUTES);
        Self {
            requested_minutes,
            effective_minutes,
            now,
            cutoff: now - Duration::minutes(effective_minutes),
        }
    }

    pub fn requested_minutes(&self) -> i64 {
        self.requested_minutes
    }

    pub fn effective_minutes(&self) -> i64 {
        self.effective_minutes
    }

    /// Any access at or after this instant counts as recent.
    pub fn cutoff(&self) -> DateTime<Utc> {
        self.cutoff
    }

    /// Whole minutes between the window's `now` and the given instant.
    pub fn minutes_since(&self, instant: DateTime<Utc>) -> i64 {
        (self.now - instant).num_minutes()
    }
}

/// Immutable configuration for one sweep run
#[derive(Debug, Clone)]
pub struct SweepConfig {
    /// Requested lookback in minutes; clamped to the 30-minute floor at
    /// window construction
    pub lookback_minutes: i64,
    /// Project names exempted from the sweep entirely (exact match)
    pub excluded_projects: HashSet<String>,
    /// Account ids excluded from the activity signal
    pub ignored_accounts: HashSet<String>,
    /// Evaluate but never issue pause calls
    pub dry_run: bool,
}

impl Default for SweepConfig {
    fn default() -> Self {
        Self {
            lookback_minutes: DEFAULT_LOOKBACK_MINUTES,
            excluded_projects: HashSet::new(),
            ignored_accounts: SYSTEM_ACCOUNTS.iter().map(|s| s.to_string()).collect(),
            dry_run: false,
        }
    }
}

impl SweepConfig {
    /// Reject configuration the sweep must not act on.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.lookback_minutes <= 0 {
            return Err(ConfigError::NonPositiveLookback(self.lookback_minutes));
        }
        if self.excluded_projects.iter().any(|name| name.trim().is_empty()) {
            return Err(ConfigError::BlankExcludedProject);
        }
        if self.ignored_accounts.iter().any(|id| id.trim().is_empty()) {
            return Err(ConfigError::BlankIgnoredAccount);
        }
        Ok(())
    }
}
