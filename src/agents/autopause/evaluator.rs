//! Inactivity Decision Algorithm
//!
//! Given a cluster's recent access history, decide whether it is still in
//! use. The history is delivered most-recent-first (see
//! [`super::directory::ClusterDirectory::access_history`]), so the first
//! entry from a non-system account is the cluster's latest real access and
//! decides the verdict on its own.

use std::collections::HashSet;

use tracing::debug;

use super::types::{AccessLogEntry, InactivityWindow, MIN_LOOKBACK_MINUTES};

/// Outcome of evaluating one cluster's access history
#[derive(Debug, Clone)]
pub struct Verdict {
    /// Whether the cluster saw recent non-system activity
    pub active: bool,
    /// Human-readable justification, for logs only
    pub reason: String,
}

/// Decide active vs. inactive from the access history.
///
/// Entries from `ignored_accounts` are skipped. The first remaining entry
/// decides: at or after the window cutoff means active, before it means
/// inactive, and later entries are never consulted. A history with no
/// non-ignored entries (including an empty one) is inactive.
pub fn evaluate(
    entries: &[AccessLogEntry],
    window: &InactivityWindow,
    ignored_accounts: &HashSet<String>,
) -> Verdict {
    debug_assert!(window.effective_minutes() >= MIN_LOOKBACK_MINUTES);

    for entry in entries {
        if ignored_accounts.contains(&entry.account_id) {
            debug!(account = %entry.account_id, "Skipping system account access");
            continue;
        }

        let elapsed = window.minutes_since(entry.timestamp);

        if entry.timestamp >= window.cutoff() {
            return Verdict {
                active: true,
                reason: format!(
                    "last access by {} was {}m ago, within the {}m window",
                    entry.account_id,
                    elapsed,
                    window.effective_minutes()
                ),
            };
        }

        return Verdict {
            active: false,
            reason: format!(
                "most recent access by {} was {}m ago, outside the {}m window",
                entry.account_id,
                elapsed,
                window.effective_minutes()
            ),
        };
    }

    let reason = if entries.is_empty() {
        "no access history in the retained log".to_string()
    } else {
        format!(
            "all {} access entries are from ignored system accounts",
            entries.len()
        )
    };

    Verdict {
        active: false,
        reason,
    }
}
