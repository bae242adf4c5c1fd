//! Cluster Sweep Orchestrator
//!
//! One sweep walks every project, evaluates each eligible cluster against
//! the inactivity window, and pauses the inactive ones. Per-project and
//! per-cluster failures are recorded in the result and never abort sibling
//! iteration; invalid configuration is the only run-fatal path.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{error, info, warn};

use super::directory::ClusterDirectory;
use super::error::ConfigError;
use super::evaluator;
use super::types::{ClusterTarget, InactivityWindow, Project, SweepConfig};

/// What the sweep did (or decided) for one cluster
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SweepOutcome {
    /// Inactive and paused
    Paused,
    /// Inactive, but the run was a dry run
    WouldPause,
    /// Inactive, but the pause call failed
    PauseFailed,
    /// Recent non-system activity observed
    SkippedActive,
    /// Already paused when the sweep saw it
    SkippedAlreadyPaused,
    /// Tier cannot be paused via this mechanism
    SkippedNonPausable,
    /// Access history could not be fetched
    HistoryUnavailable,
}

/// Audit record for one cluster
#[derive(Debug, Clone, Serialize)]
pub struct ClusterAction {
    pub project: String,
    pub cluster: String,
    pub outcome: SweepOutcome,
    pub detail: String,
}

/// Result of one sweep run
#[derive(Debug, Clone, Serialize)]
pub struct SweepResult {
    pub started_at: DateTime<Utc>,
    /// One entry per cluster seen in a non-excluded project
    pub actions: Vec<ClusterAction>,
    /// Projects skipped by name, with no per-cluster entries
    pub excluded_projects: Vec<String>,
    /// Listing failures that removed a project (or all of them) from this run
    pub project_failures: Vec<String>,
}

impl SweepResult {
    fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            actions: Vec::new(),
            excluded_projects: Vec::new(),
            project_failures: Vec::new(),
        }
    }

    pub fn count(&self, outcome: SweepOutcome) -> usize {
        self.actions
            .iter()
            .filter(|action| action.outcome == outcome)
            .count()
    }

    /// Clusters that hit a fetch or pause failure this run.
    pub fn failures(&self) -> usize {
        self.count(SweepOutcome::PauseFailed) + self.count(SweepOutcome::HistoryUnavailable)
    }
}

/// Run one sweep over every project the directory can see.
///
/// Returns `Err` only for invalid configuration; all other trouble is
/// recorded inside the [`SweepResult`]. Every per-cluster outcome is
/// materialized before this returns, so completion means the run is done.
pub async fn run_sweep(
    directory: &dyn ClusterDirectory,
    config: &SweepConfig,
) -> Result<SweepResult, ConfigError> {
    config.validate()?;

    let mut result = SweepResult::new(Utc::now());

    info!(
        lookback_minutes = config.lookback_minutes,
        dry_run = config.dry_run,
        "Starting cluster sweep"
    );

    let projects = match directory.list_projects().await {
        Ok(projects) => projects,
        Err(e) => {
            error!(error = %e, "Failed to list projects, nothing to sweep");
            result
                .project_failures
                .push(format!("project listing failed: {}", e));
            return Ok(result);
        }
    };

    for project in projects {
        if config.excluded_projects.contains(&project.name) {
            info!(project = %project.name, "Project excluded from sweep");
            result.excluded_projects.push(project.name);
            continue;
        }

        let clusters = match directory.list_clusters(&project.id).await {
            Ok(clusters) => clusters,
            Err(e) => {
                warn!(project = %project.name, error = %e, "Failed to list clusters, skipping project");
                result
                    .project_failures
                    .push(format!("{}: {}", project.name, e));
                continue;
            }
        };

        for cluster in clusters {
            let action = sweep_cluster(directory, config, &project, &cluster).await;
            result.actions.push(action);
        }
    }

    info!(
        paused = result.count(SweepOutcome::Paused),
        would_pause = result.count(SweepOutcome::WouldPause),
        active = result.count(SweepOutcome::SkippedActive),
        already_paused = result.count(SweepOutcome::SkippedAlreadyPaused),
        non_pausable = result.count(SweepOutcome::SkippedNonPausable),
        failed = result.failures(),
        excluded_projects = result.excluded_projects.len(),
        "Cluster sweep complete"
    );

    Ok(result)
}

async fn sweep_cluster(
    directory: &dyn ClusterDirectory,
    config: &SweepConfig,
    project: &Project,
    cluster: &ClusterTarget,
) -> ClusterAction {
    let action = |outcome: SweepOutcome, detail: String| ClusterAction {
        project: project.name.clone(),
        cluster: cluster.name.clone(),
        outcome,
        detail,
    };

    if !cluster.tier.is_pausable() {
        return action(
            SweepOutcome::SkippedNonPausable,
            format!("{} tier clusters cannot be paused", cluster.tier),
        );
    }

    if cluster.paused {
        return action(
            SweepOutcome::SkippedAlreadyPaused,
            "cluster is already paused".to_string(),
        );
    }

    let entries = match directory
        .access_history(&cluster.project_id, &cluster.name)
        .await
    {
        Ok(entries) => entries,
        Err(e) => {
            warn!(
                project = %project.name,
                cluster = %cluster.name,
                error = %e,
                "Failed to fetch access history"
            );
            return action(
                SweepOutcome::HistoryUnavailable,
                format!("access history fetch failed: {}", e),
            );
        }
    };

    let window = InactivityWindow::new(config.lookback_minutes, Utc::now());
    let verdict = evaluator::evaluate(&entries, &window, &config.ignored_accounts);

    if verdict.active {
        info!(
            project = %project.name,
            cluster = %cluster.name,
            reason = %verdict.reason,
            "Cluster active, leaving running"
        );
        return action(SweepOutcome::SkippedActive, verdict.reason);
    }

    if config.dry_run {
        info!(
            project = %project.name,
            cluster = %cluster.name,
            reason = %verdict.reason,
            "DRY RUN - would pause cluster"
        );
        return action(SweepOutcome::WouldPause, verdict.reason);
    }

    match directory
        .pause_cluster(&cluster.project_id, &cluster.name)
        .await
    {
        Ok(()) => {
            info!(
                project = %project.name,
                cluster = %cluster.name,
                reason = %verdict.reason,
                "Paused inactive cluster"
            );
            action(SweepOutcome::Paused, verdict.reason)
        }
        Err(e) => {
            error!(
                project = %project.name,
                cluster = %cluster.name,
                error = %e,
                "Failed to pause cluster"
            );
            action(
                SweepOutcome::PauseFailed,
                format!("{} (pause failed: {})", verdict.reason, e),
            )
        }
    }
}
