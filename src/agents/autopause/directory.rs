//! Cluster Directory Seam
//!
//! Trait-based abstraction over the cluster management API so the sweep
//! can be exercised against an in-memory directory in tests.

use anyhow::Result;
use async_trait::async_trait;

use super::types::{AccessLogEntry, ClusterTarget, Project};

/// The management API surface the sweep consumes.
#[async_trait]
pub trait ClusterDirectory: Send + Sync {
    /// List the projects visible to the configured credentials.
    async fn list_projects(&self) -> Result<Vec<Project>>;

    /// List the clusters of one project.
    async fn list_clusters(&self, project_id: &str) -> Result<Vec<ClusterTarget>>;

    /// Fetch the retained database access history for one cluster.
    ///
    /// Entries are delivered most-recent-first, matching the admin API
    /// contract; the inactivity verdict depends on this order. An
    /// implementation backed by a differently-ordered source must sort
    /// before returning. An empty history is valid.
    async fn access_history(
        &self,
        project_id: &str,
        cluster_name: &str,
    ) -> Result<Vec<AccessLogEntry>>;

    /// Pause a cluster. The remote API is the sole arbiter of pause state.
    async fn pause_cluster(&self, project_id: &str, cluster_name: &str) -> Result<()>;
}
