//! Cluster Autopause Agent
//!
//! Periodically sweeps every project in the organization and pauses
//! dedicated clusters that have seen no human database access within the
//! configured lookback window.
//!
//! ## Flow
//!
//! - **Directory**: list projects, their clusters, and per-cluster access
//!   history via the Atlas Admin API
//! - **Evaluator**: first non-system access entry decides active vs. inactive
//! - **Sweep**: gates on exclusions, tier and pause state, then pauses
//!   inactive clusters and records an auditable outcome per cluster

mod evaluator;
mod sweep;
mod types;
pub mod atlas;
pub mod directory;
pub mod error;

#[allow(unused_imports)]
pub use atlas::AtlasAdminClient;
#[allow(unused_imports)]
pub use directory::ClusterDirectory;
#[allow(unused_imports)]
pub use evaluator::{evaluate, Verdict};
#[allow(unused_imports)]
pub use sweep::{run_sweep, ClusterAction, SweepOutcome, SweepResult};
#[allow(unused_imports)]
pub use types::{
    AccessLogEntry, ClusterTarget, ClusterTier, InactivityWindow, Project, SweepConfig,
    DEFAULT_LOOKBACK_MINUTES, MIN_LOOKBACK_MINUTES, SYSTEM_ACCOUNTS,
};
