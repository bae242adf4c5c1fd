//! Autopause Agent - Standalone Binary
//!
//! Sweeps every project in the organization and pauses dedicated clusters
//! with no recent human database access. Designed to run as a CronJob
//! (`--once`) or as a long-lived loop with a fixed interval.

use std::collections::HashSet;
use std::env;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::time::interval;
use tracing::{error, info, Level};
use tracing_subscriber::FmtSubscriber;

use atlas_autopause::autopause::{
    run_sweep, AtlasAdminClient, SweepConfig, SweepOutcome, SYSTEM_ACCOUNTS,
};

/// Autopause Agent - pauses idle dedicated clusters
#[derive(Parser, Debug)]
#[command(name = "autopause-agent", version, about)]
struct Args {
    /// Inactivity lookback window in minutes
    #[arg(long, default_value = "60", env = "ATLAS_LOOKBACK_MINUTES")]
    lookback_minutes: i64,

    /// Project names exempted from the sweep (comma separated)
    #[arg(long, value_delimiter = ',', env = "ATLAS_EXCLUDED_PROJECTS")]
    excluded_projects: Vec<String>,

    /// Account ids whose access never counts as activity (comma separated,
    /// defaults to the known system accounts)
    #[arg(long, value_delimiter = ',', env = "ATLAS_IGNORED_ACCOUNTS")]
    ignored_accounts: Vec<String>,

    /// Seconds between sweeps
    #[arg(long, default_value = "3600", env = "SWEEP_INTERVAL")]
    interval: u64,

    /// Run once and exit (for CronJob mode)
    #[arg(long, default_value = "false")]
    once: bool,

    /// Dry run - evaluate but don't pause anything
    #[arg(long, default_value = "false")]
    dry_run: bool,
}

impl Args {
    fn sweep_config(&self) -> SweepConfig {
        let ignored_accounts: HashSet<String> = if self.ignored_accounts.is_empty() {
            SYSTEM_ACCOUNTS.iter().map(|s| s.to_string()).collect()
        } else {
            self.ignored_accounts.iter().cloned().collect()
        };

        SweepConfig {
            lookback_minutes: self.lookback_minutes,
            excluded_projects: self.excluded_projects.iter().cloned().collect(),
            ignored_accounts,
            dry_run: self.dry_run,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    FmtSubscriber::builder()
        .with_max_level(Level::INFO)
        .with_target(false)
        .json()
        .init();

    let args = Args::parse();
    let config = args.sweep_config();

    info!(
        lookback_minutes = config.lookback_minutes,
        interval = args.interval,
        dry_run = config.dry_run,
        "Starting Autopause Agent"
    );

    let access_token = get_access_token().await?;
    let client = AtlasAdminClient::new(access_token)?;

    if args.once {
        run_cycle(&client, &config).await?;
    } else {
        let mut ticker = interval(Duration::from_secs(args.interval));

        loop {
            ticker.tick().await;

            if let Err(e) = run_cycle(&client, &config).await {
                error!(error = %e, "Sweep cycle failed");
            }
        }
    }

    Ok(())
}

/// Run a single sweep cycle
async fn run_cycle(client: &AtlasAdminClient, config: &SweepConfig) -> Result<()> {
    let result = run_sweep(client, config).await?;

    info!(
        paused = result.count(SweepOutcome::Paused),
        would_pause = result.count(SweepOutcome::WouldPause),
        active = result.count(SweepOutcome::SkippedActive),
        failed = result.failures(),
        project_failures = result.project_failures.len(),
        "Sweep cycle complete"
    );

    Ok(())
}

/// Get an Atlas Admin API token from the environment or by exchanging
/// service account credentials
async fn get_access_token() -> Result<String> {
    // First try environment variable
    if let Ok(token) = env::var("ATLAS_ACCESS_TOKEN") {
        if !token.is_empty() {
            info!("Using Atlas access token from environment");
            return Ok(token);
        }
    }

    // Fall back to the service account token exchange
    let client_id =
        env::var("ATLAS_CLIENT_ID").context("No Atlas credentials found in environment")?;
    let client_secret = env::var("ATLAS_CLIENT_SECRET")
        .context("ATLAS_CLIENT_SECRET must be set when using ATLAS_CLIENT_ID")?;

    info!("Exchanging service account credentials for an access token");

    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    let response = client
        .post("https://cloud.mongodb.com/api/oauth/token")
        .basic_auth(&client_id, Some(&client_secret))
        .form(&[("grant_type", "client_credentials")])
        .send()
        .await
        .context("Failed to call the token endpoint")?;

    if !response.status().is_success() {
        anyhow::bail!("Token endpoint returned {}", response.status());
    }

    let data: serde_json::Value = response.json().await?;
    data["access_token"]
        .as_str()
        .map(|s| s.to_string())
        .context("Token response missing access_token")
}
