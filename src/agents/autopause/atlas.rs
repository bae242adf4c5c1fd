//! Atlas Admin API Client
//!
//! Concrete [`ClusterDirectory`] backed by the MongoDB Atlas Admin API v2.
//! Raw API records are validated into domain types here, at the boundary.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::{header, Client};
use serde::de::DeserializeOwned;
use serde::Deserialize;

use super::directory::ClusterDirectory;
use super::types::{AccessLogEntry, ClusterTarget, ClusterTier, Project};

const ATLAS_API_BASE: &str = "https://cloud.mongodb.com/api/atlas/v2";
const ATLAS_MEDIA_TYPE: &str = "application/vnd.atlas.2023-02-01+json";

/// Paged list envelope used by the Atlas Admin API
#[derive(Debug, Deserialize)]
struct AtlasPage<T> {
    #[serde(default = "Vec::new")]
    results: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtlasProject {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtlasCluster {
    name: String,
    #[serde(default)]
    paused: bool,
    #[serde(default)]
    replication_specs: Vec<AtlasReplicationSpec>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtlasReplicationSpec {
    #[serde(default)]
    region_configs: Vec<AtlasRegionConfig>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtlasRegionConfig {
    provider_name: Option<String>,
}

impl AtlasCluster {
    /// Shared clusters surface as the `TENANT` backing provider in their
    /// region configs.
    fn tier(&self) -> ClusterTier {
        let tenant = self
            .replication_specs
            .iter()
            .flat_map(|spec| spec.region_configs.iter())
            .any(|region| region.provider_name.as_deref() == Some("TENANT"));

        if tenant {
            ClusterTier::Tenant
        } else {
            ClusterTier::Dedicated
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtlasAccessLogPage {
    #[serde(default)]
    access_logs: Vec<AtlasAccessLogEntry>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AtlasAccessLogEntry {
    username: String,
    timestamp: String,
}

/// Atlas Admin API client
pub struct AtlasAdminClient {
    http_client: Client,
    access_token: String,
}

impl AtlasAdminClient {
    /// Create a new client with the given bearer token.
    pub fn new(access_token: String) -> Result<Self> {
        let http_client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .context("Failed to create HTTP client")?;

        Ok(Self {
            http_client,
            access_token,
        })
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let response = self
            .http_client
            .get(url)
            .bearer_auth(&self.access_token)
            .header(header::ACCEPT, ATLAS_MEDIA_TYPE)
            .send()
            .await
            .context("Failed to call Atlas Admin API")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!("Atlas API error {}: {}", status, text);
        }

        response
            .json()
            .await
            .context("Failed to decode Atlas API response")
    }
}

#[async_trait]
impl ClusterDirectory for AtlasAdminClient {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        let url = format!("{}/groups?itemsPerPage=500", ATLAS_API_BASE);

        let page: AtlasPage<AtlasProject> = self.get_json(&url).await?;

        Ok(page
            .results
            .into_iter()
            .map(|project| Project {
                id: project.id,
                name: project.name,
            })
            .collect())
    }

    async fn list_clusters(&self, project_id: &str) -> Result<Vec<ClusterTarget>> {
        let url = format!(
            "{}/groups/{}/clusters?itemsPerPage=500",
            ATLAS_API_BASE, project_id
        );

        let page: AtlasPage<AtlasCluster> = self.get_json(&url).await?;

        Ok(page
            .results
            .into_iter()
            .map(|cluster| {
                let tier = cluster.tier();
                ClusterTarget {
                    project_id: project_id.to_string(),
                    name: cluster.name,
                    tier,
                    paused: cluster.paused,
                }
            })
            .collect())
    }

    async fn access_history(
        &self,
        project_id: &str,
        cluster_name: &str,
    ) -> Result<Vec<AccessLogEntry>> {
        let url = format!(
            "{}/groups/{}/dbAccessHistory/clusters/{}",
            ATLAS_API_BASE,
            project_id,
            urlencoding::encode(cluster_name)
        );

        let page: AtlasAccessLogPage = self.get_json(&url).await?;

        page.access_logs
            .into_iter()
            .map(|raw| {
                AccessLogEntry::parse(&raw.username, &raw.timestamp).with_context(|| {
                    format!("Invalid access log entry for cluster {}", cluster_name)
                })
            })
            .collect()
    }

    async fn pause_cluster(&self, project_id: &str, cluster_name: &str) -> Result<()> {
        let url = format!(
            "{}/groups/{}/clusters/{}",
            ATLAS_API_BASE,
            project_id,
            urlencoding::encode(cluster_name)
        );

        let response = self
            .http_client
            .patch(&url)
            .bearer_auth(&self.access_token)
            .header(header::ACCEPT, ATLAS_MEDIA_TYPE)
            .header(header::CONTENT_TYPE, ATLAS_MEDIA_TYPE)
            .json(&serde_json::json!({ "paused": true }))
            .send()
            .await
            .context("Failed to call Atlas Admin API")?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "Failed to pause cluster {} ({}): {}",
                cluster_name,
                status,
                text
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_page_deserialization() {
        let json = r#"{
            "results": [
                {"id": "5f1a2b3c4d5e6f7a8b9c0d1e", "name": "Payments", "orgId": "ignored"},
                {"id": "5f1a2b3c4d5e6f7a8b9c0d1f", "name": "Staging"}
            ],
            "totalCount": 2
        }"#;

        let page: AtlasPage<AtlasProject> = serde_json::from_str(json).unwrap();

        assert_eq!(page.results.len(), 2);
        assert_eq!(page.results[0].name, "Payments");
        assert_eq!(page.results[1].id, "5f1a2b3c4d5e6f7a8b9c0d1f");
    }

    #[test]
    fn test_tenant_cluster_maps_to_tenant_tier() {
        let json = r#"{
            "name": "shared-sandbox",
            "paused": false,
            "replicationSpecs": [
                {"regionConfigs": [{"providerName": "TENANT", "backingProviderName": "AWS"}]}
            ]
        }"#;

        let cluster: AtlasCluster = serde_json::from_str(json).unwrap();

        assert_eq!(cluster.tier(), ClusterTier::Tenant);
    }

    #[test]
    fn test_dedicated_cluster_maps_to_dedicated_tier() {
        let json = r#"{
            "name": "prod-eu",
            "paused": true,
            "replicationSpecs": [
                {"regionConfigs": [{"providerName": "AWS"}, {"providerName": "GCP"}]}
            ]
        }"#;

        let cluster: AtlasCluster = serde_json::from_str(json).unwrap();

        assert_eq!(cluster.tier(), ClusterTier::Dedicated);
        assert!(cluster.paused);
    }

    #[test]
    fn test_cluster_defaults_when_fields_missing() {
        let cluster: AtlasCluster = serde_json::from_str(r#"{"name": "bare"}"#).unwrap();

        assert!(!cluster.paused);
        assert_eq!(cluster.tier(), ClusterTier::Dedicated);
    }

    #[test]
    fn test_access_log_page_deserialization() {
        let json = r#"{
            "accessLogs": [
                {
                    "username": "alice",
                    "timestamp": "Wed Apr 28 2021 21:52:39 GMT+0000 (Greenwich Mean Time)",
                    "authResult": true
                },
                {"username": "mms-automation", "timestamp": "2021-04-28T20:00:00Z"}
            ]
        }"#;

        let page: AtlasAccessLogPage = serde_json::from_str(json).unwrap();

        assert_eq!(page.access_logs.len(), 2);
        assert_eq!(page.access_logs[0].username, "alice");

        let entry =
            AccessLogEntry::parse(&page.access_logs[0].username, &page.access_logs[0].timestamp)
                .unwrap();
        assert_eq!(entry.account_id, "alice");
        assert_eq!(entry.timestamp.to_rfc3339(), "2021-04-28T21:52:39+00:00");
    }

    #[test]
    fn test_empty_access_log_page() {
        let page: AtlasAccessLogPage = serde_json::from_str("{}").unwrap();

        assert!(page.access_logs.is_empty());
    }
}
