use crate::domain::repository::DEFAULT_CATEGORY;
use crate::infrastructure::fly_client::FLY_API_URL;
use crate::infrastructure::github_client::GITHUB_API_URL;
use serde::Deserialize;
use std::collections::HashSet;

pub const DEFAULT_CONFIG_PATH: &str = "config/dashboard";

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DashboardConfig {
    #[serde(default)]
    pub server: ServerSettings,
    #[serde(default)]
    pub upstream: UpstreamSettings,
    #[serde(default)]
    pub github_orgs: Vec<OrgConfig>,
    #[serde(default)]
    pub fly_orgs: Vec<FleetOrgConfig>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerSettings {
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    /// Upper bound on upstream requests in flight across all builds
    #[serde(default = "default_max_concurrent_requests")]
    pub max_concurrent_requests: usize,
}

impl Default for ServerSettings {
    fn default() -> Self {
        Self {
            bind_addr: default_bind_addr(),
            request_timeout_secs: default_request_timeout_secs(),
            max_concurrent_requests: default_max_concurrent_requests(),
        }
    }
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_max_concurrent_requests() -> usize {
    10
}

/// Base URLs of the two hosts, e.g. for GitHub Enterprise
#[derive(Debug, Deserialize, Clone)]
pub struct UpstreamSettings {
    #[serde(default = "default_github_api_url")]
    pub github_api_url: String,
    #[serde(default = "default_fly_api_url")]
    pub fly_api_url: String,
}

impl Default for UpstreamSettings {
    fn default() -> Self {
        Self {
            github_api_url: default_github_api_url(),
            fly_api_url: default_fly_api_url(),
        }
    }
}

fn default_github_api_url() -> String {
    GITHUB_API_URL.to_string()
}

fn default_fly_api_url() -> String {
    FLY_API_URL.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct OrgConfig {
    pub name: String,
    #[serde(default = "default_include_all")]
    pub include_all: bool,
    #[serde(default)]
    pub repos: Vec<RepoOverride>,
}

fn default_include_all() -> bool {
    true
}

impl OrgConfig {
    /// Override for a repository name. When a name is listed twice the last entry wins.
    pub fn override_for(&self, repo_name: &str) -> Option<&RepoOverride> {
        self.repos.iter().rev().find(|r| r.name == repo_name)
    }

    /// Whether a listed repository belongs to the working set of this org
    pub fn includes(&self, repo_name: &str) -> bool {
        self.include_all || self.override_for(repo_name).is_some()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RepoOverride {
    pub name: String,
    #[serde(default = "default_category")]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub fly_app: Option<String>,
}

fn default_category() -> String {
    DEFAULT_CATEGORY.to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct FleetOrgConfig {
    pub slug: String,
}

impl DashboardConfig {
    /// Reject configurations the aggregator cannot act on
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.server.max_concurrent_requests == 0 {
            anyhow::bail!("server.max_concurrent_requests must be at least 1");
        }

        for org in &self.github_orgs {
            if org.name.trim().is_empty() {
                anyhow::bail!("github_orgs entry with an empty name");
            }

            let mut seen = HashSet::new();
            for repo in &org.repos {
                if repo.name.trim().is_empty() {
                    anyhow::bail!("org {} has a repo override with an empty name", org.name);
                }
                if !seen.insert(repo.name.as_str()) {
                    tracing::warn!(
                        "Repo override {} listed more than once in org {}; the last entry wins",
                        repo.name,
                        org.name
                    );
                }
            }
        }

        for fleet_org in &self.fly_orgs {
            if fleet_org.slug.trim().is_empty() {
                anyhow::bail!("fly_orgs entry with an empty slug");
            }
        }

        Ok(())
    }
}

/// Environment overrides, e.g. `DASHBOARD__SERVER__BIND_ADDR`. Single-underscore
/// names such as `DASHBOARD_API_KEY` do not match the prefix and stay out of the config.
fn dashboard_environment() -> config::Environment {
    config::Environment::with_prefix("DASHBOARD")
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
}

fn build_dashboard_config<S>(file: S, environment: config::Environment) -> anyhow::Result<DashboardConfig>
where
    S: config::Source + Send + Sync + 'static,
{
    let settings = config::Config::builder()
        .add_source(file)
        .add_source(environment)
        .build()?;

    let dashboard_config: DashboardConfig = settings.try_deserialize()?;
    dashboard_config.validate()?;
    Ok(dashboard_config)
}

/// Load the dashboard configuration from `path` (any format the config crate
/// recognises by extension) layered with `DASHBOARD__` environment overrides.
pub fn load_dashboard_config(path: &str) -> anyhow::Result<DashboardConfig> {
    build_dashboard_config(config::File::with_name(path), dashboard_environment())
}
