// Repository host contract - source-control listings and comparisons
use crate::application::host_error::HostError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::Deserialize;

/// A repository as listed by the host
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct RepoRecord {
    pub name: String,
    #[serde(default)]
    pub full_name: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub html_url: Option<String>,
    #[serde(default)]
    pub default_branch: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub pushed_at: Option<DateTime<Utc>>,
}

#[cfg(test)]
impl RepoRecord {
    pub fn named(name: &str) -> Self {
        Self {
            name: name.to_string(),
            full_name: None,
            description: None,
            html_url: None,
            default_branch: None,
            language: None,
            updated_at: None,
            pushed_at: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct BranchRecord {
    pub name: String,
}

/// Commit distance of `head` relative to `base`
#[derive(Debug, Clone, Copy, Default, Deserialize, PartialEq)]
pub struct Comparison {
    #[serde(default)]
    pub ahead_by: u64,
    #[serde(default)]
    pub behind_by: u64,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkspaceOwner {
    #[serde(default)]
    pub login: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct WorkspaceRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default = "unknown_state")]
    pub state: String,
    #[serde(default)]
    pub owner: Option<WorkspaceOwner>,
}

fn unknown_state() -> String {
    "Unknown".to_string()
}

#[async_trait]
pub trait RepositoryHost: Send + Sync {
    /// List every repository of an org (or personal account), following pagination
    async fn list_org_repositories(&self, org: &str) -> Result<Vec<RepoRecord>, HostError>;

    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<BranchRecord>, HostError>;

    async fn compare_branches(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Comparison, HostError>;

    async fn list_workspaces(&self, owner: &str, repo: &str) -> Result<Vec<WorkspaceRecord>, HostError>;

    /// Total commits across contributors. Never fails: degrades to 0.
    async fn commit_count(&self, owner: &str, repo: &str) -> u64;
}
