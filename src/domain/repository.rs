// Repository domain model
use chrono::{DateTime, Utc};
use serde::Serialize;

pub const DEFAULT_BRANCH: &str = "main";
pub const DEFAULT_CATEGORY: &str = "Uncategorized";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BranchInfo {
    pub name: String,
    pub is_default: bool,
    pub ahead: u64,
    pub behind: u64,
}

impl BranchInfo {
    /// The default branch is never compared against itself.
    pub fn default_branch(name: String) -> Self {
        Self {
            name,
            is_default: true,
            ahead: 0,
            behind: 0,
        }
    }

    pub fn compared(name: String, ahead: u64, behind: u64) -> Self {
        Self {
            name,
            is_default: false,
            ahead,
            behind,
        }
    }
}

/// A codespace attached to a repository.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkspaceInfo {
    pub name: String,
    pub state: String,
    pub owner: String,
}

impl WorkspaceInfo {
    pub fn new(name: String, state: String, owner: String) -> Self {
        Self { name, state, owner }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RepoData {
    pub org: String,
    pub name: String,
    pub full_name: String,
    pub description: Option<String>,
    pub url: String,
    pub default_branch: String,
    pub language: Option<String>,
    pub updated_at: Option<DateTime<Utc>>,
    pub pushed_at: Option<DateTime<Utc>>,
    pub commit_count: u64,
    pub category: String,
    pub tags: Vec<String>,
    pub branches: Vec<BranchInfo>,
    pub workspaces: Vec<WorkspaceInfo>,
    pub workspace_count: usize,
}

impl RepoData {
    /// Minimal repository with every optional facet at its default.
    pub fn new(org: String, name: String) -> Self {
        let full_name = format!("{}/{}", org, name);
        Self {
            org,
            name,
            full_name,
            description: None,
            url: String::new(),
            default_branch: DEFAULT_BRANCH.to_string(),
            language: None,
            updated_at: None,
            pushed_at: None,
            commit_count: 0,
            category: DEFAULT_CATEGORY.to_string(),
            tags: Vec::new(),
            branches: Vec::new(),
            workspaces: Vec::new(),
            workspace_count: 0,
        }
    }

    /// Replaces the workspace list and keeps `workspace_count` in step with it.
    pub fn with_workspaces(mut self, workspaces: Vec<WorkspaceInfo>) -> Self {
        self.workspace_count = workspaces.len();
        self.workspaces = workspaces;
        self
    }

    pub fn non_default_branches(&self) -> impl Iterator<Item = &BranchInfo> {
        self.branches.iter().filter(|b| !b.is_default)
    }
}
