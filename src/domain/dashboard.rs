// Dashboard domain model
use super::fleet::FleetAppInfo;
use super::repository::RepoData;
use chrono::{DateTime, Utc};
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Per-repo indicators of whether someone should take a look.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct AttentionSignals {
    pub branches_ahead_count: usize,
    pub branches_behind_count: usize,
    pub active_workspace_count: usize,
    pub fleet_has_issues: bool,
    pub all_clear: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RepoView {
    pub repo: RepoData,
    pub fly_app: Option<FleetAppInfo>,
}

impl RepoView {
    pub fn new(repo: RepoData) -> Self {
        Self { repo, fly_app: None }
    }

    pub fn with_fly_app(mut self, fly_app: FleetAppInfo) -> Self {
        self.fly_app = Some(fly_app);
        self
    }

    /// Computed from the current repo and fleet state on every call.
    pub fn attention(&self) -> AttentionSignals {
        let branches_ahead_count = self.repo.non_default_branches().filter(|b| b.ahead > 0).count();
        let branches_behind_count = self.repo.non_default_branches().filter(|b| b.behind > 0).count();
        let active_workspace_count = self.repo.workspace_count;
        let fleet_has_issues = self.fly_app.as_ref().is_some_and(FleetAppInfo::has_issues);

        AttentionSignals {
            branches_ahead_count,
            branches_behind_count,
            active_workspace_count,
            fleet_has_issues,
            all_clear: branches_ahead_count == 0
                && branches_behind_count == 0
                && active_workspace_count == 0
                && !fleet_has_issues,
        }
    }
}

// The attention block is rendered alongside the data it is derived from.
impl Serialize for RepoView {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut state = serializer.serialize_struct("RepoView", 3)?;
        state.serialize_field("repo", &self.repo)?;
        state.serialize_field("fly_app", &self.fly_app)?;
        state.serialize_field("attention", &self.attention())?;
        state.end()
    }
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct DashboardData {
    pub repos: Vec<RepoView>,
    pub errors: Vec<String>,
    pub generated_at: DateTime<Utc>,
}

impl DashboardData {
    pub fn new(repos: Vec<RepoView>, errors: Vec<String>) -> Self {
        Self {
            repos,
            errors,
            generated_at: Utc::now(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::fleet::FleetMachine;
    use crate::domain::repository::BranchInfo;

    fn view(branches: Vec<BranchInfo>, workspace_count: usize, fly_app: Option<FleetAppInfo>) -> RepoView {
        let mut repo = RepoData::new("o".to_string(), "r".to_string());
        repo.branches = branches;
        repo.workspace_count = workspace_count;
        RepoView { repo, fly_app }
    }

    fn fly(status: &str, machine_state: Option<&str>) -> FleetAppInfo {
        let machines = machine_state
            .map(|state| {
                vec![FleetMachine::new(
                    "m1".to_string(),
                    "web".to_string(),
                    state.to_string(),
                    "iad".to_string(),
                    String::new(),
                )]
            })
            .unwrap_or_default();
        FleetAppInfo::new("a".to_string(), String::new(), status.to_string(), String::new(), machines)
    }

    fn main_branch() -> BranchInfo {
        BranchInfo::default_branch("main".to_string())
    }

    #[test]
    fn test_all_clear_with_only_default_branch() {
        let signals = view(vec![main_branch()], 0, None).attention();
        assert!(signals.all_clear);
        assert!(!signals.fleet_has_issues);
    }

    #[test]
    fn test_branch_counts_exclude_default() {
        let signals = view(
            vec![
                main_branch(),
                BranchInfo::compared("feat-a".to_string(), 3, 0),
                BranchInfo::compared("feat-b".to_string(), 0, 2),
            ],
            0,
            None,
        )
        .attention();

        assert_eq!(signals.branches_ahead_count, 1);
        assert_eq!(signals.branches_behind_count, 1);
        assert!(!signals.all_clear);
    }

    #[test]
    fn test_default_branch_counts_ignored_even_if_nonzero() {
        let mut default = main_branch();
        default.ahead = 4;
        default.behind = 4;
        let signals = view(vec![default], 0, None).attention();
        assert_eq!(signals.branches_ahead_count, 0);
        assert_eq!(signals.branches_behind_count, 0);
    }

    #[test]
    fn test_diverged_branch_counts_both_ways() {
        let signals = view(
            vec![main_branch(), BranchInfo::compared("diverged".to_string(), 2, 5)],
            0,
            None,
        )
        .attention();
        assert_eq!(signals.branches_ahead_count, 1);
        assert_eq!(signals.branches_behind_count, 1);
    }

    #[test]
    fn test_workspace_count_mirrors_repo() {
        let signals = view(Vec::new(), 3, None).attention();
        assert_eq!(signals.active_workspace_count, 3);
        assert!(!signals.all_clear);
    }

    #[test]
    fn test_fleet_status_mixed_case() {
        let signals = view(Vec::new(), 0, Some(fly("Suspended", None))).attention();
        assert!(signals.fleet_has_issues);
        assert!(!signals.all_clear);
    }

    #[test]
    fn test_fleet_machine_states() {
        assert!(view(Vec::new(), 0, Some(fly("deployed", Some("failed")))).attention().fleet_has_issues);
        assert!(view(Vec::new(), 0, Some(fly("deployed", Some("stopped")))).attention().fleet_has_issues);

        let healthy = view(Vec::new(), 0, Some(fly("deployed", Some("started")))).attention();
        assert!(!healthy.fleet_has_issues);
        assert!(healthy.all_clear);
    }

    #[test]
    fn test_serialized_view_includes_attention() {
        let value = serde_json::to_value(view(vec![main_branch()], 1, None)).unwrap();

        assert_eq!(value["repo"]["name"], "r");
        assert!(value["fly_app"].is_null());
        assert_eq!(value["attention"]["active_workspace_count"], 1);
        assert_eq!(value["attention"]["all_clear"], false);
    }
}
