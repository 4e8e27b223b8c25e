// Aggregator - Use case for building the dashboard from both hosts
use crate::application::fleet_host::{AppRecord, FleetHost};
use crate::application::repository_host::{BranchRecord, RepoRecord, RepositoryHost, WorkspaceRecord};
use crate::domain::dashboard::{DashboardData, RepoView};
use crate::domain::fleet::{FleetAppInfo, FleetMachine};
use crate::domain::repository::{BranchInfo, RepoData, WorkspaceInfo, DEFAULT_BRANCH, DEFAULT_CATEGORY};
use crate::infrastructure::config::{DashboardConfig, FleetOrgConfig, OrgConfig};
use futures::future::join_all;
use futures::stream::{self, StreamExt};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::Semaphore;

/// Fleet apps indexed by name. Built once per `build()` and only read afterwards.
type FleetLookup = HashMap<String, FleetAppInfo>;

/// A value together with the error strings produced while obtaining it
struct Collected<T> {
    value: T,
    errors: Vec<String>,
}

impl<T> Collected<T> {
    fn new(value: T, errors: Vec<String>) -> Self {
        Self { value, errors }
    }
}

/// Rebuilds the dashboard from scratch on every call. Holds no per-build state,
/// so one instance can serve concurrent builds. Clones share one request budget
/// of `server.max_concurrent_requests` upstream calls in flight.
#[derive(Clone)]
pub struct Aggregator {
    config: Arc<DashboardConfig>,
    repository_host: Arc<dyn RepositoryHost>,
    fleet_host: Option<Arc<dyn FleetHost>>,
    permits: Arc<Semaphore>,
}

impl Aggregator {
    pub fn new(
        config: Arc<DashboardConfig>,
        repository_host: Arc<dyn RepositoryHost>,
        fleet_host: Option<Arc<dyn FleetHost>>,
    ) -> Self {
        let permits = Arc::new(Semaphore::new(config.server.max_concurrent_requests.max(1)));
        Self {
            config,
            repository_host,
            fleet_host,
            permits,
        }
    }

    /// How many enrichments or compares are driven at once within one fan-out
    fn fan_out(&self) -> usize {
        self.config.server.max_concurrent_requests.max(1)
    }

    #[tracing::instrument(skip(self))]
    pub async fn build(&self) -> DashboardData {
        let (fleet, orgs) = tokio::join!(
            self.build_fleet_lookup(),
            join_all(self.config.github_orgs.iter().map(|org| self.fetch_org_repos(org)))
        );

        let mut errors = fleet.errors;
        let mut repos = Vec::new();

        for (org_config, org) in self.config.github_orgs.iter().zip(orgs) {
            errors.extend(org.errors);
            repos.extend(
                org.value
                    .into_iter()
                    .map(|view| attach_fleet_app(view, org_config, &fleet.value)),
            );
        }

        tracing::info!(
            "Dashboard built with {} repos, {} fleet apps and {} errors",
            repos.len(),
            fleet.value.len(),
            errors.len()
        );

        DashboardData::new(repos, errors)
    }

    async fn build_fleet_lookup(&self) -> Collected<FleetLookup> {
        let Some(fleet_host) = &self.fleet_host else {
            return Collected::new(FleetLookup::new(), Vec::new());
        };

        let per_org = join_all(
            self.config
                .fly_orgs
                .iter()
                .map(|fleet_org| fetch_fleet_org(fleet_host.as_ref(), &self.permits, fleet_org)),
        )
        .await;

        let mut lookup = FleetLookup::new();
        let mut errors = Vec::new();
        for org in per_org {
            errors.extend(org.errors);
            for app in org.value {
                lookup.insert(app.name.clone(), app);
            }
        }

        Collected::new(lookup, errors)
    }

    async fn fetch_org_repos(&self, org_config: &OrgConfig) -> Collected<Vec<RepoView>> {
        let listed = limited(&self.permits, self.repository_host.list_org_repositories(&org_config.name)).await;
        let listed = match listed {
            Ok(repos) => repos,
            Err(e) => {
                tracing::warn!("Error listing repositories for {}: {}", org_config.name, e);
                return Collected::new(
                    Vec::new(),
                    vec![format!("Repositories for org {}: {}", org_config.name, e)],
                );
            }
        };

        let working_set: Vec<RepoRecord> = listed
            .into_iter()
            .filter(|repo| org_config.includes(&repo.name))
            .collect();

        tracing::debug!("Enriching {} repos for org {}", working_set.len(), org_config.name);

        // buffered keeps input order regardless of which enrichment finishes first
        let enriched: Vec<Collected<RepoView>> = stream::iter(working_set)
            .map(|record| self.enrich_repo(org_config, record))
            .buffered(self.fan_out())
            .collect()
            .await;

        let mut views = Vec::with_capacity(enriched.len());
        let mut errors = Vec::new();
        for repo in enriched {
            views.push(repo.value);
            errors.extend(repo.errors);
        }

        Collected::new(views, errors)
    }

    async fn enrich_repo(&self, org_config: &OrgConfig, record: RepoRecord) -> Collected<RepoView> {
        let org = org_config.name.as_str();
        let default_branch = record
            .default_branch
            .clone()
            .unwrap_or_else(|| DEFAULT_BRANCH.to_string());

        let (branches, workspaces, commit_count) = tokio::join!(
            limited(&self.permits, self.repository_host.list_branches(org, &record.name)),
            limited(&self.permits, self.repository_host.list_workspaces(org, &record.name)),
            limited(&self.permits, self.repository_host.commit_count(org, &record.name)),
        );

        let mut errors = Vec::new();
        let branches = match branches {
            Ok(branches) => self.compare_branches(org, &record.name, &default_branch, branches).await,
            Err(e) => {
                tracing::warn!("Error listing branches for {}/{}: {}", org, record.name, e);
                errors.push(format!("Branches for {}/{}: {}", org, record.name, e));
                Vec::new()
            }
        };
        let workspaces = match workspaces {
            Ok(workspaces) => workspaces.into_iter().map(workspace_info).collect(),
            Err(e) => {
                tracing::warn!("Error listing workspaces for {}/{}: {}", org, record.name, e);
                errors.push(format!("Workspaces for {}/{}: {}", org, record.name, e));
                Vec::new()
            }
        };

        let (category, tags) = match org_config.override_for(&record.name) {
            Some(repo_override) => (repo_override.category.clone(), repo_override.tags.clone()),
            None => (DEFAULT_CATEGORY.to_string(), Vec::new()),
        };

        let mut repo = RepoData::new(org.to_string(), record.name);
        if let Some(full_name) = record.full_name {
            repo.full_name = full_name;
        }
        repo.description = record.description;
        repo.url = record.html_url.unwrap_or_default();
        repo.default_branch = default_branch;
        repo.language = record.language;
        repo.updated_at = record.updated_at;
        repo.pushed_at = record.pushed_at;
        repo.commit_count = commit_count;
        repo.category = category;
        repo.tags = tags;
        repo.branches = branches;

        Collected::new(RepoView::new(repo.with_workspaces(workspaces)), errors)
    }

    /// Comparison data is best-effort: a failed compare leaves the branch at 0/0
    /// without recording an error.
    async fn compare_branches(
        &self,
        org: &str,
        repo: &str,
        default_branch: &str,
        branches: Vec<BranchRecord>,
    ) -> Vec<BranchInfo> {
        stream::iter(branches)
            .map(|branch| async move {
                if branch.name == default_branch {
                    return BranchInfo::default_branch(branch.name);
                }

                let comparison = limited(
                    &self.permits,
                    self.repository_host
                        .compare_branches(org, repo, default_branch, &branch.name),
                )
                .await;
                match comparison {
                    Ok(comparison) => BranchInfo::compared(branch.name, comparison.ahead_by, comparison.behind_by),
                    Err(e) => {
                        tracing::debug!("Skipping comparison of {}/{}:{}: {}", org, repo, branch.name, e);
                        BranchInfo::compared(branch.name, 0, 0)
                    }
                }
            })
            .buffered(self.fan_out())
            .collect()
            .await
    }
}

async fn fetch_fleet_org(
    fleet_host: &dyn FleetHost,
    permits: &Semaphore,
    fleet_org: &FleetOrgConfig,
) -> Collected<Vec<FleetAppInfo>> {
    let apps = match limited(permits, fleet_host.list_apps(&fleet_org.slug)).await {
        Ok(apps) => apps,
        Err(e) => {
            tracing::warn!("Error listing fleet apps for {}: {}", fleet_org.slug, e);
            return Collected::new(Vec::new(), vec![format!("Fleet org {}: {}", fleet_org.slug, e)]);
        }
    };

    let named: Vec<AppRecord> = apps.into_iter().filter(|app| !app.name.is_empty()).collect();
    let machines = join_all(
        named
            .iter()
            .map(|app| limited(permits, fleet_host.list_machines(&app.name))),
    )
    .await;

    let mut errors = Vec::new();
    let infos: Vec<FleetAppInfo> = named
        .into_iter()
        .zip(machines)
        .map(|(app, machines)| {
            let machines = match machines {
                Ok(records) => records
                    .into_iter()
                    .map(|m| FleetMachine::new(m.id, m.name, m.state, m.region, m.image))
                    .collect(),
                Err(e) => {
                    tracing::warn!("Error listing machines for {}: {}", app.name, e);
                    errors.push(format!("Fleet machines for {}: {}", app.name, e));
                    Vec::new()
                }
            };
            FleetAppInfo::new(app.name, fleet_org.slug.clone(), app.status, app.hostname, machines)
        })
        .collect();

    Collected::new(infos, errors)
}

/// Hold one request permit while `request` runs. Permits are only taken around
/// single upstream calls, never across a nested fan-out.
async fn limited<F: Future>(permits: &Semaphore, request: F) -> F::Output {
    // The semaphore is never closed, so a failed acquire cannot happen
    let _permit = permits.acquire().await.ok();
    request.await
}

fn workspace_info(record: WorkspaceRecord) -> WorkspaceInfo {
    let owner = record.owner.map(|o| o.login).unwrap_or_default();
    WorkspaceInfo::new(record.name, record.state, owner)
}

/// Attach the fleet app bound to this repo in config, when the lookup has it.
/// An unknown binding is not an error.
fn attach_fleet_app(view: RepoView, org_config: &OrgConfig, lookup: &FleetLookup) -> RepoView {
    let app = org_config
        .override_for(&view.repo.name)
        .and_then(|repo_override| repo_override.fly_app.as_deref())
        .and_then(|app_name| lookup.get(app_name));

    match app {
        Some(app) => view.with_fly_app(app.clone()),
        None => view,
    }
}
