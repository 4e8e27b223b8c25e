// GitHub REST implementation of the repository host
use crate::application::host_error::HostError;
use crate::application::repository_host::{
    BranchRecord, Comparison, RepoRecord, RepositoryHost, WorkspaceRecord,
};
use crate::infrastructure::http_response::{decode_json, ensure_success, segment};
use async_trait::async_trait;
use reqwest::{header, StatusCode};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

pub const GITHUB_API_URL: &str = "https://api.github.com";

const PER_PAGE: &str = "100";
/// Hard stop for `Link` chains that never end
const MAX_PAGES: usize = 50;
const USER_AGENT: &str = concat!("repo-dashboard/", env!("CARGO_PKG_VERSION"));
/// Wait before asking again when contributor stats are still being computed
const STATS_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, Clone)]
pub struct GitHubClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
    stats_retry_delay: Duration,
    authenticated_user: Arc<OnceCell<String>>,
}

#[derive(Debug, Deserialize)]
struct CodespacesResponse {
    #[serde(default)]
    codespaces: Vec<WorkspaceRecord>,
}

#[derive(Debug, Deserialize)]
struct Contributor {
    #[serde(default)]
    contributions: u64,
}

#[derive(Debug, Deserialize)]
struct AuthenticatedUser {
    login: String,
}

impl GitHubClient {
    pub fn new(http: reqwest::Client, token: String) -> Self {
        Self {
            http,
            base_url: GITHUB_API_URL.to_string(),
            token,
            stats_retry_delay: STATS_RETRY_DELAY,
            authenticated_user: Arc::new(OnceCell::new()),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    #[cfg(test)]
    pub fn with_stats_retry_delay(mut self, delay: Duration) -> Self {
        self.stats_retry_delay = delay;
        self
    }

    async fn send(&self, url: &str, query: &[(&str, &str)]) -> Result<reqwest::Response, HostError> {
        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, format!("token {}", self.token))
            .header(header::ACCEPT, "application/vnd.github+json")
            .header(header::USER_AGENT, USER_AGENT)
            .query(query)
            .send()
            .await?;
        Ok(response)
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T, HostError> {
        let response = ensure_success(self.send(url, &[]).await?).await?;
        decode_json(response).await
    }

    /// Follow `Link: <...>; rel="next"` headers until the last page
    async fn get_paginated<T: DeserializeOwned>(
        &self,
        url: &str,
        query: &[(&str, &str)],
    ) -> Result<Vec<T>, HostError> {
        let mut first_query = vec![("per_page", PER_PAGE)];
        first_query.extend_from_slice(query);

        let mut results = Vec::new();
        let mut visited = HashSet::new();
        let mut next_url = Some(url.to_string());

        while let Some(page_url) = next_url.take() {
            if visited.len() == MAX_PAGES {
                tracing::warn!("Stopping pagination of {} after {} pages", url, MAX_PAGES);
                break;
            }

            // Later pages carry their parameters in the link itself
            let page_query: &[(&str, &str)] = if visited.is_empty() { &first_query } else { &[] };
            let response = ensure_success(self.send(&page_url, page_query).await?).await?;
            visited.insert(page_url);

            next_url = response
                .headers()
                .get(header::LINK)
                .and_then(|v| v.to_str().ok())
                .and_then(parse_next_link)
                .filter(|next| {
                    let fresh = !visited.contains(next);
                    if !fresh {
                        tracing::warn!("Link header of {} points back to {}", url, next);
                    }
                    fresh
                });

            let page: Vec<T> = decode_json(response).await?;
            results.extend(page);
        }

        Ok(results)
    }

    async fn authenticated_user(&self) -> Result<&str, HostError> {
        let login = self
            .authenticated_user
            .get_or_try_init(|| async {
                let url = format!("{}/user", self.base_url);
                let user: AuthenticatedUser = self.get_json(&url).await?;
                Ok::<_, HostError>(user.login)
            })
            .await?;
        Ok(login.as_str())
    }

    fn repo_url(&self, owner: &str, repo: &str, rest: &str) -> String {
        format!("{}/repos/{}/{}/{}", self.base_url, segment(owner), segment(repo), rest)
    }
}

/// Extract the `rel="next"` target from a GitHub `Link` header
pub fn parse_next_link(link_header: &str) -> Option<String> {
    link_header.split(',').find_map(|part| {
        let mut pieces = part.split(';');
        let target = pieces.next()?.trim();
        if !pieces.any(|p| p.trim() == r#"rel="next""#) {
            return None;
        }
        target
            .strip_prefix('<')?
            .strip_suffix('>')
            .map(str::to_string)
    })
}

#[async_trait]
impl RepositoryHost for GitHubClient {
    async fn list_org_repositories(&self, org: &str) -> Result<Vec<RepoRecord>, HostError> {
        let org_url = format!("{}/orgs/{}/repos", self.base_url, segment(org));
        match self.get_paginated(&org_url, &[("type", "all")]).await {
            Err(not_found) if not_found.status() == Some(404) => {
                // Not an organization, so a personal account. Without a login
                // the org lookup failure is the more useful error.
                let login = match self.authenticated_user().await {
                    Ok(login) => login,
                    Err(e) => {
                        tracing::debug!("Could not resolve the authenticated user: {}", e);
                        return Err(not_found);
                    }
                };
                tracing::debug!("{} is not an org; listing as user (authenticated as {})", org, login);

                if login.eq_ignore_ascii_case(org) {
                    let url = format!("{}/user/repos", self.base_url);
                    self.get_paginated(&url, &[("type", "owner")]).await
                } else {
                    let url = format!("{}/users/{}/repos", self.base_url, segment(org));
                    self.get_paginated(&url, &[("type", "all")]).await
                }
            }
            other => other,
        }
    }

    async fn list_branches(&self, owner: &str, repo: &str) -> Result<Vec<BranchRecord>, HostError> {
        let url = self.repo_url(owner, repo, "branches");
        self.get_paginated(&url, &[]).await
    }

    async fn compare_branches(
        &self,
        owner: &str,
        repo: &str,
        base: &str,
        head: &str,
    ) -> Result<Comparison, HostError> {
        let url = self.repo_url(owner, repo, &format!("compare/{}...{}", segment(base), segment(head)));
        self.get_json(&url).await
    }

    async fn list_workspaces(&self, owner: &str, repo: &str) -> Result<Vec<WorkspaceRecord>, HostError> {
        let url = self.repo_url(owner, repo, "codespaces");
        let response: CodespacesResponse = self.get_json(&url).await?;
        Ok(response.codespaces)
    }

    async fn commit_count(&self, owner: &str, repo: &str) -> u64 {
        let url = self.repo_url(owner, repo, "contributors");
        let query = [("per_page", PER_PAGE), ("anon", "true")];

        for attempt in 0..2 {
            let response = match self.send(&url, &query).await {
                Ok(response) => response,
                Err(e) => {
                    tracing::debug!("Contributor stats for {}/{} unavailable: {}", owner, repo, e);
                    return 0;
                }
            };

            if response.status() == StatusCode::ACCEPTED {
                if attempt == 0 {
                    tokio::time::sleep(self.stats_retry_delay).await;
                    continue;
                }
                tracing::debug!("Contributor stats for {}/{} still computing", owner, repo);
                return 0;
            }

            let contributors: Result<Vec<Contributor>, HostError> = match ensure_success(response).await {
                Ok(response) => decode_json(response).await,
                Err(e) => Err(e),
            };
            return match contributors {
                Ok(contributors) => contributors.iter().map(|c| c.contributions).sum(),
                Err(e) => {
                    tracing::debug!("Contributor stats for {}/{} unavailable: {}", owner, repo, e);
                    0
                }
            };
        }

        0
    }
}
