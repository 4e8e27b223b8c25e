// Fly.io Machines API implementation of the fleet host
use crate::application::fleet_host::{AppRecord, FleetHost, MachineRecord};
use crate::application::host_error::HostError;
use crate::infrastructure::http_response::{decode_json, ensure_success, segment};
use async_trait::async_trait;
use reqwest::header;
use serde::de::DeserializeOwned;
use serde::Deserialize;

pub const FLY_API_URL: &str = "https://api.machines.dev";

#[derive(Debug, Clone)]
pub struct FlyClient {
    http: reqwest::Client,
    base_url: String,
    token: String,
}

/// `/v1/apps` answers either with a bare list or with the list wrapped in an object
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum AppsResponse {
    Bare(Vec<AppRecord>),
    Wrapped { apps: Vec<AppRecord> },
}

impl From<AppsResponse> for Vec<AppRecord> {
    fn from(response: AppsResponse) -> Self {
        match response {
            AppsResponse::Bare(apps) => apps,
            AppsResponse::Wrapped { apps } => apps,
        }
    }
}

impl FlyClient {
    pub fn new(http: reqwest::Client, token: String) -> Self {
        Self {
            http,
            base_url: FLY_API_URL.to_string(),
            token,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str, query: &[(&str, &str)]) -> Result<T, HostError> {
        let response = self
            .http
            .get(url)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.token))
            .header(header::ACCEPT, "application/json")
            .query(query)
            .send()
            .await?;

        decode_json(ensure_success(response).await?).await
    }
}

#[async_trait]
impl FleetHost for FlyClient {
    async fn list_apps(&self, org_slug: &str) -> Result<Vec<AppRecord>, HostError> {
        let url = format!("{}/v1/apps", self.base_url);
        let response: AppsResponse = self.get_json(&url, &[("org_slug", org_slug)]).await?;
        Ok(response.into())
    }

    async fn list_machines(&self, app_name: &str) -> Result<Vec<MachineRecord>, HostError> {
        let url = format!("{}/v1/apps/{}/machines", self.base_url, segment(app_name));
        self.get_json(&url, &[]).await
    }
}
