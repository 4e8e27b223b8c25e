// Fleet host contract - apps and the machines behind them
use crate::application::host_error::HostError;
use async_trait::async_trait;
use serde::Deserialize;

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct AppRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub hostname: String,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct MachineRecord {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default = "unknown_state")]
    pub state: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub image: String,
}

fn unknown_state() -> String {
    "unknown".to_string()
}

#[async_trait]
pub trait FleetHost: Send + Sync {
    /// List every app in a fleet organization
    async fn list_apps(&self, org_slug: &str) -> Result<Vec<AppRecord>, HostError>;

    /// List the machines backing an app
    async fn list_machines(&self, app_name: &str) -> Result<Vec<MachineRecord>, HostError>;
}
