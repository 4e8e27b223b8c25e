// Infrastructure layer - External dependencies and adapters
pub mod config;
pub mod fly_client;
pub mod github_client;
pub mod http_response;
