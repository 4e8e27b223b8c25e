// Application state for HTTP handlers
use crate::application::aggregator::Aggregator;

#[derive(Clone)]
pub struct AppState {
    pub aggregator: Aggregator,
    /// Key callers must present; `None` means the API is not configured
    pub api_key: Option<String>,
}
