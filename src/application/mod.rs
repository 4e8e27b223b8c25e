// Application layer - Upstream contracts and the aggregation use case
pub mod aggregator;
pub mod fleet_host;
pub mod host_error;
pub mod repository_host;
