// Domain layer - View model and derived signals
pub mod dashboard;
pub mod fleet;
pub mod repository;
