pub mod authorization;
pub mod dashboard_service;
