pub mod dashboard;
pub mod products;
