pub mod dashboard_repo;
pub use dashboard_repo::{DashboardRepository, DashboardStore};
pub mod user_repo;
pub use user_repo::UserRepository;
pub mod product_repo;
pub use product_repo::ProductRepository;
