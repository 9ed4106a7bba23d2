pub mod connector;
pub mod database;
pub mod memory;
pub mod metrics;

pub use connector::{connect_in_background, connect_with};
pub use database::{DatabaseHandle, MongoUserRepository, UserRepository};
pub use memory::InMemoryUserRepository;
pub use metrics::{get_metrics, init_metrics};
