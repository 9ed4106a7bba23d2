pub mod health;
pub mod metrics;
pub mod root;
pub mod users;

pub use health::test_db;
pub use metrics::metrics;
pub use root::{root, LIVENESS_MESSAGE};
pub use users::create_user;
