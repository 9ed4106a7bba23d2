pub mod health;
pub mod users;

pub use health::TestDbResponse;
pub use users::{CreateUserRequest, CreateUserResponse, UserResponse};
