pub mod cast;
pub mod user;

pub use user::{CollectionInfo, NewUser, User};
