use crate::models::CollectionInfo;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct TestDbResponse {
    pub message: String,
    pub collections: Vec<CollectionInfo>,
}

impl TestDbResponse {
    pub fn connected(collections: Vec<CollectionInfo>) -> Self {
        Self {
            message: "MongoDB is connected".to_string(),
            collections,
        }
    }
}
