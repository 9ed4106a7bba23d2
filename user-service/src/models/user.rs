//! User document as stored in the `users` collection.

use mongodb::bson::{doc, oid::ObjectId, Document};
use serde::{Deserialize, Serialize};

pub const USERS_COLLECTION: &str = "users";

/// Stored user. Both attributes are optional and unconstrained; absent
/// values are omitted from the document rather than stored as null.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    #[serde(rename = "_id")]
    pub id: ObjectId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age: Option<f64>,
}

/// A user before the database has assigned an identifier.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NewUser {
    pub name: Option<String>,
    pub age: Option<f64>,
}

impl User {
    pub fn from_new(new_user: NewUser) -> Self {
        Self {
            id: ObjectId::new(),
            name: new_user.name,
            age: new_user.age,
        }
    }
}

/// One entry of a database's collection listing, in the shape the
/// `listCollections` command reports it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CollectionInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub options: Document,
    #[serde(default)]
    pub info: Document,
    #[serde(rename = "idIndex", default, skip_serializing_if = "Option::is_none")]
    pub id_index: Option<Document>,
}

impl CollectionInfo {
    /// A plain writable collection with the default `_id` index.
    pub fn collection(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "collection".to_string(),
            options: Document::new(),
            info: doc! { "readOnly": false },
            id_index: Some(doc! { "v": 2, "key": { "_id": 1 }, "name": "_id_" }),
        }
    }
}
