use crate::models::{cast, NewUser, User};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use service_core::error::AppError;

/// Body of `POST /users`.
///
/// Fields keep the JSON value the client sent, whatever its type. `null`
/// is kept as present-but-null. Casting to the stored types happens in
/// [`NewUser::try_from`], so a value that cannot be cast fails the write
/// rather than the parse. Unknown fields are ignored.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
pub struct CreateUserRequest {
    #[serde(default, deserialize_with = "present")]
    pub name: Option<Value>,
    #[serde(default, deserialize_with = "present")]
    pub age: Option<Value>,
}

fn present<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Value::deserialize(deserializer).map(Some)
}

impl CreateUserRequest {
    /// An empty body, or any JSON value that is not an object, carries no
    /// fields. Only syntactically invalid JSON is rejected.
    pub fn from_body(body: &[u8]) -> Result<Self, AppError> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return Ok(Self::default());
        }

        let value: Value = serde_json::from_slice(body).map_err(|e| {
            AppError::BadRequest(anyhow::anyhow!("Invalid request body: {}", e))
        })?;

        match value {
            Value::Object(_) => serde_json::from_value(value).map_err(|e| {
                AppError::BadRequest(anyhow::anyhow!("Invalid request body: {}", e))
            }),
            _ => Ok(Self::default()),
        }
    }

    /// Interpolates the received values as sent; absent ones read `undefined`.
    pub fn confirmation_message(&self) -> String {
        format!(
            "Received, {}! and you are {} years old.",
            render(self.name.as_ref()),
            render(self.age.as_ref())
        )
    }
}

impl TryFrom<CreateUserRequest> for NewUser {
    type Error = AppError;

    fn try_from(req: CreateUserRequest) -> Result<Self, Self::Error> {
        Ok(NewUser {
            name: cast::to_string_field("name", req.name.as_ref())?,
            age: cast::to_number_field("age", req.age.as_ref())?,
        })
    }
}

fn render(value: Option<&Value>) -> String {
    match value {
        None => "undefined".to_string(),
        Some(v) => render_value(v),
    }
}

fn render_value(value: &Value) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => cast::format_number(n),
        Value::String(s) => s.clone(),
        Value::Array(items) => items
            .iter()
            .map(|item| match item {
                Value::Null => String::new(),
                other => render_value(other),
            })
            .collect::<Vec<_>>()
            .join(","),
        Value::Object(_) => "[object Object]".to_string(),
    }
}

/// Stored user as returned to clients, with `_id` as a hex string.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UserResponse {
    #[serde(rename = "_id")]
    pub id: String,
    pub name: Option<String>,
    pub age: Option<f64>,
}

impl From<User> for UserResponse {
    fn from(u: User) -> Self {
        Self {
            id: u.id.to_hex(),
            name: u.name,
            age: u.age,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateUserResponse {
    pub message: String,
    pub user: UserResponse,
}
