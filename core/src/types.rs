//! Domain DTOs for the user API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! integration tests catch drift between the two crates. Field names follow
//! the wire format (`userId`) through `rename_all = "camelCase"`.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};

/// A single user record.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub username: String,
    #[serde(deserialize_with = "number_or_numeric_string")]
    pub age: u32,
}

impl User {
    pub fn new(user_id: impl Into<String>, username: impl Into<String>, age: u32) -> Self {
        Self {
            user_id: user_id.into(),
            username: username.into(),
            age,
        }
    }
}

/// Body of `GET /getusers`. A missing or null `items` field means an empty list.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UserList {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub items: Vec<User>,
}

/// Body of `GET /getuser`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserItem {
    pub item: User,
}

/// Request payload for `DELETE /deleteuser`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUser {
    pub user_id: String,
}

/// Confirmation or error body carrying an optional human-readable message.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MessageBody {
    #[serde(default)]
    pub message: Option<String>,
}

fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<User>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<User>>::deserialize(deserializer)?.unwrap_or_default())
}

// Some backends store age as a string; accept "30" as well as 30.
fn number_or_numeric_string<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u32),
        Text(String),
    }

    match Raw::deserialize(deserializer)? {
        Raw::Number(n) => Ok(n),
        Raw::Text(s) => s
            .trim()
            .parse()
            .map_err(|_| de::Error::custom(format!("invalid age: {s:?}"))),
    }
}
