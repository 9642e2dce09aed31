//! Stateless HTTP request builder and response parser for the user API.
//!
//! # Design
//! `UserClient` holds only a `base_url` and carries no mutable state between
//! calls. Each operation is split into a `build_*` method that produces an
//! `HttpRequest` and a `parse_*` method that consumes an `HttpResponse`.
//! `UserApi` wires the two halves through a transport and the retry loop.

use serde::de::DeserializeOwned;
use serde_json::Value;
use url::form_urlencoded;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::types::{DeleteUser, MessageBody, User, UserItem, UserList};

pub const DEFAULT_CREATED_MESSAGE: &str = "User added successfully";
pub const DEFAULT_UPDATED_MESSAGE: &str = "User updated successfully";
pub const DEFAULT_DELETED_MESSAGE: &str = "User deleted successfully";

/// Synchronous, stateless client for the user API.
#[derive(Debug, Clone)]
pub struct UserClient {
    base_url: String,
}

impl UserClient {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn build_list_users(&self) -> HttpRequest {
        self.request(HttpMethod::Get, "/getusers", None)
    }

    pub fn build_get_user(&self, user_id: &str) -> HttpRequest {
        let id: String = form_urlencoded::byte_serialize(user_id.as_bytes()).collect();
        self.request(HttpMethod::Get, &format!("/getuser?userId={id}"), None)
    }

    pub fn build_create_user(&self, user: &User) -> Result<HttpRequest, ApiError> {
        let body = to_json(user)?;
        Ok(self.request(HttpMethod::Post, "/insertuser", Some(body)))
    }

    pub fn build_update_user(&self, user: &User) -> Result<HttpRequest, ApiError> {
        let body = to_json(user)?;
        Ok(self.request(HttpMethod::Put, "/edituser", Some(body)))
    }

    pub fn build_delete_user(&self, user_id: &str) -> Result<HttpRequest, ApiError> {
        let body = to_json(&DeleteUser {
            user_id: user_id.to_string(),
        })?;
        Ok(self.request(HttpMethod::Delete, "/deleteuser", Some(body)))
    }

    pub fn parse_list_users(&self, response: HttpResponse) -> Result<Vec<User>, ApiError> {
        check_status(&response)?;
        let list: UserList = decode(&response.body)?;
        Ok(list.items)
    }

    pub fn parse_get_user(&self, response: HttpResponse) -> Result<User, ApiError> {
        check_status(&response)?;
        let found: UserItem = decode(&response.body)?;
        Ok(found.item)
    }

    pub fn parse_create_user(&self, response: HttpResponse) -> Result<String, ApiError> {
        parse_message(response, DEFAULT_CREATED_MESSAGE)
    }

    pub fn parse_update_user(&self, response: HttpResponse) -> Result<String, ApiError> {
        parse_message(response, DEFAULT_UPDATED_MESSAGE)
    }

    pub fn parse_delete_user(&self, response: HttpResponse) -> Result<String, ApiError> {
        parse_message(response, DEFAULT_DELETED_MESSAGE)
    }

    fn request(&self, method: HttpMethod, path: &str, body: Option<String>) -> HttpRequest {
        let mut headers = vec![("accept".to_string(), "application/json".to_string())];
        if body.is_some() {
            headers.push(("content-type".to_string(), "application/json".to_string()));
        }
        HttpRequest {
            method,
            url: format!("{}{path}", self.base_url),
            headers,
            body,
        }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<String, ApiError> {
    serde_json::to_string(value).map_err(|e| ApiError::Serialization(e.to_string()))
}

/// Map a non-2xx status to `ApiError::Http`, preferring the body's `message`.
fn check_status(response: &HttpResponse) -> Result<(), ApiError> {
    if response.is_success() {
        return Ok(());
    }
    Err(ApiError::Http {
        status: response.status,
        message: error_message(response.status, &response.body),
    })
}

fn error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<MessageBody>(body)
        .ok()
        .and_then(|b| b.message)
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| format!("HTTP error! status: {status}"))
}

fn parse_message(response: HttpResponse, default: &str) -> Result<String, ApiError> {
    check_status(&response)?;
    if response.body.trim().is_empty() {
        return Ok(default.to_string());
    }
    let body: MessageBody = decode(&response.body)?;
    Ok(body
        .message
        .filter(|m| !m.trim().is_empty())
        .unwrap_or_else(|| default.to_string()))
}

/// Decode a 2xx body, unwrapping an API Gateway proxy envelope if present.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, ApiError> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ApiError::Deserialization(e.to_string()))?;
    let value = unwrap_proxy_envelope(value)?;
    serde_json::from_value(value).map_err(|e| ApiError::Deserialization(e.to_string()))
}

// `{ "statusCode": 200, "body": "{\"items\":[...]}" }`
fn unwrap_proxy_envelope(value: Value) -> Result<Value, ApiError> {
    let status = value.get("statusCode").and_then(Value::as_u64);
    let inner = value.get("body").and_then(Value::as_str).map(str::to_owned);
    let (Some(status), Some(inner)) = (status, inner) else {
        return Ok(value);
    };
    let status = u16::try_from(status).unwrap_or(u16::MAX);
    if !(200..300).contains(&status) {
        return Err(ApiError::Http {
            status,
            message: error_message(status, &inner),
        });
    }
    serde_json::from_str(&inner).map_err(|e| ApiError::Deserialization(e.to_string()))
}
