//! Test transports shared by the unit tests in this crate.

use std::cell::RefCell;
use std::collections::{BTreeMap, VecDeque};

use serde_json::json;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};
use crate::transport::Transport;
use crate::types::{DeleteUser, User};

/// Replays a fixed queue of results and records every request it sees.
pub struct ScriptedTransport {
    script: RefCell<VecDeque<Result<HttpResponse, ApiError>>>,
    seen: RefCell<Vec<HttpRequest>>,
}

impl ScriptedTransport {
    pub fn new(script: impl IntoIterator<Item = Result<HttpResponse, ApiError>>) -> Self {
        Self {
            script: RefCell::new(script.into_iter().collect()),
            seen: RefCell::new(Vec::new()),
        }
    }

    pub fn calls(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn requests(&self) -> Vec<HttpRequest> {
        self.seen.borrow().clone()
    }
}

impl Transport for ScriptedTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.seen.borrow_mut().push(request.clone());
        self.script
            .borrow_mut()
            .pop_front()
            .unwrap_or_else(|| Err(ApiError::Transport("script exhausted".to_string())))
    }
}

/// In-memory implementation of the user endpoints.
///
/// `fail_next` makes the following requests answer 503 regardless of route.
#[derive(Default)]
pub struct FakeBackend {
    users: RefCell<BTreeMap<String, User>>,
    failures: RefCell<u32>,
    seen: RefCell<Vec<HttpRequest>>,
}

impl FakeBackend {
    pub fn with_users(users: impl IntoIterator<Item = User>) -> Self {
        let backend = Self::default();
        backend
            .users
            .borrow_mut()
            .extend(users.into_iter().map(|u| (u.user_id.clone(), u)));
        backend
    }

    pub fn fail_next(&self, n: u32) {
        *self.failures.borrow_mut() = n;
    }

    pub fn calls(&self) -> usize {
        self.seen.borrow().len()
    }

    pub fn users(&self) -> Vec<User> {
        self.users.borrow().values().cloned().collect()
    }

    fn route(&self, request: &HttpRequest) -> HttpResponse {
        let path = request.url.split("://").nth(1).unwrap_or(&request.url);
        let path = path.find('/').map_or("", |i| &path[i..]);
        let mut users = self.users.borrow_mut();
        match (request.method, path) {
            (HttpMethod::Get, "/getusers") => {
                let items: Vec<&User> = users.values().collect();
                respond(200, json!({ "items": items }))
            }
            (HttpMethod::Post, "/insertuser") => {
                let user: User = body(request);
                if users.contains_key(&user.user_id) {
                    return respond(409, json!({ "message": "User already exists" }));
                }
                users.insert(user.user_id.clone(), user);
                respond(200, json!({ "message": "Inserted" }))
            }
            (HttpMethod::Put, "/edituser") => {
                let user: User = body(request);
                match users.get_mut(&user.user_id) {
                    Some(existing) => {
                        *existing = user;
                        respond(200, json!({ "message": "Updated" }))
                    }
                    None => respond(404, json!({ "message": "User not found" })),
                }
            }
            (HttpMethod::Delete, "/deleteuser") => {
                let target: DeleteUser = body(request);
                match users.remove(&target.user_id) {
                    Some(_) => respond(200, json!({})),
                    None => respond(404, json!({ "message": "User not found" })),
                }
            }
            _ => respond(404, json!({ "message": "no such route" })),
        }
    }
}

impl Transport for FakeBackend {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        self.seen.borrow_mut().push(request.clone());
        let mut failures = self.failures.borrow_mut();
        if *failures > 0 {
            *failures -= 1;
            return Ok(respond(503, json!({ "message": "Service temporarily unavailable" })));
        }
        drop(failures);
        Ok(self.route(request))
    }
}

fn body<T: serde::de::DeserializeOwned>(request: &HttpRequest) -> T {
    serde_json::from_str(request.body.as_deref().unwrap_or("{}")).unwrap()
}

fn respond(status: u16, body: serde_json::Value) -> HttpResponse {
    HttpResponse::new(status, body.to_string())
}
