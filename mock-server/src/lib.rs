use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicU32, AtomicU64, Ordering},
        Arc,
    },
};

use axum::{
    extract::{Query, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{delete, get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use tracing::{info, warn};

pub const UNAVAILABLE_MESSAGE: &str = "Service temporarily unavailable";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    pub username: String,
    pub age: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Items {
    pub items: Vec<User>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Item {
    pub item: User,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct Message {
    pub message: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeleteUser {
    pub user_id: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: Option<String>,
}

pub type Db = Arc<RwLock<BTreeMap<String, User>>>;

/// Shared server state: the user table plus fault-injection counters.
#[derive(Clone, Default)]
pub struct AppState {
    db: Db,
    faults: Arc<AtomicU32>,
    hits: Arc<AtomicU64>,
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answer the next `n` requests with 503, whatever the route.
    pub fn fail_next(&self, n: u32) {
        self.faults.store(n, Ordering::SeqCst);
    }

    /// Number of requests received so far, failed ones included.
    pub fn hits(&self) -> u64 {
        self.hits.load(Ordering::SeqCst)
    }

    pub async fn seed(&self, users: impl IntoIterator<Item = User>) {
        let mut db = self.db.write().await;
        for user in users {
            db.insert(user.user_id.clone(), user);
        }
    }

    pub async fn users(&self) -> Vec<User> {
        self.db.read().await.values().cloned().collect()
    }
}

pub fn app() -> Router {
    router(AppState::default())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/getusers", get(list_users))
        .route("/getuser", get(get_user))
        .route("/insertuser", post(insert_user))
        .route("/edituser", put(edit_user))
        .route("/deleteuser", delete(delete_user))
        .layer(middleware::from_fn_with_state(state.clone(), inject_faults))
        .with_state(state)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    run_with_state(listener, AppState::default()).await
}

pub async fn run_with_state(listener: TcpListener, state: AppState) -> Result<(), std::io::Error> {
    axum::serve(listener, router(state)).await
}

type Rejection = (StatusCode, Json<Message>);

fn reject(status: StatusCode, message: impl Into<String>) -> Rejection {
    (
        status,
        Json(Message {
            message: message.into(),
        }),
    )
}

async fn inject_faults(State(state): State<AppState>, request: Request, next: Next) -> Response {
    state.hits.fetch_add(1, Ordering::SeqCst);
    let injected = state
        .faults
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok();
    if injected {
        warn!(path = %request.uri().path(), "injecting 503");
        return reject(StatusCode::SERVICE_UNAVAILABLE, UNAVAILABLE_MESSAGE).into_response();
    }
    next.run(request).await
}

fn validate(user: &User) -> Result<(), Rejection> {
    if user.user_id.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "userId is required"));
    }
    if user.username.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "username is required"));
    }
    if user.age <= 0 {
        return Err(reject(StatusCode::BAD_REQUEST, "age must be greater than 0"));
    }
    Ok(())
}

async fn list_users(State(state): State<AppState>) -> Json<Items> {
    Json(Items {
        items: state.users().await,
    })
}

async fn get_user(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Item>, Rejection> {
    let user_id = query
        .user_id
        .filter(|id| !id.trim().is_empty())
        .ok_or_else(|| reject(StatusCode::BAD_REQUEST, "userId is required"))?;
    let db = state.db.read().await;
    db.get(&user_id)
        .cloned()
        .map(|item| Json(Item { item }))
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))
}

async fn insert_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<Message>, Rejection> {
    validate(&user)?;
    let mut db = state.db.write().await;
    if db.contains_key(&user.user_id) {
        return Err(reject(
            StatusCode::CONFLICT,
            format!("User {} already exists", user.user_id),
        ));
    }
    info!(user_id = %user.user_id, "inserting user");
    let message = format!("User {} added successfully", user.user_id);
    db.insert(user.user_id.clone(), user);
    Ok(Json(Message { message }))
}

async fn edit_user(
    State(state): State<AppState>,
    Json(user): Json<User>,
) -> Result<Json<Message>, Rejection> {
    validate(&user)?;
    let mut db = state.db.write().await;
    let existing = db
        .get_mut(&user.user_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;
    info!(user_id = %user.user_id, "updating user");
    let message = format!("User {} updated successfully", user.user_id);
    *existing = user;
    Ok(Json(Message { message }))
}

async fn delete_user(
    State(state): State<AppState>,
    Json(target): Json<DeleteUser>,
) -> Result<Json<Message>, Rejection> {
    if target.user_id.trim().is_empty() {
        return Err(reject(StatusCode::BAD_REQUEST, "userId is required"));
    }
    let mut db = state.db.write().await;
    db.remove(&target.user_id)
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "User not found"))?;
    info!(user_id = %target.user_id, "deleted user");
    Ok(Json(Message {
        message: format!("User {} deleted successfully", target.user_id),
    }))
}
