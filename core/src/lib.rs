//! Resilient API client and view-state controller for the user service.
//!
//! # Overview
//! `UserClient` builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network. `UserApi` runs them through a `Transport`
//! inside a bounded retry loop. `UserController` sits on top, validating
//! input locally and refetching the full list after every change.
//!
//! # Design
//! - `UserClient` is stateless; it holds only the base URL.
//! - Each operation is split into `build_*` and `parse_*`, so the I/O
//!   boundary is explicit and `Transport` is the only seam that does I/O.
//! - Time flows through `Clock`, so backoff waits and the success-message
//!   expiry are deterministic under `ManualClock`.
//! - Configuration is an explicit `ApiConfig` value validated at startup.
//! - DTOs are defined independently from the mock-server crate; integration
//!   tests catch schema drift.

pub mod api;
pub mod client;
pub mod clock;
pub mod config;
pub mod controller;
pub mod error;
pub mod http;
pub mod retry;
pub mod transport;
pub mod types;
pub mod validation;

#[cfg(test)]
mod testing;

pub use api::UserApi;
pub use client::UserClient;
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ApiConfig, ConfigError};
pub use controller::{Flash, Outcome, UserController, ViewState, SUCCESS_MESSAGE_TTL};
pub use error::ApiError;
pub use http::{HttpMethod, HttpRequest, HttpResponse};
pub use retry::RetryPolicy;
pub use transport::{Transport, UreqTransport};
pub use types::User;
pub use validation::{EditSession, Field, FieldErrors, UserForm};
