//! Resilient user API: `UserClient` + `Transport` + `RetryPolicy`.
//!
//! # Design
//! Each operation builds its request once, then runs send-and-parse inside
//! the retry loop. Parsing is part of the attempt: a 2xx with an unreadable
//! body fails the attempt just like a 5xx does. Serialization failures
//! happen before the loop and are returned immediately.

use tracing::{debug, info_span};

use crate::client::UserClient;
use crate::clock::{Clock, SystemClock};
use crate::config::ApiConfig;
use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse};
use crate::retry::RetryPolicy;
use crate::transport::{Transport, UreqTransport};
use crate::types::User;

pub struct UserApi<T, C = SystemClock> {
    client: UserClient,
    transport: T,
    clock: C,
    retry: RetryPolicy,
}

impl UserApi<UreqTransport, SystemClock> {
    /// Production wiring: ureq transport, OS clock, policy from `config`.
    pub fn from_config(config: &ApiConfig) -> Self {
        UserApi::new(
            UserClient::new(config.base_url()),
            UreqTransport::new(config.timeout()),
            SystemClock,
        )
        .with_retry(config.retry())
    }
}

impl<T: Transport, C: Clock> UserApi<T, C> {
    pub fn new(client: UserClient, transport: T, clock: C) -> Self {
        Self {
            client,
            transport,
            clock,
            retry: RetryPolicy::default(),
        }
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn client(&self) -> &UserClient {
        &self.client
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        self.retry
    }

    pub fn list_users(&self) -> Result<Vec<User>, ApiError> {
        let request = self.client.build_list_users();
        self.send("list_users", &request, |r| self.client.parse_list_users(r))
    }

    pub fn get_user(&self, user_id: &str) -> Result<User, ApiError> {
        let request = self.client.build_get_user(user_id);
        self.send("get_user", &request, |r| self.client.parse_get_user(r))
    }

    pub fn create_user(&self, user: &User) -> Result<String, ApiError> {
        let request = self.client.build_create_user(user)?;
        self.send("create_user", &request, |r| self.client.parse_create_user(r))
    }

    pub fn update_user(&self, user: &User) -> Result<String, ApiError> {
        let request = self.client.build_update_user(user)?;
        self.send("update_user", &request, |r| self.client.parse_update_user(r))
    }

    pub fn delete_user(&self, user_id: &str) -> Result<String, ApiError> {
        let request = self.client.build_delete_user(user_id)?;
        self.send("delete_user", &request, |r| self.client.parse_delete_user(r))
    }

    fn send<R>(
        &self,
        operation: &'static str,
        request: &HttpRequest,
        parse: impl Fn(HttpResponse) -> Result<R, ApiError>,
    ) -> Result<R, ApiError> {
        let _span = info_span!("api", operation).entered();
        self.retry.run(&self.clock, |attempt| {
            debug!(
                attempt,
                method = request.method.as_str(),
                url = %request.url,
                "sending request"
            );
            self.transport.execute(request).and_then(&parse)
        })
    }
}
