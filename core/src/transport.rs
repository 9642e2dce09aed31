//! The I/O seam between `UserClient` and the network.
//!
//! `UreqTransport` executes requests with a blocking ureq agent configured
//! not to treat 4xx/5xx as errors, so status interpretation stays in
//! `UserClient::parse_*`.

use std::time::Duration;

use crate::error::ApiError;
use crate::http::{HttpMethod, HttpRequest, HttpResponse};

pub trait Transport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        (**self).execute(request)
    }
}

#[derive(Debug, Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
}

impl UreqTransport {
    pub fn new(timeout: Duration) -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .timeout_global(Some(timeout))
            .build()
            .new_agent();
        Self { agent }
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        let url = request.url.as_str();
        let body = request.body.as_deref().map(str::as_bytes);

        let result = match (request.method, body) {
            (HttpMethod::Get, _) => with_headers(self.agent.get(url), request).call(),
            (HttpMethod::Delete, None) => with_headers(self.agent.delete(url), request).call(),
            (HttpMethod::Delete, Some(body)) => {
                with_headers(self.agent.delete(url).force_send_body(), request).send(body)
            }
            (HttpMethod::Post, Some(body)) => {
                with_headers(self.agent.post(url), request).send(body)
            }
            (HttpMethod::Post, None) => with_headers(self.agent.post(url), request).send_empty(),
            (HttpMethod::Put, Some(body)) => with_headers(self.agent.put(url), request).send(body),
            (HttpMethod::Put, None) => with_headers(self.agent.put(url), request).send_empty(),
        };
        let mut response = result.map_err(|e| ApiError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(k, v)| {
                (
                    k.as_str().to_string(),
                    v.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| ApiError::Transport(e.to_string()))?;

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

fn with_headers<B>(
    mut builder: ureq::RequestBuilder<B>,
    request: &HttpRequest,
) -> ureq::RequestBuilder<B> {
    for (name, value) in &request.headers {
        builder = builder.header(name.as_str(), value.as_str());
    }
    builder
}
