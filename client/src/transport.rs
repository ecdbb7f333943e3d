//! The seam between the wrapper and the network.
//!
//! # Design
//! A transport turns a signed `HttpRequest` into an `Exchange`. Every answer
//! from the server is `Exchange::Completed`, whatever its status, because the
//! remote API reports its own failures in the body. Only a failure to obtain
//! an answer at all becomes `Exchange::NoResponse`. Transports never return
//! `Err` and never retry.

use std::future::Future;
use std::time::Duration;

use catalog_core::{ApiError, Exchange, HttpRequest, HttpResponse, Result};
use tracing::{instrument, warn, Span};

/// Executes one request/response exchange.
pub trait Transport: Send + Sync {
    fn send(&self, request: &HttpRequest) -> impl Future<Output = Exchange> + Send;
}

/// Default transport over a shared `reqwest::Client`.
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    /// Builds the underlying client. Without `timeout` a call waits as long as
    /// the connection stays open.
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ApiError::InvalidConfiguration(format!("HTTP client: {e}")))?;
        Ok(Self { client })
    }

    /// Wraps an already configured client, e.g. one shared with other code.
    pub fn from_client(client: reqwest::Client) -> Self {
        Self { client }
    }
}

impl Transport for ReqwestTransport {
    #[instrument(
        skip_all,
        fields(method = request.method.as_str(), status = tracing::field::Empty, body_len = tracing::field::Empty)
    )]
    async fn send(&self, request: &HttpRequest) -> Exchange {
        let mut call = self.client.get(&request.path);
        for (name, value) in &request.headers {
            call = call.header(name, value);
        }

        let response = match call.send().await {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "request failed without a response");
                return Exchange::NoResponse(e.to_string());
            }
        };

        let status = response.status().as_u16();
        Span::current().record("status", status);
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();

        match response.text().await {
            Ok(body) => {
                Span::current().record("body_len", body.len());
                Exchange::Completed(HttpResponse { status, headers, body })
            }
            Err(e) => {
                warn!(status, error = %e, "connection lost while reading body");
                Exchange::NoResponse(format!("reading response body: {e}"))
            }
        }
    }
}
