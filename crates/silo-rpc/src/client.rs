use std::time::Duration;

use bytes::Bytes;
use http::{HeaderMap, HeaderValue, Method, StatusCode};
use serde::Serialize;

use silo_domain::region::Region;
use silo_domain::silo::SiloMode;

use crate::attempts::{ATTEMPTS_TTL_SECS, RequestAttemptCache, attempt_key};
use crate::error::RpcError;
use crate::signing::{SIGNATURE_HEADER, sign_request};

/// Path of the outbox receiver on every silo.
pub const OUTBOX_RECEIVER_PATH: &str = "/internal/outbox";

/// Whole-request timeout. Stays below the outbox lease so a hung call fails
/// while its drainer still owns the key.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Buffered response from the counterpart silo.
#[derive(Debug, Clone)]
pub struct RpcResponse {
    pub url: String,
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

/// HTTP client for one counterpart silo.
///
/// Which silos may talk to which is fixed: control reaches regions, regions
/// reach control, and a monolith does both. A client built in any other mode
/// fails at construction.
#[derive(Clone)]
pub struct SiloClient<C> {
    mode: SiloMode,
    destination: String,
    base_url: String,
    secret: String,
    http: reqwest::Client,
    attempts: C,
    attempt_limit: u64,
}

impl<C: RequestAttemptCache> SiloClient<C> {
    /// Client from control (or a monolith) to `region`.
    pub fn region(
        mode: SiloMode,
        region: &Region,
        secret: impl Into<String>,
        attempts: C,
        attempt_limit: u64,
    ) -> Result<Self, RpcError> {
        Self::new(
            "region",
            mode,
            &[SiloMode::Control, SiloMode::Monolith],
            region.name.clone(),
            &region.address,
            secret,
            attempts,
            attempt_limit,
        )
    }

    /// Client from a region (or a monolith) to control.
    pub fn control(
        mode: SiloMode,
        address: &str,
        secret: impl Into<String>,
        attempts: C,
        attempt_limit: u64,
    ) -> Result<Self, RpcError> {
        Self::new(
            "control",
            mode,
            &[SiloMode::Region, SiloMode::Monolith],
            "control".to_owned(),
            address,
            secret,
            attempts,
            attempt_limit,
        )
    }

    #[allow(clippy::too_many_arguments)]
    fn new(
        client: &'static str,
        mode: SiloMode,
        allowed: &[SiloMode],
        destination: String,
        address: &str,
        secret: impl Into<String>,
        attempts: C,
        attempt_limit: u64,
    ) -> Result<Self, RpcError> {
        if !allowed.contains(&mode) {
            return Err(RpcError::DisallowedMode { client, mode });
        }
        let base_url = reqwest::Url::parse(address)
            .map_err(|e| RpcError::InvalidUrl(format!("{address}: {e}")))?
            .as_str()
            .trim_end_matches('/')
            .to_owned();
        Ok(Self {
            mode,
            destination,
            base_url,
            secret: secret.into(),
            http: http_client(DEFAULT_REQUEST_TIMEOUT)?,
            attempts,
            attempt_limit,
        })
    }

    /// Replace the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, RpcError> {
        self.http = http_client(timeout)?;
        Ok(self)
    }

    pub fn destination(&self) -> &str {
        &self.destination
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url_for(&self, path_and_query: &str) -> String {
        format!("{}{}", self.base_url, path_and_query)
    }

    /// Signed JSON `POST`, counted against the attempt cap for `prefix`.
    pub async fn post_json<T: Serialize>(
        &self,
        path: &str,
        body: &T,
        prefix: &str,
    ) -> Result<RpcResponse, RpcError> {
        let body = serde_json::to_vec(body)?;
        let mut headers = HeaderMap::new();
        headers.insert(
            http::header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        );
        self.request(Method::POST, path, headers, Bytes::from(body), prefix)
            .await
    }

    /// Signed request with the attempt cap applied.
    ///
    /// The counter is bumped before the call; once it passes the limit the
    /// request is refused with [`RpcError::AttemptsExceeded`] and nothing is
    /// sent. A 2xx answer clears the counter.
    pub async fn request(
        &self,
        method: Method,
        path_and_query: &str,
        headers: HeaderMap,
        body: Bytes,
        prefix: &str,
    ) -> Result<RpcResponse, RpcError> {
        let path = path_and_query
            .split_once('?')
            .map_or(path_and_query, |(path, _)| path);
        let key = attempt_key(prefix, &self.destination, &method, path);

        let attempts = self.attempts.increment(&key, ATTEMPTS_TTL_SECS).await?;
        if attempts > self.attempt_limit {
            return Err(RpcError::AttemptsExceeded { signature: key });
        }

        let response = self.send(method, path_and_query, headers, body).await?;
        let status = response.status;
        if status.is_success() {
            self.attempts.clear(&key).await?;
            Ok(response)
        } else if status.is_server_error() {
            Err(RpcError::Upstream {
                url: response.url,
                status,
            })
        } else {
            Err(RpcError::Rejected {
                url: response.url,
                status,
            })
        }
    }

    /// Signed request without attempt accounting or status mapping.
    pub async fn send(
        &self,
        method: Method,
        path_and_query: &str,
        mut headers: HeaderMap,
        body: Bytes,
    ) -> Result<RpcResponse, RpcError> {
        let url = self.url_for(path_and_query);
        let path = path_and_query
            .split_once('?')
            .map_or(path_and_query, |(path, _)| path);
        let signature = sign_request(&self.secret, self.mode, path, &body)?;
        let signature = HeaderValue::from_str(&signature)
            .map_err(|e| RpcError::InvalidUrl(format!("signature header: {e}")))?;
        headers.insert(SIGNATURE_HEADER, signature);

        let response = self
            .http
            .request(method, &url)
            .headers(headers)
            .body(body)
            .send()
            .await
            .map_err(|source| RpcError::Transport {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .bytes()
            .await
            .map_err(|source| RpcError::Transport {
                url: url.clone(),
                source,
            })?;
        Ok(RpcResponse {
            url,
            status,
            headers,
            body,
        })
    }
}

fn http_client(timeout: Duration) -> Result<reqwest::Client, RpcError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(RpcError::Client)
}
