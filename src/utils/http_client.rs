//! HTTP transport used by every OpenSpeech call.
//!
//! Thin wrapper over a shared `reqwest::Client`: each call carries its own
//! timeout and headers, and the reply is returned as status, declared
//! content length and fully read body. Callers decide what a failure is via
//! [`HttpReply::into_success_body`].

use std::time::{Duration, Instant};

use bytes::Bytes;
use reqwest::header::{CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, StatusCode};
use serde::Serialize;
use tracing::debug;

use crate::core::tts::{TTSError, TTSResult};

/// Longest response body excerpt written to the request log.
const LOG_BODY_LIMIT: usize = 4096;

/// Request payload.
#[derive(Debug, Clone)]
pub enum RequestBody {
    /// No body, no query string
    Empty,
    /// JSON body (`Content-Type: application/json`)
    Json(serde_json::Value),
    /// URL query parameters, for GET requests
    Query(Vec<(String, String)>),
}

impl RequestBody {
    pub fn json<T: Serialize>(value: &T) -> TTSResult<Self> {
        serde_json::to_value(value)
            .map(Self::Json)
            .map_err(|e| TTSError::InvalidConfiguration(format!("json marshal error: {e}")))
    }
}

/// Raw reply from the server.
#[derive(Debug, Clone)]
pub struct HttpReply {
    pub status: StatusCode,
    /// `Content-Length` as declared by the server, if any
    pub content_length: Option<u64>,
    pub body: Bytes,
}

impl HttpReply {
    /// Return the body when the server answered 200 with a non-empty payload.
    pub fn into_success_body(self) -> TTSResult<Bytes> {
        if self.status != StatusCode::OK {
            return Err(TTSError::HttpStatus {
                status: self.status.as_u16(),
                body: String::from_utf8_lossy(&self.body).into_owned(),
            });
        }
        if self.content_length == Some(0) || self.body.is_empty() {
            return Err(TTSError::EmptyResponse);
        }
        Ok(self.body)
    }
}

/// Shared HTTP transport.
///
/// Cloning is cheap; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: reqwest::Client,
    log_requests: bool,
}

impl HttpTransport {
    pub fn new(log_requests: bool) -> TTSResult<Self> {
        let client = reqwest::Client::builder()
            .pool_idle_timeout(Duration::from_secs(90))
            .build()
            .map_err(|e| {
                TTSError::InvalidConfiguration(format!("Failed to build HTTP client: {e}"))
            })?;
        Ok(Self::with_client(client, log_requests))
    }

    pub fn with_client(client: reqwest::Client, log_requests: bool) -> Self {
        Self {
            client,
            log_requests,
        }
    }

    /// Underlying client, for plain downloads.
    pub fn client(&self) -> &reqwest::Client {
        &self.client
    }

    /// Perform one request and read the full reply.
    ///
    /// Only failures to obtain a reply are errors here; status handling is
    /// left to the caller.
    pub async fn send(
        &self,
        method: Method,
        url: &str,
        headers: HeaderMap,
        body: RequestBody,
        timeout: Duration,
    ) -> TTSResult<HttpReply> {
        let started = Instant::now();
        let mut builder = self
            .client
            .request(method.clone(), url)
            .headers(headers)
            .timeout(timeout);

        builder = match &body {
            RequestBody::Empty => builder,
            RequestBody::Json(value) => builder
                .header(CONTENT_TYPE, "application/json")
                .body(value.to_string()),
            RequestBody::Query(params) => builder.query(params),
        };

        let response = builder.send().await?;
        let status = response.status();
        let content_length = response.content_length();
        let bytes = response.bytes().await?;

        if self.log_requests {
            self.log_exchange(&method, url, &body, status, &bytes, started.elapsed());
        }

        Ok(HttpReply {
            status,
            content_length,
            body: bytes,
        })
    }

    fn log_exchange(
        &self,
        method: &Method,
        url: &str,
        body: &RequestBody,
        status: StatusCode,
        response: &Bytes,
        elapsed: Duration,
    ) {
        let request = match body {
            RequestBody::Empty => String::new(),
            RequestBody::Json(value) => value.to_string(),
            RequestBody::Query(params) => format!("{params:?}"),
        };
        let excerpt = &response[..response.len().min(LOG_BODY_LIMIT)];

        debug!(
            method = %method,
            url = %url,
            request = %request,
            resp_code = status.as_u16(),
            resp = %String::from_utf8_lossy(excerpt),
            elapsed_ms = elapsed.as_millis() as u64,
            "http client request log"
        );
    }
}

/// Build a header map from name/value pairs.
pub fn headers<'a>(pairs: impl IntoIterator<Item = (&'a str, String)>) -> TTSResult<HeaderMap> {
    let mut map = HeaderMap::new();
    for (name, value) in pairs {
        let name = HeaderName::from_bytes(name.as_bytes())
            .map_err(|e| TTSError::InvalidConfiguration(format!("invalid header {name}: {e}")))?;
        let value = HeaderValue::from_str(&value)
            .map_err(|e| TTSError::InvalidConfiguration(format!("invalid header value: {e}")))?;
        map.insert(name, value);
    }
    Ok(map)
}
