//! Long-text asynchronous synthesis jobs.
//!
//! The service synthesizes long text offline: a submit call returns a task id,
//! and a query call reports the task state and, once finished, a download URL
//! valid for one hour. Both calls are stateless; polling is left to the caller.
//!
//! Accounts with emotion prediction enabled use a separate pair of endpoints
//! and resource id.

use std::sync::Arc;

use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use uuid::Uuid;

use super::base::{TTSError, TTSResult};
use super::messages::{LongTextQueryResponse, LongTextRequest, LongTextSubmitResponse};
use crate::config::ClientConfig;
use crate::utils::http_client::{HttpTransport, RequestBody, headers};

pub const LONG_TEXT_SUBMIT_PATH: &str = "/api/v1/tts_async/submit";
pub const LONG_TEXT_QUERY_PATH: &str = "/api/v1/tts_async/query";
pub const LONG_TEXT_EMOTION_SUBMIT_PATH: &str = "/api/v1/tts_async_with_emotion/submit";
pub const LONG_TEXT_EMOTION_QUERY_PATH: &str = "/api/v1/tts_async_with_emotion/query";

/// `Resource-Id` header of the standard long-text endpoints.
pub const LONG_TEXT_RESOURCE_ID: &str = "volc.tts_async.default";
/// `Resource-Id` header of the emotion-prediction endpoints.
pub const LONG_TEXT_EMOTION_RESOURCE_ID: &str = "volc.tts_async.emotion";

/// Client for the long-text job endpoints.
#[derive(Debug, Clone)]
pub struct LongTextClient {
    transport: HttpTransport,
    config: Arc<ClientConfig>,
}

impl LongTextClient {
    pub fn new(transport: HttpTransport, config: Arc<ClientConfig>) -> Self {
        Self { transport, config }
    }

    fn submit_url(&self) -> String {
        if self.config.emotion {
            self.config.endpoint(LONG_TEXT_EMOTION_SUBMIT_PATH)
        } else {
            self.config.endpoint(LONG_TEXT_SUBMIT_PATH)
        }
    }

    fn query_url(&self) -> String {
        if self.config.emotion {
            self.config.endpoint(LONG_TEXT_EMOTION_QUERY_PATH)
        } else {
            self.config.endpoint(LONG_TEXT_QUERY_PATH)
        }
    }

    fn resource_id(&self) -> &'static str {
        if self.config.emotion {
            LONG_TEXT_EMOTION_RESOURCE_ID
        } else {
            LONG_TEXT_RESOURCE_ID
        }
    }

    /// Submit a long-text job.
    ///
    /// `appid` and a fresh `reqid` are added to the caller's fields.
    pub async fn create(&self, mut request: LongTextRequest) -> TTSResult<LongTextSubmitResponse> {
        request.validate()?;
        request.appid = self.config.app_id.clone();
        request.reqid = Uuid::new_v4().to_string();

        let url = self.submit_url();
        debug!(
            reqid = %request.reqid,
            text_len = request.text.len(),
            url = %url,
            "Submitting long-text synthesis job"
        );

        let response: LongTextSubmitResponse = self
            .call(Method::POST, &url, RequestBody::json(&request)?)
            .await?;

        info!(
            task_id = %response.task_id,
            task_status = response.task_status,
            "Long-text synthesis job submitted"
        );
        Ok(response)
    }

    /// Query the state of a long-text job.
    pub async fn query(&self, task_id: &str) -> TTSResult<LongTextQueryResponse> {
        if task_id.trim().is_empty() {
            return Err(TTSError::MissingParameter("task_id".to_string()));
        }

        let body = RequestBody::Query(vec![
            ("appid".to_string(), self.config.app_id.clone()),
            ("task_id".to_string(), task_id.to_string()),
        ]);
        let response: LongTextQueryResponse =
            self.call(Method::GET, &self.query_url(), body).await?;

        debug!(
            task_id = %response.task_id,
            task_status = response.task_status,
            finished = response.is_finished(),
            "Long-text synthesis job queried"
        );
        Ok(response)
    }

    async fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        url: &str,
        body: RequestBody,
    ) -> TTSResult<T> {
        let header_map = headers([
            ("Authorization", self.config.authorization()),
            ("Resource-Id", self.resource_id().to_string()),
        ])?;

        let reply = self
            .transport
            .send(method, url, header_map, body, self.config.request_timeout())
            .await?;
        let body = reply.into_success_body()?;

        serde_json::from_slice(&body)
            .map_err(|e| TTSError::DecodeError(format!("http response body Unmarshal error: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(emotion: bool) -> LongTextClient {
        let mut config = ClientConfig::new("app", "cluster", "token")
            .with_base_url("http://localhost:9999");
        config.emotion = emotion;
        LongTextClient::new(HttpTransport::new(false).unwrap(), Arc::new(config))
    }

    #[test]
    fn test_standard_endpoints() {
        let client = client(false);
        assert_eq!(
            client.submit_url(),
            "http://localhost:9999/api/v1/tts_async/submit"
        );
        assert_eq!(
            client.query_url(),
            "http://localhost:9999/api/v1/tts_async/query"
        );
        assert_eq!(client.resource_id(), "volc.tts_async.default");
    }

    #[test]
    fn test_emotion_endpoints() {
        let client = client(true);
        assert_eq!(
            client.submit_url(),
            "http://localhost:9999/api/v1/tts_async_with_emotion/submit"
        );
        assert_eq!(
            client.query_url(),
            "http://localhost:9999/api/v1/tts_async_with_emotion/query"
        );
        assert_eq!(client.resource_id(), "volc.tts_async.emotion");
    }

    #[tokio::test]
    async fn test_validation_before_network() {
        let client = client(false);
        assert!(matches!(
            client.create(LongTextRequest::new("", "voice")).await,
            Err(TTSError::MissingParameter(_))
        ));
        assert!(matches!(
            client.query(" ").await,
            Err(TTSError::MissingParameter(ref f)) if f == "task_id"
        ));
    }
}
