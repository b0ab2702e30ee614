//! Segment synthesizer backed by the OpenSpeech short-text endpoint.
//!
//! One call = one `POST /api/v1/tts`. The caller's parameters are completed
//! with the chunk text, a fresh request id and the client credentials, sent,
//! and the base64 payload of the response envelope is decoded into raw audio.
//! There is no retry at this layer.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Method;
use tracing::{debug, warn};
use uuid::Uuid;

use super::base::{SpeechSynthesizer, TTSError, TTSResult};
use super::messages::TtsResponse;
use super::params::SynthesisParams;
use crate::config::ClientConfig;
use crate::utils::http_client::{HttpTransport, RequestBody, headers};

/// Path of the short-text synthesis endpoint.
pub const TTS_PATH: &str = "/api/v1/tts";

/// Synthesizes text through the remote short-text endpoint.
#[derive(Debug, Clone)]
pub struct HttpSegmentSynthesizer {
    transport: HttpTransport,
    config: Arc<ClientConfig>,
    endpoint: String,
    timeout: Duration,
}

impl HttpSegmentSynthesizer {
    pub fn new(transport: HttpTransport, config: Arc<ClientConfig>, timeout: Duration) -> Self {
        let endpoint = config.endpoint(TTS_PATH);
        Self {
            transport,
            config,
            endpoint,
            timeout,
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Send one synthesis request and return the checked response envelope.
    ///
    /// Fills in `app` from the client configuration and generates a request id
    /// when the caller did not supply one.
    pub async fn request(&self, mut params: SynthesisParams) -> TTSResult<TtsResponse> {
        params.set_app(&self.config.app_id, &self.config.cluster);
        if params.request.reqid.as_deref().is_none_or(str::is_empty) {
            params.request.reqid = Some(Uuid::new_v4().to_string());
        }

        let header_map = headers([("Authorization", self.config.authorization())])?;
        let body = RequestBody::json(&params)?;

        debug!(
            reqid = params.request.reqid.as_deref().unwrap_or_default(),
            text_len = params.text().map(str::len).unwrap_or_default(),
            "OpenSpeech TTS synthesis request"
        );

        let reply = self
            .transport
            .send(Method::POST, &self.endpoint, header_map, body, self.timeout)
            .await?;
        let body = reply.into_success_body()?;

        TtsResponse::from_slice(&body)?.ensure_success()
    }
}

#[async_trait]
impl SpeechSynthesizer for HttpSegmentSynthesizer {
    async fn synthesize(&self, mut params: SynthesisParams, text: &str) -> TTSResult<Bytes> {
        params.request.text = Some(text.to_string());
        // Concurrent chunks must never share a request id
        params.request.reqid = Some(Uuid::new_v4().to_string());

        let response = self.request(params).await.inspect_err(|e| {
            warn!(error = %e, stage = e.stage(), "OpenSpeech TTS request failed");
        })?;

        let audio = response.decode_audio()?;
        if audio.is_empty() {
            return Err(TTSError::DecodeError(format!(
                "no audio decoded for request {}",
                response.reqid
            )));
        }

        debug!(
            reqid = %response.reqid,
            audio_bytes = audio.len(),
            "OpenSpeech TTS synthesis complete"
        );
        Ok(audio)
    }
}
