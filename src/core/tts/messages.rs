//! Wire types for the OpenSpeech HTTP API.
//!
//! The request envelope for short-text synthesis is [`SynthesisParams`]
//! itself; this module holds the response envelope and the long-text
//! (async job) request/response types.
//!
//! [`SynthesisParams`]: super::params::SynthesisParams

use base64::{Engine, engine::general_purpose::STANDARD as BASE64};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::base::{TTSError, TTSResult};

/// `code` value the API uses for a successful synthesis.
pub const SUCCESS_CODE: i64 = 3000;

// =============================================================================
// Short-text synthesis
// =============================================================================

/// Response envelope of `POST /api/v1/tts`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TtsResponse {
    #[serde(default)]
    pub reqid: String,
    #[serde(default)]
    pub code: i64,
    #[serde(default, alias = "Message")]
    pub message: String,
    #[serde(default)]
    pub operation: String,
    #[serde(default)]
    pub sequence: i64,
    /// Base64 encoded audio
    #[serde(default)]
    pub data: String,
    /// Extra metadata (duration, frontend info) returned by some clusters
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub addition: Option<Map<String, Value>>,
}

impl TtsResponse {
    /// Parse a response body.
    pub fn from_slice(body: &[u8]) -> TTSResult<Self> {
        serde_json::from_slice(body)
            .map_err(|e| TTSError::DecodeError(format!("malformed response envelope: {e}")))
    }

    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }

    /// Fail with [`TTSError::ProviderError`] unless the API reported success.
    pub fn ensure_success(self) -> TTSResult<Self> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(TTSError::ProviderError {
                code: self.code,
                message: self.message,
            })
        }
    }

    /// Decode the base64 audio payload.
    pub fn decode_audio(&self) -> TTSResult<Bytes> {
        if self.data.is_empty() {
            return Err(TTSError::DecodeError(format!(
                "empty audio payload for request {}",
                self.reqid
            )));
        }
        BASE64
            .decode(self.data.as_bytes())
            .map(Bytes::from)
            .map_err(|e| TTSError::DecodeError(format!("Base64 decode error: {e}")))
    }
}

// =============================================================================
// Long-text async jobs
// =============================================================================

/// Body of a long-text job submission.
///
/// `appid` and `reqid` are filled in by the client.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTextRequest {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub appid: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub reqid: String,
    pub text: String,
    pub voice_type: String,
    /// Output format: `mp3`, `wav`, `pcm` or `ogg_opus`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_rate: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch: Option<f32>,
    /// Return sentence level timestamps in the query result
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub enable_subtitle: Option<u8>,
    /// URL the service calls when the job finishes
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback_url: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl LongTextRequest {
    pub fn new(text: impl Into<String>, voice_type: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            voice_type: voice_type.into(),
            ..Default::default()
        }
    }

    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    pub fn validate(&self) -> TTSResult<()> {
        if self.text.is_empty() {
            return Err(TTSError::MissingParameter("text".to_string()));
        }
        if self.voice_type.is_empty() {
            return Err(TTSError::MissingParameter("voice_type".to_string()));
        }
        Ok(())
    }
}

/// State of a long-text job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskStatus {
    Running,
    Success,
    Failure,
    Unknown(i64),
}

impl From<i64> for TaskStatus {
    fn from(value: i64) -> Self {
        match value {
            0 => Self::Running,
            1 => Self::Success,
            2 => Self::Failure,
            other => Self::Unknown(other),
        }
    }
}

/// Response of a job submission.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTextSubmitResponse {
    #[serde(default)]
    pub reqid: String,
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub task_status: i64,
    #[serde(default)]
    pub text_length: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LongTextSubmitResponse {
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from(self.task_status)
    }
}

/// One synthesized sentence with timing, present when subtitles are enabled.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub origin_text: String,
    #[serde(default)]
    pub paragraph_no: i64,
    /// Milliseconds from the start of the audio
    #[serde(default)]
    pub begin_time: i64,
    #[serde(default)]
    pub end_time: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,
}

/// Response of a job query.
///
/// `audio_url` is valid for one hour.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LongTextQueryResponse {
    #[serde(default)]
    pub reqid: String,
    #[serde(default)]
    pub task_id: String,
    #[serde(default)]
    pub task_status: i64,
    #[serde(default)]
    pub text_length: i64,
    #[serde(default)]
    pub audio_url: String,
    /// Unix timestamp (seconds) after which `audio_url` stops working
    #[serde(default)]
    pub url_expire_time: i64,
    #[serde(default)]
    pub sentences: Vec<Sentence>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LongTextQueryResponse {
    pub fn status(&self) -> TaskStatus {
        TaskStatus::from(self.task_status)
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.status(), TaskStatus::Success | TaskStatus::Failure)
    }
}
