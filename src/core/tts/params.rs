//! Synthesis request parameters.
//!
//! The OpenSpeech HTTP API takes a nested JSON object with four sections:
//! `app`, `user`, `audio` and `request`. [`SynthesisParams`] models those
//! sections with typed fields for the settings this crate reads or writes,
//! and keeps every other key in a flattened map so callers can pass through
//! any option the API accepts.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::base::{TTSError, TTSResult};

/// Placeholder the API expects in `app.token`; the real token is sent in the
/// `Authorization` header.
pub const APP_TOKEN_PLACEHOLDER: &str = "access_token";

/// Default `request.operation` for the HTTP API (non-streaming query).
pub const DEFAULT_OPERATION: &str = "query";

/// Default `request.text_type`.
pub const DEFAULT_TEXT_TYPE: &str = "plain";

/// Application credentials section (`app`).
///
/// Always overwritten from the client configuration before a request is sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppSection {
    #[serde(default)]
    pub appid: String,
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub cluster: String,
}

/// End-user section (`user`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserSection {
    /// Caller-defined user id, useful when tracing requests with the vendor
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Voice and output format section (`audio`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AudioSection {
    /// Voice code, e.g. `BV406_V2_streaming`. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub voice_type: Option<String>,

    /// Output encoding: `mp3`, `wav`, `pcm` or `ogg_opus`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<String>,

    /// Speaking speed, 0.2 to 3.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed_ratio: Option<f32>,

    /// Volume, 0.1 to 3.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub volume_ratio: Option<f32>,

    /// Pitch, 0.1 to 3.0
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pitch_ratio: Option<f32>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub emotion: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,

    /// Sample rate in Hz
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rate: Option<u32>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Per-request section (`request`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequestSection {
    /// Unique request id. The API rejects reused ids.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reqid: Option<String>,

    /// Text to synthesize. Required.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    /// `plain` or `ssml`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub operation: Option<String>,

    /// Trailing silence appended after the sentence, in milliseconds
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub silence_duration: Option<u32>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Complete parameter set for one synthesis request.
///
/// `Clone` is a deep copy: the parallel dispatcher hands every chunk its own
/// value, so mutating one copy never affects another.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SynthesisParams {
    #[serde(default)]
    pub app: AppSection,
    #[serde(default)]
    pub user: UserSection,
    #[serde(default)]
    pub audio: AudioSection,
    #[serde(default)]
    pub request: RequestSection,
}

impl SynthesisParams {
    /// Parameters with the usual defaults: mp3 output, neutral speed, volume
    /// and pitch, plain text, `query` operation.
    pub fn new(voice_type: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            app: AppSection::default(),
            user: UserSection::default(),
            audio: AudioSection {
                voice_type: Some(voice_type.into()),
                encoding: Some("mp3".to_string()),
                speed_ratio: Some(1.0),
                volume_ratio: Some(1.0),
                pitch_ratio: Some(1.0),
                ..Default::default()
            },
            request: RequestSection {
                text: Some(text.into()),
                text_type: Some(DEFAULT_TEXT_TYPE.to_string()),
                operation: Some(DEFAULT_OPERATION.to_string()),
                ..Default::default()
            },
        }
    }

    pub fn with_uid(mut self, uid: impl Into<String>) -> Self {
        self.user.uid = Some(uid.into());
        self
    }

    pub fn with_encoding(mut self, encoding: impl Into<String>) -> Self {
        self.audio.encoding = Some(encoding.into());
        self
    }

    pub fn with_speed_ratio(mut self, speed: f32) -> Self {
        self.audio.speed_ratio = Some(speed);
        self
    }

    pub fn with_reqid(mut self, reqid: impl Into<String>) -> Self {
        self.request.reqid = Some(reqid.into());
        self
    }

    /// Set an arbitrary key in the `audio` section.
    pub fn with_audio_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.audio.extra.insert(key.into(), value.into());
        self
    }

    /// Set an arbitrary key in the `request` section.
    pub fn with_request_option(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.request.extra.insert(key.into(), value.into());
        self
    }

    /// The text to synthesize, if any.
    pub fn text(&self) -> Option<&str> {
        self.request.text.as_deref()
    }

    /// Check that the fields the API requires are present.
    ///
    /// Runs before any network call is attempted.
    pub fn validate(&self) -> TTSResult<()> {
        if self.audio.voice_type.as_deref().is_none_or(str::is_empty) {
            return Err(TTSError::MissingParameter("audio.voice_type".to_string()));
        }
        if self.request.text.as_deref().is_none_or(str::is_empty) {
            return Err(TTSError::MissingParameter("request.text".to_string()));
        }
        Ok(())
    }

    /// Overwrite the `app` section with client credentials.
    pub(crate) fn set_app(&mut self, appid: &str, cluster: &str) {
        self.app = AppSection {
            appid: appid.to_string(),
            token: APP_TOKEN_PLACEHOLDER.to_string(),
            cluster: cluster.to_string(),
        };
    }
}
