//! Shared types for the OpenSpeech TTS client.
//!
//! Holds the error taxonomy used by every stage of a synthesis job and the
//! [`SpeechSynthesizer`] seam the parallel dispatcher fans out over.

use async_trait::async_trait;
use bytes::Bytes;
use thiserror::Error;

use super::params::SynthesisParams;

/// Errors produced by the TTS client.
///
/// Variants are grouped by the stage that raises them; see [`TTSError::stage`].
#[derive(Debug, Error)]
pub enum TTSError {
    /// A required request parameter is absent or empty. No network call was made.
    #[error("{0} cannot be empty")]
    MissingParameter(String),

    /// Client configuration is unusable.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// The request never produced an HTTP response (connect failure, timeout, ...).
    #[error("Network error: {0}")]
    NetworkError(String),

    /// The server answered with a non-success status code.
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: u16, body: String },

    /// The server answered 200 with an empty body.
    #[error("http response ContentLength=0")]
    EmptyResponse,

    /// The API reported a failure inside an otherwise well-formed envelope.
    #[error("Provider error {code}: {message}")]
    ProviderError { code: i64, message: String },

    /// The response envelope or the embedded audio could not be decoded.
    #[error("Decode error: {0}")]
    DecodeError(String),

    /// A chunk result went missing or was duplicated during collection.
    #[error("Reassembly error: {0}")]
    ReassemblyError(String),

    /// Synthesis of one chunk of a joined job failed.
    #[error("chunk {index} failed: {source}")]
    ChunkFailed {
        index: usize,
        #[source]
        source: Box<TTSError>,
    },

    /// Writing to the output sink failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl TTSError {
    /// Name of the pipeline stage that produced this error.
    pub fn stage(&self) -> &'static str {
        match self {
            Self::MissingParameter(_) | Self::InvalidConfiguration(_) => "validation",
            Self::NetworkError(_) | Self::HttpStatus { .. } | Self::EmptyResponse => "transport",
            Self::ProviderError { .. } | Self::DecodeError(_) => "decode",
            Self::ReassemblyError(_) => "reassembly",
            Self::ChunkFailed { source, .. } => source.stage(),
            Self::Io(_) => "io",
        }
    }

    /// Attribute this error to chunk `index`. Already attributed errors are
    /// returned unchanged.
    pub fn for_chunk(self, index: usize) -> Self {
        match self {
            Self::ChunkFailed { .. } => self,
            other => Self::ChunkFailed {
                index,
                source: Box::new(other),
            },
        }
    }

    /// Index of the failed chunk, when the error came out of a joined job.
    pub fn chunk_index(&self) -> Option<usize> {
        match self {
            Self::ChunkFailed { index, .. } => Some(*index),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for TTSError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            TTSError::NetworkError(format!("request timed out: {err}"))
        } else if err.is_decode() {
            TTSError::DecodeError(err.to_string())
        } else {
            TTSError::NetworkError(err.to_string())
        }
    }
}

/// Result alias used throughout the crate.
pub type TTSResult<T> = Result<T, TTSError>;

/// Synthesizes a single piece of text into raw audio bytes.
///
/// Implementations receive an owned copy of the parameters, so they are free
/// to mutate it (text, request id) without affecting concurrent calls.
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    async fn synthesize(&self, params: SynthesisParams, text: &str) -> TTSResult<Bytes>;
}
