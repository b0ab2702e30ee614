//! ByteDance OpenSpeech text-to-speech client.
//!
//! # Features
//!
//! - **Short text**: one `POST /api/v1/tts` per call, audio decoded from the
//!   base64 response envelope
//! - **Joined synthesis**: long text split into byte-bounded chunks,
//!   synthesized in parallel and reassembled in text order
//! - **Long-text jobs**: submit/query of the asynchronous long-text endpoints,
//!   with optional emotion prediction
//!
//! # API Reference
//!
//! - Synthesis: `POST {base}/api/v1/tts`
//! - Long-text submit: `POST {base}/api/v1/tts_async/submit`
//! - Long-text query: `GET {base}/api/v1/tts_async/query`
//!
//! # Authentication
//!
//! Every request carries `Authorization: Bearer;{token}` (note the semicolon).

mod base;
pub mod client;
pub mod dispatcher;
pub mod job;
pub mod long_text;
pub mod messages;
pub mod params;
pub mod reassembler;
pub mod segmenter;
pub mod synthesizer;


pub use base::{SpeechSynthesizer, TTSError, TTSResult};
pub use client::ByteTTS;
pub use dispatcher::{ChunkResult, DEFAULT_CHUNK_SILENCE_MS, DispatchHandle, ParallelDispatcher};
pub use job::{AssembledAudio, JobState, SynthesisJob};
pub use long_text::LongTextClient;
pub use messages::{
    LongTextQueryResponse, LongTextRequest, LongTextSubmitResponse, SUCCESS_CODE, Sentence,
    TaskStatus, TtsResponse,
};
pub use params::{AppSection, AudioSection, RequestSection, SynthesisParams, UserSection};
pub use reassembler::assemble;
pub use segmenter::{DEFAULT_MAX_CHUNK_BYTES, TextChunk, TextSegmenter, split_text};
pub use synthesizer::HttpSegmentSynthesizer;
