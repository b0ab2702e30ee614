pub mod tts;

// Re-export commonly used types for convenience
pub use tts::{
    AssembledAudio, ByteTTS, JobState, SpeechSynthesizer, SynthesisParams, TTSError, TTSResult,
    TextSegmenter,
};
