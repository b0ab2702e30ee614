//! Parallel chunk dispatch.
//!
//! Every chunk of a joined job is synthesized on its own tokio task. Tasks
//! report back over a bounded channel sized to the chunk count, so a send
//! never waits, and the collector makes no assumption about completion order.

use std::sync::Arc;

use bytes::Bytes;
use tokio::sync::mpsc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

use super::base::{SpeechSynthesizer, TTSResult};
use super::params::SynthesisParams;
use super::segmenter::TextChunk;

/// Default trailing silence between joined chunks, in milliseconds.
pub const DEFAULT_CHUNK_SILENCE_MS: u32 = 50;

/// Outcome of synthesizing one chunk.
#[derive(Debug)]
pub struct ChunkResult {
    pub index: usize,
    pub outcome: TTSResult<Bytes>,
}

impl ChunkResult {
    pub fn ok(index: usize, audio: impl Into<Bytes>) -> Self {
        Self {
            index,
            outcome: Ok(audio.into()),
        }
    }
}

/// Fans chunks out to a [`SpeechSynthesizer`], one task per chunk.
#[derive(Clone)]
pub struct ParallelDispatcher {
    synthesizer: Arc<dyn SpeechSynthesizer>,
    inter_chunk_silence_ms: u32,
}

impl ParallelDispatcher {
    pub fn new(synthesizer: Arc<dyn SpeechSynthesizer>, inter_chunk_silence_ms: u32) -> Self {
        Self {
            synthesizer,
            inter_chunk_silence_ms,
        }
    }

    /// Start one synthesis task per chunk and return a handle to collect them.
    ///
    /// Each task gets its own copy of `base`. Every chunk but the last has
    /// `request.silence_duration` capped at the inter-chunk silence, so a
    /// shorter caller value is kept; the last keeps whatever `base` carries.
    ///
    /// Must be called from within a tokio runtime.
    pub fn dispatch(&self, chunks: Vec<TextChunk>, base: &SynthesisParams) -> DispatchHandle {
        let chunk_count = chunks.len();
        let (tx, rx) = mpsc::channel(chunk_count.max(1));
        let mut tasks = JoinSet::new();

        let inner_silence = base
            .request
            .silence_duration
            .map_or(self.inter_chunk_silence_ms, |s| s.min(self.inter_chunk_silence_ms));

        for (position, chunk) in chunks.into_iter().enumerate() {
            let mut params = base.clone();
            if position + 1 < chunk_count {
                params.request.silence_duration = Some(inner_silence);
            }

            let synthesizer = Arc::clone(&self.synthesizer);
            let tx = tx.clone();
            tasks.spawn(async move {
                let TextChunk { index, content } = chunk;
                let outcome = synthesizer.synthesize(params, &content).await;
                // The collector is gone once another chunk has failed
                let _ = tx.send(ChunkResult { index, outcome }).await;
            });
        }

        debug!(chunk_count, "Dispatched chunk synthesis tasks");

        DispatchHandle {
            rx,
            tasks,
            chunk_count,
        }
    }

    /// Dispatch and collect in one step.
    pub async fn dispatch_all(
        &self,
        chunks: Vec<TextChunk>,
        base: &SynthesisParams,
    ) -> TTSResult<Vec<ChunkResult>> {
        self.dispatch(chunks, base).collect().await
    }
}

/// In-flight chunk tasks of one dispatch.
///
/// Dropping the handle aborts every task that has not finished yet.
pub struct DispatchHandle {
    rx: mpsc::Receiver<ChunkResult>,
    tasks: JoinSet<()>,
    chunk_count: usize,
}

impl DispatchHandle {
    pub fn chunk_count(&self) -> usize {
        self.chunk_count
    }

    /// Receive one result per dispatched chunk, in completion order.
    ///
    /// The first failed chunk ends collection with
    /// [`TTSError::ChunkFailed`](super::base::TTSError::ChunkFailed) and aborts
    /// the remaining tasks. A task that dies without reporting leaves a gap,
    /// which the reassembler reports as a missing chunk.
    pub async fn collect(mut self) -> TTSResult<Vec<ChunkResult>> {
        let mut results = Vec::with_capacity(self.chunk_count);

        while results.len() < self.chunk_count {
            let Some(result) = self.rx.recv().await else {
                warn!(
                    received = results.len(),
                    chunk_count = self.chunk_count,
                    "Chunk tasks ended without reporting every result"
                );
                break;
            };

            match result.outcome {
                Ok(audio) => {
                    debug!(
                        index = result.index,
                        audio_bytes = audio.len(),
                        "Chunk synthesized"
                    );
                    results.push(ChunkResult::ok(result.index, audio));
                }
                Err(e) => {
                    warn!(index = result.index, error = %e, "Chunk synthesis failed");
                    self.tasks.abort_all();
                    return Err(e.for_chunk(result.index));
                }
            }
        }

        Ok(results)
    }
}
