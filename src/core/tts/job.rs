//! Joined synthesis of long text.
//!
//! A [`SynthesisJob`] segments the text, dispatches every chunk in parallel,
//! collects the results and reassembles them in order. The job is
//! all-or-nothing: any failure leaves it in [`JobState::Failed`] and no audio
//! is produced.

use std::fmt;

use bytes::Bytes;
use tracing::{debug, error, info};

use super::base::{TTSError, TTSResult};
use super::dispatcher::ParallelDispatcher;
use super::params::SynthesisParams;
use super::reassembler;
use super::segmenter::TextSegmenter;

/// Lifecycle of a synthesis job.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JobState {
    Pending,
    Segmented,
    Dispatched,
    Collecting,
    Assembled,
    Failed,
}

impl JobState {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobState::Pending => "pending",
            JobState::Segmented => "segmented",
            JobState::Dispatched => "dispatched",
            JobState::Collecting => "collecting",
            JobState::Assembled => "assembled",
            JobState::Failed => "failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobState::Assembled | JobState::Failed)
    }
}

impl fmt::Display for JobState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Audio of every chunk concatenated in text order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AssembledAudio {
    pub audio: Bytes,
    pub chunk_count: usize,
}

/// One joined synthesis run.
pub struct SynthesisJob {
    segmenter: TextSegmenter,
    dispatcher: ParallelDispatcher,
    state: JobState,
}

impl SynthesisJob {
    pub fn new(segmenter: TextSegmenter, dispatcher: ParallelDispatcher) -> Self {
        Self {
            segmenter,
            dispatcher,
            state: JobState::Pending,
        }
    }

    pub fn state(&self) -> JobState {
        self.state
    }

    /// Synthesize `params.request.text` chunk by chunk.
    ///
    /// A job runs once; calling `run` again on a finished job is an
    /// [`TTSError::InvalidConfiguration`] error.
    pub async fn run(&mut self, params: &SynthesisParams) -> TTSResult<AssembledAudio> {
        if self.state != JobState::Pending {
            return Err(TTSError::InvalidConfiguration(format!(
                "synthesis job already ran (state: {})",
                self.state
            )));
        }

        match self.execute(params).await {
            Ok(assembled) => {
                self.transition(JobState::Assembled);
                info!(
                    chunk_count = assembled.chunk_count,
                    audio_bytes = assembled.audio.len(),
                    "Joined synthesis complete"
                );
                Ok(assembled)
            }
            Err(e) => {
                self.transition(JobState::Failed);
                error!(
                    error = %e,
                    stage = e.stage(),
                    chunk = e.chunk_index(),
                    "Joined synthesis failed"
                );
                Err(e)
            }
        }
    }

    async fn execute(&mut self, params: &SynthesisParams) -> TTSResult<AssembledAudio> {
        params.validate()?;

        let chunks = self.segmenter.split(params.text().unwrap_or_default());
        let chunk_count = chunks.len();
        self.transition(JobState::Segmented);

        let handle = self.dispatcher.dispatch(chunks, params);
        self.transition(JobState::Dispatched);

        self.transition(JobState::Collecting);
        let results = handle.collect().await?;

        let audio = reassembler::assemble(results, chunk_count)?;
        Ok(AssembledAudio { audio, chunk_count })
    }

    fn transition(&mut self, next: JobState) {
        debug!(from = %self.state, to = %next, "Synthesis job state change");
        self.state = next;
    }
}
