//! OpenSpeech client facade.

use std::sync::Arc;

use bytes::Bytes;
use tokio::io::AsyncWrite;
use tracing::info;

use super::base::{SpeechSynthesizer, TTSResult};
use super::dispatcher::ParallelDispatcher;
use super::job::{AssembledAudio, SynthesisJob};
use super::long_text::LongTextClient;
use super::messages::{LongTextQueryResponse, LongTextRequest, LongTextSubmitResponse, TtsResponse};
use super::params::SynthesisParams;
use super::segmenter::TextSegmenter;
use super::synthesizer::HttpSegmentSynthesizer;
use crate::config::ClientConfig;
use crate::utils::http_client::HttpTransport;
use crate::utils::sink;

/// ByteDance OpenSpeech TTS client.
///
/// Holds the validated configuration and one shared connection pool. All
/// operations take `&self` and can run concurrently.
///
/// # Example
///
/// ```rust,no_run
/// use byte_tts::config::ClientConfig;
/// use byte_tts::core::tts::{ByteTTS, SynthesisParams};
///
/// # async fn run() -> Result<(), Box<dyn std::error::Error>> {
/// let tts = ByteTTS::new(ClientConfig::new("appid", "volcano_tts", "token"))?;
/// let params = SynthesisParams::new("BV406_V2_streaming", "很长的一段文本……");
///
/// let mut file = tokio::fs::File::create("out.mp3").await?;
/// tts.text_to_join_voice_disk(&params, &mut file).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct ByteTTS {
    config: Arc<ClientConfig>,
    transport: HttpTransport,
    short_text: HttpSegmentSynthesizer,
    chunk_synthesizer: Arc<dyn SpeechSynthesizer>,
    segmenter: TextSegmenter,
    long_text: LongTextClient,
}

impl ByteTTS {
    pub fn new(config: ClientConfig) -> TTSResult<Self> {
        let transport = HttpTransport::new(config.log_requests)?;
        Self::with_transport(config, transport)
    }

    /// Build a client over an existing transport.
    pub fn with_transport(config: ClientConfig, transport: HttpTransport) -> TTSResult<Self> {
        config.validate()?;
        let segmenter = TextSegmenter::new(config.max_chunk_bytes)?;
        let config = Arc::new(config);

        let short_text = HttpSegmentSynthesizer::new(
            transport.clone(),
            Arc::clone(&config),
            config.request_timeout(),
        );
        let chunk_synthesizer: Arc<dyn SpeechSynthesizer> = Arc::new(HttpSegmentSynthesizer::new(
            transport.clone(),
            Arc::clone(&config),
            config.chunk_request_timeout(),
        ));
        let long_text = LongTextClient::new(transport.clone(), Arc::clone(&config));

        Ok(Self {
            config,
            transport,
            short_text,
            chunk_synthesizer,
            segmenter,
            long_text,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// Synthesize short text in a single request and return the response
    /// envelope.
    ///
    /// Uses the caller's `request.reqid` when set, otherwise a fresh one.
    pub async fn text_to_voice(&self, params: &SynthesisParams) -> TTSResult<TtsResponse> {
        params.validate()?;
        self.short_text.request(params.clone()).await
    }

    /// Synthesize short text and return the decoded audio.
    pub async fn text_to_voice_audio(&self, params: &SynthesisParams) -> TTSResult<Bytes> {
        self.text_to_voice(params).await?.decode_audio()
    }

    /// Synthesize short text into `sink`. Returns the number of bytes written.
    pub async fn text_to_voice_disk<W>(&self, params: &SynthesisParams, sink: &mut W) -> TTSResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let audio = self.text_to_voice_audio(params).await?;
        sink::write_bytes(sink, &audio).await
    }

    /// Synthesize text of any length by splitting it into chunks, synthesizing
    /// them in parallel and joining the audio in order.
    pub async fn text_to_join_voice(&self, params: &SynthesisParams) -> TTSResult<AssembledAudio> {
        let dispatcher = ParallelDispatcher::new(
            Arc::clone(&self.chunk_synthesizer),
            self.config.chunk_silence_ms,
        );
        SynthesisJob::new(self.segmenter, dispatcher).run(params).await
    }

    /// Joined synthesis written to `sink`. Nothing is written unless every
    /// chunk succeeded.
    pub async fn text_to_join_voice_disk<W>(
        &self,
        params: &SynthesisParams,
        sink: &mut W,
    ) -> TTSResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        let assembled = self.text_to_join_voice(params).await?;
        let written = sink::write_bytes(sink, &assembled.audio).await?;
        info!(
            chunk_count = assembled.chunk_count,
            bytes = written,
            "Joined audio written"
        );
        Ok(written)
    }

    /// Submit a long-text job.
    pub async fn long_text_to_voice_create(
        &self,
        request: LongTextRequest,
    ) -> TTSResult<LongTextSubmitResponse> {
        self.long_text.create(request).await
    }

    /// Query a long-text job.
    pub async fn long_text_to_voice_query(&self, task_id: &str) -> TTSResult<LongTextQueryResponse> {
        self.long_text.query(task_id).await
    }

    /// Download finished audio, e.g. a long-text job's `audio_url`, into `sink`.
    pub async fn download_audio<W>(&self, url: &str, sink: &mut W) -> TTSResult<u64>
    where
        W: AsyncWrite + Unpin + ?Sized,
    {
        sink::download_to_sink(
            self.transport.client(),
            url,
            self.config.chunk_request_timeout(),
            sink,
        )
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::tts::TTSError;

    fn client() -> ByteTTS {
        ByteTTS::new(
            ClientConfig::new("app", "cluster", "token").with_base_url("http://127.0.0.1:9"),
        )
        .unwrap()
    }

    #[test]
    fn test_new_validates_config() {
        assert!(matches!(
            ByteTTS::new(ClientConfig::new("", "cluster", "token")),
            Err(TTSError::MissingParameter(_))
        ));
        assert!(matches!(
            ByteTTS::new(ClientConfig::new("app", "cluster", "token").with_max_chunk_bytes(0)),
            Err(TTSError::InvalidConfiguration(_))
        ));
    }

    #[tokio::test]
    async fn test_validation_happens_before_network() {
        let tts = client();

        let err = tts
            .text_to_voice(&SynthesisParams::new("", "hello"))
            .await
            .unwrap_err();
        assert!(matches!(err, TTSError::MissingParameter(ref f) if f == "audio.voice_type"));

        let err = tts
            .text_to_join_voice(&SynthesisParams::new("voice", ""))
            .await
            .unwrap_err();
        assert!(matches!(err, TTSError::MissingParameter(ref f) if f == "request.text"));
    }

    #[tokio::test]
    async fn test_join_failure_writes_nothing() {
        let tts = client();
        let mut sink = Vec::new();
        let result = tts
            .text_to_join_voice_disk(&SynthesisParams::new("voice", ""), &mut sink)
            .await;
        assert!(result.is_err());
        assert!(sink.is_empty());
    }
}
