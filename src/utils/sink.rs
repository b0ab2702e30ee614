//! Writing audio to caller-owned sinks.
//!
//! The client never opens files itself. Callers hand in any
//! [`AsyncWrite`] (a `tokio::fs::File`, a `Vec<u8>`, a socket) and keep
//! ownership of it.

use std::time::Duration;

use bytes::Bytes;
use futures::{Stream, StreamExt};
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tracing::debug;
use url::Url;

use crate::core::tts::{TTSError, TTSResult};

/// Write `data` to `sink` and flush. Returns the number of bytes written.
pub async fn write_bytes<W>(sink: &mut W, data: &[u8]) -> TTSResult<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    sink.write_all(data).await?;
    sink.flush().await?;
    Ok(data.len() as u64)
}

/// Copy a byte stream into `sink` chunk by chunk and flush.
pub async fn write_stream<W, S, E>(sink: &mut W, stream: S) -> TTSResult<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
    S: Stream<Item = Result<Bytes, E>>,
    TTSError: From<E>,
{
    let mut stream = std::pin::pin!(stream);
    let mut written = 0u64;

    while let Some(chunk) = stream.next().await {
        let chunk = chunk?;
        sink.write_all(&chunk).await?;
        written += chunk.len() as u64;
    }

    sink.flush().await?;
    Ok(written)
}

/// Download `url` and stream the body into `sink`.
///
/// Only `http` and `https` URLs are accepted. A non-success status is a
/// [`TTSError::HttpStatus`] and nothing is written.
pub async fn download_to_sink<W>(
    client: &reqwest::Client,
    url: &str,
    timeout: Duration,
    sink: &mut W,
) -> TTSResult<u64>
where
    W: AsyncWrite + Unpin + ?Sized,
{
    let parsed = Url::parse(url)
        .map_err(|e| TTSError::InvalidConfiguration(format!("invalid download url: {e}")))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(TTSError::InvalidConfiguration(format!(
            "unsupported download url scheme: {}",
            parsed.scheme()
        )));
    }

    let response = client.get(parsed).timeout(timeout).send().await?;
    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(TTSError::HttpStatus {
            status: status.as_u16(),
            body,
        });
    }

    let written = write_stream(sink, response.bytes_stream()).await?;
    debug!(url = %url, bytes = written, "Downloaded audio");
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::stream;

    #[tokio::test]
    async fn test_write_bytes() {
        let mut sink = Vec::new();
        let written = write_bytes(&mut sink, b"audio").await.unwrap();
        assert_eq!(written, 5);
        assert_eq!(sink, b"audio");
    }

    #[tokio::test]
    async fn test_write_stream_concatenates_chunks() {
        let chunks: Vec<Result<Bytes, TTSError>> = vec![
            Ok(Bytes::from_static(b"ab")),
            Ok(Bytes::from_static(b"cd")),
            Ok(Bytes::from_static(b"e")),
        ];
        let mut sink = Vec::new();
        let written = write_stream(&mut sink, stream::iter(chunks)).await.unwrap();
        assert_eq!(written, 5);
        assert_eq!(sink, b"abcde");
    }

    #[tokio::test]
    async fn test_write_stream_propagates_error() {
        let chunks: Vec<Result<Bytes, TTSError>> = vec![
            Ok(Bytes::from_static(b"ab")),
            Err(TTSError::NetworkError("connection reset".to_string())),
        ];
        let mut sink = Vec::new();
        let err = write_stream(&mut sink, stream::iter(chunks))
            .await
            .unwrap_err();
        assert!(matches!(err, TTSError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_download_rejects_bad_urls() {
        let client = reqwest::Client::new();
        let mut sink = Vec::new();
        for url in ["not a url", "ftp://example.com/a.mp3"] {
            assert!(matches!(
                download_to_sink(&client, url, Duration::from_secs(1), &mut sink).await,
                Err(TTSError::InvalidConfiguration(_))
            ));
        }
        assert!(sink.is_empty());
    }
}
