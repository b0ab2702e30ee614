use std::env;
use std::str::FromStr;

use super::ClientConfig;

/// Overlay `BYTE_TTS_*` environment variables onto `config`.
///
/// Unset or empty variables leave the current value alone. Values that fail
/// to parse are reported with the variable name.
pub(super) fn apply_env(config: &mut ClientConfig) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(app_id) = var("BYTE_TTS_APP_ID") {
        config.app_id = app_id;
    }
    if let Some(cluster) = var("BYTE_TTS_CLUSTER") {
        config.cluster = cluster;
    }
    if let Some(mut token) = var("BYTE_TTS_TOKEN") {
        config.replace_token(&mut token);
    }
    if let Some(base_url) = var("BYTE_TTS_BASE_URL") {
        config.base_url = base_url;
    }
    if let Some(emotion) = parse_bool("BYTE_TTS_EMOTION")? {
        config.emotion = emotion;
    }
    if let Some(secs) = parse("BYTE_TTS_REQUEST_TIMEOUT")? {
        config.request_timeout_secs = secs;
    }
    if let Some(secs) = parse("BYTE_TTS_CHUNK_TIMEOUT")? {
        config.chunk_request_timeout_secs = secs;
    }
    if let Some(max_bytes) = parse("BYTE_TTS_MAX_CHUNK_BYTES")? {
        config.max_chunk_bytes = max_bytes;
    }
    if let Some(silence) = parse("BYTE_TTS_CHUNK_SILENCE_MS")? {
        config.chunk_silence_ms = silence;
    }
    if let Some(log_requests) = parse_bool("BYTE_TTS_LOG_REQUESTS")? {
        config.log_requests = log_requests;
    }
    Ok(())
}

fn var(name: &str) -> Option<String> {
    env::var(name)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse<T>(name: &str) -> Result<Option<T>, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    var(name)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| format!("Invalid value for {name} ({raw}): {e}"))
        })
        .transpose()
}

fn parse_bool(name: &str) -> Result<Option<bool>, String> {
    var(name)
        .map(|raw| match raw.to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(format!("Invalid value for {name} ({raw}): expected a boolean")),
        })
        .transpose()
}
