//! Client configuration
//!
//! Credentials and tuning for the OpenSpeech client can come from three
//! sources. Priority: YAML > ENV vars > .env values > defaults.
//!
//! # Modules
//! - `env`: Environment variable loading
//! - `yaml`: YAML configuration file loading
//!
//! # Example
//! ```rust,no_run
//! use byte_tts::config::ClientConfig;
//! use std::path::PathBuf;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Load from environment variables only
//! let config = ClientConfig::from_env()?;
//!
//! // Load from YAML file with environment variable overrides
//! let config_path = PathBuf::from("byte-tts.yaml");
//! let config = ClientConfig::from_file(&config_path)?;
//!
//! println!("Synthesizing via {}", config.base_url);
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;
use zeroize::Zeroize;

use crate::core::tts::{TTSError, TTSResult};

mod env;
mod yaml;

pub use yaml::YamlConfig;

/// Public OpenSpeech endpoint.
pub const DEFAULT_BASE_URL: &str = "https://openspeech.bytedance.com";

/// Timeout of a short-text request, in seconds.
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Timeout of each chunk request of a joined job, in seconds.
pub const DEFAULT_CHUNK_REQUEST_TIMEOUT_SECS: u64 = 120;

/// Client configuration.
///
/// Immutable once handed to [`ByteTTS`](crate::core::tts::ByteTTS); every
/// operation reads credentials from here instead of global state.
#[derive(Clone)]
pub struct ClientConfig {
    pub app_id: String,
    pub cluster: String,
    /// Access token, sent as `Authorization: Bearer;{token}`
    pub token: String,
    /// Use the emotion-prediction variant of the long-text endpoints
    pub emotion: bool,
    pub base_url: String,
    pub request_timeout_secs: u64,
    pub chunk_request_timeout_secs: u64,
    /// Upper bound on chunk size for joined synthesis, in bytes
    pub max_chunk_bytes: usize,
    /// Trailing silence added to every chunk but the last, in milliseconds
    pub chunk_silence_ms: u32,
    /// Log every HTTP exchange at debug level
    pub log_requests: bool,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            app_id: String::new(),
            cluster: String::new(),
            token: String::new(),
            emotion: false,
            base_url: DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            chunk_request_timeout_secs: DEFAULT_CHUNK_REQUEST_TIMEOUT_SECS,
            max_chunk_bytes: crate::core::tts::DEFAULT_MAX_CHUNK_BYTES,
            chunk_silence_ms: crate::core::tts::DEFAULT_CHUNK_SILENCE_MS,
            log_requests: false,
        }
    }
}

/// Zeroize the access token when the configuration is dropped.
impl Drop for ClientConfig {
    fn drop(&mut self) {
        self.token.zeroize();
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("app_id", &self.app_id)
            .field("cluster", &self.cluster)
            .field("token", &"[REDACTED]")
            .field("emotion", &self.emotion)
            .field("base_url", &self.base_url)
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("chunk_request_timeout_secs", &self.chunk_request_timeout_secs)
            .field("max_chunk_bytes", &self.max_chunk_bytes)
            .field("chunk_silence_ms", &self.chunk_silence_ms)
            .field("log_requests", &self.log_requests)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(
        app_id: impl Into<String>,
        cluster: impl Into<String>,
        token: impl Into<String>,
    ) -> Self {
        let mut config = Self::default();
        config.app_id = app_id.into();
        config.cluster = cluster.into();
        config.token = token.into();
        config
    }

    /// Enable the emotion-prediction long-text endpoints.
    pub fn with_emotion(mut self) -> Self {
        self.emotion = true;
        self
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_request_timeout(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    pub fn with_chunk_request_timeout(mut self, secs: u64) -> Self {
        self.chunk_request_timeout_secs = secs;
        self
    }

    pub fn with_max_chunk_bytes(mut self, max_bytes: usize) -> Self {
        self.max_chunk_bytes = max_bytes;
        self
    }

    pub fn with_chunk_silence_ms(mut self, silence_ms: u32) -> Self {
        self.chunk_silence_ms = silence_ms;
        self
    }

    pub fn with_request_logging(mut self, enabled: bool) -> Self {
        self.log_requests = enabled;
        self
    }

    /// Swap in a new access token.
    ///
    /// The old token is zeroized in place before the new one is copied in,
    /// and `token` is zeroized afterwards.
    pub(crate) fn replace_token(&mut self, token: &mut String) {
        self.token.zeroize();
        self.token.push_str(token);
        token.zeroize();
    }

    /// Load configuration from environment variables over defaults.
    ///
    /// The `.env` file, if any, is loaded by the binary at startup, so its
    /// values are visible here as ordinary environment variables.
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let mut config = Self::default();
        env::apply_env(&mut config)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file with environment variable base
    ///
    /// Priority order (highest to lowest):
    /// 1. YAML file values
    /// 2. Environment variables (actual ENV vars override .env values)
    /// 3. .env file values
    /// 4. Default values
    ///
    /// # Errors
    /// Returns an error if:
    /// - The YAML file cannot be read or is malformed
    /// - Environment variables have invalid formats
    /// - Configuration validation fails
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let yaml_config = YamlConfig::from_file(path)?;

        let mut config = Self::default();
        env::apply_env(&mut config)?;
        yaml_config.apply(&mut config);

        config.validate()?;
        Ok(config)
    }

    /// Check credentials, timeouts, chunk size and base URL.
    pub fn validate(&self) -> TTSResult<()> {
        for (name, value) in [
            ("app_id", &self.app_id),
            ("cluster", &self.cluster),
            ("token", &self.token),
        ] {
            if value.trim().is_empty() {
                return Err(TTSError::MissingParameter(name.to_string()));
            }
        }

        if self.request_timeout_secs == 0 || self.chunk_request_timeout_secs == 0 {
            return Err(TTSError::InvalidConfiguration(
                "timeouts must be greater than zero".to_string(),
            ));
        }
        if self.max_chunk_bytes == 0 {
            return Err(TTSError::InvalidConfiguration(
                "max_chunk_bytes must be greater than zero".to_string(),
            ));
        }

        let url = Url::parse(&self.base_url).map_err(|e| {
            TTSError::InvalidConfiguration(format!("invalid base_url {}: {e}", self.base_url))
        })?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(TTSError::InvalidConfiguration(format!(
                "base_url must be http or https, got {}",
                url.scheme()
            )));
        }

        Ok(())
    }

    /// Absolute URL of an API path.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{path}", self.base_url.trim_end_matches('/'))
    }

    /// Value of the `Authorization` header.
    pub fn authorization(&self) -> String {
        format!("Bearer;{}", self.token)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn chunk_request_timeout(&self) -> Duration {
        Duration::from_secs(self.chunk_request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::env;
    use std::fs;
    use tempfile::TempDir;

    const ENV_VARS: [&str; 10] = [
        "BYTE_TTS_APP_ID",
        "BYTE_TTS_CLUSTER",
        "BYTE_TTS_TOKEN",
        "BYTE_TTS_EMOTION",
        "BYTE_TTS_BASE_URL",
        "BYTE_TTS_REQUEST_TIMEOUT",
        "BYTE_TTS_CHUNK_TIMEOUT",
        "BYTE_TTS_MAX_CHUNK_BYTES",
        "BYTE_TTS_CHUNK_SILENCE_MS",
        "BYTE_TTS_LOG_REQUESTS",
    ];

    fn cleanup_env_vars() {
        for var in ENV_VARS {
            unsafe {
                env::remove_var(var);
            }
        }
    }

    fn set_credentials() {
        unsafe {
            env::set_var("BYTE_TTS_APP_ID", "env-app");
            env::set_var("BYTE_TTS_CLUSTER", "volcano_tts");
            env::set_var("BYTE_TTS_TOKEN", "env-token");
        }
    }

    #[test]
    fn test_defaults() {
        let config = ClientConfig::new("app", "cluster", "token");
        assert_eq!(config.base_url, DEFAULT_BASE_URL);
        assert_eq!(config.request_timeout(), Duration::from_secs(60));
        assert_eq!(config.chunk_request_timeout(), Duration::from_secs(120));
        assert_eq!(config.max_chunk_bytes, 1024);
        assert_eq!(config.chunk_silence_ms, 50);
        assert!(!config.emotion);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_endpoint_and_authorization() {
        let config = ClientConfig::new("app", "cluster", "tok").with_base_url("http://localhost:8080/");
        assert_eq!(
            config.endpoint("/api/v1/tts"),
            "http://localhost:8080/api/v1/tts"
        );
        assert_eq!(config.authorization(), "Bearer;tok");
    }

    #[test]
    fn test_debug_redacts_token() {
        let config = ClientConfig::new("app", "cluster", "super-secret");
        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret"));
        assert!(debug.contains("[REDACTED]"));
    }

    #[test]
    fn test_replace_token_wipes_both_buffers() {
        let mut config = ClientConfig::new("app", "cluster", "old-token");
        let old_ptr = config.token.as_ptr();

        let mut incoming = "new".to_string();
        config.replace_token(&mut incoming);

        assert_eq!(config.token, "new");
        assert!(incoming.is_empty());
        // The old allocation is reused, so the old secret was overwritten in place
        assert_eq!(config.token.as_ptr(), old_ptr);
    }

    #[test]
    fn test_validate_rejects_missing_credentials() {
        let config = ClientConfig::new("app", "", "token");
        match config.validate() {
            Err(TTSError::MissingParameter(field)) => assert_eq!(field, "cluster"),
            other => panic!("Expected MissingParameter, got {other:?}"),
        }
        assert!(ClientConfig::new("app", "cluster", "  ").validate().is_err());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let base = ClientConfig::new("app", "cluster", "token");
        assert!(base.clone().with_request_timeout(0).validate().is_err());
        assert!(base.clone().with_chunk_request_timeout(0).validate().is_err());
        assert!(base.clone().with_max_chunk_bytes(0).validate().is_err());
        assert!(base.clone().with_base_url("not a url").validate().is_err());
        assert!(base.with_base_url("ftp://example.com").validate().is_err());
    }

    #[test]
    #[serial]
    fn test_from_env() {
        cleanup_env_vars();
        set_credentials();
        unsafe {
            env::set_var("BYTE_TTS_EMOTION", "true");
            env::set_var("BYTE_TTS_CHUNK_TIMEOUT", "30");
            env::set_var("BYTE_TTS_MAX_CHUNK_BYTES", "512");
        }

        let config = ClientConfig::from_env().unwrap();
        assert_eq!(config.app_id, "env-app");
        assert_eq!(config.token, "env-token");
        assert!(config.emotion);
        assert_eq!(config.chunk_request_timeout_secs, 30);
        assert_eq!(config.max_chunk_bytes, 512);
        assert_eq!(config.request_timeout_secs, DEFAULT_REQUEST_TIMEOUT_SECS);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_env_missing_credentials() {
        cleanup_env_vars();
        let result = ClientConfig::from_env();
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    #[serial]
    fn test_from_env_invalid_number() {
        cleanup_env_vars();
        set_credentials();
        unsafe {
            env::set_var("BYTE_TTS_REQUEST_TIMEOUT", "soon");
        }

        let result = ClientConfig::from_env();
        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("BYTE_TTS_REQUEST_TIMEOUT")
        );

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_yaml_overrides_env() {
        cleanup_env_vars();
        set_credentials();
        unsafe {
            env::set_var("BYTE_TTS_CHUNK_SILENCE_MS", "80");
        }

        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("byte-tts.yaml");
        fs::write(
            &config_path,
            r#"
credentials:
  app_id: "yaml-app"
api:
  base_url: "http://127.0.0.1:9000"
  emotion: true
synthesis:
  max_chunk_bytes: 300
"#,
        )
        .unwrap();

        let config = ClientConfig::from_file(&config_path).unwrap();
        // YAML wins
        assert_eq!(config.app_id, "yaml-app");
        assert_eq!(config.base_url, "http://127.0.0.1:9000");
        assert!(config.emotion);
        assert_eq!(config.max_chunk_bytes, 300);
        // Env fills what YAML leaves out
        assert_eq!(config.cluster, "volcano_tts");
        assert_eq!(config.token, "env-token");
        assert_eq!(config.chunk_silence_ms, 80);

        cleanup_env_vars();
    }

    #[test]
    #[serial]
    fn test_from_file_validation_failure() {
        cleanup_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("byte-tts.yaml");
        fs::write(&config_path, "credentials:\n  app_id: \"only-app\"\n").unwrap();

        assert!(ClientConfig::from_file(&config_path).is_err());
    }
}
