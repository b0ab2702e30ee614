use serde::Deserialize;
use std::path::PathBuf;

use super::ClientConfig;

/// Complete YAML configuration structure
///
/// All fields are optional to allow partial configuration. Values present in
/// the file override environment variables.
///
/// # Example YAML structure
/// ```yaml
/// credentials:
///   app_id: "your-app-id"
///   cluster: "volcano_tts"
///   token: "your-access-token"
///
/// api:
///   base_url: "https://openspeech.bytedance.com"
///   emotion: false
///
/// synthesis:
///   request_timeout_secs: 60
///   chunk_request_timeout_secs: 120
///   max_chunk_bytes: 1024
///   chunk_silence_ms: 50
///
/// logging:
///   log_requests: true
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct YamlConfig {
    pub credentials: Option<CredentialsYaml>,
    pub api: Option<ApiYaml>,
    pub synthesis: Option<SynthesisYaml>,
    pub logging: Option<LoggingYaml>,
}

/// OpenSpeech application credentials from YAML
#[derive(Clone, Deserialize, Default)]
#[serde(default)]
pub struct CredentialsYaml {
    pub app_id: Option<String>,
    pub cluster: Option<String>,
    pub token: Option<String>,
}

impl std::fmt::Debug for CredentialsYaml {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialsYaml")
            .field("app_id", &self.app_id)
            .field("cluster", &self.cluster)
            .field("token", &self.token.as_ref().map(|_| "[REDACTED]"))
            .finish()
    }
}

/// Endpoint selection from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ApiYaml {
    pub base_url: Option<String>,
    /// Use the emotion-prediction long-text endpoints
    pub emotion: Option<bool>,
}

/// Synthesis tuning from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct SynthesisYaml {
    pub request_timeout_secs: Option<u64>,
    pub chunk_request_timeout_secs: Option<u64>,
    pub max_chunk_bytes: Option<usize>,
    pub chunk_silence_ms: Option<u32>,
}

/// Logging from YAML
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct LoggingYaml {
    pub log_requests: Option<bool>,
}

impl YamlConfig {
    /// Load YAML configuration from a file
    ///
    /// # Errors
    /// Returns an error if:
    /// - The file cannot be read
    /// - The YAML is malformed
    /// - Required fields have invalid types
    pub fn from_file(path: &PathBuf) -> Result<Self, Box<dyn std::error::Error>> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| format!("Failed to read config file {}: {e}", path.display()))?;

        let config: YamlConfig = serde_yaml::from_str(&contents)
            .map_err(|e| format!("Failed to parse YAML config: {e}"))?;

        Ok(config)
    }

    /// Override `config` with every value present in the file.
    pub(super) fn apply(self, config: &mut ClientConfig) {
        if let Some(credentials) = self.credentials {
            if let Some(app_id) = credentials.app_id {
                config.app_id = app_id;
            }
            if let Some(cluster) = credentials.cluster {
                config.cluster = cluster;
            }
            if let Some(mut token) = credentials.token {
                config.replace_token(&mut token);
            }
        }

        if let Some(api) = self.api {
            if let Some(base_url) = api.base_url {
                config.base_url = base_url;
            }
            if let Some(emotion) = api.emotion {
                config.emotion = emotion;
            }
        }

        if let Some(synthesis) = self.synthesis {
            if let Some(secs) = synthesis.request_timeout_secs {
                config.request_timeout_secs = secs;
            }
            if let Some(secs) = synthesis.chunk_request_timeout_secs {
                config.chunk_request_timeout_secs = secs;
            }
            if let Some(max_bytes) = synthesis.max_chunk_bytes {
                config.max_chunk_bytes = max_bytes;
            }
            if let Some(silence) = synthesis.chunk_silence_ms {
                config.chunk_silence_ms = silence;
            }
        }

        if let Some(log_requests) = self.logging.and_then(|l| l.log_requests) {
            config.log_requests = log_requests;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_yaml_config_full() {
        let yaml = r#"
credentials:
  app_id: "app"
  cluster: "volcano_tts"
  token: "secret"
api:
  base_url: "http://localhost:8080"
  emotion: true
synthesis:
  request_timeout_secs: 10
  chunk_request_timeout_secs: 20
  max_chunk_bytes: 256
  chunk_silence_ms: 0
logging:
  log_requests: true
"#;
        let yaml_config: YamlConfig = serde_yaml::from_str(yaml).unwrap();
        let mut config = ClientConfig::default();
        yaml_config.apply(&mut config);

        assert_eq!(config.app_id, "app");
        assert_eq!(config.cluster, "volcano_tts");
        assert_eq!(config.token, "secret");
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(config.emotion);
        assert_eq!(config.request_timeout_secs, 10);
        assert_eq!(config.chunk_request_timeout_secs, 20);
        assert_eq!(config.max_chunk_bytes, 256);
        assert_eq!(config.chunk_silence_ms, 0);
        assert!(config.log_requests);
    }

    #[test]
    fn test_yaml_config_partial() {
        let yaml_config: YamlConfig =
            serde_yaml::from_str("synthesis:\n  max_chunk_bytes: 100\n").unwrap();
        assert!(yaml_config.credentials.is_none());

        let mut config = ClientConfig::new("app", "cluster", "token");
        yaml_config.apply(&mut config);
        assert_eq!(config.max_chunk_bytes, 100);
        assert_eq!(config.app_id, "app");
        assert_eq!(config.chunk_silence_ms, 50);
    }

    #[test]
    fn test_yaml_config_empty() {
        let yaml_config: YamlConfig = serde_yaml::from_str("").unwrap_or_default();
        assert!(yaml_config.api.is_none());
        assert!(yaml_config.synthesis.is_none());
    }

    #[test]
    fn test_credentials_debug_redacts_token() {
        let credentials = CredentialsYaml {
            app_id: Some("app".to_string()),
            cluster: None,
            token: Some("super-secret".to_string()),
        };
        assert!(!format!("{credentials:?}").contains("super-secret"));
    }

    #[test]
    fn test_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("config.yaml");

        fs::write(&config_path, "api:\n  base_url: \"http://localhost:3000\"\n").unwrap();

        let config = YamlConfig::from_file(&config_path).unwrap();
        assert_eq!(
            config.api.as_ref().unwrap().base_url,
            Some("http://localhost:3000".to_string())
        );
    }

    #[test]
    fn test_from_file_not_found() {
        let path = PathBuf::from("/nonexistent/config.yaml");
        let result = YamlConfig::from_file(&path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to read config file")
        );
    }

    #[test]
    fn test_from_file_invalid_yaml() {
        let temp_dir = TempDir::new().unwrap();
        let config_path = temp_dir.path().join("invalid.yaml");

        fs::write(&config_path, "invalid: yaml: content:").unwrap();

        let result = YamlConfig::from_file(&config_path);

        assert!(result.is_err());
        assert!(
            result
                .unwrap_err()
                .to_string()
                .contains("Failed to parse YAML")
        );
    }
}
