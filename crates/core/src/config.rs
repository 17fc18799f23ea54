use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// Environment variable that overrides `inference.api_token`
pub const API_TOKEN_ENV: &str = "MEALCHAT_HF_TOKEN";

pub const DEFAULT_MODEL: &str = "facebook/blenderbot-400M-distill";
pub const DEFAULT_BASE_URL: &str = "https://api-inference.huggingface.co";
pub const DEFAULT_PROMPT_TEMPLATE: &str = "User: {input}\nBot:";
pub const DEFAULT_REPLY_MARKER: &str = "Bot:";
pub const DEFAULT_FALLBACK_MESSAGE: &str = "Silakan coba lagi dalam beberapa detik";
pub const DEFAULT_NOT_UNDERSTOOD_MESSAGE: &str = "Maaf, saya tidak mengerti pertanyaan itu";

/// Fixed generation parameters sent with every prompt
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct GenerationParameters {
    pub max_new_tokens: u32,
    pub temperature: f32,
    pub repetition_penalty: f32,
}

impl Default for GenerationParameters {
    fn default() -> Self {
        Self { max_new_tokens: 100, temperature: 0.9, repetition_penalty: 1.2 }
    }
}

/// Provider-side request options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InferenceOptions {
    /// Allow the provider to answer from its response cache
    pub use_cache: bool,
    /// Block until a cold model is loaded instead of failing with 503
    pub wait_for_model: bool,
}

impl Default for InferenceOptions {
    fn default() -> Self {
        Self { use_cache: true, wait_for_model: true }
    }
}

/// Bounded retry with exponential backoff
///
/// `max_attempts = 1` means a single best-effort call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self { max_attempts: 1, initial_delay_ms: 500, max_delay_ms: 5000, backoff_multiplier: 2.0 }
    }
}

/// Text-generation endpoint configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct InferenceConfig {
    /// Model identifier (e.g., "facebook/blenderbot-400M-distill")
    pub model: String,
    /// Base URL of the inference API
    pub base_url: String,
    /// Bearer token; may also come from `MEALCHAT_HF_TOKEN`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,
    /// Client-side request timeout; unset leaves only the provider's own bound
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout_ms: Option<u64>,
    /// Template wrapping user text; `{input}` is replaced
    pub prompt_template: String,
    /// Role label stripped from generated text
    pub reply_marker: String,
    pub parameters: GenerationParameters,
    pub options: InferenceOptions,
    pub retry: RetryConfig,
}

impl Default for InferenceConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            api_token: None,
            timeout_ms: None,
            prompt_template: DEFAULT_PROMPT_TEMPLATE.to_string(),
            reply_marker: DEFAULT_REPLY_MARKER.to_string(),
            parameters: GenerationParameters::default(),
            options: InferenceOptions::default(),
            retry: RetryConfig::default(),
        }
    }
}

/// Chat widget behaviour
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct WidgetConfig {
    /// Bot reply shown when the inference call fails
    pub fallback_message: String,
    /// Bot reply shown when the model returns nothing usable
    pub not_understood_message: String,
    /// Oldest entries are evicted past this many; 0 keeps everything
    pub max_transcript_entries: usize,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        Self {
            fallback_message: DEFAULT_FALLBACK_MESSAGE.to_string(),
            not_understood_message: DEFAULT_NOT_UNDERSTOOD_MESSAGE.to_string(),
            max_transcript_entries: 0,
        }
    }
}

impl WidgetConfig {
    pub fn transcript_limit(&self) -> Option<usize> {
        if self.max_transcript_entries == 0 { None } else { Some(self.max_transcript_entries) }
    }
}

/// `[logging]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct LoggingConfig {
    /// Default filter directive for stderr
    pub level: String,
    /// `pretty`, `json` or `compact`
    pub format: String,
    pub file: FileLoggingConfig,
    pub privacy: PrivacyConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "pretty".to_string(),
            file: FileLoggingConfig::default(),
            privacy: PrivacyConfig::default(),
        }
    }
}

/// `[logging.file]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct FileLoggingConfig {
    pub enabled: bool,
    pub level: String,
}

impl Default for FileLoggingConfig {
    fn default() -> Self {
        Self { enabled: false, level: "debug".to_string() }
    }
}

/// `[logging.privacy]` section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct PrivacyConfig {
    /// `none`, `truncate` or `full`
    pub log_message_text: String,
    pub truncate_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self { log_message_text: "truncate".to_string(), truncate_length: 80 }
    }
}

/// Root configuration structure for mealchat.toml
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields, default)]
pub struct Config {
    pub inference: InferenceConfig,
    pub widget: WidgetConfig,
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self> {
        let config: Config = toml::from_str(toml_str)
            .map_err(|e| crate::Error::Config(ConfigError::from(e).to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Fill the API token from `MEALCHAT_HF_TOKEN` when it is set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(token) = std::env::var(API_TOKEN_ENV)
            && !token.trim().is_empty()
        {
            self.inference.api_token = Some(token);
        }
        self
    }

    /// Validate the configuration
    fn validate(&self) -> Result<()> {
        use crate::Error;

        let inference = &self.inference;
        if inference.model.trim().is_empty() {
            return Err(Error::Config(ConfigError::Missing("inference.model".to_string()).to_string()));
        }

        if !(inference.base_url.starts_with("http://") || inference.base_url.starts_with("https://")) {
            return Err(Error::Config(ConfigError::InvalidUrl(inference.base_url.clone()).to_string()));
        }

        if !inference.prompt_template.contains("{input}") {
            return Err(Error::Config(
                ConfigError::InvalidValue("inference.prompt_template must contain {input}".to_string()).to_string(),
            ));
        }

        let params = &inference.parameters;
        if params.max_new_tokens == 0 {
            return Err(Error::Config(
                ConfigError::InvalidValue("parameters.max_new_tokens must be positive".to_string()).to_string(),
            ));
        }
        if params.temperature.is_nan() || params.temperature <= 0.0 {
            return Err(Error::Config(
                ConfigError::InvalidValue("parameters.temperature must be positive".to_string()).to_string(),
            ));
        }
        if params.repetition_penalty.is_nan() || params.repetition_penalty <= 0.0 {
            return Err(Error::Config(
                ConfigError::InvalidValue("parameters.repetition_penalty must be positive".to_string()).to_string(),
            ));
        }

        if inference.timeout_ms == Some(0) {
            return Err(Error::Config(
                ConfigError::InvalidValue("inference.timeout_ms must be positive (omit it for no timeout)".to_string())
                    .to_string(),
            ));
        }

        let retry = &inference.retry;
        if retry.max_attempts == 0 {
            return Err(Error::Config(
                ConfigError::InvalidValue("retry.max_attempts must be at least 1".to_string()).to_string(),
            ));
        }
        if retry.backoff_multiplier < 1.0 {
            return Err(Error::Config(
                ConfigError::InvalidValue("retry.backoff_multiplier must be >= 1.0".to_string()).to_string(),
            ));
        }

        if self.widget.fallback_message.trim().is_empty() {
            return Err(Error::Config(ConfigError::Missing("widget.fallback_message".to_string()).to_string()));
        }

        Ok(())
    }

    /// Get example configuration (as a string)
    pub fn example() -> &'static str {
        r#"# mealchat configuration
# Copy this file to mealchat.toml and customize as needed

[inference]
# Hosted text-generation model
model = "facebook/blenderbot-400M-distill"
# Base URL of the inference API
base_url = "https://api-inference.huggingface.co"
# API token (or set MEALCHAT_HF_TOKEN)
# api_token = "hf_..."
# Client-side request timeout in milliseconds (optional)
# timeout_ms = 30000
prompt_template = "User: {input}\nBot:"
reply_marker = "Bot:"

[inference.parameters]
max_new_tokens = 100
temperature = 0.9
repetition_penalty = 1.2

[inference.options]
use_cache = true
wait_for_model = true

[inference.retry]
# 1 = single best-effort call
max_attempts = 1
initial_delay_ms = 500
max_delay_ms = 5000
backoff_multiplier = 2.0

[widget]
fallback_message = "Silakan coba lagi dalam beberapa detik"
not_understood_message = "Maaf, saya tidak mengerti pertanyaan itu"
# 0 keeps the whole conversation
max_transcript_entries = 0

[logging]
level = "warn"
format = "pretty"

[logging.file]
enabled = false
level = "debug"

[logging.privacy]
# "none", "truncate" or "full"
log_message_text = "truncate"
truncate_length = 80
"#
    }
}

/// Configuration-specific errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Required value missing or blank
    #[error("missing value: {0}")]
    Missing(String),

    /// Base URL is not http(s)
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// Out-of-range or malformed value
    #[error("invalid value: {0}")]
    InvalidValue(String),

    /// TOML parse error
    #[error("TOML parse error: {0}")]
    TomlParse(String),
}

impl From<toml::de::Error> for ConfigError {
    fn from(err: toml::de::Error) -> Self {
        ConfigError::TomlParse(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.inference.model, DEFAULT_MODEL);
        assert_eq!(config.inference.parameters.max_new_tokens, 100);
        assert_eq!(config.inference.parameters.temperature, 0.9);
        assert_eq!(config.inference.parameters.repetition_penalty, 1.2);
        assert!(config.inference.options.use_cache);
        assert!(config.inference.options.wait_for_model);
        assert_eq!(config.inference.retry.max_attempts, 1);
        assert!(config.inference.timeout_ms.is_none());
        assert_eq!(config.widget.fallback_message, DEFAULT_FALLBACK_MESSAGE);
        assert_eq!(config.widget.transcript_limit(), None);
    }

    #[test]
    fn test_config_example_parses() {
        let config = Config::from_toml_str(Config::example()).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_empty_string_is_default() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_config_partial_override() {
        let toml = r#"
[inference]
api_token = "hf_test"
timeout_ms = 15000

[inference.parameters]
temperature = 0.5

[widget]
max_transcript_entries = 200
"#;

        let config = Config::from_toml_str(toml).unwrap();
        assert_eq!(config.inference.api_token.as_deref(), Some("hf_test"));
        assert_eq!(config.inference.timeout_ms, Some(15000));
        assert_eq!(config.inference.parameters.temperature, 0.5);
        assert_eq!(config.inference.parameters.max_new_tokens, 100);
        assert_eq!(config.widget.transcript_limit(), Some(200));
        assert_eq!(config.widget.not_understood_message, DEFAULT_NOT_UNDERSTOOD_MESSAGE);
    }

    #[test]
    fn test_config_rejects_unknown_fields() {
        let result = Config::from_toml_str("[inference]\nmodle = \"typo\"\n");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("TOML parse error"));
    }

    #[test]
    fn test_config_rejects_bad_url() {
        let err = Config::from_toml_str("[inference]\nbase_url = \"ftp://example.com\"\n").unwrap_err();
        assert!(err.to_string().contains("invalid URL"));
    }

    #[test]
    fn test_config_rejects_template_without_input() {
        let err = Config::from_toml_str("[inference]\nprompt_template = \"Bot:\"\n").unwrap_err();
        assert!(err.to_string().contains("{input}"));
    }

    #[test]
    fn test_config_rejects_zero_values() {
        assert!(Config::from_toml_str("[inference.parameters]\nmax_new_tokens = 0\n").is_err());
        assert!(Config::from_toml_str("[inference.parameters]\ntemperature = 0.0\n").is_err());
        assert!(Config::from_toml_str("[inference.retry]\nmax_attempts = 0\n").is_err());
        assert!(Config::from_toml_str("[inference.retry]\nbackoff_multiplier = 0.5\n").is_err());
    }

    #[test]
    fn test_config_rejects_zero_timeout() {
        let err = Config::from_toml_str("[inference]\ntimeout_ms = 0\n").unwrap_err();
        assert!(err.to_string().contains("inference.timeout_ms"));

        let config = Config::from_toml_str("[inference]\ntimeout_ms = 1\n").unwrap();
        assert_eq!(config.inference.timeout_ms, Some(1));
    }

    #[test]
    fn test_config_rejects_blank_fallback() {
        let err = Config::from_toml_str("[widget]\nfallback_message = \"  \"\n").unwrap_err();
        assert!(err.to_string().contains("widget.fallback_message"));
    }

    #[test]
    fn test_config_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[inference]\nmodel = \"gpt2\"").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.inference.model, "gpt2");
    }

    #[test]
    fn test_config_from_missing_file() {
        let err = Config::from_file(Path::new("/nonexistent/mealchat.toml")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_config_error_display() {
        assert_eq!(ConfigError::Missing("x".to_string()).to_string(), "missing value: x");
        assert_eq!(ConfigError::InvalidUrl("y".to_string()).to_string(), "invalid URL: y");
    }
}
