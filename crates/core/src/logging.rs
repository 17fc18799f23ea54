//! Logging setup on the tracing ecosystem.
//!
//! # Environment Variables
//!
//! - `MEALCHAT_LOG`: Filter directive (like `RUST_LOG`), e.g., `mealchat_widget=debug`
//! - `MEALCHAT_LOG_FORMAT`: Output format for stderr: `pretty`, `json`, `compact`
//! - `MEALCHAT_LOG_DIR`: Directory for the rolling log file (default `~/.mealchat/logs`)
//!
//! # Configuration
//!
//! ```toml
//! [logging]
//! level = "warn"
//! format = "pretty"
//!
//! [logging.file]
//! enabled = false
//! level = "debug"
//!
//! [logging.privacy]
//! log_message_text = "truncate"
//! truncate_length = 80
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mealchat_core::logging::{self, LoggingConfig};
//!
//! let _guard = logging::init_logging(Some(LoggingConfig::default()))?;
//! # Ok::<(), mealchat_core::Error>(())
//! ```

use crate::Error;
use crate::config::LoggingConfig as ConfigLoggingConfig;
use std::env;
use std::io;
use std::path::PathBuf;
use std::str::FromStr;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, Registry, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Log output format for stderr.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Pretty, human-readable output with colors (default for TTY)
    #[default]
    Pretty,
    /// JSON output (one line per event)
    Json,
    /// Compact, single-line output
    Compact,
}

impl LogFormat {
    pub const VALUES: &[LogFormat] = &[LogFormat::Pretty, LogFormat::Json, LogFormat::Compact];

    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "pretty" => Some(LogFormat::Pretty),
            "json" => Some(LogFormat::Json),
            "compact" => Some(LogFormat::Compact),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogFormat::Pretty => "pretty",
            LogFormat::Json => "json",
            LogFormat::Compact => "compact",
        }
    }
}

/// How much of a chat message may appear in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MessageLogging {
    /// Replace message text with a placeholder
    None,
    /// Keep the first `truncate_length` characters
    #[default]
    Truncate,
    /// Log the full text
    Full,
}

impl MessageLogging {
    pub fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "none" => Some(MessageLogging::None),
            "truncate" => Some(MessageLogging::Truncate),
            "full" => Some(MessageLogging::Full),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MessageLogging::None => "none",
            MessageLogging::Truncate => "truncate",
            MessageLogging::Full => "full",
        }
    }
}

impl FromStr for MessageLogging {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MessageLogging::parse_str(s).ok_or_else(|| format!("invalid message logging: {}", s))
    }
}

/// Privacy controls for user and bot text in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PrivacyConfig {
    pub log_message_text: MessageLogging,
    pub truncate_length: usize,
}

impl Default for PrivacyConfig {
    fn default() -> Self {
        Self { log_message_text: MessageLogging::Truncate, truncate_length: 80 }
    }
}

/// Runtime logging settings, resolved from the `[logging]` section.
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
    /// Level for the rolling file; `None` disables file output
    pub file_level: Option<String>,
    pub privacy: PrivacyConfig,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self { level: "warn".to_string(), format: LogFormat::default(), file_level: None, privacy: PrivacyConfig::default() }
    }
}

impl From<ConfigLoggingConfig> for LoggingConfig {
    fn from(config: ConfigLoggingConfig) -> Self {
        let format = LogFormat::parse_str(&config.format).unwrap_or_default();
        let log_message_text = MessageLogging::parse_str(&config.privacy.log_message_text).unwrap_or_default();

        Self {
            level: config.level,
            format,
            file_level: if config.file.enabled { Some(config.file.level) } else { None },
            privacy: PrivacyConfig { log_message_text, truncate_length: config.privacy.truncate_length },
        }
    }
}

impl LoggingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_level(mut self, level: impl Into<String>) -> Self {
        self.level = level.into();
        self
    }

    pub fn with_format(mut self, format: LogFormat) -> Self {
        self.format = format;
        self
    }

    pub fn with_file_logging(mut self, level: impl Into<String>) -> Self {
        self.file_level = Some(level.into());
        self
    }

    pub fn with_privacy(mut self, privacy: PrivacyConfig) -> Self {
        self.privacy = privacy;
        self
    }

    /// Build an EnvFilter from this config and environment variables.
    fn build_env_filter(&self) -> EnvFilter {
        let filter = env::var("MEALCHAT_LOG")
            .ok()
            .or_else(|| env::var("RUST_LOG").ok())
            .unwrap_or_else(|| self.level.clone());

        EnvFilter::try_new(&filter).unwrap_or_else(|_| EnvFilter::new(&self.level))
    }

    fn is_tty() -> bool {
        atty::is(atty::Stream::Stderr)
    }

    /// Determine the appropriate format for stderr output.
    fn detect_format(&self) -> LogFormat {
        if let Ok(fmt_str) = env::var("MEALCHAT_LOG_FORMAT")
            && let Some(fmt) = LogFormat::parse_str(&fmt_str)
        {
            return fmt;
        }

        if Self::is_tty() { self.format } else { LogFormat::Compact }
    }

    fn get_log_dir() -> Result<PathBuf, Error> {
        if let Ok(custom_dir) = env::var("MEALCHAT_LOG_DIR") {
            return Ok(PathBuf::from(custom_dir));
        }

        let home = env::var("HOME")
            .or_else(|_| env::var("USERPROFILE"))
            .map_err(|_| Error::Config("Could not determine home directory".to_string()))?;

        Ok(PathBuf::from(home).join(".mealchat").join("logs"))
    }
}

/// Initialize the global tracing subscriber.
///
/// Sets up an env-based filter, a stderr layer in the detected format, and
/// when `file_level` is set, a daily-rolling JSON file. The returned guard
/// flushes the file writer on drop and must be held for the life of the
/// program.
pub fn init_logging(config: Option<LoggingConfig>) -> Result<Option<WorkerGuard>, Error> {
    let config = config.unwrap_or_default();
    let env_filter = config.build_env_filter();
    let format = config.detect_format();

    let stderr_layer = match format {
        LogFormat::Pretty => fmt::layer().pretty().with_writer(io::stderr).with_ansi(true).boxed(),
        LogFormat::Json => fmt::layer().json().with_writer(io::stderr).boxed(),
        LogFormat::Compact => fmt::layer().compact().with_writer(io::stderr).boxed(),
    };

    let registry = Registry::default().with(stderr_layer.with_filter(env_filter));

    if let Some(file_level) = &config.file_level {
        let log_dir = LoggingConfig::get_log_dir()?;
        std::fs::create_dir_all(&log_dir)
            .map_err(|e| Error::Config(format!("Failed to create log directory: {}", e)))?;

        let file_appender = tracing_appender::rolling::daily(log_dir, "mealchat.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        let file_filter = EnvFilter::try_new(file_level).unwrap_or_else(|_| EnvFilter::new("debug"));

        registry
            .with(fmt::layer().json().with_writer(non_blocking).with_filter(file_filter))
            .try_init()
            .map_err(|e| Error::Config(format!("Failed to install subscriber: {}", e)))?;
        return Ok(Some(guard));
    }

    registry
        .try_init()
        .map_err(|e| Error::Config(format!("Failed to install subscriber: {}", e)))?;
    Ok(None)
}

/// Prepare user or bot text for a log line according to privacy settings.
pub fn redact_message(content: &str, privacy: &PrivacyConfig) -> String {
    match privacy.log_message_text {
        MessageLogging::None => format!("[REDACTED {} chars]", content.chars().count()),
        MessageLogging::Truncate => {
            let total = content.chars().count();
            if total <= privacy.truncate_length {
                return content.to_string();
            }
            let mut truncated = content.chars().take(privacy.truncate_length).collect::<String>();
            truncated.push_str("...");
            truncated.push_str(&format!(" ({} total chars)", total));
            truncated
        }
        MessageLogging::Full => content.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_format_from_str() {
        assert_eq!(LogFormat::parse_str("pretty"), Some(LogFormat::Pretty));
        assert_eq!(LogFormat::parse_str("JSON"), Some(LogFormat::Json));
        assert_eq!(LogFormat::parse_str("Compact"), Some(LogFormat::Compact));
        assert_eq!(LogFormat::parse_str("invalid"), None);
    }

    #[test]
    fn test_log_format_as_str() {
        for format in LogFormat::VALUES {
            assert_eq!(LogFormat::parse_str(format.as_str()), Some(*format));
        }
    }

    #[test]
    fn test_message_logging_from_str() {
        assert_eq!("none".parse::<MessageLogging>(), Ok(MessageLogging::None));
        assert_eq!("TRUNCATE".parse::<MessageLogging>(), Ok(MessageLogging::Truncate));
        assert_eq!("full".parse::<MessageLogging>(), Ok(MessageLogging::Full));
        assert!("sometimes".parse::<MessageLogging>().is_err());
    }

    #[test]
    fn test_logging_config_default() {
        let config = LoggingConfig::default();
        assert_eq!(config.level, "warn");
        assert_eq!(config.format, LogFormat::Pretty);
        assert!(config.file_level.is_none());
        assert_eq!(config.privacy.log_message_text, MessageLogging::Truncate);
    }

    #[test]
    fn test_logging_config_builder() {
        let config = LoggingConfig::new()
            .with_level("debug")
            .with_format(LogFormat::Json)
            .with_file_logging("trace")
            .with_privacy(PrivacyConfig { log_message_text: MessageLogging::Full, truncate_length: 10 });

        assert_eq!(config.level, "debug");
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_level.as_deref(), Some("trace"));
        assert_eq!(config.privacy.log_message_text, MessageLogging::Full);
    }

    #[test]
    fn test_logging_config_from_file_section() {
        let mut section = ConfigLoggingConfig::default();
        section.format = "json".to_string();
        section.file.enabled = true;
        section.privacy.log_message_text = "none".to_string();

        let config = LoggingConfig::from(section);
        assert_eq!(config.format, LogFormat::Json);
        assert_eq!(config.file_level.as_deref(), Some("debug"));
        assert_eq!(config.privacy.log_message_text, MessageLogging::None);
    }

    #[test]
    fn test_logging_config_unknown_format_falls_back() {
        let mut section = ConfigLoggingConfig::default();
        section.format = "xml".to_string();
        assert_eq!(LoggingConfig::from(section).format, LogFormat::Pretty);
    }

    #[test]
    fn test_redact_message_none() {
        let privacy = PrivacyConfig { log_message_text: MessageLogging::None, truncate_length: 100 };
        assert_eq!(redact_message("Halo", &privacy), "[REDACTED 4 chars]");
    }

    #[test]
    fn test_redact_message_truncate() {
        let privacy = PrivacyConfig { log_message_text: MessageLogging::Truncate, truncate_length: 10 };

        assert_eq!(redact_message("short", &privacy), "short");

        let redacted = redact_message("abcdefghijklmnopqrstuvwxyz", &privacy);
        assert!(redacted.starts_with("abcdefghij..."));
        assert!(redacted.contains("26 total chars"));
    }

    #[test]
    fn test_redact_message_full() {
        let privacy = PrivacyConfig { log_message_text: MessageLogging::Full, truncate_length: 5 };
        let long = "a".repeat(200);
        assert_eq!(redact_message(&long, &privacy), long);
    }
}
