use crate::adapter::InferenceClient;
use crate::types::*;
use mealchat_core::{InferenceError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Scripted outcome for one inference call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum MockResponse {
    Text { content: String },
    Delayed { content: String, delay_ms: u64 },
    Error { status: u16, message: String },
    Network { message: String },
    Timeout,
}

impl MockResponse {
    pub fn text(content: impl Into<String>) -> Self {
        Self::Text { content: content.into() }
    }

    pub fn delayed(content: impl Into<String>, delay_ms: u64) -> Self {
        Self::Delayed { content: content.into(), delay_ms }
    }

    pub fn error(status: u16, message: impl Into<String>) -> Self {
        Self::Error { status, message: message.into() }
    }

    pub fn network(message: impl Into<String>) -> Self {
        Self::Network { message: message.into() }
    }

    pub fn timeout() -> Self {
        Self::Timeout
    }
}

/// Mock configuration from TOML file
#[derive(Debug, Deserialize)]
struct MockConfig {
    responses: Vec<MockResponse>,
}

/// Deterministic client that replays scripted responses in order
///
/// Every prompt it receives is recorded so tests can assert on what the
/// widget actually sent.
pub struct ScriptedClient {
    responses: Vec<MockResponse>,
    current: AtomicUsize,
    prompts: Mutex<Vec<String>>,
}

impl ScriptedClient {
    pub fn new(responses: Vec<MockResponse>) -> Self {
        Self { responses, current: AtomicUsize::new(0), prompts: Mutex::new(Vec::new()) }
    }

    /// Load a script from a TOML file of `[[responses]]` tables
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: MockConfig = toml::from_str(content)
            .map_err(|e| mealchat_core::Error::Parse(format!("Failed to parse mock responses: {}", e)))?;
        Ok(Self::new(config.responses))
    }

    /// Prompts received so far, in call order
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }

    pub fn remaining(&self) -> usize {
        self.responses.len().saturating_sub(self.current.load(Ordering::SeqCst))
    }

    fn get_next_response(&self) -> MockResponse {
        let index = self.current.fetch_add(1, Ordering::SeqCst);
        if index < self.responses.len() {
            self.responses[index].clone()
        } else {
            MockResponse::Text {
                content: format!(
                    "No more mock responses configured (requested: {}, available: {})",
                    index + 1,
                    self.responses.len()
                ),
            }
        }
    }
}

#[async_trait::async_trait]
impl InferenceClient for ScriptedClient {
    async fn generate(&self, request: InferenceRequest) -> InferenceResult {
        if request.is_blank() {
            return Err(InferenceError::EmptyPrompt);
        }

        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(request.prompt.clone());
        }

        match self.get_next_response() {
            MockResponse::Text { content } => Ok(content),
            MockResponse::Delayed { content, delay_ms } => {
                tokio::time::sleep(Duration::from_millis(delay_ms)).await;
                Ok(content)
            }
            MockResponse::Error { status, message } => Err(InferenceError::provider(status, message)),
            MockResponse::Network { message } => Err(InferenceError::Network(message)),
            MockResponse::Timeout => Err(InferenceError::Timeout),
        }
    }
}
