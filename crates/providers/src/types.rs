use mealchat_core::{GenerationParameters, InferenceError, InferenceOptions};
use serde::{Deserialize, Serialize};

/// Outcome of a single inference call
pub type InferenceResult = Result<String, InferenceError>;

/// A single prompt for the text-generation service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InferenceRequest {
    pub prompt: String,
}

impl InferenceRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self { prompt: prompt.into() }
    }

    pub fn is_blank(&self) -> bool {
        self.prompt.trim().is_empty()
    }
}

/// Request body for the hosted text-generation endpoint
#[derive(Debug, Serialize)]
pub struct TextGenerationBody<'a> {
    pub model: &'a str,
    pub inputs: String,
    pub parameters: &'a GenerationParameters,
    pub options: &'a InferenceOptions,
}

/// One generated candidate
#[derive(Debug, Clone, Deserialize)]
pub struct GeneratedText {
    #[serde(default)]
    pub generated_text: Option<String>,
}

/// Error payload returned by the provider
#[derive(Debug, Clone, Deserialize)]
pub struct ProviderErrorBody {
    pub error: ProviderErrorDetail,
}

/// The `error` field is a string on most routes and a list on validation errors
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum ProviderErrorDetail {
    Message(String),
    List(Vec<String>),
}

impl ProviderErrorDetail {
    pub fn message(&self) -> String {
        match self {
            ProviderErrorDetail::Message(msg) => msg.clone(),
            ProviderErrorDetail::List(items) => items.join("; "),
        }
    }
}

/// Every response shape the endpoint is known to produce
///
/// Variant order matters: an error payload must be tried before the
/// permissive single-object shape.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum TextGenerationResponse {
    Error(ProviderErrorBody),
    Batch(Vec<GeneratedText>),
    Single(GeneratedText),
}

impl TextGenerationResponse {
    /// Text of the first candidate, or the provider's error message
    pub fn into_text(self) -> Result<Option<String>, String> {
        match self {
            TextGenerationResponse::Error(body) => Err(body.error.message()),
            TextGenerationResponse::Batch(items) => Ok(items.into_iter().next().and_then(|g| g.generated_text)),
            TextGenerationResponse::Single(item) => Ok(item.generated_text),
        }
    }
}
