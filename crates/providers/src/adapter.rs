use reqwest::Client as HttpClient;
use std::sync::Arc;
use std::time::Duration;

use crate::prompts::{clean_reply, render_prompt};
use crate::retry::{RetryPolicy, RetryingClient};
use crate::types::*;
use mealchat_core::{GenerationParameters, InferenceConfig, InferenceError, InferenceOptions, Result};

/// Adapter to a remote text-generation service
///
/// One call per invocation, no state kept between calls. Failures come back
/// as [`InferenceError`]; implementations never panic on provider input.
#[async_trait::async_trait]
pub trait InferenceClient: Send + Sync {
    async fn generate(&self, request: InferenceRequest) -> InferenceResult;
}

#[async_trait::async_trait]
impl<T: InferenceClient + ?Sized> InferenceClient for Arc<T> {
    async fn generate(&self, request: InferenceRequest) -> InferenceResult {
        (**self).generate(request).await
    }
}

/// Client for a hosted text-generation endpoint (`POST {base_url}/models/{model}`)
pub struct HostedTextGeneration {
    client: HttpClient,
    api_token: Option<String>,
    base_url: String,
    model: String,
    prompt_template: String,
    reply_marker: String,
    parameters: GenerationParameters,
    options: InferenceOptions,
}

impl HostedTextGeneration {
    pub fn new(config: &InferenceConfig) -> Result<Self> {
        let mut builder = HttpClient::builder();
        if let Some(timeout_ms) = config.timeout_ms {
            builder = builder.timeout(Duration::from_millis(timeout_ms));
        }
        let client = builder
            .build()
            .map_err(|e| mealchat_core::Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_token: config.api_token.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            prompt_template: config.prompt_template.clone(),
            reply_marker: config.reply_marker.clone(),
            parameters: config.parameters.clone(),
            options: config.options.clone(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}", self.base_url, self.model)
    }

    fn to_body(&self, request: &InferenceRequest) -> TextGenerationBody<'_> {
        TextGenerationBody {
            model: &self.model,
            inputs: render_prompt(&self.prompt_template, &request.prompt),
            parameters: &self.parameters,
            options: &self.options,
        }
    }

    /// Map an HTTP status and body to a reply
    fn interpret(&self, status: u16, body: &str, prompt: &str) -> InferenceResult {
        let parsed = serde_json::from_str::<TextGenerationResponse>(body);

        if !(200..300).contains(&status) {
            let message = match parsed {
                Ok(TextGenerationResponse::Error(err)) => err.error.message(),
                _ => body.trim().to_string(),
            };
            return Err(InferenceError::provider(status, message));
        }

        let response = parsed.map_err(|e| InferenceError::Decode(e.to_string()))?;
        match response.into_text() {
            Ok(Some(text)) => Ok(clean_reply(&text, prompt, &self.reply_marker)),
            Ok(None) => Ok(String::new()),
            Err(message) => Err(InferenceError::provider(status, message)),
        }
    }
}

fn classify_transport_error(err: &reqwest::Error) -> InferenceError {
    if err.is_timeout() {
        InferenceError::Timeout
    } else if err.is_decode() {
        InferenceError::Decode(err.to_string())
    } else {
        InferenceError::Network(err.to_string())
    }
}

#[async_trait::async_trait]
impl InferenceClient for HostedTextGeneration {
    async fn generate(&self, request: InferenceRequest) -> InferenceResult {
        if request.is_blank() {
            return Err(InferenceError::EmptyPrompt);
        }

        let body = self.to_body(&request);
        let mut builder = self.client.post(self.endpoint()).json(&body);
        if let Some(token) = &self.api_token {
            builder = builder.bearer_auth(token);
        }

        tracing::debug!(model = %self.model, "sending text-generation request");
        let response = builder.send().await.map_err(|e| classify_transport_error(&e))?;
        let status = response.status().as_u16();
        let text = response.text().await.map_err(|e| classify_transport_error(&e))?;
        tracing::debug!(status, bytes = text.len(), "text-generation response received");

        self.interpret(status, &text, &body.inputs)
    }
}

/// Factory to create clients from config
pub struct ClientFactory;

impl ClientFactory {
    /// Hosted client wrapped in the configured retry policy
    pub fn create_from_config(config: &InferenceConfig) -> Result<Arc<dyn InferenceClient>> {
        let hosted = HostedTextGeneration::new(config)?;
        if config.api_token.is_none() {
            tracing::warn!("no inference api_token configured; requests will be anonymous");
        }
        let policy = RetryPolicy::from(&config.retry);
        Ok(Arc::new(RetryingClient::new(hosted, policy)))
    }
}
