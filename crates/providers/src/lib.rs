pub mod adapter;
pub mod mock;
pub mod prompts;
pub mod retry;
pub mod types;

pub use adapter::{ClientFactory, HostedTextGeneration, InferenceClient};
pub use mock::{MockResponse, ScriptedClient};
pub use prompts::{clean_reply, render_prompt};
pub use retry::{RetryPolicy, RetryingClient, is_retryable_error};
pub use types::{InferenceRequest, InferenceResult, TextGenerationResponse};

pub use mealchat_core::{Error, InferenceError, Result};
