pub mod config;
pub mod context;
pub mod error;
pub mod identity;
pub mod logging;
pub mod validation;

pub use config::{
    Config, GenerationParameters, InferenceConfig, InferenceOptions, RetryConfig, WidgetConfig,
};
pub use context::{AppContext, Theme, ThemeHandle, ViewerHandle};
pub use error::{AuthError, Error, InferenceError, Result};
pub use identity::{AuthUser, IdentityProvider, InMemoryIdentity};
pub use validation::{ContactForm, Credentials, Field, FieldErrors};
