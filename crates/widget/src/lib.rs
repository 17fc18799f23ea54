pub mod auth;
pub mod controller;
pub mod forms;
pub mod runtime;
pub mod session;
pub mod transcript;

pub use auth::{AuthForm, AuthMode};
pub use controller::{ApplyOutcome, Completion, PendingRequest, SubmitRejection, WidgetController, WidgetState};
pub use forms::{ContactFormState, FormDelivery, LoggingDelivery};
pub use runtime::{WidgetEvent, WidgetHandle, WidgetRuntime, WidgetSnapshot};
pub use session::{Session, SessionId};
pub use transcript::{Transcript, TranscriptEntry};
