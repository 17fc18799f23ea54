use mealchat_core::{AuthUser, Credentials, Error, Field, FieldErrors, IdentityProvider, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AuthMode {
    #[default]
    Login,
    Register,
}

impl AuthMode {
    pub fn toggled(self) -> Self {
        match self {
            AuthMode::Login => AuthMode::Register,
            AuthMode::Register => AuthMode::Login,
        }
    }
}

/// Login / register form
///
/// Field problems are reported inline per field before the provider is
/// called. Provider failures become a single general message. The form
/// stays editable after either.
#[derive(Debug, Clone, Default)]
pub struct AuthForm {
    mode: AuthMode,
    credentials: Credentials,
    field_errors: FieldErrors,
    general_error: Option<String>,
}

impl AuthForm {
    pub fn new(mode: AuthMode) -> Self {
        Self { mode, ..Default::default() }
    }

    pub fn mode(&self) -> AuthMode {
        self.mode
    }

    /// Switch between login and register, clearing errors
    pub fn switch_mode(&mut self) {
        self.mode = self.mode.toggled();
        self.clear_errors();
    }

    pub fn set_email(&mut self, email: impl Into<String>) {
        self.credentials.email = email.into();
    }

    pub fn set_password(&mut self, password: impl Into<String>) {
        self.credentials.password = password.into();
    }

    pub fn email(&self) -> &str {
        &self.credentials.email
    }

    pub fn field_error(&self, field: Field) -> Option<&str> {
        self.field_errors.get(field)
    }

    pub fn general_error(&self) -> Option<&str> {
        self.general_error.as_deref()
    }

    pub async fn submit(&mut self, identity: &dyn IdentityProvider) -> Result<AuthUser> {
        self.clear_errors();
        if let Err(errors) = self.credentials.validate() {
            self.field_errors = errors.clone();
            return Err(Error::Validation(errors));
        }

        let Credentials { email, password } = &self.credentials;
        let result = match self.mode {
            AuthMode::Login => identity.sign_in(email, password).await,
            AuthMode::Register => identity.sign_up(email, password).await,
        };

        match result {
            Ok(user) => {
                self.credentials.password.clear();
                Ok(user)
            }
            Err(err) => {
                tracing::info!(mode = ?self.mode, error = %err, "authentication failed");
                self.general_error = Some(err.to_string());
                Err(Error::Auth(err))
            }
        }
    }

    fn clear_errors(&mut self) {
        self.field_errors = FieldErrors::new();
        self.general_error = None;
    }
}
