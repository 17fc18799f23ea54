//! Boundary to the hosted identity service.
//!
//! The site only needs four operations: sign in, sign up, sign out, and a
//! notification whenever the signed-in user changes. Token formats and
//! storage are the provider's business.

use crate::error::AuthError;

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use tokio::sync::{Mutex, watch};

/// The signed-in user as seen by the site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub uid: String,
    pub email: String,
}

impl AuthUser {
    /// Avatar letter: first character of the email, uppercased
    pub fn initial(&self) -> char {
        self.email
            .chars()
            .next()
            .and_then(|c| c.to_uppercase().next())
            .unwrap_or('U')
    }
}

/// Opaque identity collaborator
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError>;

    async fn sign_out(&self);

    /// Receiver that observes every auth-state transition
    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>>;

    fn current_user(&self) -> Option<AuthUser> {
        self.subscribe().borrow().clone()
    }
}

struct Account {
    uid: String,
    password: String,
}

/// In-process identity provider for local runs and tests
///
/// Accounts live in memory only; nothing is hashed or persisted.
pub struct InMemoryIdentity {
    accounts: Mutex<HashMap<String, Account>>,
    state: watch::Sender<Option<AuthUser>>,
    next_uid: AtomicU64,
    available: AtomicBool,
}

impl InMemoryIdentity {
    pub fn new() -> Self {
        let (state, _) = watch::channel(None);
        Self {
            accounts: Mutex::new(HashMap::new()),
            state,
            next_uid: AtomicU64::new(1),
            available: AtomicBool::new(true),
        }
    }

    /// Simulate the service going down or coming back
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    fn ensure_available(&self) -> Result<(), AuthError> {
        if self.available.load(Ordering::SeqCst) {
            Ok(())
        } else {
            Err(AuthError::Unavailable("identity service is offline".to_string()))
        }
    }

    fn publish(&self, user: Option<AuthUser>) {
        self.state.send_replace(user);
    }
}

impl Default for InMemoryIdentity {
    fn default() -> Self {
        Self::new()
    }
}

fn normalize(email: &str) -> String {
    email.trim().to_lowercase()
}

#[async_trait]
impl IdentityProvider for InMemoryIdentity {
    async fn sign_in(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.ensure_available()?;
        let key = normalize(email);
        let accounts = self.accounts.lock().await;
        let account = accounts.get(&key).ok_or(AuthError::InvalidCredentials)?;
        if account.password != password {
            return Err(AuthError::InvalidCredentials);
        }

        let user = AuthUser { uid: account.uid.clone(), email: key };
        tracing::info!(uid = %user.uid, "user signed in");
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_up(&self, email: &str, password: &str) -> Result<AuthUser, AuthError> {
        self.ensure_available()?;
        let key = normalize(email);
        let mut accounts = self.accounts.lock().await;
        if accounts.contains_key(&key) {
            return Err(AuthError::EmailInUse(key));
        }

        let uid = format!("user-{}", self.next_uid.fetch_add(1, Ordering::SeqCst));
        accounts.insert(key.clone(), Account { uid: uid.clone(), password: password.to_string() });

        let user = AuthUser { uid, email: key };
        tracing::info!(uid = %user.uid, "account created");
        self.publish(Some(user.clone()));
        Ok(user)
    }

    async fn sign_out(&self) {
        if self.state.borrow().is_some() {
            tracing::info!("user signed out");
        }
        self.publish(None);
    }

    fn subscribe(&self) -> watch::Receiver<Option<AuthUser>> {
        self.state.subscribe()
    }
}
