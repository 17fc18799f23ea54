//! Application context shared by the page components.
//!
//! Theme and signed-in user are handed to each component through explicit
//! capability handles instead of a page-wide mutable global. A component
//! that only renders the avatar gets a [`ViewerHandle`]; the navbar switch
//! gets a [`ThemeHandle`].

use crate::identity::{AuthUser, IdentityProvider};

use std::sync::Arc;
use tokio::sync::watch;

/// Colour scheme of the site
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn is_dark(self) -> bool {
        matches!(self, Theme::Dark)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }
}

/// Root context; create once and hand out handles
pub struct AppContext {
    theme: Arc<watch::Sender<Theme>>,
    user: watch::Receiver<Option<AuthUser>>,
}

impl AppContext {
    /// Context whose user follows the identity provider's subscription
    pub fn new(identity: &dyn IdentityProvider) -> Self {
        let (theme, _) = watch::channel(Theme::default());
        Self { theme: Arc::new(theme), user: identity.subscribe() }
    }

    /// Context with no identity backend; the viewer is always anonymous
    pub fn anonymous() -> Self {
        let (theme, _) = watch::channel(Theme::default());
        let (_, user) = watch::channel(None);
        Self { theme: Arc::new(theme), user }
    }

    /// Read-write access to the theme
    pub fn theme_handle(&self) -> ThemeHandle {
        ThemeHandle { theme: Arc::clone(&self.theme) }
    }

    /// Read-only access to the signed-in user
    pub fn viewer(&self) -> ViewerHandle {
        ViewerHandle { user: self.user.clone() }
    }
}

#[derive(Clone)]
pub struct ThemeHandle {
    theme: Arc<watch::Sender<Theme>>,
}

impl ThemeHandle {
    pub fn current(&self) -> Theme {
        *self.theme.borrow()
    }

    pub fn set(&self, theme: Theme) {
        self.theme.send_replace(theme);
    }

    /// Flip light/dark and return the new theme
    pub fn toggle(&self) -> Theme {
        let next = self.current().toggled();
        self.set(next);
        tracing::debug!(theme = next.as_str(), "theme toggled");
        next
    }

    pub fn subscribe(&self) -> watch::Receiver<Theme> {
        self.theme.subscribe()
    }
}

#[derive(Clone)]
pub struct ViewerHandle {
    user: watch::Receiver<Option<AuthUser>>,
}

impl ViewerHandle {
    pub fn current(&self) -> Option<AuthUser> {
        self.user.borrow().clone()
    }

    pub fn is_signed_in(&self) -> bool {
        self.user.borrow().is_some()
    }

    /// Wait for the next sign-in or sign-out; `None` once the provider is gone
    pub async fn changed(&mut self) -> Option<Option<AuthUser>> {
        self.user.changed().await.ok()?;
        Some(self.user.borrow_and_update().clone())
    }
}
