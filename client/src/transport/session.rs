//! Session handling for 401 responses
//!
//! An unauthorized response clears the stored token and sends the user to
//! the login screen exactly once, even when several requests fail together.

use crate::services::credentials::TokenStore;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Whatever "go to the login screen" means for the embedding UI.
pub trait LoginRedirect: Send + Sync {
    fn redirect_to_login(&self);
}

/// Redirect used by the CLI: there is no login screen, so just say so.
pub struct LogRedirect;

impl LoginRedirect for LogRedirect {
    fn redirect_to_login(&self) {
        tracing::warn!("Session expired, please log in again");
    }
}

pub struct SessionGuard {
    tokens: Arc<dyn TokenStore>,
    redirect: Arc<dyn LoginRedirect>,
    redirecting: AtomicBool,
}

impl SessionGuard {
    pub fn new(tokens: Arc<dyn TokenStore>, redirect: Arc<dyn LoginRedirect>) -> Self {
        Self {
            tokens,
            redirect,
            redirecting: AtomicBool::new(false),
        }
    }

    pub fn tokens(&self) -> &Arc<dyn TokenStore> {
        &self.tokens
    }

    /// Current bearer token, if any. A failing store is treated as logged out.
    pub fn token(&self) -> Option<String> {
        match self.tokens.get() {
            Ok(token) => token,
            Err(e) => {
                tracing::warn!("Failed to read access token: {}", e);
                None
            }
        }
    }

    /// Clear the token and redirect. Returns `true` only for the call that
    /// actually triggered the redirect.
    pub fn handle_unauthorized(&self) -> bool {
        if self.redirecting.swap(true, Ordering::SeqCst) {
            tracing::debug!("Redirect to login already in progress");
            return false;
        }

        if let Err(e) = self.tokens.clear() {
            tracing::warn!("Failed to clear access token: {}", e);
        }
        tracing::info!("Unauthorized response, redirecting to login");
        self.redirect.redirect_to_login();
        true
    }

    /// Arm the guard again after a successful login.
    pub fn reset(&self) {
        self.redirecting.store(false, Ordering::SeqCst);
    }

    pub fn is_redirecting(&self) -> bool {
        self.redirecting.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::credentials::MemoryTokenStore;
    use std::sync::atomic::AtomicUsize;

    #[derive(Default)]
    struct CountingRedirect(AtomicUsize);

    impl LoginRedirect for CountingRedirect {
        fn redirect_to_login(&self) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[test]
    fn test_second_unauthorized_does_not_redirect_again() {
        let tokens = Arc::new(MemoryTokenStore::with_token("abc"));
        let redirect = Arc::new(CountingRedirect::default());
        let guard = SessionGuard::new(tokens.clone(), redirect.clone());

        assert!(guard.handle_unauthorized());
        assert!(!guard.handle_unauthorized());

        assert_eq!(redirect.0.load(Ordering::SeqCst), 1);
        assert_eq!(tokens.get().unwrap(), None);
    }

    #[test]
    fn test_reset_rearms_guard() {
        let tokens = Arc::new(MemoryTokenStore::default());
        let redirect = Arc::new(CountingRedirect::default());
        let guard = SessionGuard::new(tokens, redirect.clone());

        guard.handle_unauthorized();
        guard.reset();
        assert!(!guard.is_redirecting());
        guard.handle_unauthorized();

        assert_eq!(redirect.0.load(Ordering::SeqCst), 2);
    }
}
