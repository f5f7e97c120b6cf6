//! Basic-auth gate placed in front of submission handlers.

use tracing::{debug, info};

use super::{AuthSettings, AuthState};
use crate::error::{AppError, AppResult};

/// Gate that only lets authenticated callers reach the wrapped handler.
///
/// A denied caller gets a 401 carrying `WWW-Authenticate: Basic realm="<realm>"`
/// and the handler is never invoked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BasicAuthGate {
    realm: String,
}

/// Build a gate for `realm`.
pub fn basic_auth_required(realm: &str) -> BasicAuthGate {
    BasicAuthGate {
        realm: realm.to_string(),
    }
}

impl BasicAuthGate {
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Run `handler` if `state` may pass, returning its value untouched.
    ///
    /// `settings` is consulted on every call so a changed
    /// `allow_anonymous_post` takes effect immediately.
    pub fn call<T, F>(&self, settings: &AuthSettings, state: &AuthState, handler: F) -> AppResult<T>
    where
        F: FnOnce() -> T,
    {
        if settings.allow_anonymous_post {
            debug!(realm = %self.realm, caller = %state.display_name(), "allowing anonymous post");
            return Ok(handler());
        }

        if state.is_authenticated() {
            debug!(realm = %self.realm, caller = %state.display_name(), "caller authenticated");
            return Ok(handler());
        }

        info!(
            realm = %self.realm,
            caller = %state.display_name(),
            "Rejecting unauthenticated caller"
        );
        Err(AppError::AuthenticationRequired {
            realm: self.realm.clone(),
        })
    }
}
