//! Actix-web extractor resolving the caller's [`AuthState`] from HTTP Basic credentials.
//!
//! # Security
//! - The password is wrapped in `SecretString` as soon as it is decoded
//! - Credentials are never logged, only the username
//! - Credentials are refused over plain HTTP when `require_secure_auth` is set

use actix_web::dev::Payload;
use actix_web::http::header;
use actix_web::{FromRequest, HttpRequest, web};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use std::future::{Ready, ready};
use tracing::{info, warn};

use super::{AuthSettings, AuthState, UserDirectory};
use crate::error::{AppError, AppResult};

/// Decode the payload of a `Basic` authorization header into username and password.
pub fn decode_basic_credentials(encoded: &str) -> AppResult<(String, SecretString)> {
    let decoded = STANDARD
        .decode(encoded.trim())
        .map_err(|_| AppError::InvalidInput("Malformed basic credentials".to_string()))?;
    let decoded = String::from_utf8(decoded)
        .map_err(|_| AppError::InvalidInput("Malformed basic credentials".to_string()))?;

    let (username, password) = decoded.split_once(':').ok_or_else(|| {
        AppError::InvalidInput("Malformed basic credentials: missing ':'".to_string())
    })?;

    Ok((username.to_string(), SecretString::from(password.to_string())))
}

/// Extractor yielding the caller's authentication state.
///
/// ```ignore
/// async fn handler(principal: Principal) -> impl Responder {
///     if principal.state.is_authenticated() { /* ... */ }
/// }
/// ```
///
/// A missing `Authorization` header, or one with another scheme, resolves to
/// [`AuthState::Anonymous`]. Basic credentials that cannot be accepted resolve
/// to [`AuthState::Rejected`]; what happens next is up to the submission gate.
#[derive(Debug, Clone)]
pub struct Principal {
    pub state: AuthState,
}

impl Principal {
    pub fn into_inner(self) -> AuthState {
        self.state
    }
}

fn resolve(req: &HttpRequest) -> AppResult<AuthState> {
    let Some(value) = req.headers().get(header::AUTHORIZATION) else {
        return Ok(AuthState::Anonymous);
    };

    let settings = req
        .app_data::<web::Data<AuthSettings>>()
        .ok_or_else(|| AppError::Storage("Auth settings not configured".to_string()))?;
    let directory = req
        .app_data::<web::Data<UserDirectory>>()
        .ok_or_else(|| AppError::Storage("User directory not configured".to_string()))?;

    let Ok(value) = value.to_str() else {
        info!(path = %req.path(), "Unreadable authorization header");
        return Ok(AuthState::Rejected);
    };
    let (scheme, payload) = value.split_once(' ').unwrap_or((value, ""));
    if !scheme.eq_ignore_ascii_case("basic") {
        return Ok(AuthState::Anonymous);
    }

    if settings.require_secure_auth && req.connection_info().scheme() != "https" {
        warn!(path = %req.path(), "Credentials presented over an insecure connection");
        return Ok(AuthState::Rejected);
    }

    let (username, password) = match decode_basic_credentials(payload) {
        Ok(credentials) => credentials,
        Err(e) => {
            info!(path = %req.path(), error = %e, "Malformed basic credentials");
            return Ok(AuthState::Rejected);
        }
    };

    match directory.authenticate(&username, password.expose_secret()) {
        Some(state) => {
            info!(username = %username, authenticated = state.is_authenticated(), "Credentials accepted");
            Ok(state)
        }
        None => {
            info!(username = %username, "Failed authentication");
            Ok(AuthState::Rejected)
        }
    }
}

impl FromRequest for Principal {
    type Error = AppError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _payload: &mut Payload) -> Self::Future {
        ready(resolve(req).map(|state| Principal { state }))
    }
}
