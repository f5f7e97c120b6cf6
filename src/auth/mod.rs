//! Authentication for result submissions.
//!
//! Callers identify themselves with HTTP Basic credentials checked against a
//! [`UserDirectory`]. The outcome is an [`AuthState`] which the submission
//! gate inspects before any handler runs.

mod extractor;
mod gate;

use std::collections::HashMap;

use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

pub use extractor::{Principal, decode_basic_credentials};
pub use gate::{BasicAuthGate, basic_auth_required};

/// Realm announced in the challenge of the results endpoints.
pub const RESULTS_REALM: &str = "results";

/// Authorization switches read by the gate on every call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AuthSettings {
    /// Let any caller through the gate, authenticated or not.
    pub allow_anonymous_post: bool,
    /// Refuse HTTP credentials presented over a non-https connection.
    pub require_secure_auth: bool,
}

/// A known account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub username: String,
}

impl User {
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
        }
    }
}

/// Authentication state of the caller of a single request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    /// No credentials were presented.
    Anonymous,
    /// Credentials were presented but not accepted: unknown user, wrong
    /// password, malformed header or an insecure connection.
    Rejected,
    /// Valid credentials for an account that has been deactivated.
    Inactive(User),
    /// Valid credentials for an active account.
    Authenticated(User),
}

impl AuthState {
    pub fn is_authenticated(&self) -> bool {
        matches!(self, Self::Authenticated(_))
    }

    pub fn is_anonymous(&self) -> bool {
        matches!(self, Self::Anonymous)
    }

    pub fn user(&self) -> Option<&User> {
        match self {
            Self::Anonymous | Self::Rejected => None,
            Self::Inactive(user) | Self::Authenticated(user) => Some(user),
        }
    }

    /// Name used in logs.
    pub fn display_name(&self) -> &str {
        match self {
            Self::Rejected => "rejected",
            _ => self.user().map_or("anonymous", |u| u.username.as_str()),
        }
    }
}

/// Hash a password using SHA-256, hex encoded.
pub fn hash_password(password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Reasons a `name:sha256hex[:inactive]` entry is refused.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum UserEntryError {
    #[error("empty username")]
    EmptyUsername,

    #[error("'{0}' has no password hash")]
    MissingHash(String),

    #[error("'{0}' hash is not a SHA-256 hex digest")]
    InvalidHash(String),

    #[error("'{username}' has unknown flag '{flag}'")]
    UnknownFlag { username: String, flag: String },
}

#[derive(Clone)]
struct UserRecord {
    user: User,
    password_hash: SecretString,
    active: bool,
}

/// Accounts allowed to authenticate, keyed by username.
///
/// # Security
/// - Only SHA-256 digests are held, wrapped in `SecretString`
/// - `Debug` lists usernames but never digests
/// - Digests are compared in constant time
#[derive(Clone, Default)]
pub struct UserDirectory {
    users: HashMap<String, UserRecord>,
}

impl UserDirectory {
    /// Parse `name:sha256hex[:inactive]` entries separated by commas.
    pub fn parse(raw: &str) -> Result<Self, UserEntryError> {
        let mut directory = Self::default();

        for entry in raw.split(',').map(str::trim).filter(|e| !e.is_empty()) {
            let mut parts = entry.split(':');
            let username = parts.next().unwrap_or_default();
            let digest = parts
                .next()
                .ok_or_else(|| UserEntryError::MissingHash(username.to_string()))?;
            let active = match parts.next() {
                None => true,
                Some("inactive") => false,
                Some(flag) => {
                    return Err(UserEntryError::UnknownFlag {
                        username: username.to_string(),
                        flag: flag.to_string(),
                    });
                }
            };

            if username.is_empty() {
                return Err(UserEntryError::EmptyUsername);
            }
            if digest.len() != 64 || !digest.chars().all(|c| c.is_ascii_hexdigit()) {
                return Err(UserEntryError::InvalidHash(username.to_string()));
            }

            directory.insert_hashed(username, &digest.to_lowercase(), active);
        }

        Ok(directory)
    }

    /// Register an account from its plain password.
    pub fn insert(&mut self, username: &str, password: &str, active: bool) {
        self.insert_hashed(username, &hash_password(password), active);
    }

    fn insert_hashed(&mut self, username: &str, password_hash: &str, active: bool) {
        self.users.insert(
            username.to_string(),
            UserRecord {
                user: User::new(username),
                password_hash: SecretString::from(password_hash.to_string()),
                active,
            },
        );
    }

    /// Check credentials. Returns `None` for an unknown user or wrong password.
    pub fn authenticate(&self, username: &str, password: &str) -> Option<AuthState> {
        let record = self.users.get(username)?;
        let provided = hash_password(password);
        let matches: bool = record
            .password_hash
            .expose_secret()
            .as_bytes()
            .ct_eq(provided.as_bytes())
            .into();

        if !matches {
            return None;
        }

        Some(if record.active {
            AuthState::Authenticated(record.user.clone())
        } else {
            AuthState::Inactive(record.user.clone())
        })
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.users.values().filter(|r| r.active).count()
    }
}

impl std::fmt::Debug for UserDirectory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut names: Vec<&str> = self.users.keys().map(String::as_str).collect();
        names.sort_unstable();
        f.debug_struct("UserDirectory").field("users", &names).finish()
    }
}
