//! Credential model for the authorization gate.
//!
//! Credentials are stored with a SHA-256 hash of the secret, never the secret
//! itself. Requests carry either the raw pair or a signed capability token.

use std::fmt;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// Permission flags attached to a user.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Permissions {
    #[serde(rename = "canRead")]
    pub can_read: bool,

    #[serde(rename = "canWrite")]
    pub can_write: bool,

    #[serde(rename = "canDelete")]
    pub can_delete: bool,
}

/// Represents a row of the `users` table.
///
/// # Database Table
///
/// - `user_id`: caller identity
/// - `secret_hash`: SHA-256 hash of the secret (64 hex characters)
/// - `can_read`, `can_write`, `can_delete`: permission flags
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct CredentialRecord {
    pub user_id: String,
    pub secret_hash: String,
    pub can_read: bool,
    pub can_write: bool,
    pub can_delete: bool,
}

impl CredentialRecord {
    pub fn permissions(&self) -> Permissions {
        Permissions {
            can_read: self.can_read,
            can_write: self.can_write,
            can_delete: self.can_delete,
        }
    }
}

/// Hash a secret the way it is stored in the `users` table.
pub fn hash_secret(secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

/// Whatever the caller presented to prove who they are.
///
/// Forwarded unchanged to every downstream service called on the caller's
/// behalf.
#[derive(Clone, PartialEq, Eq)]
pub enum Credentials {
    /// Nothing presented.
    Anonymous,

    /// Raw user id and secret.
    Secret { user_id: String, secret: String },

    /// Signed capability token.
    Token(String),
}

// Secrets and tokens must never reach a log line.
impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Credentials::Anonymous => f.write_str("Anonymous"),
            Credentials::Secret { user_id, .. } => f
                .debug_struct("Secret")
                .field("user_id", user_id)
                .field("secret", &"<redacted>")
                .finish(),
            Credentials::Token(_) => f.write_str("Token(<redacted>)"),
        }
    }
}
