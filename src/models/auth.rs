//! Auth Service wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// `authenticateAndAuthorize` request body.
///
/// `operation` stays a string on the wire: kinds other than `READ`, `WRITE`
/// and `DELETE` are answered with `authorized = false`, not rejected.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthRequest {
    #[serde(rename = "userID")]
    pub user_id: String,

    pub password: String,

    pub operation: String,
}

/// Verdict returned by the Auth Service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuthResponse {
    pub message: String,

    pub authenticated: bool,

    pub authorized: bool,

    #[serde(rename = "accessGranted")]
    pub access_granted: bool,
}

/// `issueToken` request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct IssueTokenRequest {
    #[serde(rename = "userID")]
    pub user_id: String,

    pub password: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct IssueTokenResponse {
    pub message: String,

    pub token: String,

    #[serde(rename = "expiresAt")]
    pub expires_at: DateTime<Utc>,
}
