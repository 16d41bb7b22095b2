//! Signed capability tokens.
//!
//! A token proves "this user holds these permissions until `exp`" without
//! carrying the user's secret. Any service that knows the signing key can
//! verify one locally.
//!
//! # Format
//!
//! `hex(claims_json) "." hex(hmac_sha256(key, claims_json))`

use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;

use crate::models::credential::Permissions;

type HmacSha256 = Hmac<Sha256>;

/// What a token asserts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claims {
    /// User the token was issued to
    pub sub: String,

    /// Permissions at issue time
    pub perm: Permissions,

    /// Expiry, unix seconds
    pub exp: i64,

    /// Random token id
    pub jti: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CapabilityError {
    #[error("capability signing key rejected")]
    InvalidKey,

    #[error("token lifetime out of range")]
    InvalidTtl,

    #[error("failed to encode claims: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Signing/verification key plus token lifetime.
#[derive(Clone)]
pub struct CapabilityKey {
    secret: Vec<u8>,
    ttl: Duration,
}

impl CapabilityKey {
    pub fn new(secret: impl Into<Vec<u8>>, ttl: Duration) -> Self {
        Self {
            secret: secret.into(),
            ttl,
        }
    }

    fn mac(&self) -> Result<HmacSha256, CapabilityError> {
        HmacSha256::new_from_slice(&self.secret).map_err(|_| CapabilityError::InvalidKey)
    }

    /// Issue a token for `user_id` valid from now for the configured lifetime.
    pub fn issue(
        &self,
        user_id: &str,
        permissions: Permissions,
    ) -> Result<(String, DateTime<Utc>), CapabilityError> {
        self.issue_at(user_id, permissions, Utc::now())
    }

    pub fn issue_at(
        &self,
        user_id: &str,
        permissions: Permissions,
        now: DateTime<Utc>,
    ) -> Result<(String, DateTime<Utc>), CapabilityError> {
        let ttl = TimeDelta::from_std(self.ttl).map_err(|_| CapabilityError::InvalidTtl)?;
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(CapabilityError::InvalidTtl)?;

        let claims = Claims {
            sub: user_id.to_string(),
            perm: permissions,
            exp: expires_at.timestamp(),
            jti: hex::encode(rand::random::<[u8; 16]>()),
        };
        let payload = serde_json::to_vec(&claims)?;

        let mut mac = self.mac()?;
        mac.update(&payload);
        let signature = mac.finalize().into_bytes();

        let token = format!("{}.{}", hex::encode(&payload), hex::encode(signature));
        Ok((token, expires_at))
    }

    /// Verify signature and expiry. Any defect yields `None`.
    pub fn verify(&self, token: &str) -> Option<Claims> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Option<Claims> {
        let (payload_hex, signature_hex) = token.split_once('.')?;
        let payload = hex::decode(payload_hex).ok()?;
        let signature = hex::decode(signature_hex).ok()?;

        let mut mac = self.mac().ok()?;
        mac.update(&payload);
        // constant-time comparison
        mac.verify_slice(&signature).ok()?;

        let claims: Claims = serde_json::from_slice(&payload).ok()?;
        if claims.exp <= now.timestamp() {
            return None;
        }
        Some(claims)
    }
}
