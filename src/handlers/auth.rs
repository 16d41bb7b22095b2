//! Auth Service HTTP handlers.
//!
//! - POST /authenticateAndAuthorize - Verdict for a credential and operation kind
//! - POST /issueToken - Trade a credential for a signed capability token

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    auth::{AccessDecision, LocalAuthorizer, capability::CapabilityKey},
    error::AppError,
    models::auth::{AuthRequest, AuthResponse, IssueTokenRequest, IssueTokenResponse},
};

/// Shared state of the Auth Service routes.
#[derive(Clone)]
pub struct AuthState {
    pub authorizer: Arc<LocalAuthorizer>,
    pub capabilities: Option<CapabilityKey>,
}

/// Check a credential against the store.
///
/// A completed lookup is always 200, including denials; the verdict is in
/// the body.
///
/// # Response (200)
///
/// ```json
/// { "message": "success", "authenticated": true, "authorized": false, "accessGranted": false }
/// ```
pub async fn authenticate_and_authorize(
    State(state): State<AuthState>,
    payload: Result<Json<AuthRequest>, JsonRejection>,
) -> Result<Json<AuthResponse>, AppError> {
    let Json(request) = payload?;
    let AccessDecision {
        authenticated,
        authorized,
        access_granted,
    } = state
        .authorizer
        .check(&request.user_id, &request.password, &request.operation)
        .await?;

    tracing::debug!(
        user_id = %request.user_id,
        operation = %request.operation,
        access_granted,
        "credential checked"
    );

    Ok(Json(AuthResponse {
        message: "success".to_string(),
        authenticated,
        authorized,
        access_granted,
    }))
}

/// Issue a capability token carrying the user's current permissions.
///
/// # Errors
///
/// - `AccessDenied`: the credential does not match
/// - `Internal`: no signing secret is configured
pub async fn issue_token(
    State(state): State<AuthState>,
    payload: Result<Json<IssueTokenRequest>, JsonRejection>,
) -> Result<Json<IssueTokenResponse>, AppError> {
    let Json(request) = payload?;
    let key = state.capabilities.as_ref().ok_or_else(|| {
        AppError::Internal("capability tokens are not configured".to_string())
    })?;

    let permissions = state
        .authorizer
        .lookup(&request.user_id, &request.password)
        .await?
        .ok_or(AppError::access_denied(false, false))?;

    let (token, expires_at) = key.issue(&request.user_id, permissions)?;
    tracing::info!(user_id = %request.user_id, %expires_at, "capability token issued");

    Ok(Json(IssueTokenResponse {
        message: "success".to_string(),
        token,
        expires_at,
    }))
}
