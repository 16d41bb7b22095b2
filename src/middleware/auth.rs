//! Authorization gate middleware.
//!
//! This middleware intercepts every protected request to:
//! 1. Extract whatever credentials the caller presented
//! 2. Ask the configured [`Authorizer`] for a verdict on the route's operation
//! 3. Inject the credentials into the request for forwarding downstream
//! 4. Reject denied requests with HTTP 401

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{HeaderMap, header::AUTHORIZATION},
    middleware::Next,
    response::Response,
};

use crate::{
    auth::{Authorizer, Operation, USER_ID_HEADER, USER_SECRET_HEADER},
    error::AppError,
    models::credential::Credentials,
};

/// Credentials attached to requests that passed the gate.
///
/// Handlers forward these unchanged to every downstream call made on the
/// caller's behalf.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub credentials: Credentials,
}

/// Middleware state: who decides, and which operation the guarded routes
/// perform.
#[derive(Clone)]
pub struct Gate {
    pub authorizer: Arc<dyn Authorizer>,
    pub operation: Operation,
}

/// Read credentials from request headers.
///
/// A bearer token wins over the `x-user-id` / `x-user-secret` pair. A pair
/// with either half missing or empty counts as no credentials.
///
/// Tokens and user ids are trimmed. Secrets are taken byte for byte, so
/// surrounding whitespace is part of the secret.
pub fn credentials_from_headers(headers: &HeaderMap) -> Credentials {
    if let Some(token) = header(headers, AUTHORIZATION.as_str())
        .and_then(|v| v.trim().strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
    {
        return Credentials::Token(token.to_string());
    }

    let user_id = header(headers, USER_ID_HEADER)
        .map(str::trim)
        .filter(|v| !v.is_empty());
    let secret = header(headers, USER_SECRET_HEADER).filter(|v| !v.is_empty());
    match (user_id, secret) {
        (Some(user_id), Some(secret)) => Credentials::Secret {
            user_id: user_id.to_string(),
            secret: secret.to_string(),
        },
        _ => Credentials::Anonymous,
    }
}

/// Raw header value, if it is valid visible ASCII.
fn header<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|h| h.to_str().ok())
}

/// Gate middleware function.
///
/// # Flow
///
/// 1. Extract credentials from headers
/// 2. Ask the authorizer about `gate.operation`
/// 3. If granted: inject `AuthContext`, call next handler
/// 4. If denied: return 401 with both booleans
///
/// An authorizer that cannot reach its backend fails the request with its
/// own error; the handler never runs.
pub async fn require_access(
    State(gate): State<Gate>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let credentials = credentials_from_headers(request.headers());

    let decision = gate.authorizer.authorize(&credentials, gate.operation).await?;
    if !decision.access_granted {
        tracing::info!(
            operation = gate.operation.as_str(),
            path = %request.uri().path(),
            authenticated = decision.authenticated,
            authorized = decision.authorized,
            "access denied"
        );
    }
    decision.into_result()?;

    request.extensions_mut().insert(AuthContext { credentials });
    Ok(next.run(request).await)
}
