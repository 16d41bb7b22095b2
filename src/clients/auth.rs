//! Auth Service client used by the centralized authorization mode.

use super::Downstream;
use crate::{
    error::AppError,
    models::{
        auth::{AuthRequest, AuthResponse},
        credential::Credentials,
    },
};

pub struct AuthServiceClient {
    downstream: Downstream,
}

impl AuthServiceClient {
    pub fn new(downstream: Downstream) -> Self {
        Self { downstream }
    }

    /// Ask for a verdict. The check has no side effects, so it is retried
    /// like any other read.
    pub async fn authenticate_and_authorize(
        &self,
        request: &AuthRequest,
    ) -> Result<AuthResponse, AppError> {
        // The credential travels in the body; the call itself is unauthenticated.
        self.downstream
            .read("authenticateAndAuthorize", request, &Credentials::Anonymous)
            .await
    }
}
