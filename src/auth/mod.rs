//! Authorization gate.
//!
//! Every read or mutating endpoint asks an [`Authorizer`] whether the caller
//! may perform an [`Operation`]. Which implementation answers is decided once
//! at startup from [`AuthPattern`]:
//!
//! - `NO_AUTH` → [`NoAuth`], every call passes
//! - `CENTRALIZED` → [`RemoteAuthorizer`], asks the Auth Service
//! - `DECENTRALIZED` → [`LocalAuthorizer`], reads the local credential store
//!
//! Centralized and decentralized modes run the same verdict
//! ([`AccessDecision::evaluate`]), only in a different process.

use std::sync::Arc;

use async_trait::async_trait;
use serde::Serialize;

use crate::{
    clients::auth::AuthServiceClient,
    config::AuthPattern,
    error::AppError,
    models::{
        auth::AuthRequest,
        credential::{Credentials, Permissions, hash_secret},
    },
    stores::CredentialStore,
};

pub mod capability;

use capability::CapabilityKey;

/// Header carrying the caller's user id.
pub const USER_ID_HEADER: &str = "x-user-id";

/// Header carrying the caller's raw secret.
pub const USER_SECRET_HEADER: &str = "x-user-secret";

/// Kind of operation an endpoint performs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Read,
    Write,
    Delete,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::Read => "READ",
            Operation::Write => "WRITE",
            Operation::Delete => "DELETE",
        }
    }

    /// Exact, case-sensitive match on the wire names.
    pub fn parse(kind: &str) -> Option<Self> {
        match kind {
            "READ" => Some(Operation::Read),
            "WRITE" => Some(Operation::Write),
            "DELETE" => Some(Operation::Delete),
            _ => None,
        }
    }
}

impl Permissions {
    /// Whether these flags permit `operation`. Unknown kinds are denied.
    pub fn allows(&self, operation: Option<Operation>) -> bool {
        match operation {
            Some(Operation::Read) => self.can_read,
            Some(Operation::Write) => self.can_write,
            Some(Operation::Delete) => self.can_delete,
            None => false,
        }
    }
}

/// The `(authenticated, authorized, accessGranted)` triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct AccessDecision {
    pub authenticated: bool,
    pub authorized: bool,
    #[serde(rename = "accessGranted")]
    pub access_granted: bool,
}

impl AccessDecision {
    pub fn granted() -> Self {
        Self {
            authenticated: true,
            authorized: true,
            access_granted: true,
        }
    }

    pub fn unauthenticated() -> Self {
        Self {
            authenticated: false,
            authorized: false,
            access_granted: false,
        }
    }

    /// Verdict for a credential lookup result and a requested operation kind.
    ///
    /// `permissions` is `None` when no credential matched. Operation kinds
    /// other than `READ`, `WRITE` and `DELETE` are never authorized.
    pub fn evaluate(permissions: Option<Permissions>, operation: &str) -> Self {
        let Some(permissions) = permissions else {
            return Self::unauthenticated();
        };

        let authorized = permissions.allows(Operation::parse(operation));
        Self {
            authenticated: true,
            authorized,
            access_granted: authorized,
        }
    }

    /// `Ok` when access is granted, `AccessDenied` otherwise.
    pub fn into_result(self) -> Result<(), AppError> {
        if self.access_granted {
            Ok(())
        } else {
            Err(AppError::access_denied(self.authenticated, self.authorized))
        }
    }
}

/// Decides whether a caller may perform an operation.
#[async_trait]
pub trait Authorizer: Send + Sync {
    async fn authorize(
        &self,
        credentials: &Credentials,
        operation: Operation,
    ) -> Result<AccessDecision, AppError>;
}

/// Verify a capability token locally. Without a key every token is rejected.
fn token_decision(
    key: Option<&CapabilityKey>,
    token: &str,
    operation: Operation,
) -> AccessDecision {
    match key.and_then(|key| key.verify(token)) {
        Some(claims) => AccessDecision::evaluate(Some(claims.perm), operation.as_str()),
        None => AccessDecision::unauthenticated(),
    }
}

/// Trusted deployments: every call passes.
pub struct NoAuth;

#[async_trait]
impl Authorizer for NoAuth {
    async fn authorize(
        &self,
        _credentials: &Credentials,
        _operation: Operation,
    ) -> Result<AccessDecision, AppError> {
        Ok(AccessDecision::granted())
    }
}

/// Computes the verdict in-process against a credential store.
///
/// Also backs the Auth Service's own `authenticateAndAuthorize` endpoint.
pub struct LocalAuthorizer {
    store: Arc<dyn CredentialStore>,
    capabilities: Option<CapabilityKey>,
}

impl LocalAuthorizer {
    pub fn new(store: Arc<dyn CredentialStore>, capabilities: Option<CapabilityKey>) -> Self {
        Self {
            store,
            capabilities,
        }
    }

    /// Look up `(user_id, secret)` and return permission flags if it matches.
    pub async fn lookup(
        &self,
        user_id: &str,
        secret: &str,
    ) -> Result<Option<Permissions>, AppError> {
        let record = self.store.find(user_id, &hash_secret(secret)).await?;
        Ok(record.map(|r| r.permissions()))
    }

    /// Verdict for a raw operation string, as received on the wire.
    pub async fn check(
        &self,
        user_id: &str,
        secret: &str,
        operation: &str,
    ) -> Result<AccessDecision, AppError> {
        let permissions = self.lookup(user_id, secret).await?;
        Ok(AccessDecision::evaluate(permissions, operation))
    }
}

#[async_trait]
impl Authorizer for LocalAuthorizer {
    async fn authorize(
        &self,
        credentials: &Credentials,
        operation: Operation,
    ) -> Result<AccessDecision, AppError> {
        match credentials {
            Credentials::Anonymous => Ok(AccessDecision::unauthenticated()),
            Credentials::Secret { user_id, secret } => {
                self.check(user_id, secret, operation.as_str()).await
            }
            Credentials::Token(token) => Ok(token_decision(
                self.capabilities.as_ref(),
                token,
                operation,
            )),
        }
    }
}

/// Forwards raw credentials to the Auth Service and trusts its verdict.
pub struct RemoteAuthorizer {
    client: AuthServiceClient,
    capabilities: Option<CapabilityKey>,
}

impl RemoteAuthorizer {
    pub fn new(client: AuthServiceClient, capabilities: Option<CapabilityKey>) -> Self {
        Self {
            client,
            capabilities,
        }
    }
}

#[async_trait]
impl Authorizer for RemoteAuthorizer {
    async fn authorize(
        &self,
        credentials: &Credentials,
        operation: Operation,
    ) -> Result<AccessDecision, AppError> {
        match credentials {
            Credentials::Anonymous => Ok(AccessDecision::unauthenticated()),
            Credentials::Secret { user_id, secret } => {
                let verdict = self
                    .client
                    .authenticate_and_authorize(&AuthRequest {
                        user_id: user_id.clone(),
                        password: secret.clone(),
                        operation: operation.as_str().to_string(),
                    })
                    .await?;

                Ok(AccessDecision {
                    authenticated: verdict.authenticated,
                    authorized: verdict.authorized,
                    access_granted: verdict.access_granted,
                })
            }
            Credentials::Token(token) => Ok(token_decision(
                self.capabilities.as_ref(),
                token,
                operation,
            )),
        }
    }
}

/// Pick the authorizer for this process.
///
/// `local` and `remote` are only invoked for the pattern that needs them.
pub fn select_authorizer(
    pattern: AuthPattern,
    local: impl FnOnce() -> LocalAuthorizer,
    remote: impl FnOnce() -> Result<RemoteAuthorizer, AppError>,
) -> Result<Arc<dyn Authorizer>, AppError> {
    let authorizer: Arc<dyn Authorizer> = match pattern {
        AuthPattern::NoAuth => Arc::new(NoAuth),
        AuthPattern::Centralized => Arc::new(remote()?),
        AuthPattern::Decentralized => Arc::new(local()),
    };
    Ok(authorizer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::MemoryCredentialStore;
    use rstest::rstest;
    use std::time::Duration;

    fn all() -> Permissions {
        Permissions {
            can_read: true,
            can_write: true,
            can_delete: true,
        }
    }

    fn reader() -> Permissions {
        Permissions {
            can_read: true,
            can_write: false,
            can_delete: false,
        }
    }

    #[rstest]
    #[case("READ", true)]
    #[case("WRITE", false)]
    #[case("DELETE", false)]
    #[case("read", false)]
    #[case("ADMIN", false)]
    #[case("", false)]
    fn reader_verdicts(#[case] operation: &str, #[case] expected: bool) {
        let decision = AccessDecision::evaluate(Some(reader()), operation);
        assert!(decision.authenticated);
        assert_eq!(decision.authorized, expected);
        assert_eq!(decision.access_granted, expected);
    }

    #[rstest]
    #[case("EXECUTE")]
    #[case("Write")]
    #[case("READ ")]
    fn unknown_operation_is_denied_even_with_every_flag(#[case] operation: &str) {
        let decision = AccessDecision::evaluate(Some(all()), operation);
        assert!(decision.authenticated);
        assert!(!decision.authorized);
        assert!(!decision.access_granted);
    }

    #[test]
    fn missing_credential_is_unauthenticated() {
        assert_eq!(
            AccessDecision::evaluate(None, "READ"),
            AccessDecision::unauthenticated()
        );
    }

    #[test]
    fn denial_carries_flags() {
        let err = AccessDecision::evaluate(Some(reader()), "DELETE")
            .into_result()
            .unwrap_err();
        assert!(matches!(
            err,
            AppError::AccessDenied {
                authenticated: true,
                authorized: false
            }
        ));
    }

    #[tokio::test]
    async fn no_auth_grants_anonymous_callers() {
        let decision = NoAuth
            .authorize(&Credentials::Anonymous, Operation::Delete)
            .await
            .unwrap();
        assert!(decision.access_granted);
    }

    #[tokio::test]
    async fn local_unknown_credential_is_not_an_error() {
        let store = MemoryCredentialStore::default().with_user("alice", "s3cret", all());
        let local = LocalAuthorizer::new(Arc::new(store), None);

        let wrong_secret = Credentials::Secret {
            user_id: "alice".to_string(),
            secret: "nope".to_string(),
        };
        let decision = local.authorize(&wrong_secret, Operation::Read).await.unwrap();
        assert_eq!(decision, AccessDecision::unauthenticated());

        let unknown_user = Credentials::Secret {
            user_id: "mallory".to_string(),
            secret: "s3cret".to_string(),
        };
        let decision = local.authorize(&unknown_user, Operation::Read).await.unwrap();
        assert!(!decision.authenticated);
    }

    #[tokio::test]
    async fn local_checks_flags_for_known_credential() {
        let store = MemoryCredentialStore::default().with_user("bob", "pw", reader());
        let local = LocalAuthorizer::new(Arc::new(store), None);
        let bob = Credentials::Secret {
            user_id: "bob".to_string(),
            secret: "pw".to_string(),
        };

        assert!(local.authorize(&bob, Operation::Read).await.unwrap().access_granted);

        let write = local.authorize(&bob, Operation::Write).await.unwrap();
        assert!(write.authenticated);
        assert!(!write.authorized);
    }

    #[tokio::test]
    async fn tokens_carry_their_own_permissions() {
        let key = CapabilityKey::new("k", Duration::from_secs(60));
        let (token, _) = key.issue("bob", reader()).unwrap();
        let local = LocalAuthorizer::new(
            Arc::new(MemoryCredentialStore::default()),
            Some(key.clone()),
        );
        let creds = Credentials::Token(token);

        assert!(local.authorize(&creds, Operation::Read).await.unwrap().access_granted);
        let write = local.authorize(&creds, Operation::Write).await.unwrap();
        assert!(write.authenticated);
        assert!(!write.authorized);
    }

    #[tokio::test]
    async fn tokens_are_rejected_without_a_key() {
        let key = CapabilityKey::new("k", Duration::from_secs(60));
        let (token, _) = key.issue("bob", all()).unwrap();
        let local = LocalAuthorizer::new(Arc::new(MemoryCredentialStore::default()), None);

        let decision = local
            .authorize(&Credentials::Token(token), Operation::Read)
            .await
            .unwrap();
        assert_eq!(decision, AccessDecision::unauthenticated());
    }

    #[tokio::test]
    async fn anonymous_is_unauthenticated_when_enforcing() {
        let local = LocalAuthorizer::new(Arc::new(MemoryCredentialStore::default()), None);
        let decision = local
            .authorize(&Credentials::Anonymous, Operation::Read)
            .await
            .unwrap();
        assert_eq!(decision, AccessDecision::unauthenticated());
    }

    #[test]
    fn selection_only_builds_the_needed_authorizer() {
        let authorizer = select_authorizer(
            AuthPattern::NoAuth,
            || panic!("local authorizer not needed"),
            || panic!("remote authorizer not needed"),
        );
        assert!(authorizer.is_ok());

        let failed = select_authorizer(
            AuthPattern::Centralized,
            || panic!("local authorizer not needed"),
            || Err(AppError::downstream("auth", "unreachable")),
        );
        assert!(failed.is_err());
    }
}
