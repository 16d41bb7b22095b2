//! HTTP clients for collaborator services.
//!
//! Every call goes through [`Downstream`], which owns transport details:
//! URL building, credential forwarding, the per-call deadline, status
//! mapping, and retries. Only idempotent reads are retried; mutations get a
//! single attempt so a timed-out debit is never applied twice.
//!
//! A failure is [`Outcome::Rejected`](crate::error::Outcome) when the
//! collaborator answered with an error status or could not be connected to,
//! and `Indeterminate` when the request went out and no usable answer came
//! back.

use std::time::Duration;

use reqwest::{Client, RequestBuilder, StatusCode};
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use url::Url;

use crate::{
    auth::{USER_ID_HEADER, USER_SECRET_HEADER},
    error::AppError,
    models::credential::Credentials,
};

pub mod account;
pub mod auth;
pub mod customer;
pub mod notification;

/// Delay before the first retry; grows linearly per attempt.
const RETRY_BACKOFF: Duration = Duration::from_millis(100);

/// Build the process-wide HTTP client with a per-request deadline.
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// Body of a 401 from a service running the authorization gate.
#[derive(Debug, Deserialize)]
struct DeniedBody {
    #[serde(default)]
    authenticated: bool,
    #[serde(default)]
    authorized: bool,
}

struct Failure {
    error: AppError,
    retryable: bool,
}

/// One collaborator service at one base URL.
#[derive(Clone)]
pub struct Downstream {
    service: &'static str,
    base: Url,
    client: Client,
    read_retries: u32,
}

impl Downstream {
    pub fn new(service: &'static str, mut base: Url, client: Client, read_retries: u32) -> Self {
        // Url::join replaces the last segment unless the path ends in '/'
        if !base.path().ends_with('/') {
            let path = format!("{}/", base.path());
            base.set_path(&path);
        }

        Self {
            service,
            base,
            client,
            read_retries,
        }
    }

    /// Single attempt. For anything that changes state.
    pub async fn mutate<Req, Resp>(
        &self,
        endpoint: &str,
        body: &Req,
        credentials: &Credentials,
    ) -> Result<Resp, AppError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        self.send_once(endpoint, body, credentials)
            .await
            .map_err(|f| f.error)
    }

    /// Retried on transport errors, timeouts and 5xx, up to `read_retries`
    /// extra attempts.
    pub async fn read<Req, Resp>(
        &self,
        endpoint: &str,
        body: &Req,
        credentials: &Credentials,
    ) -> Result<Resp, AppError>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let mut attempt = 0;
        loop {
            match self.send_once(endpoint, body, credentials).await {
                Ok(response) => return Ok(response),
                Err(failure) if failure.retryable && attempt < self.read_retries => {
                    attempt += 1;
                    tracing::warn!(
                        service = self.service,
                        endpoint,
                        attempt,
                        error = %failure.error,
                        "retrying downstream read"
                    );
                    tokio::time::sleep(RETRY_BACKOFF * attempt).await;
                }
                Err(failure) => return Err(failure.error),
            }
        }
    }

    async fn send_once<Req, Resp>(
        &self,
        endpoint: &str,
        body: &Req,
        credentials: &Credentials,
    ) -> Result<Resp, Failure>
    where
        Req: Serialize + ?Sized,
        Resp: DeserializeOwned,
    {
        let url = self.base.join(endpoint).map_err(|e| Failure {
            error: AppError::downstream(self.service, format!("bad endpoint {endpoint}: {e}")),
            retryable: false,
        })?;

        let request = with_credentials(self.client.post(url).json(body), credentials);

        let response = request.send().await.map_err(|e| {
            let message = format!("{endpoint}: {e}");
            // A refused connection never delivered the request; anything
            // later (timeout, reset mid-response) may have been applied
            let error = if e.is_connect() {
                AppError::downstream(self.service, message)
            } else {
                AppError::indeterminate(self.service, message)
            };
            Failure {
                error,
                retryable: true,
            }
        })?;

        let status = response.status();
        match status {
            StatusCode::OK => response.json::<Resp>().await.map_err(|e| Failure {
                error: AppError::indeterminate(
                    self.service,
                    format!("{endpoint}: undecodable response: {e}"),
                ),
                retryable: false,
            }),
            StatusCode::UNAUTHORIZED => {
                // Denials are passed back to the original caller as-is
                let denied = response.json::<DeniedBody>().await.unwrap_or(DeniedBody {
                    authenticated: false,
                    authorized: false,
                });
                Err(Failure {
                    error: AppError::access_denied(denied.authenticated, denied.authorized),
                    retryable: false,
                })
            }
            _ => {
                let detail = response.text().await.unwrap_or_default();
                Err(Failure {
                    error: AppError::downstream(
                        self.service,
                        format!("{endpoint} returned {status}: {detail}"),
                    ),
                    retryable: status.is_server_error(),
                })
            }
        }
    }
}

/// Attach the caller's credentials so the downstream service can run its own
/// check.
fn with_credentials(request: RequestBuilder, credentials: &Credentials) -> RequestBuilder {
    match credentials {
        Credentials::Anonymous => request,
        Credentials::Secret { user_id, secret } => request
            .header(USER_ID_HEADER, user_id)
            .header(USER_SECRET_HEADER, secret),
        Credentials::Token(token) => request.bearer_auth(token),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_without_trailing_slash_keeps_its_path() {
        let client = Client::new();
        let downstream = Downstream::new(
            "account",
            Url::parse("http://gateway:8000/accounts").unwrap(),
            client,
            0,
        );
        assert_eq!(
            downstream.base.join("addToBalance").unwrap().as_str(),
            "http://gateway:8000/accounts/addToBalance"
        );
    }

    #[test]
    fn bare_host_joins_at_root() {
        let downstream = Downstream::new(
            "account",
            Url::parse("http://accounts:8082").unwrap(),
            Client::new(),
            0,
        );
        assert_eq!(
            downstream.base.join("getAccount").unwrap().as_str(),
            "http://accounts:8082/getAccount"
        );
    }
}
