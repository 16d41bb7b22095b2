//! Ledger Services - Main Application Entry Point
//!
//! One binary that runs any of the cooperating services behind a fund
//! transfer: the Transaction Service (orchestrator), the Account Service
//! (ledger), the Notification Service, the Balance Service and the Auth
//! Service. `SERVICE_ROLE` picks which one this process is.
//!
//! # Architecture
//!
//! - **Web Framework**: Axum (async HTTP server)
//! - **Database**: PostgreSQL with sqlx (async queries)
//! - **Service calls**: reqwest, caller credentials forwarded on every hop
//! - **Authorization**: `NO_AUTH`, `CENTRALIZED` or `DECENTRALIZED`, chosen at startup
//! - **Format**: JSON requests/responses
//!
//! # Startup Flow
//!
//! 1. Load configuration from environment variables
//! 2. Create database connection pool
//! 3. Run database migrations
//! 4. Build the authorizer and the role's router
//! 5. Start server on configured port

mod auth;
mod clients;
mod config;
mod db;
mod error;
mod handlers;
mod middleware;
mod models;
mod routes;
mod services;
mod stores;

#[cfg(test)]
mod test_support;

use std::{iter::once, sync::Arc};

use axum::{Router, http::header::AUTHORIZATION};
use reqwest::Client;
use tower_http::{sensitive_headers::SetSensitiveRequestHeadersLayer, trace::TraceLayer};
use tracing_subscriber::EnvFilter;
use url::Url;

use crate::{
    auth::{
        Authorizer, LocalAuthorizer, RemoteAuthorizer, USER_SECRET_HEADER,
        capability::CapabilityKey,
    },
    clients::{
        Downstream, account::HttpAccountClient, auth::AuthServiceClient,
        customer::HttpCustomerClient, notification::HttpNotificationClient,
    },
    config::{Config, ServiceRole},
    db::DbPool,
    error::AppError,
    handlers::{auth::AuthState, health::HealthState},
    services::{
        account_service::AccountService, balance_service::BalanceService,
        notification_service::NotificationService, transfer_service::TransferService,
    },
    stores::postgres::{
        PgAccountStore, PgBalanceStore, PgCredentialStore, PgNotificationStore,
        PgTransactionStore,
    },
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging with tracing subscriber. Reads RUST_LOG environment variable (defaults to "info" level)
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    // Load configuration
    let config = Config::from_env()?;
    tracing::info!(
        role = ?config.service_role,
        auth_pattern = ?config.auth_pattern,
        "Configuration loaded"
    );

    // Create database pool
    let pool = db::create_pool(&config.database_url).await?;
    tracing::info!("Database pool created");

    // Run migrations
    db::run_migrations(&pool).await?;
    tracing::info!("Database migrations complete");

    // One HTTP client per process, shared by every downstream
    let client = clients::http_client(config.downstream_timeout())?;

    let role_routes = build_role(&config, &pool, &client)?;

    let app = Router::new()
        // Public routes (no authorization required)
        .merge(routes::health_routes(HealthState {
            pool: pool.clone(),
            role: config.service_role,
        }))
        .merge(role_routes)
        // Add distributed tracing middleware for observability
        .layer(TraceLayer::new_for_http())
        // Keep secrets and tokens out of request logs
        .layer(SetSensitiveRequestHeadersLayer::new(
            once(AUTHORIZATION).chain(once(axum::http::HeaderName::from_static(
                USER_SECRET_HEADER,
            ))),
        ));

    // Bind to network address and start server
    let addr = format!("0.0.0.0:{}", config.server_port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {}", addr);

    // Start serving HTTP requests
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the router for the configured role with its collaborators.
fn build_role(config: &Config, pool: &DbPool, client: &Client) -> anyhow::Result<Router> {
    let capabilities = config
        .capability_secret
        .as_ref()
        .map(|secret| CapabilityKey::new(secret.as_bytes(), config.capability_ttl()));
    if capabilities.is_none() {
        tracing::info!("CAPABILITY_SECRET not set; capability tokens are rejected");
    }

    let downstream = |service: &'static str, base: Url| {
        Downstream::new(service, base, client.clone(), config.read_retries)
    };
    let local = || {
        LocalAuthorizer::new(
            Arc::new(PgCredentialStore::new(pool.clone())),
            capabilities.clone(),
        )
    };

    let router = match config.service_role {
        ServiceRole::Auth => routes::auth_routes(AuthState {
            authorizer: Arc::new(local()),
            capabilities: capabilities.clone(),
        }),
        role => {
            let authorizer = auth::select_authorizer(config.auth_pattern, local, || {
                let base = config
                    .auth_service()
                    .map_err(|e| AppError::Internal(e.to_string()))?;
                Ok(RemoteAuthorizer::new(
                    AuthServiceClient::new(downstream("auth", base)),
                    capabilities.clone(),
                ))
            })?;
            gated_role(role, config, pool, authorizer, &downstream)?
        }
    };

    Ok(router)
}

fn gated_role(
    role: ServiceRole,
    config: &Config,
    pool: &DbPool,
    authorizer: Arc<dyn Authorizer>,
    downstream: &dyn Fn(&'static str, Url) -> Downstream,
) -> anyhow::Result<Router> {
    let router = match role {
        ServiceRole::Transaction => {
            let transfers = TransferService::new(
                Arc::new(HttpAccountClient::new(downstream(
                    "account",
                    config.account_service()?,
                ))),
                Arc::new(HttpNotificationClient::new(downstream(
                    "notification",
                    config.notification_service()?,
                ))),
                Arc::new(PgTransactionStore::new(pool.clone())),
                config.compensate_failed_credit,
            );
            routes::transaction_routes(Arc::new(transfers), authorizer)
        }
        ServiceRole::Account => {
            let accounts = AccountService::new(Arc::new(PgAccountStore::new(pool.clone())));
            routes::account_routes(Arc::new(accounts), authorizer)
        }
        ServiceRole::Notification => {
            let notifications = NotificationService::new(
                Arc::new(PgNotificationStore::new(pool.clone())),
                Arc::new(HttpAccountClient::new(downstream(
                    "account",
                    config.account_service()?,
                ))),
                Arc::new(HttpCustomerClient::new(downstream(
                    "customer",
                    config.customer_service()?,
                ))),
            );
            routes::notification_routes(Arc::new(notifications), authorizer)
        }
        ServiceRole::Balance => {
            let balances = BalanceService::new(
                Arc::new(PgBalanceStore::new(pool.clone())),
                Arc::new(HttpAccountClient::new(downstream(
                    "account",
                    config.account_service()?,
                ))),
            );
            routes::balance_routes(Arc::new(balances), authorizer)
        }
        ServiceRole::Auth => anyhow::bail!("the auth role is not gated"),
    };

    Ok(router)
}
