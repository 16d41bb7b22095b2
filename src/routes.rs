//! Per-role routers.
//!
//! Every endpoint is `POST` with a JSON body. Endpoints are grouped by the
//! operation kind they perform and each group sits behind its own gate
//! layer, so the kind an endpoint checks is fixed by where it is mounted.

use std::sync::Arc;

use axum::{
    Router,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use crate::{
    auth::{Authorizer, Operation},
    handlers::{
        accounts,
        auth::{self, AuthState},
        balances,
        health::{self, HealthState},
        notifications, transactions,
    },
    middleware::auth::{Gate, require_access},
    services::{
        account_service::AccountService, balance_service::BalanceService,
        notification_service::NotificationService, transfer_service::TransferService,
    },
};

/// Put every route of `router` behind the gate for `operation`.
fn guarded<S>(router: Router<S>, authorizer: &Arc<dyn Authorizer>, operation: Operation) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
{
    router.route_layer(from_fn_with_state(
        Gate {
            authorizer: authorizer.clone(),
            operation,
        },
        require_access,
    ))
}

/// Transaction Service: the transfer orchestrator.
pub fn transaction_routes(transfers: Arc<TransferService>, authorizer: Arc<dyn Authorizer>) -> Router {
    let writes = Router::new()
        .route("/transferAmount", post(transactions::transfer_amount))
        .route(
            "/transferAmountAndNotify",
            post(transactions::transfer_amount_and_notify),
        );
    let reads = Router::new().route("/getTransaction", post(transactions::get_transaction));

    guarded(writes, &authorizer, Operation::Write)
        .merge(guarded(reads, &authorizer, Operation::Read))
        .with_state(transfers)
}

/// Account Service: the ledger.
pub fn account_routes(accounts: Arc<AccountService>, authorizer: Arc<dyn Authorizer>) -> Router {
    let writes = Router::new()
        .route("/createAccount", post(accounts::create_account))
        .route("/addToBalance", post(accounts::add_to_balance))
        .route("/subtractFromBalance", post(accounts::subtract_from_balance));
    let reads = Router::new()
        .route("/getAccount", post(accounts::get_account))
        .route(
            "/getAccountsByCustomer",
            post(accounts::get_accounts_by_customer),
        );
    let deletes = Router::new()
        .route("/deleteAccount", post(accounts::delete_account))
        .route(
            "/deleteAccountsByCustomer",
            post(accounts::delete_accounts_by_customer),
        );

    guarded(writes, &authorizer, Operation::Write)
        .merge(guarded(reads, &authorizer, Operation::Read))
        .merge(guarded(deletes, &authorizer, Operation::Delete))
        .with_state(accounts)
}

/// Notification Service.
pub fn notification_routes(
    notifications: Arc<NotificationService>,
    authorizer: Arc<dyn Authorizer>,
) -> Router {
    let writes = Router::new().route("/notify", post(notifications::notify));
    let reads = Router::new().route("/getNotification", post(notifications::get_notification));

    guarded(writes, &authorizer, Operation::Write)
        .merge(guarded(reads, &authorizer, Operation::Read))
        .with_state(notifications)
}

/// Balance Service. Both endpoints are reads of the ledger, so both are
/// gated as reads even though a lookup appends a snapshot.
pub fn balance_routes(balances: Arc<BalanceService>, authorizer: Arc<dyn Authorizer>) -> Router {
    let reads = Router::new()
        .route(
            "/getBalanceByCustomer",
            post(balances::get_balance_by_customer),
        )
        .route("/getBalanceHistory", post(balances::get_balance_history));

    guarded(reads, &authorizer, Operation::Read).with_state(balances)
}

/// Auth Service. Not gated: these endpoints are the gate.
pub fn auth_routes(state: AuthState) -> Router {
    Router::new()
        .route(
            "/authenticateAndAuthorize",
            post(auth::authenticate_and_authorize),
        )
        .route("/issueToken", post(auth::issue_token))
        .with_state(state)
}

/// Public health probe, mounted for every role.
pub fn health_routes(state: HealthState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .with_state(state)
}
