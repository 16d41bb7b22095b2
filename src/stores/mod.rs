//! Persistence contracts.
//!
//! Each service owns one table and talks to it through one of these traits.
//! Production uses the Postgres implementations in [`postgres`]; tests swap in
//! in-memory stores.

use async_trait::async_trait;

use crate::{
    error::AppError,
    models::{
        account::Account, balance::BalanceSnapshot, credential::CredentialRecord,
        notification::Notification, transaction::Transaction,
    },
};

pub mod postgres;

/// The ledger: account rows and their balances.
#[async_trait]
pub trait AccountStore: Send + Sync {
    /// Insert a zero-balance account for `customer_id`.
    async fn create(&self, customer_id: i64) -> Result<Account, AppError>;

    /// Returns `false` when no such account existed.
    async fn delete(&self, account_id: i64) -> Result<bool, AppError>;

    /// Delete every account of a customer, returning the deleted ids.
    async fn delete_by_customer(&self, customer_id: i64) -> Result<Vec<i64>, AppError>;

    async fn find(&self, account_id: i64) -> Result<Option<Account>, AppError>;

    async fn list_by_customer(&self, customer_id: i64) -> Result<Vec<Account>, AppError>;

    /// Atomically apply `balance = balance + delta`.
    ///
    /// Returns `None` when the account does not exist.
    async fn adjust_balance(&self, account_id: i64, delta: i64)
    -> Result<Option<Account>, AppError>;
}

/// Recorded transfers. Append-only.
#[async_trait]
pub trait TransactionStore: Send + Sync {
    async fn create(
        &self,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> Result<Transaction, AppError>;

    async fn find(&self, transaction_id: i64) -> Result<Option<Transaction>, AppError>;
}

/// Queued notifications.
#[async_trait]
pub trait NotificationStore: Send + Sync {
    async fn create(
        &self,
        transaction_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> Result<Notification, AppError>;

    async fn find(&self, notification_id: i64) -> Result<Option<Notification>, AppError>;
}

/// Customer balance snapshots. Append-only.
#[async_trait]
pub trait BalanceStore: Send + Sync {
    /// Append a snapshot of `customer_id`'s total, stamped now.
    async fn record(&self, customer_id: i64, total_balance: i64)
    -> Result<BalanceSnapshot, AppError>;

    /// Up to `limit` snapshots of a customer, newest first.
    async fn latest(&self, customer_id: i64, limit: i64)
    -> Result<Vec<BalanceSnapshot>, AppError>;
}

/// User credentials and permission flags. Read-only.
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Look up a user by id and hashed secret.
    ///
    /// No match is `Ok(None)`, not an error.
    async fn find(
        &self,
        user_id: &str,
        secret_hash: &str,
    ) -> Result<Option<CredentialRecord>, AppError>;
}
