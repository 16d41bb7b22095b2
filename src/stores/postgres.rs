//! PostgreSQL implementations of the store traits.

use async_trait::async_trait;

use super::{AccountStore, BalanceStore, CredentialStore, NotificationStore, TransactionStore};
use crate::{
    db::DbPool,
    error::AppError,
    models::{
        account::Account, balance::BalanceSnapshot, credential::CredentialRecord,
        notification::Notification, transaction::Transaction,
    },
};

#[derive(Clone)]
pub struct PgAccountStore {
    pool: DbPool,
}

impl PgAccountStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn create(&self, customer_id: i64) -> Result<Account, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            INSERT INTO accounts (customer_id, balance)
            VALUES ($1, 0)
            RETURNING account_id, customer_id, balance, created_at, updated_at
            "#,
        )
        .bind(customer_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    async fn delete(&self, account_id: i64) -> Result<bool, AppError> {
        let result = sqlx::query("DELETE FROM accounts WHERE account_id = $1")
            .bind(account_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_by_customer(&self, customer_id: i64) -> Result<Vec<i64>, AppError> {
        let ids: Vec<i64> = sqlx::query_scalar(
            "DELETE FROM accounts WHERE customer_id = $1 RETURNING account_id",
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    async fn find(&self, account_id: i64) -> Result<Option<Account>, AppError> {
        let account = sqlx::query_as::<_, Account>(
            r#"
            SELECT account_id, customer_id, balance, created_at, updated_at
            FROM accounts
            WHERE account_id = $1
            "#,
        )
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    async fn list_by_customer(&self, customer_id: i64) -> Result<Vec<Account>, AppError> {
        let accounts = sqlx::query_as::<_, Account>(
            r#"
            SELECT account_id, customer_id, balance, created_at, updated_at
            FROM accounts
            WHERE customer_id = $1
            ORDER BY account_id
            "#,
        )
        .bind(customer_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    async fn adjust_balance(
        &self,
        account_id: i64,
        delta: i64,
    ) -> Result<Option<Account>, AppError> {
        // Single statement, so concurrent adjustments to one row serialize
        // on the row lock and never lose an update.
        let account = sqlx::query_as::<_, Account>(
            r#"
            UPDATE accounts
            SET balance = balance + $1,
                updated_at = NOW()
            WHERE account_id = $2
            RETURNING account_id, customer_id, balance, created_at, updated_at
            "#,
        )
        .bind(delta)
        .bind(account_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }
}

#[derive(Clone)]
pub struct PgTransactionStore {
    pool: DbPool,
}

impl PgTransactionStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TransactionStore for PgTransactionStore {
    async fn create(
        &self,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> Result<Transaction, AppError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            INSERT INTO transactions (sender_id, receiver_id, amount)
            VALUES ($1, $2, $3)
            RETURNING transaction_id, sender_id, receiver_id, amount, created_at
            "#,
        )
        .bind(sender_id)
        .bind(receiver_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(transaction)
    }

    async fn find(&self, transaction_id: i64) -> Result<Option<Transaction>, AppError> {
        let transaction = sqlx::query_as::<_, Transaction>(
            r#"
            SELECT transaction_id, sender_id, receiver_id, amount, created_at
            FROM transactions
            WHERE transaction_id = $1
            "#,
        )
        .bind(transaction_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(transaction)
    }
}

#[derive(Clone)]
pub struct PgNotificationStore {
    pool: DbPool,
}

impl PgNotificationStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl NotificationStore for PgNotificationStore {
    async fn create(
        &self,
        transaction_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> Result<Notification, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            INSERT INTO notifications (transaction_id, receiver_id, amount)
            VALUES ($1, $2, $3)
            RETURNING notification_id, transaction_id, receiver_id, amount, created_at
            "#,
        )
        .bind(transaction_id)
        .bind(receiver_id)
        .bind(amount)
        .fetch_one(&self.pool)
        .await?;

        Ok(notification)
    }

    async fn find(&self, notification_id: i64) -> Result<Option<Notification>, AppError> {
        let notification = sqlx::query_as::<_, Notification>(
            r#"
            SELECT notification_id, transaction_id, receiver_id, amount, created_at
            FROM notifications
            WHERE notification_id = $1
            "#,
        )
        .bind(notification_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(notification)
    }
}

#[derive(Clone)]
pub struct PgBalanceStore {
    pool: DbPool,
}

impl PgBalanceStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BalanceStore for PgBalanceStore {
    async fn record(
        &self,
        customer_id: i64,
        total_balance: i64,
    ) -> Result<BalanceSnapshot, AppError> {
        let snapshot = sqlx::query_as::<_, BalanceSnapshot>(
            r#"
            INSERT INTO balances (customer_id, total_balance)
            VALUES ($1, $2)
            RETURNING balance_id, customer_id, total_balance, registered_at
            "#,
        )
        .bind(customer_id)
        .bind(total_balance)
        .fetch_one(&self.pool)
        .await?;

        Ok(snapshot)
    }

    async fn latest(
        &self,
        customer_id: i64,
        limit: i64,
    ) -> Result<Vec<BalanceSnapshot>, AppError> {
        let snapshots = sqlx::query_as::<_, BalanceSnapshot>(
            r#"
            SELECT balance_id, customer_id, total_balance, registered_at
            FROM balances
            WHERE customer_id = $1
            ORDER BY registered_at DESC, balance_id DESC
            LIMIT $2
            "#,
        )
        .bind(customer_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(snapshots)
    }
}

#[derive(Clone)]
pub struct PgCredentialStore {
    pool: DbPool,
}

impl PgCredentialStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CredentialStore for PgCredentialStore {
    async fn find(
        &self,
        user_id: &str,
        secret_hash: &str,
    ) -> Result<Option<CredentialRecord>, AppError> {
        let record = sqlx::query_as::<_, CredentialRecord>(
            r#"
            SELECT user_id, secret_hash, can_read, can_write, can_delete
            FROM users
            WHERE user_id = $1 AND secret_hash = $2
            "#,
        )
        .bind(user_id)
        .bind(secret_hash)
        .fetch_optional(&self.pool)
        .await?;

        Ok(record)
    }
}
