//! Account service - the ledger of record.
//!
//! This service handles:
//! - Account creation and deletion
//! - Balance reads
//! - Atomic balance adjustments
//!
//! # Atomicity Guarantees
//!
//! Each adjustment is a single `balance = balance ± amount` statement, so
//! concurrent adjustments to the same account never lose an update.
//! Balances have no floor: a subtraction may take an account negative.

use std::sync::Arc;

use crate::{error::AppError, models::account::Account, stores::AccountStore};

pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    /// Open a zero-balance account. Customers are not checked for existence.
    pub async fn create_account(&self, customer_id: i64) -> Result<Account, AppError> {
        let account = self.store.create(customer_id).await?;
        tracing::info!(
            account_id = account.account_id,
            customer_id,
            "account created"
        );
        Ok(account)
    }

    pub async fn delete_account(&self, account_id: i64) -> Result<(), AppError> {
        if !self.store.delete(account_id).await? {
            return Err(AppError::NotFound("account"));
        }
        tracing::info!(account_id, "account deleted");
        Ok(())
    }

    /// Delete every account of a customer. Zero accounts is not an error.
    pub async fn delete_accounts_by_customer(&self, customer_id: i64) -> Result<Vec<i64>, AppError> {
        let deleted = self.store.delete_by_customer(customer_id).await?;
        tracing::info!(customer_id, count = deleted.len(), "customer accounts deleted");
        Ok(deleted)
    }

    pub async fn get_account(&self, account_id: i64) -> Result<Account, AppError> {
        self.store
            .find(account_id)
            .await?
            .ok_or(AppError::NotFound("account"))
    }

    pub async fn get_accounts_by_customer(&self, customer_id: i64) -> Result<Vec<Account>, AppError> {
        self.store.list_by_customer(customer_id).await
    }

    /// Credit an account.
    ///
    /// # Errors
    ///
    /// - `Validation`: amount is zero or negative
    /// - `NotFound`: account doesn't exist
    pub async fn add_to_balance(&self, account_id: i64, amount: i64) -> Result<Account, AppError> {
        validate_amount(amount)?;
        self.adjust(account_id, amount).await
    }

    /// Debit an account. Same errors as [`add_to_balance`](Self::add_to_balance).
    pub async fn subtract_from_balance(
        &self,
        account_id: i64,
        amount: i64,
    ) -> Result<Account, AppError> {
        validate_amount(amount)?;
        self.adjust(account_id, -amount).await
    }

    async fn adjust(&self, account_id: i64, delta: i64) -> Result<Account, AppError> {
        let account = self
            .store
            .adjust_balance(account_id, delta)
            .await?
            .ok_or(AppError::NotFound("account"))?;

        tracing::info!(account_id, delta, balance = account.balance, "balance adjusted");
        Ok(account)
    }
}

fn validate_amount(amount: i64) -> Result<(), AppError> {
    if amount <= 0 {
        return Err(AppError::Validation("amount must be positive".to_string()));
    }
    Ok(())
}
