//! In-memory stores and fake collaborators for unit and router tests.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        Arc, Mutex,
        atomic::{AtomicI64, AtomicUsize, Ordering},
    },
};

use async_trait::async_trait;
use axum::Router;
use chrono::Utc;
use url::Url;

use crate::{
    clients::{account::AccountClient, customer::CustomerClient, notification::NotificationClient},
    error::AppError,
    models::{
        account::{
            Account, AccountResponse, AccountsByCustomerResponse, AddToBalanceResponse,
            SubtractFromBalanceResponse,
        },
        balance::BalanceSnapshot,
        credential::{CredentialRecord, Credentials, Permissions, hash_secret},
        customer::CustomerResponse,
        notification::{Notification, NotifyRequest, NotifyResponse},
        transaction::Transaction,
    },
    services::account_service::AccountService,
    stores::{AccountStore, BalanceStore, CredentialStore, NotificationStore, TransactionStore},
};

/// Serve `router` on an ephemeral loopback port and return its base URL.
pub async fn spawn(router: Router) -> Url {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    Url::parse(&format!("http://{addr}/")).unwrap()
}

#[derive(Default)]
pub struct MemoryCredentialStore {
    users: Vec<CredentialRecord>,
}

impl MemoryCredentialStore {
    pub fn with_user(mut self, user_id: &str, secret: &str, permissions: Permissions) -> Self {
        self.users.push(CredentialRecord {
            user_id: user_id.to_string(),
            secret_hash: hash_secret(secret),
            can_read: permissions.can_read,
            can_write: permissions.can_write,
            can_delete: permissions.can_delete,
        });
        self
    }
}

#[async_trait]
impl CredentialStore for MemoryCredentialStore {
    async fn find(
        &self,
        user_id: &str,
        secret_hash: &str,
    ) -> Result<Option<CredentialRecord>, AppError> {
        Ok(self
            .users
            .iter()
            .find(|u| u.user_id == user_id && u.secret_hash == secret_hash)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryAccountStore {
    accounts: Mutex<HashMap<i64, Account>>,
    next_id: AtomicI64,
}

impl MemoryAccountStore {
    /// Insert an account with a starting balance and return its id.
    pub fn seed(&self, customer_id: i64, balance: i64) -> i64 {
        let account_id = self.next_id.fetch_add(1, Ordering::SeqCst) + 1;
        let now = Utc::now();
        self.accounts.lock().unwrap().insert(
            account_id,
            Account {
                account_id,
                customer_id,
                balance,
                created_at: now,
                updated_at: now,
            },
        );
        account_id
    }

    pub fn balance_of(&self, account_id: i64) -> Option<i64> {
        self.accounts
            .lock()
            .unwrap()
            .get(&account_id)
            .map(|a| a.balance)
    }

    pub fn total(&self) -> i64 {
        self.accounts.lock().unwrap().values().map(|a| a.balance).sum()
    }
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn create(&self, customer_id: i64) -> Result<Account, AppError> {
        let id = self.seed(customer_id, 0);
        Ok(self.accounts.lock().unwrap()[&id].clone())
    }

    async fn delete(&self, account_id: i64) -> Result<bool, AppError> {
        Ok(self.accounts.lock().unwrap().remove(&account_id).is_some())
    }

    async fn delete_by_customer(&self, customer_id: i64) -> Result<Vec<i64>, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        let ids: Vec<i64> = accounts
            .values()
            .filter(|a| a.customer_id == customer_id)
            .map(|a| a.account_id)
            .collect();
        for id in &ids {
            accounts.remove(id);
        }
        Ok(ids)
    }

    async fn find(&self, account_id: i64) -> Result<Option<Account>, AppError> {
        Ok(self.accounts.lock().unwrap().get(&account_id).cloned())
    }

    async fn list_by_customer(&self, customer_id: i64) -> Result<Vec<Account>, AppError> {
        let mut accounts: Vec<Account> = self
            .accounts
            .lock()
            .unwrap()
            .values()
            .filter(|a| a.customer_id == customer_id)
            .cloned()
            .collect();
        accounts.sort_by_key(|a| a.account_id);
        Ok(accounts)
    }

    async fn adjust_balance(
        &self,
        account_id: i64,
        delta: i64,
    ) -> Result<Option<Account>, AppError> {
        let mut accounts = self.accounts.lock().unwrap();
        Ok(accounts.get_mut(&account_id).map(|account| {
            account.balance += delta;
            account.updated_at = Utc::now();
            account.clone()
        }))
    }
}

#[derive(Default)]
pub struct MemoryTransactionStore {
    rows: Mutex<Vec<Transaction>>,
}

impl MemoryTransactionStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl TransactionStore for MemoryTransactionStore {
    async fn create(
        &self,
        sender_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> Result<Transaction, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let transaction = Transaction {
            transaction_id: rows.len() as i64 + 1,
            sender_id,
            receiver_id,
            amount,
            created_at: Utc::now(),
        };
        rows.push(transaction.clone());
        Ok(transaction)
    }

    async fn find(&self, transaction_id: i64) -> Result<Option<Transaction>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.transaction_id == transaction_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryNotificationStore {
    rows: Mutex<Vec<Notification>>,
}

impl MemoryNotificationStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl NotificationStore for MemoryNotificationStore {
    async fn create(
        &self,
        transaction_id: i64,
        receiver_id: i64,
        amount: i64,
    ) -> Result<Notification, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let notification = Notification {
            notification_id: rows.len() as i64 + 1,
            transaction_id,
            receiver_id,
            amount,
            created_at: Utc::now(),
        };
        rows.push(notification.clone());
        Ok(notification)
    }

    async fn find(&self, notification_id: i64) -> Result<Option<Notification>, AppError> {
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .find(|n| n.notification_id == notification_id)
            .cloned())
    }
}

#[derive(Default)]
pub struct MemoryBalanceStore {
    rows: Mutex<Vec<BalanceSnapshot>>,
}

impl MemoryBalanceStore {
    pub fn len(&self) -> usize {
        self.rows.lock().unwrap().len()
    }
}

#[async_trait]
impl BalanceStore for MemoryBalanceStore {
    async fn record(
        &self,
        customer_id: i64,
        total_balance: i64,
    ) -> Result<BalanceSnapshot, AppError> {
        let mut rows = self.rows.lock().unwrap();
        let snapshot = BalanceSnapshot {
            balance_id: rows.len() as i64 + 1,
            customer_id,
            total_balance,
            registered_at: Utc::now(),
        };
        rows.push(snapshot.clone());
        Ok(snapshot)
    }

    async fn latest(
        &self,
        customer_id: i64,
        limit: i64,
    ) -> Result<Vec<BalanceSnapshot>, AppError> {
        // Insertion order is time order, so newest first is reverse order
        Ok(self
            .rows
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|s| s.customer_id == customer_id)
            .take(usize::try_from(limit).unwrap_or(0))
            .cloned()
            .collect())
    }
}

/// Account client that calls an [`AccountService`] directly, skipping HTTP
/// and the gate.
pub struct InProcessAccountClient {
    service: AccountService,
    failing_credits: Mutex<HashSet<i64>>,
    lost_replies: Mutex<HashSet<i64>>,
    calls: AtomicUsize,
    seen: Mutex<Vec<Credentials>>,
}

impl InProcessAccountClient {
    pub fn new(store: Arc<MemoryAccountStore>) -> Self {
        Self {
            service: AccountService::new(store),
            failing_credits: Mutex::new(HashSet::new()),
            lost_replies: Mutex::new(HashSet::new()),
            calls: AtomicUsize::new(0),
            seen: Mutex::new(Vec::new()),
        }
    }

    /// Make every `add_to_balance` for `account_id` fail with a downstream error.
    pub fn fail_credits_to(&self, account_id: i64) {
        self.failing_credits.lock().unwrap().insert(account_id);
    }

    /// Apply balance changes on `account_id` but answer as if the reply was
    /// lost in transit.
    pub fn lose_replies_for(&self, account_id: i64) {
        self.lost_replies.lock().unwrap().insert(account_id);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn seen_credentials(&self) -> Vec<Credentials> {
        self.seen.lock().unwrap().clone()
    }

    fn reply<T>(&self, account_id: i64, response: T) -> Result<T, AppError> {
        if self.lost_replies.lock().unwrap().contains(&account_id) {
            return Err(AppError::indeterminate("account", "operation timed out"));
        }
        Ok(response)
    }

    fn record(&self, credentials: &Credentials) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.seen.lock().unwrap().push(credentials.clone());
    }
}

#[async_trait]
impl AccountClient for InProcessAccountClient {
    async fn subtract_from_balance(
        &self,
        account_id: i64,
        amount: i64,
        credentials: &Credentials,
    ) -> Result<SubtractFromBalanceResponse, AppError> {
        self.record(credentials);
        let account = self.service.subtract_from_balance(account_id, amount).await?;
        self.reply(
            account_id,
            SubtractFromBalanceResponse {
                message: "success".to_string(),
                account_id: account.account_id,
                amount_subtracted: amount,
            },
        )
    }

    async fn add_to_balance(
        &self,
        account_id: i64,
        amount: i64,
        credentials: &Credentials,
    ) -> Result<AddToBalanceResponse, AppError> {
        self.record(credentials);
        if self.failing_credits.lock().unwrap().contains(&account_id) {
            return Err(AppError::downstream("account", "connection reset"));
        }
        let account = self.service.add_to_balance(account_id, amount).await?;
        self.reply(
            account_id,
            AddToBalanceResponse {
                message: "success".to_string(),
                account_id: account.account_id,
                amount_added: amount,
            },
        )
    }

    async fn get_account(
        &self,
        account_id: i64,
        credentials: &Credentials,
    ) -> Result<AccountResponse, AppError> {
        self.record(credentials);
        Ok(self.service.get_account(account_id).await?.into())
    }

    async fn get_accounts_by_customer(
        &self,
        customer_id: i64,
        credentials: &Credentials,
    ) -> Result<AccountsByCustomerResponse, AppError> {
        self.record(credentials);
        let accounts = self.service.get_accounts_by_customer(customer_id).await?;
        Ok(AccountsByCustomerResponse::new(customer_id, &accounts))
    }
}

/// Records every `notify` call; optionally fails them all.
#[derive(Default)]
pub struct StubNotificationClient {
    sent: Mutex<Vec<(NotifyRequest, Credentials)>>,
    failure: Mutex<Option<String>>,
}

impl StubNotificationClient {
    pub fn fail_with(&self, message: &str) {
        *self.failure.lock().unwrap() = Some(message.to_string());
    }

    pub fn sent(&self) -> Vec<(NotifyRequest, Credentials)> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl NotificationClient for StubNotificationClient {
    async fn notify(
        &self,
        request: &NotifyRequest,
        credentials: &Credentials,
    ) -> Result<NotifyResponse, AppError> {
        if let Some(message) = self.failure.lock().unwrap().clone() {
            return Err(AppError::downstream("notification", message));
        }
        let mut sent = self.sent.lock().unwrap();
        sent.push((request.clone(), credentials.clone()));
        Ok(NotifyResponse {
            message: "success".to_string(),
            notification_id: sent.len() as i64,
            recipient_email: "receiver@example.com".to_string(),
        })
    }
}

/// Customer directory keyed by customer id.
#[derive(Default)]
pub struct StubCustomerClient {
    emails: Mutex<HashMap<i64, String>>,
}

impl StubCustomerClient {
    pub fn add(&self, customer_id: i64, email: &str) {
        self.emails
            .lock()
            .unwrap()
            .insert(customer_id, email.to_string());
    }
}

#[async_trait]
impl CustomerClient for StubCustomerClient {
    async fn get_customer(
        &self,
        customer_id: i64,
        _credentials: &Credentials,
    ) -> Result<CustomerResponse, AppError> {
        let email = self
            .emails
            .lock()
            .unwrap()
            .get(&customer_id)
            .cloned()
            .ok_or(AppError::NotFound("customer"))?;
        Ok(CustomerResponse {
            message: "success".to_string(),
            customer_id,
            customer_name: format!("customer {customer_id}"),
            customer_email: email,
        })
    }
}
