//! Account data models and Account Service wire types.
//!
//! This module defines:
//! - `Account`: Database entity representing a ledger account
//! - Request/response bodies for every Account Service endpoint
//!
//! The wire types are shared by the Account Service handlers and by the
//! HTTP client other services use to call it, so both sides agree on field
//! names by construction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents an account record from the database.
///
/// # Database Table
///
/// Maps to the `accounts` table. Each account:
/// - Belongs to one customer (many accounts per customer)
/// - Starts with a zero balance
///
/// # Balance Storage
///
/// Balances are signed integers with no floor. They only change through
/// `add_to_balance` / `subtract_from_balance`, each a single atomic
/// `UPDATE ... SET balance = balance ± $1`.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Account {
    /// Server-assigned identifier
    pub account_id: i64,

    /// Owning customer
    pub customer_id: i64,

    /// Current balance
    pub balance: i64,

    /// Timestamp when account was created
    pub created_at: DateTime<Utc>,

    /// Timestamp of last balance update
    pub updated_at: DateTime<Utc>,
}

/// `createAccount` request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountRequest {
    #[serde(rename = "customerID")]
    pub customer_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreateAccountResponse {
    pub message: String,
    #[serde(rename = "accountID")]
    pub account_id: i64,
}

/// `deleteAccount` and `getAccount` request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountIdRequest {
    #[serde(rename = "accountID")]
    pub account_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAccountResponse {
    pub message: String,
    #[serde(rename = "accountID")]
    pub account_id: i64,
}

/// `deleteAccountsByCustomer` and `getAccountsByCustomer` request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerIdRequest {
    #[serde(rename = "customerID")]
    pub customer_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteAccountsByCustomerResponse {
    pub message: String,
    #[serde(rename = "customerID")]
    pub customer_id: i64,
    #[serde(rename = "accountIDs")]
    pub account_ids: Vec<i64>,
}

/// Response body for `getAccount`.
///
/// # JSON Example
///
/// ```json
/// {
///   "message": "success",
///   "accountID": 7,
///   "customerID": 3,
///   "balance": 100
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountResponse {
    pub message: String,
    #[serde(rename = "accountID")]
    pub account_id: i64,
    #[serde(rename = "customerID")]
    pub customer_id: i64,
    pub balance: i64,
}

impl From<Account> for AccountResponse {
    fn from(account: Account) -> Self {
        Self {
            message: "success".to_string(),
            account_id: account.account_id,
            customer_id: account.customer_id,
            balance: account.balance,
        }
    }
}

/// Response body for `getAccountsByCustomer`.
///
/// Ids and balances are parallel arrays in account id order.
///
/// # JSON Example
///
/// ```json
/// {
///   "message": "success",
///   "customerID": 3,
///   "accountIDs": [7, 9],
///   "balances": [100, 25]
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct AccountsByCustomerResponse {
    pub message: String,
    #[serde(rename = "customerID")]
    pub customer_id: i64,
    #[serde(rename = "accountIDs")]
    pub account_ids: Vec<i64>,
    pub balances: Vec<i64>,
}

impl AccountsByCustomerResponse {
    pub fn new(customer_id: i64, accounts: &[Account]) -> Self {
        Self {
            message: "success".to_string(),
            customer_id,
            account_ids: accounts.iter().map(|a| a.account_id).collect(),
            balances: accounts.iter().map(|a| a.balance).collect(),
        }
    }
}

/// `addToBalance` and `subtractFromBalance` request body.
///
/// # Validation
///
/// - `amount` must be positive
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceChangeRequest {
    #[serde(rename = "accountID")]
    pub account_id: i64,
    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct AddToBalanceResponse {
    pub message: String,
    #[serde(rename = "accountID")]
    pub account_id: i64,
    #[serde(rename = "amountAdded")]
    pub amount_added: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct SubtractFromBalanceResponse {
    pub message: String,
    #[serde(rename = "accountID")]
    pub account_id: i64,
    #[serde(rename = "amountSubtracted")]
    pub amount_subtracted: i64,
}
