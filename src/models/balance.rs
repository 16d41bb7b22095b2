//! Balance Service models.
//!
//! A snapshot is a customer's total across all accounts at one moment.
//! Snapshots are append-only: every `getBalanceByCustomer` call adds one.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A row of the `balances` table.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct BalanceSnapshot {
    pub balance_id: i64,
    pub customer_id: i64,
    pub total_balance: i64,
    pub registered_at: DateTime<Utc>,
}

/// `getBalanceByCustomer` request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetBalanceRequest {
    #[serde(rename = "customerID")]
    pub customer_id: i64,
}

/// Response body for `getBalanceByCustomer`.
///
/// # JSON Example
///
/// ```json
/// {
///   "message": "success",
///   "customerID": 3,
///   "accountIDs": [7, 9],
///   "balances": [100, 25],
///   "totalBalance": 125
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceByCustomerResponse {
    pub message: String,
    #[serde(rename = "customerID")]
    pub customer_id: i64,
    #[serde(rename = "accountIDs")]
    pub account_ids: Vec<i64>,
    pub balances: Vec<i64>,
    #[serde(rename = "totalBalance")]
    pub total_balance: i64,
}

/// `getBalanceHistory` request body.
///
/// # Validation
///
/// - `numberOfRecords` must be positive
#[derive(Debug, Serialize, Deserialize)]
pub struct GetBalanceHistoryRequest {
    #[serde(rename = "customerID")]
    pub customer_id: i64,
    #[serde(rename = "numberOfRecords")]
    pub number_of_records: i64,
}

/// Response body for `getBalanceHistory`, newest snapshot first.
///
/// Totals and timestamps are parallel arrays.
#[derive(Debug, Serialize, Deserialize)]
pub struct BalanceHistoryResponse {
    pub message: String,
    #[serde(rename = "customerID")]
    pub customer_id: i64,
    #[serde(rename = "totalBalances")]
    pub total_balances: Vec<i64>,
    #[serde(rename = "recordTimestamps")]
    pub record_timestamps: Vec<DateTime<Utc>>,
}

impl BalanceHistoryResponse {
    pub fn new(customer_id: i64, snapshots: &[BalanceSnapshot]) -> Self {
        Self {
            message: "success".to_string(),
            customer_id,
            total_balances: snapshots.iter().map(|s| s.total_balance).collect(),
            record_timestamps: snapshots.iter().map(|s| s.registered_at).collect(),
        }
    }
}
