//! Transaction data models and API request/response types.
//!
//! This module defines:
//! - `Transaction`: Database entity representing a recorded transfer
//! - Request types for transfer and lookup operations
//! - Response bodies returned to clients

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Represents a transaction record from the database.
///
/// # Database Table
///
/// Maps to the `transactions` table. A row is written once per transfer
/// attempt that reaches the persistence step and is never updated or deleted.
///
/// Sender, receiver and amount are the values the client asked for, not the
/// ids echoed back by the Account Service.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Transaction {
    /// Server-assigned identifier
    pub transaction_id: i64,

    /// Debited account
    pub sender_id: i64,

    /// Credited account
    pub receiver_id: i64,

    /// Amount moved (always positive)
    pub amount: i64,

    /// When the record was written
    pub created_at: DateTime<Utc>,
}

/// Request to move money between two accounts.
///
/// Used by both `transferAmount` and `transferAmountAndNotify`.
///
/// # JSON Example
///
/// ```json
/// {
///   "senderID": 1,
///   "receiverID": 2,
///   "amount": 30
/// }
/// ```
///
/// # Validation
///
/// - `amount` must be positive
/// - account ids are not checked locally; the Account Service rejects unknown ones
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    #[serde(rename = "senderID")]
    pub sender_id: i64,

    #[serde(rename = "receiverID")]
    pub receiver_id: i64,

    pub amount: i64,
}

/// Response for a completed `transferAmount`.
///
/// `senderID` and `receiverID` are the ids echoed by the subtract and add
/// calls.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransferResponse {
    pub message: String,

    #[serde(rename = "transactionID")]
    pub transaction_id: i64,

    #[serde(rename = "senderID")]
    pub sender_id: i64,

    #[serde(rename = "receiverID")]
    pub receiver_id: i64,
}

/// Response for a completed `transferAmountAndNotify`.
#[derive(Debug, Serialize, Deserialize)]
pub struct TransferAndNotifyResponse {
    pub message: String,

    #[serde(rename = "transactionID")]
    pub transaction_id: i64,

    #[serde(rename = "senderID")]
    pub sender_id: i64,

    #[serde(rename = "receiverID")]
    pub receiver_id: i64,

    #[serde(rename = "notificationID")]
    pub notification_id: i64,
}

/// `getTransaction` request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetTransactionRequest {
    #[serde(rename = "transactionID")]
    pub transaction_id: i64,
}

/// Response returned for `getTransaction`.
///
/// # JSON Example
///
/// ```json
/// {
///   "message": "success",
///   "transactionID": 42,
///   "senderID": 1,
///   "receiverID": 2,
///   "amount": 30
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct TransactionResponse {
    pub message: String,

    #[serde(rename = "transactionID")]
    pub transaction_id: i64,

    #[serde(rename = "senderID")]
    pub sender_id: i64,

    #[serde(rename = "receiverID")]
    pub receiver_id: i64,

    pub amount: i64,
}

/// Convert database Transaction to API TransactionResponse.
impl From<Transaction> for TransactionResponse {
    fn from(transaction: Transaction) -> Self {
        Self {
            message: "success".to_string(),
            transaction_id: transaction.transaction_id,
            sender_id: transaction.sender_id,
            receiver_id: transaction.receiver_id,
            amount: transaction.amount,
        }
    }
}
