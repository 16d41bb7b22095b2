//! Notification records and Notification Service wire types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A queued notification about money arriving in an account.
///
/// Existence of a row means "a message was queued"; it says nothing about
/// delivery.
#[derive(Debug, Clone, sqlx::FromRow, Serialize)]
pub struct Notification {
    pub notification_id: i64,
    pub transaction_id: i64,
    pub receiver_id: i64,
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}

/// `notify` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotifyRequest {
    #[serde(rename = "transactionID")]
    pub transaction_id: i64,

    #[serde(rename = "receiverID")]
    pub receiver_id: i64,

    pub amount: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotifyResponse {
    pub message: String,

    #[serde(rename = "notificationID")]
    pub notification_id: i64,

    #[serde(rename = "recipientEmail")]
    pub recipient_email: String,
}

/// `getNotification` request body.
#[derive(Debug, Serialize, Deserialize)]
pub struct GetNotificationRequest {
    #[serde(rename = "notificationID")]
    pub notification_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct NotificationResponse {
    pub message: String,

    #[serde(rename = "notificationID")]
    pub notification_id: i64,

    #[serde(rename = "transactionID")]
    pub transaction_id: i64,

    #[serde(rename = "receiverID")]
    pub receiver_id: i64,

    pub amount: i64,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            message: "success".to_string(),
            notification_id: notification.notification_id,
            transaction_id: notification.transaction_id,
            receiver_id: notification.receiver_id,
            amount: notification.amount,
        }
    }
}
