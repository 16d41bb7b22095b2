//! Notification Service HTTP handlers.
//!
//! - POST /notify - Queue a notification for a transfer's receiver
//! - POST /getNotification - Fetch a queued notification

use std::sync::Arc;

use axum::{Extension, Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::notification::{
        GetNotificationRequest, NotificationResponse, NotifyRequest, NotifyResponse,
    },
    services::notification_service::NotificationService,
};

/// Queue a notification.
///
/// # Request Body
///
/// ```json
/// { "transactionID": 5, "receiverID": 2, "amount": 30 }
/// ```
///
/// # Response (200)
///
/// ```json
/// { "message": "success", "notificationID": 1, "recipientEmail": "b@example.com" }
/// ```
pub async fn notify(
    State(notifications): State<Arc<NotificationService>>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<NotifyRequest>, JsonRejection>,
) -> Result<Json<NotifyResponse>, AppError> {
    let Json(request) = payload?;
    let queued = notifications.notify(&request, &auth.credentials).await?;

    Ok(Json(NotifyResponse {
        message: "success".to_string(),
        notification_id: queued.notification.notification_id,
        recipient_email: queued.recipient_email,
    }))
}

pub async fn get_notification(
    State(notifications): State<Arc<NotificationService>>,
    payload: Result<Json<GetNotificationRequest>, JsonRejection>,
) -> Result<Json<NotificationResponse>, AppError> {
    let Json(request) = payload?;
    let notification = notifications
        .get_notification(request.notification_id)
        .await?;
    Ok(Json(notification.into()))
}
