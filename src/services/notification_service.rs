//! Notification service - records that a receiver should be told about a
//! transfer.
//!
//! No message is delivered from here. Queuing means resolving the
//! receiver's e-mail address, inserting a row and logging it.

use std::sync::Arc;

use crate::{
    clients::{account::AccountClient, customer::CustomerClient},
    error::AppError,
    models::{
        credential::Credentials,
        notification::{Notification, NotifyRequest},
    },
    stores::NotificationStore,
};

pub struct NotificationService {
    store: Arc<dyn NotificationStore>,
    accounts: Arc<dyn AccountClient>,
    customers: Arc<dyn CustomerClient>,
}

/// A queued notification and the address it is meant for.
#[derive(Debug)]
pub struct Queued {
    pub notification: Notification,
    pub recipient_email: String,
}

impl NotificationService {
    pub fn new(
        store: Arc<dyn NotificationStore>,
        accounts: Arc<dyn AccountClient>,
        customers: Arc<dyn CustomerClient>,
    ) -> Self {
        Self {
            store,
            accounts,
            customers,
        }
    }

    /// Queue a notification for the owner of `receiver_id`.
    ///
    /// # Process
    ///
    /// 1. Resolve the receiving account's customer via the Account Service
    /// 2. Resolve the customer's e-mail via the Customer Service
    /// 3. Insert the notification row
    ///
    /// The caller's credentials are forwarded to both lookups.
    pub async fn notify(
        &self,
        request: &NotifyRequest,
        credentials: &Credentials,
    ) -> Result<Queued, AppError> {
        if request.amount <= 0 {
            return Err(AppError::Validation("amount must be positive".to_string()));
        }

        let account = self
            .accounts
            .get_account(request.receiver_id, credentials)
            .await?;
        let customer = self
            .customers
            .get_customer(account.customer_id, credentials)
            .await?;

        let notification = self
            .store
            .create(request.transaction_id, request.receiver_id, request.amount)
            .await?;

        tracing::info!(
            notification_id = notification.notification_id,
            transaction_id = request.transaction_id,
            recipient = %customer.customer_email,
            amount = request.amount,
            "notification queued"
        );

        Ok(Queued {
            notification,
            recipient_email: customer.customer_email,
        })
    }

    pub async fn get_notification(&self, notification_id: i64) -> Result<Notification, AppError> {
        self.store
            .find(notification_id)
            .await?
            .ok_or(AppError::NotFound("notification"))
    }
}
