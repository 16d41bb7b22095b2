//! Notification Service client.

use async_trait::async_trait;

use super::Downstream;
use crate::{
    error::AppError,
    models::{
        credential::Credentials,
        notification::{NotifyRequest, NotifyResponse},
    },
};

#[async_trait]
pub trait NotificationClient: Send + Sync {
    /// Queue a notification. Not retried: a repeat would queue a second one.
    async fn notify(
        &self,
        request: &NotifyRequest,
        credentials: &Credentials,
    ) -> Result<NotifyResponse, AppError>;
}

pub struct HttpNotificationClient {
    downstream: Downstream,
}

impl HttpNotificationClient {
    pub fn new(downstream: Downstream) -> Self {
        Self { downstream }
    }
}

#[async_trait]
impl NotificationClient for HttpNotificationClient {
    async fn notify(
        &self,
        request: &NotifyRequest,
        credentials: &Credentials,
    ) -> Result<NotifyResponse, AppError> {
        self.downstream.mutate("notify", request, credentials).await
    }
}
