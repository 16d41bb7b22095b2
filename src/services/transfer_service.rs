//! Transfer orchestration - moves money between accounts held by the
//! Account Service and records the result.
//!
//! This service handles:
//! - The debit → credit → record (→ notify) sequence
//! - Tracking how far each attempt got
//! - Optional compensation when the credit step fails
//!
//! # Consistency
//!
//! Debit and credit are two independent calls to another service. There is
//! no shared transaction: if the credit fails after the debit succeeded, the
//! sender stays debited unless compensation is enabled. Failures report the
//! last state reached so callers can tell what happened.
//!
//! A call that timed out may still have been applied by the ledger. Such a
//! failure is `indeterminate`: it is never compensated, and the report says
//! the outcome is unknown instead of guessing.
//!
//! Steps run strictly one after another. Nothing is deduplicated: submitting
//! the same request twice moves the money twice.

use std::{fmt, sync::Arc};

use serde::Serialize;
use serde_json::{Value, json};
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    clients::{account::AccountClient, notification::NotificationClient},
    error::{AppError, Outcome},
    models::{
        credential::Credentials,
        notification::NotifyRequest,
        transaction::{Transaction, TransferAndNotifyResponse, TransferRequest, TransferResponse},
    },
    stores::TransactionStore,
};

/// Progress of one transfer attempt.
///
/// `Started → SenderDebited → ReceiverCredited → Recorded → (Notified) → Done`.
/// A failure freezes the attempt at the last state reached; nothing rolls
/// back except the optional compensating credit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum TransferState {
    Started,
    SenderDebited,
    ReceiverCredited,
    Recorded,
    Notified,
    Done,
}

impl TransferState {
    pub fn as_str(self) -> &'static str {
        match self {
            TransferState::Started => "started",
            TransferState::SenderDebited => "senderDebited",
            TransferState::ReceiverCredited => "receiverCredited",
            TransferState::Recorded => "recorded",
            TransferState::Notified => "notified",
            TransferState::Done => "done",
        }
    }
}

impl fmt::Display for TransferState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A transfer attempt that stopped before `Done`.
#[derive(Debug, thiserror::Error)]
#[error("transfer failed after reaching {reached}: {cause}")]
pub struct TransferFailure {
    /// Last state the attempt reached
    pub reached: TransferState,

    /// Whether a compensating credit gave the sender their money back.
    /// `None` when the refund was sent but its outcome is unknown.
    pub compensated: Option<bool>,

    /// Set once the transaction record exists
    pub transaction_id: Option<i64>,

    /// The error that stopped the attempt, reported unchanged
    pub cause: AppError,
}

impl TransferFailure {
    /// Whether money has left the sender and was not given back.
    ///
    /// `None` when that cannot be known: the debit or the refund went out
    /// and no answer came back.
    pub fn funds_moved(&self) -> Option<bool> {
        if self.reached == TransferState::Started {
            return match self.cause.outcome() {
                Outcome::Rejected => Some(false),
                Outcome::Indeterminate => None,
            };
        }
        self.compensated.map(|refunded| !refunded)
    }

    /// JSON summary attached to the error response. Unknown values are `null`.
    pub fn summary(&self) -> Value {
        json!({
            "reached": self.reached,
            "fundsMoved": self.funds_moved(),
            "compensated": self.compensated,
            "outcome": self.cause.outcome(),
            "transactionID": self.transaction_id,
        })
    }
}

/// Debit, credit and record all succeeded.
struct Moved {
    transaction: Transaction,
    echoed_sender_id: i64,
    echoed_receiver_id: i64,
}

/// Tracks one attempt and logs each transition.
struct Attempt {
    state: TransferState,
}

impl Attempt {
    fn new() -> Self {
        tracing::info!(state = %TransferState::Started, "transfer started");
        Self {
            state: TransferState::Started,
        }
    }

    fn advance(&mut self, next: TransferState) {
        self.state = next;
        tracing::info!(state = %next, "transfer advanced");
    }

    fn fail(&self, cause: AppError) -> TransferFailure {
        tracing::warn!(reached = %self.state, error = %cause, "transfer failed");
        TransferFailure {
            reached: self.state,
            compensated: Some(false),
            transaction_id: None,
            cause,
        }
    }
}

pub struct TransferService {
    accounts: Arc<dyn AccountClient>,
    notifications: Arc<dyn NotificationClient>,
    transactions: Arc<dyn TransactionStore>,
    compensate_failed_credit: bool,
}

impl TransferService {
    pub fn new(
        accounts: Arc<dyn AccountClient>,
        notifications: Arc<dyn NotificationClient>,
        transactions: Arc<dyn TransactionStore>,
        compensate_failed_credit: bool,
    ) -> Self {
        Self {
            accounts,
            notifications,
            transactions,
            compensate_failed_credit,
        }
    }

    /// Move `amount` from sender to receiver and record it.
    ///
    /// # Process
    ///
    /// 1. Subtract from the sender via the Account Service
    /// 2. Add to the receiver via the Account Service
    /// 3. Record the transaction with the requested ids and amount
    /// 4. Return the transaction id with the ids echoed by steps 1 and 2
    ///
    /// # Errors
    ///
    /// - `Validation`: amount is zero or negative (nothing is called)
    /// - `Transfer`: a step failed; carries the state reached and the cause
    pub async fn transfer_amount(
        &self,
        request: &TransferRequest,
        credentials: &Credentials,
    ) -> Result<TransferResponse, AppError> {
        validate(request)?;

        let span = transfer_span(request);
        async {
            let mut attempt = Attempt::new();
            let moved = self.move_funds(request, credentials, &mut attempt).await?;
            attempt.advance(TransferState::Done);

            Ok::<_, AppError>(TransferResponse {
                message: "success".to_string(),
                transaction_id: moved.transaction.transaction_id,
                sender_id: moved.echoed_sender_id,
                receiver_id: moved.echoed_receiver_id,
            })
        }
        .instrument(span)
        .await
    }

    /// Same as [`transfer_amount`](Self::transfer_amount), then queue a
    /// notification for the receiver.
    ///
    /// A notification failure is still an overall failure, but the error
    /// reports `reached = recorded` and the transaction id, so the caller
    /// knows the money did move.
    pub async fn transfer_amount_and_notify(
        &self,
        request: &TransferRequest,
        credentials: &Credentials,
    ) -> Result<TransferAndNotifyResponse, AppError> {
        validate(request)?;

        let span = transfer_span(request);
        async {
            let mut attempt = Attempt::new();
            let moved = self.move_funds(request, credentials, &mut attempt).await?;
            let transaction_id = moved.transaction.transaction_id;

            let notify = NotifyRequest {
                transaction_id,
                receiver_id: request.receiver_id,
                amount: request.amount,
            };
            let notified = match self.notifications.notify(&notify, credentials).await {
                Ok(response) => response,
                Err(cause) => {
                    let mut failure = attempt.fail(cause);
                    failure.transaction_id = Some(transaction_id);
                    return Err(failure.into());
                }
            };
            attempt.advance(TransferState::Notified);
            attempt.advance(TransferState::Done);

            Ok::<_, AppError>(TransferAndNotifyResponse {
                message: "success".to_string(),
                transaction_id,
                sender_id: moved.echoed_sender_id,
                receiver_id: moved.echoed_receiver_id,
                notification_id: notified.notification_id,
            })
        }
        .instrument(span)
        .await
    }

    /// Fetch a recorded transaction.
    pub async fn get_transaction(&self, transaction_id: i64) -> Result<Transaction, AppError> {
        self.transactions
            .find(transaction_id)
            .await?
            .ok_or(AppError::NotFound("transaction"))
    }

    /// Steps 1-3, shared by both transfer operations.
    async fn move_funds(
        &self,
        request: &TransferRequest,
        credentials: &Credentials,
        attempt: &mut Attempt,
    ) -> Result<Moved, TransferFailure> {
        let debited = self
            .accounts
            .subtract_from_balance(request.sender_id, request.amount, credentials)
            .await
            .map_err(|cause| attempt.fail(cause))?;
        attempt.advance(TransferState::SenderDebited);

        let credited = match self
            .accounts
            .add_to_balance(request.receiver_id, request.amount, credentials)
            .await
        {
            Ok(response) => response,
            Err(cause) => {
                let compensated = self.compensate(request, credentials, &cause).await;
                let mut failure = attempt.fail(cause);
                failure.compensated = compensated;
                return Err(failure);
            }
        };
        attempt.advance(TransferState::ReceiverCredited);

        // Record what the client asked for, not what the leaf calls echoed.
        let transaction = self
            .transactions
            .create(request.sender_id, request.receiver_id, request.amount)
            .await
            .map_err(|cause| attempt.fail(cause))?;
        attempt.advance(TransferState::Recorded);

        Ok(Moved {
            transaction,
            echoed_sender_id: debited.account_id,
            echoed_receiver_id: credited.account_id,
        })
    }

    /// Give the sender their money back after a failed credit.
    ///
    /// Only a credit the ledger definitely refused is refunded: if the credit
    /// may have landed, a refund would create money. One attempt only.
    /// Returns whether the refund landed, `None` if that is unknown.
    async fn compensate(
        &self,
        request: &TransferRequest,
        credentials: &Credentials,
        credit_error: &AppError,
    ) -> Option<bool> {
        if !self.compensate_failed_credit {
            tracing::warn!(
                sender_id = request.sender_id,
                amount = request.amount,
                "credit failed after debit; sender left debited"
            );
            return Some(false);
        }
        if credit_error.outcome() == Outcome::Indeterminate {
            tracing::warn!(
                sender_id = request.sender_id,
                receiver_id = request.receiver_id,
                amount = request.amount,
                "credit outcome unknown; not compensating"
            );
            return Some(false);
        }

        match self
            .accounts
            .add_to_balance(request.sender_id, request.amount, credentials)
            .await
        {
            Ok(_) => {
                tracing::info!(sender_id = request.sender_id, "compensating credit applied");
                Some(true)
            }
            Err(e) => {
                tracing::error!(
                    sender_id = request.sender_id,
                    amount = request.amount,
                    error = %e,
                    "compensating credit failed; sender may be left debited"
                );
                match e.outcome() {
                    Outcome::Rejected => Some(false),
                    Outcome::Indeterminate => None,
                }
            }
        }
    }
}

fn validate(request: &TransferRequest) -> Result<(), AppError> {
    if request.amount <= 0 {
        return Err(AppError::Validation("amount must be positive".to_string()));
    }
    Ok(())
}

fn transfer_span(request: &TransferRequest) -> tracing::Span {
    tracing::info_span!(
        "transfer",
        attempt = %Uuid::new_v4(),
        sender_id = request.sender_id,
        receiver_id = request.receiver_id,
        amount = request.amount,
    )
}
