//! Transaction Service HTTP handlers.
//!
//! This module implements the orchestrator endpoints:
//! - POST /transferAmount - Move money between two accounts
//! - POST /transferAmountAndNotify - Same, then queue a notification
//! - POST /getTransaction - Fetch a recorded transfer

use std::sync::Arc;

use axum::{Extension, Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::transaction::{
        GetTransactionRequest, TransactionResponse, TransferAndNotifyResponse, TransferRequest,
        TransferResponse,
    },
    services::transfer_service::TransferService,
};

/// Move money from sender to receiver.
///
/// # Request Body
///
/// ```json
/// { "senderID": 1, "receiverID": 2, "amount": 30 }
/// ```
///
/// # Response (200)
///
/// ```json
/// { "message": "success", "transactionID": 5, "senderID": 1, "receiverID": 2 }
/// ```
///
/// A failure after money moved still returns the cause's status, with a
/// `transfer` object saying how far the attempt got.
pub async fn transfer_amount(
    State(transfers): State<Arc<TransferService>>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferResponse>, AppError> {
    let Json(request) = payload?;
    let response = transfers
        .transfer_amount(&request, &auth.credentials)
        .await?;
    Ok(Json(response))
}

/// Move money, then ask the Notification Service to tell the receiver.
pub async fn transfer_amount_and_notify(
    State(transfers): State<Arc<TransferService>>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<TransferRequest>, JsonRejection>,
) -> Result<Json<TransferAndNotifyResponse>, AppError> {
    let Json(request) = payload?;
    let response = transfers
        .transfer_amount_and_notify(&request, &auth.credentials)
        .await?;
    Ok(Json(response))
}

/// Look up a recorded transfer by id.
pub async fn get_transaction(
    State(transfers): State<Arc<TransferService>>,
    payload: Result<Json<GetTransactionRequest>, JsonRejection>,
) -> Result<Json<TransactionResponse>, AppError> {
    let Json(request) = payload?;
    let transaction = transfers.get_transaction(request.transaction_id).await?;
    Ok(Json(transaction.into()))
}
