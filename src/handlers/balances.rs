//! Balance Service HTTP handlers.
//!
//! - POST /getBalanceByCustomer - Total a customer's accounts and record it
//! - POST /getBalanceHistory - Most recent recorded totals

use std::sync::Arc;

use axum::{Extension, Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    error::AppError,
    middleware::auth::AuthContext,
    models::balance::{
        BalanceByCustomerResponse, BalanceHistoryResponse, GetBalanceHistoryRequest,
        GetBalanceRequest,
    },
    services::balance_service::BalanceService,
};

/// Look up a customer's balances via the Account Service.
///
/// # Request Body
///
/// ```json
/// { "customerID": 3 }
/// ```
///
/// # Response (200)
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
pub async fn get_balance_by_customer(
    State(balances): State<Arc<BalanceService>>,
    Extension(auth): Extension<AuthContext>,
    payload: Result<Json<GetBalanceRequest>, JsonRejection>,
) -> Result<Json<BalanceByCustomerResponse>, AppError> {
    let Json(request) = payload?;
    let response = balances
        .balance_by_customer(request.customer_id, &auth.credentials)
        .await?;
    Ok(Json(response))
}

/// # Request Body
///
/// ```json
/// { "customerID": 3, "numberOfRecords": 2 }
/// ```
///
/// # Response (200)
///
/// ```json
/// {
///   "message": "success",
///   "customerID": 3,
///   "totalBalances": [125, 100],
///   "recordTimestamps": ["2025-01-02T10:00:00Z", "2025-01-01T09:30:00Z"]
/// }
/// ```
pub async fn get_balance_history(
    State(balances): State<Arc<BalanceService>>,
    payload: Result<Json<GetBalanceHistoryRequest>, JsonRejection>,
) -> Result<Json<BalanceHistoryResponse>, AppError> {
    let Json(request) = payload?;
    let history = balances
        .balance_history(request.customer_id, request.number_of_records)
        .await?;
    Ok(Json(history))
}
