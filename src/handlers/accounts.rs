//! Account Service HTTP handlers.
//!
//! This module implements the ledger endpoints:
//! - POST /createAccount - Open a zero-balance account
//! - POST /deleteAccount - Delete one account
//! - POST /deleteAccountsByCustomer - Delete every account of a customer
//! - POST /getAccount - Read one account
//! - POST /getAccountsByCustomer - List a customer's accounts
//! - POST /addToBalance - Credit an account
//! - POST /subtractFromBalance - Debit an account

use std::sync::Arc;

use axum::{Json, extract::State, extract::rejection::JsonRejection};

use crate::{
    error::AppError,
    models::account::{
        AccountIdRequest, AccountResponse, AccountsByCustomerResponse,
        AddToBalanceResponse, BalanceChangeRequest, CreateAccountRequest, CreateAccountResponse,
        CustomerIdRequest, DeleteAccountResponse, DeleteAccountsByCustomerResponse,
        SubtractFromBalanceResponse,
    },
    services::account_service::AccountService,
};

/// Create a new account.
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
/// { "message": "success", "accountID": 7 }
/// ```
pub async fn create_account(
    State(accounts): State<Arc<AccountService>>,
    payload: Result<Json<CreateAccountRequest>, JsonRejection>,
) -> Result<Json<CreateAccountResponse>, AppError> {
    let Json(request) = payload?;
    let account = accounts.create_account(request.customer_id).await?;

    Ok(Json(CreateAccountResponse {
        message: "success".to_string(),
        account_id: account.account_id,
    }))
}

pub async fn delete_account(
    State(accounts): State<Arc<AccountService>>,
    payload: Result<Json<AccountIdRequest>, JsonRejection>,
) -> Result<Json<DeleteAccountResponse>, AppError> {
    let Json(request) = payload?;
    accounts.delete_account(request.account_id).await?;

    Ok(Json(DeleteAccountResponse {
        message: "success".to_string(),
        account_id: request.account_id,
    }))
}

pub async fn delete_accounts_by_customer(
    State(accounts): State<Arc<AccountService>>,
    payload: Result<Json<CustomerIdRequest>, JsonRejection>,
) -> Result<Json<DeleteAccountsByCustomerResponse>, AppError> {
    let Json(request) = payload?;
    let account_ids = accounts
        .delete_accounts_by_customer(request.customer_id)
        .await?;

    Ok(Json(DeleteAccountsByCustomerResponse {
        message: "success".to_string(),
        customer_id: request.customer_id,
        account_ids,
    }))
}

pub async fn get_account(
    State(accounts): State<Arc<AccountService>>,
    payload: Result<Json<AccountIdRequest>, JsonRejection>,
) -> Result<Json<AccountResponse>, AppError> {
    let Json(request) = payload?;
    let account = accounts.get_account(request.account_id).await?;
    Ok(Json(account.into()))
}

/// List a customer's accounts with balances. No accounts gives empty arrays.
///
/// # Response (200)
///
/// ```json
/// { "message": "success", "customerID": 3, "accountIDs": [7, 9], "balances": [100, 25] }
/// ```
pub async fn get_accounts_by_customer(
    State(accounts): State<Arc<AccountService>>,
    payload: Result<Json<CustomerIdRequest>, JsonRejection>,
) -> Result<Json<AccountsByCustomerResponse>, AppError> {
    let Json(request) = payload?;
    let found = accounts
        .get_accounts_by_customer(request.customer_id)
        .await?;

    Ok(Json(AccountsByCustomerResponse::new(
        request.customer_id,
        &found,
    )))
}

/// Credit an account.
///
/// # Request Body
///
/// ```json
/// { "accountID": 2, "amount": 30 }
/// ```
///
/// # Response (200)
///
/// ```json
/// { "message": "success", "accountID": 2, "amountAdded": 30 }
/// ```
pub async fn add_to_balance(
    State(accounts): State<Arc<AccountService>>,
    payload: Result<Json<BalanceChangeRequest>, JsonRejection>,
) -> Result<Json<AddToBalanceResponse>, AppError> {
    let Json(request) = payload?;
    let account = accounts
        .add_to_balance(request.account_id, request.amount)
        .await?;

    Ok(Json(AddToBalanceResponse {
        message: "success".to_string(),
        account_id: account.account_id,
        amount_added: request.amount,
    }))
}

/// Debit an account. Balances may go negative.
pub async fn subtract_from_balance(
    State(accounts): State<Arc<AccountService>>,
    payload: Result<Json<BalanceChangeRequest>, JsonRejection>,
) -> Result<Json<SubtractFromBalanceResponse>, AppError> {
    let Json(request) = payload?;
    let account = accounts
        .subtract_from_balance(request.account_id, request.amount)
        .await?;

    Ok(Json(SubtractFromBalanceResponse {
        message: "success".to_string(),
        account_id: account.account_id,
        amount_subtracted: request.amount,
    }))
}
