//! Account Service client.

use async_trait::async_trait;

use super::Downstream;
use crate::{
    error::AppError,
    models::{
        account::{
            AccountIdRequest, AccountResponse, AccountsByCustomerResponse, AddToBalanceResponse,
            BalanceChangeRequest, CustomerIdRequest, SubtractFromBalanceResponse,
        },
        credential::Credentials,
    },
};

/// The Account Service operations other services depend on.
#[async_trait]
pub trait AccountClient: Send + Sync {
    async fn subtract_from_balance(
        &self,
        account_id: i64,
        amount: i64,
        credentials: &Credentials,
    ) -> Result<SubtractFromBalanceResponse, AppError>;

    async fn add_to_balance(
        &self,
        account_id: i64,
        amount: i64,
        credentials: &Credentials,
    ) -> Result<AddToBalanceResponse, AppError>;

    async fn get_account(
        &self,
        account_id: i64,
        credentials: &Credentials,
    ) -> Result<AccountResponse, AppError>;

    async fn get_accounts_by_customer(
        &self,
        customer_id: i64,
        credentials: &Credentials,
    ) -> Result<AccountsByCustomerResponse, AppError>;
}

pub struct HttpAccountClient {
    downstream: Downstream,
}

impl HttpAccountClient {
    pub fn new(downstream: Downstream) -> Self {
        Self { downstream }
    }
}

#[async_trait]
impl AccountClient for HttpAccountClient {
    async fn subtract_from_balance(
        &self,
        account_id: i64,
        amount: i64,
        credentials: &Credentials,
    ) -> Result<SubtractFromBalanceResponse, AppError> {
        self.downstream
            .mutate(
                "subtractFromBalance",
                &BalanceChangeRequest { account_id, amount },
                credentials,
            )
            .await
    }

    async fn add_to_balance(
        &self,
        account_id: i64,
        amount: i64,
        credentials: &Credentials,
    ) -> Result<AddToBalanceResponse, AppError> {
        self.downstream
            .mutate(
                "addToBalance",
                &BalanceChangeRequest { account_id, amount },
                credentials,
            )
            .await
    }

    async fn get_account(
        &self,
        account_id: i64,
        credentials: &Credentials,
    ) -> Result<AccountResponse, AppError> {
        self.downstream
            .read("getAccount", &AccountIdRequest { account_id }, credentials)
            .await
    }

    async fn get_accounts_by_customer(
        &self,
        customer_id: i64,
        credentials: &Credentials,
    ) -> Result<AccountsByCustomerResponse, AppError> {
        self.downstream
            .read(
                "getAccountsByCustomer",
                &CustomerIdRequest { customer_id },
                credentials,
            )
            .await
    }
}
