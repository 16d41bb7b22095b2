//! Customer Service client. Only the lookup used to resolve e-mail addresses.

use async_trait::async_trait;

use super::Downstream;
use crate::{
    error::AppError,
    models::{
        credential::Credentials,
        customer::{CustomerResponse, GetCustomerRequest},
    },
};

#[async_trait]
pub trait CustomerClient: Send + Sync {
    async fn get_customer(
        &self,
        customer_id: i64,
        credentials: &Credentials,
    ) -> Result<CustomerResponse, AppError>;
}

pub struct HttpCustomerClient {
    downstream: Downstream,
}

impl HttpCustomerClient {
    pub fn new(downstream: Downstream) -> Self {
        Self { downstream }
    }
}

#[async_trait]
impl CustomerClient for HttpCustomerClient {
    async fn get_customer(
        &self,
        customer_id: i64,
        credentials: &Credentials,
    ) -> Result<CustomerResponse, AppError> {
        self.downstream
            .read(
                "getCustomer",
                &GetCustomerRequest { customer_id },
                credentials,
            )
            .await
    }
}
