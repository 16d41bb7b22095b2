//! Customer Service wire types.
//!
//! Only the lookup the Notification Service needs is modelled here.

use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize)]
pub struct GetCustomerRequest {
    #[serde(rename = "customerID")]
    pub customer_id: i64,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CustomerResponse {
    pub message: String,

    #[serde(rename = "customerID")]
    pub customer_id: i64,

    #[serde(rename = "customerName")]
    pub customer_name: String,

    #[serde(rename = "customerEmail")]
    pub customer_email: String,
}
