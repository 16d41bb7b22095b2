//! Business logic services.
//!
//! Services contain core business logic separated from HTTP handlers.
//! They handle validation, calls to collaborator services, and persistence.

pub mod account_service;
pub mod balance_service;
pub mod notification_service;
pub mod transfer_service;
