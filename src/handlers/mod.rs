//! HTTP request handlers (route handlers).
//!
//! Each handler is an async function that:
//! 1. Receives the JSON body (malformed bodies become 400s)
//! 2. Calls the service that owns the operation
//! 3. Returns HTTP response (JSON, status code)

/// Account Service endpoints
pub mod accounts;
/// Auth Service endpoints
pub mod auth;
/// Balance Service endpoints
pub mod balances;
/// Health check endpoint
pub mod health;
/// Notification Service endpoints
pub mod notifications;
/// Transaction Service endpoints
pub mod transactions;
