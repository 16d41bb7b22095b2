//! HTTP middleware components.
//!
//! Middleware are functions that run before route handlers.
//! They can:
//! - Check the caller's credentials
//! - Short-circuit requests (reject unauthorized)
//! - Attach context for handlers

/// Authorization gate middleware
pub mod auth;
