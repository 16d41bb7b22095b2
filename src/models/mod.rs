//! Data models representing database entities and wire formats.
//!
//! This module contains all data structures that map to database tables
//! and the JSON bodies exchanged between services.

/// Ledger account model
pub mod account;
/// Auth Service request/response bodies
pub mod auth;
/// Customer balance snapshots
pub mod balance;
/// Credentials and permission flags
pub mod credential;
/// Customer Service lookup bodies
pub mod customer;
/// Notification model
pub mod notification;
/// Recorded transfer model
pub mod transaction;
