//! API request handlers.
//!
//! This module contains all HTTP request handlers organized by functionality.

/// Cache introspection and invalidation handlers.
pub mod cache;
/// Liveness and service info handlers.
pub mod health;
/// Research query handler.
pub mod research;
