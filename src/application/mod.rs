//! Application layer - Use cases and business logic
//!
//! This layer contains:
//! - Services: tracker, analytics, reporting, bookmarks, auto-save
//! - Errors: domain-specific errors

pub mod errors;
pub mod services;
