//! Infrastructure layer - External concerns
//!
//! This layer contains:
//! - Config: Configuration loading
//! - Storage: Data persistence
//! - Api: Remote embed-template store client
//! - Adapters: Event source integrations

pub mod adapters;
pub mod api;
pub mod config;
pub mod storage;
