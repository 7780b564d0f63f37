//! guildpulse - guild activity tracking and analytics
//!
//! Ingests message and membership events per guild, keeps bounded logs
//! with incremental counters, answers windowed analytical queries, and
//! persists state through a pluggable key-value store.

pub mod application;
pub mod domain;
pub mod infrastructure;
