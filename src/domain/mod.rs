//! Domain layer - Core business logic with no external dependencies
//!
//! This layer contains:
//! - Entities: Core business objects (events, guild logs, templates, bookmarks)
//! - Traits: Abstractions for infrastructure (EventSource, KeyValueStore)

pub mod entities;
pub mod traits;
