//! Domain traits - Abstractions for infrastructure implementations

pub mod event_source;
pub mod store;

pub use event_source::EventSource;
pub use store::KeyValueStore;
