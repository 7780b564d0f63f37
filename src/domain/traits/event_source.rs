use async_trait::async_trait;
use crate::domain::entities::ActivityEvent;

/// EventSource trait - abstraction for whatever delivers activity events
///
/// In production this is an adapter over the host's event bus; in dev mode
/// it is the console adapter, and tests substitute a scripted fake.
#[async_trait]
pub trait EventSource: Send {
    /// Yield the next event, or `None` when the source is exhausted.
    async fn next_event(&mut self) -> Option<ActivityEvent>;
}
