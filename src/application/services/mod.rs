//! Application services - Business logic orchestration

pub mod analytics;
pub mod autosave;
pub mod bookmarks;
pub mod report;
pub mod tracker;

pub use autosave::AutosaveTask;
pub use bookmarks::BookmarkService;
pub use tracker::{ActivityTracker, TrackerSettings, STORAGE_KEY};
