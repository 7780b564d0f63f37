//! Domain entities - Core business objects with no external dependencies

pub mod bookmark;
pub mod event;
pub mod guild_log;
pub mod template;

pub use bookmark::Bookmark;
pub use event::{ActivityEvent, MemberChange, MemberEvent, MessageEvent};
pub use guild_log::{GuildActivityLog, MentionCounters, MEMBER_LOG_CAP, MESSAGE_LOG_CAP};
pub use template::{EmbedField, EmbedTemplate};
