//! Console event source for development/testing
//!
//! Feeds the tracker from stdin lines so the pipeline can be exercised
//! without a host event bus. Line formats:
//!
//! ```text
//! msg <guild> <channel> <user> [bot] [everyone] [here] [role:<id>]...
//! join <guild> <user>
//! leave <guild> <user>
//! ```

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};

use crate::domain::entities::{ActivityEvent, MemberChange, MemberEvent, MessageEvent};
use crate::domain::traits::EventSource;

pub struct ConsoleEventSource {
    lines: Lines<BufReader<Stdin>>,
}

impl ConsoleEventSource {
    pub fn new() -> Self {
        Self {
            lines: BufReader::new(tokio::io::stdin()).lines(),
        }
    }

    fn parse(line: &str) -> Option<ActivityEvent> {
        let parts: Vec<&str> = line.split_whitespace().collect();
        match parts.as_slice() {
            ["msg", guild, channel, user, flags @ ..] => {
                let mut event = MessageEvent::new(*guild, *channel, *user);
                for flag in flags {
                    match *flag {
                        "bot" => event.from_bot = true,
                        "everyone" => event.mentions_everyone = true,
                        "here" => event.mentions_here = true,
                        other => {
                            if let Some(role) = other.strip_prefix("role:") {
                                event.role_mentions.push(role.to_string());
                            } else {
                                tracing::warn!("Ignoring unknown message flag: {}", other);
                            }
                        }
                    }
                }
                Some(ActivityEvent::Message(event))
            }
            ["join", guild, user] => Some(ActivityEvent::Member(MemberEvent::new(
                *guild,
                *user,
                MemberChange::Join,
            ))),
            ["leave", guild, user] => Some(ActivityEvent::Member(MemberEvent::new(
                *guild,
                *user,
                MemberChange::Leave,
            ))),
            [] => None,
            _ => {
                tracing::warn!("Unrecognized event line: {}", line);
                None
            }
        }
    }
}

impl Default for ConsoleEventSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EventSource for ConsoleEventSource {
    async fn next_event(&mut self) -> Option<ActivityEvent> {
        loop {
            match self.lines.next_line().await {
                Ok(Some(line)) => {
                    if let Some(event) = Self::parse(&line) {
                        return Some(event);
                    }
                    // Blank or malformed line, keep reading
                }
                Ok(None) => return None,
                Err(e) => {
                    tracing::error!("Failed to read event line: {}", e);
                    return None;
                }
            }
        }
    }
}
