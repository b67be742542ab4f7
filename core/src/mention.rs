//! `@agent tool` mentions posted in the chat panel.
//!
//! A mention is an assignment request: `@leo Apollo`, `@mike use Gmail`,
//! `@emma: google sheets`. Only agents on the chat roster are recognised;
//! whether the tool is allowed is decided later by the board.

use regex::Regex;
use std::sync::LazyLock;

use crate::roster::{AgentKey, CHAT_ROSTER};

/// A parsed assignment request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mention {
    pub agent: AgentKey,
    /// Tool name as typed; not yet resolved against the registry
    pub tool_name: String,
}

static MENTION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"@([A-Za-z]+)[\s:,]+(?:(?i:use|assign)\s+)?([^@\n]+)")
        .expect("Invalid mention regex")
});

/// Parse every assignment mention in a message body.
///
/// # Examples
///
/// ```rust
/// use workspace_core::mention::parse_mentions;
/// use workspace_core::roster::AgentKey;
///
/// let mentions = parse_mentions("@leo use Apollo @mike Gmail");
/// assert_eq!(mentions.len(), 2);
/// assert_eq!(mentions[0].agent, AgentKey::Leo);
/// assert_eq!(mentions[1].tool_name, "Gmail");
/// ```
pub fn parse_mentions(body: &str) -> Vec<Mention> {
    MENTION_REGEX
        .captures_iter(body)
        .filter_map(|cap| {
            let agent: AgentKey = cap.get(1)?.as_str().parse().ok()?;
            if !CHAT_ROSTER.contains(&agent) {
                return None;
            }
            let tool_name = cap
                .get(2)?
                .as_str()
                .trim()
                .trim_end_matches(['.', '!', ',', ';'])
                .trim();
            if tool_name.is_empty() {
                return None;
            }
            Some(Mention {
                agent,
                tool_name: tool_name.to_string(),
            })
        })
        .collect()
}
