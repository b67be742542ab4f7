//! Fixed agent roster and tool registry.
//!
//! Agents are not user-creatable. Each one owns a closed, ordered set of
//! tools it may be assigned; anything else is ignored by the board.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stable lowercase identifier of a virtual agent.
///
/// The derived ordering follows [`BOARD_ROSTER`], which is also the
/// left-to-right placement order on the board.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentKey {
    Leo,
    Mike,
    Sara,
    Nina,
    Alex,
    Emma,
}

/// Agents placed on the assignment board, in placement order.
pub const BOARD_ROSTER: [AgentKey; 6] = [
    AgentKey::Leo,
    AgentKey::Mike,
    AgentKey::Sara,
    AgentKey::Nina,
    AgentKey::Alex,
    AgentKey::Emma,
];

/// Agents reachable from the chat panel.
///
/// Alex (social) has no chat persona. Kept as its own list on purpose; see
/// DESIGN.md before merging it with [`BOARD_ROSTER`].
pub const CHAT_ROSTER: [AgentKey; 5] = [
    AgentKey::Leo,
    AgentKey::Mike,
    AgentKey::Sara,
    AgentKey::Nina,
    AgentKey::Emma,
];

impl AgentKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            AgentKey::Leo => "leo",
            AgentKey::Mike => "mike",
            AgentKey::Sara => "sara",
            AgentKey::Nina => "nina",
            AgentKey::Alex => "alex",
            AgentKey::Emma => "emma",
        }
    }

    /// Human-facing role of the agent
    pub fn role(&self) -> &'static str {
        match self {
            AgentKey::Leo => "Lead research",
            AgentKey::Mike => "Email outreach",
            AgentKey::Sara => "CRM hygiene",
            AgentKey::Nina => "Meeting scheduling",
            AgentKey::Alex => "Social selling",
            AgentKey::Emma => "Reporting",
        }
    }

    /// Ordered set of tools this agent may be assigned
    pub fn allowed_tools(&self) -> &'static [Tool] {
        match self {
            AgentKey::Leo => &[Tool::Apollo, Tool::ZoomInfo, Tool::Clay, Tool::LinkedIn],
            AgentKey::Mike => &[Tool::Gmail, Tool::Outlook, Tool::Instantly, Tool::Lemlist],
            AgentKey::Sara => &[Tool::HubSpot, Tool::Salesforce, Tool::Pipedrive],
            AgentKey::Nina => &[Tool::Calendly, Tool::GoogleCalendar, Tool::Zoom],
            AgentKey::Alex => &[Tool::LinkedIn, Tool::Twitter],
            AgentKey::Emma => &[Tool::GoogleSheets, Tool::Slack, Tool::Notion],
        }
    }

    /// Resolve a user- or store-supplied tool name against this agent's set.
    ///
    /// Matching is case-insensitive; the returned tool carries the canonical
    /// registry casing. `None` means the name is unknown or not allowed.
    pub fn resolve_tool(&self, name: &str) -> Option<Tool> {
        let tool = Tool::from_name(name)?;
        self.allowed_tools().contains(&tool).then_some(tool)
    }

    pub fn is_in_chat_roster(&self) -> bool {
        CHAT_ROSTER.contains(self)
    }
}

impl fmt::Display for AgentKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AgentKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        BOARD_ROSTER
            .iter()
            .copied()
            .find(|agent| agent.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("Unknown agent: {s}"))
    }
}

/// Closed set of automation tools known to the registry.
#[derive(Debug, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Tool {
    Apollo,
    ZoomInfo,
    Clay,
    LinkedIn,
    Gmail,
    Outlook,
    Instantly,
    Lemlist,
    HubSpot,
    Salesforce,
    Pipedrive,
    Calendly,
    GoogleCalendar,
    Zoom,
    Twitter,
    GoogleSheets,
    Slack,
    Notion,
}

impl Tool {
    pub const ALL: [Tool; 18] = [
        Tool::Apollo,
        Tool::ZoomInfo,
        Tool::Clay,
        Tool::LinkedIn,
        Tool::Gmail,
        Tool::Outlook,
        Tool::Instantly,
        Tool::Lemlist,
        Tool::HubSpot,
        Tool::Salesforce,
        Tool::Pipedrive,
        Tool::Calendly,
        Tool::GoogleCalendar,
        Tool::Zoom,
        Tool::Twitter,
        Tool::GoogleSheets,
        Tool::Slack,
        Tool::Notion,
    ];

    /// Canonical registry-cased name, as written to the assignment store
    pub fn name(&self) -> &'static str {
        match self {
            Tool::Apollo => "Apollo",
            Tool::ZoomInfo => "ZoomInfo",
            Tool::Clay => "Clay",
            Tool::LinkedIn => "LinkedIn",
            Tool::Gmail => "Gmail",
            Tool::Outlook => "Outlook",
            Tool::Instantly => "Instantly",
            Tool::Lemlist => "Lemlist",
            Tool::HubSpot => "HubSpot",
            Tool::Salesforce => "Salesforce",
            Tool::Pipedrive => "Pipedrive",
            Tool::Calendly => "Calendly",
            Tool::GoogleCalendar => "Google Calendar",
            Tool::Zoom => "Zoom",
            Tool::Twitter => "Twitter",
            Tool::GoogleSheets => "Google Sheets",
            Tool::Slack => "Slack",
            Tool::Notion => "Notion",
        }
    }

    /// Icon identifier used by the board renderer
    pub fn icon(&self) -> &'static str {
        match self {
            Tool::Apollo => "apollo",
            Tool::ZoomInfo => "zoominfo",
            Tool::Clay => "clay",
            Tool::LinkedIn => "linkedin",
            Tool::Gmail => "gmail",
            Tool::Outlook => "outlook",
            Tool::Instantly => "instantly",
            Tool::Lemlist => "lemlist",
            Tool::HubSpot => "hubspot",
            Tool::Salesforce => "salesforce",
            Tool::Pipedrive => "pipedrive",
            Tool::Calendly => "calendly",
            Tool::GoogleCalendar => "google-calendar",
            Tool::Zoom => "zoom",
            Tool::Twitter => "twitter",
            Tool::GoogleSheets => "google-sheets",
            Tool::Slack => "slack",
            Tool::Notion => "notion",
        }
    }

    /// Case-insensitive lookup; "googlesheets" and "Google Sheets" both match
    pub fn from_name(name: &str) -> Option<Tool> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        Tool::ALL
            .iter()
            .copied()
            .find(|tool| normalize(tool.name()) == wanted)
    }
}

impl fmt::Display for Tool {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

fn normalize(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}
