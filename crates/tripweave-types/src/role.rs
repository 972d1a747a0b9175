//! Agent role configuration.
//!
//! A role is a named, preconfigured behavior bound to a completion call,
//! optionally allowed to perform external lookups first.

use serde::{Deserialize, Serialize};

use crate::lookup::LookupKind;

pub const COLLECTOR: &str = "collector";
pub const PLANNER: &str = "planner";
pub const MAPS: &str = "maps";
pub const WEATHER: &str = "weather";
pub const BOOKING: &str = "booking";
pub const ITINERARY_FINAL: &str = "itinerary-final";
pub const FOLLOW_UP_WITH_SEARCH: &str = "follow-up-with-search";
pub const FOLLOW_UP_NO_SEARCH: &str = "follow-up-no-search";

/// Every built-in role name, in registry order.
pub const BUILTIN_ROLES: [&str; 8] = [
    COLLECTOR,
    PLANNER,
    MAPS,
    WEATHER,
    BOOKING,
    ITINERARY_FINAL,
    FOLLOW_UP_WITH_SEARCH,
    FOLLOW_UP_NO_SEARCH,
];

/// What a role is allowed to do besides completing text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", content = "lookups", rename_all = "snake_case")]
pub enum CapabilitySet {
    #[default]
    TextOnly,
    WithLookup(Vec<LookupKind>),
}

impl CapabilitySet {
    pub fn needs_lookup(&self) -> bool {
        matches!(self, CapabilitySet::WithLookup(kinds) if !kinds.is_empty())
    }

    pub fn allows(&self, kind: LookupKind) -> bool {
        match self {
            CapabilitySet::TextOnly => false,
            CapabilitySet::WithLookup(kinds) => kinds.contains(&kind),
        }
    }
}

/// Immutable configuration of one agent role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgentRoleConfig {
    pub name: String,
    /// Section heading used for this role in the merged plan.
    pub title: String,
    pub instructions: String,
    pub goal: String,
    #[serde(default)]
    pub capabilities: CapabilitySet,
}

impl AgentRoleConfig {
    pub fn new(
        name: impl Into<String>,
        title: impl Into<String>,
        instructions: impl Into<String>,
        goal: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            title: title.into(),
            instructions: instructions.into(),
            goal: goal.into(),
            capabilities: CapabilitySet::TextOnly,
        }
    }

    pub fn with_lookups(mut self, kinds: Vec<LookupKind>) -> Self {
        self.capabilities = CapabilitySet::WithLookup(kinds);
        self
    }
}
