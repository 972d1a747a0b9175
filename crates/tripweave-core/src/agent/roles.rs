//! Process-wide registry of agent role configurations.
//!
//! Built once at startup from the built-in roles plus `[[roles]]` overrides,
//! then shared read-only behind an `Arc`.

use tripweave_types::config::RoleOverride;
use tripweave_types::error::ConfigError;
use tripweave_types::lookup::LookupKind;
use tripweave_types::role::{
    AgentRoleConfig, BOOKING, CapabilitySet, COLLECTOR, FOLLOW_UP_NO_SEARCH,
    FOLLOW_UP_WITH_SEARCH, ITINERARY_FINAL, MAPS, PLANNER, WEATHER,
};

/// Ordered set of role configurations, looked up by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleRegistry {
    roles: Vec<AgentRoleConfig>,
}

impl RoleRegistry {
    /// An empty registry. Mostly useful for tests and custom deployments.
    pub fn empty() -> Self {
        Self { roles: Vec::new() }
    }

    /// The eight built-in travel planning roles.
    pub fn builtin() -> Self {
        let roles = vec![
            AgentRoleConfig::new(
                COLLECTOR,
                "Travel Research",
                "You are a travel research specialist. Gather destination overview, \
                 best time to visit, lodging options by price tier, local food, main \
                 attractions with opening hours and tickets, local transport, weather \
                 and practical tips (currency, customs, emergency contacts). Organize \
                 the findings by topic.",
                "Collect comprehensive, factual travel information for the planner.",
            )
            .with_lookups(vec![LookupKind::PlacesSearch]),
            AgentRoleConfig::new(
                PLANNER,
                "Travel Itinerary",
                "You are a travel itinerary planner. Using the collected research, \
                 produce a day-by-day plan with times, places, meals, transport and \
                 costs. Keep the total within budget, balance sightseeing with rest, \
                 and give alternatives for rainy days or budget changes.",
                "Produce a detailed, practical itinerary from the collected information.",
            ),
            AgentRoleConfig::new(
                MAPS,
                "Locations and Routes",
                "You are a maps specialist. Resolve the origin and destinations, \
                 describe the routes between them with distances and travel times, \
                 and list notable points of interest near each destination.",
                "Analyse locations and routes for the trip.",
            )
            .with_lookups(vec![LookupKind::Geocode, LookupKind::Route, LookupKind::PoiSearch]),
            AgentRoleConfig::new(
                WEATHER,
                "Weather Forecast",
                "You are a weather specialist. Summarize the forecast for each \
                 destination over the travel dates and suggest what to wear and pack.",
                "Report the expected weather and clothing advice.",
            )
            .with_lookups(vec![LookupKind::Weather]),
            AgentRoleConfig::new(
                BOOKING,
                "Accommodation",
                "You are an accommodation specialist. Recommend places to stay in \
                 each destination that match the lodging preference and budget, with \
                 location, price range and rating.",
                "Recommend suitable accommodation.",
            )
            .with_lookups(vec![LookupKind::PlacesSearch]),
            AgentRoleConfig::new(
                ITINERARY_FINAL,
                "Detailed Itinerary",
                "You are an itinerary planner. Combine the location, weather and \
                 accommodation analyses into a day-by-day schedule with times, \
                 activities, meals, transport and a cost breakdown within budget.",
                "Create the final detailed itinerary.",
            ),
            AgentRoleConfig::new(
                FOLLOW_UP_WITH_SEARCH,
                "Follow-up Answer",
                "You are a travel consultant answering questions about an existing \
                 travel plan. Use the lookup results for up-to-date options and give \
                 concrete alternatives with prices, times and addresses.",
                "Answer follow-up questions about the plan using fresh information.",
            )
            .with_lookups(vec![LookupKind::PlacesSearch]),
            AgentRoleConfig::new(
                FOLLOW_UP_NO_SEARCH,
                "Follow-up Answer",
                "You are a travel consultant answering questions about an existing \
                 travel plan. Answer from the plan itself and give concrete \
                 suggestions when a change is asked for.",
                "Answer follow-up questions from the existing plan.",
            ),
        ];
        Self { roles }
    }

    /// Built-in roles with configuration overrides applied in order.
    pub fn with_overrides(overrides: &[RoleOverride]) -> Result<Self, ConfigError> {
        let mut registry = Self::builtin();
        for role_override in overrides {
            registry.apply_override(role_override)?;
        }
        Ok(registry)
    }

    /// Merge one override into the registry, adding the role if it is new.
    pub fn apply_override(&mut self, role_override: &RoleOverride) -> Result<(), ConfigError> {
        let name = role_override.name.trim();
        if name.is_empty() {
            return Err(ConfigError::Invalid("role override with a blank name".to_string()));
        }

        let base = self
            .get(name)
            .cloned()
            .unwrap_or_else(|| AgentRoleConfig::new(name, name, name, name));

        let capabilities = match &role_override.lookups {
            Some(kinds) if kinds.is_empty() => CapabilitySet::TextOnly,
            Some(kinds) => CapabilitySet::WithLookup(kinds.clone()),
            None => base.capabilities.clone(),
        };

        self.insert(AgentRoleConfig {
            name: name.to_string(),
            title: role_override.title.clone().unwrap_or(base.title),
            instructions: role_override.instructions.clone().unwrap_or(base.instructions),
            goal: role_override.goal.clone().unwrap_or(base.goal),
            capabilities,
        });
        Ok(())
    }

    /// Insert or replace a role, keeping the original position on replace.
    pub fn insert(&mut self, role: AgentRoleConfig) {
        match self.roles.iter_mut().find(|r| r.name == role.name) {
            Some(existing) => *existing = role,
            None => self.roles.push(role),
        }
    }

    pub fn get(&self, name: &str) -> Option<&AgentRoleConfig> {
        self.roles.iter().find(|r| r.name == name)
    }

    pub fn require(&self, name: &str) -> Result<&AgentRoleConfig, ConfigError> {
        self.get(name)
            .ok_or_else(|| ConfigError::UnknownRole(name.to_string()))
    }

    pub fn iter(&self) -> impl Iterator<Item = &AgentRoleConfig> {
        self.roles.iter()
    }

    pub fn len(&self) -> usize {
        self.roles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }
}

impl Default for RoleRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}
