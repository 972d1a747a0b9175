//! Planner configuration types for Tripweave.
//!
//! `PlannerConfig` represents the top-level `config.toml`. Every field has a
//! default so an empty or missing file yields a working configuration.

use serde::{Deserialize, Serialize};

use crate::lookup::LookupKind;

/// Top-level configuration for the planner.
///
/// Loaded from `~/.tripweave/config.toml` (or `$TRIPWEAVE_DATA_DIR`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlannerConfig {
    /// Per-invocation deadline in seconds.
    #[serde(default = "default_invocation_timeout_secs")]
    pub invocation_timeout_secs: u64,

    /// Completion attempts per role invocation (1 disables retries).
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Upper bound on concurrently running invocations in a parallel group.
    #[serde(default = "default_max_parallel_invocations")]
    pub max_parallel_invocations: usize,

    /// Number of most recent follow-up turns included in follow-up context.
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,

    #[serde(default)]
    pub workflow: WorkflowKind,

    /// Phases used when `workflow = "custom"`.
    #[serde(default)]
    pub custom_phases: Vec<CustomPhase>,

    /// Replaces the built-in follow-up keyword list when set.
    #[serde(default)]
    pub follow_up_keywords: Option<Vec<String>>,

    #[serde(default)]
    pub cache: CacheConfig,

    #[serde(default)]
    pub provider: ProviderConfig,

    /// Overrides for built-in roles, or additional roles.
    #[serde(default)]
    pub roles: Vec<RoleOverride>,
}

fn default_invocation_timeout_secs() -> u64 {
    45
}

fn default_max_attempts() -> u32 {
    2
}

fn default_max_parallel_invocations() -> usize {
    4
}

fn default_max_history_turns() -> usize {
    6
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            invocation_timeout_secs: default_invocation_timeout_secs(),
            max_attempts: default_max_attempts(),
            max_parallel_invocations: default_max_parallel_invocations(),
            max_history_turns: default_max_history_turns(),
            workflow: WorkflowKind::default(),
            custom_phases: Vec::new(),
            follow_up_keywords: None,
            cache: CacheConfig::default(),
            provider: ProviderConfig::default(),
            roles: Vec::new(),
        }
    }
}

/// Which built-in phase layout to run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WorkflowKind {
    /// locate [maps] -> gather [weather, booking] -> synthesize [itinerary-final]
    #[default]
    SpecialistTeam,
    /// collect [collector] -> plan [planner]
    CollectorPlanner,
    /// Phases from `custom_phases`.
    Custom,
}

/// One phase of a custom workflow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomPhase {
    pub name: String,
    pub roles: Vec<String>,
    /// Run `roles` as a parallel group. A single-role phase ignores this.
    #[serde(default)]
    pub parallel: bool,
}

/// Conversation cache bounds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheConfig {
    #[serde(default = "default_cache_capacity")]
    pub capacity: usize,
    #[serde(default = "default_cache_ttl_secs")]
    pub ttl_secs: u64,
}

fn default_cache_capacity() -> usize {
    1024
}

fn default_cache_ttl_secs() -> u64 {
    86_400
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: default_cache_capacity(),
            ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Completion provider endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_model")]
    pub model: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f32>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

fn default_model() -> String {
    "gpt-4.1".to_string()
}

fn default_max_tokens() -> u32 {
    4096
}

impl Default for ProviderConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            temperature: None,
            max_tokens: default_max_tokens(),
        }
    }
}

/// Partial role definition from `[[roles]]`.
///
/// Overrides the named built-in role field by field; an unknown name defines
/// a new role (then `title`, `instructions` and `goal` default to the name).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleOverride {
    pub name: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub instructions: Option<String>,
    #[serde(default)]
    pub goal: Option<String>,
    /// `Some(vec![])` makes the role text-only.
    #[serde(default)]
    pub lookups: Option<Vec<LookupKind>>,
}
