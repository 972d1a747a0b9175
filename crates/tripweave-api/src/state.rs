//! Application state wiring the planner to its concrete adapters.
//!
//! AppState holds the `PlannerService` used by both the CLI and the REST API,
//! built from `config.toml` and the credentials in the environment.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tripweave_core::PlannerService;
use tripweave_core::agent::RoleRegistry;
use tripweave_core::coordinator::plan::WorkflowPlan;
use tripweave_core::llm::BoxCompletionService;
use tripweave_core::lookup::BoxLookupService;
use tripweave_infra::config::{load_planner_config, resolve_data_dir};
use tripweave_infra::llm::OpenAiCompatibleService;
use tripweave_infra::llm::openai_compat::config::from_provider_config;
use tripweave_infra::lookup::HttpLookupService;
use tripweave_infra::secret::Credentials;
use tripweave_infra::secret::env::EnvSource;
use tripweave_types::config::PlannerConfig;
use tripweave_types::error::ConfigError;
use tripweave_types::lookup::LookupKind;
use tripweave_types::role::CapabilitySet;

/// Shared application state. Cheap to clone.
#[derive(Debug, Clone)]
pub struct AppState {
    pub planner: PlannerService,
    pub config: Arc<PlannerConfig>,
    pub data_dir: PathBuf,
}

impl AppState {
    /// Load configuration and credentials, then wire the planner.
    pub async fn init() -> anyhow::Result<Self> {
        let data_dir = resolve_data_dir();
        let config = load_planner_config(&data_dir).await;

        let lookups = required_lookups(&config)?;
        let env = EnvSource::with_dotenv(Path::new(".env"));
        let credentials = Credentials::resolve(&env, &lookups)?;

        let completion = OpenAiCompatibleService::new(from_provider_config(
            &config.provider,
            credentials.openai_api_key.clone(),
        ));
        tracing::debug!(model = %completion.model(), base_url = %config.provider.base_url, "completion service ready");

        let lookup = if credentials.has_lookup_keys() {
            Some(BoxLookupService::new(HttpLookupService::from_credentials(&credentials)?))
        } else {
            None
        };

        let planner = PlannerService::from_config(&config, BoxCompletionService::new(completion), lookup)?;
        Ok(Self::new(planner, config, data_dir))
    }

    pub fn new(planner: PlannerService, config: PlannerConfig, data_dir: PathBuf) -> Self {
        Self {
            planner,
            config: Arc::new(config),
            data_dir,
        }
    }
}

/// Lookup kinds used by the roles of the configured workflow.
///
/// Follow-up search lookups are not included: without their keys the planner
/// still runs and search questions are refused when asked.
pub fn required_lookups(config: &PlannerConfig) -> Result<BTreeSet<LookupKind>, ConfigError> {
    let roles = RoleRegistry::with_overrides(&config.roles)?;
    let workflow = WorkflowPlan::from_config(config)?;

    let mut kinds = BTreeSet::new();
    for name in workflow.lookup_roles(&roles) {
        if let Some(CapabilitySet::WithLookup(role_kinds)) = roles.get(name).map(|r| &r.capabilities) {
            kinds.extend(role_kinds.iter().copied());
        }
    }
    Ok(kinds)
}
