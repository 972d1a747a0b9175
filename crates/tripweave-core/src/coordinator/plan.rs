//! Workflow plans: the fixed list of phases a planning run goes through.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use tripweave_types::config::{PlannerConfig, WorkflowKind};
use tripweave_types::error::ConfigError;
use tripweave_types::role::{BOOKING, COLLECTOR, ITINERARY_FINAL, MAPS, PLANNER, WEATHER};

use crate::agent::roles::RoleRegistry;

/// What a phase runs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "roles", rename_all = "snake_case")]
pub enum PhaseStep {
    Single(String),
    /// Members run concurrently and are joined in this declared order.
    Parallel(Vec<String>),
}

impl PhaseStep {
    /// Role names in declared order.
    pub fn roles(&self) -> &[String] {
        match self {
            PhaseStep::Single(role) => std::slice::from_ref(role),
            PhaseStep::Parallel(roles) => roles,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Phase {
    pub name: String,
    pub step: PhaseStep,
}

impl Phase {
    pub fn single(name: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            step: PhaseStep::Single(role.into()),
        }
    }

    pub fn parallel<I, S>(name: impl Into<String>, roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            step: PhaseStep::Parallel(roles.into_iter().map(Into::into).collect()),
        }
    }
}

/// Ordered phases. Phase N+1 starts only after phase N has joined.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkflowPlan {
    phases: Vec<Phase>,
}

impl WorkflowPlan {
    pub fn new(phases: Vec<Phase>) -> Self {
        Self { phases }
    }

    /// collect [collector] -> plan [planner]
    pub fn collector_planner() -> Self {
        Self::new(vec![
            Phase::single("collect", COLLECTOR),
            Phase::single("plan", PLANNER),
        ])
    }

    /// locate [maps] -> gather [weather, booking] -> synthesize [itinerary-final]
    pub fn specialist_team() -> Self {
        Self::new(vec![
            Phase::single("locate", MAPS),
            Phase::parallel("gather", [WEATHER, BOOKING]),
            Phase::single("synthesize", ITINERARY_FINAL),
        ])
    }

    /// Plan selected by `workflow` in the configuration.
    ///
    /// A custom phase with several roles must be marked `parallel`.
    pub fn from_config(config: &PlannerConfig) -> Result<Self, ConfigError> {
        match config.workflow {
            WorkflowKind::SpecialistTeam => Ok(Self::specialist_team()),
            WorkflowKind::CollectorPlanner => Ok(Self::collector_planner()),
            WorkflowKind::Custom => {
                let mut phases = Vec::with_capacity(config.custom_phases.len());
                for custom in &config.custom_phases {
                    let phase = match (custom.roles.as_slice(), custom.parallel) {
                        ([only], false) => Phase::single(&custom.name, only),
                        (_, true) => Phase::parallel(&custom.name, custom.roles.iter().cloned()),
                        ([], false) => {
                            return Err(ConfigError::EmptyParallelGroup(custom.name.clone()));
                        }
                        (_, false) => {
                            return Err(ConfigError::Invalid(format!(
                                "phase '{}' lists several roles; set parallel = true or split it",
                                custom.name
                            )));
                        }
                    };
                    phases.push(phase);
                }
                Ok(Self::new(phases))
            }
        }
    }

    pub fn phases(&self) -> &[Phase] {
        &self.phases
    }

    /// Every role the plan runs, in phase then declared order.
    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.phases
            .iter()
            .flat_map(|p| p.step.roles().iter().map(String::as_str))
    }

    /// Reject plans the coordinator cannot run against `registry`.
    pub fn validate(&self, registry: &RoleRegistry) -> Result<(), ConfigError> {
        if self.phases.is_empty() {
            return Err(ConfigError::EmptyWorkflow);
        }

        let mut phase_names = HashSet::new();
        for phase in &self.phases {
            if phase.name.trim().is_empty() {
                return Err(ConfigError::Invalid("phase with a blank name".to_string()));
            }
            if !phase_names.insert(phase.name.as_str()) {
                return Err(ConfigError::Invalid(format!(
                    "phase '{}' is declared twice",
                    phase.name
                )));
            }

            let roles = phase.step.roles();
            if roles.is_empty() {
                return Err(ConfigError::EmptyParallelGroup(phase.name.clone()));
            }

            let mut seen = HashSet::new();
            for role in roles {
                if !seen.insert(role.as_str()) {
                    return Err(ConfigError::DuplicateRole {
                        phase: phase.name.clone(),
                        role: role.clone(),
                    });
                }
                registry.require(role)?;
            }
        }
        Ok(())
    }

    /// Roles in the plan whose capabilities call for external lookups.
    pub fn lookup_roles<'a>(&'a self, registry: &'a RoleRegistry) -> impl Iterator<Item = &'a str> + 'a {
        self.roles().filter(move |name| {
            registry
                .get(name)
                .is_some_and(|role| role.capabilities.needs_lookup())
        })
    }
}

impl Default for WorkflowPlan {
    fn default() -> Self {
        Self::specialist_team()
    }
}
