//! `tripweave roles`: show the role registry and the workflow it runs.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use tripweave_core::agent::RoleRegistry;
use tripweave_core::coordinator::plan::{PhaseStep, WorkflowPlan};
use tripweave_types::role::CapabilitySet;

use crate::state::AppState;

pub fn roles(state: &AppState, json: bool) -> Result<()> {
    let registry = state.planner.roles();
    let workflow = state.planner.workflow();

    if json {
        let value = serde_json::json!({
            "roles": registry.iter().collect::<Vec<_>>(),
            "workflow": workflow,
        });
        println!("{}", serde_json::to_string_pretty(&value)?);
        return Ok(());
    }

    println!();
    println!("{}", role_table(registry, workflow));
    println!();
    println!("  {}", style("── Workflow ──").dim());
    for (index, phase) in workflow.phases().iter().enumerate() {
        let members = match &phase.step {
            PhaseStep::Single(role) => role.clone(),
            PhaseStep::Parallel(roles) => format!("{} (parallel)", roles.join(" + ")),
        };
        println!("  {}. {} {}", index + 1, style(&phase.name).bold(), members);
    }
    println!();
    Ok(())
}

fn role_table(registry: &RoleRegistry, workflow: &WorkflowPlan) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Role").fg(Color::White),
        Cell::new("Section").fg(Color::White),
        Cell::new("Lookups").fg(Color::White),
        Cell::new("In workflow").fg(Color::White),
    ]);

    for role in registry.iter() {
        let lookups = match &role.capabilities {
            CapabilitySet::TextOnly => Cell::new("text only").fg(Color::DarkGrey),
            CapabilitySet::WithLookup(kinds) => Cell::new(
                kinds.iter().map(ToString::to_string).collect::<Vec<_>>().join(", "),
            ),
        };
        let used = workflow.roles().any(|name| name == role.name);
        table.add_row(vec![
            Cell::new(&role.name).fg(Color::Cyan),
            Cell::new(&role.title),
            lookups,
            if used {
                Cell::new("yes").fg(Color::Green)
            } else {
                Cell::new("-").fg(Color::DarkGrey)
            },
        ]);
    }
    table
}
