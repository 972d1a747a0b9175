//! Placeholder, joined-phase and merged-plan rendering.

use tripweave_types::error::InvocationError;
use tripweave_types::phase::{PhaseReport, PhaseResult, PhaseStatus};
use tripweave_types::trip::TripRequest;

use crate::agent::roles::RoleRegistry;

/// Text standing in for a failed member, keeping its slot in the joined output.
pub fn placeholder(title: &str, role: &str, error: Option<&InvocationError>) -> String {
    let reason = error.map_or_else(|| "unknown error".to_string(), ToString::to_string);
    format!(
        "[{title} unavailable: information for role '{role}' could not be retrieved: {reason}]"
    )
}

/// Display heading for a role, falling back to its name.
pub fn title_of<'a>(registry: &'a RoleRegistry, role: &'a str) -> &'a str {
    registry.get(role).map_or(role, |r| r.title.as_str())
}

/// A member's text, or its placeholder when it failed.
pub fn member_text(registry: &RoleRegistry, result: &PhaseResult) -> String {
    if result.success {
        result.text.clone()
    } else {
        placeholder(
            title_of(registry, &result.role),
            &result.role,
            result.error.as_ref(),
        )
    }
}

/// Members in declared order, each under its title.
pub fn join_members(registry: &RoleRegistry, members: &[PhaseResult]) -> String {
    members
        .iter()
        .map(|m| format!("### {}\n{}", title_of(registry, &m.role), member_text(registry, m)))
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Final plan: a heading, an optional failure note, then one section per member.
///
/// Never empty: the heading is always present.
pub fn merge_plan(registry: &RoleRegistry, trip: &TripRequest, phases: &[PhaseReport]) -> String {
    let mut out = format!(
        "# Travel Plan: {} -> {}\n",
        trip.origin.trim(),
        trip.destination_list()
    );

    if phases.last().is_some_and(|p| p.status == PhaseStatus::Failed) {
        out.push_str(
            "\n> NOTE: the itinerary could not be generated. The sections below are the \
             partial results that were available; please try planning again.\n",
        );
    }

    for member in phases.iter().flat_map(|p| p.members.iter()) {
        out.push_str(&format!(
            "\n## {}\n{}\n",
            title_of(registry, &member.role),
            member_text(registry, member)
        ));
    }
    out
}
