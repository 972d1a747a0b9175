//! Live phase progress printed to stderr while a plan runs.

use console::style;
use tokio::task::JoinHandle;

use tripweave_core::event::EventBus;
use tripweave_types::event::PlannerEvent;
use tripweave_types::phase::PhaseStatus;

/// Print the next pipeline's events; the task ends when that pipeline does.
pub fn spawn_progress(events: &EventBus) -> JoinHandle<()> {
    let mut watch = events.watch_pipeline();
    tokio::spawn(async move {
        while let Some(event) = watch.next().await {
            if let Some(line) = render(&event) {
                eprintln!("{line}");
            }
        }
    })
}

fn render(event: &PlannerEvent) -> Option<String> {
    match event {
        PlannerEvent::PhaseStarted { phase, roles, .. } => Some(format!(
            "  {} {} {}",
            style("▸").cyan(),
            style(phase).bold(),
            style(format!("[{}]", roles.join(", "))).dim()
        )),
        PlannerEvent::InvocationFailed {
            role,
            attempt,
            error,
            will_retry,
            ..
        } => {
            let note = if *will_retry { "retrying" } else { "giving up" };
            Some(format!(
                "    {} {role} attempt {attempt} failed: {error} ({note})",
                style("!").yellow()
            ))
        }
        PlannerEvent::PhaseJoined { phase, status, .. } => {
            let mark = match status {
                PhaseStatus::Succeeded => style("✓").green(),
                PhaseStatus::Degraded => style("~").yellow(),
                PhaseStatus::Failed => style("✗").red(),
            };
            let label = match status {
                PhaseStatus::Succeeded => "done",
                PhaseStatus::Degraded => "degraded",
                PhaseStatus::Failed => "failed",
            };
            Some(format!("  {mark} {phase} {}", style(label).dim()))
        }
        _ => None,
    }
}
