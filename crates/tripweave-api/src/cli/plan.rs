//! `tripweave plan`: run the workflow for one trip.

use anyhow::Result;
use comfy_table::{Cell, Color, ContentArrangement, Table, presets};
use console::style;

use tripweave_types::conversation::ConversationKey;
use tripweave_types::phase::{PipelineOutcome, PipelineStatus};

use super::progress::spawn_progress;
use super::{CLI_CONVERSATION, CLI_USER, PlanArgs};
use crate::state::AppState;

pub async fn plan(state: &AppState, args: &PlanArgs, json: bool, quiet: bool) -> Result<()> {
    let key = ConversationKey::new(CLI_USER, CLI_CONVERSATION);
    let trip = args.to_trip();

    if !json && !quiet {
        println!();
        println!(
            "  {} Planning {} -> {} ({} to {})",
            style("✈").bold(),
            style(&trip.origin).cyan(),
            style(trip.destination_list()).cyan(),
            trip.start_date,
            trip.end_date
        );
        println!();
    }

    let progress = (!json && !quiet).then(|| spawn_progress(state.planner.events()));
    let result = state.planner.start_planning(&key, trip).await;
    if let Some(handle) = progress {
        // A rejected trip never starts a pipeline, so there is nothing to drain.
        if result.is_ok() {
            let _ = handle.await;
        } else {
            handle.abort();
        }
    }
    let outcome = result?;

    if let Some(path) = &args.output {
        let snapshot = state.planner.session_snapshot(&key).await;
        tokio::fs::write(path, serde_json::to_string_pretty(&snapshot)?).await?;
        tracing::info!(path = %path.display(), "session saved");
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }
    if quiet {
        println!("{}", outcome.merged_plan_text);
        return Ok(());
    }

    println!();
    println!("{}", phase_table(&outcome));
    println!();
    println!("{}", outcome.merged_plan_text);
    println!();

    match outcome.status {
        PipelineStatus::Complete => {}
        PipelineStatus::Degraded => println!(
            "  {} Some agents failed; their sections are marked as unavailable.",
            style("!").yellow().bold()
        ),
        PipelineStatus::PhaseFailed => println!(
            "  {} A phase produced nothing; the plan is incomplete and was not saved to the conversation.",
            style("✗").red().bold()
        ),
    }
    if let Some(path) = &args.output {
        println!(
            "  Session saved to {}. Ask follow-ups with: tripweave ask --session {} \"...\"",
            style(path.display()).cyan(),
            path.display()
        );
    }
    Ok(())
}

fn phase_table(outcome: &PipelineOutcome) -> Table {
    let mut table = Table::new();
    table.load_preset(presets::UTF8_FULL_CONDENSED);
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec![
        Cell::new("Phase").fg(Color::White),
        Cell::new("Role").fg(Color::White),
        Cell::new("Result").fg(Color::White),
        Cell::new("Attempts").fg(Color::White),
        Cell::new("Time").fg(Color::White),
    ]);

    for report in &outcome.phases {
        for member in &report.members {
            let result = match &member.error {
                None => Cell::new("● ok").fg(Color::Green),
                Some(err) => Cell::new(format!("○ {}", err.kind())).fg(Color::Red),
            };
            table.add_row(vec![
                Cell::new(&report.phase).fg(Color::Cyan),
                Cell::new(&member.role),
                result,
                Cell::new(member.attempts),
                Cell::new(format!("{:.1}s", member.duration_ms as f64 / 1000.0)).fg(Color::DarkGrey),
            ]);
        }
    }
    table
}
