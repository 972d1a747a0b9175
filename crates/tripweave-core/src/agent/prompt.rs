//! Input assembly for role invocations.
//!
//! Sections are wrapped in XML tags so the model can tell the trip request,
//! earlier phase output, the conversation so far and the question apart.

use tripweave_types::conversation::FollowUpTurn;
use tripweave_types::phase::PhaseReport;
use tripweave_types::trip::TripRequest;

/// Builds the user message sent to a role.
pub struct InputBuilder;

impl InputBuilder {
    /// Input for a pipeline phase.
    ///
    /// Layout:
    /// ```text
    /// <trip>{trip prompt block}</trip>
    /// <phase_results phase="locate">{joined text}</phase_results>
    /// <phase_results phase="gather">{joined text}</phase_results>
    /// ```
    /// Prior phases appear in phase order, each with its full joined text.
    pub fn phase(trip: &TripRequest, prior: &[PhaseReport]) -> String {
        let mut sections = Vec::with_capacity(prior.len() + 1);
        sections.push(format!("<trip>\n{}\n</trip>", trip.to_prompt_block()));
        for report in prior {
            sections.push(format!(
                "<phase_results phase=\"{}\">\n{}\n</phase_results>",
                report.phase, report.joined_text
            ));
        }
        sections.join("\n\n")
    }

    /// Input for a follow-up question about an existing plan.
    ///
    /// `turns` is expected to be already trimmed to the history window.
    pub fn follow_up(
        plan: &str,
        trip: Option<&TripRequest>,
        turns: &[FollowUpTurn],
        question: &str,
    ) -> String {
        let mut sections = Vec::with_capacity(4);
        sections.push(format!("<travel_plan>\n{}\n</travel_plan>", plan.trim()));

        if let Some(trip) = trip {
            sections.push(format!("<trip>\n{}\n</trip>", trip_basics(trip)));
        }

        if !turns.is_empty() {
            let history = turns
                .iter()
                .map(|t| format!("Q: {}\nA: {}", t.question, t.answer))
                .collect::<Vec<_>>()
                .join("\n\n");
            sections.push(format!(
                "<recent_conversation>\n{history}\n</recent_conversation>"
            ));
        }

        sections.push(format!("<question>\n{}\n</question>", question.trim()));
        sections.join("\n\n")
    }
}

fn trip_basics(trip: &TripRequest) -> String {
    let preferences = if trip.preferences.is_empty() {
        "none specified".to_string()
    } else {
        trip.preferences.iter().cloned().collect::<Vec<_>>().join(", ")
    };
    format!(
        "Origin: {}\nDestinations: {}\nDates: {} to {}\nBudget: ${} USD\nPreferences: {}",
        trip.origin.trim(),
        trip.destination_list(),
        trip.start_date,
        trip.end_date,
        trip.budget,
        preferences,
    )
}
