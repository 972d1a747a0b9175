//! CLI command definitions for the `tripweave` binary.
//!
//! Uses clap derive macros for argument parsing.

pub mod ask;
pub mod plan;
pub mod progress;
pub mod roles;

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;

use tripweave_types::trip::{AccommodationType, TripRequest};

/// Plan trips with a team of cooperating AI agents.
#[derive(Parser)]
#[command(name = "tripweave", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v for verbose, -vv for debug/trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the planning workflow for a trip.
    Plan(PlanArgs),

    /// Ask a follow-up question about a saved plan.
    Ask {
        /// The question to ask.
        question: String,

        /// Session file written by `tripweave plan --output`.
        #[arg(long, short)]
        session: Option<PathBuf>,
    },

    /// List the configured agent roles and the workflow phases.
    Roles,

    /// Start the REST API server.
    Serve {
        /// Port to listen on.
        #[arg(short, long, default_value = "3000")]
        port: u16,

        /// Host to bind to.
        #[arg(long, default_value = "127.0.0.1")]
        host: String,
    },

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[derive(Debug, Args)]
pub struct PlanArgs {
    /// Departure city.
    #[arg(long)]
    pub origin: String,

    /// Destination city (repeat for multi-city trips, in visiting order).
    #[arg(long = "destination", short = 'd', required = true)]
    pub destinations: Vec<String>,

    /// First day of the trip (YYYY-MM-DD).
    #[arg(long)]
    pub start: NaiveDate,

    /// Last day of the trip (YYYY-MM-DD).
    #[arg(long)]
    pub end: NaiveDate,

    /// Total budget in USD.
    #[arg(long)]
    pub budget: f64,

    /// Interest tag, e.g. food, culture, nature (repeatable).
    #[arg(long = "preference")]
    pub preferences: Vec<String>,

    /// Preferred lodging: any, hotel, hostel, apartment, resort, guesthouse.
    #[arg(long, default_value = "any")]
    pub accommodation: AccommodationType,

    /// Preferred transport mode (repeatable).
    #[arg(long = "transport")]
    pub transportation: Vec<String>,

    /// Dietary restriction (repeatable).
    #[arg(long = "dietary")]
    pub dietary_restrictions: Vec<String>,

    /// Save the session (trip, plan) as JSON for `tripweave ask`.
    #[arg(long, short)]
    pub output: Option<PathBuf>,
}

impl PlanArgs {
    pub fn to_trip(&self) -> TripRequest {
        TripRequest::new(
            self.origin.clone(),
            self.destinations.clone(),
            self.start,
            self.end,
            self.budget,
        )
        .with_preferences(self.preferences.iter().cloned())
        .with_accommodation(self.accommodation)
        .with_transportation(self.transportation.iter().cloned())
        .with_dietary_restrictions(self.dietary_restrictions.iter().cloned())
    }
}

/// Conversation used by one-shot CLI commands.
pub const CLI_USER: &str = "cli";
pub const CLI_CONVERSATION: &str = "default";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_plan_command() {
        let cli = Cli::try_parse_from([
            "tripweave", "plan", "--origin", "Taipei", "-d", "Kaohsiung", "--start", "2025-03-01",
            "--end", "2025-03-03", "--budget", "500", "--preference", "food", "--json",
        ])
        .unwrap();
        assert!(cli.json);
        let Commands::Plan(args) = cli.command else {
            panic!("expected plan command");
        };
        let trip = args.to_trip();
        assert_eq!(trip.destinations, ["Kaohsiung"]);
        assert_eq!(trip.budget, 500.0);
        assert!(trip.preferences.contains("food"));
        assert!(trip.validate().is_ok());
    }

    #[test]
    fn plan_requires_a_destination() {
        let result = Cli::try_parse_from([
            "tripweave", "plan", "--origin", "Taipei", "--start", "2025-03-01", "--end",
            "2025-03-03", "--budget", "500",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn rejects_malformed_dates() {
        let result = Cli::try_parse_from([
            "tripweave", "plan", "--origin", "Taipei", "-d", "Kaohsiung", "--start", "March 1st",
            "--end", "2025-03-03", "--budget", "500",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn counts_verbosity() {
        let cli = Cli::try_parse_from(["tripweave", "-vv", "roles"]).unwrap();
        assert_eq!(cli.verbose, 2);
    }
}
