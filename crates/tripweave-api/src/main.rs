//! Tripweave CLI and REST API entry point.
//!
//! Binary name: `tripweave`
//!
//! Parses CLI arguments, loads configuration and credentials, then dispatches
//! to the command handler or starts the REST API server.

mod cli;
mod http;
mod state;

use clap::Parser;
use clap_complete::generate;

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up tracing based on verbosity
    let filter = match cli.verbose {
        0 if cli.quiet => "error",
        0 => "warn",
        1 => "info,tripweave=debug",
        _ => "trace",
    };
    tripweave_observe::tracing_setup::init_tracing(cli.otel, filter)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {e}"))?;

    let result = run(cli).await;
    tripweave_observe::tracing_setup::shutdown_tracing();
    result
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "tripweave", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    match &cli.command {
        Commands::Plan(args) => {
            cli::plan::plan(&state, args, cli.json, cli.quiet).await?;
        }

        Commands::Ask { question, session } => {
            cli::ask::ask(&state, question, session.as_deref(), cli.json).await?;
        }

        Commands::Roles => {
            cli::roles::roles(&state, cli.json)?;
        }

        Commands::Serve { port, host } => {
            let addr = format!("{host}:{port}");
            let listener = tokio::net::TcpListener::bind(&addr).await?;

            println!(
                "  {} Tripweave API listening on {}",
                console::style("⚡").bold(),
                console::style(format!("http://{addr}")).cyan()
            );
            println!("  {}", console::style("Press Ctrl+C to stop").dim());

            let janitor = spawn_cache_janitor(&state);
            let router = http::router::build_router(state);

            axum::serve(listener, router)
                .with_graceful_shutdown(shutdown_signal())
                .await?;
            janitor.abort();

            println!("\n  Server stopped.");
        }

        Commands::Completions { .. } => unreachable!("handled above"),
    }

    Ok(())
}

/// Periodically drop expired conversations so idle memory is returned.
fn spawn_cache_janitor(state: &AppState) -> tokio::task::JoinHandle<()> {
    let planner = state.planner.clone();
    let period = std::time::Duration::from_secs(state.config.cache.ttl_secs.clamp(60, 3600));
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        interval.tick().await;
        loop {
            interval.tick().await;
            let purged = planner.cache().purge_expired();
            if purged > 0 {
                tracing::info!(purged, "expired conversations purged");
            }
        }
    })
}

/// Wait for Ctrl+C or SIGTERM for graceful shutdown.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("failed to listen for Ctrl+C: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
