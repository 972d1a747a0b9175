//! `tripweave ask`: answer a follow-up question about a saved plan.

use std::path::Path;

use anyhow::{Context, Result};
use console::style;

use tripweave_types::conversation::{ConversationKey, SessionSnapshot};

use super::{CLI_CONVERSATION, CLI_USER};
use crate::state::AppState;

/// Restore the session from `session` (if given), ask, and save the new turn back.
pub async fn ask(state: &AppState, question: &str, session: Option<&Path>, json: bool) -> Result<()> {
    let key = ConversationKey::new(CLI_USER, CLI_CONVERSATION);

    if let Some(path) = session {
        let snapshot = read_snapshot(path, &key).await?;
        state.planner.restore_session(snapshot).await;
    }

    let outcome = state.planner.ask_follow_up(&key, question).await?;

    if let Some(path) = session {
        let snapshot = state.planner.session_snapshot(&key).await;
        tokio::fs::write(path, serde_json::to_string_pretty(&snapshot)?).await?;
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!();
    println!("{}", outcome.answer);
    println!();
    let source = if outcome.used_lookup {
        "answered with fresh search results"
    } else {
        "answered from the saved plan"
    };
    println!("  {}", style(format!("{} ({source})", outcome.role)).dim());
    if outcome.degraded {
        println!("  {} The answer is incomplete; try again later.", style("!").yellow().bold());
    }
    Ok(())
}

async fn read_snapshot(path: &Path, key: &ConversationKey) -> Result<SessionSnapshot> {
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("failed to read session file {}", path.display()))?;
    let mut snapshot: SessionSnapshot = serde_json::from_str(&content)
        .with_context(|| format!("{} is not a tripweave session file", path.display()))?;
    snapshot.key = key.clone();
    Ok(snapshot)
}
