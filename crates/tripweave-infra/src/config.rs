//! Planner configuration loader for Tripweave.
//!
//! Reads `config.toml` from the data directory (`~/.tripweave/` in production)
//! and deserializes it into [`PlannerConfig`]. Falls back to defaults when the
//! file is missing or malformed.

use std::path::{Path, PathBuf};

use tripweave_types::config::PlannerConfig;

/// Name of the configuration file inside the data directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Resolve the data directory from environment or platform defaults.
///
/// Priority:
/// 1. `TRIPWEAVE_DATA_DIR` environment variable
/// 2. `~/.tripweave`
/// 3. `.tripweave` in the working directory
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var("TRIPWEAVE_DATA_DIR") {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".tripweave");
    }

    PathBuf::from(".tripweave")
}

/// Load planner configuration from `{data_dir}/config.toml`.
///
/// - Missing file: [`PlannerConfig::default()`].
/// - Unreadable or unparsable file: a warning and the default.
pub async fn load_planner_config(data_dir: &Path) -> PlannerConfig {
    let config_path = data_dir.join(CONFIG_FILE);

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return PlannerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return PlannerConfig::default();
        }
    };

    match toml::from_str::<PlannerConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            PlannerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tripweave_types::config::WorkflowKind;
    use tripweave_types::lookup::LookupKind;

    #[tokio::test]
    async fn load_planner_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_planner_config(tmp.path()).await;
        assert_eq!(config, PlannerConfig::default());
    }

    #[tokio::test]
    async fn load_planner_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(
            tmp.path().join(CONFIG_FILE),
            r#"
invocation_timeout_secs = 30
max_attempts = 3
workflow = "custom"
follow_up_keywords = ["availability"]

[[custom_phases]]
name = "scout"
roles = ["maps"]

[[custom_phases]]
name = "gather"
roles = ["weather", "booking"]
parallel = true

[cache]
capacity = 16

[provider]
base_url = "http://localhost:11434/v1"
model = "llama3.1"

[[roles]]
name = "weather"
instructions = "Report rain chances first."
lookups = ["weather"]
"#,
        )
        .await
        .unwrap();

        let config = load_planner_config(tmp.path()).await;
        assert_eq!(config.invocation_timeout_secs, 30);
        assert_eq!(config.max_attempts, 3);
        assert_eq!(config.workflow, WorkflowKind::Custom);
        assert_eq!(config.custom_phases.len(), 2);
        assert!(config.custom_phases[1].parallel);
        assert_eq!(config.cache.capacity, 16);
        assert_eq!(config.cache.ttl_secs, 86_400);
        assert_eq!(config.provider.model, "llama3.1");
        assert_eq!(config.roles[0].lookups, Some(vec![LookupKind::Weather]));
        assert_eq!(config.follow_up_keywords, Some(vec!["availability".to_string()]));
    }

    #[tokio::test]
    async fn load_planner_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        tokio::fs::write(tmp.path().join(CONFIG_FILE), "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_planner_config(tmp.path()).await;
        assert_eq!(config, PlannerConfig::default());
    }

    #[test]
    fn test_resolve_data_dir_from_env() {
        // SAFETY: This test is single-threaded and restores the env var immediately.
        unsafe {
            std::env::set_var("TRIPWEAVE_DATA_DIR", "/tmp/test-tripweave");
        }
        let dir = resolve_data_dir();
        assert_eq!(dir, PathBuf::from("/tmp/test-tripweave"));
        unsafe {
            std::env::remove_var("TRIPWEAVE_DATA_DIR");
        }
    }
}
