//! Environment credential source.
//!
//! Credentials come from process environment variables, falling back to a
//! `.env` file in the working directory. Variables already set in the
//! environment always win over the file, and the file is never loaded into
//! the process environment.

use std::collections::HashMap;
use std::path::Path;

/// Read-only view over the environment plus optional `.env` values.
#[derive(Debug, Default, Clone)]
pub struct EnvSource {
    dotenv: HashMap<String, String>,
}

impl EnvSource {
    /// Environment only.
    pub fn new() -> Self {
        Self::default()
    }

    /// Environment with `.env` at `path` as fallback. A missing or unreadable
    /// file is treated as empty; malformed lines are skipped.
    pub fn with_dotenv(path: &Path) -> Self {
        let iter = match dotenvy::from_path_iter(path) {
            Ok(iter) => iter,
            Err(err) if err.not_found() => return Self::new(),
            Err(err) => {
                tracing::warn!("Failed to read {}: {err}, ignoring", path.display());
                return Self::new();
            }
        };

        let mut dotenv = HashMap::new();
        for item in iter {
            match item {
                Ok((key, value)) => {
                    dotenv.insert(key, value);
                }
                Err(err) => tracing::warn!(path = %path.display(), "skipping .env entry: {err}"),
            }
        }
        tracing::debug!(path = %path.display(), entries = dotenv.len(), "loaded .env file");
        Self { dotenv }
    }

    /// Value for `key`; blank values count as unset.
    pub fn get(&self, key: &str) -> Option<String> {
        let value = match std::env::var(key) {
            Ok(val) => Some(val),
            // Invalid Unicode is treated as not set: credentials must be strings.
            Err(std::env::VarError::NotPresent | std::env::VarError::NotUnicode(_)) => {
                self.dotenv.get(key).cloned()
            }
        };
        value.filter(|v| !v.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(content: &str) -> (tempfile::TempDir, EnvSource) {
        let tmp = tempfile::tempdir().unwrap();
        let path = tmp.path().join(".env");
        std::fs::write(&path, content).unwrap();
        let source = EnvSource::with_dotenv(&path);
        (tmp, source)
    }

    #[test]
    fn test_dotenv_values() {
        let (_tmp, src) = source(
            "# keys\nTRIPWEAVE_TEST_PLAIN=sk-test\nexport TRIPWEAVE_TEST_QUOTED=\"quoted value\"\n\nTRIPWEAVE_TEST_EMPTY=\n",
        );
        assert_eq!(src.dotenv.get("TRIPWEAVE_TEST_PLAIN").map(String::as_str), Some("sk-test"));
        assert_eq!(src.dotenv.get("TRIPWEAVE_TEST_QUOTED").map(String::as_str), Some("quoted value"));
        assert_eq!(src.dotenv.get("TRIPWEAVE_TEST_EMPTY").map(String::as_str), Some(""));
    }

    #[test]
    fn test_inline_comments_and_escaped_quotes() {
        let (_tmp, src) = source(
            "TRIPWEAVE_TEST_OPENAI=sk-abc123 # prod key\nTRIPWEAVE_TEST_MAPS=\"k\\\"q\"\n",
        );
        assert_eq!(src.get("TRIPWEAVE_TEST_OPENAI").as_deref(), Some("sk-abc123"));
        assert_eq!(src.get("TRIPWEAVE_TEST_MAPS").as_deref(), Some("k\"q"));
    }

    #[test]
    fn test_dotenv_is_not_loaded_into_process_env() {
        let (_tmp, src) = source("TRIPWEAVE_TEST_FILE_ONLY=file-only\n");
        assert_eq!(src.get("TRIPWEAVE_TEST_FILE_ONLY").as_deref(), Some("file-only"));
        assert!(std::env::var("TRIPWEAVE_TEST_FILE_ONLY").is_err());
    }

    #[test]
    fn test_env_wins_over_dotenv() {
        // SAFETY: This test runs serially and cleans up the var it sets.
        unsafe { std::env::set_var("TRIPWEAVE_TEST_SECRET_1", "from-env") };

        let (_tmp, src) = source("TRIPWEAVE_TEST_SECRET_1=from-file\nTRIPWEAVE_TEST_SECRET_2=file-only\n");
        assert_eq!(src.get("TRIPWEAVE_TEST_SECRET_1").as_deref(), Some("from-env"));
        assert_eq!(src.get("TRIPWEAVE_TEST_SECRET_2").as_deref(), Some("file-only"));

        // SAFETY: This test runs serially and the var was just set above.
        unsafe { std::env::remove_var("TRIPWEAVE_TEST_SECRET_1") };
    }

    #[test]
    fn test_blank_counts_as_missing() {
        let (_tmp, src) = source("TRIPWEAVE_TEST_BLANK='   '\n");
        assert!(src.get("TRIPWEAVE_TEST_BLANK").is_none());
        assert!(src.get("NONEXISTENT_VAR_XYZ_123").is_none());
    }

    #[test]
    fn test_missing_dotenv_file_is_empty() {
        let tmp = tempfile::tempdir().unwrap();
        let source = EnvSource::with_dotenv(&tmp.path().join(".env"));
        assert!(source.dotenv.is_empty());
    }
}
