//! Text completion request/response types.
//!
//! A completion service may hand back plain text, a conversation transcript,
//! or some provider-specific structure. `CompletionOutput` closes over those
//! shapes and `normalize` reduces them to the single string the coordinator
//! works with.

use serde::{Deserialize, Serialize};

use crate::lookup::{LookupKind, LookupRequest, LookupResult};

/// One conversational turn inside a transcript-shaped completion result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    pub speaker: String,
    pub content: String,
}

impl Turn {
    pub fn new(speaker: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            speaker: speaker.into(),
            content: content.into(),
        }
    }
}

/// Result shape returned by a completion service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum CompletionOutput {
    Text(String),
    Turns(Vec<Turn>),
    Opaque(serde_json::Value),
}

impl CompletionOutput {
    /// Reduce the output to plain text.
    ///
    /// `Turns` yields the last turn's content (empty if there are none).
    /// `Opaque` yields its `content` string field, a bare string as-is, and
    /// the JSON rendering of anything else.
    pub fn normalize(self) -> String {
        match self {
            CompletionOutput::Text(text) => text,
            CompletionOutput::Turns(turns) => turns
                .into_iter()
                .last()
                .map(|turn| turn.content)
                .unwrap_or_default(),
            CompletionOutput::Opaque(value) => match value {
                serde_json::Value::String(s) => s,
                serde_json::Value::Object(ref map) => match map.get("content") {
                    Some(serde_json::Value::String(s)) => s.clone(),
                    _ => value.to_string(),
                },
                other => other.to_string(),
            },
        }
    }
}

/// Outcome of one bound lookup, handed to the completion call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResult {
    pub kind: LookupKind,
    /// Human-readable description of the lookup that was made.
    pub label: String,
    pub content: String,
    pub failed: bool,
}

impl ToolResult {
    pub fn from_result(request: &LookupRequest, result: LookupResult) -> Self {
        Self {
            kind: result.kind,
            label: request.describe(),
            content: result.summary,
            failed: false,
        }
    }

    pub fn from_failure(request: &LookupRequest, error: impl std::fmt::Display) -> Self {
        Self {
            kind: request.kind,
            label: request.describe(),
            content: format!("lookup failed: {error}"),
            failed: true,
        }
    }
}

/// Render tool results as a labelled block appended to the user message.
pub fn render_tool_results(results: &[ToolResult]) -> String {
    let mut out = String::from("Lookup results:");
    for result in results {
        out.push_str(&format!("\n[{}]\n{}", result.label, result.content));
    }
    out
}

/// Request for a single completion on behalf of an agent role.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletionRequest {
    /// Name of the role this call runs as.
    pub role: String,
    /// Role instructions (system prompt).
    pub system: String,
    pub goal: String,
    /// Phase input or follow-up context.
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_results: Vec<ToolResult>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_text_is_identity() {
        assert_eq!(CompletionOutput::Text("day 1".into()).normalize(), "day 1");
    }

    #[test]
    fn test_normalize_turns_takes_last_content() {
        let out = CompletionOutput::Turns(vec![
            Turn::new("user", "plan my trip"),
            Turn::new("assistant", "draft"),
            Turn::new("assistant", "final plan"),
        ]);
        assert_eq!(out.normalize(), "final plan");
        assert_eq!(CompletionOutput::Turns(vec![]).normalize(), "");
    }

    #[test]
    fn test_normalize_opaque_variants() {
        assert_eq!(
            CompletionOutput::Opaque(json!({"content": "from field", "other": 1})).normalize(),
            "from field"
        );
        assert_eq!(CompletionOutput::Opaque(json!("bare")).normalize(), "bare");
        assert_eq!(
            CompletionOutput::Opaque(json!({"answer": 42})).normalize(),
            r#"{"answer":42}"#
        );
        assert_eq!(CompletionOutput::Opaque(json!(7)).normalize(), "7");
    }

    #[test]
    fn test_tool_results_render_with_labels() {
        let req = LookupRequest::new(LookupKind::Weather).param("location", "Kaohsiung");
        let ok = ToolResult::from_result(
            &req,
            LookupResult {
                kind: LookupKind::Weather,
                summary: "sunny, 28C".into(),
                data: serde_json::Value::Null,
            },
        );
        let failed = ToolResult::from_failure(&req, "transient failure: reset");
        assert!(!ok.failed);
        assert!(failed.failed);

        let block = render_tool_results(&[ok, failed]);
        assert!(block.starts_with("Lookup results:"));
        assert!(block.contains("[weather(location=Kaohsiung)]\nsunny, 28C"));
        assert!(block.contains("lookup failed: transient failure: reset"));
    }
}
