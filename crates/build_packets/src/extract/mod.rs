//! Pulls structured sub-content out of tool-call records.
//!
//! Every extractor is a pure function of the record and its classification. Sanitization
//! happens here, once per field, and nowhere downstream.

mod diff;
mod output;
mod task;
mod text;
mod title;
mod todo;

pub(crate) use diff::{extract_diff, extract_file_path};
pub(crate) use output::extract_output;
pub(crate) use task::{extract_task_output, extract_task_prompt, extract_task_session_id};
pub(crate) use text::chunk_text;
pub(crate) use title::{tool_description, tool_title};
pub(crate) use todo::extract_todos;

use serde_json::Value;

/// Text carried by `content` entries shaped `{type: "content", content: {type: "text", ...}}`
/// or `{type: "text", text}`, joined with newlines.
fn content_text(entries: &[Value]) -> Option<String> {
    let parts: Vec<&str> = entries
        .iter()
        .filter_map(|entry| {
            let entry = entry.as_object()?;
            match entry.get("type").and_then(Value::as_str) {
                Some("content") => entry
                    .get("content")
                    .and_then(|inner| inner.get("text"))
                    .and_then(Value::as_str),
                Some("text") => entry.get("text").and_then(Value::as_str),
                _ => None,
            }
        })
        .filter(|text| !text.is_empty())
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n"))
    }
}
