//! Translation of OpenCode `run --format json` events into backend records.
//!
//! OpenCode reports a tool call as repeated `tool_use` events keyed by call id. The
//! translator turns the first sighting into a `tool_call_start` record and every sighting
//! into a `tool_call_progress` record, so the output can go straight into [`crate::parse`].
//! It produces records only; classification and sanitization stay in the parser.

use std::collections::HashSet;

use serde_json::{json, Map, Value};
use tracing::debug;

use crate::packet::ToolStatus;

const SESSION_NOT_FOUND_MARKERS: &[&str] = &[
    "session not found",
    "unknown session",
    "invalid session",
    "session does not exist",
];

/// Stateful per-stream translator. Use one instance per OpenCode stream.
#[derive(Clone, Debug, Default)]
pub struct OpenCodeTranslator {
    session_id: Option<String>,
    saw_prompt_response: bool,
    seen_tool_calls: HashSet<String>,
}

impl OpenCodeTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts with a known session id, e.g. when resuming a session.
    pub fn with_session_id(session_id: impl Into<String>) -> Self {
        Self {
            session_id: Some(session_id.into()),
            ..Self::default()
        }
    }

    /// Most recent OpenCode session id seen on the stream.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    /// Whether a turn-ending `step_finish` has been translated.
    pub fn saw_prompt_response(&self) -> bool {
        self.saw_prompt_response
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Translates one raw event into zero or more backend records.
    pub fn translate(&mut self, event: &Value) -> Vec<Value> {
        let Some(event) = event.as_object() else {
            return Vec::new();
        };

        if let Some(session_id) = ["sessionID", "sessionId"]
            .iter()
            .find_map(|key| event.get(*key).and_then(Value::as_str))
        {
            if self.session_id.as_deref() != Some(session_id) {
                debug!(session_id, "opencode session established");
                self.session_id = Some(session_id.to_string());
            }
        }

        let empty = Map::new();
        let part = event.get("part").and_then(Value::as_object).unwrap_or(&empty);
        let timestamp = event.get("timestamp").cloned().unwrap_or(Value::Null);

        match event.get("type").and_then(Value::as_str) {
            Some("text") => chunk_record("agent_message_chunk", part, timestamp)
                .into_iter()
                .collect(),
            Some("reasoning") => chunk_record("agent_thought_chunk", part, timestamp)
                .into_iter()
                .collect(),
            Some("tool_use") => self.tool_use_records(part, timestamp),
            Some("step_finish") => {
                let Some(reason) = part.get("reason").and_then(Value::as_str) else {
                    return Vec::new();
                };
                if reason.eq_ignore_ascii_case("tool-calls") {
                    return Vec::new();
                }
                self.saw_prompt_response = true;
                vec![json!({
                    "type": "prompt_response",
                    "stop_reason": reason,
                    "timestamp": timestamp,
                })]
            }
            Some("error") => {
                let Some(message) = part.get("message").and_then(Value::as_str) else {
                    return Vec::new();
                };
                vec![json!({
                    "type": "error",
                    "message": message,
                    "code": part.get("code").cloned().unwrap_or(Value::Null),
                    "timestamp": timestamp,
                })]
            }
            _ => Vec::new(),
        }
    }

    fn tool_use_records(&mut self, part: &Map<String, Value>, timestamp: Value) -> Vec<Value> {
        let (Some(call_id), Some(tool_name)) = (
            part.get("callID").and_then(Value::as_str),
            part.get("tool").and_then(Value::as_str),
        ) else {
            return Vec::new();
        };

        let empty = Map::new();
        let state = part.get("state").and_then(Value::as_object).unwrap_or(&empty);
        let raw_input = state.get("input").and_then(Value::as_object);
        let metadata = state
            .get("metadata")
            .and_then(Value::as_object)
            .cloned()
            .unwrap_or_default();
        let title = state.get("title").and_then(Value::as_str);
        let status = state
            .get("status")
            .and_then(Value::as_str)
            .map(ToolStatus::from_reported)
            .unwrap_or_default();
        let lower_name = tool_name.to_lowercase();
        let kind = producer_kind(&lower_name, raw_input);

        let output = match state.get("output") {
            None | Some(Value::Null) => String::new(),
            Some(Value::String(text)) => text.clone(),
            Some(other) => other.to_string(),
        };
        let mut raw_output = Map::new();
        raw_output.insert("output".to_string(), Value::String(output.clone()));
        if lower_name == "read" && !output.is_empty() {
            raw_output.insert("content".to_string(), Value::String(output));
        }
        if lower_name == "task" {
            if let Some(session_id) = ["sessionId", "sessionID", "session_id"]
                .iter()
                .find_map(|key| metadata.get(*key).and_then(Value::as_str))
            {
                raw_output.insert("sessionId".to_string(), json!(session_id));
            }
        }
        raw_output.insert("metadata".to_string(), Value::Object(metadata));

        let content = tool_content(&lower_name, raw_input, &raw_output);
        let raw_input = raw_input.cloned().map(Value::Object).unwrap_or(Value::Null);

        let mut records = Vec::with_capacity(2);
        if self.seen_tool_calls.insert(call_id.to_string()) {
            records.push(json!({
                "type": "tool_call_start",
                "tool_call_id": call_id,
                "tool_name": tool_name,
                "kind": kind,
                "title": title,
                "content": content,
                "raw_input": raw_input,
                "raw_output": Value::Null,
                "status": ToolStatus::Pending.as_str(),
                "timestamp": timestamp,
            }));
        }
        records.push(json!({
            "type": "tool_call_progress",
            "tool_call_id": call_id,
            "tool_name": tool_name,
            "kind": kind,
            "title": title,
            "content": content,
            "raw_input": raw_input,
            "raw_output": Value::Object(raw_output),
            "status": status.as_str(),
            "timestamp": timestamp,
        }));
        records
    }
}

/// Whether backend error text means the referenced session is gone and must be recreated.
pub fn looks_like_session_not_found(error_text: &str) -> bool {
    let lower = error_text.to_lowercase();
    SESSION_NOT_FOUND_MARKERS
        .iter()
        .any(|marker| lower.contains(marker))
}

fn chunk_record(event_type: &str, part: &Map<String, Value>, timestamp: Value) -> Option<Value> {
    let text = part
        .get("text")
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())?;
    Some(json!({
        "type": event_type,
        "content": {"type": "text", "text": text},
        "timestamp": timestamp,
    }))
}

/// Kind bucket as OpenCode's producer reports it. The parser only consults this when the
/// tool name itself does not determine a kind.
fn producer_kind(lower_name: &str, raw_input: Option<&Map<String, Value>>) -> &'static str {
    match lower_name {
        "glob" | "grep" | "websearch" => return "search",
        "read" => return "read",
        "bash" => return "execute",
        "task" => return "task",
        "apply_patch" | "edit" | "write" => return "edit",
        _ => {}
    }

    if let Some(input) = raw_input {
        if input.get("command").is_some_and(Value::is_string) {
            return "execute";
        }
        if input.get("patchText").is_some_and(Value::is_string) {
            return "edit";
        }
        if ["subagent_type", "subagentType"]
            .iter()
            .any(|key| input.get(*key).is_some_and(|v| !v.is_null()))
        {
            return "task";
        }
    }
    "other"
}

/// Content blocks the parser's diff and read extraction understand.
fn tool_content(
    lower_name: &str,
    raw_input: Option<&Map<String, Value>>,
    raw_output: &Map<String, Value>,
) -> Value {
    match lower_name {
        "apply_patch" => {
            let files = raw_output
                .get("metadata")
                .and_then(|metadata| metadata.get("files"))
                .and_then(Value::as_array);
            let blocks: Vec<Value> = files
                .map(Vec::as_slice)
                .unwrap_or_default()
                .iter()
                .filter_map(Value::as_object)
                .map(|file| {
                    let path = ["relativePath", "filePath"]
                        .iter()
                        .find_map(|key| file.get(*key).and_then(Value::as_str));
                    json!({
                        "type": "diff",
                        "path": path,
                        "oldText": file.get("before").and_then(Value::as_str).unwrap_or_default(),
                        "newText": file.get("after").and_then(Value::as_str).unwrap_or_default(),
                    })
                })
                .collect();
            if !blocks.is_empty() {
                return Value::Array(blocks);
            }
            match raw_input.and_then(|input| input.get("path")).and_then(Value::as_str) {
                Some(path) => json!([{"type": "diff", "path": path}]),
                None => Value::Null,
            }
        }
        "read" => match raw_output.get("output").and_then(Value::as_str) {
            Some(text) if !text.is_empty() => json!([{
                "type": "content",
                "content": {"type": "text", "text": text},
            }]),
            _ => Value::Null,
        },
        _ => Value::Null,
    }
}
