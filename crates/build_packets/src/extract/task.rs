use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::content_text;
use crate::packet::{ToolName, ToolStatus};
use crate::raw::{str_from_keys, RawPacket, SESSION_ID_KEYS};
use crate::sanitize::sanitize_text;

fn task_metadata_re() -> &'static Regex {
    static TASK_METADATA_RE: OnceLock<Regex> = OnceLock::new();
    TASK_METADATA_RE.get_or_init(|| {
        Regex::new(r"(?s)<task_metadata>.*?</task_metadata>").expect("valid task metadata regex")
    })
}

/// Final answer of a completed sub-agent task, without its `<task_metadata>` trailer.
pub(crate) fn extract_task_output(
    packet: &RawPacket<'_>,
    tool: ToolName,
    status: ToolStatus,
) -> Option<String> {
    if tool != ToolName::Task || status != ToolStatus::Completed {
        return None;
    }
    let raw = packet
        .output_text()
        .map(str::to_string)
        .or_else(|| content_text(packet.content_entries()))?;
    strip_task_metadata(&raw).map(|text| sanitize_text(&text))
}

/// Removes every balanced metadata region. An opening tag without its closing tag is left
/// in place rather than truncating whatever follows it.
fn strip_task_metadata(raw: &str) -> Option<String> {
    let stripped = task_metadata_re().replace_all(raw, "");
    let trimmed = stripped.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

pub(crate) fn extract_task_prompt(packet: &RawPacket<'_>) -> Option<String> {
    packet.input_str(&["prompt"]).map(sanitize_text)
}

/// Session id of the child session a task spawned, when the backend reports one.
pub(crate) fn extract_task_session_id(packet: &RawPacket<'_>) -> Option<String> {
    let output = packet.raw_output().and_then(Value::as_object);
    output
        .and_then(|output| str_from_keys(output, SESSION_ID_KEYS))
        .or_else(|| {
            packet
                .output_metadata()
                .and_then(|metadata| str_from_keys(metadata, SESSION_ID_KEYS))
        })
        .map(str::to_string)
}
