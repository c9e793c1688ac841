use serde_json::Value;
use tracing::debug;

use crate::classify::classify;
use crate::extract::{
    chunk_text, extract_diff, extract_file_path, extract_output, extract_task_output,
    extract_task_prompt, extract_task_session_id, extract_todos, tool_description, tool_title,
};
use crate::packet::{
    Artifact, ArtifactCreated, ErrorPacket, ParsedPacket, PromptResponse, TextChunk,
    ThinkingChunk, ToolCallProgress, ToolCallStart, ToolKind, ToolName, ToolStatus,
};
use crate::raw::{str_from_keys, RawPacket, ARTIFACT_TYPE_KEYS, PREVIEW_URL_KEYS, SUBAGENT_TYPE_KEYS};
use crate::sanitize::{sanitize_path, sanitize_text};

/// Message for an `error` record that carries none, matching what the backend itself
/// substitutes for a message-less ACP error.
const DEFAULT_ERROR_MESSAGE: &str = "Unknown error";

/// Normalizes one backend record into exactly one [`ParsedPacket`].
///
/// This is the only entry point into classification, extraction, and path sanitization, so
/// live-stream and history consumers cannot diverge. Malformed or partially shaped input
/// never fails: missing fields degrade to empty defaults and unrecognized records become
/// [`ParsedPacket::Unknown`].
///
/// ```
/// use build_packets::{parse, ParsedPacket};
/// use serde_json::json;
///
/// let packet = parse(&json!({
///     "type": "tool_call_progress",
///     "tool_name": "bash",
///     "raw_input": {"command": "cd /workspace/sessions/ab12/outputs && ls"}
/// }));
/// match packet {
///     ParsedPacket::ToolCallProgress(progress) => {
///         assert_eq!(progress.command.as_deref(), Some("cd outputs && ls"));
///     }
///     other => panic!("unexpected packet: {other:?}"),
/// }
/// ```
pub fn parse(record: &Value) -> ParsedPacket {
    let packet = RawPacket::new(record);
    let Some(tag) = packet.event_tag() else {
        debug!("record has no event type");
        return ParsedPacket::Unknown;
    };

    match tag {
        "agent_message_chunk" | "agent_message" | "message" | "text" | "text_delta"
        | "output_delta" => ParsedPacket::TextChunk(TextChunk {
            text: chunk_text(&packet),
        }),
        "agent_thought_chunk" | "thought" | "thinking" | "thinking_delta" | "reasoning"
        | "step_delta" => ParsedPacket::ThinkingChunk(ThinkingChunk {
            text: chunk_text(&packet),
        }),
        "tool_call_start" | "tool_call" | "tool_start" => {
            ParsedPacket::ToolCallStart(tool_call_start(&packet))
        }
        "tool_call_progress" | "tool_call_update" | "tool_progress" => {
            ParsedPacket::ToolCallProgress(tool_call_progress(&packet))
        }
        "prompt_response" | "done" => ParsedPacket::PromptResponse(PromptResponse {
            stop_reason: packet.stop_reason().map(str::to_string),
        }),
        "artifact_created" => ParsedPacket::ArtifactCreated(ArtifactCreated {
            artifact: artifact(&packet),
        }),
        "error" => ParsedPacket::Error(ErrorPacket {
            message: packet
                .error_message()
                .unwrap_or(DEFAULT_ERROR_MESSAGE)
                .to_string(),
        }),
        other => {
            debug!(event_type = other, "unrecognized packet type");
            ParsedPacket::Unknown
        }
    }
}

fn status(packet: &RawPacket<'_>) -> ToolStatus {
    packet
        .status()
        .map(ToolStatus::from_reported)
        .unwrap_or_default()
}

fn tool_call_start(packet: &RawPacket<'_>) -> ToolCallStart {
    let classification = classify(packet);
    ToolCallStart {
        tool_call_id: packet.tool_call_id(),
        tool_name: classification.tool,
        kind: classification.kind,
        status: status(packet),
        is_todo: classification.is_todo,
    }
}

fn tool_call_progress(packet: &RawPacket<'_>) -> ToolCallProgress {
    let classification = classify(packet);
    let (tool, kind) = (classification.tool, classification.kind);
    let status = status(packet);

    let diff = (kind == ToolKind::Edit).then(|| extract_diff(packet));
    // A call without a diff yet has not touched an existing file as far as we can tell.
    let is_new_file = diff.as_ref().map_or(true, |diff| diff.is_new_file());
    let file_path = extract_file_path(packet, kind);
    let is_task = tool == ToolName::Task;

    ToolCallProgress {
        tool_call_id: packet.tool_call_id(),
        tool_name: tool,
        kind,
        status,
        is_todo: classification.is_todo,
        title: tool_title(packet, tool, kind, is_new_file),
        description: tool_description(packet, kind, file_path.as_deref()),
        command: (kind == ToolKind::Execute)
            .then(|| packet.input_str(&["command"]).map(sanitize_text))
            .flatten(),
        output: extract_output(packet, kind, diff.as_ref()),
        todos: if classification.is_todo {
            extract_todos(packet)
        } else {
            Vec::new()
        },
        subagent_type: is_task
            .then(|| packet.input_str(SUBAGENT_TYPE_KEYS).map(str::to_string))
            .flatten(),
        task_prompt: is_task.then(|| extract_task_prompt(packet)).flatten(),
        task_output: extract_task_output(packet, tool, status),
        task_session_id: is_task.then(|| extract_task_session_id(packet)).flatten(),
        file_path,
        diff,
    }
}

fn artifact(packet: &RawPacket<'_>) -> Artifact {
    let nested = packet.get("artifact").and_then(Value::as_object);
    let field = |keys: &[&str]| -> Option<String> {
        nested
            .and_then(|artifact| str_from_keys(artifact, keys))
            .or_else(|| packet.fields().and_then(|map| str_from_keys(map, keys)))
            .map(str::to_string)
    };
    let artifact_type = nested
        .and_then(|artifact| str_from_keys(artifact, &["type"]))
        .map(str::to_string)
        .or_else(|| field(ARTIFACT_TYPE_KEYS))
        .unwrap_or_default();

    Artifact {
        id: field(&["id"]).unwrap_or_default(),
        artifact_type,
        name: field(&["name"]).unwrap_or_default(),
        path: field(&["path"])
            .map(|path| sanitize_path(&path))
            .unwrap_or_default(),
        preview_url: field(PREVIEW_URL_KEYS),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn missing_type_is_unknown() {
        assert!(parse(&json!({"text": "orphan"})).is_unknown());
        assert!(parse(&json!("just a string")).is_unknown());
        assert!(parse(&json!({"type": 5})).is_unknown());
    }

    #[test]
    fn acp_session_update_tag_is_accepted() {
        let packet = parse(&json!({
            "sessionUpdate": "agent_thought_chunk",
            "content": {"type": "text", "text": "pondering"}
        }));
        assert_eq!(
            packet,
            ParsedPacket::ThinkingChunk(ThinkingChunk {
                text: "pondering".to_string()
            })
        );
    }

    #[test]
    fn error_without_message_gets_default() {
        assert_eq!(
            parse(&json!({"type": "error"})),
            ParsedPacket::Error(ErrorPacket {
                message: "Unknown error".to_string()
            })
        );
        assert_eq!(
            parse(&json!({"type": "error", "message": "   "})),
            ParsedPacket::Error(ErrorPacket {
                message: DEFAULT_ERROR_MESSAGE.to_string()
            })
        );
    }

    #[test]
    fn top_level_artifact_fields_are_read() {
        let packet = parse(&json!({
            "type": "artifact_created",
            "id": "art-1",
            "artifact_type": "markdown",
            "name": "report.md",
            "path": "/workspace/sessions/ab/outputs/report.md"
        }));
        let ParsedPacket::ArtifactCreated(created) = packet else {
            panic!("expected artifact");
        };
        assert_eq!(created.artifact.id, "art-1");
        assert_eq!(created.artifact.artifact_type, "markdown");
        assert_eq!(created.artifact.path, "outputs/report.md");
        assert_eq!(created.artifact.preview_url, None);
    }
}
