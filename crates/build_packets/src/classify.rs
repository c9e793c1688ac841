use serde_json::Value;
use tracing::trace;

use crate::packet::{ToolKind, ToolName};
use crate::raw::{RawPacket, SUBAGENT_TYPE_KEYS};

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Classification {
    pub(crate) tool: ToolName,
    pub(crate) kind: ToolKind,
    pub(crate) is_todo: bool,
}

/// Resolves tool identity by name first, then by the shape of the structured input.
///
/// The backend may rewrite a tool's title once it completes ("Created 3 files"), so a record
/// read from history can lack a usable label; the shape fallback keeps both calling paths
/// in agreement.
pub(crate) fn classify(packet: &RawPacket<'_>) -> Classification {
    let label = packet.tool_label();
    let tool = label
        .as_deref()
        .and_then(tool_from_label)
        .or_else(|| {
            let by_shape = tool_from_input_shape(packet);
            if let Some(tool) = by_shape {
                trace!(label = ?label, tool = tool.as_str(), "classified tool by input shape");
            }
            by_shape
        })
        .unwrap_or(ToolName::Unknown);

    let kind = match default_kind(tool) {
        ToolKind::Other => packet
            .backend_kind()
            .as_deref()
            .and_then(kind_from_backend)
            .unwrap_or(ToolKind::Other),
        kind => kind,
    };

    Classification {
        tool,
        kind,
        is_todo: tool == ToolName::TodoWrite,
    }
}

fn tool_from_label(label: &str) -> Option<ToolName> {
    let tool = match label {
        "glob" => ToolName::Glob,
        "grep" => ToolName::Grep,
        "read" => ToolName::Read,
        "write" => ToolName::Write,
        "edit" | "multiedit" | "apply_patch" => ToolName::Edit,
        "bash" => ToolName::Bash,
        "task" => ToolName::Task,
        "todowrite" | "todo_write" => ToolName::TodoWrite,
        "webfetch" | "web_fetch" => ToolName::WebFetch,
        "websearch" | "web_search" => ToolName::WebSearch,
        _ => return None,
    };
    Some(tool)
}

fn tool_from_input_shape(packet: &RawPacket<'_>) -> Option<ToolName> {
    let input = packet.raw_input()?;
    if SUBAGENT_TYPE_KEYS
        .iter()
        .any(|key| input.get(*key).is_some_and(|v| !v.is_null()))
    {
        return Some(ToolName::Task);
    }
    if matches!(input.get("todos"), Some(Value::Array(_))) {
        return Some(ToolName::TodoWrite);
    }
    None
}

pub(crate) fn default_kind(tool: ToolName) -> ToolKind {
    match tool {
        ToolName::Glob | ToolName::Grep | ToolName::WebSearch => ToolKind::Search,
        ToolName::Read => ToolKind::Read,
        ToolName::Write | ToolName::Edit => ToolKind::Edit,
        ToolName::Bash => ToolKind::Execute,
        ToolName::Task => ToolKind::Task,
        ToolName::TodoWrite | ToolName::WebFetch | ToolName::Unknown => ToolKind::Other,
    }
}

fn kind_from_backend(kind: &str) -> Option<ToolKind> {
    let kind = match kind {
        "search" => ToolKind::Search,
        "read" => ToolKind::Read,
        "execute" => ToolKind::Execute,
        "edit" => ToolKind::Edit,
        "task" => ToolKind::Task,
        _ => return None,
    };
    trace!(kind = kind.as_str(), "using backend-supplied tool kind");
    Some(kind)
}
