use crate::packet::{ToolKind, ToolName};
use crate::raw::{RawPacket, SEARCH_PATTERN_KEYS};
use crate::sanitize::sanitize_text;

/// Human-readable title for a tool call. Spacing between the title and any path shown
/// next to it is left to the renderer.
pub(crate) fn tool_title(
    packet: &RawPacket<'_>,
    tool: ToolName,
    kind: ToolKind,
    is_new_file: bool,
) -> String {
    let title = match (tool, kind, is_new_file) {
        (ToolName::TodoWrite, _, _) => "Updating todos",
        (ToolName::Task, _, _) | (_, ToolKind::Task, _) => "Running task",
        (ToolName::Glob, _, _) => "Finding files",
        (ToolName::WebSearch, _, _) => "Searching the web",
        (ToolName::WebFetch, _, _) => "Fetching",
        (_, ToolKind::Search, _) => "Searching",
        (_, ToolKind::Read, _) => "Reading",
        (_, ToolKind::Edit, true) => "Writing",
        (_, ToolKind::Edit, false) => "Editing",
        (_, ToolKind::Execute, _) => "Running",
        (_, ToolKind::Other, _) => {
            return packet
                .title()
                .map(|title| sanitize_text(title).trim_end().to_string())
                .filter(|title| !title.is_empty())
                .unwrap_or_else(|| "Running tool".to_string());
        }
    };
    title.to_string()
}

/// Secondary line shown under the title. `file_path` must already be sanitized.
pub(crate) fn tool_description(
    packet: &RawPacket<'_>,
    kind: ToolKind,
    file_path: Option<&str>,
) -> Option<String> {
    match kind {
        ToolKind::Task | ToolKind::Execute => packet.input_str(&["description"]).map(sanitize_text),
        ToolKind::Read | ToolKind::Edit => file_path.map(str::to_string),
        ToolKind::Search => packet.input_str(SEARCH_PATTERN_KEYS).map(sanitize_text),
        ToolKind::Other => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn edit_title_depends_only_on_new_file() {
        let value = json!({"title": "ignored "});
        let packet = RawPacket::new(&value);
        assert_eq!(tool_title(&packet, ToolName::Write, ToolKind::Edit, true), "Writing");
        assert_eq!(tool_title(&packet, ToolName::Write, ToolKind::Edit, false), "Editing");
        assert_eq!(tool_title(&packet, ToolName::Edit, ToolKind::Edit, true), "Writing");
        assert_eq!(tool_title(&packet, ToolName::Unknown, ToolKind::Edit, false), "Editing");
    }

    #[test]
    fn other_kind_uses_sanitized_backend_title_without_trailing_space() {
        let value = json!({"title": "Opened /workspace/sessions/ab/outputs/index.html  "});
        let packet = RawPacket::new(&value);
        assert_eq!(
            tool_title(&packet, ToolName::Unknown, ToolKind::Other, true),
            "Opened outputs/index.html"
        );

        let value = json!({});
        let packet = RawPacket::new(&value);
        assert_eq!(
            tool_title(&packet, ToolName::Unknown, ToolKind::Other, true),
            "Running tool"
        );
    }

    #[test]
    fn titles_never_end_in_whitespace() {
        let value = json!({"title": "x "});
        let packet = RawPacket::new(&value);
        let tools = [
            ToolName::Glob,
            ToolName::Grep,
            ToolName::Read,
            ToolName::Write,
            ToolName::Edit,
            ToolName::Bash,
            ToolName::Task,
            ToolName::TodoWrite,
            ToolName::WebFetch,
            ToolName::WebSearch,
            ToolName::Unknown,
        ];
        for tool in tools {
            let kind = crate::classify::default_kind(tool);
            for is_new_file in [true, false] {
                let title = tool_title(&packet, tool, kind, is_new_file);
                assert_eq!(title, title.trim_end(), "tool: {tool:?}");
            }
        }
    }

    #[test]
    fn description_source_depends_on_kind() {
        let value = json!({
            "raw_input": {
                "description": "Build in /workspace/sessions/ab/outputs/web",
                "pattern": "**/*.tsx"
            }
        });
        let packet = RawPacket::new(&value);
        assert_eq!(
            tool_description(&packet, ToolKind::Execute, None).as_deref(),
            Some("Build in outputs/web")
        );
        assert_eq!(
            tool_description(&packet, ToolKind::Read, Some("outputs/a.md")).as_deref(),
            Some("outputs/a.md")
        );
        assert_eq!(
            tool_description(&packet, ToolKind::Search, None).as_deref(),
            Some("**/*.tsx")
        );
        assert_eq!(tool_description(&packet, ToolKind::Other, None), None);
    }
}
