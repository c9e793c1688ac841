use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use super::content_text;
use crate::packet::{DiffData, ToolKind};
use crate::raw::RawPacket;
use crate::sanitize::sanitize_text;

fn file_body_re() -> &'static Regex {
    static FILE_BODY_RE: OnceLock<Regex> = OnceLock::new();
    FILE_BODY_RE.get_or_init(|| {
        Regex::new(r"(?s)<file>\r?\n?(?P<body>.*?)\r?\n?(?:</file>|\z)")
            .expect("valid file body regex")
    })
}

// Any digit width: producers pad to five digits but long files overflow the padding.
fn line_number_re() -> &'static Regex {
    static LINE_NUMBER_RE: OnceLock<Regex> = OnceLock::new();
    LINE_NUMBER_RE
        .get_or_init(|| Regex::new(r"(?m)^\d+\| ").expect("valid line number regex"))
}

/// Display text for a tool call's result, chosen by kind.
///
/// Infrastructure text is freeform-sanitized; file bodies (read results and edit diffs)
/// are user content and pass through untouched.
pub(crate) fn extract_output(
    packet: &RawPacket<'_>,
    kind: ToolKind,
    diff: Option<&DiffData>,
) -> Option<String> {
    match kind {
        ToolKind::Execute => packet
            .metadata_output()
            .or_else(|| packet.output_text())
            .map(sanitize_text)
            .or_else(|| content_text(packet.content_entries()).map(|text| sanitize_text(&text))),
        ToolKind::Read => read_output(packet),
        ToolKind::Edit => diff
            .map(DiffData::new_text)
            .filter(|text| !text.is_empty())
            .map(str::to_string),
        ToolKind::Search => packet
            .output_text()
            .map(sanitize_text)
            .or_else(|| file_list(packet).map(|list| sanitize_text(&list))),
        // Task results are surfaced through the dedicated task output field.
        ToolKind::Task => None,
        ToolKind::Other => packet
            .output_text()
            .map(sanitize_text)
            .or_else(|| content_text(packet.content_entries()).map(|text| sanitize_text(&text))),
    }
}

fn read_output(packet: &RawPacket<'_>) -> Option<String> {
    let raw = packet
        .raw_output()
        .and_then(Value::as_object)
        .and_then(|output| output.get("content"))
        .and_then(Value::as_str)
        .map(str::to_string)
        .or_else(|| packet.output_text().map(str::to_string))
        .or_else(|| content_text(packet.content_entries()))?;

    match file_body(&raw) {
        Some(body) => Some(body),
        // Not a file body (e.g. "File not found: /workspace/sessions/..."), so it is
        // infrastructure text.
        None => Some(sanitize_text(&raw)),
    }
}

/// Contents of a `<file>...</file>` wrapper with line-number prefixes removed.
fn file_body(raw: &str) -> Option<String> {
    let caps = file_body_re().captures(raw)?;
    let body = caps.name("body").map(|m| m.as_str()).unwrap_or_default();
    Some(line_number_re().replace_all(body, "").into_owned())
}

fn file_list(packet: &RawPacket<'_>) -> Option<String> {
    let output = packet.raw_output()?;
    let files = output
        .as_array()
        .or_else(|| output.get("files").and_then(Value::as_array))
        .or_else(|| {
            packet
                .output_metadata()
                .and_then(|metadata| metadata.get("files"))
                .and_then(Value::as_array)
        })?;

    let names: Vec<&str> = files
        .iter()
        .filter_map(Value::as_str)
        .filter(|name| !name.is_empty())
        .collect();
    if names.is_empty() {
        None
    } else {
        Some(names.join("\n"))
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn output_of(value: serde_json::Value, kind: ToolKind) -> Option<String> {
        extract_output(&RawPacket::new(&value), kind, None)
    }

    #[test]
    fn execute_prefers_metadata_output() {
        let value = json!({
            "raw_output": {
                "output": "top-level",
                "metadata": {"output": "wrote /workspace/sessions/ab12/outputs/a.txt\n"}
            }
        });
        assert_eq!(
            output_of(value, ToolKind::Execute).as_deref(),
            Some("wrote outputs/a.txt\n")
        );

        let value = json!({"rawOutput": {"output": "only top-level"}});
        assert_eq!(output_of(value, ToolKind::Execute).as_deref(), Some("only top-level"));
    }

    #[test]
    fn read_strips_line_numbers_of_any_width() {
        let value = json!({
            "raw_output": {"output": "<file>\n00042| line one\n123456| line two\n</file>"}
        });
        assert_eq!(
            output_of(value, ToolKind::Read).as_deref(),
            Some("line one\nline two")
        );
    }

    #[test]
    fn read_file_body_is_not_sanitized() {
        let value = json!({
            "raw_output": {"output": "<file>\n00001| ROOT=/workspace/sessions/ab12/outputs\n</file>"}
        });
        assert_eq!(
            output_of(value, ToolKind::Read).as_deref(),
            Some("ROOT=/workspace/sessions/ab12/outputs")
        );
    }

    #[test]
    fn read_without_wrapper_is_sanitized_text() {
        let value = json!({"raw_output": "File not found: /workspace/sessions/ab12/outputs/x.md"});
        assert_eq!(
            output_of(value, ToolKind::Read).as_deref(),
            Some("File not found: outputs/x.md")
        );
    }

    #[test]
    fn read_accepts_content_entries_and_unterminated_wrapper() {
        let value = json!({
            "content": [{"type": "content", "content": {"type": "text", "text": "<file>\n00001| only\n"}}]
        });
        assert_eq!(output_of(value, ToolKind::Read).as_deref(), Some("only"));
    }

    #[test]
    fn edit_returns_new_text_verbatim() {
        let value = json!({});
        let diff = DiffData::new("", "path=/workspace/sessions/ab/x\n");
        assert_eq!(
            extract_output(&RawPacket::new(&value), ToolKind::Edit, Some(&diff)).as_deref(),
            Some("path=/workspace/sessions/ab/x\n")
        );
        assert_eq!(
            extract_output(&RawPacket::new(&value), ToolKind::Edit, Some(&DiffData::default())),
            None
        );
    }

    #[test]
    fn search_joins_file_list() {
        let value = json!({
            "raw_output": {"files": ["/workspace/sessions/ab/outputs/a.ts", "/workspace/sessions/ab/outputs/b.ts"]}
        });
        assert_eq!(
            output_of(value, ToolKind::Search).as_deref(),
            Some("outputs/a.ts\noutputs/b.ts")
        );

        let value = json!({"raw_output": {"output": "/workspace/sessions/ab/outputs/a.ts"}});
        assert_eq!(output_of(value, ToolKind::Search).as_deref(), Some("outputs/a.ts"));
    }

    #[test]
    fn task_kind_has_no_generic_output() {
        let value = json!({"raw_output": {"output": "result"}});
        assert_eq!(output_of(value, ToolKind::Task), None);
    }
}
