use serde_json::{Map, Value};

use crate::packet::{DiffData, ToolKind};
use crate::raw::{str_from_keys, RawPacket, FILE_PATH_KEYS, NEW_TEXT_KEYS, OLD_TEXT_KEYS};
use crate::sanitize::sanitize_path;

fn first_diff_entry<'a>(packet: &RawPacket<'a>) -> Option<&'a Map<String, Value>> {
    packet
        .content_entries()
        .iter()
        .filter_map(Value::as_object)
        .find(|entry| entry.get("type").and_then(Value::as_str) == Some("diff"))
}

/// Old/new text of the first diff entry. File bodies are user content and are never
/// sanitized. A record without a diff entry yields an empty new-file diff.
pub(crate) fn extract_diff(packet: &RawPacket<'_>) -> DiffData {
    let Some(entry) = first_diff_entry(packet) else {
        return DiffData::default();
    };
    DiffData::new(
        raw_text_from_keys(entry, OLD_TEXT_KEYS),
        raw_text_from_keys(entry, NEW_TEXT_KEYS),
    )
}

// Unlike `str_from_keys`, whitespace is significant here.
fn raw_text_from_keys<'a>(entry: &'a Map<String, Value>, keys: &[&str]) -> &'a str {
    keys.iter()
        .find_map(|key| entry.get(*key).and_then(Value::as_str))
        .unwrap_or_default()
}

/// Session-relative file path for read/edit tools.
///
/// Source priority: structured input path, diff entry path, ACP `locations`, then a
/// path-looking token in the title.
pub(crate) fn extract_file_path(packet: &RawPacket<'_>, kind: ToolKind) -> Option<String> {
    if !matches!(kind, ToolKind::Read | ToolKind::Edit) {
        return None;
    }

    let raw = packet
        .input_str(FILE_PATH_KEYS)
        .or_else(|| first_diff_entry(packet).and_then(|entry| str_from_keys(entry, &["path"])))
        .or_else(|| packet.location_paths().next())
        .or_else(|| packet.title().and_then(path_in_title))?;

    let path = sanitize_path(raw);
    if path.is_empty() {
        None
    } else {
        Some(path)
    }
}

fn path_in_title(title: &str) -> Option<&str> {
    let tokens = || {
        title
            .split_whitespace()
            .map(|token| token.trim_matches(|c: char| matches!(c, '"' | '\'' | '`' | ',' | ':')))
            .filter(|token| !token.is_empty())
    };
    tokens()
        .find(|token| token.contains('/'))
        .or_else(|| tokens().find(|token| looks_like_file_name(token)))
}

fn looks_like_file_name(token: &str) -> bool {
    let Some((stem, ext)) = token.rsplit_once('.') else {
        return false;
    };
    !stem.is_empty()
        && (1..=8).contains(&ext.len())
        && ext.chars().all(|c| c.is_ascii_alphanumeric())
        && ext.chars().any(|c| c.is_ascii_alphabetic())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn diff_entry_drives_new_file_flag() {
        let value = json!({
            "content": [
                {"type": "content", "content": {"type": "text", "text": "noise"}},
                {"type": "diff", "path": "/workspace/sessions/ab/outputs/a.py", "oldText": "", "newText": "print(1)\n"}
            ]
        });
        let diff = extract_diff(&RawPacket::new(&value));
        assert_eq!(diff.old_text(), "");
        assert_eq!(diff.new_text(), "print(1)\n");
        assert!(diff.is_new_file());

        let value = json!({"content": [{"type": "diff", "old_text": "a", "new_text": "b"}]});
        let diff = extract_diff(&RawPacket::new(&value));
        assert!(!diff.is_new_file());
    }

    #[test]
    fn missing_diff_is_empty_new_file() {
        let value = json!({"content": "not an array"});
        assert_eq!(extract_diff(&RawPacket::new(&value)), DiffData::default());
    }

    #[test]
    fn file_path_prefers_structured_input() {
        let value = json!({
            "raw_input": {"filePath": "/workspace/sessions/BBB/outputs/web/page.tsx"},
            "content": [{"type": "diff", "path": "/elsewhere/x/y/z.txt"}]
        });
        assert_eq!(
            extract_file_path(&RawPacket::new(&value), ToolKind::Edit).as_deref(),
            Some("outputs/web/page.tsx")
        );
    }

    #[test]
    fn file_path_falls_back_to_diff_then_locations_then_title() {
        let value = json!({"content": [{"type": "diff", "path": "/workspace/sessions/ab/outputs/x.md"}]});
        assert_eq!(
            extract_file_path(&RawPacket::new(&value), ToolKind::Edit).as_deref(),
            Some("outputs/x.md")
        );

        let value = json!({"locations": [{"path": "/workspace/sessions/ab/files/data.csv"}]});
        assert_eq!(
            extract_file_path(&RawPacket::new(&value), ToolKind::Read).as_deref(),
            Some("files/data.csv")
        );

        let value = json!({"title": "Read `/workspace/sessions/ab/outputs/notes.md`"});
        assert_eq!(
            extract_file_path(&RawPacket::new(&value), ToolKind::Read).as_deref(),
            Some("outputs/notes.md")
        );

        let value = json!({"title": "Edit page.tsx"});
        assert_eq!(
            extract_file_path(&RawPacket::new(&value), ToolKind::Edit).as_deref(),
            Some("page.tsx")
        );

        let value = json!({"title": "Editing file"});
        assert_eq!(extract_file_path(&RawPacket::new(&value), ToolKind::Edit), None);
    }

    #[test]
    fn file_path_is_only_extracted_for_read_and_edit() {
        let value = json!({"raw_input": {"path": "/workspace/sessions/ab/outputs"}});
        assert_eq!(extract_file_path(&RawPacket::new(&value), ToolKind::Search), None);
    }
}
