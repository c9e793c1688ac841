//! Field accessors over a loosely-typed backend record.
//!
//! The live stream and persisted history were written by producers that disagree on field
//! naming. Each logical field has exactly one priority list below; add new aliases there.

use serde_json::{Map, Value};

const EVENT_TAG_KEYS: &[&str] = &["type", "sessionUpdate"];
const TOOL_CALL_ID_KEYS: &[&str] = &["tool_call_id", "toolCallId", "id"];
const TOOL_LABEL_KEYS: &[&str] = &["tool_name", "toolName", "tool"];
const TITLE_KEYS: &[&str] = &["title"];
const KIND_KEYS: &[&str] = &["kind"];
const STATUS_KEYS: &[&str] = &["status"];
const RAW_INPUT_KEYS: &[&str] = &["raw_input", "rawInput", "input"];
const RAW_OUTPUT_KEYS: &[&str] = &["raw_output", "rawOutput"];
const STOP_REASON_KEYS: &[&str] = &["stop_reason", "stopReason"];
const MESSAGE_KEYS: &[&str] = &["message", "error"];

pub(crate) const FILE_PATH_KEYS: &[&str] = &["file_path", "filePath", "path"];
pub(crate) const SUBAGENT_TYPE_KEYS: &[&str] = &["subagent_type", "subagentType"];
pub(crate) const ACTIVE_FORM_KEYS: &[&str] = &["activeForm", "active_form"];
pub(crate) const OLD_TEXT_KEYS: &[&str] = &["oldText", "old_text"];
pub(crate) const NEW_TEXT_KEYS: &[&str] = &["newText", "new_text"];
pub(crate) const SESSION_ID_KEYS: &[&str] = &["sessionId", "sessionID", "session_id"];
pub(crate) const PREVIEW_URL_KEYS: &[&str] = &["preview_url", "previewUrl"];
pub(crate) const ARTIFACT_TYPE_KEYS: &[&str] = &["artifact_type", "artifactType"];
pub(crate) const SEARCH_PATTERN_KEYS: &[&str] = &["pattern", "query"];

/// Borrowed, read-only view over one backend record.
#[derive(Clone, Copy, Debug)]
pub(crate) struct RawPacket<'a> {
    value: &'a Value,
}

impl<'a> RawPacket<'a> {
    pub(crate) fn new(value: &'a Value) -> Self {
        Self { value }
    }

    pub(crate) fn fields(&self) -> Option<&'a Map<String, Value>> {
        self.value.as_object()
    }

    pub(crate) fn get(&self, key: &str) -> Option<&'a Value> {
        self.fields().and_then(|map| map.get(key))
    }

    pub(crate) fn event_tag(&self) -> Option<&'a str> {
        self.fields().and_then(|map| str_from_keys(map, EVENT_TAG_KEYS))
    }

    pub(crate) fn tool_call_id(&self) -> String {
        self.fields()
            .and_then(|map| str_from_keys(map, TOOL_CALL_ID_KEYS))
            .unwrap_or_default()
            .to_string()
    }

    /// Lower-cased tool label. The human-readable title is consulted only when no
    /// tool-name variant is present.
    pub(crate) fn tool_label(&self) -> Option<String> {
        let map = self.fields()?;
        str_from_keys(map, TOOL_LABEL_KEYS)
            .or_else(|| str_from_keys(map, TITLE_KEYS))
            .map(|label| label.to_lowercase())
    }

    pub(crate) fn backend_kind(&self) -> Option<String> {
        self.fields()
            .and_then(|map| str_from_keys(map, KIND_KEYS))
            .map(|kind| kind.to_lowercase())
    }

    pub(crate) fn title(&self) -> Option<&'a str> {
        self.fields().and_then(|map| str_from_keys(map, TITLE_KEYS))
    }

    pub(crate) fn status(&self) -> Option<&'a str> {
        self.fields().and_then(|map| str_from_keys(map, STATUS_KEYS))
    }

    pub(crate) fn stop_reason(&self) -> Option<&'a str> {
        self.fields().and_then(|map| str_from_keys(map, STOP_REASON_KEYS))
    }

    /// Error text from `message`, a string `error`, or `error.message`.
    pub(crate) fn error_message(&self) -> Option<&'a str> {
        let map = self.fields()?;
        str_from_keys(map, MESSAGE_KEYS).or_else(|| {
            map.get("error")
                .and_then(Value::as_object)
                .and_then(|err| str_from_keys(err, &["message"]))
        })
    }

    /// Structured tool input. Only object-shaped inputs are recognized.
    pub(crate) fn raw_input(&self) -> Option<&'a Map<String, Value>> {
        let map = self.fields()?;
        RAW_INPUT_KEYS
            .iter()
            .find_map(|key| map.get(*key).and_then(Value::as_object))
    }

    pub(crate) fn input_str(&self, keys: &[&str]) -> Option<&'a str> {
        self.raw_input().and_then(|input| str_from_keys(input, keys))
    }

    /// Tool output; producers send either an object or a bare string.
    pub(crate) fn raw_output(&self) -> Option<&'a Value> {
        let map = self.fields()?;
        RAW_OUTPUT_KEYS
            .iter()
            .filter_map(|key| map.get(*key))
            .find(|value| !value.is_null())
    }

    /// `raw_output.output`, or the raw output itself when it is a plain string.
    pub(crate) fn output_text(&self) -> Option<&'a str> {
        match self.raw_output()? {
            Value::String(text) => non_blank(text),
            Value::Object(map) => map.get("output").and_then(Value::as_str).and_then(non_blank),
            _ => None,
        }
    }

    /// `raw_output.metadata.output`.
    pub(crate) fn metadata_output(&self) -> Option<&'a str> {
        self.output_metadata()
            .and_then(|metadata| metadata.get("output"))
            .and_then(Value::as_str)
            .and_then(non_blank)
    }

    pub(crate) fn output_metadata(&self) -> Option<&'a Map<String, Value>> {
        self.raw_output()
            .and_then(Value::as_object)
            .and_then(|output| output.get("metadata"))
            .and_then(Value::as_object)
    }

    /// Entries of the structured `content` array; empty when absent or not an array.
    pub(crate) fn content_entries(&self) -> &'a [Value] {
        self.get("content")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// Paths reported in ACP-style `locations` entries.
    pub(crate) fn location_paths(&self) -> impl Iterator<Item = &'a str> {
        self.get("locations")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default()
            .iter()
            .filter_map(|location| location.as_object())
            .filter_map(|location| str_from_keys(location, &["path"]))
    }
}

/// First non-blank string among `keys`, trimmed.
pub(crate) fn str_from_keys<'a>(map: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a str> {
    keys.iter().find_map(|key| {
        map.get(*key)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    })
}

pub(crate) fn non_blank(text: &str) -> Option<&str> {
    if text.trim().is_empty() {
        None
    } else {
        Some(text)
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn snake_case_wins_over_camel_case_and_title_is_last_resort() {
        let value = json!({"tool_name": "Bash", "toolName": "read", "title": "Grep"});
        assert_eq!(RawPacket::new(&value).tool_label().as_deref(), Some("bash"));

        let value = json!({"toolName": "Read", "title": "Grep"});
        assert_eq!(RawPacket::new(&value).tool_label().as_deref(), Some("read"));

        let value = json!({"title": "Created 3 files"});
        assert_eq!(
            RawPacket::new(&value).tool_label().as_deref(),
            Some("created 3 files")
        );
    }

    #[test]
    fn blank_and_mistyped_fields_are_absent() {
        let value = json!({"tool_name": "   ", "tool_call_id": 7, "rawInput": "oops"});
        let packet = RawPacket::new(&value);
        assert_eq!(packet.tool_label(), None);
        assert_eq!(packet.tool_call_id(), "");
        assert!(packet.raw_input().is_none());
        assert!(packet.content_entries().is_empty());
    }

    #[test]
    fn non_object_records_have_no_fields() {
        let value = json!(["not", "a", "record"]);
        let packet = RawPacket::new(&value);
        assert_eq!(packet.event_tag(), None);
        assert_eq!(packet.tool_call_id(), "");
        assert!(packet.raw_output().is_none());
    }

    #[test]
    fn output_accepts_string_or_object() {
        let value = json!({"raw_output": "plain"});
        assert_eq!(RawPacket::new(&value).output_text(), Some("plain"));

        let value = json!({"rawOutput": {"output": "nested", "metadata": {"output": "meta"}}});
        let packet = RawPacket::new(&value);
        assert_eq!(packet.output_text(), Some("nested"));
        assert_eq!(packet.metadata_output(), Some("meta"));
    }

    #[test]
    fn error_message_reads_nested_error_object() {
        let value = json!({"type": "error", "error": {"message": "rate limited"}});
        assert_eq!(RawPacket::new(&value).error_message(), Some("rate limited"));
    }
}
