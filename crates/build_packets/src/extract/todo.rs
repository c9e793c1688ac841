use serde_json::Value;

use crate::packet::{TodoItem, TodoStatus};
use crate::raw::{str_from_keys, RawPacket, ACTIVE_FORM_KEYS};
use crate::sanitize::sanitize_text;

/// Full replacement todo list from the tool input. Non-object entries are skipped.
///
/// Item text is freeform and may name session files, so it is sanitized like a command.
pub(crate) fn extract_todos(packet: &RawPacket<'_>) -> Vec<TodoItem> {
    let Some(todos) = packet
        .raw_input()
        .and_then(|input| input.get("todos"))
        .and_then(Value::as_array)
    else {
        return Vec::new();
    };

    todos
        .iter()
        .filter_map(Value::as_object)
        .map(|entry| {
            let content = sanitize_text(str_from_keys(entry, &["content"]).unwrap_or_default());
            let status = str_from_keys(entry, &["status"])
                .map(TodoStatus::from_reported)
                .unwrap_or_default();
            let active_form = str_from_keys(entry, ACTIVE_FORM_KEYS)
                .map(sanitize_text)
                .unwrap_or_else(|| content.clone());
            TodoItem {
                content,
                status,
                active_form,
            }
        })
        .collect()
}
