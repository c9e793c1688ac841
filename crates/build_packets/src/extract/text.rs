use serde_json::Value;

use crate::raw::RawPacket;

/// Text of a message or thinking chunk.
///
/// `content` may be a bare string, a `{type: "text", text}` block, or an array of blocks.
/// Older records carry the text at the top level as `text` or `delta`. Whitespace is
/// preserved since chunks are concatenated by the consumer.
pub(crate) fn chunk_text(packet: &RawPacket<'_>) -> String {
    if let Some(text) = packet.get("content").and_then(text_of) {
        return text;
    }
    ["text", "delta"]
        .iter()
        .find_map(|key| packet.get(key).and_then(text_of))
        .unwrap_or_default()
}

fn text_of(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => Some(text.clone()),
        Value::Object(block) => block
            .get("text")
            .and_then(Value::as_str)
            .map(str::to_string)
            .or_else(|| block.get("content").and_then(text_of)),
        Value::Array(blocks) => {
            let parts: Vec<String> = blocks.iter().filter_map(text_of).collect();
            if parts.is_empty() {
                None
            } else {
                Some(parts.concat())
            }
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn text(value: serde_json::Value) -> String {
        chunk_text(&RawPacket::new(&value))
    }

    #[test]
    fn accepts_string_block_and_array_content() {
        assert_eq!(text(json!({"content": "hello "})), "hello ");
        assert_eq!(text(json!({"content": {"type": "text", "text": "hi"}})), "hi");
        assert_eq!(
            text(json!({"content": [{"type": "text", "text": "a"}, {"type": "image", "data": "..."}, "b"]})),
            "ab"
        );
    }

    #[test]
    fn falls_back_to_top_level_fields() {
        assert_eq!(text(json!({"text": "direct"})), "direct");
        assert_eq!(text(json!({"delta": {"text": "streamed"}})), "streamed");
        assert_eq!(text(json!({"content": 42})), "");
        assert_eq!(text(json!(null)), "");
    }
}
