use build_packets::opencode::OpenCodeTranslator;
use build_packets::{parse, ParsedPacket};
use serde_json::Value;

use crate::error::{AdapterErrorCode, CapturedRaw};
use crate::line_parser::{ClassifiedParserError, LineInput, LineParser};
use crate::normalized::{NormalizedPackets, PacketSource};

/// Parses backend records, one JSON object per line, into [`ParsedPacket`]s.
#[derive(Debug, Clone, Default)]
pub struct PacketLineParser {
    skip_unknown: bool,
}

impl PacketLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    /// Drops [`ParsedPacket::Unknown`] instead of yielding it.
    pub fn skip_unknown(mut self, skip: bool) -> Self {
        self.skip_unknown = skip;
        self
    }
}

/// Translates raw OpenCode events and parses the resulting backend records.
///
/// One line can yield several packets (a first `tool_use` sighting yields a start and a
/// progress packet), so the event type is [`ParsedPackets`].
#[derive(Debug, Clone, Default)]
pub struct OpenCodeLineParser {
    translator: OpenCodeTranslator,
    skip_unknown: bool,
}

impl OpenCodeLineParser {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn skip_unknown(mut self, skip: bool) -> Self {
        self.skip_unknown = skip;
        self
    }

    pub fn translator(&self) -> &OpenCodeTranslator {
        &self.translator
    }
}

/// All packets produced by one input line, in order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ParsedPackets(pub Vec<ParsedPacket>);

impl IntoIterator for ParsedPackets {
    type Item = ParsedPacket;
    type IntoIter = std::vec::IntoIter<ParsedPacket>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{redacted}")]
pub struct PacketLineParserError {
    code: AdapterErrorCode,
    redacted: String,
    details: String,
}

impl ClassifiedParserError for PacketLineParserError {
    fn code(&self) -> AdapterErrorCode {
        self.code
    }

    fn redacted_summary(&self) -> String {
        self.redacted.clone()
    }

    fn full_details(&self) -> String {
        self.details.clone()
    }
}

impl LineParser for PacketLineParser {
    type Event = ParsedPacket;
    type Error = PacketLineParserError;

    fn reset(&mut self) {}

    fn parse_line(&mut self, input: LineInput<'_>) -> Result<Option<Self::Event>, Self::Error> {
        let record = decode_object(&input)?;
        let packet = parse(&record);
        if self.skip_unknown && packet.is_unknown() {
            return Ok(None);
        }
        Ok(Some(packet))
    }
}

impl LineParser for OpenCodeLineParser {
    type Event = ParsedPackets;
    type Error = PacketLineParserError;

    fn reset(&mut self) {
        self.translator.reset();
    }

    fn parse_line(&mut self, input: LineInput<'_>) -> Result<Option<Self::Event>, Self::Error> {
        let event = decode_object(&input)?;
        let packets: Vec<ParsedPacket> = self
            .translator
            .translate(&event)
            .iter()
            .map(parse)
            .filter(|packet| !(self.skip_unknown && packet.is_unknown()))
            .collect();
        if packets.is_empty() {
            return Ok(None);
        }
        Ok(Some(ParsedPackets(packets)))
    }
}

pub fn normalize_backend_packet(
    line_number: usize,
    captured_raw: Option<CapturedRaw>,
    packet: ParsedPacket,
) -> NormalizedPackets<ParsedPacket> {
    NormalizedPackets::from_line(line_number, PacketSource::Backend, captured_raw, [packet])
}

pub fn normalize_opencode_packets(
    line_number: usize,
    captured_raw: Option<CapturedRaw>,
    packets: ParsedPackets,
) -> NormalizedPackets<ParsedPacket> {
    NormalizedPackets::from_line(line_number, PacketSource::OpenCode, captured_raw, packets)
}

fn decode_object(input: &LineInput<'_>) -> Result<Value, PacketLineParserError> {
    let value = input.json().map_err(|err| PacketLineParserError {
        code: AdapterErrorCode::JsonParse,
        redacted: format!(
            "invalid JSON at column {} ({:?})",
            err.column(),
            err.classify()
        ),
        details: format!("{err}: {}", input.line),
    })?;
    if !value.is_object() {
        return Err(PacketLineParserError {
            code: AdapterErrorCode::TypedParse,
            redacted: format!("expected a JSON object, got {}", json_kind(&value)),
            details: format!("expected a JSON object: {}", input.line),
        });
    }
    Ok(value)
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn input(line: &str) -> LineInput<'_> {
        LineInput {
            line,
            json_capture: None,
        }
    }

    #[test]
    fn json_errors_do_not_echo_the_line() {
        let mut parser = PacketLineParser::new();
        let err = parser
            .parse_line(input("{\"type\": \"text\", \"secret\": /home/me"))
            .unwrap_err();
        assert_eq!(err.code(), AdapterErrorCode::JsonParse);
        assert!(!err.redacted_summary().contains("/home/me"));
        assert!(err.full_details().contains("/home/me"));
    }

    #[test]
    fn non_object_records_are_typed_parse_errors() {
        let mut parser = PacketLineParser::new();
        let err = parser.parse_line(input("[1, 2]")).unwrap_err();
        assert_eq!(err.code(), AdapterErrorCode::TypedParse);
        assert_eq!(err.redacted_summary(), "expected a JSON object, got array");
    }

    #[test]
    fn unknown_packets_can_be_skipped() {
        let line = r#"{"type": "heartbeat"}"#;
        let mut keep = PacketLineParser::new();
        assert_eq!(keep.parse_line(input(line)).unwrap(), Some(ParsedPacket::Unknown));

        let mut skip = PacketLineParser::new().skip_unknown(true);
        assert_eq!(skip.parse_line(input(line)).unwrap(), None);
    }

    #[test]
    fn opencode_parser_resets_translator_state() {
        let line = r#"{"type":"tool_use","sessionID":"ses_1","part":{"callID":"c1","tool":"bash","state":{"status":"running","input":{"command":"ls"}}}}"#;
        let mut parser = OpenCodeLineParser::new();
        let first = parser.parse_line(input(line)).unwrap().unwrap();
        assert_eq!(first.0.len(), 2);
        assert_eq!(parser.translator().session_id(), Some("ses_1"));

        let again = parser.parse_line(input(line)).unwrap().unwrap();
        assert_eq!(again.0.len(), 1);

        parser.reset();
        assert_eq!(parser.translator().session_id(), None);
        let after_reset = parser.parse_line(input(line)).unwrap().unwrap();
        assert_eq!(after_reset.0.len(), 2);
    }
}
