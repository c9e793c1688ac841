use std::error::Error;

use serde_json::Value;

use crate::error::AdapterErrorCode;

/// One non-blank input line with any trailing `\r` removed.
pub struct LineInput<'a> {
    pub line: &'a str,
    /// Already-decoded JSON for the line, present when raw JSON capture is on.
    pub json_capture: Option<&'a Value>,
}

impl LineInput<'_> {
    /// Decodes the line, reusing the captured JSON when available.
    pub fn json(&self) -> Result<Value, serde_json::Error> {
        match self.json_capture {
            Some(value) => Ok(value.clone()),
            None => serde_json::from_str(self.line),
        }
    }
}

/// Stateful per-stream parser driven by [`crate::LineIngestor`].
///
/// `Ok(None)` skips the line without producing a record.
pub trait LineParser {
    type Event;
    type Error: ClassifiedParserError;

    fn reset(&mut self);
    fn parse_line(&mut self, input: LineInput<'_>) -> Result<Option<Self::Event>, Self::Error>;
}

pub trait ClassifiedParserError: Error {
    fn code(&self) -> AdapterErrorCode;
    /// Safe to log and surface: must not echo line content.
    fn redacted_summary(&self) -> String;
    fn full_details(&self) -> String;
}
