use serde_json::Value;
use thiserror::Error;

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub enum AdapterErrorCode {
    /// The line is not valid JSON.
    JsonParse,
    /// Valid JSON that could not be turned into packets.
    Normalize,
    /// JSON of the wrong shape, e.g. an array where a record object is expected.
    TypedParse,
    Unknown,
}

impl AdapterErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            AdapterErrorCode::JsonParse => "json_parse",
            AdapterErrorCode::Normalize => "normalize",
            AdapterErrorCode::TypedParse => "typed_parse",
            AdapterErrorCode::Unknown => "unknown",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRaw {
    pub line: Option<String>,
    pub json: Option<Value>,
}

/// Per-line failure. Summaries never contain the raw line text.
#[derive(Debug, Error, Clone, Eq, PartialEq)]
pub enum LineRecordError {
    #[error("I/O error while reading backend output")]
    Io,
    #[error("invalid UTF-8 in backend output")]
    InvalidUtf8,
    #[error("line too long (observed_bytes={observed_bytes}, max_line_bytes={max_line_bytes})")]
    LineTooLong {
        observed_bytes: usize,
        max_line_bytes: usize,
    },
    #[error("adapter parse failure ({}): {summary}", .code.as_str())]
    Adapter {
        code: AdapterErrorCode,
        summary: String,
    },
}

impl LineRecordError {
    /// Whether reading can usefully continue after this error.
    pub fn is_fatal(&self) -> bool {
        matches!(self, LineRecordError::Io)
    }
}

#[derive(Debug, Clone)]
pub struct LineRecord<T> {
    /// 1-based line number in the input, counting blank lines.
    pub line_number: usize,
    pub captured_raw: Option<CapturedRaw>,
    pub outcome: Result<T, LineRecordError>,
}

#[derive(Debug, Clone)]
pub struct ErrorDetail {
    pub line_number: usize,
    pub code: AdapterErrorCode,
    pub adapter: &'static str,
    pub details: String,
}

pub trait ErrorDetailSink: Send + 'static {
    fn on_error(&mut self, detail: ErrorDetail);
}

impl<F> ErrorDetailSink for F
where
    F: FnMut(ErrorDetail) + Send + 'static,
{
    fn on_error(&mut self, detail: ErrorDetail) {
        self(detail)
    }
}
