use crate::error::ErrorDetailSink;

/// Which raw forms of an input line to keep alongside the parsed event.
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum CaptureRaw {
    #[default]
    None,
    Line,
    Json,
    Both,
}

impl CaptureRaw {
    pub(crate) fn wants_line(self) -> bool {
        matches!(self, CaptureRaw::Line | CaptureRaw::Both)
    }

    pub(crate) fn wants_json(self) -> bool {
        matches!(self, CaptureRaw::Json | CaptureRaw::Both)
    }
}

/// Whether full (possibly sensitive) parser error details reach the [`ErrorDetailSink`].
#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub enum ErrorDetailCapture {
    #[default]
    RedactedSummaryOnly,
    FullDetails,
}

#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct IngestLimits {
    /// Lines longer than this are discarded and reported as `LineTooLong`.
    pub max_line_bytes: usize,
    /// Total bytes of raw capture kept across the whole stream. `None` is unbounded.
    pub max_raw_bytes_total: Option<usize>,
}

impl Default for IngestLimits {
    fn default() -> Self {
        Self {
            max_line_bytes: 64 * 1024,
            max_raw_bytes_total: None,
        }
    }
}

#[derive(Default)]
pub struct IngestConfig {
    pub limits: IngestLimits,
    pub capture_raw: CaptureRaw,
    pub error_detail_capture: ErrorDetailCapture,
    pub error_sink: Option<Box<dyn ErrorDetailSink>>,
}

impl IngestConfig {
    pub fn with_max_line_bytes(mut self, max_line_bytes: usize) -> Self {
        self.limits.max_line_bytes = max_line_bytes;
        self
    }

    pub fn with_capture_raw(mut self, capture_raw: CaptureRaw) -> Self {
        self.capture_raw = capture_raw;
        self
    }

    /// Routes full parser error details to `sink`.
    pub fn with_error_sink(mut self, sink: impl ErrorDetailSink) -> Self {
        self.error_detail_capture = ErrorDetailCapture::FullDetails;
        self.error_sink = Some(Box::new(sink));
        self
    }
}

impl std::fmt::Debug for IngestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IngestConfig")
            .field("limits", &self.limits)
            .field("capture_raw", &self.capture_raw)
            .field("error_detail_capture", &self.error_detail_capture)
            .field("error_sink", &self.error_sink.is_some())
            .finish()
    }
}
