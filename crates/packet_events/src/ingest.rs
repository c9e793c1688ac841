use std::io::Read;

use serde_json::Value;
use tracing::debug;

use crate::config::{CaptureRaw, ErrorDetailCapture, IngestConfig};
use crate::error::{AdapterErrorCode, CapturedRaw, ErrorDetail, LineRecord, LineRecordError};
use crate::line_parser::{ClassifiedParserError, LineInput, LineParser};
use crate::reader::{BoundedLine, SyncBoundedLineReader};

/// Byte allowance shared by every raw capture of one stream.
#[derive(Debug, Clone, Copy)]
pub struct RawCaptureBudget {
    remaining_bytes: Option<usize>,
}

impl RawCaptureBudget {
    pub fn new(limit: Option<usize>) -> Self {
        Self {
            remaining_bytes: limit,
        }
    }

    /// Spends `bytes` if they fit; a capture that does not fit is skipped whole.
    fn try_spend(&mut self, bytes: usize) -> bool {
        match self.remaining_bytes {
            None => true,
            Some(remaining) if bytes <= remaining => {
                self.remaining_bytes = Some(remaining - bytes);
                true
            }
            Some(_) => false,
        }
    }
}

/// Iterator of [`LineRecord`]s over a reader.
///
/// Blank lines and lines the parser skips produce nothing. Every other line yields exactly
/// one record, in input order.
pub struct LineIngestor<R: Read, P: LineParser> {
    reader: SyncBoundedLineReader<R>,
    parser: P,
    config: IngestConfig,
    budget: RawCaptureBudget,
    adapter_name: &'static str,
}

impl<R: Read, P: LineParser> LineIngestor<R, P> {
    pub fn new(reader: R, parser: P, config: IngestConfig, adapter_name: &'static str) -> Self {
        let budget = RawCaptureBudget::new(config.limits.max_raw_bytes_total);
        Self {
            reader: SyncBoundedLineReader::new(reader, config.limits.max_line_bytes),
            parser,
            config,
            budget,
            adapter_name,
        }
    }

    pub fn parser(&self) -> &P {
        &self.parser
    }

    pub fn into_parser(self) -> P {
        self.parser
    }

    fn failed<T>(line_number: usize, err: LineRecordError) -> LineRecord<T> {
        LineRecord {
            line_number,
            captured_raw: None,
            outcome: Err(err),
        }
    }

    fn capture_raw(&mut self, line: &str) -> Option<CapturedRaw> {
        let capture = self.config.capture_raw;
        if capture == CaptureRaw::None {
            return None;
        }

        let line_capture = if capture.wants_line() && self.budget.try_spend(line.len()) {
            Some(line.to_string())
        } else {
            None
        };
        let json_capture = if capture.wants_json() {
            serde_json::from_str::<Value>(line).ok().filter(|value| {
                serde_json::to_vec(value)
                    .map(|encoded| self.budget.try_spend(encoded.len()))
                    .unwrap_or(false)
            })
        } else {
            None
        };

        if line_capture.is_none() && json_capture.is_none() {
            return None;
        }
        Some(CapturedRaw {
            line: line_capture,
            json: json_capture,
        })
    }

    fn adapter_failure<T>(&mut self, line_number: usize, err: &P::Error) -> LineRecord<T> {
        let code: AdapterErrorCode = err.code();
        let summary = err.redacted_summary();
        debug!(
            adapter = self.adapter_name,
            line_number,
            code = code.as_str(),
            %summary,
            "line rejected by adapter"
        );
        if self.config.error_detail_capture == ErrorDetailCapture::FullDetails {
            if let Some(sink) = self.config.error_sink.as_mut() {
                sink.on_error(ErrorDetail {
                    line_number,
                    code,
                    adapter: self.adapter_name,
                    details: err.full_details(),
                });
            }
        }
        Self::failed(line_number, LineRecordError::Adapter { code, summary })
    }
}

impl<R: Read, P: LineParser> Iterator for LineIngestor<R, P> {
    type Item = LineRecord<P::Event>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (line_number, bytes) = match self.reader.next()? {
                BoundedLine::IoError { line_number } => {
                    return Some(Self::failed(line_number, LineRecordError::Io));
                }
                BoundedLine::LineTooLong {
                    line_number,
                    observed_bytes,
                    max_line_bytes,
                } => {
                    debug!(
                        adapter = self.adapter_name,
                        line_number, observed_bytes, "discarded oversized line"
                    );
                    return Some(Self::failed(
                        line_number,
                        LineRecordError::LineTooLong {
                            observed_bytes,
                            max_line_bytes,
                        },
                    ));
                }
                BoundedLine::Line { line_number, bytes } => (line_number, bytes),
            };

            let Ok(raw_line) = String::from_utf8(bytes) else {
                return Some(Self::failed(line_number, LineRecordError::InvalidUtf8));
            };
            let line = raw_line.strip_suffix('\r').unwrap_or(&raw_line);
            if line.trim().is_empty() {
                continue;
            }

            let captured_raw = self.capture_raw(line);
            let input = LineInput {
                line,
                json_capture: captured_raw.as_ref().and_then(|raw| raw.json.as_ref()),
            };
            match self.parser.parse_line(input) {
                Ok(None) => continue,
                Ok(Some(event)) => {
                    return Some(LineRecord {
                        line_number,
                        captured_raw,
                        outcome: Ok(event),
                    });
                }
                Err(err) => return Some(self.adapter_failure(line_number, &err)),
            }
        }
    }
}
