#![forbid(unsafe_code)]
//! Line-oriented ingestion for build backend JSONL output.
//!
//! A live stream captured to a pipe and a persisted history file share one shape: one JSON
//! record per line. This crate provides:
//! - a bounded-memory line reader that survives oversized lines and I/O failures;
//! - a [`LineParser`] seam plus the [`LineIngestor`] iterator that drives it;
//! - per-line error classification that keeps raw line text out of error summaries;
//! - feature-gated adapters over `build_packets` (enable the `build_packets` feature).

mod config;
mod error;
mod ingest;
mod line_parser;
mod normalized;
mod reader;

#[cfg(feature = "build_packets")]
pub mod build_packets_adapter;

pub use config::{CaptureRaw, ErrorDetailCapture, IngestConfig, IngestLimits};
pub use error::{
    AdapterErrorCode, CapturedRaw, ErrorDetail, ErrorDetailSink, LineRecord, LineRecordError,
};
pub use ingest::{LineIngestor, RawCaptureBudget};
pub use line_parser::{ClassifiedParserError, LineInput, LineParser};
pub use normalized::{NormalizedPacket, NormalizedPackets, PacketSource};
