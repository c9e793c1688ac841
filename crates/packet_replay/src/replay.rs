use std::{
    fs::File,
    io::{self, BufWriter, Read, Write},
    path::PathBuf,
};

use build_packets::ParsedPacket;
use clap::{Parser, ValueEnum};
use packet_events::build_packets_adapter::{OpenCodeLineParser, PacketLineParser};
use packet_events::{IngestConfig, IngestLimits, LineIngestor, LineParser};
use thiserror::Error;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq, ValueEnum)]
pub enum InputFormat {
    /// Backend records, live or persisted.
    #[default]
    Packets,
    /// Raw OpenCode `run --format json` events.
    Opencode,
}

#[derive(Debug, Parser)]
#[command(name = "packet-replay")]
#[command(about = "Replay a JSONL stream or history file as parsed packets")]
pub struct Args {
    /// JSONL file to read (default: stdin).
    #[arg(long)]
    pub input: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = InputFormat::Packets)]
    pub format: InputFormat,

    /// Lines longer than this are reported and skipped.
    #[arg(long, default_value_t = IngestLimits::default().max_line_bytes)]
    pub max_line_bytes: usize,

    /// Do not print packets with an unrecognized type.
    #[arg(long)]
    pub skip_unknown: bool,

    /// Log at debug level when `RUST_LOG` is unset.
    #[arg(long, short)]
    pub verbose: bool,
}

#[derive(Debug, Error)]
pub enum ReplayError {
    #[error("failed to open {}: {source}", .path.display())]
    OpenInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("I/O error while reading input (line {line_number})")]
    ReadInput { line_number: usize },
    #[error("failed to write output: {0}")]
    Write(#[from] io::Error),
    #[error("failed to encode packet: {0}")]
    Encode(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, Eq, PartialEq)]
pub struct ReplaySummary {
    pub packets: usize,
    pub failed_lines: usize,
}

pub fn run(args: &Args) -> Result<ReplaySummary, ReplayError> {
    let stdout = io::stdout();
    let mut out = BufWriter::new(stdout.lock());
    let summary = match &args.input {
        Some(path) => {
            let file = File::open(path).map_err(|source| ReplayError::OpenInput {
                path: path.clone(),
                source,
            })?;
            replay(file, args, &mut out)?
        }
        None => replay(io::stdin().lock(), args, &mut out)?,
    };
    out.flush()?;
    Ok(summary)
}

/// Writes one JSON object per parsed packet to `out`.
///
/// Lines that fail to decode are logged and counted; only a read failure aborts.
pub fn replay<R: Read, W: Write>(
    reader: R,
    args: &Args,
    out: &mut W,
) -> Result<ReplaySummary, ReplayError> {
    let config = IngestConfig::default().with_max_line_bytes(args.max_line_bytes);
    debug!(format = ?args.format, max_line_bytes = args.max_line_bytes, "starting replay");
    match args.format {
        InputFormat::Packets => {
            let parser = PacketLineParser::new().skip_unknown(args.skip_unknown);
            drain(
                LineIngestor::new(reader, parser, config, "packets"),
                out,
                |packet| vec![packet],
            )
        }
        InputFormat::Opencode => {
            let parser = OpenCodeLineParser::new().skip_unknown(args.skip_unknown);
            drain(
                LineIngestor::new(reader, parser, config, "opencode"),
                out,
                |packets| packets.0,
            )
        }
    }
}

fn drain<R, P, W, F>(
    ingestor: LineIngestor<R, P>,
    out: &mut W,
    into_packets: F,
) -> Result<ReplaySummary, ReplayError>
where
    R: Read,
    P: LineParser,
    W: Write,
    F: Fn(P::Event) -> Vec<ParsedPacket>,
{
    let mut summary = ReplaySummary::default();
    for record in ingestor {
        match record.outcome {
            Ok(event) => {
                for packet in into_packets(event) {
                    serde_json::to_writer(&mut *out, &packet)?;
                    out.write_all(b"\n")?;
                    summary.packets += 1;
                }
            }
            Err(err) if err.is_fatal() => {
                return Err(ReplayError::ReadInput {
                    line_number: record.line_number,
                });
            }
            Err(err) => {
                warn!(line_number = record.line_number, error = %err, "skipping line");
                summary.failed_lines += 1;
            }
        }
    }
    Ok(summary)
}
