#![forbid(unsafe_code)]
//! Normalization and classification of agentic-build backend packets.
//!
//! A backend emits loosely-typed event records, either over a live push stream or read back
//! from persisted history. [`parse`] turns one such record into one [`ParsedPacket`]:
//! - field-name variants from both producers (snake_case, camelCase, legacy aliases) are
//!   resolved in one place;
//! - tools are classified by name first and by input shape second, so a record whose title
//!   was rewritten after completion still classifies the same way;
//! - diffs, todo lists, task prompts/outputs and display text are extracted per tool kind;
//! - host and sandbox path prefixes are stripped from every path-bearing field before the
//!   value leaves the crate.
//!
//! The parser is pure and stateless and never fails; malformed input degrades to empty
//! defaults or [`ParsedPacket::Unknown`].
//!
//! [`opencode::OpenCodeTranslator`] converts raw OpenCode `--format json` events into
//! backend records that can then be fed to [`parse`].

mod classify;
mod extract;
mod packet;
mod parser;
mod raw;
mod sanitize;

pub mod opencode;

pub use packet::{
    Artifact, ArtifactCreated, DiffData, ErrorPacket, ParsedPacket, PromptResponse, TextChunk,
    ThinkingChunk, TodoItem, TodoStatus, ToolCallProgress, ToolCallStart, ToolKind, ToolName,
    ToolStatus,
};
pub use parser::parse;
