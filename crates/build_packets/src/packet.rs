use serde::{Deserialize, Serialize};

/// Canonical identity of the tool behind a tool call.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum ToolName {
    Glob,
    Grep,
    Read,
    Write,
    Edit,
    Bash,
    Task,
    TodoWrite,
    WebFetch,
    WebSearch,
    #[default]
    Unknown,
}

impl ToolName {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolName::Glob => "glob",
            ToolName::Grep => "grep",
            ToolName::Read => "read",
            ToolName::Write => "write",
            ToolName::Edit => "edit",
            ToolName::Bash => "bash",
            ToolName::Task => "task",
            ToolName::TodoWrite => "todowrite",
            ToolName::WebFetch => "webfetch",
            ToolName::WebSearch => "websearch",
            ToolName::Unknown => "unknown",
        }
    }
}

/// Coarse capability bucket used to pick an extraction strategy and to group tool calls
/// for display.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolKind {
    Search,
    Read,
    Execute,
    Edit,
    Task,
    #[default]
    Other,
}

impl ToolKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Search => "search",
            ToolKind::Read => "read",
            ToolKind::Execute => "execute",
            ToolKind::Edit => "edit",
            ToolKind::Task => "task",
            ToolKind::Other => "other",
        }
    }
}

/// Reported lifecycle state of a tool call.
///
/// The parser only normalizes what the backend reports; how a status evolves over the
/// lifetime of a call is tracked by the consumer.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ToolStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Failed,
    Cancelled,
}

impl ToolStatus {
    /// Folds a backend-reported status (including producer aliases such as `running` or
    /// `done`) into the closed set. Unrecognized values map to [`ToolStatus::Pending`].
    pub fn from_reported(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "in_progress" | "in-progress" | "running" => ToolStatus::InProgress,
            "completed" | "done" | "success" => ToolStatus::Completed,
            "failed" | "error" => ToolStatus::Failed,
            "cancelled" | "canceled" => ToolStatus::Cancelled,
            _ => ToolStatus::Pending,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolStatus::Pending => "pending",
            ToolStatus::InProgress => "in_progress",
            ToolStatus::Completed => "completed",
            ToolStatus::Failed => "failed",
            ToolStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum TodoStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
}

impl TodoStatus {
    pub fn from_reported(raw: &str) -> Self {
        match raw {
            "in_progress" => TodoStatus::InProgress,
            "completed" => TodoStatus::Completed,
            _ => TodoStatus::Pending,
        }
    }
}

/// One checklist entry. A todo update always carries the full list.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TodoItem {
    pub content: String,
    pub status: TodoStatus,
    pub active_form: String,
}

/// Old/new text of a file edit.
///
/// `is_new_file` is derived from `old_text` at construction and cannot drift from it.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DiffData {
    old_text: String,
    new_text: String,
    is_new_file: bool,
}

impl DiffData {
    pub fn new(old_text: impl Into<String>, new_text: impl Into<String>) -> Self {
        let old_text = old_text.into();
        let is_new_file = old_text.is_empty();
        Self {
            old_text,
            new_text: new_text.into(),
            is_new_file,
        }
    }

    pub fn old_text(&self) -> &str {
        &self.old_text
    }

    pub fn new_text(&self) -> &str {
        &self.new_text
    }

    pub fn is_new_file(&self) -> bool {
        self.is_new_file
    }
}

impl Default for DiffData {
    fn default() -> Self {
        Self::new("", "")
    }
}

#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Artifact {
    pub id: String,
    #[serde(rename = "type")]
    pub artifact_type: String,
    pub name: String,
    /// Session-root-relative path.
    pub path: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub preview_url: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
pub struct TextChunk {
    pub text: String,
}

#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
pub struct ThinkingChunk {
    pub text: String,
}

/// First sighting of a tool call. Carries identity only; field extraction happens on
/// progress packets.
#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallStart {
    pub tool_call_id: String,
    pub tool_name: ToolName,
    pub kind: ToolKind,
    pub status: ToolStatus,
    pub is_todo: bool,
}

#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ToolCallProgress {
    pub tool_call_id: String,
    pub tool_name: ToolName,
    pub kind: ToolKind,
    pub status: ToolStatus,
    pub is_todo: bool,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub command: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub diff: Option<DiffData>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub todos: Vec<TodoItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subagent_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_prompt: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_output: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub task_session_id: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PromptResponse {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<String>,
}

#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
pub struct ArtifactCreated {
    pub artifact: Artifact,
}

/// Backend-reported error, surfaced verbatim.
#[derive(Clone, Debug, Default, Serialize, Eq, PartialEq)]
pub struct ErrorPacket {
    pub message: String,
}

/// The single result of [`crate::parse`]: exactly one variant per input record.
#[derive(Clone, Debug, Serialize, Eq, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParsedPacket {
    TextChunk(TextChunk),
    ThinkingChunk(ThinkingChunk),
    ToolCallStart(ToolCallStart),
    ToolCallProgress(ToolCallProgress),
    PromptResponse(PromptResponse),
    ArtifactCreated(ArtifactCreated),
    Error(ErrorPacket),
    Unknown,
}

impl ParsedPacket {
    pub fn is_unknown(&self) -> bool {
        matches!(self, ParsedPacket::Unknown)
    }
}
