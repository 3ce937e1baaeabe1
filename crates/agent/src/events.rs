use serde::{Deserialize, Serialize};

/// Run lifecycle: `Pending → Running → {Completed, Cancelled, Error}`.
/// Cancellation is a first-class terminal status, not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AgentStatus {
    Pending,
    Running,
    Completed,
    Cancelled,
    Error,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StepStatus {
    Ok,
    Error,
}

/// Outcome of one planned tool, appended as each completes.  Planned tools
/// skipped by cancellation never appear.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepResult {
    pub tool: String,
    pub status: StepStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl StepResult {
    pub fn ok(tool: impl Into<String>, result: serde_json::Value) -> Self {
        Self {
            tool: tool.into(),
            status: StepStatus::Ok,
            result: Some(result),
            error: None,
        }
    }

    pub fn error(tool: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool: tool.into(),
            status: StepStatus::Error,
            result: None,
            error: Some(error.into()),
        }
    }
}

/// One run's lifecycle events, in the order the manager emits them:
/// `Goal`, `Plan`, then per planned tool `ToolCall` followed by exactly one
/// of `ToolResult`/`ToolError`, then exactly one `Final` — always the last
/// event on every terminal path.
///
/// The run logic is transport-agnostic: this enum is produced into a
/// channel and the SSE wire framing is just one consumer.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AgentEvent {
    Goal {
        goal: String,
    },
    Plan {
        tools: Vec<String>,
    },
    ToolCall {
        tool: String,
    },
    ToolResult {
        tool: String,
        result: serde_json::Value,
    },
    ToolError {
        tool: String,
        error: String,
    },
    Final {
        status: AgentStatus,
        steps: Vec<StepResult>,
    },
}

impl AgentEvent {
    /// Wire event name used by the SSE `event:` field.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Goal { .. } => "goal",
            Self::Plan { .. } => "plan",
            Self::ToolCall { .. } => "tool_call",
            Self::ToolResult { .. } => "tool_result",
            Self::ToolError { .. } => "tool_error",
            Self::Final { .. } => "final",
        }
    }

    pub fn is_final(&self) -> bool {
        matches!(self, Self::Final { .. })
    }
}
