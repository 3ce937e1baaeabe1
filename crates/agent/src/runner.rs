//! Agent run lifecycle: planning, ordered event emission, cooperative
//! cancellation, and partial-failure isolation.
//!
//! Each submitted goal becomes one run with its own event channel.  Events
//! for a single run are emitted strictly in sequence; events from two
//! concurrent runs may interleave on a shared transport, so every wire
//! frame carries the run id (the transport layer's job — see the server
//! crate).

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::sync::{Mutex, mpsc};
use tracing::{info, warn};
use uuid::Uuid;

use joule_memory::{MemoryKind, SharedMemory};
use joule_tools::ToolRegistry;

use crate::events::{AgentEvent, AgentStatus, StepResult};
use crate::planner;

/// Per-run event channel capacity.  A slow consumer backpressures the run
/// loop rather than dropping events — ordering is part of the contract.
const EVENT_CHANNEL_CAP: usize = 64;

/// A submitted run: its identifier plus the receiving end of its event
/// stream.  The stream always terminates with exactly one `Final` event.
pub struct RunSubmission {
    pub run_id: Uuid,
    pub events: mpsc::Receiver<AgentEvent>,
}

struct RunHandle {
    cancel: Arc<AtomicBool>,
}

/// Owns the active-run table and drives each run to a terminal status.
pub struct RunManager {
    registry: Arc<ToolRegistry>,
    memory: SharedMemory,
    runs: Arc<Mutex<HashMap<Uuid, RunHandle>>>,
}

impl RunManager {
    pub fn new(registry: ToolRegistry, memory: SharedMemory) -> Self {
        Self {
            registry: Arc::new(registry),
            memory,
            runs: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Submit a goal: prune memory, log the goal, plan, and spawn the run
    /// loop.  Returns immediately with the run id and event receiver.
    pub async fn submit(&self, goal: &str, settings: serde_json::Value) -> RunSubmission {
        // Pruning rides on submission rather than a timer, so staleness is
        // bounded by "time since last run".
        self.memory.prune().await;
        self.memory.remember(MemoryKind::Goal, goal).await;

        let plan = planner::plan(goal);
        self.spawn_run(goal, settings, plan).await
    }

    /// Request cancellation of an active run.  Sets the cooperative flag
    /// and returns immediately — the run reaches `Cancelled` at its next
    /// tool boundary.  Unknown or already-terminal runs are a no-op.
    pub async fn cancel(&self, run_id: Uuid) -> bool {
        let runs = self.runs.lock().await;
        match runs.get(&run_id) {
            Some(handle) => {
                handle.cancel.store(true, Ordering::SeqCst);
                info!(%run_id, "cancellation requested");
                true
            }
            None => false,
        }
    }

    pub async fn active_count(&self) -> usize {
        self.runs.lock().await.len()
    }

    async fn spawn_run(
        &self,
        goal: &str,
        settings: serde_json::Value,
        plan: Vec<String>,
    ) -> RunSubmission {
        let run_id = Uuid::new_v4();
        let cancel = Arc::new(AtomicBool::new(false));
        self.runs.lock().await.insert(
            run_id,
            RunHandle {
                cancel: cancel.clone(),
            },
        );

        let (tx, rx) = mpsc::channel(EVENT_CHANNEL_CAP);
        let registry = self.registry.clone();
        let runs = self.runs.clone();
        let goal = goal.to_string();

        tokio::spawn(async move {
            execute_run(&registry, &goal, &settings, plan, cancel, tx).await;
            // Terminal status reached and the final event is in the
            // channel; evict the run from the active table.
            runs.lock().await.remove(&run_id);
        });

        RunSubmission { run_id, events: rx }
    }
}

/// The run loop.  Status starts `Pending`, moves to `Running` when the
/// first planned tool is accepted, and ends in exactly one terminal state.
/// The cancellation flag is polled only between tools: an in-flight tool
/// call always runs to completion, so external side effects finish
/// atomically.
async fn execute_run(
    registry: &ToolRegistry,
    goal: &str,
    settings: &serde_json::Value,
    plan: Vec<String>,
    cancel: Arc<AtomicBool>,
    tx: mpsc::Sender<AgentEvent>,
) {
    let _ = tx.send(AgentEvent::Goal { goal: goal.to_string() }).await;
    let _ = tx.send(AgentEvent::Plan { tools: plan.clone() }).await;

    let mut status = AgentStatus::Pending;
    let mut steps: Vec<StepResult> = Vec::new();

    for tool_name in &plan {
        if cancel.load(Ordering::SeqCst) {
            status = AgentStatus::Cancelled;
            break;
        }
        status = AgentStatus::Running;

        let _ = tx
            .send(AgentEvent::ToolCall {
                tool: tool_name.clone(),
            })
            .await;

        let outcome = match registry.get(tool_name) {
            Some(tool) => tool.run(goal, settings).await,
            None => Err(anyhow::anyhow!("unknown tool: {tool_name}")),
        };

        match outcome {
            Ok(result) => {
                steps.push(StepResult::ok(tool_name.clone(), result.clone()));
                let _ = tx
                    .send(AgentEvent::ToolResult {
                        tool: tool_name.clone(),
                        result,
                    })
                    .await;
            }
            Err(err) => {
                // Per-tool failures never abort the run; the remaining
                // plan executes best-effort.
                warn!(tool = %tool_name, error = %err, "tool execution failed");
                let message = err.to_string();
                steps.push(StepResult::error(tool_name.clone(), message.clone()));
                let _ = tx
                    .send(AgentEvent::ToolError {
                        tool: tool_name.clone(),
                        error: message,
                    })
                    .await;
            }
        }
    }

    let final_status = match status {
        AgentStatus::Cancelled => AgentStatus::Cancelled,
        _ if steps
            .iter()
            .all(|s| s.status == crate::events::StepStatus::Error)
            && !steps.is_empty() =>
        {
            AgentStatus::Error
        }
        _ => AgentStatus::Completed,
    };

    let _ = tx
        .send(AgentEvent::Final {
            status: final_status,
            steps,
        })
        .await;
}
