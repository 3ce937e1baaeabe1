//! Memory tools: the agent's hooks into the shared decayed store.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use joule_memory::{MemoryKind, SharedMemory};

use crate::{Tool, ToolSpec};

// ── remember_fact ────────────────────────────────────────────────────────────

/// Append the fact clause of the goal to the facts ring.
pub struct RememberFactTool {
    memory: SharedMemory,
}

impl RememberFactTool {
    pub fn new(memory: SharedMemory) -> Self {
        Self { memory }
    }
}

/// Strip the imperative lead-in so "remember that the loft runs warm"
/// stores "the loft runs warm".  An unrecognized lead-in stores the goal
/// verbatim.
fn fact_clause(goal: &str) -> &str {
    let trimmed = goal.trim();
    for prefix in ["remember that ", "remember ", "memorize ", "note that ", "note "] {
        if trimmed.is_char_boundary(prefix.len())
            && trimmed.len() >= prefix.len()
            && trimmed[..prefix.len()].eq_ignore_ascii_case(prefix)
        {
            return trimmed[prefix.len()..].trim();
        }
    }
    trimmed
}

#[async_trait]
impl Tool for RememberFactTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "remember_fact".to_string(),
            description: "Store a fact from the goal in long-term memory".to_string(),
            keywords: vec!["remember".to_string(), "memory".to_string()],
        }
    }

    async fn run(&self, goal: &str, _settings: &serde_json::Value) -> Result<serde_json::Value> {
        let fact = fact_clause(goal);
        if fact.is_empty() {
            anyhow::bail!("nothing to remember in goal: {goal:?}");
        }
        self.memory.remember(MemoryKind::Fact, fact).await;
        Ok(json!({ "remembered": fact }))
    }
}

// ── recall_memory ────────────────────────────────────────────────────────────

/// Return the most recent remembered facts and goals.
pub struct RecallMemoryTool {
    memory: SharedMemory,
}

impl RecallMemoryTool {
    pub fn new(memory: SharedMemory) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for RecallMemoryTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "recall_memory".to_string(),
            description: "Most recent remembered facts and goals".to_string(),
            keywords: vec!["recall".to_string(), "memory".to_string()],
        }
    }

    async fn run(&self, _goal: &str, _settings: &serde_json::Value) -> Result<serde_json::Value> {
        let facts: Vec<String> = self
            .memory
            .recent(MemoryKind::Fact, 10)
            .await
            .into_iter()
            .map(|e| e.content)
            .collect();
        let goals: Vec<String> = self
            .memory
            .recent(MemoryKind::Goal, 5)
            .await
            .into_iter()
            .map(|e| e.content)
            .collect();
        Ok(json!({ "facts": facts, "goals": goals }))
    }
}

// ── snapshot_settings ────────────────────────────────────────────────────────

/// Store the caller's settings snapshot so later runs (and the forecast
/// tools on those runs) see the latest values even without a fresh upload.
pub struct SnapshotSettingsTool {
    memory: SharedMemory,
}

impl SnapshotSettingsTool {
    pub fn new(memory: SharedMemory) -> Self {
        Self { memory }
    }
}

#[async_trait]
impl Tool for SnapshotSettingsTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "snapshot_settings".to_string(),
            description: "Persist the current settings snapshot to memory".to_string(),
            keywords: vec!["snapshot".to_string(), "settings".to_string()],
        }
    }

    async fn run(&self, _goal: &str, settings: &serde_json::Value) -> Result<serde_json::Value> {
        let keys = settings.as_object().map(|o| o.len()).unwrap_or(0);
        if keys == 0 {
            anyhow::bail!("no settings supplied to snapshot");
        }
        self.memory.snapshot_settings(settings.clone()).await;
        Ok(json!({ "snapshot": true, "keys": keys }))
    }
}

#[cfg(test)]
mod tests {
    use joule_memory::MemoryStore;

    use super::*;

    fn shared() -> SharedMemory {
        SharedMemory::new(MemoryStore::default())
    }

    #[test]
    fn fact_clause_strips_the_lead_in() {
        assert_eq!(fact_clause("remember that the loft runs warm"), "the loft runs warm");
        assert_eq!(fact_clause("Remember the garage is drafty"), "the garage is drafty");
        assert_eq!(fact_clause("the filter was changed in june"), "the filter was changed in june");
    }

    #[tokio::test]
    async fn remember_then_recall_round_trip() {
        let memory = shared();
        let remember = RememberFactTool::new(memory.clone());
        let recall = RecallMemoryTool::new(memory);

        remember
            .run("remember that the loft runs warm", &serde_json::Value::Null)
            .await
            .unwrap();
        let result = recall.run("recall", &serde_json::Value::Null).await.unwrap();
        let facts = result["facts"].as_array().unwrap();
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0], "the loft runs warm");
    }

    #[tokio::test]
    async fn empty_fact_is_an_error() {
        let remember = RememberFactTool::new(shared());
        let result = remember.run("remember ", &serde_json::Value::Null).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn snapshot_requires_a_settings_object() {
        let memory = shared();
        let tool = SnapshotSettingsTool::new(memory.clone());

        assert!(tool.run("snapshot", &serde_json::Value::Null).await.is_err());

        let settings = serde_json::json!({ "squareFeet": 2000, "tons": 3 });
        let result = tool.run("snapshot", &settings).await.unwrap();
        assert_eq!(result["keys"], 2);
        assert!(memory.summary().await.has_settings_snapshot);
    }
}
