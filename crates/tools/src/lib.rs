use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

// ── Tool trait and registry ──────────────────────────────────────────────────

/// Static metadata about a tool: its name plus the capability keywords it
/// declares.  Registered once at process start, read-only thereafter.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolSpec {
    pub name: String,
    pub description: String,
    /// Capability keywords — what this tool is about, for listings and
    /// for callers that want to surface "what can you do".
    pub keywords: Vec<String>,
}

/// Trait implemented by every domain tool.
///
/// An executor receives the raw goal text and the caller's settings
/// snapshot and returns a JSON result value.  Errors are ordinary
/// `anyhow::Error`s; the run manager converts them into `tool_error`
/// steps and keeps going — a tool never aborts a run.
#[async_trait]
pub trait Tool: Send + Sync {
    fn spec(&self) -> ToolSpec;
    async fn run(&self, goal: &str, settings: &serde_json::Value) -> Result<serde_json::Value>;
}

/// Central registry for all available tools.
#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<Arc<dyn Tool>>,
}

impl ToolRegistry {
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        self.tools.push(tool);
    }

    pub fn list_specs(&self) -> Vec<ToolSpec> {
        self.tools.iter().map(|t| t.spec()).collect()
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool>> {
        self.tools
            .iter()
            .find(|t| t.spec().name == name)
            .cloned()
    }
}

// ── Built-in tools ───────────────────────────────────────────────────────────

pub mod builtins;
pub use builtins::{
    CostForecastTool, CurrentTimeTool, PerformanceAnalysisTool, RecallMemoryTool,
    RememberFactTool, SnapshotSettingsTool,
};

use joule_memory::SharedMemory;

/// Build the registry the bridge ships with: clock, forecast and analysis
/// calculators, and the three memory tools bound to the shared store.
pub fn default_registry(memory: SharedMemory) -> ToolRegistry {
    let mut registry = ToolRegistry::default();
    registry.register(Arc::new(CurrentTimeTool));
    registry.register(Arc::new(CostForecastTool));
    registry.register(Arc::new(PerformanceAnalysisTool));
    registry.register(Arc::new(RememberFactTool::new(memory.clone())));
    registry.register(Arc::new(RecallMemoryTool::new(memory.clone())));
    registry.register(Arc::new(SnapshotSettingsTool::new(memory)));
    registry
}

// ── ToolRegistry tests ───────────────────────────────────────────────────────

#[cfg(test)]
mod registry_tests {
    use super::*;

    /// Minimal dummy tool for testing the registry.
    struct DummyTool {
        name: String,
    }

    #[async_trait]
    impl Tool for DummyTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec {
                name: self.name.clone(),
                description: format!("dummy tool: {}", self.name),
                keywords: vec!["dummy".to_string()],
            }
        }
        async fn run(&self, _goal: &str, _settings: &serde_json::Value) -> Result<serde_json::Value> {
            Ok(serde_json::json!({ "ran": self.name }))
        }
    }

    #[test]
    fn empty_registry() {
        let reg = ToolRegistry::default();
        assert!(reg.list_specs().is_empty());
        assert!(reg.get("anything").is_none());
    }

    #[test]
    fn register_and_get() {
        let mut reg = ToolRegistry::default();
        reg.register(Arc::new(DummyTool { name: "alpha".into() }));
        reg.register(Arc::new(DummyTool { name: "beta".into() }));

        assert!(reg.get("alpha").is_some());
        assert!(reg.get("beta").is_some());
        assert!(reg.get("gamma").is_none());
    }

    #[tokio::test]
    async fn run_registered_tool() {
        let mut reg = ToolRegistry::default();
        reg.register(Arc::new(DummyTool { name: "runner".into() }));

        let tool = reg.get("runner").unwrap();
        let result = tool
            .run("any goal", &serde_json::Value::Null)
            .await
            .unwrap();
        assert_eq!(result["ran"], "runner");
    }

    #[test]
    fn default_registry_contains_the_planner_universe() {
        let memory = SharedMemory::new(joule_memory::MemoryStore::default());
        let reg = default_registry(memory);
        for name in [
            "current_time",
            "cost_forecast",
            "performance_analysis",
            "remember_fact",
            "recall_memory",
            "snapshot_settings",
        ] {
            assert!(reg.get(name).is_some(), "missing builtin {name}");
        }
    }
}
