use anyhow::Result;
use async_trait::async_trait;
use chrono::Utc;
use serde_json::json;

use crate::{Tool, ToolSpec};

/// Wall-clock reading.  The planner's fallback: always registered, always
/// succeeds, so no goal ever produces an empty plan.
pub struct CurrentTimeTool;

#[async_trait]
impl Tool for CurrentTimeTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "current_time".to_string(),
            description: "Current date and time (UTC)".to_string(),
            keywords: vec!["time".to_string(), "clock".to_string(), "date".to_string()],
        }
    }

    async fn run(&self, _goal: &str, _settings: &serde_json::Value) -> Result<serde_json::Value> {
        let now = Utc::now();
        Ok(json!({
            "iso": now.to_rfc3339(),
            "unix": now.timestamp(),
        }))
    }
}
