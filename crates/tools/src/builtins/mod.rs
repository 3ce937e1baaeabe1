mod analysis;
mod clock;
mod forecast;
mod memory;

pub use analysis::PerformanceAnalysisTool;
pub use clock::CurrentTimeTool;
pub use forecast::CostForecastTool;
pub use memory::{RecallMemoryTool, RememberFactTool, SnapshotSettingsTool};

/// Read a numeric field from the settings snapshot, tolerating both
/// camelCase and snake_case keys the way the bridge's Python peers did.
pub(crate) fn setting_f64(settings: &serde_json::Value, camel: &str, snake: &str) -> Option<f64> {
    settings
        .get(camel)
        .or_else(|| settings.get(snake))
        .and_then(|v| v.as_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn setting_lookup_accepts_both_key_styles() {
        let camel = serde_json::json!({ "squareFeet": 2000 });
        let snake = serde_json::json!({ "square_feet": 2000 });
        assert_eq!(setting_f64(&camel, "squareFeet", "square_feet"), Some(2000.0));
        assert_eq!(setting_f64(&snake, "squareFeet", "square_feet"), Some(2000.0));
        assert_eq!(setting_f64(&camel, "tons", "tons"), None);
    }
}
