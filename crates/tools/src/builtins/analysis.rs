//! Heat-pump performance summary across outdoor-temperature bins.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use super::forecast::{BTU_PER_TON, capacity_factor, cop_factor, design_heat_loss};
use super::setting_f64;
use crate::{Tool, ToolSpec};

/// Outdoor temperatures the summary is evaluated at: mild shoulder season
/// down to a hard cold snap.
const REPORT_BINS: &[f64] = &[47.0, 35.0, 25.0, 17.0, 5.0];

pub struct PerformanceAnalysisTool;

#[async_trait]
impl Tool for PerformanceAnalysisTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "performance_analysis".to_string(),
            description: "Heat-pump efficiency and coverage across outdoor temperature bins"
                .to_string(),
            keywords: vec![
                "performance".to_string(),
                "efficiency".to_string(),
                "cop".to_string(),
            ],
        }
    }

    async fn run(&self, _goal: &str, settings: &serde_json::Value) -> Result<serde_json::Value> {
        let square_feet = setting_f64(settings, "squareFeet", "square_feet").unwrap_or(1500.0);
        let insulation = setting_f64(settings, "insulationLevel", "insulation_level").unwrap_or(1.0);
        let home_shape = setting_f64(settings, "homeShape", "home_shape").unwrap_or(1.0);
        let ceiling = setting_f64(settings, "ceilingHeight", "ceiling_height").unwrap_or(8.0);
        let indoor = setting_f64(settings, "indoorTemp", "indoor_temp").unwrap_or(70.0);
        let tons = setting_f64(settings, "tons", "tons").unwrap_or(3.0);
        let hspf2 = setting_f64(settings, "hspf2", "hspf2").unwrap_or(9.0);

        let loss_btu = design_heat_loss(square_feet, insulation, home_shape, ceiling);
        let btu_loss_per_deg = loss_btu / 70.0;

        let bins: Vec<serde_json::Value> = REPORT_BINS
            .iter()
            .map(|&outdoor| {
                let capacity = capacity_factor(outdoor, -15.0);
                let available = tons * BTU_PER_TON * capacity;
                let demand = btu_loss_per_deg * (indoor - outdoor).max(0.0);
                let coverage = if demand > 0.0 {
                    (available / demand).min(1.0)
                } else {
                    1.0
                };
                json!({
                    "outdoorTemp": outdoor,
                    "copFactor": (cop_factor(outdoor, hspf2) * 100.0).round() / 100.0,
                    "capacityFactor": (capacity * 100.0).round() / 100.0,
                    "heatPumpCoverage": (coverage * 100.0).round() / 100.0,
                })
            })
            .collect();

        // Balance point: the coldest bin the heat pump still fully covers.
        let balance_point = REPORT_BINS
            .iter()
            .copied()
            .filter(|&outdoor| {
                let available = tons * BTU_PER_TON * capacity_factor(outdoor, -15.0);
                available >= btu_loss_per_deg * (indoor - outdoor).max(0.0)
            })
            .fold(None::<f64>, |coldest, t| {
                Some(coldest.map_or(t, |c| c.min(t)))
            });

        Ok(json!({
            "designHeatLossBtuHr": loss_btu,
            "bins": bins,
            "balancePointTemp": balance_point,
        }))
    }
}
