//! Monthly heating-cost estimate from the settings snapshot.
//!
//! The arithmetic is the bridge forecast model: design heat loss scaled by
//! insulation, home shape and ceiling height; heat-pump output derated by
//! an outdoor-temperature capacity curve; COP taken from the HSPF2-scaled
//! efficiency curve with the remainder covered by resistive aux heat.

use anyhow::Result;
use async_trait::async_trait;
use serde_json::json;

use super::setting_f64;
use crate::{Tool, ToolSpec};

pub const BTU_PER_KWH: f64 = 3412.14;
pub const BTU_PER_TON: f64 = 12000.0;

/// Capacity factor 0–1 based on outdoor temp.  Below the cutoff the
/// compressor contributes nothing.
pub fn capacity_factor(temp_out: f64, cutoff_temp: f64) -> f64 {
    if temp_out <= cutoff_temp {
        return 0.0;
    }
    if temp_out >= 47.0 {
        return 1.0;
    }
    if temp_out < 17.0 {
        return (0.64 - (17.0 - temp_out) * 0.01).max(0.0);
    }
    1.0 - (47.0 - temp_out) * 0.012
}

/// Base COP curve shape before HSPF2 scaling.
fn base_cop_unscaled(temp_out: f64) -> f64 {
    if temp_out >= 47.0 {
        return 4.8;
    }
    if temp_out >= 17.0 {
        return 4.8 - (47.0 - temp_out) * 0.0867;
    }
    (2.2 - (17.0 - temp_out) * 0.02).max(1.2)
}

/// Climate-bin hours used to normalise the COP curve to a seasonal HSPF2.
const HSPF2_BIN_HOURS: &[(f64, f64)] = &[
    (62.0, 87.0),
    (57.0, 183.0),
    (52.0, 294.0),
    (47.0, 358.0),
    (42.0, 415.0),
    (37.0, 460.0),
    (33.0, 430.0),
    (28.0, 407.0),
    (23.0, 311.0),
    (18.0, 239.0),
    (13.0, 152.0),
    (8.0, 91.0),
    (3.0, 47.0),
    (-2.0, 20.0),
    (-7.0, 8.0),
    (-13.0, 3.0),
];

/// COP at an outdoor temperature, scaled so the seasonal average matches
/// the rated HSPF2.
pub fn cop_factor(temp_out: f64, hspf2: f64) -> f64 {
    let total_weighted: f64 = HSPF2_BIN_HOURS
        .iter()
        .map(|&(t, h)| base_cop_unscaled(t) * h)
        .sum();
    let total_hours: f64 = HSPF2_BIN_HOURS.iter().map(|&(_, h)| h).sum();
    let base_seasonal_cop = total_weighted / total_hours;
    let target_seasonal_cop = (hspf2 * 1000.0) / BTU_PER_KWH;
    base_cop_unscaled(temp_out) * (target_seasonal_cop / base_seasonal_cop)
}

/// Design heat loss in BTU/hr at 70°F delta-T, rounded to the nearest
/// 1000 BTU/hr.
pub fn design_heat_loss(
    square_feet: f64,
    insulation_level: f64,
    home_shape: f64,
    ceiling_height: f64,
) -> f64 {
    let ceiling_mult = 1.0 + (ceiling_height - 8.0) * 0.1;
    let raw = square_feet * 22.67 * insulation_level * home_shape * ceiling_mult;
    (raw / 1000.0).round() * 1000.0
}

pub struct CostForecastTool;

#[async_trait]
impl Tool for CostForecastTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec {
            name: "cost_forecast".to_string(),
            description: "Estimated monthly heating cost from the home settings snapshot"
                .to_string(),
            keywords: vec![
                "cost".to_string(),
                "forecast".to_string(),
                "bill".to_string(),
            ],
        }
    }

    async fn run(&self, _goal: &str, settings: &serde_json::Value) -> Result<serde_json::Value> {
        let square_feet = setting_f64(settings, "squareFeet", "square_feet").unwrap_or(1500.0);
        let insulation = setting_f64(settings, "insulationLevel", "insulation_level").unwrap_or(1.0);
        let home_shape = setting_f64(settings, "homeShape", "home_shape").unwrap_or(1.0);
        let ceiling = setting_f64(settings, "ceilingHeight", "ceiling_height").unwrap_or(8.0);
        let indoor = setting_f64(settings, "indoorTemp", "indoor_temp").unwrap_or(70.0);
        let outdoor = setting_f64(settings, "designOutdoorTemp", "design_outdoor_temp").unwrap_or(30.0);
        let tons = setting_f64(settings, "tons", "tons").unwrap_or(3.0);
        let hspf2 = setting_f64(settings, "hspf2", "hspf2").unwrap_or(9.0);
        let rate = setting_f64(settings, "electricityRate", "electricity_rate").unwrap_or(0.14);

        let loss_btu = design_heat_loss(square_feet, insulation, home_shape, ceiling);
        let btu_loss_per_deg = loss_btu / 70.0;
        let temp_diff = (indoor - outdoor).max(0.0);
        let building_loss_btu_hr = btu_loss_per_deg * temp_diff;

        let capacity = capacity_factor(outdoor, -15.0);
        let available_btu_hr = tons * BTU_PER_TON * capacity;
        let cop = cop_factor(outdoor, hspf2);

        let delivered_hp = building_loss_btu_hr.min(available_btu_hr);
        let deficit = (building_loss_btu_hr - delivered_hp).max(0.0);

        let hp_kwh_per_hr = if delivered_hp > 0.0 && cop > 0.0 {
            delivered_hp / (cop * BTU_PER_KWH)
        } else {
            0.0
        };
        // Aux strip heat is pure resistance: 1 kWh per 3412 BTU.
        let aux_kwh_per_hr = deficit / BTU_PER_KWH;

        let monthly_kwh = (hp_kwh_per_hr + aux_kwh_per_hr) * 24.0 * 30.0;
        let monthly_cost = monthly_kwh * rate;

        Ok(json!({
            "designHeatLossBtuHr": loss_btu,
            "copFactor": (cop * 100.0).round() / 100.0,
            "capacityFactor": (capacity * 100.0).round() / 100.0,
            "estimatedMonthlyKwh": monthly_kwh.round(),
            "estimatedMonthlyCost": (monthly_cost * 100.0).round() / 100.0,
            "assumptions": {
                "squareFeet": square_feet,
                "indoorTemp": indoor,
                "designOutdoorTemp": outdoor,
                "electricityRate": rate,
            },
        }))
    }
}
