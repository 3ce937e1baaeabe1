use serde::{Deserialize, Serialize};
use serde_json::json;

/// Numeric thermostat settings the interpreter can set or query.
///
/// | Key                     | Implied unit for a bare number      |
/// |-------------------------|-------------------------------------|
/// | `HeatDifferential`      | degrees                             |
/// | `CoolDifferential`      | degrees                             |
/// | `CompressorMinCycleOff` | seconds ("N minutes" converts ×60)  |
/// | `AuxHeatLockout`        | degrees (outdoor threshold)         |
/// | `FanDissipation`        | seconds ("N minutes" converts ×60)  |
/// | `TargetTemp`            | degrees                             |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SettingKey {
    HeatDifferential,
    CoolDifferential,
    CompressorMinCycleOff,
    AuxHeatLockout,
    FanDissipation,
    TargetTemp,
}

impl SettingKey {
    /// Canonical setter action identifier.
    pub fn setter_action(self) -> &'static str {
        match self {
            Self::HeatDifferential => "set_heat_differential",
            Self::CoolDifferential => "set_cool_differential",
            Self::CompressorMinCycleOff => "set_compressor_min_cycle_off",
            Self::AuxHeatLockout => "set_aux_heat_lockout",
            Self::FanDissipation => "set_fan_dissipation",
            Self::TargetTemp => "set_target_temp",
        }
    }

    /// Canonical query action identifier.
    pub fn query_action(self) -> &'static str {
        match self {
            Self::HeatDifferential => "query_heat_differential",
            Self::CoolDifferential => "query_cool_differential",
            Self::CompressorMinCycleOff => "query_compressor_min_cycle_off",
            Self::AuxHeatLockout => "query_aux_heat_lockout",
            Self::FanDissipation => "query_fan_dissipation",
            Self::TargetTemp => "query_target_temp",
        }
    }

    /// Whether a bare number for this topic denotes a time span in seconds.
    /// Everything else is degrees.
    pub fn is_duration(self) -> bool {
        matches!(self, Self::CompressorMinCycleOff | Self::FanDissipation)
    }
}

/// HVAC operating mode.  "heat/cool", "heat-cool", "heat cool" and "auto"
/// all denote [`ThermostatMode::Auto`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThermostatMode {
    Heat,
    Cool,
    Auto,
    Off,
}

impl ThermostatMode {
    /// Parse a mode word from normalized (lowercased, slash-collapsed) text.
    pub fn from_normalized(s: &str) -> Option<Self> {
        match s {
            "heat" => Some(Self::Heat),
            "cool" => Some(Self::Cool),
            "auto" | "heat cool" => Some(Self::Auto),
            "off" => Some(Self::Off),
            _ => None,
        }
    }
}

/// Screens the HMI can navigate to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    Dashboard,
    Settings,
    Forecast,
    Schedule,
    Home,
}

impl Page {
    pub fn from_normalized(s: &str) -> Option<Self> {
        match s {
            "dashboard" => Some(Self::Dashboard),
            "settings" => Some(Self::Settings),
            "forecast" => Some(Self::Forecast),
            "schedule" => Some(Self::Schedule),
            "home" => Some(Self::Home),
            _ => None,
        }
    }
}

/// Typed slots extractable from one utterance.  Doubles as the carry-over
/// state (`last_query`) the dispatcher feeds back on the next turn.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EntitySet {
    pub city_name: Option<String>,
    pub square_feet: Option<f64>,
    pub indoor_temp: Option<f64>,
    pub state: Option<String>,
    pub value: Option<f64>,
    pub cost: Option<f64>,
    pub percent: Option<f64>,
    pub duration_secs: Option<f64>,
}

/// Carry-over state from the previous conversational turn.  Supplied by the
/// caller on every call; the interpreter never mutates it — it returns a new
/// [`Command`] the caller may fold into the next turn's context.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConversationalContext {
    pub last_query: EntitySet,
    pub user_settings: Option<serde_json::Value>,
    pub user_location: Option<String>,
}

/// The structured result of interpreting one utterance.
///
/// A discriminated union rather than a record of optionals: `NonCommand` is
/// the designed no-match outcome (not an error), and every other variant
/// carries exactly the slots its action needs.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// The utterance matched nothing.  Handled by an external fallback.
    NonCommand,
    SetSetting {
        key: SettingKey,
        value: f64,
    },
    QuerySetting {
        key: SettingKey,
    },
    SetMode {
        mode: ThermostatMode,
    },
    Navigate {
        target: Page,
    },
    /// Heating/cooling cost estimate.  Slots left empty by the utterance are
    /// filled from the conversational context by the resolver.
    EstimateCost {
        city: Option<String>,
        square_feet: Option<f64>,
        indoor_temp: Option<f64>,
    },
}

impl Command {
    pub fn is_command(&self) -> bool {
        !matches!(self, Self::NonCommand)
    }

    /// Canonical action identifier, `None` for the non-command.
    pub fn action(&self) -> Option<&'static str> {
        match self {
            Self::NonCommand => None,
            Self::SetSetting { key, .. } => Some(key.setter_action()),
            Self::QuerySetting { key } => Some(key.query_action()),
            Self::SetMode { .. } => Some("set_mode"),
            Self::Navigate { .. } => Some("navigate"),
            Self::EstimateCost { .. } => Some("estimate_cost"),
        }
    }

    /// The entities this command carries, for folding into the next turn's
    /// `last_query`.
    pub fn entities(&self) -> EntitySet {
        match self {
            Self::EstimateCost {
                city,
                square_feet,
                indoor_temp,
            } => EntitySet {
                city_name: city.clone(),
                square_feet: *square_feet,
                indoor_temp: *indoor_temp,
                ..EntitySet::default()
            },
            Self::SetSetting { value, .. } => EntitySet {
                value: Some(*value),
                ..EntitySet::default()
            },
            _ => EntitySet::default(),
        }
    }

    /// Wire representation for the HMI dispatcher: the empty object for a
    /// non-command, otherwise `isCommand: true` plus the action and slots.
    pub fn to_json(&self) -> serde_json::Value {
        let Some(action) = self.action() else {
            return json!({});
        };
        let mut obj = json!({ "isCommand": true, "action": action });
        let map = obj.as_object_mut().expect("literal object");
        match self {
            Self::SetSetting { value, .. } => {
                map.insert("value".into(), json!(value));
            }
            Self::SetMode { mode } => {
                map.insert("value".into(), json!(mode));
            }
            Self::Navigate { target } => {
                map.insert("target".into(), json!(target));
            }
            Self::EstimateCost {
                city,
                square_feet,
                indoor_temp,
            } => {
                if let Some(city) = city {
                    map.insert("cityName".into(), json!(city));
                }
                if let Some(sqft) = square_feet {
                    map.insert("squareFeet".into(), json!(sqft));
                }
                if let Some(temp) = indoor_temp {
                    map.insert("indoorTemp".into(), json!(temp));
                }
            }
            Self::QuerySetting { .. } | Self::NonCommand => {}
        }
        obj
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_command_serializes_to_empty_object() {
        let wire = Command::NonCommand.to_json();
        assert_eq!(wire, json!({}));
        assert!(!Command::NonCommand.is_command());
        assert!(Command::NonCommand.action().is_none());
    }

    #[test]
    fn set_setting_wire_shape() {
        let cmd = Command::SetSetting {
            key: SettingKey::HeatDifferential,
            value: 1.5,
        };
        let wire = cmd.to_json();
        assert_eq!(wire["isCommand"], json!(true));
        assert_eq!(wire["action"], json!("set_heat_differential"));
        assert_eq!(wire["value"], json!(1.5));
    }

    #[test]
    fn estimate_cost_omits_empty_slots() {
        let cmd = Command::EstimateCost {
            city: Some("Denver, CO".to_string()),
            square_feet: None,
            indoor_temp: Some(72.0),
        };
        let wire = cmd.to_json();
        assert_eq!(wire["cityName"], json!("Denver, CO"));
        assert_eq!(wire["indoorTemp"], json!(72.0));
        assert!(wire.get("squareFeet").is_none());
    }

    #[test]
    fn mode_synonyms_normalize_to_auto() {
        assert_eq!(
            ThermostatMode::from_normalized("heat cool"),
            Some(ThermostatMode::Auto)
        );
        assert_eq!(
            ThermostatMode::from_normalized("auto"),
            Some(ThermostatMode::Auto)
        );
        assert_eq!(
            ThermostatMode::from_normalized("heat"),
            Some(ThermostatMode::Heat)
        );
    }

    #[test]
    fn entities_round_trip_for_cost_estimate() {
        let cmd = Command::EstimateCost {
            city: Some("Phoenix".to_string()),
            square_feet: Some(2000.0),
            indoor_temp: Some(70.0),
        };
        let entities = cmd.entities();
        assert_eq!(entities.city_name.as_deref(), Some("Phoenix"));
        assert_eq!(entities.square_feet, Some(2000.0));
        assert_eq!(entities.indoor_temp, Some(70.0));
    }
}
