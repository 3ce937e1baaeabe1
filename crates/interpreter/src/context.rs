//! Multi-turn slot resolution.
//!
//! A freshly matched command can be incomplete ("what about 72 degrees"
//! names a temperature and nothing else).  Missing slots are copied from
//! the previous turn's entities; a newly stated explicit value always
//! replaces the inherited one — last-explicit-value-wins, never a partial
//! merge within one slot.

use crate::command::{Command, ConversationalContext};

/// Fill the omitted slots of `command` from `context`.  Only the
/// cost-estimate command has inheritable slots; every other command is
/// already complete when it matches.
pub fn resolve(command: Command, context: &ConversationalContext) -> Command {
    match command {
        Command::EstimateCost {
            city,
            square_feet,
            indoor_temp,
        } => Command::EstimateCost {
            city: city
                .or_else(|| context.last_query.city_name.clone())
                .or_else(|| context.user_location.clone()),
            square_feet: square_feet
                .or(context.last_query.square_feet)
                .or_else(|| settings_number(context, "squareFeet")),
            indoor_temp: indoor_temp.or(context.last_query.indoor_temp),
        },
        other => other,
    }
}

fn settings_number(context: &ConversationalContext, key: &str) -> Option<f64> {
    context
        .user_settings
        .as_ref()
        .and_then(|settings| settings.get(key))
        .and_then(|value| value.as_f64())
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::command::EntitySet;

    fn context_with_city(city: &str) -> ConversationalContext {
        ConversationalContext {
            last_query: EntitySet {
                city_name: Some(city.to_string()),
                ..EntitySet::default()
            },
            ..ConversationalContext::default()
        }
    }

    #[test]
    fn missing_city_inherited_from_last_query() {
        let resolved = resolve(
            Command::EstimateCost {
                city: None,
                square_feet: None,
                indoor_temp: Some(72.0),
            },
            &context_with_city("Denver, CO"),
        );
        assert_eq!(
            resolved,
            Command::EstimateCost {
                city: Some("Denver, CO".to_string()),
                square_feet: None,
                indoor_temp: Some(72.0),
            }
        );
    }

    #[test]
    fn explicit_city_overrides_inherited() {
        let resolved = resolve(
            Command::EstimateCost {
                city: Some("Phoenix".to_string()),
                square_feet: Some(2000.0),
                indoor_temp: Some(70.0),
            },
            &context_with_city("Denver, CO"),
        );
        assert_eq!(
            resolved,
            Command::EstimateCost {
                city: Some("Phoenix".to_string()),
                square_feet: Some(2000.0),
                indoor_temp: Some(70.0),
            }
        );
    }

    #[test]
    fn user_location_is_the_city_fallback_of_last_resort() {
        let context = ConversationalContext {
            user_location: Some("Boise, ID".to_string()),
            ..ConversationalContext::default()
        };
        let resolved = resolve(
            Command::EstimateCost {
                city: None,
                square_feet: None,
                indoor_temp: None,
            },
            &context,
        );
        assert_eq!(
            resolved,
            Command::EstimateCost {
                city: Some("Boise, ID".to_string()),
                square_feet: None,
                indoor_temp: None,
            }
        );
    }

    #[test]
    fn square_feet_falls_back_to_user_settings() {
        let context = ConversationalContext {
            user_settings: Some(json!({ "squareFeet": 1500 })),
            ..ConversationalContext::default()
        };
        let resolved = resolve(
            Command::EstimateCost {
                city: Some("Denver".to_string()),
                square_feet: None,
                indoor_temp: None,
            },
            &context,
        );
        assert_eq!(
            resolved,
            Command::EstimateCost {
                city: Some("Denver".to_string()),
                square_feet: Some(1500.0),
                indoor_temp: None,
            }
        );
    }

    #[test]
    fn non_estimate_commands_pass_through_untouched() {
        let command = Command::SetSetting {
            key: crate::command::SettingKey::TargetTemp,
            value: 70.0,
        };
        let resolved = resolve(command.clone(), &context_with_city("Denver, CO"));
        assert_eq!(resolved, command);
    }
}
