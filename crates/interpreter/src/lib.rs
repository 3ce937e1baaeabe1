//! Natural-language command interpreter for the Joule climate assistant.
//!
//! Converts one free-form utterance (typed or voice-transcribed) plus the
//! conversational context of the previous turn into a typed [`Command`].
//! Pure and synchronous: same inputs, same output, no suspension points,
//! and no error path — text that matches nothing yields
//! [`Command::NonCommand`], to be handled by an external fallback.

mod command;
mod context;
mod entity;
mod patterns;

pub use command::{
    Command, ConversationalContext, EntitySet, Page, SettingKey, ThermostatMode,
};

/// Interpret one utterance against the caller's conversational context.
///
/// Matching is case-insensitive and whitespace-tolerant; an empty or
/// whitespace-only utterance returns [`Command::NonCommand`] without ever
/// invoking the matcher.
pub fn interpret(utterance: &str, context: &ConversationalContext) -> Command {
    if utterance.trim().is_empty() {
        return Command::NonCommand;
    }
    let normalized = patterns::normalize(utterance);
    let matched = patterns::match_utterance(&normalized);
    context::resolve(matched, context)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bare(utterance: &str) -> Command {
        interpret(utterance, &ConversationalContext::default())
    }

    #[test]
    fn empty_input_short_circuits() {
        assert_eq!(bare(""), Command::NonCommand);
        assert_eq!(bare("   \t  "), Command::NonCommand);
    }

    #[test]
    fn garbage_input_is_a_non_command_not_an_error() {
        let result = bare("random gibberish text");
        assert_eq!(result, Command::NonCommand);
        assert!(!result.is_command());
        assert_eq!(result.to_json(), serde_json::json!({}));
    }

    #[test]
    fn set_commands_carry_the_literal_value() {
        for (utterance, action, value) in [
            ("set heat differential to 1.5", "set_heat_differential", 1.5),
            ("Set Heat Differential To 1.5", "set_heat_differential", 1.5),
            ("set aux heat lockout to 35", "set_aux_heat_lockout", 35.0),
            ("set fan dissipation to 90", "set_fan_dissipation", 90.0),
        ] {
            let cmd = bare(utterance);
            assert!(cmd.is_command(), "not a command: {utterance:?}");
            assert_eq!(cmd.action(), Some(action), "wrong action for {utterance:?}");
            match cmd {
                Command::SetSetting { value: v, .. } => assert_eq!(v, value),
                other => panic!("expected SetSetting for {utterance:?}, got {other:?}"),
            }
        }
    }

    #[test]
    fn topic_spelling_variants_resolve_to_one_action() {
        let slash = bare("set mode to heat/cool");
        let dash = bare("set mode to heat-cool");
        let space = bare("set mode to heat cool");
        assert_eq!(slash, dash);
        assert_eq!(dash, space);
        assert_eq!(
            space,
            Command::SetMode {
                mode: ThermostatMode::Auto
            }
        );
    }

    #[test]
    fn interpret_is_idempotent() {
        let context = ConversationalContext {
            last_query: EntitySet {
                city_name: Some("Denver, CO".to_string()),
                ..EntitySet::default()
            },
            ..ConversationalContext::default()
        };
        let first = interpret("what about 72 degrees", &context);
        let second = interpret("what about 72 degrees", &context);
        assert_eq!(first, second);
    }

    #[test]
    fn context_inheritance_fills_the_missing_city() {
        let context = ConversationalContext {
            last_query: EntitySet {
                city_name: Some("Denver, CO".to_string()),
                ..EntitySet::default()
            },
            ..ConversationalContext::default()
        };
        let cmd = interpret("what about 72 degrees", &context);
        assert_eq!(
            cmd,
            Command::EstimateCost {
                city: Some("Denver, CO".to_string()),
                square_feet: None,
                indoor_temp: Some(72.0),
            }
        );
    }

    #[test]
    fn new_explicit_values_fully_replace_inherited_ones() {
        let context = ConversationalContext {
            last_query: EntitySet {
                city_name: Some("Denver, CO".to_string()),
                square_feet: Some(900.0),
                indoor_temp: Some(65.0),
                ..EntitySet::default()
            },
            ..ConversationalContext::default()
        };
        let cmd = interpret("2000 sq ft in Phoenix at 70", &context);
        assert_eq!(
            cmd,
            Command::EstimateCost {
                city: Some("Phoenix".to_string()),
                square_feet: Some(2000.0),
                indoor_temp: Some(70.0),
            }
        );
    }

    #[test]
    fn interpreter_never_mutates_the_caller_context() {
        let context = ConversationalContext {
            last_query: EntitySet {
                city_name: Some("Denver, CO".to_string()),
                ..EntitySet::default()
            },
            ..ConversationalContext::default()
        };
        let _ = interpret("what about phoenix", &context);
        assert_eq!(context.last_query.city_name.as_deref(), Some("Denver, CO"));
    }
}
