//! Typed-value extraction from raw text fragments.
//!
//! Shared by the pattern matcher (slot capture) and the context resolver
//! (settings fallbacks).  All parsing is lenient: a fragment that cannot be
//! parsed yields `None`, never an error.

/// Parse a number tolerating thousands separators, a leading currency
/// symbol, and a trailing percent sign ("$1,200" → 1200.0, "45%" → 45.0).
pub fn parse_number(raw: &str) -> Option<f64> {
    let cleaned = raw
        .trim()
        .trim_start_matches('$')
        .trim_end_matches('%')
        .replace(',', "");
    cleaned.trim().parse::<f64>().ok()
}

/// Convert a captured number plus an optional unit word into seconds.
/// Minute words multiply by 60; anything else (or no unit) is taken as
/// seconds, the default unit for dissipation/cycle topics.
pub fn duration_secs(value: f64, unit: Option<&str>) -> f64 {
    match unit.map(str::trim) {
        Some("minute") | Some("minutes") | Some("min") | Some("mins") => value * 60.0,
        _ => value,
    }
}

/// Words that end a free-text city capture ("in denver at 70" stops
/// before "at").
const CITY_STOP_WORDS: &[&str] = &["at", "with", "for", "during", "next", "this"];

/// Trim a captured city fragment at the first trailing qualifier word and
/// title-case it for display.  Comparison elsewhere stays case-insensitive;
/// this is presentation only.
pub fn clean_city(raw: &str) -> Option<String> {
    let mut kept: Vec<&str> = Vec::new();
    for word in raw.split_whitespace() {
        if CITY_STOP_WORDS.contains(&word.trim_end_matches(',')) {
            break;
        }
        kept.push(word);
    }
    if kept.is_empty() {
        return None;
    }
    Some(title_case_city(&kept.join(" ")))
}

/// Title-case each word of a city name; a short token following a comma is
/// treated as a state abbreviation and upper-cased ("denver, co" →
/// "Denver, CO").
fn title_case_city(name: &str) -> String {
    let mut out: Vec<String> = Vec::new();
    let mut after_comma = false;
    for word in name.split_whitespace() {
        let bare = word.trim_end_matches(',');
        let formatted = if after_comma && bare.len() <= 2 {
            word.to_uppercase()
        } else {
            capitalize(word)
        };
        after_comma = word.ends_with(',');
        out.push(formatted);
    }
    out.join(" ")
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_numbers_parse() {
        assert_eq!(parse_number("72"), Some(72.0));
        assert_eq!(parse_number("1.5"), Some(1.5));
        assert_eq!(parse_number(" 300 "), Some(300.0));
    }

    #[test]
    fn thousands_separators_are_stripped() {
        assert_eq!(parse_number("2,000"), Some(2000.0));
        assert_eq!(parse_number("1,234,567"), Some(1234567.0));
    }

    #[test]
    fn currency_and_percent_tolerated() {
        assert_eq!(parse_number("$1,200"), Some(1200.0));
        assert_eq!(parse_number("45%"), Some(45.0));
        assert_eq!(parse_number("$0.14"), Some(0.14));
    }

    #[test]
    fn garbage_yields_none() {
        assert_eq!(parse_number("seventy"), None);
        assert_eq!(parse_number(""), None);
    }

    #[test]
    fn minutes_convert_to_seconds() {
        assert_eq!(duration_secs(5.0, Some("minutes")), 300.0);
        assert_eq!(duration_secs(1.0, Some("min")), 60.0);
        assert_eq!(duration_secs(90.0, Some("seconds")), 90.0);
        assert_eq!(duration_secs(90.0, None), 90.0);
    }

    #[test]
    fn city_stops_at_qualifier() {
        assert_eq!(
            clean_city("denver at 70 degrees").as_deref(),
            Some("Denver")
        );
        assert_eq!(clean_city("phoenix").as_deref(), Some("Phoenix"));
    }

    #[test]
    fn state_abbreviation_is_uppercased() {
        assert_eq!(clean_city("denver, co").as_deref(), Some("Denver, CO"));
        assert_eq!(
            clean_city("salt lake city, ut").as_deref(),
            Some("Salt Lake City, UT")
        );
    }

    #[test]
    fn empty_fragment_yields_none() {
        assert_eq!(clean_city("at 70"), None);
        assert_eq!(clean_city(""), None);
    }
}
