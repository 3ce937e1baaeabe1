//! The ordered command-pattern table.
//!
//! Patterns are tried top-to-bottom and the first structural match wins —
//! no backtracking across rejected alternatives.  Ordering rules:
//!
//! 1. Explicit imperatives with a value ("set heat differential to 1.5")
//!    before bare informational queries ("what is my heat differential").
//! 2. Within a topic, fully-qualified phrasings ("compressor min cycle off
//!    time") before abbreviated synonyms ("compressor lockout"), and "aux
//!    heat lockout" before any abbreviated lockout form that could shadow it.
//!
//! Synonym normalization ("heat/cool" → "heat cool") happens once in
//! [`normalize`], not per pattern.

use std::sync::LazyLock;

use regex::{Captures, Regex};

use crate::command::{Command, Page, SettingKey, ThermostatMode};
use crate::entity::{clean_city, duration_secs, parse_number};

/// Number fragment: optional currency symbol, thousands separators,
/// decimals, optional percent suffix.
const NUM: &str = r"\$?\d[\d,]*(?:\.\d+)?%?";

/// Builders receive the captures of the winning pattern plus the full
/// normalized utterance (cost-estimate slots can sit outside the fragment
/// that triggered the match).
type Builder = fn(&Captures, &str) -> Command;

struct PatternEntry {
    regex: Regex,
    build: Builder,
}

fn entry(pattern: &str, build: Builder) -> PatternEntry {
    PatternEntry {
        regex: Regex::new(pattern).expect("pattern table regex compiles"),
        build,
    }
}

static PATTERNS: LazyLock<Vec<PatternEntry>> = LazyLock::new(|| {
    vec![
        // ── Imperatives with an explicit value ───────────────────────────
        entry(
            r"^(?:set|switch|change|put)\s+(?:the\s+)?(?:mode|system|thermostat)\s+(?:to\s+)?(?P<mode>heat cool|auto|heat|cool|off)(?:\s+mode)?$",
            build_set_mode,
        ),
        entry(
            &format!(
                r"^set\s+(?:the\s+)?compressor\s+min(?:imum)?\s+cycle\s+off\s+time\s+to\s+(?P<num>{NUM})(?:\s*(?P<unit>minutes?|mins?|seconds?|secs?))?$"
            ),
            build_compressor_off,
        ),
        entry(
            &format!(
                r"^set\s+(?:the\s+)?aux(?:iliary)?\s+(?:heat\s+)?lockout\s+to\s+(?P<num>{NUM})(?:\s*degrees?)?$"
            ),
            build_aux_lockout,
        ),
        entry(
            &format!(
                r"^set\s+(?:the\s+)?compressor\s+(?:lockout|off\s+time)\s+to\s+(?P<num>{NUM})(?:\s*(?P<unit>minutes?|mins?|seconds?|secs?))?$"
            ),
            build_compressor_off,
        ),
        entry(
            &format!(
                r"^set\s+(?:the\s+)?(?:fan\s+)?dissipation(?:\s+time)?\s+to\s+(?P<num>{NUM})(?:\s*(?P<unit>minutes?|mins?|seconds?|secs?))?$"
            ),
            build_dissipation,
        ),
        entry(
            &format!(
                r"^set\s+(?:the\s+)?(?P<which>heat|cool)\s+differential\s+to\s+(?P<num>{NUM})(?:\s*degrees?)?$"
            ),
            build_differential,
        ),
        entry(
            &format!(
                r"^set\s+(?:the\s+)?(?:target\s+)?temp(?:erature)?\s+to\s+(?P<num>{NUM})(?:\s*degrees?)?$"
            ),
            build_target_temp,
        ),
        // ── Informational queries ────────────────────────────────────────
        entry(
            r"^what(?:'s|s|\s+is)\s+(?:my\s+|the\s+)?(?P<topic>compressor\s+min(?:imum)?\s+cycle\s+off\s+time|aux(?:iliary)?\s+(?:heat\s+)?lockout|compressor\s+lockout|fan\s+dissipation(?:\s+time)?|dissipation(?:\s+time)?|heat\s+differential|cool\s+differential|target\s+temp(?:erature)?)$",
            build_query,
        ),
        // ── Cost estimates ───────────────────────────────────────────────
        entry(
            &format!(r"(?:{NUM})\s*(?:sq\.?\s*ft\.?|square\s+feet|sqft)\b"),
            build_estimate,
        ),
        entry(
            r"(?:how\s+much|heating\s+cost|cooling\s+cost|energy\s+bill|cost\s+to\s+(?:heat|cool)|estimate\b)",
            build_estimate,
        ),
        // ── Follow-up ellipsis ("what about 72 degrees") ─────────────────
        entry(r"^(?:what|how)\s+about\s+(?P<rest>.+)$", build_what_about),
        // ── Navigation ───────────────────────────────────────────────────
        entry(
            r"^(?:go\s+to|open|show(?:\s+me)?|take\s+me\s+to)\s+(?:the\s+)?(?P<page>dashboard|settings|forecast|schedule|home)(?:\s+(?:page|screen|tab))?$",
            build_navigate,
        ),
    ]
});

/// Lowercase, trim, collapse whitespace, strip trailing punctuation, and
/// apply synonym normalization so "heat/cool", "heat-cool" and "heat cool"
/// all compare equal before any pattern sees the text.
pub fn normalize(utterance: &str) -> String {
    let lowered = utterance.trim().to_lowercase();
    let collapsed = lowered
        .replace("heat/cool", "heat cool")
        .replace("heat-cool", "heat cool");
    let stripped = collapsed.trim_end_matches(['?', '.', '!']);
    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Run the normalized utterance through the table; first match wins.
pub fn match_utterance(normalized: &str) -> Command {
    for entry in PATTERNS.iter() {
        if let Some(caps) = entry.regex.captures(normalized) {
            return (entry.build)(&caps, normalized);
        }
    }
    Command::NonCommand
}

// ── Builders ─────────────────────────────────────────────────────────────────

fn build_set_mode(caps: &Captures, _full: &str) -> Command {
    match ThermostatMode::from_normalized(&caps["mode"]) {
        Some(mode) => Command::SetMode { mode },
        None => Command::NonCommand,
    }
}

fn captured_value(caps: &Captures) -> Option<f64> {
    parse_number(caps.name("num")?.as_str())
}

fn build_compressor_off(caps: &Captures, _full: &str) -> Command {
    let Some(value) = captured_value(caps) else {
        return Command::NonCommand;
    };
    let unit = caps.name("unit").map(|m| m.as_str());
    Command::SetSetting {
        key: SettingKey::CompressorMinCycleOff,
        value: duration_secs(value, unit),
    }
}

fn build_aux_lockout(caps: &Captures, _full: &str) -> Command {
    match captured_value(caps) {
        Some(value) => Command::SetSetting {
            key: SettingKey::AuxHeatLockout,
            value,
        },
        None => Command::NonCommand,
    }
}

fn build_dissipation(caps: &Captures, _full: &str) -> Command {
    let Some(value) = captured_value(caps) else {
        return Command::NonCommand;
    };
    let unit = caps.name("unit").map(|m| m.as_str());
    Command::SetSetting {
        key: SettingKey::FanDissipation,
        value: duration_secs(value, unit),
    }
}

fn build_differential(caps: &Captures, _full: &str) -> Command {
    let Some(value) = captured_value(caps) else {
        return Command::NonCommand;
    };
    let key = if &caps["which"] == "heat" {
        SettingKey::HeatDifferential
    } else {
        SettingKey::CoolDifferential
    };
    Command::SetSetting { key, value }
}

fn build_target_temp(caps: &Captures, _full: &str) -> Command {
    match captured_value(caps) {
        Some(value) => Command::SetSetting {
            key: SettingKey::TargetTemp,
            value,
        },
        None => Command::NonCommand,
    }
}

fn build_query(caps: &Captures, _full: &str) -> Command {
    let topic = &caps["topic"];
    let key = if topic.starts_with("aux") {
        SettingKey::AuxHeatLockout
    } else if topic.starts_with("compressor") {
        SettingKey::CompressorMinCycleOff
    } else if topic.contains("dissipation") {
        SettingKey::FanDissipation
    } else if topic.starts_with("heat") {
        SettingKey::HeatDifferential
    } else if topic.starts_with("cool") {
        SettingKey::CoolDifferential
    } else {
        SettingKey::TargetTemp
    };
    Command::QuerySetting { key }
}

static CITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\bin\s+(?P<city>[a-z][a-z ,.']*)").expect("city regex compiles")
});
static TEMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"\bat\s+(?P<temp>{NUM})(?:\s*degrees?)?")).expect("temp regex compiles")
});
static SQFT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(
        r"(?P<sqft>{NUM})\s*(?:sq\.?\s*ft\.?|square\s+feet|sqft)\b"
    ))
    .expect("sqft regex compiles")
});

/// Cost-estimate slots are scanned from the whole utterance regardless of
/// which fragment triggered the match; slots the speaker omitted stay
/// `None` for the context resolver to fill.
fn build_estimate(_caps: &Captures, full: &str) -> Command {
    let city = CITY_RE
        .captures(full)
        .and_then(|c| clean_city(&c["city"]));
    let square_feet = SQFT_RE
        .captures(full)
        .and_then(|c| parse_number(&c["sqft"]));
    let indoor_temp = TEMP_RE
        .captures(full)
        .and_then(|c| parse_number(&c["temp"]));
    Command::EstimateCost {
        city,
        square_feet,
        indoor_temp,
    }
}

static BARE_TEMP_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(&format!(r"^(?P<temp>{NUM})(?:\s*degrees?)?$")).expect("bare temp regex compiles")
});

/// "what about …" inherits everything except the one slot the speaker
/// restated: a bare number reads as an indoor temperature, a number with an
/// area unit as square footage, anything else as a city.
fn build_what_about(caps: &Captures, _full: &str) -> Command {
    let rest = caps["rest"].trim().to_string();
    if let Some(sq) = SQFT_RE.captures(&rest) {
        if let Some(square_feet) = parse_number(&sq["sqft"]) {
            return Command::EstimateCost {
                city: None,
                square_feet: Some(square_feet),
                indoor_temp: None,
            };
        }
    }
    if let Some(t) = BARE_TEMP_RE.captures(&rest) {
        if let Some(indoor_temp) = parse_number(&t["temp"]) {
            return Command::EstimateCost {
                city: None,
                square_feet: None,
                indoor_temp: Some(indoor_temp),
            };
        }
    }
    match clean_city(&rest) {
        Some(city) => Command::EstimateCost {
            city: Some(city),
            square_feet: None,
            indoor_temp: None,
        },
        None => Command::NonCommand,
    }
}

fn build_navigate(caps: &Captures, _full: &str) -> Command {
    match Page::from_normalized(&caps["page"]) {
        Some(target) => Command::Navigate { target },
        None => Command::NonCommand,
    }
}
