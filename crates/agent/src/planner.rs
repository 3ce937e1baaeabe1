//! Keyword-family goal planner.
//!
//! Each family is matched independently against the goal text; a goal that
//! matches several families gets their tool lists concatenated with
//! duplicates removed, preserving first-seen order.  Nothing matched falls
//! back to the clock tool — the planner never returns an empty plan.

struct KeywordFamily {
    keywords: &'static [&'static str],
    tools: &'static [&'static str],
}

/// Families in priority order.  The comprehensive family comes first so a
/// "full report" goal leads with the complete sequence before any narrower
/// family appends.
const FAMILIES: &[KeywordFamily] = &[
    KeywordFamily {
        keywords: &["comprehensive", "full report", "complete analysis", "everything"],
        tools: &[
            "cost_forecast",
            "performance_analysis",
            "snapshot_settings",
            "current_time",
        ],
    },
    KeywordFamily {
        keywords: &["cost", "forecast", "bill", "price"],
        tools: &["cost_forecast"],
    },
    KeywordFamily {
        keywords: &["performance", "efficiency", "cop", "runtime"],
        tools: &["performance_analysis"],
    },
    KeywordFamily {
        keywords: &["remember", "memorize", "memory", "recall"],
        tools: &["remember_fact", "recall_memory"],
    },
    KeywordFamily {
        keywords: &["snapshot", "settings"],
        tools: &["snapshot_settings"],
    },
];

/// Tool selected when no family matches.
pub const FALLBACK_TOOL: &str = "current_time";

/// Select the ordered tool list for a free-text goal.
pub fn plan(goal: &str) -> Vec<String> {
    let lowered = goal.to_lowercase();
    let mut tools: Vec<String> = Vec::new();
    for family in FAMILIES {
        let matched = family
            .keywords
            .iter()
            .any(|keyword| lowered.contains(keyword));
        if !matched {
            continue;
        }
        for tool in family.tools {
            if !tools.iter().any(|t| t == tool) {
                tools.push((*tool).to_string());
            }
        }
    }
    if tools.is_empty() {
        tools.push(FALLBACK_TOOL.to_string());
    }
    tools
}
