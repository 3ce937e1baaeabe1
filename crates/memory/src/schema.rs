use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The two decayed entry kinds.
///
/// | Kind   | Cap | Max age |
/// |--------|-----|---------|
/// | `Goal` | 100 | 3 days  |
/// | `Fact` | 200 | 7 days  |
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MemoryKind {
    Goal,
    Fact,
}

impl MemoryKind {
    pub fn cap(self) -> usize {
        match self {
            Self::Goal => 100,
            Self::Fact => 200,
        }
    }

    /// Entries older than this are dropped on [`prune`](crate::MemoryStore::prune).
    pub fn max_age(self) -> chrono::Duration {
        match self {
            Self::Goal => chrono::Duration::days(3),
            Self::Fact => chrono::Duration::days(7),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimestampedEntry {
    pub id: Uuid,
    pub content: String,
    pub recorded_at: DateTime<Utc>,
}

impl TimestampedEntry {
    pub fn new(content: impl Into<String>, recorded_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            content: content.into(),
            recorded_at,
        }
    }
}

/// On-disk shape: one JSON document rewritten wholesale on each flush.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MemoryFile {
    pub goals: Vec<TimestampedEntry>,
    pub facts: Vec<TimestampedEntry>,
    pub settings_snapshot: Option<serde_json::Value>,
}

/// Read-only view for the inspection endpoint.  Counts and ages only —
/// raw entries never leave the store over the inspection channel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MemorySummary {
    pub goals_count: usize,
    pub facts_count: usize,
    pub has_settings_snapshot: bool,
    pub newest_goal_age_secs: Option<i64>,
    pub newest_fact_age_secs: Option<i64>,
}
