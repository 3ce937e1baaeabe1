use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use tracing::info;

use crate::schema::{MemoryFile, MemoryKind, MemorySummary, TimestampedEntry};

/// Bounded, time-decayed store of prior goals, remembered facts, and the
/// latest external settings snapshot.
///
/// Ring-buffer semantics: appends beyond a kind's cap drop the oldest
/// entry, newest last.  Pruning happens at every run submission rather
/// than on a timer, so staleness is bounded by "time since last run".
#[derive(Debug, Default)]
pub struct MemoryStore {
    goals: VecDeque<TimestampedEntry>,
    facts: VecDeque<TimestampedEntry>,
    settings_snapshot: Option<serde_json::Value>,
    /// Set on every mutation, cleared when a flush captures the state.
    dirty: bool,
}

impl MemoryStore {
    /// Rebuild the store from a persisted document, re-applying caps in
    /// case the file was written by a build with larger ones.
    pub fn from_file(file: MemoryFile) -> Self {
        let mut store = Self {
            goals: file.goals.into(),
            facts: file.facts.into(),
            settings_snapshot: file.settings_snapshot,
            dirty: false,
        };
        store.enforce_cap(MemoryKind::Goal);
        store.enforce_cap(MemoryKind::Fact);
        store
    }

    /// Append an entry, dropping the oldest when the kind's cap is reached.
    pub fn remember(&mut self, kind: MemoryKind, content: impl Into<String>, now: DateTime<Utc>) {
        let entry = TimestampedEntry::new(content, now);
        self.ring_mut(kind).push_back(entry);
        self.enforce_cap(kind);
        self.dirty = true;
    }

    /// Most recent entries of a kind, newest first, at most `limit`.
    pub fn recent(&self, kind: MemoryKind, limit: usize) -> Vec<&TimestampedEntry> {
        self.ring(kind).iter().rev().take(limit).collect()
    }

    /// Replace the stored settings snapshot.
    pub fn snapshot_settings(&mut self, settings: serde_json::Value) {
        self.settings_snapshot = Some(settings);
        self.dirty = true;
    }

    pub fn settings_snapshot(&self) -> Option<&serde_json::Value> {
        self.settings_snapshot.as_ref()
    }

    /// Drop entries older than each kind's age threshold.  Returns the
    /// number of entries removed.
    pub fn prune(&mut self, now: DateTime<Utc>) -> usize {
        let mut removed = 0;
        for kind in [MemoryKind::Goal, MemoryKind::Fact] {
            let cutoff = now - kind.max_age();
            let ring = self.ring_mut(kind);
            let before = ring.len();
            ring.retain(|entry| entry.recorded_at > cutoff);
            removed += before - ring.len();
        }
        if removed > 0 {
            self.dirty = true;
            info!(removed, "pruned stale memory entries");
        }
        removed
    }

    pub fn summary(&self, now: DateTime<Utc>) -> MemorySummary {
        let newest_age = |ring: &VecDeque<TimestampedEntry>| {
            ring.back()
                .map(|entry| (now - entry.recorded_at).num_seconds())
        };
        MemorySummary {
            goals_count: self.goals.len(),
            facts_count: self.facts.len(),
            has_settings_snapshot: self.settings_snapshot.is_some(),
            newest_goal_age_secs: newest_age(&self.goals),
            newest_fact_age_secs: newest_age(&self.facts),
        }
    }

    /// Re-flag unflushed state after a failed durable write so the next
    /// flush interval retries it.
    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Snapshot the current state for a durable flush and clear the dirty
    /// flag.  Returns `None` when nothing changed since the last capture.
    pub fn capture_if_dirty(&mut self) -> Option<MemoryFile> {
        if !self.dirty {
            return None;
        }
        self.dirty = false;
        Some(MemoryFile {
            goals: self.goals.iter().cloned().collect(),
            facts: self.facts.iter().cloned().collect(),
            settings_snapshot: self.settings_snapshot.clone(),
        })
    }

    fn ring(&self, kind: MemoryKind) -> &VecDeque<TimestampedEntry> {
        match kind {
            MemoryKind::Goal => &self.goals,
            MemoryKind::Fact => &self.facts,
        }
    }

    fn ring_mut(&mut self, kind: MemoryKind) -> &mut VecDeque<TimestampedEntry> {
        match kind {
            MemoryKind::Goal => &mut self.goals,
            MemoryKind::Fact => &mut self.facts,
        }
    }

    fn enforce_cap(&mut self, kind: MemoryKind) {
        let cap = kind.cap();
        let ring = self.ring_mut(kind);
        while ring.len() > cap {
            ring.pop_front();
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    #[test]
    fn remember_and_recent_are_newest_first() {
        let mut store = MemoryStore::default();
        let now = Utc::now();
        store.remember(MemoryKind::Fact, "first", now);
        store.remember(MemoryKind::Fact, "second", now + Duration::seconds(1));

        let recent = store.recent(MemoryKind::Fact, 10);
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].content, "second");
        assert_eq!(recent[1].content, "first");
    }

    #[test]
    fn goal_cap_drops_the_oldest() {
        let mut store = MemoryStore::default();
        let now = Utc::now();
        for i in 0..150 {
            store.remember(MemoryKind::Goal, format!("goal-{i}"), now);
        }
        let recent = store.recent(MemoryKind::Goal, 200);
        assert_eq!(recent.len(), MemoryKind::Goal.cap());
        // Newest survive; the first 50 were dropped.
        assert_eq!(recent[0].content, "goal-149");
        assert_eq!(recent.last().unwrap().content, "goal-50");
    }

    #[test]
    fn prune_drops_entries_past_their_age_threshold() {
        let mut store = MemoryStore::default();
        let now = Utc::now();
        store.remember(MemoryKind::Fact, "ancient", now - Duration::days(8));
        store.remember(MemoryKind::Fact, "fresh", now - Duration::days(1));
        store.remember(MemoryKind::Goal, "old goal", now - Duration::days(4));
        store.remember(MemoryKind::Goal, "new goal", now - Duration::hours(1));

        let removed = store.prune(now);
        assert_eq!(removed, 2);
        let facts = store.recent(MemoryKind::Fact, 10);
        assert_eq!(facts.len(), 1);
        assert_eq!(facts[0].content, "fresh");
        let goals = store.recent(MemoryKind::Goal, 10);
        assert_eq!(goals.len(), 1);
        assert_eq!(goals[0].content, "new goal");
    }

    #[test]
    fn goals_outlive_nothing_past_three_days_facts_past_seven() {
        let mut store = MemoryStore::default();
        let now = Utc::now();
        // A 5-day-old fact survives the 7-day threshold; a 5-day-old goal
        // does not survive the 3-day one.
        store.remember(MemoryKind::Fact, "5d fact", now - Duration::days(5));
        store.remember(MemoryKind::Goal, "5d goal", now - Duration::days(5));
        store.prune(now);
        assert_eq!(store.recent(MemoryKind::Fact, 10).len(), 1);
        assert!(store.recent(MemoryKind::Goal, 10).is_empty());
    }

    #[test]
    fn summary_reports_counts_and_ages_only() {
        let mut store = MemoryStore::default();
        let now = Utc::now();
        store.remember(MemoryKind::Goal, "g", now - Duration::seconds(30));
        store.snapshot_settings(serde_json::json!({ "squareFeet": 2000 }));

        let summary = store.summary(now);
        assert_eq!(summary.goals_count, 1);
        assert_eq!(summary.facts_count, 0);
        assert!(summary.has_settings_snapshot);
        assert_eq!(summary.newest_goal_age_secs, Some(30));
        assert_eq!(summary.newest_fact_age_secs, None);
    }

    #[test]
    fn capture_if_dirty_only_after_mutation() {
        let mut store = MemoryStore::default();
        assert!(store.capture_if_dirty().is_none());

        store.remember(MemoryKind::Fact, "f", Utc::now());
        let file = store.capture_if_dirty().expect("dirty after remember");
        assert_eq!(file.facts.len(), 1);
        // Second capture with no further mutation is a no-op.
        assert!(store.capture_if_dirty().is_none());
    }

    #[test]
    fn from_file_re_applies_caps() {
        let now = Utc::now();
        let file = MemoryFile {
            goals: (0..120)
                .map(|i| TimestampedEntry::new(format!("g{i}"), now))
                .collect(),
            facts: Vec::new(),
            settings_snapshot: None,
        };
        let store = MemoryStore::from_file(file);
        assert_eq!(store.recent(MemoryKind::Goal, 500).len(), 100);
    }
}
