use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::keywords::{extract_keywords, session_reference};

/// The persisted memory document.
///
/// Fields this crate does not know about are carried through `extra` so a
/// read-merge-write never drops data written by other tools.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    #[serde(default)]
    pub learnings: Vec<Value>,
    #[serde(default)]
    pub rules: Vec<Value>,
    #[serde(default)]
    pub stats: MemoryStats,
    /// Lowercase keyword -> distinct session references, in insertion order.
    #[serde(default)]
    pub search_index: BTreeMap<String, Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Cumulative counters across reflected sessions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    #[serde(default)]
    pub total_sessions: u64,
    #[serde(default)]
    pub auto_reflections: u64,
    /// RFC 3339 end time of the most recent reflected session.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_auto_reflection: Option<String>,
    #[serde(default)]
    pub total_errors: u64,
    #[serde(default)]
    pub trigger_counts: BTreeMap<String, u64>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// The parts of a finished session the memory cares about.
#[derive(Debug, Clone, Copy)]
pub struct SessionObservation<'a> {
    pub session_id: &'a str,
    pub end_time: DateTime<Utc>,
    pub total_errors: usize,
    pub error_patterns: &'a [String],
}

impl Memory {
    /// Merge one reflected session into the memory.
    ///
    /// Counters are not de-duplicated by session: merging the same
    /// observation twice counts it twice. Only the search index keeps at
    /// most one reference per session and keyword.
    pub fn merge(&mut self, observation: &SessionObservation<'_>, fired: &[String]) {
        let stats = &mut self.stats;
        stats.total_sessions += 1;
        stats.auto_reflections += 1;
        stats.last_auto_reflection = Some(observation.end_time.to_rfc3339());
        stats.total_errors += observation.total_errors as u64;

        for trigger in fired {
            *stats.trigger_counts.entry(trigger.clone()).or_insert(0) += 1;
        }

        let reference = session_reference(observation.session_id);
        for pattern in observation.error_patterns {
            for keyword in extract_keywords(pattern) {
                let sessions = self.search_index.entry(keyword).or_default();
                if !sessions.contains(&reference) {
                    sessions.push(reference.clone());
                }
            }
        }
    }

    /// Sessions whose error patterns mentioned `keyword`.
    pub fn sessions_for(&self, keyword: &str) -> &[String] {
        self.search_index
            .get(&keyword.to_lowercase())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn observation<'a>(id: &'a str, patterns: &'a [String]) -> SessionObservation<'a> {
        SessionObservation {
            session_id: id,
            end_time: Utc.with_ymd_and_hms(2026, 10, 19, 12, 30, 0).unwrap(),
            total_errors: 3,
            error_patterns: patterns,
        }
    }

    #[test]
    fn test_merge_into_empty_memory() {
        let patterns = vec!["TypeError: expected str, got int".to_string()];
        let mut memory = Memory::default();

        memory.merge(&observation("demo", &patterns), &["high_errors".to_string()]);

        assert_eq!(memory.stats.total_sessions, 1);
        assert_eq!(memory.stats.auto_reflections, 1);
        assert_eq!(memory.stats.total_errors, 3);
        assert_eq!(memory.stats.trigger_counts["high_errors"], 1);
        assert_eq!(
            memory.stats.last_auto_reflection.as_deref(),
            Some("2026-10-19T12:30:00+00:00")
        );
        assert_eq!(memory.sessions_for("typeerror:"), ["session_demo"]);
        assert_eq!(memory.sessions_for("expected"), ["session_demo"]);
        // "str," is four characters and kept
        assert_eq!(memory.sessions_for("str,"), ["session_demo"]);
        assert_eq!(memory.sessions_for("got"), ["session_demo"]);
    }

    #[test]
    fn test_merge_twice_counts_twice_but_indexes_once() {
        let patterns = vec!["SyntaxError: unexpected indent".to_string()];
        let fired = vec!["high_errors".to_string(), "low_completion".to_string()];
        let mut memory = Memory::default();

        memory.merge(&observation("demo", &patterns), &fired);
        memory.merge(&observation("demo", &patterns), &fired);

        assert_eq!(memory.stats.total_sessions, 2);
        assert_eq!(memory.stats.auto_reflections, 2);
        assert_eq!(memory.stats.total_errors, 6);
        assert_eq!(memory.stats.trigger_counts["low_completion"], 2);
        for sessions in memory.search_index.values() {
            assert_eq!(sessions, &vec!["session_demo".to_string()]);
        }
    }

    #[test]
    fn test_merge_appends_distinct_sessions_in_order() {
        let patterns = vec!["ConnectionError: timeout after 30s".to_string()];
        let mut memory = Memory::default();

        memory.merge(&observation("first", &patterns), &[]);
        memory.merge(&observation("second", &patterns), &[]);

        assert_eq!(
            memory.sessions_for("TIMEOUT"),
            ["session_first", "session_second"]
        );
        assert!(memory.stats.trigger_counts.is_empty());
    }

    #[test]
    fn test_unknown_fields_survive_roundtrip() {
        let json = r#"{
            "learnings": [{"id": "L001"}],
            "rules": [],
            "stats": {"totalSessions": 4, "manualReflections": 2},
            "searchIndex": {"timeout": ["session_old"]},
            "version": 3
        }"#;

        let memory: Memory = serde_json::from_str(json).unwrap();
        assert_eq!(memory.stats.total_sessions, 4);
        assert_eq!(memory.extra["version"], 3);

        let value = serde_json::to_value(&memory).unwrap();
        assert_eq!(value["stats"]["manualReflections"], 2);
        assert_eq!(value["learnings"][0]["id"], "L001");
        assert_eq!(value["version"], 3);
    }
}
