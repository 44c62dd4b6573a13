//! Persisted paper record: topic -> paper id -> row.

use anyhow::{Context, Result};
use serde_json::{Map, Value};
use std::collections::BTreeMap;
use std::path::Path;

use super::record::{PaperRow, StoredRow};

/// Rows of one topic keyed by normalized paper id.
pub type TopicPapers = BTreeMap<String, StoredRow>;

/// Search results for one topic, ready to merge.
#[derive(Debug, Clone, Default)]
pub struct TopicBatch {
    /// Topic label.
    pub topic: String,
    /// New rows keyed by normalized paper id.
    pub papers: BTreeMap<String, PaperRow>,
}

impl TopicBatch {
    /// Create a batch from a topic and its papers; later duplicates win.
    #[must_use]
    pub fn new(topic: impl Into<String>, papers: impl IntoIterator<Item = PaperRow>) -> Self {
        Self {
            topic: topic.into(),
            papers: papers.into_iter().map(|p| (p.id.clone(), p)).collect(),
        }
    }
}

/// The whole on-disk record, held in memory for one run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaperStore {
    topics: BTreeMap<String, TopicPapers>,
}

impl PaperStore {
    /// Load the record from a JSON file.
    ///
    /// Missing, unreadable or corrupt files yield an empty store; the run
    /// then rebuilds the record from fresh search results.
    pub fn load(path: &Path) -> Self {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "No existing record, starting empty");
                return Self::default();
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Record unreadable, starting empty");
                return Self::default();
            }
        };

        if content.trim().is_empty() {
            return Self::default();
        }

        match Self::from_json_str(&content) {
            Ok(store) => {
                tracing::debug!(
                    topics = store.topics.len(),
                    papers = store.paper_count(),
                    "Loaded record"
                );
                store
            }
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "Record is not valid JSON, starting empty");
                Self::default()
            }
        }
    }

    /// Parse a record from JSON text.
    pub fn from_json_str(content: &str) -> Result<Self, serde_json::Error> {
        let value: Value = serde_json::from_str(content)?;
        Ok(Self::from_value(value))
    }

    /// Build a store from a JSON value, dropping anything that is not
    /// `{topic: {id: row | null}}`.
    #[must_use]
    pub fn from_value(value: Value) -> Self {
        let Value::Object(top) = value else {
            tracing::warn!("Record root is not an object, ignoring it");
            return Self::default();
        };

        let mut topics = BTreeMap::new();
        for (topic, papers) in top {
            let Value::Object(papers) = papers else {
                tracing::warn!(topic = %topic, "Topic entry is not an object, dropping it");
                continue;
            };

            let mut rows = TopicPapers::new();
            for (id, raw) in papers {
                let row = match raw {
                    Value::String(s) => StoredRow::from_persisted(&s),
                    Value::Null => StoredRow::Empty,
                    other => {
                        tracing::warn!(topic = %topic, id = %id, value = %other, "Dropping non-text row");
                        continue;
                    }
                };
                if let StoredRow::Legacy(_) = row {
                    tracing::debug!(topic = %topic, id = %id, "Row kept in legacy form");
                }
                rows.insert(id, row);
            }
            topics.insert(topic, rows);
        }

        Self { topics }
    }

    /// Serialize to the persisted JSON shape.
    #[must_use]
    pub fn to_value(&self) -> Value {
        let top: Map<String, Value> = self
            .topics
            .iter()
            .map(|(topic, rows)| {
                let rows: Map<String, Value> = rows
                    .iter()
                    .map(|(id, row)| {
                        let value = row.display_row().map_or(Value::Null, Value::String);
                        (id.clone(), value)
                    })
                    .collect();
                (topic.clone(), Value::Object(rows))
            })
            .collect();
        Value::Object(top)
    }

    /// Write the record back as a whole-file replace.
    pub fn save(&self, path: &Path) -> Result<()> {
        let content = serde_json::to_string(&self.to_value())?;
        super::write_atomic(path, &content)
            .with_context(|| format!("Failed to write record {}", path.display()))?;
        tracing::info!(
            path = %path.display(),
            topics = self.topics.len(),
            papers = self.paper_count(),
            "Saved record"
        );
        Ok(())
    }

    /// Merge one topic's batch: existing ids are replaced, others kept.
    pub fn merge(&mut self, batch: TopicBatch) {
        let TopicBatch { topic, papers } = batch;
        let added = papers.len();
        let rows = self.topics.entry(topic.clone()).or_default();
        for (id, paper) in papers {
            rows.insert(id, StoredRow::Paper(paper));
        }
        tracing::debug!(topic = %topic, added, total = rows.len(), "Merged topic batch");
    }

    /// Merge several batches in order.
    pub fn merge_all(&mut self, batches: impl IntoIterator<Item = TopicBatch>) {
        for batch in batches {
            self.merge(batch);
        }
    }

    /// Insert a single row.
    pub fn insert(&mut self, topic: &str, id: &str, row: StoredRow) {
        self.topics
            .entry(topic.to_string())
            .or_default()
            .insert(id.to_string(), row);
    }

    /// Iterate topics in store order.
    pub fn topics(&self) -> impl Iterator<Item = (&String, &TopicPapers)> {
        self.topics.iter()
    }

    /// Rows of one topic.
    #[must_use]
    pub fn topic(&self, topic: &str) -> Option<&TopicPapers> {
        self.topics.get(topic)
    }

    /// Number of topics.
    #[must_use]
    pub fn topic_count(&self) -> usize {
        self.topics.len()
    }

    /// Total number of rows across topics.
    #[must_use]
    pub fn paper_count(&self) -> usize {
        self.topics.values().map(BTreeMap::len).sum()
    }

    /// Whether the store has no topics.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

/// Order a topic's rows newest first.
///
/// If any row lacks a parsable date the whole topic is ordered by paper id,
/// descending, instead.
pub fn sort_papers<'a>(topic: &str, papers: &'a TopicPapers) -> Vec<(&'a str, &'a StoredRow)> {
    let mut rows: Vec<(&str, &StoredRow)> = papers.iter().map(|(k, v)| (k.as_str(), v)).collect();

    let all_dated = rows
        .iter()
        .all(|(_, row)| matches!(row, StoredRow::Empty) || row.date().is_some());

    if all_dated {
        rows.sort_by(|(ka, a), (kb, b)| b.date().cmp(&a.date()).then_with(|| kb.cmp(ka)));
    } else {
        tracing::warn!(topic = %topic, "Could not sort papers by date, falling back to id order");
        rows.sort_by(|(ka, _), (kb, _)| kb.cmp(ka));
    }

    rows
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tracing_test::traced_test;

    fn paper(id: &str, date: &str, title: &str) -> PaperRow {
        PaperRow {
            id: id.to_string(),
            date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
            title: title.to_string(),
            first_author: "Ada".to_string(),
            url: format!("http://arxiv.org/abs/{id}"),
            code: None,
            comment: None,
        }
    }

    #[test]
    fn test_merge_last_write_wins() {
        let mut store = PaperStore::default();
        store.merge(TopicBatch::new("TTS", [paper("1", "2024-06-07", "Old title")]));
        store.merge(TopicBatch::new("TTS", [paper("1", "2024-06-08", "New title")]));

        let row = store.topic("TTS").unwrap().get("1").unwrap();
        assert_eq!(row.paper().unwrap().title, "New title");
        assert_eq!(store.paper_count(), 1);
    }

    #[test]
    fn test_merge_preserves_absent_keys_and_other_topics() {
        let mut store = PaperStore::default();
        store.merge(TopicBatch::new("TTS", [paper("1", "2024-06-07", "A")]));
        store.merge(TopicBatch::new("TTS", [paper("2", "2024-06-08", "B")]));
        store.merge(TopicBatch::new("ASR", [paper("3", "2024-06-08", "C")]));

        let tts = store.topic("TTS").unwrap();
        assert!(tts.contains_key("1"));
        assert!(tts.contains_key("2"));
        assert_eq!(store.topic("ASR").unwrap().len(), 1);
        assert_eq!(store.topic_count(), 2);
    }

    #[test]
    fn test_sort_by_date_descending() {
        let mut papers = TopicPapers::new();
        for (id, date) in [("a", "2024-06-07"), ("b", "2024-06-09"), ("c", "2024-06-08")] {
            papers.insert(id.to_string(), paper(id, date, id).into());
        }

        let order: Vec<_> = sort_papers("TTS", &papers)
            .into_iter()
            .map(|(_, row)| row.date().unwrap().to_string())
            .collect();
        assert_eq!(order, ["2024-06-09", "2024-06-08", "2024-06-07"]);
    }

    #[test]
    #[traced_test]
    fn test_sort_falls_back_to_id_order() {
        let mut papers = TopicPapers::new();
        papers.insert("2401.1".to_string(), paper("2401.1", "2024-06-09", "x").into());
        papers.insert("2403.1".to_string(), StoredRow::Legacy("garbage".to_string()));
        papers.insert("2402.1".to_string(), paper("2402.1", "2024-06-01", "y").into());

        let keys: Vec<_> = sort_papers("TTS", &papers).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["2403.1", "2402.1", "2401.1"]);
        assert!(logs_contain("falling back to id order"));
    }

    #[test]
    #[traced_test]
    fn test_sort_by_date_does_not_warn() {
        let mut papers = TopicPapers::new();
        papers.insert("1".to_string(), paper("1", "2024-06-07", "x").into());
        papers.insert("2".to_string(), StoredRow::Empty);

        assert_eq!(sort_papers("TTS", &papers).len(), 2);
        assert!(!logs_contain("falling back to id order"));
    }

    #[test]
    fn test_off_format_rows_survive_load_and_save() {
        let record = serde_json::json!({
            "TTS": {
                "2406.1": "|**2024-06-07**|**T**|Jane Doe et.al.|http://arxiv.org/abs/2406.1|null|\n",
                "2406.2": "|**2024-06-07**|**T**|Jane Doe|[2406.2](http://arxiv.org/abs/2406.2)|null|\n",
                "2406.3": "|**2024-6-7**|**T**|Jane Doe et.al.|[2406.3](http://arxiv.org/abs/2406.3)|null|\n",
                "2406.4": "|**2024-06-07**|**T**|Jane Doe et.al.|[2406.4](http://arxiv.org/abs/2406.4)|null|\n"
            }
        });

        let store = PaperStore::from_value(record.clone());
        assert_eq!(store.to_value(), record);

        let tts = store.topic("TTS").unwrap();
        assert!(matches!(tts["2406.1"], StoredRow::Legacy(_)));
        assert!(matches!(tts["2406.2"], StoredRow::Legacy(_)));
        assert!(matches!(tts["2406.3"], StoredRow::Legacy(_)));
        assert!(matches!(tts["2406.4"], StoredRow::Paper(_)));
    }

    #[test]
    fn test_from_value_degrades_gracefully() {
        let store = PaperStore::from_json_str(
            r#"{
                "TTS": {
                    "2406.1": "|**2024-06-07**|**T**|A et.al.|[2406.1](http://arxiv.org/abs/2406.1)|null|\n",
                    "2406.2": null,
                    "2406.3": 42,
                    "2406.4": "free text"
                },
                "Broken": ["not", "a", "map"]
            }"#,
        )
        .unwrap();

        assert_eq!(store.topic_count(), 1);
        let tts = store.topic("TTS").unwrap();
        assert_eq!(tts.len(), 3);
        assert!(matches!(tts["2406.1"], StoredRow::Paper(_)));
        assert_eq!(tts["2406.2"], StoredRow::Empty);
        assert_eq!(tts["2406.4"], StoredRow::Legacy("free text".to_string()));
    }

    #[test]
    fn test_non_object_root_is_empty() {
        let store = PaperStore::from_json_str("[1, 2, 3]").unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("record.json");

        let mut store = PaperStore::default();
        store.merge(TopicBatch::new("TTS", [paper("1", "2024-06-07", "A")]));
        store.insert("TTS", "2", StoredRow::Empty);
        store.save(&path).unwrap();

        let loaded = PaperStore::load(&path);
        assert_eq!(loaded, store);

        let raw: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(raw["TTS"]["2"], Value::Null);
        assert!(raw["TTS"]["1"].as_str().unwrap().starts_with("|**2024-06-07**|"));
    }

    #[test]
    fn test_load_missing_or_corrupt_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(PaperStore::load(&dir.path().join("missing.json")).is_empty());

        let corrupt = dir.path().join("corrupt.json");
        std::fs::write(&corrupt, "{ not json").unwrap();
        assert!(PaperStore::load(&corrupt).is_empty());

        let empty = dir.path().join("empty.json");
        std::fs::write(&empty, "").unwrap();
        assert!(PaperStore::load(&empty).is_empty());
    }
}
