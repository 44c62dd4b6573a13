//! Selection of the rows that go into a digest.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use crate::storage::{PaperRow, PaperStore};

/// Rows dated on one calendar day, grouped by topic.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DigestWindow {
    date: NaiveDate,
    topics: BTreeMap<String, BTreeMap<String, PaperRow>>,
}

impl DigestWindow {
    /// Papers dated the day before `run_date`.
    #[must_use]
    pub fn yesterday(store: &PaperStore, run_date: NaiveDate) -> Self {
        Self::collect(store, yesterday(run_date))
    }

    /// Papers dated exactly `date`. Topics with no match are left out;
    /// legacy and empty rows never match.
    #[must_use]
    pub fn collect(store: &PaperStore, date: NaiveDate) -> Self {
        let mut topics = BTreeMap::new();

        for (topic, rows) in store.topics() {
            let matched: BTreeMap<String, PaperRow> = rows
                .iter()
                .filter_map(|(id, row)| row.paper().map(|p| (id, p)))
                .filter(|(_, paper)| paper.date == date)
                .map(|(id, paper)| (id.clone(), paper.clone()))
                .collect();

            if !matched.is_empty() {
                tracing::debug!(topic = %topic, count = matched.len(), %date, "Digest matches");
                topics.insert(topic.clone(), matched);
            }
        }

        Self { date, topics }
    }

    /// An empty window for `date`.
    #[must_use]
    pub fn empty(date: NaiveDate) -> Self {
        Self {
            date,
            topics: BTreeMap::new(),
        }
    }

    /// The day this window covers.
    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    /// Matching papers per topic.
    pub fn topics(&self) -> impl Iterator<Item = (&String, &BTreeMap<String, PaperRow>)> {
        self.topics.iter()
    }

    /// Papers across all topics.
    #[must_use]
    pub fn total(&self) -> usize {
        self.topics.values().map(BTreeMap::len).sum()
    }

    /// No paper matched.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// The calendar day before `run_date`.
#[must_use]
pub fn yesterday(run_date: NaiveDate) -> NaiveDate {
    run_date.pred_opt().unwrap_or(run_date)
}
