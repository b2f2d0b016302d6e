//! Feature extractors and the collector that chains them.
//!
//! Every extractor maps a [`Table`] to one fixed-width numeric row per tweet.
//! Stateful extractors (TF-IDF) learn their parameters in `fit`; all others
//! keep the default no-op. A [`FeatureCollector`] fits its extractors in
//! order and concatenates their outputs column-wise.

pub mod attribute;
pub mod character_length;
pub mod ner;
pub mod sentiment;
pub mod tfidf;
pub mod threads;
pub mod time;

use crate::dataset::Table;
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::debug;

pub use attribute::{AttributeCount, CountMode};
pub use character_length::CharacterLength;
pub use ner::{EntityType, NamedEntities};
pub use sentiment::Sentiment;
pub use tfidf::TfIdf;
pub use threads::Threads;
pub use time::{OneHotTime, TimeUnit};

pub trait FeatureExtractor {
    fn input_columns(&self) -> Vec<&str>;

    fn feature_name(&self) -> String;

    /// One name per output column.
    fn feature_names(&self) -> Vec<String> {
        vec![self.feature_name()]
    }

    fn fit(&mut self, _table: &Table) -> Result<()> {
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>>;
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Extractor {
    CharacterLength(CharacterLength),
    AttributeCount(AttributeCount),
    OneHotTime(OneHotTime),
    TfIdf(TfIdf),
    Sentiment(Sentiment),
    Threads(Threads),
    NamedEntities(NamedEntities),
}

impl Extractor {
    fn inner(&self) -> &dyn FeatureExtractor {
        match self {
            Extractor::CharacterLength(e) => e,
            Extractor::AttributeCount(e) => e,
            Extractor::OneHotTime(e) => e,
            Extractor::TfIdf(e) => e,
            Extractor::Sentiment(e) => e,
            Extractor::Threads(e) => e,
            Extractor::NamedEntities(e) => e,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn FeatureExtractor {
        match self {
            Extractor::CharacterLength(e) => e,
            Extractor::AttributeCount(e) => e,
            Extractor::OneHotTime(e) => e,
            Extractor::TfIdf(e) => e,
            Extractor::Sentiment(e) => e,
            Extractor::Threads(e) => e,
            Extractor::NamedEntities(e) => e,
        }
    }
}

impl FeatureExtractor for Extractor {
    fn input_columns(&self) -> Vec<&str> {
        self.inner().input_columns()
    }

    fn feature_name(&self) -> String {
        self.inner().feature_name()
    }

    fn feature_names(&self) -> Vec<String> {
        self.inner().feature_names()
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        self.inner_mut().fit(table)
    }

    fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        self.inner().transform(table)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureCollector {
    extractors: Vec<Extractor>,
}

impl FeatureCollector {
    pub fn new(extractors: Vec<Extractor>) -> Self {
        Self { extractors }
    }

    pub fn extractors(&self) -> &[Extractor] {
        &self.extractors
    }

    pub fn fit(&mut self, table: &Table) -> Result<()> {
        for extractor in &mut self.extractors {
            debug!("fitting {}", extractor.feature_name());
            extractor.fit(table)?;
        }
        Ok(())
    }

    pub fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        let mut rows = vec![Vec::new(); table.len()];
        for extractor in &self.extractors {
            let block = extractor.transform(table)?;
            let width = extractor.feature_names().len();
            debug!("{} -> {} columns", extractor.feature_name(), width);
            for (row, values) in rows.iter_mut().zip(block) {
                if values.len() != width {
                    return Err(Error::DimensionMismatch {
                        expected: width,
                        found: values.len(),
                    });
                }
                row.extend(values);
            }
        }
        Ok(rows)
    }

    pub fn feature_names(&self) -> Vec<String> {
        self.extractors
            .iter()
            .flat_map(|e| e.feature_names())
            .collect()
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let json = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Table {
        Table::from_columns(vec![
            ("tweet", vec!["short", "a bit longer"]),
            ("hashtags", vec!["['#a', '#b']", "[]"]),
            ("tweet_tokenized", vec!["['data', 'science']", "['data']"]),
        ])
    }

    #[test]
    fn concatenates_in_extractor_order() {
        let table = sample();
        let mut collector = FeatureCollector::new(vec![
            Extractor::CharacterLength(CharacterLength::new("tweet")),
            Extractor::AttributeCount(AttributeCount::new("hashtags", CountMode::Count)),
        ]);
        collector.fit(&table).unwrap();
        let rows = collector.transform(&table).unwrap();
        assert_eq!(rows, vec![vec![5.0, 2.0], vec![12.0, 0.0]]);
        assert_eq!(
            collector.feature_names(),
            vec!["tweet_charlength", "hashtags_count"]
        );
    }

    #[test]
    fn empty_collector_keeps_rows() {
        let table = sample();
        let collector = FeatureCollector::default();
        let rows = collector.transform(&table).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(rows.iter().all(Vec::is_empty));
        assert!(collector.feature_names().is_empty());
    }

    #[test]
    fn exported_collector_transforms_identically() {
        let table = sample();
        let mut collector = FeatureCollector::new(vec![
            Extractor::TfIdf(TfIdf::new("tweet_tokenized", None, 1)),
            Extractor::Threads(Threads::new("tweet")),
        ]);
        collector.fit(&table).unwrap();
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("collector.json");
        collector.save(&path).unwrap();
        let restored = FeatureCollector::load(&path).unwrap();
        let before = collector.transform(&table).unwrap();
        let after = restored.transform(&table).unwrap();
        for (a, b) in before.iter().flatten().zip(after.iter().flatten()) {
            assert!((a - b).abs() < 1e-12);
        }
        assert_eq!(restored.feature_names(), collector.feature_names());
    }

    #[test]
    fn missing_column_is_reported() {
        let table = sample();
        let collector = FeatureCollector::new(vec![Extractor::OneHotTime(OneHotTime::new(
            "date",
            TimeUnit::Weekday,
        ))]);
        assert!(matches!(
            collector.transform(&table),
            Err(Error::MissingColumn(c)) if c == "date"
        ));
    }
}
