//! Word-level TF-IDF over the tokenized tweet.
//!
//! The vocabulary is learned in `fit`:
//! - terms are lowercased tokens, sorted alphabetically
//! - terms seen in fewer than `min_df` documents are dropped
//! - with `max_features`, only the most frequent terms are kept
//!
//! Rows are raw term counts weighted by a smoothed IDF and L2-normalized.

use super::FeatureExtractor;
use crate::dataset::{tokens_of, Table};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TfIdf {
    pub column: String,
    pub max_features: Option<usize>,
    pub min_df: usize,
    vocabulary: Vec<String>,
    idf: Vec<f64>,
    fitted: bool,
}

impl TfIdf {
    pub fn new(column: &str, max_features: Option<usize>, min_df: usize) -> Self {
        Self {
            column: column.to_string(),
            max_features,
            min_df: min_df.max(1),
            vocabulary: Vec::new(),
            idf: Vec::new(),
            fitted: false,
        }
    }

    pub fn vocabulary(&self) -> &[String] {
        &self.vocabulary
    }
}

fn terms(cell: &str) -> Vec<String> {
    tokens_of(cell)
        .into_iter()
        .map(|t| t.to_lowercase())
        .filter(|t| !t.is_empty())
        .collect()
}

impl FeatureExtractor for TfIdf {
    fn input_columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }

    fn feature_name(&self) -> String {
        format!("{}_tfidf", self.column)
    }

    fn feature_names(&self) -> Vec<String> {
        let prefix = self.feature_name();
        self.vocabulary
            .iter()
            .map(|term| format!("{prefix}_{term}"))
            .collect()
    }

    fn fit(&mut self, table: &Table) -> Result<()> {
        let documents = table.column(&self.column)?;
        let mut doc_freq: BTreeMap<String, usize> = BTreeMap::new();
        let mut term_freq: HashMap<String, usize> = HashMap::new();

        for doc in documents {
            let words = terms(doc);
            for word in &words {
                *term_freq.entry(word.clone()).or_insert(0) += 1;
            }
            let unique: HashSet<String> = words.into_iter().collect();
            for word in unique {
                *doc_freq.entry(word).or_insert(0) += 1;
            }
        }

        let mut kept: Vec<(String, usize)> = doc_freq
            .into_iter()
            .filter(|(_, df)| *df >= self.min_df)
            .collect();

        if let Some(limit) = self.max_features {
            if kept.len() > limit {
                // Most frequent first, alphabetical among ties.
                kept.sort_by(|a, b| {
                    term_freq[&b.0]
                        .cmp(&term_freq[&a.0])
                        .then_with(|| a.0.cmp(&b.0))
                });
                kept.truncate(limit);
                kept.sort_by(|a, b| a.0.cmp(&b.0));
            }
        }

        let n_docs = documents.len() as f64;
        self.idf = kept
            .iter()
            .map(|(_, df)| ((1.0 + n_docs) / (1.0 + *df as f64)).ln() + 1.0)
            .collect();
        self.vocabulary = kept.into_iter().map(|(term, _)| term).collect();
        self.fitted = true;
        Ok(())
    }

    fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        if !self.fitted {
            return Err(Error::NotFitted(self.feature_name()));
        }
        let index: HashMap<&str, usize> = self
            .vocabulary
            .iter()
            .enumerate()
            .map(|(i, term)| (term.as_str(), i))
            .collect();

        Ok(table
            .column(&self.column)?
            .iter()
            .map(|doc| {
                let mut row = vec![0.0; self.vocabulary.len()];
                for word in terms(doc) {
                    if let Some(&i) = index.get(word.as_str()) {
                        row[i] += 1.0;
                    }
                }
                for (value, idf) in row.iter_mut().zip(&self.idf) {
                    *value *= idf;
                }
                let norm = row.iter().map(|v| v * v).sum::<f64>().sqrt();
                if norm > 0.0 {
                    for value in &mut row {
                        *value /= norm;
                    }
                }
                row
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn corpus() -> Table {
        Table::from_columns(vec![(
            "tweet_tokenized",
            vec![
                "['Data', 'science', 'data']",
                "['machine', 'learning']",
                "['data', 'learning']",
            ],
        )])
    }

    #[test]
    fn vocabulary_is_sorted_and_lowercased() {
        let mut tfidf = TfIdf::new("tweet_tokenized", None, 1);
        tfidf.fit(&corpus()).unwrap();
        assert_eq!(
            tfidf.vocabulary(),
            &["data", "learning", "machine", "science"]
        );
        assert_eq!(tfidf.feature_names()[0], "tweet_tokenized_tfidf_data");
    }

    #[test]
    fn rows_are_unit_length() {
        let mut tfidf = TfIdf::new("tweet_tokenized", None, 1);
        let table = corpus();
        tfidf.fit(&table).unwrap();
        for row in tfidf.transform(&table).unwrap() {
            let norm: f64 = row.iter().map(|v| v * v).sum::<f64>().sqrt();
            assert!((norm - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn rarer_terms_weigh_more() {
        let mut tfidf = TfIdf::new("tweet_tokenized", None, 1);
        let table = corpus();
        tfidf.fit(&table).unwrap();
        let rows = tfidf.transform(&table).unwrap();
        // "learning" (df=2) vs "machine" (df=1) in the second tweet
        assert!(rows[1][2] > rows[1][1]);
    }

    #[test]
    fn max_features_keeps_most_frequent() {
        let mut tfidf = TfIdf::new("tweet_tokenized", Some(2), 1);
        tfidf.fit(&corpus()).unwrap();
        assert_eq!(tfidf.vocabulary(), &["data", "learning"]);
    }

    #[test]
    fn unknown_terms_are_ignored() {
        let mut tfidf = TfIdf::new("tweet_tokenized", None, 2);
        tfidf.fit(&corpus()).unwrap();
        let unseen = Table::from_columns(vec![("tweet_tokenized", vec!["['rust']"])]);
        let rows = tfidf.transform(&unseen).unwrap();
        assert_eq!(rows, vec![vec![0.0, 0.0]]);
    }

    #[test]
    fn transform_before_fit_fails() {
        let tfidf = TfIdf::new("tweet_tokenized", None, 1);
        assert!(matches!(
            tfidf.transform(&corpus()),
            Err(Error::NotFitted(_))
        ));
    }
}
