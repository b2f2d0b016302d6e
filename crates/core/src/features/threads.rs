use super::FeatureExtractor;
use crate::dataset::Table;
use crate::error::Result;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

fn thread_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)(?:^|[\s(\[])\d{1,2}\s?/\s?\d{1,2}(?:$|[\s)\].:])|🧵|\bthread\b|\(cont(?:'d|inued)?\)")
            .expect("thread pattern is valid")
    })
}

/// Whether a tweet is part of a thread: `1/5` style counters, the thread
/// emoji, or an explicit "thread" marker.
pub fn is_thread(text: &str) -> bool {
    thread_pattern().is_match(text)
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Threads {
    pub column: String,
}

impl Threads {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
        }
    }
}

impl FeatureExtractor for Threads {
    fn input_columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }

    fn feature_name(&self) -> String {
        format!("{}_thread", self.column)
    }

    fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        Ok(table
            .column(&self.column)?
            .iter()
            .map(|text| vec![if is_thread(text) { 1.0 } else { 0.0 }])
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_and_markers() {
        assert!(is_thread("Why transformers work 1/7"));
        assert!(is_thread("(2/3) continuing from above"));
        assert!(is_thread("A thread on data cleaning 🧵"));
        assert!(is_thread("Big THREAD below"));
    }

    #[test]
    fn dates_and_plain_text_are_not_threads() {
        assert!(!is_thread("Published 2021/04/14"));
        assert!(!is_thread("Just a normal tweet about threading"));
        assert!(!is_thread("50% off"));
    }
}
