use super::FeatureExtractor;
use crate::dataset::{parse_list_cell, Table};
use crate::error::Result;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CountMode {
    /// 1.0 when the attribute is present at least once.
    Boolean,
    Count,
}

/// Counts list-valued attributes (hashtags, mentions, urls, ...) or flags
/// scalar ones (video, retweet).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeCount {
    pub column: String,
    pub mode: CountMode,
}

impl AttributeCount {
    pub fn new(column: &str, mode: CountMode) -> Self {
        Self {
            column: column.to_string(),
            mode,
        }
    }
}

fn cell_count(cell: &str) -> f64 {
    let trimmed = cell.trim();
    if trimmed.starts_with('[') {
        return parse_list_cell(trimmed).len() as f64;
    }
    if trimmed.eq_ignore_ascii_case("true") {
        return 1.0;
    }
    if trimmed.eq_ignore_ascii_case("false") {
        return 0.0;
    }
    match trimmed.parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        Ok(_) => 0.0,
        Err(_) => parse_list_cell(trimmed).len() as f64,
    }
}

impl FeatureExtractor for AttributeCount {
    fn input_columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }

    fn feature_name(&self) -> String {
        match self.mode {
            CountMode::Boolean => format!("{}_bool", self.column),
            CountMode::Count => format!("{}_count", self.column),
        }
    }

    fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        Ok(table
            .column(&self.column)?
            .iter()
            .map(|cell| {
                let count = cell_count(cell);
                match self.mode {
                    CountMode::Count => vec![count],
                    CountMode::Boolean => vec![if count > 0.0 { 1.0 } else { 0.0 }],
                }
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> Table {
        Table::from_columns(vec![
            ("urls", vec!["['https://a', 'https://b']", "[]", ""]),
            ("retweet", vec!["True", "False", "nan"]),
            ("video", vec!["1", "0", "0.0"]),
        ])
    }

    #[test]
    fn counts_list_elements() {
        let rows = AttributeCount::new("urls", CountMode::Count)
            .transform(&table())
            .unwrap();
        assert_eq!(rows, vec![vec![2.0], vec![0.0], vec![0.0]]);
    }

    #[test]
    fn boolean_mode_flags_presence() {
        let rows = AttributeCount::new("urls", CountMode::Boolean)
            .transform(&table())
            .unwrap();
        assert_eq!(rows, vec![vec![1.0], vec![0.0], vec![0.0]]);
    }

    #[test]
    fn scalar_columns() {
        let t = table();
        let retweet = AttributeCount::new("retweet", CountMode::Boolean)
            .transform(&t)
            .unwrap();
        assert_eq!(retweet, vec![vec![1.0], vec![0.0], vec![0.0]]);
        let video = AttributeCount::new("video", CountMode::Boolean)
            .transform(&t)
            .unwrap();
        assert_eq!(video, vec![vec![1.0], vec![0.0], vec![0.0]]);
    }
}
