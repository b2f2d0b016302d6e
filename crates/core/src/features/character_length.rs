use super::FeatureExtractor;
use crate::dataset::Table;
use crate::error::Result;
use serde::{Deserialize, Serialize};

/// Number of characters in the raw tweet text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterLength {
    pub column: String,
}

impl CharacterLength {
    pub fn new(column: &str) -> Self {
        Self {
            column: column.to_string(),
        }
    }
}

impl FeatureExtractor for CharacterLength {
    fn input_columns(&self) -> Vec<&str> {
        vec![self.column.as_str()]
    }

    fn feature_name(&self) -> String {
        format!("{}_charlength", self.column)
    }

    fn transform(&self, table: &Table) -> Result<Vec<Vec<f64>>> {
        Ok(table
            .column(&self.column)?
            .iter()
            .map(|text| vec![text.chars().count() as f64])
            .collect())
    }
}
