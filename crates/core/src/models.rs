use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Feature matrix handed from extraction to classification.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FeatureSet {
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<String>,
    pub feature_names: Vec<String>,
}

impl FeatureSet {
    pub fn validate(&self) -> Result<()> {
        if self.features.len() != self.labels.len() {
            return Err(Error::LabelMismatch {
                features: self.features.len(),
                labels: self.labels.len(),
            });
        }
        let width = self.feature_names.len();
        if let Some(row) = self.features.iter().find(|r| r.len() != width) {
            return Err(Error::DimensionMismatch {
                expected: width,
                found: row.len(),
            });
        }
        Ok(())
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let set: FeatureSet = serde_json::from_reader(std::io::BufReader::new(file))?;
        set.validate()?;
        Ok(set)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_ragged_rows() {
        let set = FeatureSet {
            features: vec![vec![1.0, 2.0], vec![3.0]],
            labels: vec!["True".into(), "False".into()],
            feature_names: vec!["a".into(), "b".into()],
        };
        assert!(matches!(
            set.validate(),
            Err(Error::DimensionMismatch { expected: 2, found: 1 })
        ));
    }

    #[test]
    fn rejects_missing_labels() {
        let set = FeatureSet {
            features: vec![vec![1.0]],
            labels: vec![],
            feature_names: vec!["a".into()],
        };
        assert!(matches!(set.validate(), Err(Error::LabelMismatch { .. })));
    }
}
