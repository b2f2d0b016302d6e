//! Classifiers trained on a [`FeatureSet`](crate::models::FeatureSet).
//!
//! All models share the [`Classifier`] trait and are persisted through the
//! [`TrainedClassifier`] enum so that an exported model can be imported by a
//! later run without knowing its kind up front.

pub mod dummy;
pub mod knn;
pub mod mlp;
pub mod svm;

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::path::Path;

pub use dummy::{MajorityClassifier, StratifiedClassifier};
pub use knn::KNearestNeighbors;
pub use mlp::MlpClassifier;
pub use svm::LinearSvm;

pub trait Classifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[String]) -> Result<()>;

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<String>>;
}

/// Which model to train, in the precedence the command-line flags use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClassifierKind {
    Majority,
    Frequency,
    Svm,
    Knn,
    Mlp,
}

impl ClassifierKind {
    pub fn build(&self, config: &ClassifierConfig, seed: Option<u64>) -> TrainedClassifier {
        match self {
            ClassifierKind::Majority => TrainedClassifier::Majority(MajorityClassifier::default()),
            ClassifierKind::Frequency => {
                TrainedClassifier::Frequency(StratifiedClassifier::new(seed))
            }
            ClassifierKind::Svm => TrainedClassifier::LinearSvm(LinearSvm::new(&config.svm)),
            ClassifierKind::Knn => TrainedClassifier::Knn(KNearestNeighbors::new(config.knn.k)),
            ClassifierKind::Mlp => TrainedClassifier::Mlp(MlpClassifier::new(&config.mlp, seed)),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum TrainedClassifier {
    Majority(MajorityClassifier),
    Frequency(StratifiedClassifier),
    LinearSvm(LinearSvm),
    Knn(KNearestNeighbors),
    Mlp(MlpClassifier),
}

impl TrainedClassifier {
    pub fn describe(&self) -> &'static str {
        match self {
            TrainedClassifier::Majority(_) => "majority vote classifier",
            TrainedClassifier::Frequency(_) => "label-frequency classifier",
            TrainedClassifier::LinearSvm(_) => "SVM classifier",
            TrainedClassifier::Knn(_) => "KNN classifier",
            TrainedClassifier::Mlp(_) => "MLP classifier",
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            TrainedClassifier::Majority(c) => c,
            TrainedClassifier::Frequency(c) => c,
            TrainedClassifier::LinearSvm(c) => c,
            TrainedClassifier::Knn(c) => c,
            TrainedClassifier::Mlp(c) => c,
        }
    }

    fn inner_mut(&mut self) -> &mut dyn Classifier {
        match self {
            TrainedClassifier::Majority(c) => c,
            TrainedClassifier::Frequency(c) => c,
            TrainedClassifier::LinearSvm(c) => c,
            TrainedClassifier::Knn(c) => c,
            TrainedClassifier::Mlp(c) => c,
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let file = std::fs::File::create(path)?;
        serde_json::to_writer(std::io::BufWriter::new(file), self)?;
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        Ok(serde_json::from_reader(std::io::BufReader::new(file))?)
    }
}

impl Classifier for TrainedClassifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[String]) -> Result<()> {
        self.inner_mut().fit(x, y)
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<String>> {
        self.inner().predict(x)
    }
}

/// Sorted distinct labels and each sample's index into them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LabelEncoder {
    pub classes: Vec<String>,
}

impl LabelEncoder {
    pub fn fit(labels: &[String]) -> (Self, Vec<usize>) {
        let mut classes: Vec<String> = labels.to_vec();
        classes.sort();
        classes.dedup();
        let encoded = labels
            .iter()
            .map(|l| classes.binary_search(l).unwrap_or(0))
            .collect();
        (Self { classes }, encoded)
    }

    pub fn decode(&self, index: usize) -> String {
        self.classes[index].clone()
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }
}

/// Checks a training set and returns its feature width.
pub(crate) fn check_training(x: &[Vec<f64>], y: &[String]) -> Result<usize> {
    if x.is_empty() {
        return Err(Error::EmptyTrainingSet);
    }
    if x.len() != y.len() {
        return Err(Error::LabelMismatch {
            features: x.len(),
            labels: y.len(),
        });
    }
    let width = x[0].len();
    check_width(x, width)?;
    Ok(width)
}

pub(crate) fn check_width(x: &[Vec<f64>], width: usize) -> Result<()> {
    match x.iter().find(|row| row.len() != width) {
        Some(row) => Err(Error::DimensionMismatch {
            expected: width,
            found: row.len(),
        }),
        None => Ok(()),
    }
}

pub(crate) fn rng_from(seed: Option<u64>) -> StdRng {
    match seed {
        Some(s) => StdRng::seed_from_u64(s),
        None => StdRng::from_entropy(),
    }
}

pub(crate) fn argmax(values: &[f64]) -> usize {
    let mut best = 0;
    for (i, v) in values.iter().enumerate() {
        if *v > values[best] {
            best = i;
        }
    }
    best
}


#[cfg(test)]
mod tests {
    use super::fixtures::blobs;
    use super::*;

    #[test]
    fn encoder_sorts_classes() {
        let labels: Vec<String> = ["True", "False", "True"].iter().map(|s| s.to_string()).collect();
        let (enc, idx) = LabelEncoder::fit(&labels);
        assert_eq!(enc.classes, vec!["False", "True"]);
        assert_eq!(idx, vec![1, 0, 1]);
    }

    #[test]
    fn rejects_bad_training_sets() {
        let (x, y) = blobs();
        assert!(matches!(check_training(&[], &[]), Err(Error::EmptyTrainingSet)));
        assert!(matches!(
            check_training(&x, &y[..3]),
            Err(Error::LabelMismatch { .. })
        ));
        let mut ragged = x.clone();
        ragged[2].push(1.0);
        assert!(matches!(
            check_training(&ragged, &y),
            Err(Error::DimensionMismatch { .. })
        ));
    }

    #[test]
    fn every_kind_fits_and_round_trips() {
        let (x, y) = blobs();
        let config = ClassifierConfig::default();
        let dir = tempfile::tempdir().unwrap();
        for kind in [
            ClassifierKind::Majority,
            ClassifierKind::Frequency,
            ClassifierKind::Svm,
            ClassifierKind::Knn,
            ClassifierKind::Mlp,
        ] {
            let mut model = kind.build(&config, Some(42));
            model.fit(&x, &y).unwrap();
            let before = model.predict(&x).unwrap();
            let path = dir.path().join(format!("{kind:?}.json"));
            model.save(&path).unwrap();
            let restored = TrainedClassifier::load(&path).unwrap();
            assert_eq!(restored.describe(), model.describe());
            assert_eq!(restored.predict(&x).unwrap(), before, "{kind:?}");
        }
    }
}
