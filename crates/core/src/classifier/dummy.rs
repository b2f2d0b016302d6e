//! Baselines that ignore the features.

use super::{check_training, check_width, rng_from, Classifier, LabelEncoder};
use crate::error::{Error, Result};
use rand::distributions::{Distribution, WeightedIndex};
use serde::{Deserialize, Serialize};

/// Always predicts the most frequent training label.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MajorityClassifier {
    label: Option<String>,
    width: usize,
}

impl Classifier for MajorityClassifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[String]) -> Result<()> {
        self.width = check_training(x, y)?;
        let (encoder, encoded) = LabelEncoder::fit(y);
        let mut counts = vec![0usize; encoder.len()];
        for i in encoded {
            counts[i] += 1;
        }
        // first maximum wins, so ties go to the label that sorts first
        let mut best = 0;
        for (i, c) in counts.iter().enumerate() {
            if *c > counts[best] {
                best = i;
            }
        }
        self.label = Some(encoder.decode(best));
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<String>> {
        let label = self
            .label
            .as_ref()
            .ok_or_else(|| Error::NotFitted("majority".to_string()))?;
        check_width(x, self.width)?;
        Ok(vec![label.clone(); x.len()])
    }
}

/// Draws labels at random following the training label distribution.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StratifiedClassifier {
    seed: Option<u64>,
    encoder: LabelEncoder,
    priors: Vec<f64>,
    width: usize,
}

impl StratifiedClassifier {
    pub fn new(seed: Option<u64>) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    pub fn priors(&self) -> &[f64] {
        &self.priors
    }
}

impl Classifier for StratifiedClassifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[String]) -> Result<()> {
        self.width = check_training(x, y)?;
        let (encoder, encoded) = LabelEncoder::fit(y);
        let mut counts = vec![0.0; encoder.len()];
        for i in encoded {
            counts[i] += 1.0;
        }
        let n = y.len() as f64;
        self.priors = counts.into_iter().map(|c| c / n).collect();
        self.encoder = encoder;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<String>> {
        if self.encoder.is_empty() {
            return Err(Error::NotFitted("label-frequency".to_string()));
        }
        check_width(x, self.width)?;
        let dist = WeightedIndex::new(&self.priors)
            .map_err(|_| Error::NotFitted("label-frequency".to_string()))?;
        let mut rng = rng_from(self.seed);
        Ok((0..x.len())
            .map(|_| self.encoder.decode(dist.sample(&mut rng)))
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skewed() -> (Vec<Vec<f64>>, Vec<String>) {
        let x = vec![vec![0.0]; 100];
        let y = (0..100)
            .map(|i| if i < 80 { "False" } else { "True" }.to_string())
            .collect();
        (x, y)
    }

    #[test]
    fn majority_predicts_most_frequent() {
        let (x, y) = skewed();
        let mut clf = MajorityClassifier::default();
        clf.fit(&x, &y).unwrap();
        assert!(clf.predict(&x).unwrap().iter().all(|l| l == "False"));
    }

    #[test]
    fn majority_tie_goes_to_first_label() {
        let x = vec![vec![1.0], vec![2.0]];
        let y = vec!["b".to_string(), "a".to_string()];
        let mut clf = MajorityClassifier::default();
        clf.fit(&x, &y).unwrap();
        assert_eq!(clf.predict(&x).unwrap(), vec!["a", "a"]);
    }

    #[test]
    fn stratified_follows_priors() {
        let (x, y) = skewed();
        let mut clf = StratifiedClassifier::new(Some(7));
        clf.fit(&x, &y).unwrap();
        assert_eq!(clf.priors(), &[0.8, 0.2]);
        let big = vec![vec![0.0]; 5000];
        let pred = clf.predict(&big).unwrap();
        let share = pred.iter().filter(|l| *l == "False").count() as f64 / 5000.0;
        assert!((share - 0.8).abs() < 0.03, "share {share}");
    }

    #[test]
    fn stratified_is_reproducible_with_seed() {
        let (x, y) = skewed();
        let mut a = StratifiedClassifier::new(Some(1));
        let mut b = StratifiedClassifier::new(Some(1));
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.predict(&x).unwrap(), b.predict(&x).unwrap());
    }

    #[test]
    fn predict_before_fit_fails() {
        let clf = MajorityClassifier::default();
        assert!(clf.predict(&[vec![1.0]]).is_err());
    }
}
