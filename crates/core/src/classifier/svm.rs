//! Linear support vector machine backed by `linfa-svm`.
//!
//! Each binary problem is solved by linfa's SMO solver with a linear kernel
//! and balanced per-class costs `C · n / (2 · n_class)`. Two classes train one
//! model; more train one model per class (one-vs-rest) and predict the class
//! with the highest decision value. Only the separating hyperplanes are kept,
//! so a fitted model serializes as plain weights.

use super::{check_training, check_width, Classifier, LabelEncoder};
use crate::config::SvmConfig;
use crate::error::{Error, Result};
use linfa::traits::Fit;
use linfa::Dataset;
use linfa_svm::Svm;
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearSvm {
    c: f64,
    eps: f64,
    encoder: LabelEncoder,
    width: Option<usize>,
    weights: Vec<Vec<f64>>,
    biases: Vec<f64>,
}

impl LinearSvm {
    pub fn new(config: &SvmConfig) -> Self {
        Self {
            c: config.c,
            eps: config.eps,
            encoder: LabelEncoder::default(),
            width: None,
            weights: Vec::new(),
            biases: Vec::new(),
        }
    }

    /// One decision value per model for a sample.
    fn decisions(&self, row: &[f64]) -> Vec<f64> {
        self.weights
            .iter()
            .zip(&self.biases)
            .map(|(w, b)| dot(w, row) + b)
            .collect()
    }

    /// Fits one binary problem and returns its hyperplane `(w, b)`.
    fn train_binary(
        &self,
        records: &Array2<f64>,
        positive: Vec<bool>,
    ) -> Result<(Vec<f64>, f64)> {
        let n = positive.len() as f64;
        let n_pos = positive.iter().filter(|p| **p).count() as f64;
        let n_neg = n - n_pos;
        let dataset = Dataset::new(records.clone(), Array1::from(positive));
        let model = Svm::<f64, bool>::params()
            .pos_neg_weights(self.c * n / (2.0 * n_pos), self.c * n / (2.0 * n_neg))
            .eps(self.eps)
            .linear_kernel()
            .fit(&dataset)?;
        debug!("svm trained with {} support vectors", model.nsupport());

        // the decision function is w·x - rho, so w is read off the unit vectors
        let width = records.ncols();
        let weights = (0..width)
            .map(|j| {
                let mut unit = Array1::<f64>::zeros(width);
                unit[j] = 1.0;
                model.weighted_sum(&unit)
            })
            .collect();
        Ok((weights, -model.rho))
    }
}

fn dot(a: &[f64], b: &[f64]) -> f64 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl Classifier for LinearSvm {
    fn fit(&mut self, x: &[Vec<f64>], y: &[String]) -> Result<()> {
        let width = check_training(x, y)?;
        let (encoder, encoded) = LabelEncoder::fit(y);
        let k = encoder.len();

        // a single class needs no hyperplane
        let targets: Vec<usize> = match k {
            1 => Vec::new(),
            2 => vec![1],
            _ => (0..k).collect(),
        };
        let flat: Vec<f64> = x.iter().flatten().copied().collect();
        let records = Array2::from_shape_vec((x.len(), width), flat)?;

        let mut weights = Vec::with_capacity(targets.len());
        let mut biases = Vec::with_capacity(targets.len());
        for target in targets {
            let positive = encoded.iter().map(|&c| c == target).collect();
            let (w, b) = self.train_binary(&records, positive)?;
            weights.push(w);
            biases.push(b);
        }
        self.weights = weights;
        self.biases = biases;
        self.encoder = encoder;
        self.width = Some(width);
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<String>> {
        let width = self
            .width
            .ok_or_else(|| Error::NotFitted("svm".to_string()))?;
        check_width(x, width)?;
        let k = self.encoder.len();
        Ok(x.iter()
            .map(|row| {
                let class = match k {
                    1 => 0,
                    2 => usize::from(self.decisions(row)[0] >= 0.0),
                    _ => super::argmax(&self.decisions(row)),
                };
                self.encoder.decode(class)
            })
            .collect())
    }
}
