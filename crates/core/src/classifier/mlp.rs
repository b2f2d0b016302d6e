//! Multilayer perceptron with ReLU hidden layers and a softmax output,
//! trained on cross-entropy with Adam over shuffled minibatches.

use super::{check_training, check_width, rng_from, Classifier, LabelEncoder};
use crate::config::MlpConfig;
use crate::error::{Error, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

const BETA1: f64 = 0.9;
const BETA2: f64 = 0.999;
const EPSILON: f64 = 1e-8;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MlpClassifier {
    hidden_layers: Vec<usize>,
    learning_rate: f64,
    alpha: f64,
    max_iter: usize,
    batch_size: usize,
    tol: f64,
    n_iter_no_change: usize,
    seed: Option<u64>,
    encoder: LabelEncoder,
    /// `weights[layer][out][in]`
    weights: Vec<Vec<Vec<f64>>>,
    biases: Vec<Vec<f64>>,
    loss_curve: Vec<f64>,
}

/// Gradients or Adam moments, shaped like the network parameters.
#[derive(Clone)]
struct Params {
    weights: Vec<Vec<Vec<f64>>>,
    biases: Vec<Vec<f64>>,
}

impl Params {
    fn zeros_like(weights: &[Vec<Vec<f64>>], biases: &[Vec<f64>]) -> Self {
        Self {
            weights: weights
                .iter()
                .map(|layer| layer.iter().map(|row| vec![0.0; row.len()]).collect())
                .collect(),
            biases: biases.iter().map(|b| vec![0.0; b.len()]).collect(),
        }
    }

    fn reset(&mut self) {
        for layer in &mut self.weights {
            for row in layer {
                row.iter_mut().for_each(|v| *v = 0.0);
            }
        }
        for b in &mut self.biases {
            b.iter_mut().for_each(|v| *v = 0.0);
        }
    }
}

struct Adam {
    m: Params,
    v: Params,
    t: i32,
}

impl Adam {
    fn step(
        &mut self,
        lr: f64,
        grads: &Params,
        weights: &mut [Vec<Vec<f64>>],
        biases: &mut [Vec<f64>],
    ) {
        self.t += 1;
        let lr_t = lr * (1.0 - BETA2.powi(self.t)).sqrt() / (1.0 - BETA1.powi(self.t));
        let update = |p: &mut f64, g: f64, m: &mut f64, v: &mut f64| {
            *m = BETA1 * *m + (1.0 - BETA1) * g;
            *v = BETA2 * *v + (1.0 - BETA2) * g * g;
            *p -= lr_t * *m / (v.sqrt() + EPSILON);
        };
        for l in 0..weights.len() {
            for o in 0..weights[l].len() {
                for i in 0..weights[l][o].len() {
                    update(
                        &mut weights[l][o][i],
                        grads.weights[l][o][i],
                        &mut self.m.weights[l][o][i],
                        &mut self.v.weights[l][o][i],
                    );
                }
                update(
                    &mut biases[l][o],
                    grads.biases[l][o],
                    &mut self.m.biases[l][o],
                    &mut self.v.biases[l][o],
                );
            }
        }
    }
}

impl MlpClassifier {
    pub fn new(config: &MlpConfig, seed: Option<u64>) -> Self {
        Self {
            hidden_layers: config.hidden_layers.clone(),
            learning_rate: config.learning_rate,
            alpha: config.alpha,
            max_iter: config.max_iter,
            batch_size: config.batch_size.max(1),
            tol: config.tol,
            n_iter_no_change: config.n_iter_no_change,
            seed,
            encoder: LabelEncoder::default(),
            weights: Vec::new(),
            biases: Vec::new(),
            loss_curve: Vec::new(),
        }
    }

    /// Training loss after each epoch.
    pub fn loss_curve(&self) -> &[f64] {
        &self.loss_curve
    }

    fn init_params(&mut self, sizes: &[usize], rng: &mut StdRng) {
        self.weights.clear();
        self.biases.clear();
        for pair in sizes.windows(2) {
            let (fan_in, fan_out) = (pair[0], pair[1]);
            // Glorot uniform
            let limit = (6.0 / (fan_in + fan_out) as f64).sqrt();
            self.weights.push(
                (0..fan_out)
                    .map(|_| (0..fan_in).map(|_| rng.gen_range(-limit..limit)).collect())
                    .collect(),
            );
            self.biases
                .push((0..fan_out).map(|_| rng.gen_range(-limit..limit)).collect());
        }
    }

    /// Activations of every layer, input first and class probabilities last.
    fn forward(&self, row: &[f64]) -> Vec<Vec<f64>> {
        let mut activations = vec![row.to_vec()];
        let last = self.weights.len() - 1;
        for (l, (layer, bias)) in self.weights.iter().zip(&self.biases).enumerate() {
            let input = &activations[l];
            let mut z: Vec<f64> = layer
                .iter()
                .zip(bias)
                .map(|(w, b)| w.iter().zip(input).map(|(a, x)| a * x).sum::<f64>() + b)
                .collect();
            if l == last {
                softmax(&mut z);
            } else {
                z.iter_mut().for_each(|v| *v = v.max(0.0));
            }
            activations.push(z);
        }
        activations
    }

    /// Accumulates gradients of one sample into `grads`; returns its loss.
    fn backward(&self, row: &[f64], target: usize, grads: &mut Params) -> f64 {
        let activations = self.forward(row);
        let output = &activations[activations.len() - 1];
        let loss = -output[target].max(1e-12).ln();

        let mut delta: Vec<f64> = output.clone();
        delta[target] -= 1.0;

        for l in (0..self.weights.len()).rev() {
            let input = &activations[l];
            for (o, d) in delta.iter().enumerate() {
                for (g, x) in grads.weights[l][o].iter_mut().zip(input) {
                    *g += d * x;
                }
                grads.biases[l][o] += d;
            }
            if l > 0 {
                let mut prev = vec![0.0; input.len()];
                for (o, d) in delta.iter().enumerate() {
                    for (p, w) in prev.iter_mut().zip(&self.weights[l][o]) {
                        *p += w * d;
                    }
                }
                // ReLU derivative
                for (p, a) in prev.iter_mut().zip(input) {
                    if *a <= 0.0 {
                        *p = 0.0;
                    }
                }
                delta = prev;
            }
        }
        loss
    }

    fn squared_weights(&self) -> f64 {
        self.weights
            .iter()
            .flatten()
            .flatten()
            .map(|w| w * w)
            .sum()
    }
}

fn softmax(z: &mut [f64]) {
    let max = z.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let mut sum = 0.0;
    for v in z.iter_mut() {
        *v = (*v - max).exp();
        sum += *v;
    }
    for v in z.iter_mut() {
        *v /= sum;
    }
}

impl Classifier for MlpClassifier {
    fn fit(&mut self, x: &[Vec<f64>], y: &[String]) -> Result<()> {
        let width = check_training(x, y)?;
        let (encoder, encoded) = LabelEncoder::fit(y);
        let mut sizes = vec![width];
        sizes.extend(&self.hidden_layers);
        sizes.push(encoder.len());
        self.encoder = encoder;

        let mut rng = rng_from(self.seed);
        self.init_params(&sizes, &mut rng);
        self.loss_curve.clear();

        let n = x.len();
        let batch_size = self.batch_size.min(n);
        let mut grads = Params::zeros_like(&self.weights, &self.biases);
        let mut adam = Adam {
            m: grads.clone(),
            v: grads.clone(),
            t: 0,
        };
        let mut order: Vec<usize> = (0..n).collect();
        let mut best_loss = f64::INFINITY;
        let mut no_improvement = 0;
        let mut converged = false;

        for epoch in 0..self.max_iter {
            order.shuffle(&mut rng);
            let mut total = 0.0;
            for batch in order.chunks(batch_size) {
                grads.reset();
                for &i in batch {
                    total += self.backward(&x[i], encoded[i], &mut grads);
                }
                let scale = 1.0 / batch.len() as f64;
                for (gl, wl) in grads.weights.iter_mut().zip(&self.weights) {
                    for (g_row, w_row) in gl.iter_mut().zip(wl) {
                        for (g, w) in g_row.iter_mut().zip(w_row) {
                            *g = *g * scale + self.alpha * w * scale;
                        }
                    }
                }
                for g in grads.biases.iter_mut().flatten() {
                    *g *= scale;
                }
                let (weights, biases) = (&mut self.weights, &mut self.biases);
                adam.step(self.learning_rate, &grads, weights, biases);
            }

            let loss = total / n as f64 + 0.5 * self.alpha * self.squared_weights() / n as f64;
            self.loss_curve.push(loss);
            info!("Iteration {}, loss = {:.8}", epoch + 1, loss);

            if loss > best_loss - self.tol {
                no_improvement += 1;
            } else {
                no_improvement = 0;
            }
            best_loss = best_loss.min(loss);
            if no_improvement > self.n_iter_no_change {
                info!(
                    "training loss did not improve more than tol={} for {} consecutive epochs, stopping",
                    self.tol, self.n_iter_no_change
                );
                converged = true;
                break;
            }
        }
        if !converged {
            warn!(
                "maximum iterations ({}) reached and the optimization hasn't converged yet",
                self.max_iter
            );
        }
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<String>> {
        let width = self
            .weights
            .first()
            .and_then(|layer| layer.first())
            .map(Vec::len)
            .ok_or_else(|| Error::NotFitted("mlp".to_string()))?;
        check_width(x, width)?;
        Ok(x.iter()
            .map(|row| {
                let activations = self.forward(row);
                let probs = &activations[activations.len() - 1];
                self.encoder.decode(super::argmax(probs))
            })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{blobs, three_classes};
    use super::*;

    fn config() -> MlpConfig {
        MlpConfig {
            hidden_layers: vec![16],
            learning_rate: 0.01,
            max_iter: 300,
            ..MlpConfig::default()
        }
    }

    #[test]
    fn learns_two_blobs() {
        let (x, y) = blobs();
        let mut mlp = MlpClassifier::new(&config(), Some(3));
        mlp.fit(&x, &y).unwrap();
        assert_eq!(mlp.predict(&x).unwrap(), y);
    }

    #[test]
    fn loss_decreases() {
        let (x, y) = three_classes();
        let mut mlp = MlpClassifier::new(&config(), Some(3));
        mlp.fit(&x, &y).unwrap();
        let curve = mlp.loss_curve();
        assert!(curve.len() > 1);
        assert!(curve[curve.len() - 1] < curve[0]);
    }

    #[test]
    fn stops_early_once_loss_plateaus() {
        let (x, y) = blobs();
        let config = MlpConfig {
            max_iter: 5000,
            ..config()
        };
        let mut mlp = MlpClassifier::new(&config, Some(5));
        mlp.fit(&x, &y).unwrap();
        let epochs = mlp.loss_curve().len();
        assert!(epochs < config.max_iter, "ran all {epochs} epochs");
        assert!(epochs > config.n_iter_no_change);
        assert_eq!(mlp.predict(&x).unwrap(), y);
    }

    #[test]
    fn same_seed_same_model() {
        let (x, y) = blobs();
        let mut a = MlpClassifier::new(&config(), Some(11));
        let mut b = MlpClassifier::new(&config(), Some(11));
        a.fit(&x, &y).unwrap();
        b.fit(&x, &y).unwrap();
        assert_eq!(a.loss_curve(), b.loss_curve());
    }

    #[test]
    fn softmax_sums_to_one() {
        let mut z = vec![1000.0, 1001.0, 999.0];
        softmax(&mut z);
        assert!((z.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert!(z[1] > z[0] && z[0] > z[2]);
    }
}
