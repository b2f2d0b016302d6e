use super::{check_training, check_width, Classifier, LabelEncoder};
use crate::error::{Error, Result};
use linfa_nn::distance::{Distance, L2Dist};
use linfa_nn::{CommonNearestNeighbour, NearestNeighbour, NearestNeighbourIndex};
use ndarray::{Array2, ArrayView1};
use serde::{Deserialize, Serialize};

/// k-nearest-neighbour classifier with inverse-distance voting, searched
/// through a `linfa-nn` k-d tree.
///
/// When a query coincides with training points (distance 0) only those
/// points vote.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KNearestNeighbors {
    k: usize,
    encoder: LabelEncoder,
    x_train: Vec<Vec<f64>>,
    y_train: Vec<usize>,
}

impl KNearestNeighbors {
    pub fn new(k: usize) -> Self {
        Self {
            k: k.max(1),
            encoder: LabelEncoder::default(),
            x_train: Vec::new(),
            y_train: Vec::new(),
        }
    }

    /// Weighted vote over `(distance, class)` pairs.
    fn vote(&self, nearest: &[(f64, usize)]) -> usize {
        let mut scores = vec![0.0; self.encoder.len()];
        if nearest.iter().any(|(d, _)| *d == 0.0) {
            for (_, label) in nearest.iter().filter(|(d, _)| *d == 0.0) {
                scores[*label] += 1.0;
            }
        } else {
            for (d, label) in nearest {
                scores[*label] += 1.0 / d;
            }
        }
        super::argmax(&scores)
    }
}

impl Classifier for KNearestNeighbors {
    /// Stores the training data; the search index is built at prediction time.
    fn fit(&mut self, x: &[Vec<f64>], y: &[String]) -> Result<()> {
        check_training(x, y)?;
        let (encoder, encoded) = LabelEncoder::fit(y);
        self.encoder = encoder;
        self.x_train = x.to_vec();
        self.y_train = encoded;
        Ok(())
    }

    fn predict(&self, x: &[Vec<f64>]) -> Result<Vec<String>> {
        let width = self
            .x_train
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::NotFitted("knn".to_string()))?;
        check_width(x, width)?;

        let flat: Vec<f64> = self.x_train.iter().flatten().copied().collect();
        let points = Array2::from_shape_vec((self.x_train.len(), width), flat)?;
        let index = CommonNearestNeighbour::KdTree.from_batch(&points, L2Dist)?;
        let k = self.k.min(self.y_train.len());

        let mut predictions = Vec::with_capacity(x.len());
        for row in x {
            let query = ArrayView1::from(row.as_slice());
            let nearest: Vec<(f64, usize)> = index
                .k_nearest(query, k)?
                .into_iter()
                .map(|(point, i)| (L2Dist.distance(point, query), self.y_train[i]))
                .collect();
            predictions.push(self.encoder.decode(self.vote(&nearest)));
        }
        Ok(predictions)
    }
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::{blobs, three_classes};
    use super::*;

    #[test]
    fn nearest_blob_wins() {
        let (x, y) = blobs();
        let mut knn = KNearestNeighbors::new(3);
        knn.fit(&x, &y).unwrap();
        let pred = knn.predict(&[vec![0.3, 0.3], vec![5.1, 5.1]]).unwrap();
        assert_eq!(pred, vec!["False", "True"]);
    }

    #[test]
    fn k_larger_than_training_set_is_clamped() {
        let (x, y) = three_classes();
        let mut knn = KNearestNeighbors::new(10);
        knn.fit(&x, &y).unwrap();
        let pred = knn.predict(&[vec![8.1, 1.0]]).unwrap();
        assert_eq!(pred, vec!["c"]);
    }

    #[test]
    fn exact_matches_outvote_neighbours() {
        let x = vec![vec![0.0], vec![0.1], vec![0.1], vec![0.2]];
        let y: Vec<String> = ["a", "b", "b", "b"].iter().map(|s| s.to_string()).collect();
        let mut knn = KNearestNeighbors::new(4);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&[vec![0.0]]).unwrap(), vec!["a"]);
    }

    #[test]
    fn closer_neighbours_weigh_more() {
        // two far "b" points against one close "a" point
        let x = vec![vec![0.0], vec![3.0], vec![3.2]];
        let y: Vec<String> = ["a", "b", "b"].iter().map(|s| s.to_string()).collect();
        let mut knn = KNearestNeighbors::new(3);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&[vec![0.5]]).unwrap(), vec!["a"]);
    }

    #[test]
    fn training_data_is_memorized() {
        let (x, y) = blobs();
        let mut knn = KNearestNeighbors::new(10);
        knn.fit(&x, &y).unwrap();
        assert_eq!(knn.predict(&x).unwrap(), y);
    }
}
