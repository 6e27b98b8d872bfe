//! CART decision tree classifier over sparse features.
//!
//! Trees are grown to full depth: a node becomes a leaf only when it is
//! pure, holds fewer than two distinct samples, or no candidate feature
//! varies inside it. Splits minimize weighted Gini impurity and send a
//! sample left when its feature value is `<= threshold`.
//!
//! Features are sampled per node. `max_features` features are drawn
//! without replacement from all columns; those that are constant in the
//! node are skipped, and when every drawn feature is constant one varying
//! feature is drawn from the rest so the node can still split.
//!
//! The tree is stored as an arena of nodes and built with an explicit work
//! stack, so depth is bounded by memory rather than by the call stack.

use ahash::AHashMap;
use rand::Rng;
use rand::seq::index;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TriageError};
use crate::ml::sparse::{CsrMatrix, SparseRow};

/// Values closer than this are treated as equal when splitting.
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Nodes with fewer distinct samples are not split.
const MIN_SAMPLES_SPLIT: usize = 2;

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
    Leaf {
        /// Class probabilities, indexed by encoded class.
        distribution: Vec<f64>,
    },
}

/// A fitted classification tree.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTreeClassifier {
    nodes: Vec<Node>,
    n_classes: usize,
    n_features: usize,
    depth: usize,
}

/// Best split found for a node.
#[derive(Debug, Clone, Copy)]
struct Split {
    feature: usize,
    threshold: f64,
    score: f64,
}

/// Cells of one node, grouped by feature.
type NodeCells = AHashMap<usize, Vec<(f64, usize)>>;

impl DecisionTreeClassifier {
    /// Grow a tree.
    ///
    /// `y` holds encoded classes in `0..n_classes`; `sample_weight` holds
    /// one non-negative weight per row (bootstrap counts), and rows with
    /// zero weight are left out entirely.
    pub fn fit<R: Rng + ?Sized>(
        x: &CsrMatrix,
        y: &[usize],
        n_classes: usize,
        sample_weight: &[f64],
        max_features: usize,
        rng: &mut R,
    ) -> Result<Self> {
        if y.len() != x.num_rows() || sample_weight.len() != x.num_rows() {
            return Err(TriageError::training(format!(
                "tree input has {} rows, {} labels and {} weights",
                x.num_rows(),
                y.len(),
                sample_weight.len()
            )));
        }
        if let Some(&class) = y.iter().find(|&&class| class >= n_classes) {
            return Err(TriageError::training(format!(
                "class {class} out of range for {n_classes} classes"
            )));
        }
        if max_features == 0 {
            return Err(TriageError::training("max_features must be at least 1"));
        }

        let root: Vec<usize> = (0..x.num_rows())
            .filter(|&row| sample_weight[row] > 0.0)
            .collect();
        if root.is_empty() {
            return Err(TriageError::training("no samples with positive weight"));
        }

        let mut tree = Self {
            nodes: vec![Node::Leaf {
                distribution: Vec::new(),
            }],
            n_classes,
            n_features: x.num_cols(),
            depth: 0,
        };

        let mut stack = vec![(0, root, 0)];
        while let Some((id, rows, depth)) = stack.pop() {
            tree.depth = tree.depth.max(depth);
            let counts = class_weights(&rows, y, sample_weight, n_classes);
            let total: f64 = counts.iter().sum();
            let pure = counts.iter().filter(|&&c| c > 0.0).count() <= 1;

            let split = if pure || rows.len() < MIN_SAMPLES_SPLIT {
                None
            } else {
                best_split(x, &rows, y, sample_weight, &counts, max_features, rng)
            };

            match split {
                Some(split) => {
                    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                        .iter()
                        .partition(|&&row| x.get(row, split.feature) <= split.threshold);

                    let left = tree.push_placeholder();
                    let right = tree.push_placeholder();
                    tree.nodes[id] = Node::Split {
                        feature: split.feature,
                        threshold: split.threshold,
                        left,
                        right,
                    };
                    stack.push((right, right_rows, depth + 1));
                    stack.push((left, left_rows, depth + 1));
                }
                None => {
                    tree.nodes[id] = Node::Leaf {
                        distribution: counts.iter().map(|c| c / total).collect(),
                    };
                }
            }
        }

        Ok(tree)
    }

    fn push_placeholder(&mut self) -> usize {
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });
        self.nodes.len() - 1
    }

    /// Class probabilities for one sample.
    pub fn predict_proba_row(&self, row: SparseRow<'_>) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    id = if row.get(*feature) <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn n_classes(&self) -> usize {
        self.n_classes
    }

    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Length of the longest root-to-leaf path.
    pub fn depth(&self) -> usize {
        self.depth
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|node| matches!(node, Node::Leaf { .. }))
            .count()
    }
}

fn class_weights(rows: &[usize], y: &[usize], weight: &[f64], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0.0; n_classes];
    for &row in rows {
        counts[y[row]] += weight[row];
    }
    counts
}

/// Whether a feature takes more than one value inside the node.
fn is_varying(entries: &[(f64, usize)], node_size: usize) -> bool {
    let (mut min, mut max) = if entries.len() < node_size {
        (0.0, 0.0)
    } else {
        (f64::INFINITY, f64::NEG_INFINITY)
    };
    for &(value, _) in entries {
        min = min.min(value);
        max = max.max(value);
    }
    max - min > FEATURE_THRESHOLD
}

fn best_split<R: Rng + ?Sized>(
    x: &CsrMatrix,
    rows: &[usize],
    y: &[usize],
    weight: &[f64],
    counts: &[f64],
    max_features: usize,
    rng: &mut R,
) -> Option<Split> {
    let mut cells: NodeCells = AHashMap::new();
    for &row in rows {
        for (col, value) in x.row(row).iter() {
            cells.entry(col).or_default().push((value, row));
        }
    }

    let varying = |feature: &usize| {
        cells
            .get(feature)
            .is_some_and(|entries| is_varying(entries, rows.len()))
    };

    let n_features = x.num_cols();
    let mut candidates: Vec<usize> = index::sample(rng, n_features, max_features.min(n_features))
        .into_iter()
        .filter(|feature| varying(feature))
        .collect();
    if candidates.is_empty() {
        let mut rest: Vec<usize> = cells.keys().copied().filter(|f| varying(f)).collect();
        if rest.is_empty() {
            return None;
        }
        // Map iteration order is not stable.
        rest.sort_unstable();
        candidates.push(rest[rng.random_range(0..rest.len())]);
    }

    let mut best: Option<Split> = None;
    for feature in candidates {
        let Some(entries) = cells.get_mut(&feature) else {
            continue;
        };
        if let Some(split) = evaluate_feature(feature, entries, rows.len(), y, weight, counts) {
            if best.is_none_or(|b| split.score > b.score) {
                best = Some(split);
            }
        }
    }
    best
}

/// Find the best threshold for one feature.
///
/// Rows without a stored cell form a single block at value zero, placed
/// between the negative and positive cells.
fn evaluate_feature(
    feature: usize,
    entries: &mut [(f64, usize)],
    node_size: usize,
    y: &[usize],
    weight: &[f64],
    counts: &[f64],
) -> Option<Split> {
    entries.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    let n_classes = counts.len();
    let total: f64 = counts.iter().sum();

    let mut zero_counts = counts.to_vec();
    for &(_, row) in entries.iter() {
        zero_counts[y[row]] -= weight[row];
    }
    let zero_block = entries.len() < node_size;

    // (value, Some(row)) for a cell, (0.0, None) for the zero block.
    let negatives = entries.partition_point(|&(value, _)| value < 0.0);
    let mut items: Vec<(f64, Option<usize>)> = Vec::with_capacity(entries.len() + 1);
    items.extend(entries[..negatives].iter().map(|&(v, row)| (v, Some(row))));
    if zero_block {
        items.push((0.0, None));
    }
    items.extend(entries[negatives..].iter().map(|&(v, row)| (v, Some(row))));

    let mut left = vec![0.0; n_classes];
    let mut left_total = 0.0;
    let mut best: Option<Split> = None;

    for i in 0..items.len().saturating_sub(1) {
        let (value, row) = items[i];
        match row {
            Some(row) => {
                left[y[row]] += weight[row];
                left_total += weight[row];
            }
            None => {
                for (l, z) in left.iter_mut().zip(&zero_counts) {
                    *l += z;
                }
                left_total += zero_counts.iter().sum::<f64>();
            }
        }

        let next = items[i + 1].0;
        if next <= value + FEATURE_THRESHOLD {
            continue;
        }
        let right_total = total - left_total;
        if left_total <= 0.0 || right_total <= 0.0 {
            continue;
        }

        // Maximizing this minimizes the weighted Gini impurity of the children.
        let left_sq: f64 = left.iter().map(|c| c * c).sum();
        let right_sq: f64 = counts
            .iter()
            .zip(&left)
            .map(|(c, l)| (c - l) * (c - l))
            .sum();
        let score = left_sq / left_total + right_sq / right_total;

        if best.is_none_or(|b| score > b.score) {
            let mut threshold = value / 2.0 + next / 2.0;
            if threshold == next || !threshold.is_finite() {
                threshold = value;
            }
            best = Some(Split {
                feature,
                threshold,
                score,
            });
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn fit(x: &CsrMatrix, y: &[usize], max_features: usize) -> DecisionTreeClassifier {
        let weights = vec![1.0; y.len()];
        let mut rng = StdRng::seed_from_u64(0);
        DecisionTreeClassifier::fit(x, y, 2, &weights, max_features, &mut rng).unwrap()
    }

    #[test]
    fn test_separable_data() {
        let x = CsrMatrix::from_rows(
            vec![
                vec![(0, 0.9)],
                vec![(0, 0.8)],
                vec![(1, 0.7)],
                vec![(1, 0.5)],
            ],
            2,
        )
        .unwrap();
        let y = [1, 1, 0, 0];
        let tree = fit(&x, &y, 2);

        for (i, &class) in y.iter().enumerate() {
            assert_eq!(tree.predict_proba_row(x.row(i))[class], 1.0);
        }
        assert_eq!(tree.leaf_count(), 2);
        assert_eq!(tree.depth(), 1);
    }

    #[test]
    fn test_pure_node_is_a_leaf() {
        let x = CsrMatrix::from_rows(vec![vec![(0, 1.0)], vec![]], 1).unwrap();
        let tree = fit(&x, &[0, 0], 1);

        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_proba_row(x.row(1)), &[1.0, 0.0]);
    }

    #[test]
    fn test_constant_draws_fall_back_to_a_varying_feature() {
        // only column 3 carries signal; one feature is drawn per node
        let rows = (0..8)
            .map(|i| if i % 2 == 0 { vec![(3, 1.0)] } else { vec![] })
            .collect();
        let x = CsrMatrix::from_rows(rows, 50).unwrap();
        let y: Vec<usize> = (0..8).map(|i| usize::from(i % 2 == 0)).collect();

        let tree = fit(&x, &y, 1);

        for (i, &class) in y.iter().enumerate() {
            assert_eq!(tree.predict_proba_row(x.row(i))[class], 1.0);
        }
    }

    #[test]
    fn test_indistinguishable_rows_give_mixed_leaf() {
        let x = CsrMatrix::from_rows(vec![vec![(0, 1.0)], vec![(0, 1.0)], vec![(0, 1.0)]], 1)
            .unwrap();
        let tree = fit(&x, &[0, 1, 1], 1);

        let proba = tree.predict_proba_row(x.row(0));
        assert!((proba[0] - 1.0 / 3.0).abs() < 1e-12);
        assert!((proba[1] - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_weights_shape_the_leaves() {
        let x = CsrMatrix::from_rows(vec![vec![], vec![], vec![(0, 1.0)]], 1).unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let tree =
            DecisionTreeClassifier::fit(&x, &[0, 1, 1], 2, &[3.0, 1.0, 0.0], 1, &mut rng).unwrap();

        // the third row has zero weight, so the tree never sees column 0 vary
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_proba_row(x.row(2)), &[0.75, 0.25]);
    }

    #[test]
    fn test_negative_values_split_around_zero() {
        let x = CsrMatrix::from_rows(vec![vec![(0, -1.0)], vec![], vec![(0, 1.0)]], 1).unwrap();
        let tree = fit(&x, &[1, 0, 0], 1);

        assert_eq!(tree.predict_proba_row(x.row(0))[1], 1.0);
        assert_eq!(tree.predict_proba_row(x.row(1))[0], 1.0);
        assert_eq!(tree.predict_proba_row(x.row(2))[0], 1.0);
    }

    #[test]
    fn test_invalid_input() {
        let x = CsrMatrix::from_rows(vec![vec![(0, 1.0)]], 1).unwrap();
        let mut rng = StdRng::seed_from_u64(0);

        assert!(DecisionTreeClassifier::fit(&x, &[0, 1], 2, &[1.0], 1, &mut rng).is_err());
        assert!(DecisionTreeClassifier::fit(&x, &[2], 2, &[1.0], 1, &mut rng).is_err());
        assert!(DecisionTreeClassifier::fit(&x, &[0], 2, &[0.0], 1, &mut rng).is_err());
        assert!(DecisionTreeClassifier::fit(&x, &[0], 2, &[1.0], 0, &mut rng).is_err());
    }
}
