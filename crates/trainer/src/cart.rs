//! CART classification tree builder
//!
//! Exact-greedy Gini splits over integer features. Each node considers a
//! random subset of `max_features` columns; thresholds are midpoints between
//! consecutive distinct values, so `x <= threshold` reproduces the split.

use soilscope_model::{Node, Tree, SCALE};
use soilscope_types::IrrigationClass;

use crate::deterministic::{LcgRng, SplitTieBreaker};

/// Training parameters for a single tree
#[derive(Clone, Debug)]
pub struct TreeConfig {
    pub max_depth: usize,
    pub min_samples_leaf: usize,
    pub min_samples_split: usize,
    /// Candidate columns drawn per node
    pub max_features: usize,
}

impl Default for TreeConfig {
    fn default() -> Self {
        Self {
            max_depth: 10,
            min_samples_leaf: 1,
            min_samples_split: 2,
            max_features: 2,
        }
    }
}

/// Split candidate with gain and tie-breaker
#[derive(Debug, Clone)]
struct SplitCandidate {
    feature_idx: usize,
    threshold: i64,
    gain: i128,
    tie_breaker: SplitTieBreaker,
}

impl SplitCandidate {
    fn new(feature_idx: usize, threshold: i64, gain: i128, node_id: usize) -> Self {
        Self {
            feature_idx,
            threshold,
            gain,
            tie_breaker: SplitTieBreaker::new(feature_idx, threshold, node_id),
        }
    }

    fn beats(&self, other: &SplitCandidate) -> bool {
        self.gain > other.gain || (self.gain == other.gain && self.tie_breaker < other.tie_breaker)
    }
}

/// `n * gini * SCALE` for a node holding `positives` of `n` class-1 samples.
fn weighted_gini(n: usize, positives: usize) -> i128 {
    if n == 0 {
        return 0;
    }
    let n = n as i128;
    let pos = positives as i128;
    let neg = n - pos;
    (n * n - pos * pos - neg * neg) * i128::from(SCALE) / n
}

/// Builds one classification tree over rows of a shared feature matrix.
pub struct CartBuilder<'a> {
    config: TreeConfig,
    features: &'a [Vec<i64>],
    labels: &'a [IrrigationClass],
    feature_count: usize,
}

impl<'a> CartBuilder<'a> {
    pub fn new(features: &'a [Vec<i64>], labels: &'a [IrrigationClass], config: TreeConfig) -> Self {
        let feature_count = features.first().map(Vec::len).unwrap_or(0);
        Self {
            config,
            features,
            labels,
            feature_count,
        }
    }

    /// Build a tree from the given row indices (duplicates allowed).
    pub fn build(&self, indices: &[usize], rng: &mut LcgRng) -> Tree {
        let mut nodes = Vec::new();
        self.build_node(indices, 0, 0, &mut nodes, rng);
        Tree::new(nodes)
    }

    fn positives(&self, indices: &[usize]) -> usize {
        indices
            .iter()
            .filter(|&&i| self.labels[i] == IrrigationClass::NotNeeded)
            .count()
    }

    fn build_node(
        &self,
        indices: &[usize],
        depth: usize,
        node_id: usize,
        nodes: &mut Vec<Node>,
        rng: &mut LcgRng,
    ) -> i32 {
        let current = nodes.len();
        let positives = self.positives(indices);
        let leaf_value = if indices.is_empty() {
            0
        } else {
            (positives as i128 * i128::from(SCALE) / indices.len() as i128) as i64
        };

        let pure = positives == 0 || positives == indices.len();
        let split = if pure
            || depth >= self.config.max_depth
            || indices.len() < self.config.min_samples_split.max(2)
        {
            None
        } else {
            self.find_best_split(indices, positives, node_id, rng)
        };

        let Some(split) = split else {
            nodes.push(Node::leaf(current as i32, leaf_value));
            return current as i32;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| self.features[i][split.feature_idx] <= split.threshold);

        // Reserve the slot; children are filled in after recursion.
        nodes.push(Node::internal(
            current as i32,
            split.feature_idx as i32,
            split.threshold,
            -1,
            -1,
        ));
        let left_idx = self.build_node(&left, depth + 1, node_id * 2 + 1, nodes, rng);
        let right_idx = self.build_node(&right, depth + 1, node_id * 2 + 2, nodes, rng);
        nodes[current].left = left_idx;
        nodes[current].right = right_idx;

        current as i32
    }

    fn find_best_split(
        &self,
        indices: &[usize],
        positives: usize,
        node_id: usize,
        rng: &mut LcgRng,
    ) -> Option<SplitCandidate> {
        let parent_impurity = weighted_gini(indices.len(), positives);
        let mut candidates = rng.sample_indices(self.feature_count, self.config.max_features.max(1));
        candidates.sort_unstable();

        let mut best: Option<SplitCandidate> = None;
        for feature_idx in candidates {
            if let Some(candidate) =
                self.best_split_for_feature(indices, feature_idx, positives, parent_impurity, node_id)
            {
                if best.as_ref().map_or(true, |current| candidate.beats(current)) {
                    best = Some(candidate);
                }
            }
        }
        best
    }

    fn best_split_for_feature(
        &self,
        indices: &[usize],
        feature_idx: usize,
        positives: usize,
        parent_impurity: i128,
        node_id: usize,
    ) -> Option<SplitCandidate> {
        let mut column: Vec<(i64, bool)> = indices
            .iter()
            .map(|&i| {
                (
                    self.features[i][feature_idx],
                    self.labels[i] == IrrigationClass::NotNeeded,
                )
            })
            .collect();
        column.sort_unstable();

        let n = column.len();
        let min_leaf = self.config.min_samples_leaf.max(1);
        let mut best: Option<SplitCandidate> = None;
        let mut left_pos = 0usize;

        for i in 0..n.saturating_sub(1) {
            if column[i].1 {
                left_pos += 1;
            }
            let (value, next) = (column[i].0, column[i + 1].0);
            let left_n = i + 1;
            let right_n = n - left_n;
            if value == next || left_n < min_leaf || right_n < min_leaf {
                continue;
            }

            let impurity = weighted_gini(left_n, left_pos) + weighted_gini(right_n, positives - left_pos);
            let gain = parent_impurity - impurity;
            if gain <= 0 {
                continue;
            }

            let threshold = ((i128::from(value) + i128::from(next)).div_euclid(2)) as i64;
            let candidate = SplitCandidate::new(feature_idx, threshold, gain, node_id);
            if best.as_ref().map_or(true, |current| candidate.beats(current)) {
                best = Some(candidate);
            }
        }

        best
    }
}
