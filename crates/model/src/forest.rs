//! Decision trees and forest ensembles.
//!
//! Leaves hold the class-1 probability as a fixed-point integer in
//! `[0, SCALE]`. Traversal goes left when `feature <= threshold`.

use serde::{Deserialize, Serialize};

/// A decision tree node (internal or leaf)
///
/// Internal nodes carry `feature_idx >= 0` and child indices. Leaves carry
/// `feature_idx == -1`, `left == right == -1` and a `leaf` probability.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Node {
    pub id: i32,
    pub left: i32,
    pub right: i32,
    #[serde(rename = "feature_idx", alias = "feature")]
    pub feature_idx: i32,
    pub threshold: i64,
    pub leaf: Option<i64>,
}

impl Node {
    pub fn internal(id: i32, feature_idx: i32, threshold: i64, left: i32, right: i32) -> Self {
        Self {
            id,
            left,
            right,
            feature_idx,
            threshold,
            leaf: None,
        }
    }

    pub fn leaf(id: i32, probability: i64) -> Self {
        Self {
            id,
            left: -1,
            right: -1,
            feature_idx: -1,
            threshold: 0,
            leaf: Some(probability),
        }
    }

    pub fn is_leaf(&self) -> bool {
        self.feature_idx == -1 || self.leaf.is_some()
    }
}

/// A single classification tree. Node 0 is the root.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct Tree {
    pub nodes: Vec<Node>,
}

impl Tree {
    pub fn new(nodes: Vec<Node>) -> Self {
        Self { nodes }
    }

    /// Class-1 probability for a feature vector.
    ///
    /// Malformed structure (bad child or feature index) yields 0.
    pub fn evaluate(&self, features: &[i64]) -> i64 {
        let mut idx = 0usize;

        // Each step moves to a strictly later node in a valid tree.
        for _ in 0..self.nodes.len() {
            let Some(node) = self.nodes.get(idx) else {
                return 0;
            };

            if node.is_leaf() {
                return node.leaf.unwrap_or(0);
            }

            let Some(&value) = usize::try_from(node.feature_idx)
                .ok()
                .and_then(|f| features.get(f))
            else {
                return 0;
            };

            let next = if value <= node.threshold {
                node.left
            } else {
                node.right
            };
            idx = match usize::try_from(next) {
                Ok(next) => next,
                Err(_) => return 0,
            };
        }

        0
    }

    /// Deepest root-to-leaf path length in edges.
    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], idx: usize, budget: usize) -> usize {
            match nodes.get(idx) {
                Some(node) if !node.is_leaf() && budget > 0 => {
                    let left = walk(nodes, node.left.max(0) as usize, budget - 1);
                    let right = walk(nodes, node.right.max(0) as usize, budget - 1);
                    1 + left.max(right)
                }
                _ => 0,
            }
        }
        walk(&self.nodes, 0, self.nodes.len())
    }

    /// Validate structure against the number of input features and the
    /// probability scale.
    pub fn validate(&self, n_features: usize, scale: i64) -> Result<(), String> {
        if self.nodes.is_empty() {
            return Err("Tree has no nodes".to_string());
        }

        let len = self.nodes.len() as i64;
        for (i, node) in self.nodes.iter().enumerate() {
            let i = i as i64;
            if node.is_leaf() {
                match node.leaf {
                    None => return Err(format!("Leaf node {i} has no leaf value")),
                    Some(p) if !(0..=scale).contains(&p) => {
                        return Err(format!("Leaf node {i} probability {p} outside [0, {scale}]"))
                    }
                    Some(_) => {}
                }
                continue;
            }

            // Children must come after their parent, which rules out cycles.
            for (side, child) in [("left", node.left), ("right", node.right)] {
                let child = child as i64;
                if child <= i || child >= len {
                    return Err(format!("Node {i} has invalid {side} child: {child}"));
                }
            }

            if node.feature_idx < 0 || node.feature_idx as usize >= n_features {
                return Err(format!(
                    "Internal node {i} has invalid feature index: {}",
                    node.feature_idx
                ));
            }
        }

        Ok(())
    }
}

/// Random forest: the mean of its trees' probabilities.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct RandomForest {
    pub trees: Vec<Tree>,
}

impl RandomForest {
    pub fn new(trees: Vec<Tree>) -> Self {
        Self { trees }
    }

    pub fn predict_proba(&self, features: &[i64]) -> i64 {
        integer_mean(self.trees.iter().map(|tree| tree.evaluate(features)), self.trees.len())
    }
}

/// Bagged ensemble of random forests.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct BaggedForest {
    pub estimators: Vec<RandomForest>,
}

impl BaggedForest {
    pub fn new(estimators: Vec<RandomForest>) -> Self {
        Self { estimators }
    }

    pub fn predict_proba(&self, features: &[i64]) -> i64 {
        integer_mean(
            self.estimators.iter().map(|forest| forest.predict_proba(features)),
            self.estimators.len(),
        )
    }

    pub fn num_trees(&self) -> usize {
        self.estimators.iter().map(|forest| forest.trees.len()).sum()
    }
}

fn integer_mean(values: impl Iterator<Item = i64>, count: usize) -> i64 {
    if count == 0 {
        return 0;
    }
    let sum: i128 = values.map(i128::from).sum();
    (sum / count as i128) as i64
}
