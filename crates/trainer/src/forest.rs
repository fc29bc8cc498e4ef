//! Random forest and bagging ensemble training.

use soilscope_model::{BaggedForest, RandomForest};
use soilscope_types::IrrigationClass;
use tracing::debug;

use crate::cart::{CartBuilder, TreeConfig};
use crate::deterministic::{derive_seed, LcgRng};

/// Ensemble shape and per-tree settings.
#[derive(Clone, Debug)]
pub struct ForestConfig {
    pub n_estimators: usize,
    pub trees_per_estimator: usize,
    pub tree: TreeConfig,
}

/// Default number of candidate columns per split: `floor(sqrt(n))`, at least 1.
pub fn sqrt_features(feature_count: usize) -> usize {
    let mut k = 1usize;
    while (k + 1) * (k + 1) <= feature_count {
        k += 1;
    }
    k
}

/// Fit one random forest on `bag`; every tree draws its own bootstrap of it.
pub fn fit_random_forest(
    builder: &CartBuilder<'_>,
    bag: &[usize],
    n_trees: usize,
    rng: &mut LcgRng,
) -> RandomForest {
    let trees = (0..n_trees)
        .map(|_| {
            let sample = rng.bootstrap(bag, bag.len());
            builder.build(&sample, rng)
        })
        .collect();
    RandomForest::new(trees)
}

/// Fit the bagged ensemble over all rows of `features`.
///
/// Bag `b` uses the seed `derive_seed(seed, b)` for its bootstrap and all of
/// its trees.
pub fn fit_bagged_forest(
    features: &[Vec<i64>],
    labels: &[IrrigationClass],
    config: &ForestConfig,
    seed: u64,
) -> BaggedForest {
    let builder = CartBuilder::new(features, labels, config.tree.clone());
    let rows: Vec<usize> = (0..features.len()).collect();

    let estimators = (0..config.n_estimators)
        .map(|b| {
            let mut rng = LcgRng::new(derive_seed(seed, b as u64));
            let bag = rng.bootstrap(&rows, rows.len());
            let forest = fit_random_forest(&builder, &bag, config.trees_per_estimator, &mut rng);
            debug!(
                "Estimator {}/{}: {} trees, {} nodes",
                b + 1,
                config.n_estimators,
                forest.trees.len(),
                forest.trees.iter().map(|t| t.nodes.len()).sum::<usize>()
            );
            forest
        })
        .collect();

    BaggedForest::new(estimators)
}
