//! Bagged random forest regressor.
//!
//! Trees are fitted in parallel on bootstrap resamples. Tree `i` draws
//! its bootstrap sample and split randomness from `seed + i`, so a
//! forest is fully reproducible for a given seed regardless of thread
//! scheduling.

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use super::decision_tree::{DecisionTree, TreeConfig};
use super::Regressor;
use crate::features::FeatureVec;
use types::PredictorConfig;

// =============================================================================
// Configuration
// =============================================================================

/// Forest training parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ForestConfig {
    /// Number of trees.
    pub n_trees: usize,
    /// Maximum depth per tree.
    pub max_depth: usize,
    /// Minimum samples required to split an internal node.
    pub min_samples_split: usize,
    /// Minimum samples required in each leaf.
    pub min_samples_leaf: usize,
    /// Features considered per split (None = n_features / 3).
    pub max_features: Option<usize>,
    /// Base RNG seed.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: 12,
            min_samples_split: 5,
            min_samples_leaf: 2,
            max_features: None,
            seed: 42,
        }
    }
}

impl From<&PredictorConfig> for ForestConfig {
    fn from(cfg: &PredictorConfig) -> Self {
        Self {
            n_trees: cfg.n_trees,
            max_depth: cfg.max_depth,
            min_samples_split: cfg.min_samples_split,
            min_samples_leaf: cfg.min_samples_leaf,
            max_features: cfg.max_features,
            seed: cfg.seed,
        }
    }
}

// =============================================================================
// Random Forest
// =============================================================================

/// A fitted bagged forest of CART regression trees.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    trees: Vec<DecisionTree>,
    n_features: usize,
    /// Normalized mean importance across trees.
    importances: Vec<f64>,
}

impl RandomForest {
    /// Create an unfitted forest.
    pub fn new(config: ForestConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            n_features: 0,
            importances: Vec::new(),
        }
    }

    /// Fit the forest on a feature matrix and labels.
    ///
    /// # Panics
    /// Panics on an empty matrix or mismatched label length.
    pub fn fit(&mut self, rows: &[FeatureVec], labels: &[f64]) {
        assert!(!rows.is_empty(), "cannot fit on an empty matrix");
        assert_eq!(rows.len(), labels.len(), "one label per row required");

        let n = rows.len();
        self.n_features = rows[0].len();
        let max_features = self
            .config
            .max_features
            .unwrap_or((self.n_features / 3).max(1));

        let tree_config = TreeConfig {
            max_depth: self.config.max_depth,
            min_samples_split: self.config.min_samples_split,
            min_samples_leaf: self.config.min_samples_leaf,
            max_features,
            seed: 0, // per-tree seed assigned below
        };

        self.trees = (0..self.config.n_trees)
            .into_par_iter()
            .map(|t| {
                let tree_seed = self.config.seed.wrapping_add(t as u64);
                let mut rng = ChaCha8Rng::seed_from_u64(tree_seed);

                // Bootstrap resample with replacement
                let mut boot_rows: Vec<FeatureVec> = Vec::with_capacity(n);
                let mut boot_labels: Vec<f64> = Vec::with_capacity(n);
                for _ in 0..n {
                    let i = rng.gen_range(0..n);
                    boot_rows.push(rows[i].clone());
                    boot_labels.push(labels[i]);
                }

                let mut tree = DecisionTree::new(TreeConfig {
                    seed: tree_seed,
                    ..tree_config.clone()
                });
                tree.fit(&boot_rows, &boot_labels);
                tree
            })
            .collect();

        // Average per-tree importances, then renormalize
        let mut importances = vec![0.0; self.n_features];
        for tree in &self.trees {
            for (total, imp) in importances.iter_mut().zip(tree.feature_importances()) {
                *total += imp;
            }
        }
        let sum: f64 = importances.iter().sum();
        if sum > 0.0 {
            for imp in importances.iter_mut() {
                *imp /= sum;
            }
        }
        self.importances = importances;
    }

    /// Number of fitted trees.
    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }

    /// Number of features the forest was fitted on.
    pub fn n_features(&self) -> usize {
        self.n_features
    }

    /// Normalized feature importances (empty before fitting).
    pub fn feature_importances(&self) -> &[f64] {
        &self.importances
    }
}

impl Regressor for RandomForest {
    fn predict_one(&self, features: &[f64]) -> f64 {
        if self.trees.is_empty() {
            return 0.0;
        }
        let sum: f64 = self
            .trees
            .iter()
            .map(|tree| tree.predict_one(features))
            .sum();
        sum / self.trees.len() as f64
    }
}

// =============================================================================
// Tests
// =============================================================================
