//! Random forest regressor
//!
//! Wraps smartcore's bagged regression-tree forest behind the [`Regressor`]
//! seam. Rows reach the model only through [`FeatureVector::to_row`], so the
//! column order recorded in model metadata is the order the trees split on.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_regressor::{
    RandomForestRegressor, RandomForestRegressorParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;

use crate::error::{Error, Result};
use crate::features::{FeatureVector, FEATURE_COUNT};

type ForestModel = RandomForestRegressor<f64, f64, DenseMatrix<f64>, Vec<f64>>;

/// Anything that maps a feature vector to a months estimate
pub trait Regressor: Send + Sync {
    fn predict(&self, features: &FeatureVector) -> f64;
}

/// Forest hyperparameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ForestConfig {
    pub n_trees: usize,
    /// None grows trees until leaves are pure or too small to split
    pub max_depth: Option<u16>,
    pub min_samples_split: usize,
    pub min_samples_leaf: usize,
    /// Features considered per split; None uses all of them
    pub max_features: Option<usize>,
    /// Seed for bootstrap sampling and per-split feature selection
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: None,
            min_samples_split: 2,
            min_samples_leaf: 1,
            max_features: None,
            seed: 42,
        }
    }
}

impl ForestConfig {
    pub fn validate(&self) -> Result<()> {
        if self.n_trees == 0 {
            return Err(Error::Config("forest: n_trees must be at least 1".to_string()));
        }
        if self.max_depth == Some(0) {
            return Err(Error::Config("forest: max_depth must be at least 1".to_string()));
        }
        if self.min_samples_split < 2 {
            return Err(Error::Config(
                "forest: min_samples_split must be at least 2".to_string(),
            ));
        }
        if self.min_samples_leaf == 0 {
            return Err(Error::Config(
                "forest: min_samples_leaf must be at least 1".to_string(),
            ));
        }
        if let Some(k) = self.max_features {
            if k == 0 || k > FEATURE_COUNT {
                return Err(Error::Config(format!(
                    "forest: max_features must be between 1 and {}",
                    FEATURE_COUNT
                )));
            }
        }
        Ok(())
    }

    fn parameters(&self) -> RandomForestRegressorParameters {
        let params = RandomForestRegressorParameters::default()
            .with_n_trees(self.n_trees)
            .with_min_samples_split(self.min_samples_split)
            .with_min_samples_leaf(self.min_samples_leaf)
            .with_m(self.max_features.unwrap_or(FEATURE_COUNT))
            .with_seed(self.seed);
        match self.max_depth {
            Some(depth) => params.with_max_depth(depth),
            None => params,
        }
    }
}

/// Fitted ensemble of regression trees
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RandomForest {
    config: ForestConfig,
    model: Arc<ForestModel>,
    /// Normalized total variance reduction per feature, in model column order
    importances: [f64; FEATURE_COUNT],
}

impl RandomForest {
    /// Fit a forest on `features` against `targets`
    pub fn fit(config: ForestConfig, features: &[FeatureVector], targets: &[f64]) -> Result<Self> {
        config.validate()?;

        if features.is_empty() {
            return Err(Error::TrainingDataInvalid(
                "cannot fit a forest on zero samples".to_string(),
            ));
        }
        if features.len() != targets.len() {
            return Err(Error::TrainingDataInvalid(format!(
                "{} feature rows but {} targets",
                features.len(),
                targets.len()
            )));
        }

        let x = matrix(features)?;
        let model: ForestModel = RandomForestRegressor::fit(&x, &targets.to_vec(), config.parameters())
            .map_err(|e| Error::Model(format!("random forest fit failed: {}", e)))?;

        let mut forest = Self {
            config,
            model: Arc::new(model),
            importances: [0.0; FEATURE_COUNT],
        };
        forest.importances = forest.layout()?.importances();
        Ok(forest)
    }

    pub fn config(&self) -> &ForestConfig {
        &self.config
    }

    pub fn tree_count(&self) -> usize {
        self.config.n_trees
    }

    /// Predict a batch of rows in one pass over the trees
    pub fn predict_batch(&self, features: &[FeatureVector]) -> Result<Vec<f64>> {
        if features.is_empty() {
            return Ok(Vec::new());
        }
        let x = matrix(features)?;
        self.model
            .predict(&x)
            .map_err(|e| Error::Model(format!("random forest prediction failed: {}", e)))
    }

    /// Features ranked by importance, highest first
    pub fn feature_importance(&self) -> Vec<(&'static str, f64)> {
        let mut ranking: Vec<_> = FeatureVector::NAMES
            .iter()
            .copied()
            .zip(self.importances)
            .collect();
        ranking.sort_by(|a, b| b.1.total_cmp(&a.1));
        ranking
    }

    /// Check the fitted tree structure of a deserialized forest.
    ///
    /// Every tree must be non-empty, every split must name a known feature
    /// with a finite threshold, and child ids must point forward inside the
    /// tree so traversal always terminates.
    pub fn validate(&self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| Error::Model(format!("invalid forest settings: {}", e)))?;

        let layout = self.layout()?;
        let trees = layout.trees();
        if trees.is_empty() {
            return Err(Error::Model("forest has no fitted trees".to_string()));
        }
        if trees.len() != self.config.n_trees {
            return Err(Error::Model(format!(
                "forest has {} trees but was configured with {}",
                trees.len(),
                self.config.n_trees
            )));
        }
        for (index, tree) in trees.iter().enumerate() {
            tree.check(index)?;
        }

        if self.importances.iter().any(|v| !v.is_finite()) {
            return Err(Error::Model("feature importances are not finite".to_string()));
        }
        Ok(())
    }

    fn layout(&self) -> Result<ForestLayout> {
        serde_json::to_value(self.model.as_ref())
            .and_then(serde_json::from_value)
            .map_err(|e| Error::Model(format!("unreadable forest structure: {}", e)))
    }
}

impl Regressor for RandomForest {
    fn predict(&self, features: &FeatureVector) -> f64 {
        match self.predict_batch(std::slice::from_ref(features)) {
            Ok(out) => out.first().copied().unwrap_or(f64::NAN),
            Err(e) => {
                tracing::warn!(error = %e, "Forest prediction failed");
                f64::NAN
            }
        }
    }
}

fn matrix(features: &[FeatureVector]) -> Result<DenseMatrix<f64>> {
    let rows: Vec<Vec<f64>> = features.iter().map(|f| f.to_row().to_vec()).collect();
    DenseMatrix::from_2d_vec(&rows)
        .map_err(|e| Error::Model(format!("could not build feature matrix: {}", e)))
}

// Read-only mirror of smartcore's serialized forest. Its fields are private,
// so the serde layout is the only view of the fitted trees.

#[derive(Deserialize)]
struct ForestLayout {
    forest_regressor: Option<EnsembleLayout>,
}

#[derive(Deserialize)]
struct EnsembleLayout {
    trees: Option<Vec<TreeLayout>>,
}

#[derive(Deserialize)]
struct TreeLayout {
    nodes: Vec<NodeLayout>,
}

#[derive(Deserialize)]
struct NodeLayout {
    output: f64,
    split_feature: usize,
    split_value: Option<f64>,
    split_score: Option<f64>,
    true_child: Option<usize>,
    false_child: Option<usize>,
}

impl ForestLayout {
    fn trees(&self) -> &[TreeLayout] {
        self.forest_regressor
            .as_ref()
            .and_then(|f| f.trees.as_deref())
            .unwrap_or(&[])
    }

    /// Sum of split variance reduction per feature, normalized to 1
    fn importances(&self) -> [f64; FEATURE_COUNT] {
        let mut totals = [0.0; FEATURE_COUNT];
        for node in self.trees().iter().flat_map(|t| &t.nodes) {
            if let (Some(_), Some(score)) = (node.true_child, node.split_score) {
                if let Some(total) = totals.get_mut(node.split_feature) {
                    *total += score.max(0.0);
                }
            }
        }

        let sum: f64 = totals.iter().sum();
        if sum > 0.0 {
            for value in totals.iter_mut() {
                *value /= sum;
            }
        }
        totals
    }
}

impl TreeLayout {
    fn check(&self, tree: usize) -> Result<()> {
        if self.nodes.is_empty() {
            return Err(Error::Model(format!("tree {} has no nodes", tree)));
        }

        let len = self.nodes.len();
        for (id, node) in self.nodes.iter().enumerate() {
            let broken = |what: String| Error::Model(format!("tree {} node {}: {}", tree, id, what));

            if !node.output.is_finite() {
                return Err(broken("output is not finite".to_string()));
            }

            match (node.true_child, node.false_child) {
                (None, None) => {}
                (Some(left), Some(right)) => {
                    for child in [left, right] {
                        if child <= id || child >= len {
                            return Err(broken(format!("child {} is out of range", child)));
                        }
                    }
                    if node.split_feature >= FEATURE_COUNT {
                        return Err(broken(format!(
                            "split feature {} is out of range",
                            node.split_feature
                        )));
                    }
                    if !node.split_value.is_some_and(f64::is_finite) {
                        return Err(broken("split threshold is missing".to_string()));
                    }
                }
                _ => return Err(broken("split is missing a child".to_string())),
            }
        }
        Ok(())
    }
}
