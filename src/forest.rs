//! Random forest regressor (bagged CART trees, variance-reduction splits).

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rayon::prelude::*;

#[derive(Debug, Clone, PartialEq)]
pub struct ForestConfig {
    /// Number of bootstrap trees.
    pub n_trees: usize,
    /// Maximum tree depth. `None` grows until leaves are pure or too small.
    pub max_depth: Option<usize>,
    /// Minimum samples a node needs before it may be split.
    pub min_samples_split: usize,
    /// Base seed; tree `i` uses `seed + i`.
    pub seed: u64,
}

impl Default for ForestConfig {
    fn default() -> Self {
        Self {
            n_trees: 100,
            max_depth: Some(16),
            min_samples_split: 2,
            seed: 42,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
struct RegressionTree {
    nodes: Vec<Node>,
}

impl RegressionTree {
    fn predict(&self, row: &[f64]) -> f64 {
        let mut index = 0;
        loop {
            match &self.nodes[index] {
                Node::Leaf { value } => return *value,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    index = if row[*feature] <= *threshold { *left } else { *right };
                }
            }
        }
    }
}

struct TreeBuilder<'a> {
    features: &'a [Vec<f64>],
    targets: &'a [f64],
    config: &'a ForestConfig,
    nodes: Vec<Node>,
}

impl<'a> TreeBuilder<'a> {
    fn build(mut self, sample: Vec<usize>) -> RegressionTree {
        self.grow(&sample, 0);
        RegressionTree { nodes: self.nodes }
    }

    fn grow(&mut self, sample: &[usize], depth: usize) -> usize {
        let node_index = self.nodes.len();
        let mean = sample.iter().map(|&i| self.targets[i]).sum::<f64>() / sample.len() as f64;
        self.nodes.push(Node::Leaf { value: mean });

        let depth_reached = self.config.max_depth.is_some_and(|max| depth >= max);
        if depth_reached || sample.len() < self.config.min_samples_split.max(2) {
            return node_index;
        }

        let Some((feature, threshold)) = self.best_split(sample) else {
            return node_index;
        };

        let (left, right): (Vec<usize>, Vec<usize>) = sample
            .iter()
            .partition(|&&i| self.features[i][feature] <= threshold);

        let left_index = self.grow(&left, depth + 1);
        let right_index = self.grow(&right, depth + 1);
        self.nodes[node_index] = Node::Split {
            feature,
            threshold,
            left: left_index,
            right: right_index,
        };
        node_index
    }

    /// Split maximizing `sum_l^2 / n_l + sum_r^2 / n_r`, which is the same as
    /// minimizing the children's summed squared error.
    fn best_split(&self, sample: &[usize]) -> Option<(usize, f64)> {
        let n_features = self.features[sample[0]].len();
        let total: f64 = sample.iter().map(|&i| self.targets[i]).sum();
        let n = sample.len() as f64;
        let parent_score = total * total / n;

        let mut best: Option<(f64, usize, f64)> = None;
        let mut order = sample.to_vec();

        for feature in 0..n_features {
            order.sort_by(|&a, &b| self.features[a][feature].total_cmp(&self.features[b][feature]));

            let mut left_sum = 0.0;
            for k in 1..order.len() {
                left_sum += self.targets[order[k - 1]];
                let lo = self.features[order[k - 1]][feature];
                let hi = self.features[order[k]][feature];
                if lo >= hi {
                    continue;
                }
                let left_n = k as f64;
                let right_sum = total - left_sum;
                let score = left_sum * left_sum / left_n + right_sum * right_sum / (n - left_n);
                if score <= parent_score + 1e-12 * parent_score.abs().max(1.0) {
                    continue;
                }
                if best.is_none_or(|(best_score, _, _)| score > best_score) {
                    best = Some((score, feature, (lo + hi) / 2.0));
                }
            }
        }

        best.map(|(_, feature, threshold)| (feature, threshold))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RandomForest {
    trees: Vec<RegressionTree>,
}

impl RandomForest {
    /// Fit on `features` (one row per sample) against `targets`.
    ///
    /// Trees are fitted in parallel but each draws its bootstrap sample from
    /// its own seeded RNG, so the fitted forest is reproducible.
    /// Callers must pass at least one row, with `features.len() == targets.len()`.
    pub fn fit(features: &[Vec<f64>], targets: &[f64], config: &ForestConfig) -> Self {
        debug_assert!(!features.is_empty());
        debug_assert_eq!(features.len(), targets.len());

        let n = features.len();
        let trees = (0..config.n_trees.max(1))
            .into_par_iter()
            .map(|tree| {
                let mut rng = StdRng::seed_from_u64(config.seed.wrapping_add(tree as u64));
                let sample = (0..n).map(|_| rng.gen_range(0..n)).collect();
                TreeBuilder {
                    features,
                    targets,
                    config,
                    nodes: Vec::new(),
                }
                .build(sample)
            })
            .collect();

        Self { trees }
    }

    /// Mean of the per-tree predictions.
    pub fn predict(&self, row: &[f64]) -> f64 {
        let sum: f64 = self.trees.iter().map(|tree| tree.predict(row)).sum();
        sum / self.trees.len() as f64
    }

    pub fn n_trees(&self) -> usize {
        self.trees.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn step_data() -> (Vec<Vec<f64>>, Vec<f64>) {
        let features = (0..40).map(|i| vec![i as f64, 1.0]).collect::<Vec<_>>();
        let targets = (0..40).map(|i| if i < 20 { 5.0 } else { 50.0 }).collect();
        (features, targets)
    }

    #[test]
    fn single_tree_learns_step() {
        let (features, targets) = step_data();
        let config = ForestConfig {
            n_trees: 1,
            ..ForestConfig::default()
        };
        let forest = RandomForest::fit(&features, &targets, &config);
        assert_relative_eq!(forest.predict(&[2.0, 1.0]), 5.0);
        assert_relative_eq!(forest.predict(&[35.0, 1.0]), 50.0);
    }

    #[test]
    fn constant_targets_give_constant_prediction() {
        let features = vec![vec![1.0], vec![2.0], vec![3.0]];
        let targets = vec![7.5, 7.5, 7.5];
        let forest = RandomForest::fit(&features, &targets, &ForestConfig::default());
        assert_relative_eq!(forest.predict(&[100.0]), 7.5);
    }

    #[test]
    fn same_seed_same_forest() {
        let (features, targets) = step_data();
        let config = ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        };
        let a = RandomForest::fit(&features, &targets, &config);
        let b = RandomForest::fit(&features, &targets, &config);
        assert_eq!(a, b);
        assert_eq!(a.n_trees(), 10);
    }

    #[test]
    fn depth_zero_is_global_mean() {
        let (features, targets) = step_data();
        let config = ForestConfig {
            n_trees: 1,
            max_depth: Some(0),
            ..ForestConfig::default()
        };
        let forest = RandomForest::fit(&features, &targets, &config);
        let prediction = forest.predict(&[0.0, 1.0]);
        assert!(prediction > 5.0 && prediction < 50.0);
    }
}
