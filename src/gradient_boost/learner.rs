//! Defines [`GBMDecisionTreeLearner`],
//! the regression tree learner of the gradient boosting machine.
use fixedbitset::FixedBitSet;
use rand::{rngs::StdRng, seq::SliceRandom};

use std::collections::VecDeque;
use std::sync::Mutex;

use crate::common::checker;
use crate::error::Result;
use crate::F64Matrix;
use super::{
    GradientBoostLoss,
    GBMNode,
    GBMTree,
    GBMSplit,
    GBMSplitInfo,
    GBMSplitResult,
    GBMTreeCreationItem,
    Side,
};


/// Fits a regression tree to the residuals of a boosting iteration.
///
/// The learner never re-sorts the data.
/// It receives, for every feature, the row indices presorted by value
/// (see [`ordered_elements`](crate::common::ordered_elements))
/// and a mask of the rows in the current sample.
/// Each node of the tree is a mask over the same presorted order,
/// so a split only partitions the parent mask.
///
/// Nodes are expanded breadth-first.
/// For every node, each searched feature is swept once in sorted order
/// while the loss keeps the left/right split statistics up to date.
/// With `run_parallel`, the features of a node are searched
/// on the rayon thread pool.
///
/// Construct it with
/// [`GBMDecisionTreeLearnerBuilder`](super::GBMDecisionTreeLearnerBuilder).
#[derive(Clone, Debug)]
pub struct GBMDecisionTreeLearner<L> {
    pub(super) loss: L,
    pub(super) max_depth: usize,
    pub(super) min_split_size: usize,
    pub(super) min_information_gain: f64,
    pub(super) features_pr_split: usize,
    pub(super) run_parallel: bool,
    pub(super) rng: StdRng,
}


impl<L> GBMDecisionTreeLearner<L> {
    /// Returns the loss this learner fits.
    #[inline]
    pub fn loss(&self) -> &L {
        &self.loss
    }


    /// Returns the loss this learner fits, mutably.
    /// Losses keep state between residual updates.
    #[inline]
    pub fn loss_mut(&mut self) -> &mut L {
        &mut self.loss
    }


    /// Returns the maximal tree depth.
    #[inline]
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }


    /// Returns the minimum number of rows on each side of a split.
    #[inline]
    pub fn min_split_size(&self) -> usize {
        self.min_split_size
    }


    /// Returns the minimum cost improvement of an expanded node.
    #[inline]
    pub fn min_information_gain(&self) -> f64 {
        self.min_information_gain
    }


    /// Returns the number of features searched per node.
    /// `0` means all features.
    #[inline]
    pub fn features_pr_split(&self) -> usize {
        self.features_pr_split
    }


    /// Returns `true` if the features of a node are searched in parallel.
    #[inline]
    pub fn run_parallel(&self) -> bool {
        self.run_parallel
    }
}


impl<L> GBMDecisionTreeLearner<L>
    where L: GradientBoostLoss + Sync,
{
    /// Fit a tree to `residuals` over the rows in `in_sample`.
    ///
    /// - `observations` has one row per example.
    /// - `targets`, `residuals` and `predictions` have one entry per row.
    /// - `ordered_elements[j]` lists every row index
    ///   in ascending order of feature `j`.
    pub fn learn(
        &mut self,
        observations: &F64Matrix,
        targets: &[f64],
        residuals: &[f64],
        predictions: &[f64],
        ordered_elements: &[Vec<usize>],
        in_sample: &FixedBitSet,
    ) -> Result<GBMTree>
    {
        let (n_sample, n_feature) = observations.shape();
        checker::observations_and_targets(observations, targets)?;
        checker::length("residuals", n_sample, residuals.len())?;
        checker::length("predictions", n_sample, predictions.len())?;
        checker::length("ordered elements", n_feature, ordered_elements.len())?;
        for order in ordered_elements {
            checker::length("ordered elements", n_sample, order.len())?;
        }
        checker::mask(in_sample, n_sample)?;
        checker::features_to_use(self.features_pr_split, n_feature)?;

        let features_pr_split = if self.features_pr_split == 0 {
            n_feature
        } else {
            self.features_pr_split
        };


        let root_values = self.loss.init_split(targets, residuals, in_sample);
        let mut best_constant = root_values.best_constant;
        if self.loss.update_leaf_values() {
            best_constant = self.loss.updated_leaf_value(
                best_constant, targets, predictions, in_sample
            );
        }

        let root = GBMNode::root(
            best_constant, root_values.cost, root_values.samples
        );
        let mut nodes = vec![root];

        let mut queue = VecDeque::new();
        queue.push_back(GBMTreeCreationItem {
            values: root_values,
            in_sample: in_sample.clone(),
            depth: 1,
            parent: None,
        });


        let search = SplitSearch {
            observations,
            targets,
            residuals,
            ordered_elements,
            loss: &self.loss,
            min_split_size: self.min_split_size,
        };
        let mut all_features = (0..n_feature).collect::<Vec<_>>();

        while let Some(item) = queue.pop_front() {
            if features_pr_split != n_feature {
                all_features.shuffle(&mut self.rng);
            }
            let features = &all_features[..features_pr_split];

            let results = if self.run_parallel {
                search.parallel(&item, features)
            } else {
                search.sequential(&item, features)
            };

            let Some(best) = select_best(results) else {
                log::trace!(
                    "no split for a node at depth {} with {} rows",
                    item.depth, item.values.samples,
                );
                continue;
            };

            let split = best.best_split;
            let mut node = split.to_node();
            let node_index = nodes.len();

            if let Some((parent, side)) = item.parent {
                match side {
                    Side::Left => { nodes[parent].left_index = Some(node_index); },
                    Side::Right => { nodes[parent].right_index = Some(node_index); },
                }
            }

            let is_leaf = item.depth >= self.max_depth
                || split.cost_improvement < self.min_information_gain;

            let update_leaf_values = self.loss.update_leaf_values();
            if is_leaf && !update_leaf_values {
                log::debug!(
                    "leaf node {node_index}: feature {} < {}, depth {}",
                    split.feature_index, split.threshold, split.depth,
                );
                nodes.push(node);
                continue;
            }

            let (left_in_sample, right_in_sample) = partition(
                &item.in_sample,
                &ordered_elements[split.feature_index],
                split.split_index,
            );

            if update_leaf_values {
                node.left_constant = self.loss.updated_leaf_value(
                    node.left_constant, targets, predictions, &left_in_sample
                );
                node.right_constant = self.loss.updated_leaf_value(
                    node.right_constant, targets, predictions, &right_in_sample
                );
            }
            nodes.push(node);

            if is_leaf {
                log::debug!(
                    "leaf node {node_index}: feature {} < {}, depth {}",
                    split.feature_index, split.threshold, split.depth,
                );
                continue;
            }

            log::debug!(
                "split node {node_index}: feature {} < {}, depth {}, \
                improvement {}",
                split.feature_index, split.threshold, split.depth,
                split.cost_improvement,
            );

            let depth = item.depth + 1;
            queue.push_back(GBMTreeCreationItem {
                values: best.left,
                in_sample: left_in_sample,
                depth,
                parent: Some((node_index, Side::Left)),
            });
            queue.push_back(GBMTreeCreationItem {
                values: best.right,
                in_sample: right_in_sample,
                depth,
                parent: Some((node_index, Side::Right)),
            });
        }

        GBMTree::new(nodes)
    }
}


/// The read-only inputs of a split search.
/// Shared by every worker searching the features of a node.
struct SplitSearch<'a, L> {
    observations: &'a F64Matrix,
    targets: &'a [f64],
    residuals: &'a [f64],
    ordered_elements: &'a [Vec<usize>],
    loss: &'a L,
    min_split_size: usize,
}


impl<L> SplitSearch<'_, L>
    where L: GradientBoostLoss + Sync,
{
    fn sequential(&self, item: &GBMTreeCreationItem, features: &[usize])
        -> Vec<GBMSplitResult>
    {
        features.iter()
            .filter_map(|&feature| self.best_split(item, feature))
            .collect()
    }


    /// Search `features` with one worker per rayon thread.
    /// Workers pull feature indices from a shared queue
    /// and push their results to a shared vector.
    fn parallel(&self, item: &GBMTreeCreationItem, features: &[usize])
        -> Vec<GBMSplitResult>
    {
        let work = Mutex::new(features.iter().copied().collect::<VecDeque<_>>());
        let results = Mutex::new(Vec::with_capacity(features.len()));

        let n_worker = rayon::current_num_threads()
            .min(features.len())
            .max(1);

        rayon::scope(|s| {
            for _ in 0..n_worker {
                s.spawn(|_| {
                    loop {
                        let next = work.lock()
                            .unwrap_or_else(|e| e.into_inner())
                            .pop_front();
                        let Some(feature) = next else { break; };

                        if let Some(result) = self.best_split(item, feature) {
                            results.lock()
                                .unwrap_or_else(|e| e.into_inner())
                                .push(result);
                        }
                    }
                });
            }
        });

        results.into_inner()
            .unwrap_or_else(|e| e.into_inner())
    }


    /// Returns the lowest-cost split of `feature` for the node `item`,
    /// or `None` if the feature cannot split it.
    ///
    /// Two rows with the same feature value always go to the same side,
    /// and both sides must hold at least `min_split_size` rows.
    fn best_split(&self, item: &GBMTreeCreationItem, feature: usize)
        -> Option<GBMSplitResult>
    {
        let order = &self.ordered_elements[feature];
        let mut positions = order.iter()
            .copied()
            .enumerate()
            .filter(|&(_, row)| item.in_sample.contains(row));

        let mut left = GBMSplitInfo::new();
        let mut right = item.values;

        let (_, row) = positions.next()?;
        self.loss.update_split_constants(
            &mut left, &mut right, self.targets[row], self.residuals[row]
        );
        let mut previous = self.observations.at(row, feature);

        let mut best: Option<GBMSplitResult> = None;
        while right.samples > 0 {
            let Some((j, row)) = positions.next() else { break; };
            let current = self.observations.at(row, feature);

            if left.samples.min(right.samples) >= self.min_split_size
                && previous != current
            {
                let cost = left.cost + right.cost;
                let improves = best.map_or(true, |b| cost < b.best_split.cost);
                if improves {
                    let best_split = GBMSplit {
                        depth: item.depth,
                        feature_index: feature,
                        split_index: j,
                        threshold: (previous + current) * 0.5,
                        left_error: left.cost,
                        right_error: right.cost,
                        cost,
                        cost_improvement: item.values.cost - cost,
                        left_constant: left.best_constant,
                        right_constant: right.best_constant,
                        sample_count: item.values.samples,
                    };
                    best = Some(GBMSplitResult { best_split, left, right });
                }
            }

            self.loss.update_split_constants(
                &mut left, &mut right, self.targets[row], self.residuals[row]
            );
            previous = current;
        }

        if let Some(b) = &best {
            log::trace!(
                "feature {feature}: best threshold {} with cost {}",
                b.best_split.threshold, b.best_split.cost,
            );
        }
        best
    }
}


/// Pick the lowest-cost split.
/// Equal costs go to the lowest feature index,
/// so the result does not depend on the order workers finish in.
fn select_best(mut results: Vec<GBMSplitResult>) -> Option<GBMSplitResult> {
    results.sort_by(|a, b| {
        a.best_split.cost.total_cmp(&b.best_split.cost)
            .then(a.best_split.feature_index.cmp(&b.best_split.feature_index))
    });
    results.into_iter().next()
}


/// Split the rows of `in_sample` at position `split_index`
/// of the presorted `order`.
fn partition(in_sample: &FixedBitSet, order: &[usize], split_index: usize)
    -> (FixedBitSet, FixedBitSet)
{
    let n_sample = in_sample.len();
    let mut left = FixedBitSet::with_capacity(n_sample);
    let mut right = FixedBitSet::with_capacity(n_sample);

    for (i, &row) in order.iter().enumerate() {
        if !in_sample.contains(row) { continue; }
        if i < split_index {
            left.insert(row);
        } else {
            right.insert(row);
        }
    }
    (left, right)
}
