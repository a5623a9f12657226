//! Provides Gradient Boosting Machine ([`GBM`]) by Friedman, 2001.
use colored::Colorize;
use fixedbitset::FixedBitSet;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use std::ops::ControlFlow;
use std::time::Instant;

use crate::common::{checker, ordered_elements, mask_from_indices};
use crate::common::utils::masked_values;
use crate::error::{Result, TreeError};
use crate::F64Matrix;
use super::{
    GradientBoostLoss,
    GBMDecisionTreeLearner,
    GBMTree,
    GradientBoostModel,
};


/// The number of boosting iterations set as default.
pub const DEFAULT_ITERATIONS: usize = 100;
/// The learning rate set as default.
pub const DEFAULT_LEARNING_RATE: f64 = 0.1;
/// The row subsampling ratio set as default.
pub const DEFAULT_SUBSAMPLE_RATIO: f64 = 1.0;
/// The seed of the row subsampling set as default.
pub const DEFAULT_SEED: u64 = 42;


const WIDTH: usize = 12;
const PREC_WIDTH: usize = 6;


/// The Gradient Boosting Machine proposed in the following paper:
///
/// [Jerome H. Friedman, 2001 - Greedy Function Approximation: A Gradient Boosting Machine](https://projecteuclid.org/journals/annals-of-statistics/volume-29/issue-5/Greedy-function-approximation-A-gradient-boostingmachine/10.1214/aos/1013203451.full)
///
/// Starting from the constant `initial_loss`,
/// each iteration computes the negative gradient of the loss
/// at the current predictions,
/// fits a [`GBMTree`] to it with [`GBMDecisionTreeLearner`],
/// and adds the tree scaled by `learning_rate` to the ensemble.
/// The feature columns are sorted once per run
/// and shared by every tree.
///
/// # Example
/// ```
/// use treeboosts::prelude::*;
///
/// let observations = F64Matrix::from_rows(&[
///     [1.0], [2.0], [3.0], [4.0], [5.0], [6.0],
/// ]).unwrap();
/// let targets = [1.0, 1.0, 1.0, 5.0, 5.0, 5.0];
///
/// let learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
///     .max_depth(2)
///     .build()
///     .unwrap();
///
/// let mut booster = GBM::init(learner)
///     .iterations(50)
///     .learning_rate(0.3);
///
/// let model = booster.run(&observations, &targets).unwrap();
/// let prediction = model.predict(&[5.5]);
/// assert!((prediction - 5.0).abs() < 1e-3);
/// ```
#[derive(Clone, Debug)]
pub struct GBM<L> {
    learner: GBMDecisionTreeLearner<L>,
    iterations: usize,
    learning_rate: f64,
    subsample_ratio: f64,
    seed: u64,
    verbose: bool,
}


/// The state of one boosting run.
struct Training<'a> {
    observations: &'a F64Matrix,
    targets: &'a [f64],
    ordered: Vec<Vec<usize>>,

    // Rows the run trains on.
    in_sample: FixedBitSet,
    work_indices: Vec<usize>,

    initial_loss: f64,
    predictions: Vec<f64>,
    residuals: Vec<f64>,
    trees: Vec<GBMTree>,
    rng: StdRng,
}


impl<L> GBM<L> {
    /// Initialize the `GBM` with the tree learner it boosts.
    /// The loss is the one of `learner`.
    pub fn init(learner: GBMDecisionTreeLearner<L>) -> Self {
        Self {
            learner,
            iterations: DEFAULT_ITERATIONS,
            learning_rate: DEFAULT_LEARNING_RATE,
            subsample_ratio: DEFAULT_SUBSAMPLE_RATIO,
            seed: DEFAULT_SEED,
            verbose: false,
        }
    }


    /// Set the number of boosting iterations.
    /// Default is `100`.
    pub fn iterations(mut self, iterations: usize) -> Self {
        self.iterations = iterations;
        self
    }


    /// Set the shrinkage applied to every tree.
    /// Default is `0.1`.
    pub fn learning_rate(mut self, learning_rate: f64) -> Self {
        self.learning_rate = learning_rate;
        self
    }


    /// Set the fraction of the rows each tree is fitted on.
    /// Must be in `(0, 1]`. Default is `1.0`.
    pub fn subsample_ratio(mut self, ratio: f64) -> Self {
        self.subsample_ratio = ratio;
        self
    }


    /// Set the seed of the row subsampling.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }


    /// Print the training loss of every iteration.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Returns the tree learner.
    pub fn learner(&self) -> &GBMDecisionTreeLearner<L> {
        &self.learner
    }
}


impl<L> GBM<L>
    where L: GradientBoostLoss + Sync,
{
    /// Returns the name of this booster.
    pub fn name(&self) -> &str {
        "Gradient Boosting Machine"
    }


    /// Returns the parameters of this booster.
    pub fn info(&self) -> Vec<(&str, String)> {
        Vec::from([
            ("Loss", self.learner.loss().name().to_string()),
            ("Iterations", format!("{}", self.iterations)),
            ("Learning rate", format!("{}", self.learning_rate)),
            ("Subsample ratio", format!("{}", self.subsample_ratio)),
            ("Max depth", format!("{}", self.learner.max_depth())),
        ])
    }


    /// Run `GBM` on every row of `observations`.
    pub fn run(&mut self, observations: &F64Matrix, targets: &[f64])
        -> Result<GradientBoostModel>
    {
        let indices = (0..targets.len()).collect::<Vec<_>>();
        self.run_indexed(observations, targets, &indices)
    }


    /// Run `GBM` on the rows of `observations` listed in `indices`.
    pub fn run_indexed(
        &mut self,
        observations: &F64Matrix,
        targets: &[f64],
        indices: &[usize],
    ) -> Result<GradientBoostModel>
    {
        let mut state = self.preprocess(observations, targets, indices)?;

        let mut time_acc = 0;
        for iteration in 1..=self.iterations {
            let now = Instant::now();
            self.boost(&mut state)?;
            time_acc += now.elapsed().as_millis();

            self.print_log(&state, iteration, time_acc);
        }

        Ok(self.postprocess(state, None))
    }


    /// Run `GBM` on `train_observations`,
    /// checking the `metric` on the validation set
    /// every `early_stopping_rounds` iterations.
    ///
    /// Boosting stops at the first check
    /// whose validation error is not lower than the best one seen.
    /// The returned model keeps the trees
    /// up to the check with the lowest validation error.
    ///
    /// `metric(targets, predictions)` returns an error; lower is better.
    pub fn run_with_early_stopping<M>(
        &mut self,
        train_observations: &F64Matrix,
        train_targets: &[f64],
        validation_observations: &F64Matrix,
        validation_targets: &[f64],
        metric: M,
        early_stopping_rounds: usize,
    ) -> Result<GradientBoostModel>
        where M: Fn(&[f64], &[f64]) -> f64,
    {
        if early_stopping_rounds == 0
            || early_stopping_rounds >= self.iterations
        {
            return Err(TreeError::InvalidEarlyStoppingRounds {
                rounds: early_stopping_rounds,
                iterations: self.iterations,
            });
        }
        checker::observations_and_targets(
            validation_observations, validation_targets
        )?;
        checker::length(
            "validation features",
            train_observations.column_count(),
            validation_observations.column_count(),
        )?;

        let indices = (0..train_targets.len()).collect::<Vec<_>>();
        let mut state = self.preprocess(
            train_observations, train_targets, &indices
        )?;

        let mut validation_predictions = vec![
            state.initial_loss; validation_observations.row_count()
        ];
        let mut best_error = f64::INFINITY;
        let mut best_count = 0;

        let mut time_acc = 0;
        let flow = (1..=self.iterations).try_for_each(|iteration| {
            let now = Instant::now();
            if let Err(e) = self.boost(&mut state) {
                return ControlFlow::Break(Err(e));
            }
            time_acc += now.elapsed().as_millis();
            self.print_log(&state, iteration, time_acc);

            // `boost` has just pushed a tree.
            let Some(tree) = state.trees.last() else {
                return ControlFlow::Continue(());
            };
            let lr = self.learning_rate;
            validation_predictions.iter_mut()
                .zip(tree.predict_all(validation_observations))
                .for_each(|(p, q)| { *p += lr * q; });

            if iteration % early_stopping_rounds != 0 {
                return ControlFlow::Continue(());
            }

            let error = metric(validation_targets, &validation_predictions);
            log::debug!("iteration {iteration}: validation error {error}");
            if error < best_error {
                best_error = error;
                best_count = iteration;
                ControlFlow::Continue(())
            } else {
                ControlFlow::Break(Ok(iteration))
            }
        });

        match flow {
            ControlFlow::Break(Err(e)) => { return Err(e); },
            ControlFlow::Break(Ok(iteration)) => {
                log::debug!(
                    "early stopping at iteration {iteration}, \
                    keeping {best_count} trees"
                );
            },
            ControlFlow::Continue(()) => {},
        }

        Ok(self.postprocess(state, Some(best_count)))
    }


    fn preprocess<'a>(
        &self,
        observations: &'a F64Matrix,
        targets: &'a [f64],
        indices: &[usize],
    ) -> Result<Training<'a>>
    {
        checker::boosting(
            self.iterations, self.learning_rate, self.subsample_ratio
        )?;
        checker::observations_and_targets(observations, targets)?;

        let n_sample = observations.row_count();
        checker::indices(indices, n_sample)?;

        let in_sample = mask_from_indices(indices, n_sample);
        let ordered = ordered_elements(observations);

        let initial_loss = self.learner.loss().initial_loss(targets, &in_sample);

        if self.verbose {
            print_stats(
                self.name(), self.info(), n_sample, observations.column_count()
            );
            print_log_header();
        }

        Ok(Training {
            observations,
            targets,
            ordered,
            in_sample,
            work_indices: indices.to_vec(),
            initial_loss,
            predictions: vec![initial_loss; n_sample],
            residuals: vec![0f64; n_sample],
            trees: Vec::with_capacity(self.iterations),
            rng: StdRng::seed_from_u64(self.seed),
        })
    }


    fn boost(&mut self, state: &mut Training<'_>) -> Result<()> {
        self.learner.loss_mut().update_residuals(
            state.targets,
            &state.predictions,
            &mut state.residuals,
            &state.in_sample,
        );

        let subsample;
        let in_sample = if self.subsample_ratio < 1f64 {
            let n_sample = state.observations.row_count();
            let size = (self.subsample_ratio * state.work_indices.len() as f64)
                .round() as usize;
            let size = size.max(1);

            state.work_indices.shuffle(&mut state.rng);
            subsample = mask_from_indices(&state.work_indices[..size], n_sample);
            &subsample
        } else {
            &state.in_sample
        };

        let tree = self.learner.learn(
            state.observations,
            state.targets,
            &state.residuals,
            &state.predictions,
            &state.ordered,
            in_sample,
        )?;

        let lr = self.learning_rate;
        state.predictions.iter_mut()
            .zip(tree.predict_all(state.observations))
            .for_each(|(p, q)| { *p += lr * q; });

        state.trees.push(tree);
        Ok(())
    }


    fn postprocess(&self, state: Training<'_>, keep: Option<usize>)
        -> GradientBoostModel
    {
        let mut trees = state.trees;
        if let Some(keep) = keep {
            trees.truncate(keep);
        }
        GradientBoostModel::new(
            trees,
            self.learning_rate,
            state.initial_loss,
            state.observations.column_count(),
        )
    }


    fn print_log(&self, state: &Training<'_>, iteration: usize, time_acc: u128) {
        if !self.verbose { return; }

        let targets = masked_values(&state.in_sample, |i| state.targets[i]);
        let predictions = masked_values(
            &state.in_sample, |i| state.predictions[i]
        );
        let loss = self.learner.loss().loss(&targets, &predictions);
        print_log_row(iteration, loss, time_acc);
    }
}


/// Print the booster's name, the data shape and its parameters.
pub(super) fn print_stats(
    name: &str,
    parameters: Vec<(&str, String)>,
    n_sample: usize,
    n_feature: usize,
)
{
    println!(
        "\n{:=>40}\n+ {:<18}{:>20}",
        "",
        "Booster".bold(),
        name.bold().green(),
    );
    let mut info = vec![
        ("# of examples", format!("{n_sample}")),
        ("# of features", format!("{n_feature}")),
    ];
    info.extend(parameters);
    for (key, val) in info {
        println!("    + {:<16}{:>18}", key, val.bold().yellow());
    }
    println!("{:=>40}\n", "");
}


pub(super) fn print_log_header() {
    println!(
        "{:>WIDTH$}\t{:>WIDTH$}\t{:>WIDTH$}",
        "ROUND".bold().red(),
        "TRAIN LOSS".bold().green(),
        "TIME".bold().cyan(),
    );
}


pub(super) fn print_log_row(iteration: usize, loss: f64, time_acc: u128) {
    println!(
        "{}\t{}\t{}",
        format!("{:>WIDTH$}", iteration).bold().red(),
        format!("{:>WIDTH$.PREC_WIDTH$}", loss).bold().green(),
        format!("{:>WIDTH$}ms", time_acc).bold().cyan(),
    );
}
