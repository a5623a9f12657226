//! Provides [`GBMClassifier`], gradient boosting for class labels.
use fixedbitset::FixedBitSet;
use rand::{SeedableRng, rngs::StdRng, seq::SliceRandom};

use std::time::Instant;

use crate::common::{checker, ordered_elements, mask_from_indices};
use crate::common::utils::masked_values;
use crate::error::{Result, TreeError};
use crate::F64Matrix;
use super::gbm::{
    DEFAULT_ITERATIONS,
    DEFAULT_LEARNING_RATE,
    DEFAULT_SUBSAMPLE_RATIO,
    DEFAULT_SEED,
    print_stats,
    print_log_header,
    print_log_row,
};
use super::model::scored_classes;
use super::{
    BinomialLoss,
    ClassificationGradientBoostModel,
    GradientBoostLoss,
    GBMDecisionTreeLearner,
    GBMTree,
};


/// Gradient boosting for classification with the [`BinomialLoss`].
///
/// The distinct targets of the training rows are the class labels.
/// Each class gets its own `0`/`1` indicator targets
/// and its own sequence of [`GBMTree`]s in log-odds,
/// and every iteration fits one tree per class.
/// With two labels only the first one is scored.
///
/// # Example
/// ```
/// use treeboosts::prelude::*;
///
/// let observations = F64Matrix::from_rows(&[
///     [1.0], [2.0], [3.0], [4.0], [5.0], [6.0],
/// ]).unwrap();
/// let targets = [0.0, 0.0, 0.0, 1.0, 1.0, 1.0];
///
/// let learner = GBMDecisionTreeLearnerBuilder::new(BinomialLoss::new())
///     .max_depth(2)
///     .build()
///     .unwrap();
///
/// let model = GBMClassifier::init(learner)
///     .iterations(20)
///     .run(&observations, &targets)
///     .unwrap();
///
/// assert_eq!(1.0, model.predict(&[5.5]));
/// let p = model.predict_probability(&[1.5]);
/// assert!(p.probability(0.0).unwrap() > 0.5);
/// ```
#[derive(Clone, Debug)]
pub struct GBMClassifier {
    learner: GBMDecisionTreeLearner<BinomialLoss>,
    iterations: usize,
    learning_rate: f64,
    subsample_ratio: f64,
    seed: u64,
    verbose: bool,
}


/// The boosting state of one scored class.
struct ClassState {
    targets: Vec<f64>,
    initial_loss: f64,
    predictions: Vec<f64>,
    residuals: Vec<f64>,
    trees: Vec<GBMTree>,
}


/// The state of one boosting run.
struct Training<'a> {
    observations: &'a F64Matrix,
    ordered: Vec<Vec<usize>>,
    target_names: Vec<f64>,

    in_sample: FixedBitSet,
    work_indices: Vec<usize>,

    classes: Vec<ClassState>,
    rng: StdRng,
}


impl GBMClassifier {
    /// Initialize the `GBMClassifier` with the tree learner it boosts.
    pub fn init(learner: GBMDecisionTreeLearner<BinomialLoss>) -> Self {
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


    /// Print the mean training loss over the classes
    /// at every iteration.
    pub fn verbose(mut self, verbose: bool) -> Self {
        self.verbose = verbose;
        self
    }


    /// Returns the tree learner.
    pub fn learner(&self) -> &GBMDecisionTreeLearner<BinomialLoss> {
        &self.learner
    }


    /// Returns the name of this booster.
    pub fn name(&self) -> &str {
        "Gradient Boosting Classifier"
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


    /// Run `GBMClassifier` on every row of `observations`.
    pub fn run(&mut self, observations: &F64Matrix, targets: &[f64])
        -> Result<ClassificationGradientBoostModel>
    {
        let indices = (0..targets.len()).collect::<Vec<_>>();
        self.run_indexed(observations, targets, &indices)
    }


    /// Run `GBMClassifier` on the rows of `observations`
    /// listed in `indices`.
    /// Only labels occurring in those rows become classes.
    pub fn run_indexed(
        &mut self,
        observations: &F64Matrix,
        targets: &[f64],
        indices: &[usize],
    ) -> Result<ClassificationGradientBoostModel>
    {
        let mut state = self.preprocess(observations, targets, indices)?;

        let mut time_acc = 0;
        for iteration in 1..=self.iterations {
            let now = Instant::now();
            self.boost(&mut state)?;
            time_acc += now.elapsed().as_millis();

            self.print_log(&state, iteration, time_acc);
        }

        let mut trees = Vec::with_capacity(state.classes.len());
        let mut initial_losses = Vec::with_capacity(state.classes.len());
        for class in state.classes {
            trees.push(class.trees);
            initial_losses.push(class.initial_loss);
        }
        ClassificationGradientBoostModel::new(
            trees,
            initial_losses,
            self.learning_rate,
            state.target_names,
            observations.column_count(),
        )
    }


    fn preprocess<'a>(
        &self,
        observations: &'a F64Matrix,
        targets: &[f64],
        indices: &[usize],
    ) -> Result<Training<'a>>
    {
        checker::boosting(
            self.iterations, self.learning_rate, self.subsample_ratio
        )?;
        checker::observations_and_targets(observations, targets)?;

        let n_sample = observations.row_count();
        checker::indices(indices, n_sample)?;

        let mut target_names = indices.iter()
            .map(|&i| targets[i])
            .collect::<Vec<_>>();
        target_names.sort_by(|a, b| a.total_cmp(b));
        target_names.dedup();
        if target_names.len() < 2 {
            return Err(TreeError::TooFewClasses(target_names.len()));
        }

        let in_sample = mask_from_indices(indices, n_sample);
        let ordered = ordered_elements(observations);

        let n_scored = scored_classes(target_names.len());
        let classes = target_names[..n_scored].iter()
            .map(|&name| {
                let targets = targets.iter()
                    .map(|&y| if y == name { 1f64 } else { 0f64 })
                    .collect::<Vec<_>>();
                let initial_loss = self.learner.loss()
                    .initial_loss(&targets, &in_sample);
                log::debug!("class {name}: initial log-odds {initial_loss}");

                ClassState {
                    targets,
                    initial_loss,
                    predictions: vec![initial_loss; n_sample],
                    residuals: vec![0f64; n_sample],
                    trees: Vec::with_capacity(self.iterations),
                }
            })
            .collect::<Vec<_>>();

        if self.verbose {
            print_stats(
                self.name(), self.info(), n_sample, observations.column_count()
            );
            print_log_header();
        }

        Ok(Training {
            observations,
            ordered,
            target_names,
            in_sample,
            work_indices: indices.to_vec(),
            classes,
            rng: StdRng::seed_from_u64(self.seed),
        })
    }


    fn boost(&mut self, state: &mut Training<'_>) -> Result<()> {
        let n_sample = state.observations.row_count();
        let lr = self.learning_rate;

        for class in state.classes.iter_mut() {
            self.learner.loss_mut().update_residuals(
                &class.targets,
                &class.predictions,
                &mut class.residuals,
                &state.in_sample,
            );

            let subsample;
            let in_sample = if self.subsample_ratio < 1f64 {
                let size = (self.subsample_ratio * state.work_indices.len() as f64)
                    .round() as usize;
                let size = size.max(1);

                state.work_indices.shuffle(&mut state.rng);
                subsample = mask_from_indices(
                    &state.work_indices[..size], n_sample
                );
                &subsample
            } else {
                &state.in_sample
            };

            let tree = self.learner.learn(
                state.observations,
                &class.targets,
                &class.residuals,
                &class.predictions,
                &state.ordered,
                in_sample,
            )?;

            class.predictions.iter_mut()
                .zip(tree.predict_all(state.observations))
                .for_each(|(p, q)| { *p += lr * q; });

            class.trees.push(tree);
        }
        Ok(())
    }


    fn print_log(&self, state: &Training<'_>, iteration: usize, time_acc: u128) {
        if !self.verbose { return; }

        let loss = state.classes.iter()
            .map(|class| {
                let targets = masked_values(
                    &state.in_sample, |i| class.targets[i]
                );
                let predictions = masked_values(
                    &state.in_sample, |i| class.predictions[i]
                );
                self.learner.loss().loss(&targets, &predictions)
            })
            .sum::<f64>()
            / state.classes.len() as f64;
        print_log_row(iteration, loss, time_acc);
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::gradient_boost::GBMDecisionTreeLearnerBuilder;

    fn learner() -> GBMDecisionTreeLearner<BinomialLoss> {
        GBMDecisionTreeLearnerBuilder::new(BinomialLoss::new())
            .max_depth(3)
            .run_parallel(false)
            .build()
            .unwrap()
    }

    /// Rows `0..20` with one feature, labelled `label(i)`.
    fn data<F>(label: F) -> (F64Matrix, Vec<f64>)
        where F: Fn(usize) -> f64,
    {
        let rows = (0..20).map(|i| [i as f64]).collect::<Vec<_>>();
        let targets = (0..20).map(label).collect::<Vec<_>>();
        (F64Matrix::from_rows(&rows).unwrap(), targets)
    }

    #[test]
    fn test_run_01() {
        let (observations, targets) = data(|i| if i < 8 { 4.0 } else { 9.0 });
        let model = GBMClassifier::init(learner())
            .iterations(30)
            .learning_rate(0.3)
            .run(&observations, &targets)
            .unwrap();

        assert_eq!(&[4.0, 9.0], model.target_names());
        assert_eq!(1, model.trees().len());
        assert_eq!(30, model.trees()[0].len());
        // 8 of 20 rows are the scored class `4`.
        let exp = (8f64 / 12f64).ln();
        assert!((exp - model.initial_losses()[0]).abs() < 1e-12);

        assert_eq!(targets, model.predict_all(&observations));
    }

    #[test]
    fn test_run_02() {
        let (observations, targets) = data(|i| (i / 7) as f64);
        let model = GBMClassifier::init(learner())
            .iterations(30)
            .learning_rate(0.3)
            .run(&observations, &targets)
            .unwrap();

        assert_eq!(3, model.trees().len());
        assert!(model.trees().iter().all(|seq| seq.len() == 30));
        assert_eq!(targets, model.predict_all(&observations));
    }

    #[test]
    fn test_run_03() {
        let (observations, targets) = data(|_| 1.0);
        let res = GBMClassifier::init(learner())
            .run(&observations, &targets)
            .map(|_| ());
        assert_eq!(Err(TreeError::TooFewClasses(1)), res);
    }

    #[test]
    fn test_run_indexed_01() {
        let (observations, targets) = data(|i| (i / 7) as f64);

        // Rows `0..14` only hold the labels `0` and `1`.
        let indices = (0..14).collect::<Vec<_>>();
        let model = GBMClassifier::init(learner())
            .iterations(10)
            .run_indexed(&observations, &targets, &indices)
            .unwrap();
        assert_eq!(&[0.0, 1.0], model.target_names());
        assert_eq!(1, model.trees().len());
    }

    #[test]
    fn test_parameters_01() {
        let (observations, targets) = data(|i| (i % 2) as f64);
        let res = GBMClassifier::init(learner())
            .learning_rate(-1.0)
            .run(&observations, &targets)
            .map(|_| ());
        assert_eq!(Err(TreeError::InvalidLearningRate(-1.0)), res);
    }

    #[test]
    fn test_subsample_01() {
        let (observations, targets) = data(|i| (i % 3) as f64);
        let run = |seed| {
            GBMClassifier::init(learner())
                .iterations(5)
                .subsample_ratio(0.5)
                .seed(seed)
                .run(&observations, &targets)
                .unwrap()
        };
        assert_eq!(run(7), run(7));
    }
}
