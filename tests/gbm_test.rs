use rand::prelude::*;
use rand_distr::{Normal, Uniform};
use treeboosts::prelude::*;


/// Tests for `GBM`.
#[cfg(test)]
pub mod gbm_tests {
    use super::*;

    /// `y = 3 x0 - 2 x1 + ε` with `x ~ U(0, 1)^3` and `ε ~ N(0, noise)`.
    fn linear_data(n_sample: usize, noise: f64, seed: u64)
        -> (F64Matrix, Vec<f64>)
    {
        let mut rng = StdRng::seed_from_u64(seed);
        let uni = Uniform::new(0.0, 1.0);
        let normal = Normal::new(0.0, noise).unwrap();

        let rows = (0..n_sample)
            .map(|_| (0..3).map(|_| uni.sample(&mut rng)).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let targets = rows.iter()
            .map(|row| 3.0 * row[0] - 2.0 * row[1] + normal.sample(&mut rng))
            .collect::<Vec<_>>();

        (F64Matrix::from_rows(&rows).unwrap(), targets)
    }

    fn mean_squared_error(targets: &[f64], predictions: &[f64]) -> f64 {
        let n = targets.len() as f64;
        targets.iter()
            .zip(predictions)
            .map(|(y, p)| (y - p).powi(2))
            .sum::<f64>() / n
    }

    fn mean_absolute_error(targets: &[f64], predictions: &[f64]) -> f64 {
        let n = targets.len() as f64;
        targets.iter()
            .zip(predictions)
            .map(|(y, p)| (y - p).abs())
            .sum::<f64>() / n
    }

    fn variance(values: &[f64]) -> f64 {
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n
    }

    #[test]
    fn squared_loss_fits_noisy_linear_data() {
        let (observations, targets) = linear_data(300, 0.1, 1);

        let learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
            .max_depth(4)
            .min_split_size(5)
            .build()
            .unwrap();
        let mut booster = GBM::init(learner)
            .iterations(100)
            .learning_rate(0.1);
        let model = booster.run(&observations, &targets).unwrap();

        assert_eq!(100, model.trees().len());
        assert_eq!(3, model.feature_count());

        let predictions = model.predict_all(&observations);
        let mse = mean_squared_error(&targets, &predictions);
        let var = variance(&targets);
        assert!(mse < 0.2 * var, "train MSE {mse} vs variance {var}.");

        for (i, p) in predictions.iter().enumerate().step_by(37) {
            let q = model.predict(observations.row(i));
            assert!((p - q).abs() < 1e-12);
        }
    }

    #[test]
    fn absolute_loss_beats_the_median() {
        let (observations, targets) = linear_data(200, 0.3, 2);

        let learner = GBMDecisionTreeLearnerBuilder::new(AbsoluteLoss::new())
            .max_depth(3)
            .build()
            .unwrap();
        let mut booster = GBM::init(learner).iterations(60);
        let model = booster.run(&observations, &targets).unwrap();

        let med = median(&targets);
        assert_eq!(med, model.initial_loss());

        let baseline = mean_absolute_error(&targets, &vec![med; targets.len()]);
        let predictions = model.predict_all(&observations);
        let mae = mean_absolute_error(&targets, &predictions);
        assert!(mae < baseline, "MAE {mae} vs constant {baseline}.");
    }

    #[test]
    fn quantile_loss_covers_its_quantile() {
        let (observations, targets) = linear_data(400, 0.5, 3);

        let loss = QuantileLoss::new(0.9).unwrap();
        let learner = GBMDecisionTreeLearnerBuilder::new(loss)
            .max_depth(3)
            .min_split_size(10)
            .build()
            .unwrap();
        let mut booster = GBM::init(learner).iterations(100);
        let model = booster.run(&observations, &targets).unwrap();

        let predictions = model.predict_all(&observations);
        let covered = targets.iter()
            .zip(&predictions)
            .filter(|(y, p)| y <= p)
            .count() as f64 / targets.len() as f64;
        assert!(covered > 0.75, "coverage {covered}.");
    }

    #[test]
    fn huber_loss_improves_on_the_initial_guess() {
        let (observations, targets) = linear_data(200, 0.2, 4);

        let loss = HuberLoss::new(0.9).unwrap();
        let learner = GBMDecisionTreeLearnerBuilder::new(loss)
            .max_depth(3)
            .build()
            .unwrap();
        let mut booster = GBM::init(learner).iterations(50);
        let model = booster.run(&observations, &targets).unwrap();

        let baseline = mean_squared_error(
            &targets, &vec![model.initial_loss(); targets.len()]
        );
        let predictions = model.predict_all(&observations);
        let mse = mean_squared_error(&targets, &predictions);
        assert!(mse < baseline, "MSE {mse} vs constant {baseline}.");
        assert!(booster.learner().loss().gamma() > 0.0);
    }

    #[test]
    fn early_stopping_keeps_whole_rounds() {
        let (train_x, train_y) = linear_data(200, 0.5, 5);
        let (valid_x, valid_y) = linear_data(100, 0.5, 6);

        let learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
            .max_depth(6)
            .build()
            .unwrap();
        let mut booster = GBM::init(learner)
            .iterations(300)
            .learning_rate(0.3);
        let model = booster.run_with_early_stopping(
            &train_x, &train_y,
            &valid_x, &valid_y,
            mean_squared_error,
            10,
        ).unwrap();

        let n_tree = model.trees().len();
        assert!(n_tree > 0);
        assert!(n_tree <= 300);
        assert_eq!(0, n_tree % 10, "{n_tree} trees.");
    }

    #[test]
    fn runs_are_reproducible() {
        let (observations, targets) = linear_data(150, 0.2, 7);

        let run = || {
            let learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
                .max_depth(3)
                .features_pr_split(2)
                .seed(3)
                .build()
                .unwrap();
            GBM::init(learner)
                .iterations(20)
                .subsample_ratio(0.5)
                .seed(8)
                .run(&observations, &targets)
                .unwrap()
        };

        assert_eq!(run(), run());
    }

    #[test]
    fn verbose_run_completes() {
        let (observations, targets) = linear_data(50, 0.1, 9);
        let learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
            .max_depth(2)
            .build()
            .unwrap();
        let model = GBM::init(learner)
            .iterations(3)
            .verbose(true)
            .run(&observations, &targets)
            .unwrap();
        assert_eq!(3, model.trees().len());
    }

    #[test]
    fn invalid_parameters_are_rejected() {
        let (observations, targets) = linear_data(20, 0.1, 10);
        let learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
            .build()
            .unwrap();

        let res = GBM::init(learner.clone())
            .learning_rate(0.0)
            .run(&observations, &targets);
        assert!(matches!(res, Err(TreeError::InvalidLearningRate(_))));

        let res = GBM::init(learner.clone())
            .iterations(0)
            .run(&observations, &targets);
        assert!(matches!(res, Err(TreeError::InvalidIterations(_))));

        let res = GBM::init(learner)
            .subsample_ratio(1.5)
            .run(&observations, &targets);
        assert!(matches!(res, Err(TreeError::InvalidSubsampleRatio(_))));
    }

    /// `x ~ U(0, 1)^3` with labels from `label(x)`.
    fn labelled_data<F>(n_sample: usize, seed: u64, label: F)
        -> (F64Matrix, Vec<f64>)
        where F: Fn(&[f64]) -> f64,
    {
        let mut rng = StdRng::seed_from_u64(seed);
        let uni = Uniform::new(0.0, 1.0);

        let rows = (0..n_sample)
            .map(|_| (0..3).map(|_| uni.sample(&mut rng)).collect::<Vec<_>>())
            .collect::<Vec<_>>();
        let targets = rows.iter().map(|row| label(row)).collect::<Vec<_>>();

        (F64Matrix::from_rows(&rows).unwrap(), targets)
    }

    fn error_rate(targets: &[f64], predictions: &[f64]) -> f64 {
        let n = targets.len() as f64;
        targets.iter()
            .zip(predictions)
            .filter(|(y, p)| y != p)
            .count() as f64 / n
    }

    fn classifier(subsample_ratio: f64) -> GBMClassifier {
        let learner = GBMDecisionTreeLearnerBuilder::new(BinomialLoss::new())
            .max_depth(3)
            .min_split_size(1)
            .build()
            .unwrap();
        GBMClassifier::init(learner)
            .iterations(100)
            .learning_rate(0.2)
            .subsample_ratio(subsample_ratio)
    }

    #[test]
    fn binomial_loss_separates_two_classes() {
        let (observations, targets) = labelled_data(300, 11, |x| {
            if x[0] + x[1] > 1.0 { 1.0 } else { -1.0 }
        });

        for ratio in [1.0, 0.3] {
            let model = classifier(ratio)
                .run(&observations, &targets)
                .unwrap();
            assert_eq!(&[-1.0, 1.0], model.target_names());
            assert_eq!(1, model.trees().len());

            let predictions = model.predict_all(&observations);
            let error = error_rate(&targets, &predictions);
            assert!(error < 0.1, "ratio {ratio}: training error {error}.");
        }
    }

    #[test]
    fn binary_probabilities_are_complementary() {
        let (observations, targets) = labelled_data(200, 12, |x| {
            if x[2] > 0.4 { 1.0 } else { 0.0 }
        });
        let model = classifier(1.0).run(&observations, &targets).unwrap();

        let results = model.predict_probability_all(&observations);
        for (res, &y) in results.iter().zip(&targets) {
            let p0 = res.probability(0.0).unwrap();
            let p1 = res.probability(1.0).unwrap();
            assert!((0.0..=1.0).contains(&p0), "probability {p0}.");
            assert!((p0 + p1 - 1.0).abs() < 1e-12);
            assert_eq!(y, res.prediction);
        }
    }

    #[test]
    fn one_vs_all_separates_three_classes() {
        let (observations, targets) = labelled_data(300, 13, |x| {
            if x[0] < 0.3 { 1.0 } else if x[0] < 0.7 { 2.0 } else { 3.0 }
        });

        for ratio in [1.0, 0.3] {
            let model = classifier(ratio)
                .run(&observations, &targets)
                .unwrap();
            assert_eq!(&[1.0, 2.0, 3.0], model.target_names());
            assert_eq!(3, model.trees().len());

            let predictions = model.predict_all(&observations);
            let error = error_rate(&targets, &predictions);
            assert!(error < 0.05, "ratio {ratio}: training error {error}.");

            let res = model.predict_probability(observations.row(0));
            let total = res.probabilities.iter().map(|(_, p)| p).sum::<f64>();
            assert!((total - 1.0).abs() < 1e-12, "total {total}.");
        }
    }

    #[test]
    fn verbose_classification_run_completes() {
        let (observations, targets) = labelled_data(50, 14, |x| {
            (3.0 * x[1]).floor()
        });
        let model = classifier(1.0)
            .iterations(3)
            .verbose(true)
            .run(&observations, &targets)
            .unwrap();
        assert!(model.trees().iter().all(|seq| seq.len() == 3));
    }
}
