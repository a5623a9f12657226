use rand::prelude::*;
use treeboosts::prelude::*;

use fixedbitset::FixedBitSet;


/// Tests for `GBMDecisionTreeLearner`.
#[cfg(test)]
pub mod gbm_tree_tests {
    use super::*;

    fn full_mask(n: usize) -> FixedBitSet {
        mask_from_indices(&(0..n).collect::<Vec<_>>(), n)
    }

    fn random_data(n_sample: usize, n_feature: usize, seed: u64)
        -> (F64Matrix, Vec<f64>)
    {
        let mut rng = StdRng::seed_from_u64(seed);
        let rows = (0..n_sample)
            .map(|_| {
                (0..n_feature)
                    // Few distinct values, so ties occur.
                    .map(|_| rng.gen_range(0..20) as f64)
                    .collect::<Vec<_>>()
            })
            .collect::<Vec<_>>();
        let targets = rows.iter()
            .map(|row| row[0] * 0.5 - row[1] + rng.gen_range(-1.0..1.0))
            .collect::<Vec<_>>();
        let observations = F64Matrix::from_rows(&rows).unwrap();
        (observations, targets)
    }

    fn learner(run_parallel: bool, features_pr_split: usize)
        -> GBMDecisionTreeLearner<SquaredLoss>
    {
        GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
            .max_depth(5)
            .min_split_size(3)
            .features_pr_split(features_pr_split)
            .run_parallel(run_parallel)
            .seed(11)
            .build()
            .unwrap()
    }

    #[test]
    fn single_unique_value_gives_root_only_tree() {
        let observations = F64Matrix::from_rows(&[
            [1.0, 7.0], [1.0, 7.0], [1.0, 7.0], [1.0, 7.0],
        ]).unwrap();
        let targets = [1.0, 2.0, 3.0, 4.0];
        let predictions = [0.0; 4];
        let ordered = ordered_elements(&observations);

        let mut learner = learner(true, 0);
        let tree = learner.learn(
            &observations, &targets, &targets, &predictions,
            &ordered, &full_mask(4),
        ).unwrap();

        assert_eq!(1, tree.nodes().len());
        let root = tree.nodes()[0];
        assert_eq!(None, root.feature_index);
        assert_eq!(None, root.left_index);
        assert_eq!(None, root.right_index);
        assert_eq!(2.5, tree.predict(&[1.0, 7.0]));
    }

    #[test]
    fn squared_residuals_of_constant_predictions() {
        let targets = (1..=9).map(|y| y as f64).collect::<Vec<_>>();
        let predictions = vec![5.0; 9];
        let mut residuals = vec![0.0; 9];

        let mut learner = learner(false, 0);
        learner.loss_mut().update_residuals(
            &targets, &predictions, &mut residuals, &full_mask(9)
        );

        let exp = vec![-4.0, -3.0, -2.0, -1.0, 0.0, 1.0, 2.0, 3.0, 4.0];
        assert_eq!(exp, residuals);
    }

    #[test]
    fn identical_rows_cannot_be_split() {
        let observations = F64Matrix::from_rows(&[
            [3.0, -1.0], [3.0, -1.0],
        ]).unwrap();
        let targets = [0.0, 10.0];
        let predictions = [0.0; 2];
        let ordered = ordered_elements(&observations);

        let mut learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
            .min_split_size(1)
            .build()
            .unwrap();
        let tree = learner.learn(
            &observations, &targets, &targets, &predictions,
            &ordered, &full_mask(2),
        ).unwrap();

        assert!(tree.is_constant());
        assert_eq!(5.0, tree.predict(&[3.0, -1.0]));
    }

    #[test]
    fn ties_stay_on_the_same_side() {
        let observations = F64Matrix::from_rows(&[
            [1.0], [2.0], [2.0], [2.0], [3.0],
        ]).unwrap();
        let targets = [0.0, 0.0, 10.0, 10.0, 10.0];
        let predictions = [0.0; 5];
        let ordered = ordered_elements(&observations);

        let mut learner = GBMDecisionTreeLearnerBuilder::new(SquaredLoss::new())
            .max_depth(1)
            .run_parallel(false)
            .build()
            .unwrap();
        let tree = learner.learn(
            &observations, &targets, &targets, &predictions,
            &ordered, &full_mask(5),
        ).unwrap();

        // Splitting at `1.5` leaves a cost of 75, at `2.5` a cost of 100.
        // The tied `2.0`s are never separated.
        let threshold = tree.nodes()[1].threshold;
        assert_eq!(1.5, threshold, "expected 1.5, got {threshold}.");
    }

    #[test]
    fn parallel_and_sequential_search_agree() {
        let (observations, targets) = random_data(300, 8, 21);
        let predictions = vec![0.0; 300];
        let ordered = ordered_elements(&observations);
        let mask = full_mask(300);

        for features_pr_split in [0, 3] {
            let sequential = learner(false, features_pr_split).learn(
                &observations, &targets, &targets, &predictions,
                &ordered, &mask,
            ).unwrap();
            let parallel = learner(true, features_pr_split).learn(
                &observations, &targets, &targets, &predictions,
                &ordered, &mask,
            ).unwrap();

            assert_eq!(sequential, parallel);
        }
    }

    #[test]
    fn duplicate_features_tie_to_the_lowest_index() {
        let column = [4.0, 1.0, 3.0, 2.0, 6.0, 5.0];
        let rows = column.iter().map(|&x| [x, x, x]).collect::<Vec<_>>();
        let observations = F64Matrix::from_rows(&rows).unwrap();
        let targets = column.iter()
            .map(|&x| if x > 3.0 { 1.0 } else { -1.0 })
            .collect::<Vec<_>>();
        let predictions = vec![0.0; 6];
        let ordered = ordered_elements(&observations);

        let mut learner = learner(true, 0);
        let tree = learner.learn(
            &observations, &targets, &targets, &predictions,
            &ordered, &full_mask(6),
        ).unwrap();

        assert_eq!(Some(0), tree.nodes()[1].feature_index);
        assert_eq!(3.5, tree.nodes()[1].threshold);
    }

    #[test]
    fn feature_subsampling_is_reproducible() {
        let (observations, targets) = random_data(100, 6, 5);
        let predictions = vec![0.0; 100];
        let ordered = ordered_elements(&observations);
        let mask = full_mask(100);

        let a = learner(false, 2).learn(
            &observations, &targets, &targets, &predictions, &ordered, &mask,
        ).unwrap();
        let b = learner(false, 2).learn(
            &observations, &targets, &targets, &predictions, &ordered, &mask,
        ).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn children_are_patched_into_their_parents() {
        let (observations, targets) = random_data(200, 4, 9);
        let predictions = vec![0.0; 200];
        let ordered = ordered_elements(&observations);

        let tree = learner(true, 0).learn(
            &observations, &targets, &targets, &predictions,
            &ordered, &full_mask(200),
        ).unwrap();

        let nodes = tree.nodes();
        assert!(nodes.len() > 2);
        for (i, node) in nodes.iter().enumerate().skip(1) {
            assert!(node.depth <= 5);
            for child in [node.left_index, node.right_index].into_iter().flatten() {
                assert!(child > i, "child {child} is not after parent {i}.");
                assert_eq!(node.depth + 1, nodes[child].depth);
            }
        }
    }

    #[test]
    fn empty_mask_is_rejected() {
        let observations = F64Matrix::from_rows(&[[1.0], [2.0]]).unwrap();
        let ordered = ordered_elements(&observations);
        let res = learner(false, 0).learn(
            &observations, &[1.0, 2.0], &[1.0, 2.0], &[0.0, 0.0],
            &ordered, &FixedBitSet::with_capacity(2),
        );
        assert!(matches!(res, Err(TreeError::EmptySample)));
    }
}
