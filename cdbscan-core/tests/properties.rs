//! Property tests for the labelling guarantees of a constrained run.

use cdbscan_core::{CdbscanBuilder, Constraints, DenseSource};
use cdbscan_test_support::ci::property_test_profile::ProptestRunProfile;
use proptest::prelude::*;
use proptest::test_runner::Config as ProptestConfig;

fn suite_config(default_cases: u32) -> ProptestConfig {
    let profile = ProptestRunProfile::load(default_cases, false);
    ProptestConfig {
        cases: profile.cases(),
        fork: profile.fork(),
        ..ProptestConfig::default()
    }
}

/// Integer grid points so neighbourhood boundaries are exact.
fn points() -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec((0_u8..16, 0_u8..16), 0..40).prop_map(|cells| {
        cells
            .into_iter()
            .map(|(x, y)| vec![f32::from(x), f32::from(y)])
            .collect()
    })
}

/// Off-grid points, so no two distances tie in practice.
fn scattered() -> impl Strategy<Value = Vec<Vec<f32>>> {
    prop::collection::vec((0.0_f32..16.0, 0.0_f32..16.0), 0..32)
        .prop_map(|cells| cells.into_iter().map(|(x, y)| vec![x, y]).collect())
}

/// Points with a hidden class per point; must-links are drawn inside a class
/// and cannot-links across classes, so the pairs never contradict.
#[derive(Clone, Debug)]
struct Supervised {
    points: Vec<Vec<f32>>,
    must_link: Vec<(usize, usize)>,
    cannot_link: Vec<(usize, usize)>,
}

fn supervised() -> impl Strategy<Value = Supervised> {
    supervised_over(points())
}

fn supervised_over(
    points: impl Strategy<Value = Vec<Vec<f32>>>,
) -> impl Strategy<Value = Supervised> {
    points
        .prop_filter("need two points to link", |points| points.len() >= 2)
        .prop_flat_map(|points| {
            let len = points.len();
            let classes = prop::collection::vec(0_u8..3, len);
            let pairs = prop::collection::vec((0..len, 0..len), 0..12);
            (Just(points), classes, pairs)
        })
        .prop_map(|(points, classes, pairs)| {
            let mut must_link = Vec::new();
            let mut cannot_link = Vec::new();
            for (left, right) in pairs {
                if left == right {
                    continue;
                }
                if classes[left] == classes[right] {
                    must_link.push((left, right));
                } else {
                    cannot_link.push((left, right));
                }
            }
            Supervised {
                points,
                must_link,
                cannot_link,
            }
        })
}

fn epsilon() -> impl Strategy<Value = f32> {
    prop::sample::select(vec![1.0_f32, 1.5, 2.5])
}

fn assert_first_appearance(labels: &[i64]) -> Result<(), TestCaseError> {
    let mut next = 0;
    for &label in labels {
        prop_assert!(label >= -1);
        prop_assert!(label <= next, "label {label} skipped ahead of {next}");
        if label == next {
            next += 1;
        }
    }
    Ok(())
}

proptest! {
    #![proptest_config(suite_config(64))]

    #[test]
    fn labels_are_numbered_by_first_appearance(
        rows in points(),
        epsilon in epsilon(),
        min_points in 1_usize..5,
    ) {
        let labels = cdbscan_core::cluster(&rows, epsilon, min_points, &[], &[])
            .expect("run must succeed");
        prop_assert_eq!(labels.len(), rows.len());
        assert_first_appearance(&labels)?;
    }

    #[test]
    fn unconstrained_neighbours_share_a_label(
        rows in points(),
        epsilon in epsilon(),
        min_points in 1_usize..5,
    ) {
        let labels = cdbscan_core::cluster(&rows, epsilon, min_points, &[], &[])
            .expect("run must succeed");
        for (i, a) in rows.iter().enumerate() {
            for (j, b) in rows.iter().enumerate().skip(i + 1) {
                let dx = a[0] - b[0];
                let dy = a[1] - b[1];
                if (dx * dx + dy * dy).sqrt() <= epsilon {
                    prop_assert_eq!(labels[i], labels[j], "neighbours {} and {} split", i, j);
                }
            }
        }
    }

    #[test]
    fn constraints_hold_in_the_labels(
        case in supervised(),
        epsilon in epsilon(),
        min_points in 1_usize..5,
    ) {
        let labels = cdbscan_core::cluster(
            &case.points,
            epsilon,
            min_points,
            &case.must_link,
            &case.cannot_link,
        )
        .expect("consistent constraints must cluster");
        assert_first_appearance(&labels)?;
        for &(left, right) in &case.must_link {
            prop_assert!(labels[left] >= 0, "must-linked point {left} left as noise");
            prop_assert_eq!(labels[left], labels[right]);
        }
        for &(left, right) in &case.cannot_link {
            prop_assert_ne!(
                labels[left],
                labels[right],
                "cannot-linked {} and {} share a label",
                left,
                right
            );
        }
    }

    #[test]
    fn leaf_size_does_not_change_labels(
        case in supervised(),
        epsilon in epsilon(),
        leaf_size in 1_usize..8,
    ) {
        let source = DenseSource::try_new("grid", &case.points).expect("finite rows");
        let constraints = Constraints::from_pairs(
            case.must_link.iter().copied(),
            case.cannot_link.iter().copied(),
        );
        let run = |leaf_size| {
            CdbscanBuilder::new()
                .with_epsilon(epsilon)
                .with_min_points(3)
                .with_leaf_size(leaf_size)
                .build()
                .expect("configuration must be valid")
                .run(&source, &constraints)
                .expect("run must succeed")
                .labels()
        };
        prop_assert_eq!(run(leaf_size), run(cdbscan_core::DEFAULT_LEAF_SIZE));
    }

    #[test]
    fn unconstrained_partition_ignores_point_order(
        rows in points(),
        epsilon in epsilon(),
        min_points in 1_usize..5,
        seed in any::<u64>(),
    ) {
        let order = shuffled_order(rows.len(), seed);
        let shuffled: Vec<Vec<f32>> = order.iter().map(|&index| rows[index].clone()).collect();

        let labels = cdbscan_core::cluster(&rows, epsilon, min_points, &[], &[])
            .expect("run must succeed");
        let moved = cdbscan_core::cluster(&shuffled, epsilon, min_points, &[], &[])
            .expect("run must succeed");

        assert_same_partition(&order, &labels, &moved)?;
    }

    #[test]
    fn constrained_partition_ignores_point_order(
        case in supervised_over(scattered()),
        epsilon in epsilon(),
        min_points in 1_usize..5,
        seed in any::<u64>(),
    ) {
        let order = shuffled_order(case.points.len(), seed);
        let mut position = vec![0; order.len()];
        for (a, &i) in order.iter().enumerate() {
            position[i] = a;
        }
        let remap = |pairs: &[(usize, usize)]| -> Vec<(usize, usize)> {
            pairs.iter().map(|&(l, r)| (position[l], position[r])).collect()
        };
        let shuffled: Vec<Vec<f32>> =
            order.iter().map(|&index| case.points[index].clone()).collect();

        let labels = cdbscan_core::cluster(
            &case.points,
            epsilon,
            min_points,
            &case.must_link,
            &case.cannot_link,
        )
        .expect("consistent constraints must cluster");
        let moved = cdbscan_core::cluster(
            &shuffled,
            epsilon,
            min_points,
            &remap(&case.must_link),
            &remap(&case.cannot_link),
        )
        .expect("consistent constraints must cluster");

        assert_same_partition(&order, &labels, &moved)?;
    }
}

/// Deterministic permutation of `0..len` keyed by `seed`.
fn shuffled_order(len: usize, seed: u64) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    order.sort_by_key(|&index| (index as u64).wrapping_mul(seed | 1).rotate_left(17));
    order
}

/// `moved[a]` labels the point `order[a]` of the original run.
fn assert_same_partition(
    order: &[usize],
    labels: &[i64],
    moved: &[i64],
) -> Result<(), TestCaseError> {
    for (a, &i) in order.iter().enumerate() {
        prop_assert_eq!(labels[i] == -1, moved[a] == -1);
        for (b, &j) in order.iter().enumerate() {
            prop_assert_eq!(labels[i] == labels[j], moved[a] == moved[b]);
        }
    }
    Ok(())
}
