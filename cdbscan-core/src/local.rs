//! Local clustering phase.
//!
//! Every leaf of the spatial index is seeded independently: each point not
//! yet claimed inside its leaf expands its density-reachable set, which is
//! then classified as noise, a clean core set, or a set broken by a
//! cannot-link pair. Leaves share no mutable state, so they may run on the
//! rayon pool. After the barrier, seeds whose reachable sets overlap are
//! joined into one partition of `{noise} ∪ {local clusters}`.

use std::collections::{HashMap, HashSet};
use std::num::NonZeroUsize;

#[cfg(feature = "parallel")]
use rayon::prelude::*;
use tracing::{debug, instrument};

use crate::{
    constraints::{ConstraintGraph, union_find::UnionFind},
    datasource::DataSource,
    error::DataSourceError,
    neighborhood::NeighborhoodOracle,
    spatial::{Leaf, SpatialIndex},
    telemetry,
};

/// Provenance of a cluster in the merge table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ClusterKind {
    /// Reachable set of at least `min_points` points without an internal
    /// cannot-link pair.
    Core,
    /// Singleton split from a reachable set that contained a cannot-link pair.
    ConstraintBroken,
    /// Cluster seeded by a must-link class.
    Alpha,
}

/// Sorted, non-empty set of point indices with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocalCluster {
    kind: ClusterKind,
    members: Vec<usize>,
}

impl LocalCluster {
    pub(crate) fn new(kind: ClusterKind, members: Vec<usize>) -> Self {
        debug_assert!(!members.is_empty(), "clusters are never empty");
        debug_assert!(members.is_sorted(), "cluster members must be sorted");
        Self { kind, members }
    }

    #[rustfmt::skip]
    pub(crate) fn kind(&self) -> ClusterKind { self.kind }

    #[rustfmt::skip]
    pub(crate) fn members(&self) -> &[usize] { &self.members }

    /// Smallest point index in the cluster; used for deterministic ordering.
    pub(crate) fn smallest(&self) -> usize {
        self.members[0]
    }

    pub(crate) fn into_members(self) -> Vec<usize> {
        self.members
    }
}

/// Output of the local phase.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct LocalPartition {
    /// Disjoint local clusters ordered by smallest member.
    pub(crate) clusters: Vec<LocalCluster>,
    /// Points absorbed by no local cluster, ascending.
    pub(crate) noise: Vec<usize>,
    /// Density-reachability component representative for every point.
    pub(crate) components: Vec<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SeedVerdict {
    Noise,
    Core,
    ConstraintBroken,
}

#[derive(Debug)]
struct LeafSeed {
    reachable: Vec<usize>,
    verdict: SeedVerdict,
}

/// Builds the initial partition from per-leaf seeds.
pub(crate) struct LocalClusterBuilder<'a, D: ?Sized, I> {
    oracle: NeighborhoodOracle<'a, D, I>,
    constraints: &'a ConstraintGraph,
    epsilon: f32,
    min_points: NonZeroUsize,
}

impl<'a, D, I> LocalClusterBuilder<'a, D, I>
where
    D: DataSource + Sync + ?Sized,
    I: SpatialIndex + Sync,
{
    pub(crate) fn new(
        oracle: NeighborhoodOracle<'a, D, I>,
        constraints: &'a ConstraintGraph,
        epsilon: f32,
        min_points: NonZeroUsize,
    ) -> Self {
        Self {
            oracle,
            constraints,
            epsilon,
            min_points,
        }
    }

    /// Seeds every leaf, waits for all of them, then joins overlapping seeds.
    #[instrument(
        name = "cdbscan.local_phase",
        err,
        skip(self, leaves),
        fields(leaves = leaves.len()),
    )]
    pub(crate) fn build(
        &self,
        leaves: &[Leaf],
        parallel: bool,
    ) -> Result<LocalPartition, DataSourceError> {
        let seeds = self.seed_leaves(leaves, parallel)?;
        let partition = self.join(seeds.into_iter().flatten());
        debug!(
            clusters = partition.clusters.len(),
            noise = partition.noise.len(),
            "local phase completed"
        );
        telemetry::record_local_clusters(partition.clusters.len());
        Ok(partition)
    }

    fn seed_leaves(
        &self,
        leaves: &[Leaf],
        parallel: bool,
    ) -> Result<Vec<Vec<LeafSeed>>, DataSourceError> {
        #[cfg(feature = "parallel")]
        if parallel {
            return leaves.par_iter().map(|leaf| self.seed_leaf(leaf)).collect();
        }
        #[cfg(not(feature = "parallel"))]
        debug_assert!(!parallel, "parallel seeding requires the `parallel` feature");

        leaves.iter().map(|leaf| self.seed_leaf(leaf)).collect()
    }

    fn seed_leaf(&self, leaf: &Leaf) -> Result<Vec<LeafSeed>, DataSourceError> {
        let members = leaf.members();
        let mut claimed = vec![false; members.len()];
        let mut seeds = Vec::new();

        for (position, &point) in members.iter().enumerate() {
            if claimed[position] {
                continue;
            }
            let reachable = self.oracle.density_reachable(point, self.epsilon)?;
            for (slot, member) in claimed.iter_mut().zip(members) {
                if !*slot && reachable.binary_search(member).is_ok() {
                    *slot = true;
                }
            }

            let verdict = if reachable.len() < self.min_points.get() {
                SeedVerdict::Noise
            } else if self.constraints.contains_forbidden_pair(&reachable) {
                SeedVerdict::ConstraintBroken
            } else {
                SeedVerdict::Core
            };
            seeds.push(LeafSeed { reachable, verdict });
        }
        Ok(seeds)
    }

    fn join(&self, seeds: impl IntoIterator<Item = LeafSeed>) -> LocalPartition {
        let items = self.oracle.len();
        let mut reach = UnionFind::new(items);
        let mut dense = UnionFind::new(items);
        let mut covered = vec![false; items];
        let mut broken = Vec::new();

        for seed in seeds {
            let Some((&first, rest)) = seed.reachable.split_first() else {
                continue;
            };
            for &other in rest {
                reach.union(first, other);
            }
            if seed.verdict == SeedVerdict::Noise {
                continue;
            }
            covered[first] = true;
            for &other in rest {
                covered[other] = true;
                dense.union(first, other);
            }
            if seed.verdict == SeedVerdict::ConstraintBroken {
                broken.push(first);
            }
        }

        let broken_roots: HashSet<usize> = broken.into_iter().map(|p| dense.find(p)).collect();
        let mut group_of_root = HashMap::new();
        let mut groups: Vec<(usize, Vec<usize>)> = Vec::new();
        let mut noise = Vec::new();
        for point in 0..items {
            if !covered[point] {
                noise.push(point);
                continue;
            }
            let root = dense.find(point);
            let group = *group_of_root.entry(root).or_insert_with(|| {
                groups.push((root, Vec::new()));
                groups.len() - 1
            });
            groups[group].1.push(point);
        }

        let mut clusters = Vec::with_capacity(groups.len());
        for (root, members) in groups {
            if broken_roots.contains(&root) || self.constraints.contains_forbidden_pair(&members) {
                let singletons = members
                    .into_iter()
                    .map(|member| LocalCluster::new(ClusterKind::ConstraintBroken, vec![member]));
                clusters.extend(singletons);
            } else {
                clusters.push(LocalCluster::new(ClusterKind::Core, members));
            }
        }
        clusters.sort_unstable_by_key(LocalCluster::smallest);

        debug!(components = reach.components(), "reachability joined");
        let components = (0..items).map(|point| reach.find(point)).collect();
        LocalPartition {
            clusters,
            noise,
            components,
        }
    }
}

#[cfg(test)]
mod tests {
    use rstest::{fixture, rstest};

    use super::*;
    use crate::{constraints::Constraints, dataset::DenseSource, spatial::KdTree};

    /// Two tight triples far apart plus one isolated point.
    #[fixture]
    fn source() -> DenseSource {
        let rows = vec![
            vec![0.0, 0.0],
            vec![0.0, 1.0],
            vec![1.0, 0.0],
            vec![10.0, 10.0],
            vec![11.0, 10.0],
            vec![10.0, 11.0],
            vec![50.0, 50.0],
        ];
        DenseSource::try_new("triples", &rows).expect("rows are valid")
    }

    fn partition(
        source: &DenseSource,
        constraints: &Constraints,
        min_points: usize,
        leaf_size: usize,
        parallel: bool,
    ) -> LocalPartition {
        let tree = KdTree::build(source, NonZeroUsize::new(leaf_size).expect("non-zero"))
            .expect("tree builds");
        let graph = ConstraintGraph::new(source.len(), constraints).expect("valid constraints");
        let builder = LocalClusterBuilder::new(
            NeighborhoodOracle::new(source, &tree),
            &graph,
            1.5,
            NonZeroUsize::new(min_points).expect("non-zero"),
        );
        builder
            .build(tree.leaves(), parallel)
            .expect("local phase succeeds")
    }

    fn members(partition: &LocalPartition) -> Vec<(ClusterKind, Vec<usize>)> {
        partition
            .clusters
            .iter()
            .map(|cluster| (cluster.kind(), cluster.members().to_vec()))
            .collect()
    }

    #[rstest]
    fn dense_triples_become_core_clusters(source: DenseSource) {
        let partition = partition(&source, &Constraints::new(), 3, 2, false);
        assert_eq!(
            members(&partition),
            vec![
                (ClusterKind::Core, vec![0, 1, 2]),
                (ClusterKind::Core, vec![3, 4, 5]),
            ]
        );
        assert_eq!(partition.noise, vec![6]);
    }

    #[rstest]
    fn sparse_sets_stay_noise(source: DenseSource) {
        let partition = partition(&source, &Constraints::new(), 4, 3, false);
        assert!(partition.clusters.is_empty());
        assert_eq!(partition.noise, (0..7).collect::<Vec<_>>());
    }

    #[rstest]
    fn cannot_link_splits_reachable_set_into_singletons(source: DenseSource) {
        let constraints = Constraints::new().with_cannot_link(0, 2);
        let partition = partition(&source, &constraints, 3, 2, false);
        assert_eq!(
            members(&partition),
            vec![
                (ClusterKind::ConstraintBroken, vec![0]),
                (ClusterKind::ConstraintBroken, vec![1]),
                (ClusterKind::ConstraintBroken, vec![2]),
                (ClusterKind::Core, vec![3, 4, 5]),
            ]
        );
    }

    #[rstest]
    fn components_follow_reachability(source: DenseSource) {
        let partition = partition(&source, &Constraints::new(), 3, 1, false);
        let components = &partition.components;
        assert_eq!(components[0], components[1]);
        assert_eq!(components[1], components[2]);
        assert_eq!(components[3], components[5]);
        assert_ne!(components[0], components[3]);
        assert_ne!(components[6], components[0]);
        assert_ne!(components[6], components[3]);
    }

    #[rstest]
    #[case(1)]
    #[case(2)]
    #[case(7)]
    fn leaf_size_does_not_change_partition(source: DenseSource, #[case] leaf_size: usize) {
        let constraints = Constraints::new().with_cannot_link(3, 4);
        let reference = partition(&source, &constraints, 2, 16, false);
        assert_eq!(partition(&source, &constraints, 2, leaf_size, false), reference);
    }

    #[cfg(feature = "parallel")]
    #[rstest]
    fn parallel_seeding_matches_sequential(source: DenseSource) {
        let constraints = Constraints::new().with_cannot_link(1, 2);
        assert_eq!(
            partition(&source, &constraints, 2, 1, true),
            partition(&source, &constraints, 2, 1, false)
        );
    }
}
