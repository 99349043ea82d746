//! Constraint-driven merge phase.
//!
//! Phase A turns must-link classes into alpha clusters. Classes whose local
//! clusters overlap are settled together, so the outcome does not depend on
//! which class holds the smaller index. Noise points that share a cannot-link
//! pair are then kept as singleton clusters so the pair never ends up with
//! the same label. Phase B repeatedly absorbs the pending cluster closest to
//! a density-reachable alpha cluster, unless a cannot-link pair spans the
//! two. Point indices only break exact distance ties.
//!
//! Every cluster in the table stays free of internal cannot-link pairs, and
//! every must-link class stays inside one alpha cluster.

use std::collections::{HashMap, HashSet, hash_map::Entry};

use tracing::{debug, instrument};

use crate::{
    Result,
    constraints::{ConstraintGraph, union_find::UnionFind},
    datasource::{DataSource, checked_distance},
    error::CdbscanError,
    local::{ClusterKind, LocalCluster, LocalPartition},
    result::ClusterId,
    telemetry,
};

/// Final cluster assignment together with merge counters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct MergeOutcome {
    pub(crate) assignments: Vec<Option<ClusterId>>,
    pub(crate) cluster_count: usize,
    pub(crate) alpha_clusters: usize,
    pub(crate) passes: usize,
    pub(crate) absorbed: usize,
    pub(crate) vetoed: usize,
}

/// Cluster slots plus the slot owning each point.
///
/// Slot indices never move, so the index of an alpha slot doubles as its
/// creation-ordered id.
#[derive(Debug)]
struct MergeTable {
    slots: Vec<Option<LocalCluster>>,
    owner: Vec<Option<usize>>,
}

impl MergeTable {
    fn new(items: usize, clusters: Vec<LocalCluster>) -> Self {
        let mut table = Self {
            slots: Vec::with_capacity(clusters.len()),
            owner: vec![None; items],
        };
        for cluster in clusters {
            table.insert(cluster);
        }
        table
    }

    fn insert(&mut self, cluster: LocalCluster) -> usize {
        let slot = self.slots.len();
        for &member in cluster.members() {
            self.owner[member] = Some(slot);
        }
        self.slots.push(Some(cluster));
        slot
    }

    fn take(&mut self, slot: usize) -> Option<LocalCluster> {
        let cluster = self.slots.get_mut(slot)?.take()?;
        for &member in cluster.members() {
            self.owner[member] = None;
        }
        Some(cluster)
    }

    /// Removes the sorted `excluded` points from the cluster in `slot`.
    fn detach(&mut self, slot: usize, excluded: &[usize]) {
        let Some(cluster) = self.take(slot) else {
            return;
        };
        let kind = cluster.kind();
        let remaining: Vec<usize> = cluster
            .into_members()
            .into_iter()
            .filter(|member| excluded.binary_search(member).is_err())
            .collect();
        if remaining.is_empty() {
            return;
        }
        for &member in &remaining {
            self.owner[member] = Some(slot);
        }
        self.slots[slot] = Some(LocalCluster::new(kind, remaining));
    }

    /// Moves the cluster in `source` into the alpha cluster in `target`.
    fn absorb(&mut self, target: usize, source: usize) {
        let (Some(absorbed), Some(alpha)) = (self.take(source), self.take(target)) else {
            return;
        };
        let mut members = alpha.into_members();
        members.extend(absorbed.into_members());
        members.sort_unstable();
        for &member in &members {
            self.owner[member] = Some(target);
        }
        self.slots[target] = Some(LocalCluster::new(ClusterKind::Alpha, members));
    }

    fn cluster(&self, slot: usize) -> Option<&LocalCluster> {
        self.slots.get(slot).and_then(Option::as_ref)
    }

    fn alphas(&self) -> impl Iterator<Item = (usize, &LocalCluster)> {
        self.slots.iter().enumerate().filter_map(|(slot, cluster)| {
            cluster
                .as_ref()
                .filter(|cluster| cluster.kind() == ClusterKind::Alpha)
                .map(|cluster| (slot, cluster))
        })
    }

    /// Non-alpha slots ordered by smallest member.
    fn pending(&self) -> Vec<usize> {
        let mut pending: Vec<(usize, usize)> = self
            .slots
            .iter()
            .enumerate()
            .filter_map(|(slot, cluster)| {
                cluster
                    .as_ref()
                    .filter(|cluster| cluster.kind() != ClusterKind::Alpha)
                    .map(|cluster| (cluster.smallest(), slot))
            })
            .collect();
        pending.sort_unstable();
        pending.into_iter().map(|(_, slot)| slot).collect()
    }

    /// Sorted, deduplicated slots owning any of `points`.
    fn owners_of(&self, points: &[usize]) -> Vec<usize> {
        let mut slots: Vec<usize> = points
            .iter()
            .filter_map(|&point| self.owner[point])
            .collect();
        slots.sort_unstable();
        slots.dedup();
        slots
    }
}

/// Pending cluster paired with its nearest reachable alpha cluster.
#[derive(Debug, Clone, Copy)]
struct Candidate {
    cluster: usize,
    alpha: usize,
    gap: f32,
}

/// Distance bookkeeping carried across Phase B passes.
#[derive(Debug)]
struct Frontier {
    /// Density-reachability components touched by each alpha slot.
    reach: HashMap<usize, HashSet<usize>>,
    /// Minimum gap between a pending slot and an alpha slot.
    gaps: HashMap<(usize, usize), f32>,
}

impl Frontier {
    fn new(table: &MergeTable, components: &[usize]) -> Self {
        let reach = table
            .alphas()
            .map(|(slot, alpha)| {
                let touched: HashSet<usize> =
                    alpha.members().iter().map(|&m| components[m]).collect();
                (slot, touched)
            })
            .collect();
        Self {
            reach,
            gaps: HashMap::new(),
        }
    }

    fn reaches(&self, alpha: usize, cluster: &LocalCluster, components: &[usize]) -> bool {
        self.reach.get(&alpha).is_some_and(|touched| {
            cluster
                .members()
                .iter()
                .any(|member| touched.contains(&components[*member]))
        })
    }
}

/// Runs both merge phases over a local partition.
pub(crate) struct AlphaMerger<'a, D: ?Sized> {
    source: &'a D,
    constraints: &'a ConstraintGraph,
}

impl<'a, D: DataSource + ?Sized> AlphaMerger<'a, D> {
    pub(crate) fn new(source: &'a D, constraints: &'a ConstraintGraph) -> Self {
        Self {
            source,
            constraints,
        }
    }

    /// Merges `partition` into final clusters.
    ///
    /// # Errors
    /// Returns [`CdbscanError::DataSource`] when a distance cannot be read and
    /// [`CdbscanError::MergeDidNotConverge`] when growth does not settle within
    /// `N + 1` passes.
    #[instrument(
        name = "cdbscan.merge_phase",
        err,
        skip(self, partition),
        fields(
            local_clusters = partition.clusters.len(),
            noise = partition.noise.len(),
        ),
    )]
    pub(crate) fn merge(&self, partition: LocalPartition) -> Result<MergeOutcome> {
        let LocalPartition {
            clusters,
            components,
            ..
        } = partition;
        let items = components.len();
        let mut table = MergeTable::new(items, clusters);

        self.seed_alphas(&mut table);
        let alpha_clusters = table.alphas().count();
        self.separate_noise(&mut table);

        let mut outcome = MergeOutcome {
            assignments: Vec::new(),
            cluster_count: 0,
            alpha_clusters,
            passes: 0,
            absorbed: 0,
            vetoed: 0,
        };
        self.grow_alphas(&mut table, &components, &mut outcome)?;

        let (assignments, cluster_count) = label_points(&table);
        outcome.assignments = assignments;
        outcome.cluster_count = cluster_count;
        Ok(outcome)
    }

    /// Phase A: groups must-link classes that touch a common local cluster
    /// and seeds each group.
    fn seed_alphas(&self, table: &mut MergeTable) {
        let classes = self.constraints.must_link_classes();
        let touched: Vec<Vec<usize>> = classes
            .iter()
            .map(|class| table.owners_of(class))
            .collect();

        let mut linked = UnionFind::new(classes.len());
        let mut first_class: HashMap<usize, usize> = HashMap::new();
        for (class, slots) in touched.iter().enumerate() {
            for &slot in slots {
                match first_class.entry(slot) {
                    Entry::Occupied(entry) => {
                        linked.union(*entry.get(), class);
                    }
                    Entry::Vacant(entry) => {
                        entry.insert(class);
                    }
                }
            }
        }

        let mut group_of_root = HashMap::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for class in 0..classes.len() {
            let root = linked.find(class);
            let group = *group_of_root.entry(root).or_insert_with(|| {
                groups.push(Vec::new());
                groups.len() - 1
            });
            groups[group].push(class);
        }

        for group in groups {
            self.seed_group(table, &classes, &touched, &group);
        }
    }

    /// Seeds one alpha holding the group and every cluster it touches, or,
    /// when that union holds a cannot-link pair, one alpha per class with the
    /// class members detached from their clusters.
    fn seed_group(
        &self,
        table: &mut MergeTable,
        classes: &[Vec<usize>],
        touched: &[Vec<usize>],
        group: &[usize],
    ) {
        let mut slots: Vec<usize> = group
            .iter()
            .flat_map(|&class| touched[class].iter().copied())
            .collect();
        slots.sort_unstable();
        slots.dedup();
        let mut members: Vec<usize> = group
            .iter()
            .flat_map(|&class| classes[class].iter().copied())
            .collect();
        members.sort_unstable();

        // Noise members join as promoted singletons.
        let mut union = members.clone();
        for &slot in &slots {
            if let Some(cluster) = table.cluster(slot) {
                union.extend_from_slice(cluster.members());
            }
        }
        union.sort_unstable();
        union.dedup();

        if !self.constraints.contains_forbidden_pair(&union) {
            for &slot in &slots {
                table.take(slot);
            }
            table.insert(LocalCluster::new(ClusterKind::Alpha, union));
            return;
        }

        debug!(
            classes = group.len(),
            clusters = slots.len(),
            "must-link classes detached from clusters holding a cannot-link pair"
        );
        for &slot in &slots {
            table.detach(slot, &members);
        }
        for &class in group {
            table.insert(LocalCluster::new(ClusterKind::Alpha, classes[class].clone()));
        }
    }

    /// Keeps noise points on both ends of a cannot-link pair as singleton
    /// clusters.
    fn separate_noise(&self, table: &mut MergeTable) {
        if !self.constraints.has_cannot_links() {
            return;
        }
        let mut stranded: Vec<usize> = self
            .constraints
            .cannot_link_pairs()
            .into_iter()
            .filter(|&(left, right)| table.owner[left].is_none() && table.owner[right].is_none())
            .flat_map(|(left, right)| [left, right])
            .collect();
        stranded.sort_unstable();
        stranded.dedup();
        if stranded.is_empty() {
            return;
        }

        debug!(points = stranded.len(), "cannot-linked noise kept as singletons");
        for point in stranded {
            table.insert(LocalCluster::new(ClusterKind::ConstraintBroken, vec![point]));
        }
    }

    /// Phase B: absorb reachable clusters, closest first, until a pass merges
    /// nothing.
    fn grow_alphas(
        &self,
        table: &mut MergeTable,
        components: &[usize],
        outcome: &mut MergeOutcome,
    ) -> Result<()> {
        let limit = components.len() + 1;
        let mut frontier = Frontier::new(table, components);
        loop {
            if outcome.passes == limit {
                return Err(CdbscanError::MergeDidNotConverge {
                    passes: outcome.passes,
                });
            }
            outcome.passes += 1;
            let absorbed = self.grow_once(table, components, &mut frontier, outcome)?;
            debug!(pass = outcome.passes, absorbed, "merge pass completed");
            if !absorbed {
                return Ok(());
            }
        }
    }

    /// Tries candidates closest first and stops at the first absorption.
    ///
    /// A vetoed cluster sits out the rest of the pass: it does not fall back
    /// to a farther alpha.
    fn grow_once(
        &self,
        table: &mut MergeTable,
        components: &[usize],
        frontier: &mut Frontier,
        outcome: &mut MergeOutcome,
    ) -> Result<bool> {
        let mut blocked = HashSet::new();
        while let Some(candidate) =
            self.closest_candidate(table, components, frontier, &blocked)?
        {
            let (Some(cluster), Some(alpha)) =
                (table.cluster(candidate.cluster), table.cluster(candidate.alpha))
            else {
                return Ok(false);
            };
            if self
                .constraints
                .forbids_between(cluster.members(), alpha.members())
            {
                debug!(
                    cluster = cluster.smallest(),
                    alpha = candidate.alpha,
                    gap = candidate.gap,
                    "cannot-link vetoed merge"
                );
                blocked.insert(candidate.cluster);
                outcome.vetoed += 1;
                telemetry::record_vetoed_merge();
                continue;
            }

            self.refresh_gaps(table, components, frontier, candidate)?;
            table.absorb(candidate.alpha, candidate.cluster);
            outcome.absorbed += 1;
            telemetry::record_alpha_merge();
            return Ok(true);
        }
        Ok(false)
    }

    /// Returns the unblocked pending cluster with the smallest gap to a
    /// reachable alpha. Exact ties go to the pending cluster with the smaller
    /// point index, then to the lower alpha slot.
    fn closest_candidate(
        &self,
        table: &MergeTable,
        components: &[usize],
        frontier: &mut Frontier,
        blocked: &HashSet<usize>,
    ) -> Result<Option<Candidate>> {
        let mut best: Option<Candidate> = None;
        for slot in table.pending() {
            if blocked.contains(&slot) {
                continue;
            }
            let Some(cluster) = table.cluster(slot) else {
                continue;
            };
            for (alpha_slot, alpha) in table.alphas() {
                if !frontier.reaches(alpha_slot, cluster, components) {
                    continue;
                }
                let gap = match frontier.gaps.entry((slot, alpha_slot)) {
                    Entry::Occupied(entry) => *entry.get(),
                    Entry::Vacant(entry) => {
                        *entry.insert(self.min_gap(cluster.members(), alpha.members())?)
                    }
                };
                if best.is_none_or(|closest| gap < closest.gap) {
                    best = Some(Candidate {
                        cluster: slot,
                        alpha: alpha_slot,
                        gap,
                    });
                }
            }
        }
        Ok(best)
    }

    /// Lowers cached gaps to `candidate.alpha` by the distance to the cluster
    /// it is about to absorb.
    fn refresh_gaps(
        &self,
        table: &MergeTable,
        components: &[usize],
        frontier: &mut Frontier,
        candidate: Candidate,
    ) -> Result<()> {
        let Some(absorbed) = table.cluster(candidate.cluster) else {
            return Ok(());
        };
        frontier
            .gaps
            .retain(|&(pending, _), _| pending != candidate.cluster);
        for (&(pending, alpha), gap) in &mut frontier.gaps {
            if alpha != candidate.alpha {
                continue;
            }
            if let Some(cluster) = table.cluster(pending) {
                *gap = gap.min(self.min_gap(cluster.members(), absorbed.members())?);
            }
        }
        if let Some(touched) = frontier.reach.get_mut(&candidate.alpha) {
            touched.extend(absorbed.members().iter().map(|&m| components[m]));
        }
        Ok(())
    }

    fn min_gap(&self, left: &[usize], right: &[usize]) -> Result<f32> {
        let mut closest = f32::INFINITY;
        for &a in left {
            for &b in right {
                let distance = checked_distance(self.source, a, b)
                    .map_err(|error| CdbscanError::data_source(self.source.name(), error))?;
                closest = closest.min(distance);
                if closest == 0.0 {
                    return Ok(closest);
                }
            }
        }
        Ok(closest)
    }
}

/// Numbers surviving clusters by the first point index that reaches them.
fn label_points(table: &MergeTable) -> (Vec<Option<ClusterId>>, usize) {
    let mut ids: HashMap<usize, ClusterId> = HashMap::new();
    let mut next = 0_u64;
    let mut assignments = Vec::with_capacity(table.owner.len());
    for &owner in &table.owner {
        let label = owner.map(|slot| {
            *ids.entry(slot).or_insert_with(|| {
                let id = ClusterId::new(next);
                next += 1;
                id
            })
        });
        assignments.push(label);
    }
    (assignments, ids.len())
}

#[cfg(test)]
mod tests {
    use rstest::rstest;

    use super::*;
    use crate::{constraints::Constraints, dataset::DenseSource};

    fn line(xs: &[f32]) -> DenseSource {
        let rows: Vec<Vec<f32>> = xs.iter().map(|&x| vec![x]).collect();
        DenseSource::try_new("line", &rows).expect("rows are valid")
    }

    fn core(members: &[usize]) -> LocalCluster {
        LocalCluster::new(ClusterKind::Core, members.to_vec())
    }

    fn partition(
        clusters: Vec<LocalCluster>,
        noise: &[usize],
        components: &[usize],
    ) -> LocalPartition {
        LocalPartition {
            clusters,
            noise: noise.to_vec(),
            components: components.to_vec(),
        }
    }

    fn merge(
        source: &DenseSource,
        constraints: &Constraints,
        partition: LocalPartition,
    ) -> MergeOutcome {
        let graph = ConstraintGraph::new(source.len(), constraints).expect("valid constraints");
        AlphaMerger::new(source, &graph)
            .merge(partition)
            .expect("merge succeeds")
    }

    fn labels(outcome: &MergeOutcome) -> Vec<i64> {
        outcome
            .assignments
            .iter()
            .map(|label| label.map_or(-1, |id| id.get() as i64))
            .collect()
    }

    #[rstest]
    fn unconstrained_partition_keeps_local_clusters() {
        let source = line(&[0.0, 1.0, 9.0, 10.0, 30.0]);
        let outcome = merge(
            &source,
            &Constraints::new(),
            partition(vec![core(&[0, 1]), core(&[2, 3])], &[4], &[0, 0, 2, 2, 4]),
        );
        assert_eq!(labels(&outcome), vec![0, 0, 1, 1, -1]);
        assert_eq!(outcome.cluster_count, 2);
        assert_eq!(outcome.alpha_clusters, 0);
        assert_eq!(outcome.passes, 1);
    }

    #[rstest]
    fn must_link_unions_clusters_and_promotes_noise() {
        let source = line(&[0.0, 1.0, 9.0, 10.0, 30.0]);
        let constraints = Constraints::new()
            .with_must_link(1, 2)
            .with_must_link(4, 0);
        let outcome = merge(
            &source,
            &constraints,
            partition(vec![core(&[0, 1]), core(&[2, 3])], &[4], &[0, 0, 2, 2, 4]),
        );
        assert_eq!(labels(&outcome), vec![0, 0, 0, 0, 0]);
        assert_eq!(outcome.alpha_clusters, 1);
    }

    #[rstest]
    fn blocked_union_detaches_class_members() {
        let source = line(&[0.0, 1.0, 2.0, 20.0, 21.0, 22.0]);
        let constraints = Constraints::new()
            .with_must_link(0, 3)
            .with_cannot_link(2, 5);
        let outcome = merge(
            &source,
            &constraints,
            partition(
                vec![core(&[0, 1, 2]), core(&[3, 4, 5])],
                &[],
                &[0, 0, 0, 3, 3, 3],
            ),
        );
        // {1, 2} rejoins the alpha first; {4, 5} is then vetoed by (2, 5).
        assert_eq!(labels(&outcome), vec![0, 0, 0, 0, 1, 1]);
        assert_eq!(outcome.absorbed, 1);
        assert_eq!(outcome.vetoed, 1);
        assert_eq!(outcome.passes, 2);
    }

    /// Classes {a1, a2} and {b1, b2} share cluster {a1, b1, x}; a2 sits with y,
    /// and y cannot link to b2. Both layouts must detach both classes.
    #[rstest]
    #[case::a_class_first(&[0, 1, 2], &[3, 4], &[5], (0, 3), (1, 5), (4, 5))]
    #[case::b_class_first(&[0, 1, 2], &[4, 5], &[3], (1, 5), (0, 3), (4, 3))]
    fn overlapping_classes_are_seeded_together(
        #[case] shared: &[usize],
        #[case] with_y: &[usize],
        #[case] noise: &[usize],
        #[case] a_class: (usize, usize),
        #[case] b_class: (usize, usize),
        #[case] blocked: (usize, usize),
    ) {
        let source = line(&[0.0, 10.0, 20.0, 30.0, 40.0, 50.0]);
        let constraints = Constraints::new()
            .with_must_link(a_class.0, a_class.1)
            .with_must_link(b_class.0, b_class.1)
            .with_cannot_link(blocked.0, blocked.1);
        let outcome = merge(
            &source,
            &constraints,
            partition(
                vec![core(shared), core(with_y)],
                noise,
                &[0, 1, 2, 3, 4, 5],
            ),
        );
        assert_eq!(labels(&outcome), vec![0, 1, 2, 0, 3, 1]);
        assert_eq!(outcome.alpha_clusters, 2);
    }

    #[rstest]
    #[case::ascending(&[0.0, 1.0, 2.0, 3.0], (0, 1), (2, 3), vec![0, 0, 0, 1])]
    #[case::descending(&[3.0, 2.0, 1.0, 0.0], (3, 2), (1, 0), vec![0, 1, 1, 1])]
    fn closest_cluster_is_absorbed_first(
        #[case] xs: &[f32],
        #[case] must_link: (usize, usize),
        #[case] cannot_link: (usize, usize),
        #[case] expected: Vec<i64>,
    ) {
        let source = line(xs);
        let constraints = Constraints::new()
            .with_must_link(must_link.0, must_link.1)
            .with_cannot_link(cannot_link.0, cannot_link.1);
        let singletons = (0..4)
            .map(|point| LocalCluster::new(ClusterKind::ConstraintBroken, vec![point]))
            .collect();
        let outcome = merge(
            &source,
            &constraints,
            partition(singletons, &[], &[0, 0, 0, 0]),
        );
        // x = 2 joins the alpha at x = {0, 1}; x = 3 is then vetoed.
        assert_eq!(labels(&outcome), expected);
        assert_eq!(outcome.absorbed, 1);
        assert_eq!(outcome.vetoed, 1);
    }

    #[rstest]
    fn cannot_linked_noise_stays_apart() {
        let source = line(&[0.0, 100.0, 200.0, 201.0]);
        let constraints = Constraints::new().with_cannot_link(0, 1);
        let outcome = merge(
            &source,
            &constraints,
            partition(vec![core(&[2, 3])], &[0, 1], &[0, 1, 2, 2]),
        );
        assert_eq!(labels(&outcome), vec![0, 1, 2, 2]);
        assert_eq!(outcome.cluster_count, 3);
    }

    #[rstest]
    fn noise_with_a_clustered_partner_stays_noise() {
        let source = line(&[0.0, 100.0, 101.0]);
        let constraints = Constraints::new().with_cannot_link(0, 1);
        let outcome = merge(
            &source,
            &constraints,
            partition(vec![core(&[1, 2])], &[0], &[0, 1, 1]),
        );
        assert_eq!(labels(&outcome), vec![-1, 0, 0]);
    }

    #[rstest]
    fn unreachable_alpha_is_not_a_candidate() {
        let source = line(&[0.0, 1.0, 3.0]);
        let constraints = Constraints::new().with_must_link(0, 1);
        let outcome = merge(
            &source,
            &constraints,
            partition(
                vec![LocalCluster::new(ClusterKind::ConstraintBroken, vec![2])],
                &[0, 1],
                &[0, 1, 2],
            ),
        );
        assert_eq!(labels(&outcome), vec![0, 0, 1]);
        assert_eq!(outcome.absorbed, 0);
    }

    #[rstest]
    fn equidistant_alphas_prefer_the_lowest_id() {
        // Point 2 sits halfway between the alphas {0, 1} and {3, 4}.
        let source = line(&[0.0, 1.0, 2.0, 3.0, 4.0]);
        let constraints = Constraints::new()
            .with_must_link(0, 1)
            .with_must_link(3, 4);
        let outcome = merge(
            &source,
            &constraints,
            partition(
                vec![LocalCluster::new(ClusterKind::ConstraintBroken, vec![2])],
                &[0, 1, 3, 4],
                &[0, 0, 0, 0, 0],
            ),
        );
        assert_eq!(labels(&outcome), vec![0, 0, 0, 1, 1]);
    }

    #[rstest]
    fn nearer_alpha_wins_over_lower_id() {
        let source = line(&[0.0, 1.0, 2.5, 3.0, 4.0]);
        let constraints = Constraints::new()
            .with_must_link(0, 1)
            .with_must_link(3, 4);
        let outcome = merge(
            &source,
            &constraints,
            partition(
                vec![LocalCluster::new(ClusterKind::ConstraintBroken, vec![2])],
                &[0, 1, 3, 4],
                &[0, 0, 0, 0, 0],
            ),
        );
        assert_eq!(labels(&outcome), vec![0, 0, 1, 1, 1]);
    }

    #[rstest]
    fn veto_does_not_fall_back_to_another_alpha() {
        let source = line(&[0.0, 1.0, 2.0, 3.5, 4.5]);
        let constraints = Constraints::new()
            .with_must_link(0, 1)
            .with_must_link(3, 4)
            .with_cannot_link(2, 1);
        let outcome = merge(
            &source,
            &constraints,
            partition(
                vec![LocalCluster::new(ClusterKind::ConstraintBroken, vec![2])],
                &[0, 1, 3, 4],
                &[0, 0, 0, 0, 0],
            ),
        );
        assert_eq!(labels(&outcome), vec![0, 0, 1, 2, 2]);
        assert_eq!(outcome.vetoed, 1);
    }
}
