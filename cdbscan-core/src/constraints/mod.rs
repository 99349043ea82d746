//! Pairwise supervision: must-link equivalence and cannot-link vetoes.
//!
//! [`Constraints`] is the caller-facing collection of pairs.
//! [`ConstraintGraph`] validates them against a point count, folds must-link
//! pairs into equivalence classes with a union-find, and indexes cannot-link
//! pairs by their canonical `(min, max)` form so vetoes are constant-time
//! lookups.

pub(crate) mod union_find;

use std::{collections::HashSet, fmt};

use crate::error::{CdbscanError, ConstraintDefect, Result};

use self::union_find::UnionFind;

/// Whether a pair must share a cluster or must be kept apart.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ConstraintKind {
    /// Both points must end in the same final cluster.
    MustLink,
    /// The points must end in different final clusters.
    CannotLink,
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MustLink => f.write_str("must-link"),
            Self::CannotLink => f.write_str("cannot-link"),
        }
    }
}

/// Unordered must-link and cannot-link pairs supplied with a run.
///
/// Pairs are stored as given; duplicates and reversed duplicates are
/// harmless.
///
/// # Examples
/// ```
/// use cdbscan_core::Constraints;
///
/// let constraints = Constraints::new()
///     .with_must_link(0, 3)
///     .with_cannot_link(2, 5);
/// assert_eq!(constraints.must_link(), &[(0, 3)]);
/// assert_eq!(constraints.cannot_link(), &[(2, 5)]);
/// assert!(!constraints.is_empty());
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Constraints {
    must_link: Vec<(usize, usize)>,
    cannot_link: Vec<(usize, usize)>,
}

impl Constraints {
    /// Creates an empty constraint collection.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a collection from explicit pair lists.
    #[must_use]
    pub fn from_pairs(
        must_link: impl IntoIterator<Item = (usize, usize)>,
        cannot_link: impl IntoIterator<Item = (usize, usize)>,
    ) -> Self {
        Self {
            must_link: must_link.into_iter().collect(),
            cannot_link: cannot_link.into_iter().collect(),
        }
    }

    /// Adds a must-link pair.
    #[must_use]
    pub fn with_must_link(mut self, left: usize, right: usize) -> Self {
        self.must_link.push((left, right));
        self
    }

    /// Adds a cannot-link pair.
    #[must_use]
    pub fn with_cannot_link(mut self, left: usize, right: usize) -> Self {
        self.cannot_link.push((left, right));
        self
    }

    /// Returns the must-link pairs in insertion order.
    #[must_use]
    pub fn must_link(&self) -> &[(usize, usize)] {
        &self.must_link
    }

    /// Returns the cannot-link pairs in insertion order.
    #[must_use]
    pub fn cannot_link(&self) -> &[(usize, usize)] {
        &self.cannot_link
    }

    /// Returns `true` when no pairs of either kind are present.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.must_link.is_empty() && self.cannot_link.is_empty()
    }

    fn tagged(&self) -> impl Iterator<Item = (ConstraintKind, usize, usize)> + '_ {
        let must = self
            .must_link
            .iter()
            .map(|&(left, right)| (ConstraintKind::MustLink, left, right));
        let cannot = self
            .cannot_link
            .iter()
            .map(|&(left, right)| (ConstraintKind::CannotLink, left, right));
        must.chain(cannot)
    }
}

/// Returns `(min, max)` for an unordered pair.
pub(crate) fn canonical_pair(left: usize, right: usize) -> (usize, usize) {
    if left <= right {
        (left, right)
    } else {
        (right, left)
    }
}

/// Validated constraint state for a point set of fixed size.
///
/// # Examples
/// ```
/// use cdbscan_core::{ConstraintGraph, Constraints};
///
/// let constraints = Constraints::new()
///     .with_must_link(0, 1)
///     .with_must_link(1, 2)
///     .with_cannot_link(3, 0);
/// let graph = ConstraintGraph::new(4, &constraints)?;
/// assert_eq!(graph.find(0), graph.find(2));
/// assert!(graph.forbids(0, 3));
/// assert!(!graph.has_conflict());
/// # Ok::<(), cdbscan_core::CdbscanError>(())
/// ```
#[derive(Clone, Debug)]
pub struct ConstraintGraph {
    must_link: UnionFind,
    cannot_link: HashSet<(usize, usize)>,
    adjacency: Vec<Vec<usize>>,
}

impl ConstraintGraph {
    /// Validates `constraints` against `items` points and indexes them.
    ///
    /// Contradictions between the two kinds are not an error here; query
    /// [`Self::has_conflict`] or [`Self::first_conflict`] for that.
    ///
    /// # Errors
    /// Returns [`CdbscanError::InvalidConstraint`] for the first pair (must-link
    /// pairs before cannot-link pairs) that names an index `>= items` or links
    /// a point to itself.
    pub fn new(items: usize, constraints: &Constraints) -> Result<Self> {
        for (kind, left, right) in constraints.tagged() {
            validate_pair(kind, left, right, items)?;
        }

        let mut must_link = UnionFind::new(items);
        for &(left, right) in constraints.must_link() {
            must_link.union(left, right);
        }

        let mut cannot_link = HashSet::with_capacity(constraints.cannot_link().len());
        let mut adjacency = vec![Vec::new(); items];
        for &(left, right) in constraints.cannot_link() {
            if cannot_link.insert(canonical_pair(left, right)) {
                adjacency[left].push(right);
                adjacency[right].push(left);
            }
        }
        for neighbours in &mut adjacency {
            neighbours.sort_unstable();
        }

        Ok(Self {
            must_link,
            cannot_link,
            adjacency,
        })
    }

    /// Returns the must-link representative of `index`.
    ///
    /// # Panics
    /// Panics if `index` is not a valid point index.
    #[must_use]
    pub fn find(&self, index: usize) -> usize {
        self.must_link.find_immutable(index)
    }

    /// Returns `true` when must-link forces `left` and `right` together.
    #[must_use]
    pub fn forced_together(&self, left: usize, right: usize) -> bool {
        self.find(left) == self.find(right)
    }

    /// Returns `true` when a cannot-link pair joins `left` and `right`.
    #[must_use]
    pub fn forbids(&self, left: usize, right: usize) -> bool {
        self.cannot_link.contains(&canonical_pair(left, right))
    }

    /// Returns `true` when some cannot-link pair lies inside one must-link class.
    #[must_use]
    pub fn has_conflict(&self) -> bool {
        self.first_conflict().is_some()
    }

    /// Returns the smallest contradicted cannot-link pair, if any.
    #[must_use]
    pub fn first_conflict(&self) -> Option<(usize, usize)> {
        self.cannot_link
            .iter()
            .filter(|&&(left, right)| self.forced_together(left, right))
            .min()
            .copied()
    }

    /// Returns `true` when at least one cannot-link pair was supplied.
    #[must_use]
    pub fn has_cannot_links(&self) -> bool {
        !self.cannot_link.is_empty()
    }

    /// Returns the canonical `(smaller, larger)` cannot-link pairs, sorted.
    #[must_use]
    pub fn cannot_link_pairs(&self) -> Vec<(usize, usize)> {
        let mut pairs: Vec<(usize, usize)> = self.cannot_link.iter().copied().collect();
        pairs.sort_unstable();
        pairs
    }

    /// Returns every must-link class with two or more members.
    ///
    /// Members are sorted ascending and classes are ordered by their smallest
    /// member, so iteration order is independent of how pairs were supplied.
    #[must_use]
    pub fn must_link_classes(&self) -> Vec<Vec<usize>> {
        let items = self.adjacency.len();
        let mut by_root: Vec<Vec<usize>> = vec![Vec::new(); items];
        for index in 0..items {
            by_root[self.find(index)].push(index);
        }
        let mut classes: Vec<Vec<usize>> = by_root
            .into_iter()
            .filter(|members| members.len() > 1)
            .collect();
        classes.sort_unstable_by_key(|members| members[0]);
        classes
    }

    /// Returns `true` when both endpoints of some cannot-link pair are in
    /// `members`, which must be sorted ascending.
    #[must_use]
    pub fn contains_forbidden_pair(&self, members: &[usize]) -> bool {
        self.forbids_between(members, members)
    }

    /// Returns `true` when a cannot-link pair has one endpoint in `left` and
    /// the other in `right`. `right` must be sorted ascending.
    #[must_use]
    pub fn forbids_between(&self, left: &[usize], right: &[usize]) -> bool {
        if !self.has_cannot_links() {
            return false;
        }
        left.iter().any(|&point| {
            self.adjacency.get(point).is_some_and(|partners| {
                partners
                    .iter()
                    .any(|partner| right.binary_search(partner).is_ok())
            })
        })
    }
}

fn validate_pair(kind: ConstraintKind, left: usize, right: usize, items: usize) -> Result<()> {
    let defect = if left >= items || right >= items {
        Some(ConstraintDefect::OutOfRange { items })
    } else if left == right {
        Some(ConstraintDefect::SelfLink)
    } else {
        None
    };
    match defect {
        Some(defect) => Err(CdbscanError::InvalidConstraint {
            kind,
            left,
            right,
            defect,
        }),
        None => Ok(()),
    }
}
