//! Union-find over point ids for must-link equivalence.
//!
//! Union by rank with path halving. Rank ties resolve toward the smaller root
//! id so the representative chosen for a class is stable, although callers
//! only rely on the partition itself.

#[derive(Clone, Debug)]
pub(crate) struct UnionFind {
    parents: Vec<usize>,
    ranks: Vec<u8>,
    components: usize,
}

impl UnionFind {
    pub(crate) fn new(node_count: usize) -> Self {
        Self {
            parents: (0..node_count).collect(),
            ranks: vec![0; node_count],
            components: node_count,
        }
    }

    pub(crate) fn components(&self) -> usize {
        self.components
    }

    /// Returns `true` when the call joined two previously distinct classes.
    pub(crate) fn union(&mut self, left: usize, right: usize) -> bool {
        let left_root = self.find(left);
        let right_root = self.find(right);
        if left_root == right_root {
            return false;
        }

        let left_rank = self.ranks[left_root];
        let right_rank = self.ranks[right_root];
        let (parent, child) = choose_parent_child(left_root, right_root, left_rank, right_rank);

        self.parents[child] = parent;
        if left_rank == right_rank {
            self.ranks[parent] = self.ranks[parent].saturating_add(1);
        }
        self.components -= 1;
        true
    }

    pub(crate) fn find(&mut self, node: usize) -> usize {
        let mut current = node;
        loop {
            let parent = self.parents[current];
            if parent == current {
                return current;
            }
            let grandparent = self.parents[parent];
            self.parents[current] = grandparent;
            current = parent;
        }
    }

    /// Read-only lookup for callers holding a shared borrow.
    pub(crate) fn find_immutable(&self, node: usize) -> usize {
        let mut current = node;
        while self.parents[current] != current {
            current = self.parents[current];
        }
        current
    }
}

fn ordered(first: usize, second: usize) -> (usize, usize) {
    if first <= second {
        (first, second)
    } else {
        (second, first)
    }
}

fn choose_parent_child(
    left_root: usize,
    right_root: usize,
    left_rank: u8,
    right_rank: u8,
) -> (usize, usize) {
    if left_rank > right_rank {
        return (left_root, right_root);
    }
    if right_rank > left_rank {
        return (right_root, left_root);
    }

    ordered(left_root, right_root)
}
