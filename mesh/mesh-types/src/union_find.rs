//! Disjoint-set forest over dense ids.

/// Union-find with path compression.
///
/// Merging always makes the smaller root the parent, so the representative
/// of every group is its smallest member.
///
/// # Example
///
/// ```
/// use mesh_types::DisjointSets;
///
/// let mut sets = DisjointSets::new(5);
/// sets.merge(3, 1);
/// sets.merge(4, 3);
/// assert_eq!(sets.find(4), 1);
/// assert_eq!(sets.groups(false), vec![vec![1, 3, 4]]);
/// ```
#[derive(Debug, Clone)]
pub struct DisjointSets {
    parent: Vec<usize>,
}

impl DisjointSets {
    /// Create `n` singleton sets.
    #[must_use]
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    /// Number of elements.
    #[must_use]
    pub fn len(&self) -> usize {
        self.parent.len()
    }

    /// Check whether there are no elements.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of the set containing `x`.
    ///
    /// # Panics
    ///
    /// Panics if `x` is out of range.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    /// Join the sets containing `a` and `b`.
    pub fn merge(&mut self, a: usize, b: usize) {
        let ra = self.find(a);
        let rb = self.find(b);
        match ra.cmp(&rb) {
            std::cmp::Ordering::Less => self.parent[rb] = ra,
            std::cmp::Ordering::Greater => self.parent[ra] = rb,
            std::cmp::Ordering::Equal => {}
        }
    }

    /// Members of every set, each sorted ascending, ordered by representative.
    ///
    /// Singleton sets are included only when `include_singletons` is set.
    pub fn groups(&mut self, include_singletons: bool) -> Vec<Vec<usize>> {
        let n = self.parent.len();
        let mut slot = vec![usize::MAX; n];
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for i in 0..n {
            let r = self.find(i);
            if slot[r] == usize::MAX {
                slot[r] = groups.len();
                groups.push(Vec::new());
            }
            groups[slot[r]].push(i);
        }
        if !include_singletons {
            groups.retain(|g| g.len() > 1);
        }
        groups
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn representative_is_smallest() {
        let mut sets = DisjointSets::new(6);
        sets.merge(5, 4);
        sets.merge(4, 2);
        sets.merge(0, 1);
        assert_eq!(sets.find(5), 2);
        assert_eq!(sets.find(1), 0);
        assert_eq!(sets.find(3), 3);
    }

    #[test]
    fn groups_with_and_without_singletons() {
        let mut sets = DisjointSets::new(5);
        sets.merge(0, 2);
        assert_eq!(sets.groups(true), vec![vec![0, 2], vec![1], vec![3], vec![4]]);
        assert_eq!(sets.groups(false), vec![vec![0, 2]]);
    }

    #[test]
    fn merge_is_idempotent() {
        let mut sets = DisjointSets::new(3);
        sets.merge(1, 2);
        sets.merge(2, 1);
        assert_eq!(sets.groups(false), vec![vec![1, 2]]);
    }
}
