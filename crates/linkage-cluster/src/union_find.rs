//! Disjoint-set forest with union by size and path halving.

#[derive(Debug, Clone)]
pub struct UnionFind {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl UnionFind {
    /// `len` singleton sets, `0..len`.
    pub fn new(len: usize) -> Self {
        Self {
            parent: (0..len).collect(),
            size: vec![1; len],
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Representative of `x`'s set. Panics if `x` is out of range.
    pub fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            let grandparent = self.parent[self.parent[x]];
            self.parent[x] = grandparent;
            x = grandparent;
        }
        x
    }

    /// Merges the sets of `a` and `b`; returns false when they were already one set.
    pub fn union(&mut self, a: usize, b: usize) -> bool {
        let mut ra = self.find(a);
        let mut rb = self.find(b);
        if ra == rb {
            return false;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
        true
    }

    pub fn same_set(&mut self, a: usize, b: usize) -> bool {
        self.find(a) == self.find(b)
    }

    pub fn set_size(&mut self, x: usize) -> usize {
        let root = self.find(x);
        self.size[root]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_as_singletons() {
        let mut sets = UnionFind::new(3);
        assert_eq!(sets.len(), 3);
        for x in 0..3 {
            assert_eq!(sets.find(x), x);
            assert_eq!(sets.set_size(x), 1);
        }
    }

    #[test]
    fn union_is_transitive_and_reports_redundancy() {
        let mut sets = UnionFind::new(5);
        assert!(sets.union(0, 1));
        assert!(sets.union(3, 4));
        assert!(sets.union(1, 4));
        assert!(!sets.union(0, 3));
        assert!(!sets.union(2, 2));
        assert!(sets.same_set(0, 3));
        assert!(!sets.same_set(0, 2));
        assert_eq!(sets.set_size(4), 4);
        assert_eq!(sets.set_size(2), 1);
    }

    #[test]
    fn long_chains_stay_shallow() {
        let n = 10_000;
        let mut sets = UnionFind::new(n);
        for x in 1..n {
            sets.union(x - 1, x);
        }
        let root = sets.find(0);
        assert!((0..n).all(|x| sets.find(x) == root));
        assert_eq!(sets.set_size(n - 1), n);
    }
}
