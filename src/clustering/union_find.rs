// src/clustering/union_find.rs

/// Disjoint-set forest over dense record indices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisjointSet {
    parent: Vec<usize>,
}

impl DisjointSet {
    /// `n` singleton sets, each index its own parent.
    pub fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.parent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parent.is_empty()
    }

    /// Root of `i`, compressing the walked path onto it.
    pub fn find(&mut self, i: usize) -> usize {
        let mut root = i;
        while self.parent[root] != root {
            root = self.parent[root];
        }
        let mut node = i;
        while self.parent[node] != root {
            let next = self.parent[node];
            self.parent[node] = root;
            node = next;
        }
        root
    }

    /// Attach the root of `i` under the root of `j`. Returns false when both
    /// already share a root.
    pub fn union(&mut self, i: usize, j: usize) -> bool {
        let root_i = self.find(i);
        let root_j = self.find(j);
        if root_i == root_j {
            return false;
        }
        self.parent[root_i] = root_j;
        true
    }

    pub fn parents(&self) -> &[usize] {
        &self.parent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_singletons() {
        let mut set = DisjointSet::new(3);
        assert_eq!(set.len(), 3);
        for i in 0..3 {
            assert_eq!(set.find(i), i);
        }
        assert!(DisjointSet::new(0).is_empty());
    }

    #[test]
    fn test_union_root_of_second_wins() {
        let mut set = DisjointSet::new(4);
        assert!(set.union(0, 1));
        assert_eq!(set.find(0), 1);
        assert!(set.union(2, 0));
        assert_eq!(set.find(2), 1);
        assert!(!set.union(0, 2));
        assert_eq!(set.find(3), 3);
    }

    #[test]
    fn test_path_compression() {
        let mut set = DisjointSet::new(4);
        set.union(0, 1);
        set.union(1, 2);
        set.union(2, 3);
        assert_eq!(set.parents(), &[1, 2, 3, 3]);
        assert_eq!(set.find(0), 3);
        assert_eq!(set.parents(), &[3, 3, 3, 3]);
    }
}
