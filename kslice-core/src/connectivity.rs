//! Disjoint-set forest with split.
//!
//! Unlike a textbook union-find, every parent pointer here is a real edge:
//! `union(x, y)` links `x` and `y` themselves (after re-rooting the absorbed
//! side at its endpoint) rather than their representatives. The forest is
//! therefore a rooted copy of the current edge set, and removing any edge that
//! is still present is a matter of detaching a child from its parent and
//! fixing the sizes on the way up.
//!
//! No path compression and no union by rank: both would rewrite links that no
//! longer correspond to edges.

use crate::errors::ConnectivityError;

/// The last union performed, kept so that undoing it restores the exact
/// previous layout (including which element was the representative).
#[derive(Debug, Clone, Copy)]
struct UnionRecord {
    child: usize,
    parent: usize,
    previous_root: usize,
}

/// Partition of `{0..n-1}` into connected components under edge insertion
/// and removal.
///
/// `sizes[v]` is the number of elements in the subtree hanging from `v`, so
/// for a representative it is the size of its component.
#[derive(Debug, Clone)]
pub struct ConnectivityTracker {
    parents: Vec<usize>,
    sizes: Vec<usize>,
    last_union: Option<UnionRecord>,
}

impl ConnectivityTracker {
    /// Create a tracker with `len` singleton components.
    pub fn new(len: usize) -> Self {
        Self {
            parents: (0..len).collect(),
            sizes: vec![1; len],
            last_union: None,
        }
    }

    /// Number of tracked elements.
    pub fn len(&self) -> usize {
        self.parents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parents.is_empty()
    }

    /// Representative of the component containing `x`.
    pub fn find(&self, x: usize) -> Result<usize, ConnectivityError> {
        self.check(x)?;
        Ok(self.root_of(x))
    }

    /// Whether `x` and `y` are in the same component.
    pub fn connected(&self, x: usize, y: usize) -> Result<bool, ConnectivityError> {
        Ok(self.find(x)? == self.find(y)?)
    }

    /// Size of the component containing `x`.
    pub fn component_size(&self, x: usize) -> Result<usize, ConnectivityError> {
        Ok(self.sizes[self.find(x)?])
    }

    /// Number of components.
    pub fn component_count(&self) -> usize {
        (0..self.len()).filter(|&v| self.is_root(v)).count()
    }

    /// Join the components of `x` and `y` through the edge `(x, y)`.
    ///
    /// The endpoint on the smaller side (on a tie, `y`) becomes the child of
    /// the other endpoint.
    pub fn union(&mut self, x: usize, y: usize) -> Result<(), ConnectivityError> {
        self.check(x)?;
        self.check(y)?;
        if x == y {
            return Err(ConnectivityError::SelfLoop(x));
        }

        let root_x = self.root_of(x);
        let root_y = self.root_of(y);
        if root_x == root_y {
            return Err(ConnectivityError::AlreadyConnected { x, y });
        }

        let (child, parent, previous_root) = if self.sizes[root_x] >= self.sizes[root_y] {
            (y, x, root_y)
        } else {
            (x, y, root_x)
        };

        self.reroot(child);
        self.parents[child] = parent;
        self.add_along_path(parent, self.sizes[child], true);
        self.last_union = Some(UnionRecord {
            child,
            parent,
            previous_root,
        });

        Ok(())
    }

    /// Remove the edge `(x, y)`; one of them must be the direct parent of the
    /// other.
    ///
    /// Splitting the edge created by the most recent union restores the
    /// tracker exactly as it was before that union.
    pub fn split(&mut self, x: usize, y: usize) -> Result<(), ConnectivityError> {
        self.check(x)?;
        self.check(y)?;

        let (child, parent) = if x != y && self.parents[x] == y {
            (x, y)
        } else if x != y && self.parents[y] == x {
            (y, x)
        } else {
            return Err(ConnectivityError::NotAdjacent { x, y });
        };

        self.add_along_path(parent, self.sizes[child], false);
        self.parents[child] = child;

        if let Some(record) = self.last_union.take() {
            if record.child == child && record.parent == parent && record.previous_root != child {
                self.reroot(record.previous_root);
            }
        }

        Ok(())
    }

    /// Component sizes, largest first.
    pub fn component_sizes(&self) -> Vec<usize> {
        let mut sizes = Vec::new();
        self.fill_component_sizes(&mut sizes);
        sizes
    }

    /// Like [`component_sizes`](Self::component_sizes) but reuses `out`.
    pub fn fill_component_sizes(&self, out: &mut Vec<usize>) {
        out.clear();
        out.extend(
            (0..self.len())
                .filter(|&v| self.is_root(v))
                .map(|v| self.sizes[v]),
        );
        out.sort_unstable_by(|a, b| b.cmp(a));
    }

    fn check(&self, x: usize) -> Result<(), ConnectivityError> {
        if x < self.len() {
            Ok(())
        } else {
            Err(ConnectivityError::OutOfRange {
                index: x,
                len: self.len(),
            })
        }
    }

    #[inline]
    fn is_root(&self, x: usize) -> bool {
        self.parents[x] == x
    }

    fn root_of(&self, mut x: usize) -> usize {
        while !self.is_root(x) {
            x = self.parents[x];
        }
        x
    }

    /// Adjust the size of `start` and of every ancestor up to the root.
    fn add_along_path(&mut self, start: usize, amount: usize, grow: bool) {
        let mut current = start;
        loop {
            if grow {
                self.sizes[current] += amount;
            } else {
                self.sizes[current] -= amount;
            }
            if self.is_root(current) {
                break;
            }
            current = self.parents[current];
        }
    }

    /// Make `v` the representative of its component by reversing the links
    /// between `v` and the current root.
    fn reroot(&mut self, v: usize) {
        if self.is_root(v) {
            return;
        }

        let total = self.sizes[self.root_of(v)];

        let mut previous = v;
        let mut previous_old_size = self.sizes[v];
        let mut current = self.parents[v];
        self.parents[v] = v;
        self.sizes[v] = total;

        loop {
            let next = self.parents[current];
            let was_root = next == current;
            let current_old_size = self.sizes[current];

            // Everything except the subtree we came from now hangs below `current`.
            self.parents[current] = previous;
            self.sizes[current] = total - previous_old_size;

            if was_root {
                break;
            }
            previous = current;
            previous_old_size = current_old_size;
            current = next;
        }
    }
}

/// Two trackers are equal when their forests and sizes are; the remembered
/// last union is bookkeeping and does not take part.
impl PartialEq for ConnectivityTracker {
    fn eq(&self, other: &Self) -> bool {
        self.parents == other.parents && self.sizes == other.sizes
    }
}

impl Eq for ConnectivityTracker {}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};
    use std::collections::VecDeque;

    /// Component sizes of the graph `(0..n, edges)` computed by BFS.
    fn bfs_component_sizes(n: usize, edges: &[(usize, usize)]) -> Vec<usize> {
        let mut adjacency = vec![Vec::new(); n];
        for &(u, v) in edges {
            adjacency[u].push(v);
            adjacency[v].push(u);
        }

        let mut seen = vec![false; n];
        let mut sizes = Vec::new();
        for start in 0..n {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            let mut queue = VecDeque::from([start]);
            let mut size = 0;
            while let Some(v) = queue.pop_front() {
                size += 1;
                for &w in &adjacency[v] {
                    if !seen[w] {
                        seen[w] = true;
                        queue.push_back(w);
                    }
                }
            }
            sizes.push(size);
        }
        sizes.sort_unstable_by(|a, b| b.cmp(a));
        sizes
    }

    fn random_pair_in_different_components(
        tracker: &ConnectivityTracker,
        rng: &mut StdRng,
    ) -> Option<(usize, usize)> {
        if tracker.component_count() < 2 {
            return None;
        }
        loop {
            let x = rng.gen_range(0..tracker.len());
            let y = rng.gen_range(0..tracker.len());
            if !tracker.connected(x, y).unwrap() {
                return Some((x, y));
            }
        }
    }

    #[test]
    fn test_new_tracker_is_all_singletons() {
        let tracker = ConnectivityTracker::new(5);

        assert_eq!(tracker.len(), 5);
        assert_eq!(tracker.component_count(), 5);
        assert_eq!(tracker.component_sizes(), vec![1, 1, 1, 1, 1]);
        for v in 0..5 {
            assert_eq!(tracker.find(v).unwrap(), v);
        }
    }

    #[test]
    fn test_union_tie_attaches_y_under_x() {
        let mut tracker = ConnectivityTracker::new(4);
        tracker.union(2, 3).unwrap();

        assert_eq!(tracker.find(3).unwrap(), 2);
        assert_eq!(tracker.component_size(3).unwrap(), 2);
        assert_eq!(tracker.component_sizes(), vec![2, 1, 1]);
    }

    #[test]
    fn test_union_attaches_smaller_side() {
        let mut tracker = ConnectivityTracker::new(5);
        tracker.union(0, 1).unwrap();
        tracker.union(1, 2).unwrap();
        // {3} is smaller than {0, 1, 2}, so 3 goes under 2 even though it is `x`.
        tracker.union(3, 2).unwrap();

        assert_eq!(tracker.find(3).unwrap(), 0);
        assert_eq!(tracker.component_sizes(), vec![4, 1]);
    }

    #[test]
    fn test_union_between_non_representatives() {
        let mut tracker = ConnectivityTracker::new(6);
        tracker.union(0, 1).unwrap();
        tracker.union(1, 2).unwrap();
        tracker.union(3, 4).unwrap();
        tracker.union(4, 5).unwrap();

        tracker.union(2, 5).unwrap();

        assert_eq!(tracker.component_sizes(), vec![6]);
        assert!(tracker.connected(0, 3).unwrap());
        // Every earlier edge is still splittable.
        tracker.split(0, 1).unwrap();
        assert_eq!(tracker.component_sizes(), vec![5, 1]);
        tracker.split(4, 5).unwrap();
        assert_eq!(tracker.component_sizes(), vec![3, 2, 1]);
    }

    #[test]
    fn test_union_rejects_invalid_input() {
        let mut tracker = ConnectivityTracker::new(3);

        assert_eq!(tracker.union(1, 1), Err(ConnectivityError::SelfLoop(1)));
        assert_eq!(
            tracker.union(0, 3),
            Err(ConnectivityError::OutOfRange { index: 3, len: 3 })
        );

        tracker.union(0, 1).unwrap();
        assert_eq!(
            tracker.union(1, 0),
            Err(ConnectivityError::AlreadyConnected { x: 1, y: 0 })
        );
    }

    #[test]
    fn test_split_requires_direct_link() {
        let mut tracker = ConnectivityTracker::new(3);
        tracker.union(0, 1).unwrap();
        tracker.union(1, 2).unwrap();

        assert_eq!(
            tracker.split(0, 2),
            Err(ConnectivityError::NotAdjacent { x: 0, y: 2 })
        );
        assert_eq!(
            tracker.split(1, 1),
            Err(ConnectivityError::NotAdjacent { x: 1, y: 1 })
        );
        assert_eq!(tracker.component_sizes(), vec![3]);
    }

    #[test]
    fn test_union_then_split_restores_exact_state() {
        let mut rng = StdRng::seed_from_u64(7);

        for len in [2usize, 10, 50, 300] {
            let mut tracker = ConnectivityTracker::new(len);
            let mut edges: Vec<(usize, usize)> = Vec::new();

            for _ in 0..(3 * len) {
                // Walk the forest around a bit: grow it, occasionally cut an edge.
                if !edges.is_empty() && rng.gen_bool(0.3) {
                    let (u, v) = edges.swap_remove(rng.gen_range(0..edges.len()));
                    tracker.split(u, v).unwrap();
                } else if let Some((x, y)) = random_pair_in_different_components(&tracker, &mut rng)
                {
                    tracker.union(x, y).unwrap();
                    edges.push((x, y));
                }

                if let Some((x, y)) = random_pair_in_different_components(&tracker, &mut rng) {
                    let before = tracker.clone();
                    let before_roots: Vec<usize> =
                        (0..len).map(|v| before.find(v).unwrap()).collect();

                    tracker.union(x, y).unwrap();
                    tracker.split(x, y).unwrap();

                    assert_eq!(tracker, before);
                    let after_roots: Vec<usize> =
                        (0..len).map(|v| tracker.find(v).unwrap()).collect();
                    assert_eq!(after_roots, before_roots);
                    assert_eq!(tracker.component_sizes(), before.component_sizes());
                }
            }
        }
    }

    #[test]
    fn test_random_edge_churn_matches_bfs() {
        let mut rng = StdRng::seed_from_u64(42);
        let len = 120;
        let mut tracker = ConnectivityTracker::new(len);
        let mut edges: Vec<(usize, usize)> = Vec::new();

        for step in 0..2000 {
            if !edges.is_empty() && rng.gen_bool(0.45) {
                let (u, v) = edges.swap_remove(rng.gen_range(0..edges.len()));
                // Either orientation must be accepted.
                if step % 2 == 0 {
                    tracker.split(u, v).unwrap();
                } else {
                    tracker.split(v, u).unwrap();
                }
            } else if let Some((x, y)) = random_pair_in_different_components(&tracker, &mut rng) {
                tracker.union(x, y).unwrap();
                edges.push((x, y));
            }

            assert_eq!(tracker.component_sizes(), bfs_component_sizes(len, &edges));
            let total: usize = tracker.component_sizes().iter().sum();
            assert_eq!(total, len);
        }
    }

    #[test]
    fn test_fill_component_sizes_reuses_buffer() {
        let mut tracker = ConnectivityTracker::new(4);
        tracker.union(0, 1).unwrap();

        let mut buffer = vec![99; 10];
        tracker.fill_component_sizes(&mut buffer);

        assert_eq!(buffer, vec![2, 1, 1]);
    }
}
