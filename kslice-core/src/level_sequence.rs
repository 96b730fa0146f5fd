//! Canonical level sequences and the free tree enumerator.
//!
//! A level sequence lists the depth of every vertex of a rooted tree in
//! preorder, with the root at index 0 and depth 0. Vertex `i` hangs from the
//! nearest preceding vertex one level up, so the sequence alone determines the
//! tree. In canonical form the subtrees of every vertex appear in
//! non-increasing lexicographic order, which gives each rooted tree exactly
//! one sequence.
//!
//! [`LevelSequence::next`] steps to the canonical predecessor (Beyer and
//! Hedetniemi's successor rule run downwards), starting from a path rooted at
//! its center. Filtering that stream with
//! [`LevelSequence::is_centrally_rooted`] keeps one rooted representative per
//! free tree, which is what [`TreeEnumerator`] yields.

use std::cmp::Ordering;

/// Depths of the vertices of a rooted tree, in preorder.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LevelSequence {
    depths: Vec<usize>,
}

impl LevelSequence {
    /// The path on `order` vertices rooted at its center, longer arm first:
    /// `[0, 1, ..., order / 2, 1, 2, ...]`.
    ///
    /// This is the lexicographically largest centrally rooted sequence and
    /// the starting point of the enumeration.
    pub fn rooted_path(order: usize) -> Self {
        let first_arm = order / 2;
        let depths = (0..order)
            .map(|i| if i <= first_arm { i } else { i - first_arm })
            .collect();
        Self { depths }
    }

    /// Wrap raw depths, returning `None` unless they describe a rooted tree:
    /// root at depth 0 first, and no vertex more than one level below its
    /// predecessor.
    pub fn from_depths(depths: Vec<usize>) -> Option<Self> {
        let (&root, rest) = depths.split_first()?;
        if root != 0 {
            return None;
        }
        let mut previous = root;
        for &depth in rest {
            if depth == 0 || depth > previous + 1 {
                return None;
            }
            previous = depth;
        }
        Some(Self { depths })
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.depths.len()
    }

    pub fn depths(&self) -> &[usize] {
        &self.depths
    }

    /// The vertex `index` hangs from, `None` for the root.
    pub fn parent_of(&self, index: usize) -> Option<usize> {
        let depth = *self.depths.get(index)?;
        if depth == 0 {
            return None;
        }
        (0..index).rev().find(|&j| self.depths[j] == depth - 1)
    }

    /// Step to the next sequence of the enumeration.
    ///
    /// Finds the last vertex deeper than level 1, locates the vertex it hangs
    /// from, and repeats the pattern starting at that parent over the rest of
    /// the sequence. Returns `false` (leaving the sequence untouched) once only
    /// the star is left.
    pub fn next(&mut self) -> bool {
        let order = self.depths.len();
        if order == 0 {
            return false;
        }

        let mut last = order - 1;
        while self.depths[last] == 1 {
            last -= 1;
        }
        if last == 0 {
            return false;
        }

        let depth = self.depths[last];
        let mut source = (0..last)
            .rev()
            .find(|&j| self.depths[j] == depth - 1)
            .unwrap_or(0);

        // The copy deliberately reads positions it has already overwritten:
        // the pattern starting at `source` repeats with period `last - source`.
        for target in last..order {
            self.depths[target] = self.depths[source];
            source += 1;
        }
        true
    }

    /// Whether the root is the canonical center of the underlying free tree.
    ///
    /// The first subtree of the root is its tallest. If another subtree is as
    /// tall, the root is the unique center. If the rest is exactly one level
    /// shorter the tree is bicentral and the root is one of the two centers;
    /// the orientation with the smaller first half wins, and equal sizes fall
    /// back to comparing the two halves as level sequences.
    pub fn is_centrally_rooted(&self) -> bool {
        let depths = &self.depths;
        let order = depths.len();
        if order < 3 {
            return true;
        }

        // `second` becomes the index of the root's second child.
        let mut second = 2;
        let mut first_height = 1;
        while depths[second] != 1 {
            first_height = first_height.max(depths[second]);
            second += 1;
            if second == order {
                return false;
            }
        }

        let rest_height = depths[second..].iter().copied().max().unwrap_or(0);
        match rest_height.cmp(&(first_height - 1)) {
            Ordering::Greater => return true,
            Ordering::Less => return false,
            Ordering::Equal => {}
        }

        let first_size = second - 1;
        let second_size = order - first_size;
        match first_size.cmp(&second_size) {
            Ordering::Less => return true,
            Ordering::Greater => return false,
            Ordering::Equal => {}
        }

        for i in 2..second {
            match (depths[i] - 1).cmp(&depths[i + second - 2]) {
                Ordering::Greater => return false,
                Ordering::Less => return true,
                Ordering::Equal => {}
            }
        }
        true
    }

    /// Vertex degrees of the encoded tree, largest first.
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut degrees = vec![0; self.order()];
        let mut open: Vec<usize> = Vec::with_capacity(self.order());
        for (vertex, &depth) in self.depths.iter().enumerate() {
            open.truncate(depth);
            if let Some(&parent) = open.last() {
                degrees[parent] += 1;
                degrees[vertex] += 1;
            }
            open.push(vertex);
        }
        degrees.sort_unstable_by(|a, b| b.cmp(a));
        degrees
    }
}

/// Yields one centrally rooted level sequence per free tree of a given order.
#[derive(Debug, Clone)]
pub struct TreeEnumerator {
    current: Option<LevelSequence>,
    started: bool,
}

impl TreeEnumerator {
    pub fn new(order: usize) -> Self {
        Self {
            current: (order > 0).then(|| LevelSequence::rooted_path(order)),
            started: false,
        }
    }
}

impl Iterator for TreeEnumerator {
    type Item = LevelSequence;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let sequence = self.current.as_mut()?;
            if !self.started {
                self.started = true;
            } else if !sequence.next() {
                self.current = None;
                return None;
            }

            if sequence.is_centrally_rooted() {
                return Some(sequence.clone());
            }
        }
    }
}

/// Number of non-isomorphic free trees on `order` vertices.
pub fn count_free_trees(order: usize) -> usize {
    TreeEnumerator::new(order).count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seq(depths: &[usize]) -> LevelSequence {
        LevelSequence::from_depths(depths.to_vec()).unwrap()
    }

    #[test]
    fn test_rooted_path_shapes() {
        assert_eq!(LevelSequence::rooted_path(1).depths(), &[0]);
        assert_eq!(LevelSequence::rooted_path(2).depths(), &[0, 1]);
        assert_eq!(LevelSequence::rooted_path(4).depths(), &[0, 1, 2, 1]);
        assert_eq!(LevelSequence::rooted_path(6).depths(), &[0, 1, 2, 3, 1, 2]);
        assert_eq!(
            LevelSequence::rooted_path(7).depths(),
            &[0, 1, 2, 3, 1, 2, 3]
        );
    }

    #[test]
    fn test_from_depths_validation() {
        assert!(LevelSequence::from_depths(vec![]).is_none());
        assert!(LevelSequence::from_depths(vec![1, 2]).is_none());
        assert!(LevelSequence::from_depths(vec![0, 2]).is_none());
        assert!(LevelSequence::from_depths(vec![0, 1, 0]).is_none());
        assert!(LevelSequence::from_depths(vec![0, 1, 2, 1, 1]).is_some());
    }

    #[test]
    fn test_parent_of() {
        let s = seq(&[0, 1, 2, 2, 1, 2]);

        assert_eq!(s.parent_of(0), None);
        assert_eq!(s.parent_of(1), Some(0));
        assert_eq!(s.parent_of(3), Some(1));
        assert_eq!(s.parent_of(4), Some(0));
        assert_eq!(s.parent_of(5), Some(4));
        assert_eq!(s.parent_of(6), None);
    }

    #[test]
    fn test_next_steps_path_to_star_on_four_vertices() {
        let mut s = LevelSequence::rooted_path(4);

        assert!(s.next());
        assert_eq!(s.depths(), &[0, 1, 1, 1]);
        assert!(!s.next());
        assert_eq!(s.depths(), &[0, 1, 1, 1]);
    }

    #[test]
    fn test_next_on_tiny_orders_is_exhausted() {
        for order in 0..=2 {
            let mut s = LevelSequence::rooted_path(order);
            assert!(!s.next());
        }
    }

    #[test]
    fn test_centrally_rooted_cases() {
        // Unique center with two equally tall branches.
        assert!(seq(&[0, 1, 2, 1, 2]).is_centrally_rooted());
        // Root is a leaf of the path.
        assert!(!seq(&[0, 1, 2, 3]).is_centrally_rooted());
        // Root is not a center at all.
        assert!(!seq(&[0, 1, 2, 3, 1]).is_centrally_rooted());
        // Bicentral, smaller half first.
        assert!(seq(&[0, 1, 2, 1, 1]).is_centrally_rooted());
        // Same tree seen from the other center.
        assert!(!seq(&[0, 1, 2, 2, 1]).is_centrally_rooted());
        // Bicentral with equal halves.
        assert!(seq(&[0, 1, 2, 1]).is_centrally_rooted());
        assert!(seq(&[0, 1]).is_centrally_rooted());
    }

    #[test]
    fn test_four_vertices_yield_path_and_star() {
        let trees: Vec<Vec<usize>> = TreeEnumerator::new(4)
            .map(|s| s.depths().to_vec())
            .collect();

        assert_eq!(trees, vec![vec![0, 1, 2, 1], vec![0, 1, 1, 1]]);
    }

    #[test]
    fn test_free_tree_counts() {
        // OEIS A000055, except that order 0 has no trees here.
        let expected = [0, 1, 1, 1, 2, 3, 6, 11, 23, 47, 106, 235, 551, 1301];
        for (order, &count) in expected.iter().enumerate() {
            assert_eq!(count_free_trees(order), count, "order {order}");
        }
    }

    #[test]
    fn test_degree_sequence_from_levels() {
        assert_eq!(seq(&[0, 1, 1, 1]).degree_sequence(), vec![3, 1, 1, 1]);
        assert_eq!(seq(&[0, 1, 2, 1]).degree_sequence(), vec![2, 2, 1, 1]);
        assert_eq!(seq(&[0]).degree_sequence(), vec![0]);
    }
}
