//! Tree graphs and their cheap invariants.
//!
//! A [`TreeGraph`] is either fixed (built from a level sequence, edges never
//! change, components found by BFS) or tracked (built edge by edge, with a
//! [`ConnectivityTracker`] kept in step with every insertion and deletion).

use std::collections::VecDeque;
use std::fmt;

use crate::connectivity::ConnectivityTracker;
use crate::errors::{ConnectivityError, GraphError};
use crate::level_sequence::LevelSequence;

/// An undirected edge, stored with `u < v`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Edge {
    pub u: usize,
    pub v: usize,
}

impl Edge {
    /// Create an edge, normalising the endpoint order.
    pub fn new(a: usize, b: usize) -> Self {
        Self {
            u: a.min(b),
            v: a.max(b),
        }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.u, self.v)
    }
}

#[derive(Debug, Clone)]
enum Components {
    Fixed,
    Tracked(ConnectivityTracker),
}

/// Graph on the vertex set `{0..order-1}` whose edges form a forest.
#[derive(Debug, Clone)]
pub struct TreeGraph {
    order: usize,
    /// Sorted neighbour list of every vertex.
    adjacency: Vec<Vec<usize>>,
    edge_count: usize,
    components: Components,
}

impl TreeGraph {
    /// An edgeless graph whose edges are added with [`add_edge`](Self::add_edge).
    pub fn with_order(order: usize) -> Self {
        Self {
            order,
            adjacency: vec![Vec::new(); order],
            edge_count: 0,
            components: Components::Tracked(ConnectivityTracker::new(order)),
        }
    }

    /// The tree encoded by a level sequence; its edge set is fixed.
    pub fn from_level_sequence(sequence: &LevelSequence) -> Self {
        let order = sequence.order();
        let mut graph = Self {
            order,
            adjacency: vec![Vec::new(); order],
            edge_count: 0,
            components: Components::Fixed,
        };

        // `open[d]` is the latest vertex seen at depth `d`.
        let mut open: Vec<usize> = Vec::with_capacity(order);
        for (vertex, &depth) in sequence.depths().iter().enumerate() {
            open.truncate(depth);
            if let Some(&parent) = open.last() {
                graph.link(parent, vertex);
            }
            open.push(vertex);
        }
        graph
    }

    /// A tracked graph holding the given edges.
    pub fn from_edges(order: usize, edges: &[(usize, usize)]) -> Result<Self, GraphError> {
        let mut graph = Self::with_order(order);
        for &(u, v) in edges {
            graph.add_edge(u, v)?;
        }
        Ok(graph)
    }

    /// Number of vertices.
    pub fn order(&self) -> usize {
        self.order
    }

    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Whether the edge set was fixed at construction.
    pub fn is_fixed(&self) -> bool {
        matches!(self.components, Components::Fixed)
    }

    /// Whether the graph is a spanning tree of its vertex set.
    pub fn is_tree(&self) -> bool {
        self.order > 0
            && self.edge_count == self.order - 1
            && self.connected_component_sizes().len() == 1
    }

    /// Whether `u` and `v` are joined by an edge; `false` for out-of-range
    /// vertices.
    pub fn adjacent(&self, u: usize, v: usize) -> bool {
        v < self.order
            && self
                .adjacency
                .get(u)
                .is_some_and(|list| list.binary_search(&v).is_ok())
    }

    /// Degree of `v`, 0 if out of range.
    pub fn degree(&self, v: usize) -> usize {
        self.adjacency.get(v).map_or(0, Vec::len)
    }

    /// Neighbours of `v` in increasing order.
    pub fn neighbors(&self, v: usize) -> impl Iterator<Item = usize> + '_ {
        self.adjacency.get(v).into_iter().flatten().copied()
    }

    /// Insert the edge `(u, v)`.
    ///
    /// Tracked graphs refuse edges that would close a cycle.
    pub fn add_edge(&mut self, u: usize, v: usize) -> Result<(), GraphError> {
        self.check_endpoints(u, v)?;
        if self.adjacent(u, v) {
            return Err(GraphError::DuplicateEdge(u, v));
        }

        match &mut self.components {
            Components::Fixed => return Err(GraphError::FixedEdgeSet),
            Components::Tracked(tracker) => match tracker.union(u, v) {
                Ok(()) => {}
                Err(ConnectivityError::AlreadyConnected { .. }) => {
                    return Err(GraphError::WouldCreateCycle(u, v));
                }
                Err(e) => return Err(e.into()),
            },
        }

        self.link(u, v);
        Ok(())
    }

    /// Remove the edge `(u, v)`.
    pub fn delete_edge(&mut self, u: usize, v: usize) -> Result<(), GraphError> {
        self.check_endpoints(u, v)?;
        if !self.adjacent(u, v) {
            return Err(GraphError::MissingEdge(u, v));
        }

        match &mut self.components {
            Components::Fixed => return Err(GraphError::FixedEdgeSet),
            Components::Tracked(tracker) => tracker.split(u, v)?,
        }

        unlink_from(&mut self.adjacency[u], v);
        unlink_from(&mut self.adjacency[v], u);
        self.edge_count -= 1;
        Ok(())
    }

    /// All edges, sorted by `(u, v)`.
    ///
    /// The order is what makes edge indices (and so subset walks over them)
    /// stable for a given graph.
    pub fn edges(&self) -> Vec<Edge> {
        let mut edges = Vec::with_capacity(self.edge_count);
        for (u, list) in self.adjacency.iter().enumerate() {
            edges.extend(list.iter().filter(|&&v| v > u).map(|&v| Edge { u, v }));
        }
        edges
    }

    /// Vertex degrees, largest first.
    pub fn degree_sequence(&self) -> Vec<usize> {
        let mut degrees: Vec<usize> = self.adjacency.iter().map(Vec::len).collect();
        degrees.sort_unstable_by(|a, b| b.cmp(a));
        degrees
    }

    /// `counts[d]` is the number of unordered vertex pairs at distance `d`,
    /// for `d` in `1..order`; `counts[0]` is unused and always 0.
    ///
    /// Runs a BFS from every vertex, so O(order²) on a tree.
    pub fn path_count_sequence(&self) -> Vec<usize> {
        let mut counts = vec![0; self.order];
        let mut distance = vec![usize::MAX; self.order];
        let mut queue = VecDeque::with_capacity(self.order);

        for source in 0..self.order {
            distance.fill(usize::MAX);
            distance[source] = 0;
            queue.push_back(source);

            while let Some(v) = queue.pop_front() {
                if v > source {
                    counts[distance[v]] += 1;
                }
                for w in self.neighbors(v) {
                    if distance[w] == usize::MAX {
                        distance[w] = distance[v] + 1;
                        queue.push_back(w);
                    }
                }
            }
        }
        counts
    }

    /// Sizes of the connected components, largest first.
    pub fn connected_component_sizes(&self) -> Vec<usize> {
        match &self.components {
            Components::Tracked(tracker) => tracker.component_sizes(),
            Components::Fixed => self.bfs_component_sizes(),
        }
    }

    /// The isomorphic copy in which vertex `v` becomes `permutation[v]`.
    pub fn relabeled(&self, permutation: &[usize]) -> Result<Self, GraphError> {
        if permutation.len() != self.order {
            return Err(GraphError::permutation(format!(
                "expected {} entries, got {}",
                self.order,
                permutation.len()
            )));
        }
        let mut seen = vec![false; self.order];
        for &image in permutation {
            if image >= self.order || std::mem::replace(&mut seen[image], true) {
                return Err(GraphError::permutation(format!(
                    "{image} is out of range or repeated"
                )));
            }
        }

        let edges: Vec<(usize, usize)> = self
            .edges()
            .into_iter()
            .map(|e| (permutation[e.u], permutation[e.v]))
            .collect();
        self.rebuilt(self.order, &edges)
    }

    /// Staple vertex `u` of `other` onto vertex `v` of `self`.
    ///
    /// The result has `self.order() + other.order() - 1` vertices: those of
    /// `self` keep their labels, the remaining vertices of `other` follow in
    /// their original order.
    pub fn glue(&self, v: usize, other: &TreeGraph, u: usize) -> Result<Self, GraphError> {
        if v >= self.order {
            return Err(GraphError::OutOfRange {
                vertex: v,
                order: self.order,
            });
        }
        if u >= other.order {
            return Err(GraphError::OutOfRange {
                vertex: u,
                order: other.order,
            });
        }

        let offset = self.order;
        let relocate = |w: usize| match w.cmp(&u) {
            std::cmp::Ordering::Equal => v,
            std::cmp::Ordering::Less => offset + w,
            std::cmp::Ordering::Greater => offset + w - 1,
        };

        let mut edges: Vec<(usize, usize)> =
            self.edges().into_iter().map(|e| (e.u, e.v)).collect();
        edges.extend(
            other
                .edges()
                .into_iter()
                .map(|e| (relocate(e.u), relocate(e.v))),
        );
        self.rebuilt(self.order + other.order - 1, &edges)
    }

    /// A graph of the same kind (fixed or tracked) holding `edges`.
    fn rebuilt(&self, order: usize, edges: &[(usize, usize)]) -> Result<Self, GraphError> {
        let mut graph = Self::from_edges(order, edges)?;
        if self.is_fixed() {
            graph.components = Components::Fixed;
        }
        Ok(graph)
    }

    fn check_endpoints(&self, u: usize, v: usize) -> Result<(), GraphError> {
        for vertex in [u, v] {
            if vertex >= self.order {
                return Err(GraphError::OutOfRange {
                    vertex,
                    order: self.order,
                });
            }
        }
        if u == v {
            return Err(GraphError::SelfLoop(u));
        }
        Ok(())
    }

    fn link(&mut self, u: usize, v: usize) {
        link_into(&mut self.adjacency[u], v);
        link_into(&mut self.adjacency[v], u);
        self.edge_count += 1;
    }

    fn bfs_component_sizes(&self) -> Vec<usize> {
        let mut seen = vec![false; self.order];
        let mut queue = VecDeque::new();
        let mut sizes = Vec::new();

        for start in 0..self.order {
            if seen[start] {
                continue;
            }
            seen[start] = true;
            queue.push_back(start);
            let mut size = 0;
            while let Some(v) = queue.pop_front() {
                size += 1;
                for w in self.neighbors(v) {
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
}

fn link_into(list: &mut Vec<usize>, vertex: usize) {
    if let Err(slot) = list.binary_search(&vertex) {
        list.insert(slot, vertex);
    }
}

fn unlink_from(list: &mut Vec<usize>, vertex: usize) {
    if let Ok(slot) = list.binary_search(&vertex) {
        list.remove(slot);
    }
}

/// Space-separated edge list, e.g. `(0, 1) (1, 2)`.
impl fmt::Display for TreeGraph {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, edge) in self.edges().iter().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            write!(f, "{edge}")?;
        }
        Ok(())
    }
}
