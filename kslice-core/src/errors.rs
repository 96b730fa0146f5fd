//! Error types for the core tree structures.
//!
//! Every variant is a broken precondition: the operations are deterministic,
//! so none of these is worth retrying.

use thiserror::Error;

/// Errors raised by [`ConnectivityTracker`](crate::ConnectivityTracker).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConnectivityError {
    /// Both ends of a union are the same element.
    #[error("Cannot join element {0} to itself")]
    SelfLoop(usize),

    /// Element index past the end of the tracker.
    #[error("Element {index} is out of range for a tracker of {len} elements")]
    OutOfRange { index: usize, len: usize },

    /// Union of two elements that already share a component.
    #[error("Elements {x} and {y} are already in the same component")]
    AlreadyConnected { x: usize, y: usize },

    /// Split of two elements with no parent link between them.
    #[error("Elements {x} and {y} are not directly linked, nothing to split")]
    NotAdjacent { x: usize, y: usize },
}

/// Errors raised by [`TreeGraph`](crate::TreeGraph) edge maintenance.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GraphError {
    /// Edge from a vertex to itself.
    #[error("Self-loop on vertex {0} is not allowed")]
    SelfLoop(usize),

    /// Vertex index not below the graph order.
    #[error("Vertex {vertex} is out of range for a graph of order {order}")]
    OutOfRange { vertex: usize, order: usize },

    /// Edge added twice.
    #[error("Edge ({0}, {1}) already exists")]
    DuplicateEdge(usize, usize),

    /// Deleted edge that is not present.
    #[error("Edge ({0}, {1}) does not exist")]
    MissingEdge(usize, usize),

    /// Added edge whose ends are already connected.
    #[error("Edge ({0}, {1}) would close a cycle")]
    WouldCreateCycle(usize, usize),

    /// Edit on a graph whose components are computed, not tracked.
    #[error("Edges of a graph built from a level sequence cannot change")]
    FixedEdgeSet,

    /// Relabeling that is not a permutation of the vertices.
    #[error("Invalid vertex permutation: {0}")]
    InvalidPermutation(String),

    /// Error from the component tracker.
    #[error("Connectivity error: {0}")]
    Connectivity(#[from] ConnectivityError),
}

impl GraphError {
    /// Create an invalid permutation error.
    pub fn permutation(msg: impl Into<String>) -> Self {
        Self::InvalidPermutation(msg.into())
    }
}

/// Errors raised while generating minimal-change subset sequences.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SubsetError {
    /// Subset size larger than the ground set.
    #[error("Cannot choose {k} elements out of {n}")]
    SubsetTooLarge { n: usize, k: usize },
}

/// Errors raised by the k-slice refiner.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RefineError {
    /// Delta sequence built for a different edge count or subset size.
    #[error(
        "Delta sequence walks {sequence_k}-subsets of {sequence_n} edges, \
         but the tree has {edge_count} edges and k = {k}"
    )]
    DeltaSequenceMismatch {
        edge_count: usize,
        k: usize,
        sequence_n: usize,
        sequence_k: usize,
    },

    /// No delta sequence for the requested `k`.
    #[error("No delta sequence prepared for k = {0}")]
    MissingSequence(usize),

    /// Error from the component tracker.
    #[error("Connectivity error: {0}")]
    Connectivity(#[from] ConnectivityError),

    /// Error from subset generation.
    #[error("Subset error: {0}")]
    Subset(#[from] SubsetError),
}
