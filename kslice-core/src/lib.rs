//! kslice-core - Free Trees and k-Slice Invariants
//!
//! Building blocks for testing whether cheap invariants determine a tree up
//! to isomorphism:
//! - Enumeration of every free tree of a given order as a canonical level sequence
//! - Tree graphs with degree and path-count invariants
//! - A connectivity tracker whose unions can be split again exactly
//! - Minimal-change walks over fixed-size subsets
//! - k-slice signatures and cohort culling built on the two above

pub mod cohort;
pub mod connectivity;
pub mod errors;
pub mod graph;
pub mod level_sequence;
pub mod refiner;
pub mod subsets;

pub use cohort::{Cohort, InvariantCohortBuilder, InvariantKey};
pub use connectivity::ConnectivityTracker;
pub use errors::{ConnectivityError, GraphError, RefineError, SubsetError};
pub use graph::{Edge, TreeGraph};
pub use level_sequence::{count_free_trees, LevelSequence, TreeEnumerator};
pub use refiner::{KSliceRefiner, Signature};
pub use subsets::{binomial, SubsetDelta, SubsetDeltaSequence, SubsetDeltaTable};
