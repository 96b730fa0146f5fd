//! k-slice signatures and cohort culling.
//!
//! For a tree with edge set `E` and a fixed `k`, every `k`-subset `S` of `E`
//! splits the vertices into connected components. The k-slice signature
//! counts how often each multiset of component sizes occurs, with sign
//! `(-1)^k`. Isomorphic trees have equal signatures for every `k`, so two
//! trees whose signatures differ at some `k` are told apart.
//!
//! Subsets are visited in minimal-change order, so each step costs one split
//! and one union on a [`ConnectivityTracker`] rather than a rebuild.

use std::collections::BTreeMap;
use std::fmt;

use tracing::debug;

use crate::connectivity::ConnectivityTracker;
use crate::errors::RefineError;
use crate::graph::TreeGraph;
use crate::subsets::{SubsetDeltaSequence, SubsetDeltaTable};

/// Signed counts keyed by component sizes sorted largest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Signature {
    terms: BTreeMap<Vec<usize>, i64>,
}

impl Signature {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add `amount` to the coefficient of `sizes`.
    pub fn add(&mut self, sizes: &[usize], amount: i64) {
        if let Some(coefficient) = self.terms.get_mut(sizes) {
            *coefficient += amount;
        } else {
            self.terms.insert(sizes.to_vec(), amount);
        }
    }

    /// Coefficient of `sizes`, 0 if absent.
    pub fn get(&self, sizes: &[usize]) -> i64 {
        self.terms.get(sizes).copied().unwrap_or(0)
    }

    /// Number of distinct size multisets.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&[usize], i64)> + '_ {
        self.terms.iter().map(|(sizes, &c)| (sizes.as_slice(), c))
    }

    /// Add every term of `other`, dropping terms that cancel to zero.
    pub fn merge(&mut self, other: &Signature) {
        for (sizes, coefficient) in other.iter() {
            self.add(sizes, coefficient);
        }
        self.terms.retain(|_, c| *c != 0);
    }
}

/// Terms as `coefficient*p[sizes]`, largest partition first.
impl fmt::Display for Signature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, (sizes, coefficient)) in self.terms.iter().rev().enumerate() {
            if i > 0 {
                write!(f, " ")?;
            }
            let parts: Vec<String> = sizes.iter().map(usize::to_string).collect();
            write!(f, "{coefficient:+}*p[{}]", parts.join(","))?;
        }
        Ok(())
    }
}

/// Computes k-slice signatures against a shared table of delta sequences.
#[derive(Debug, Clone, Copy)]
pub struct KSliceRefiner<'a> {
    table: &'a SubsetDeltaTable,
}

impl<'a> KSliceRefiner<'a> {
    pub fn new(table: &'a SubsetDeltaTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &'a SubsetDeltaTable {
        self.table
    }

    /// The k-slice signature of `tree`, walking `sequence` over its sorted
    /// edges.
    pub fn compute_signature(
        tree: &TreeGraph,
        k: usize,
        sequence: &SubsetDeltaSequence,
    ) -> Result<Signature, RefineError> {
        let edges = tree.edges();
        if sequence.n() != edges.len() || sequence.k() != k {
            return Err(RefineError::DeltaSequenceMismatch {
                edge_count: edges.len(),
                k,
                sequence_n: sequence.n(),
                sequence_k: sequence.k(),
            });
        }

        let sign = if k % 2 == 0 { 1 } else { -1 };
        let mut tracker = ConnectivityTracker::new(tree.order());
        let mut sizes = Vec::with_capacity(tree.order());
        let mut signature = Signature::new();

        for edge in &edges[..k] {
            tracker.union(edge.u, edge.v)?;
        }
        tracker.fill_component_sizes(&mut sizes);
        signature.add(&sizes, sign);

        for delta in sequence {
            let removed = edges[delta.removed];
            let added = edges[delta.added];
            tracker.split(removed.u, removed.v)?;
            tracker.union(added.u, added.v)?;
            tracker.fill_component_sizes(&mut sizes);
            signature.add(&sizes, sign);
        }

        Ok(signature)
    }

    /// The k-slice signature of `tree` using the table's sequence for `k`.
    pub fn signature(&self, tree: &TreeGraph, k: usize) -> Result<Signature, RefineError> {
        let sequence = self.table.get(k).ok_or(RefineError::MissingSequence(k))?;
        Self::compute_signature(tree, k, sequence)
    }

    /// Keep the trees whose k-slice signature equals that of at least one
    /// other tree in `trees`, preserving their order.
    ///
    /// A tree dropped here is distinguished from every other tree given.
    pub fn cull(&self, trees: Vec<TreeGraph>, k: usize) -> Result<Vec<TreeGraph>, RefineError> {
        let signatures = trees
            .iter()
            .map(|tree| self.signature(tree, k))
            .collect::<Result<Vec<_>, _>>()?;

        let before = trees.len();
        let kept: Vec<TreeGraph> = trees
            .into_iter()
            .enumerate()
            .filter(|(i, _)| {
                signatures
                    .iter()
                    .enumerate()
                    .any(|(j, other)| j != *i && *other == signatures[*i])
            })
            .map(|(_, tree)| tree)
            .collect();

        debug!(k, before, after = kept.len(), "Culled trees by k-slice signature");
        Ok(kept)
    }

    /// Sum of the k-slice signatures over every `k` from 0 to the edge count:
    /// the chromatic symmetric function of `tree` in the power-sum basis.
    pub fn chromatic_symmetric_function(tree: &TreeGraph) -> Result<Signature, RefineError> {
        let edge_count = tree.edge_count();
        let mut total = Signature::new();
        for k in 0..=edge_count {
            let sequence = SubsetDeltaSequence::generate(edge_count, k)?;
            total.merge(&Self::compute_signature(tree, k, &sequence)?);
        }
        Ok(total)
    }
}
