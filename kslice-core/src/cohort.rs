//! Grouping trees by their coarse invariants.

use std::collections::BTreeMap;

use tracing::info;

use crate::graph::TreeGraph;
use crate::level_sequence::{LevelSequence, TreeEnumerator};

/// The coarse invariant pair shared by every tree of a cohort.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct InvariantKey {
    pub degree_sequence: Vec<usize>,
    pub path_counts: Vec<usize>,
}

impl InvariantKey {
    pub fn of(tree: &TreeGraph) -> Self {
        Self {
            degree_sequence: tree.degree_sequence(),
            path_counts: tree.path_count_sequence(),
        }
    }
}

/// Trees that no invariant computed so far tells apart.
#[derive(Debug, Clone)]
pub struct Cohort {
    key: InvariantKey,
    trees: Vec<TreeGraph>,
}

impl Cohort {
    pub fn new(key: InvariantKey, trees: Vec<TreeGraph>) -> Self {
        Self { key, trees }
    }

    pub fn key(&self) -> &InvariantKey {
        &self.key
    }

    pub fn len(&self) -> usize {
        self.trees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.trees.is_empty()
    }

    /// At most one tree left, so nothing remains to distinguish.
    pub fn is_resolved(&self) -> bool {
        self.trees.len() <= 1
    }

    pub fn trees(&self) -> &[TreeGraph] {
        &self.trees
    }

    pub fn into_trees(self) -> Vec<TreeGraph> {
        self.trees
    }

    /// Move the trees out, leaving the cohort empty.
    pub fn take_trees(&mut self) -> Vec<TreeGraph> {
        std::mem::take(&mut self.trees)
    }

    /// Swap in the trees that survived a refinement step.
    pub fn replace(&mut self, trees: Vec<TreeGraph>) {
        self.trees = trees;
    }
}

/// Buckets trees by [`InvariantKey`].
///
/// Trees are held as level sequences; a [`TreeGraph`] is only built for the
/// key and again for cohorts that leave the builder.
#[derive(Debug, Default)]
pub struct InvariantCohortBuilder {
    buckets: BTreeMap<InvariantKey, Vec<LevelSequence>>,
    tree_count: usize,
}

impl InvariantCohortBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bucket every free tree of the given order.
    pub fn from_enumeration(order: usize) -> Self {
        let mut builder = Self::new();
        builder.extend(TreeEnumerator::new(order));
        info!(
            order,
            trees = builder.tree_count(),
            cohorts = builder.cohort_count(),
            "Enumerated free trees"
        );
        builder
    }

    pub fn insert(&mut self, sequence: LevelSequence) {
        let key = InvariantKey::of(&TreeGraph::from_level_sequence(&sequence));
        self.buckets.entry(key).or_default().push(sequence);
        self.tree_count += 1;
    }

    pub fn extend(&mut self, sequences: impl IntoIterator<Item = LevelSequence>) {
        for sequence in sequences {
            self.insert(sequence);
        }
    }

    pub fn tree_count(&self) -> usize {
        self.tree_count
    }

    pub fn cohort_count(&self) -> usize {
        self.buckets.len()
    }

    /// Every cohort in key order, trees in insertion order.
    pub fn build(self) -> Vec<Cohort> {
        self.buckets
            .into_iter()
            .map(|(key, sequences)| materialize(key, &sequences))
            .collect()
    }

    /// Only the cohorts still holding several trees, in key order. Singleton
    /// buckets are dropped without building their graphs.
    pub fn into_pending(self) -> Vec<Cohort> {
        self.buckets
            .into_iter()
            .filter(|(_, sequences)| sequences.len() > 1)
            .map(|(key, sequences)| materialize(key, &sequences))
            .collect()
    }
}

fn materialize(key: InvariantKey, sequences: &[LevelSequence]) -> Cohort {
    let trees = sequences.iter().map(TreeGraph::from_level_sequence).collect();
    Cohort::new(key, trees)
}
