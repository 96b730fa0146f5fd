//! Minimal-change enumeration of fixed-size subsets.
//!
//! Implements the Eades–McKay strong minimal change order:
//!
//! > Peter Eades, Brendan McKay. An Algorithm for Generating Subsets of a Fixed
//! > Size with a Strong Minimal Change Property. Information Processing Letters
//! > 19 (1984), 131-133.
//!
//! Instead of producing the subsets themselves, the generator records the
//! single swap that turns each subset into the next one. Replaying the swaps
//! from `{0, ..., k-1}` visits all `C(n, k)` subsets exactly once, which lets a
//! caller keep incremental state (see [`crate::refiner`]) instead of rebuilding
//! it for every subset.

use std::collections::BTreeMap;

use tracing::debug;

use crate::errors::SubsetError;

/// One step of the walk: `removed` leaves the current subset, `added` joins it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubsetDelta {
    pub removed: usize,
    pub added: usize,
}

/// The ordered swaps visiting every `k`-subset of `{0..n-1}`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubsetDeltaSequence {
    n: usize,
    k: usize,
    deltas: Vec<SubsetDelta>,
}

impl SubsetDeltaSequence {
    /// Generate the sequence for `k`-subsets of `{0..n-1}`.
    ///
    /// The result holds `C(n, k) - 1` deltas; for `k == 0` or `k == n` there
    /// is a single subset and the sequence is empty.
    pub fn generate(n: usize, k: usize) -> Result<Self, SubsetError> {
        if k > n {
            return Err(SubsetError::SubsetTooLarge { n, k });
        }

        let mut walk = EadesMcKay {
            n: n as isize,
            k: k as isize,
            current: (0..k).collect(),
            deltas: Vec::with_capacity(binomial(n, k).saturating_sub(1)),
        };
        if 0 < k && k < n {
            walk.forward(1, 0);
        }

        Ok(Self {
            n,
            k,
            deltas: walk.deltas,
        })
    }

    /// Size of the ground set.
    pub fn n(&self) -> usize {
        self.n
    }

    /// Size of every subset in the walk.
    pub fn k(&self) -> usize {
        self.k
    }

    /// Number of deltas (one less than the number of subsets visited).
    pub fn len(&self) -> usize {
        self.deltas.len()
    }

    pub fn is_empty(&self) -> bool {
        self.deltas.is_empty()
    }

    /// Number of subsets visited, the initial one included.
    pub fn subset_count(&self) -> usize {
        self.deltas.len() + 1
    }

    /// The subset the walk starts from.
    pub fn initial_subset(&self) -> Vec<usize> {
        (0..self.k).collect()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SubsetDelta> {
        self.deltas.iter()
    }

    pub fn as_slice(&self) -> &[SubsetDelta] {
        &self.deltas
    }

    /// Replay the walk, yielding each visited subset in ascending order.
    pub fn subsets(&self) -> Subsets<'_> {
        Subsets {
            current: Some(self.initial_subset()),
            deltas: self.deltas.iter(),
        }
    }
}

impl<'a> IntoIterator for &'a SubsetDeltaSequence {
    type Item = &'a SubsetDelta;
    type IntoIter = std::slice::Iter<'a, SubsetDelta>;

    fn into_iter(self) -> Self::IntoIter {
        self.deltas.iter()
    }
}

/// Iterator over the subsets visited by a [`SubsetDeltaSequence`].
pub struct Subsets<'a> {
    current: Option<Vec<usize>>,
    deltas: std::slice::Iter<'a, SubsetDelta>,
}

impl Iterator for Subsets<'_> {
    type Item = Vec<usize>;

    fn next(&mut self) -> Option<Self::Item> {
        let subset = self.current.take()?;
        if let Some(delta) = self.deltas.next() {
            let mut following = subset.clone();
            if let Some(slot) = following.iter_mut().find(|e| **e == delta.removed) {
                *slot = delta.added;
            }
            following.sort_unstable();
            self.current = Some(following);
        }
        Some(subset)
    }
}

/// Recursive state of the generator.
///
/// `pointer` and `difference` follow the published algorithm and are
/// 1-based; `current` tracks the subset by position so each recorded delta is
/// relative to the subset at that point of the walk.
struct EadesMcKay {
    n: isize,
    k: isize,
    current: Vec<usize>,
    deltas: Vec<SubsetDelta>,
}

impl EadesMcKay {
    fn forward(&mut self, pointer: isize, difference: isize) {
        if pointer < self.k && difference - pointer < self.n - self.k - 1 {
            self.forward(pointer + 2, difference + 2);
            self.process(pointer + 1, self.n - self.k + pointer + 1);
            self.reverse(pointer + 1, difference + 2);
            self.process(pointer, difference + 2);
            self.forward(pointer, difference + 1);
        } else if pointer == self.k {
            for value in (difference + 2)..=self.n {
                self.process(self.k, value);
            }
        }
    }

    fn reverse(&mut self, pointer: isize, difference: isize) {
        if pointer < self.k && difference - pointer < self.n - self.k - 1 {
            self.reverse(pointer, difference + 1);
            self.process(pointer, difference + 1);
            self.forward(pointer + 1, difference + 2);
            self.process(pointer + 1, difference + 2);
            self.reverse(pointer + 2, difference + 2);
        } else if pointer == self.k {
            for value in ((difference + 1)..self.n).rev() {
                self.process(self.k, value);
            }
        }
    }

    /// Replace the element at 1-based `position` with the 1-based `value`.
    fn process(&mut self, position: isize, value: isize) {
        let slot = (position - 1) as usize;
        let added = (value - 1) as usize;
        self.deltas.push(SubsetDelta {
            removed: self.current[slot],
            added,
        });
        self.current[slot] = added;
    }
}

/// `C(n, k)`, saturating at `usize::MAX`.
pub fn binomial(n: usize, k: usize) -> usize {
    if k > n {
        return 0;
    }
    let k = k.min(n - k);
    let mut result: u128 = 1;
    for i in 0..k {
        result = result * (n - i) as u128 / (i + 1) as u128;
        if result > usize::MAX as u128 {
            return usize::MAX;
        }
    }
    result as usize
}

/// Delta sequences for one ground-set size and several subset sizes, built
/// once and shared read-only by every refinement that needs them.
#[derive(Debug, Clone, Default)]
pub struct SubsetDeltaTable {
    n: usize,
    sequences: BTreeMap<usize, SubsetDeltaSequence>,
}

impl SubsetDeltaTable {
    /// Build the sequences for every `k` in `ks` over `{0..n-1}`.
    pub fn build(n: usize, ks: impl IntoIterator<Item = usize>) -> Result<Self, SubsetError> {
        let mut sequences = BTreeMap::new();
        for k in ks {
            let sequence = SubsetDeltaSequence::generate(n, k)?;
            debug!(n, k, deltas = sequence.len(), "Built subset delta sequence");
            sequences.insert(k, sequence);
        }
        Ok(Self { n, sequences })
    }

    /// Size of the ground set the sequences walk over.
    pub fn n(&self) -> usize {
        self.n
    }

    pub fn get(&self, k: usize) -> Option<&SubsetDeltaSequence> {
        self.sequences.get(&k)
    }

    /// Subset sizes present in the table, ascending.
    pub fn ks(&self) -> impl Iterator<Item = usize> + '_ {
        self.sequences.keys().copied()
    }

    /// Total number of deltas held.
    pub fn total_deltas(&self) -> usize {
        self.sequences.values().map(SubsetDeltaSequence::len).sum()
    }
}
