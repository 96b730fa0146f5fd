//! Results of a search run.

use std::fmt;
use std::time::Duration;

use kslice_core::{Cohort, InvariantKey, KSliceRefiner, RefineError, Signature, TreeGraph};

/// Counters gathered over a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunStats {
    pub order: usize,
    /// Free trees enumerated.
    pub trees: usize,
    /// Cohorts after grouping by degree sequence and path counts.
    pub cohorts: usize,
    /// Cohorts holding a single tree from the start.
    pub coarse_resolved: usize,
    /// Cohorts handed to the workers.
    pub queued: usize,
    /// Cohorts processed by each worker, indexed by worker.
    pub per_worker: Vec<usize>,
    /// Largest `k` any queued cohort needed; `None` if nothing was queued.
    pub deepest_k: Option<usize>,
    pub elapsed: Duration,
}

/// A cohort whose trees no k-slice separated: a counterexample.
#[derive(Debug, Clone)]
pub struct SurvivingCohort {
    key: InvariantKey,
    trees: Vec<TreeGraph>,
    /// Indices into `trees`, grouped by equal chromatic symmetric function.
    csf_classes: Vec<Vec<usize>>,
}

impl SurvivingCohort {
    /// Wrap a surviving cohort and group its trees by chromatic symmetric
    /// function.
    pub fn from_cohort(cohort: Cohort) -> Result<Self, RefineError> {
        let key = cohort.key().clone();
        let trees = cohort.into_trees();

        let mut functions: Vec<Signature> = Vec::new();
        let mut csf_classes: Vec<Vec<usize>> = Vec::new();
        for (index, tree) in trees.iter().enumerate() {
            let function = KSliceRefiner::chromatic_symmetric_function(tree)?;
            match functions.iter().position(|f| *f == function) {
                Some(class) => csf_classes[class].push(index),
                None => {
                    functions.push(function);
                    csf_classes.push(vec![index]);
                }
            }
        }

        Ok(Self {
            key,
            trees,
            csf_classes,
        })
    }

    pub fn key(&self) -> &InvariantKey {
        &self.key
    }

    pub fn trees(&self) -> &[TreeGraph] {
        &self.trees
    }

    pub fn csf_classes(&self) -> &[Vec<usize>] {
        &self.csf_classes
    }
}

impl fmt::Display for SurvivingCohort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "COUNTEREXAMPLE FOUND!")?;
        for tree in &self.trees {
            writeln!(f, "{tree}")?;
        }
        for class in self.csf_classes.iter().filter(|c| c.len() > 1) {
            let members: Vec<String> = class.iter().map(usize::to_string).collect();
            writeln!(
                f,
                "Same chromatic symmetric function: trees {}",
                members.join(", ")
            )?;
        }
        Ok(())
    }
}

/// Everything a run produced.
#[derive(Debug, Clone)]
pub struct SearchReport {
    stats: RunStats,
    survivors: Vec<SurvivingCohort>,
}

impl SearchReport {
    pub fn new(stats: RunStats, survivors: Vec<SurvivingCohort>) -> Self {
        Self { stats, survivors }
    }

    pub fn stats(&self) -> &RunStats {
        &self.stats
    }

    /// Surviving cohorts, ordered by invariant key.
    pub fn survivors(&self) -> &[SurvivingCohort] {
        &self.survivors
    }

    pub fn has_counterexample(&self) -> bool {
        !self.survivors.is_empty()
    }
}

/// The counterexample dumps, one after another; empty when there are none.
impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for survivor in &self.survivors {
            write!(f, "{survivor}")?;
        }
        Ok(())
    }
}
