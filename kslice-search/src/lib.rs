//! # kslice-search
//!
//! Searches for pairs of non-isomorphic trees that degree sequences, path
//! counts and k-slice signatures fail to tell apart.
//!
//! ## Architecture
//!
//! 1. **Enumeration**: every free tree of the requested order, bucketed into
//!    cohorts by degree sequence and path counts
//! 2. **Orchestrator**: a pool of worker threads drains a shared queue of
//!    cohorts, refining each with k-slice signatures of increasing `k`
//! 3. **Report**: cohorts still holding several trees once `k` runs out
//!
//! ## Modules
//!
//! - [`config`]: Command line and environment configuration
//! - [`orchestrator`]: Work queue, worker pool and per-cohort state machine
//! - [`report`]: Run statistics and counterexample output
//! - [`errors`]: Configuration error type

pub mod config;
pub mod errors;
pub mod orchestrator;
pub mod report;

pub use config::SearchConfig;
pub use errors::ConfigError;
pub use orchestrator::Orchestrator;
pub use report::{RunStats, SearchReport, SurvivingCohort};

use kslice_core::{RefineError, SubsetError};
use thiserror::Error;

/// Errors that can stop a search run.
#[derive(Error, Debug)]
pub enum SearchError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// The delta table could not be built.
    #[error("Subset error: {0}")]
    Subset(#[from] SubsetError),

    /// Refinement of a cohort failed.
    #[error("Refine error: {0}")]
    Refine(#[from] RefineError),

    /// A worker thread could not be started.
    #[error("Failed to spawn worker thread: {0}")]
    WorkerSpawn(#[source] std::io::Error),

    /// A worker thread panicked.
    #[error("Worker {0} panicked")]
    WorkerPanicked(usize),
}
