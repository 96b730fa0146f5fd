//! Configuration for a search run.

pub mod settings;

pub use settings::SearchConfig;
