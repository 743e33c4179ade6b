//! Caching and persistence of evaluation results.
//!
//! The pipeline consults a [`ResultStore`] before evaluating each metric and persists
//! every finished [`AnalyzerOutput`](crate::pipeline::AnalyzerOutput) through it.
//! Store failures surface as [`StorageError`] and only ever cost the cache, never the
//! evaluation.

mod file_store;
mod memory_store;
mod result_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use result_store::{ResultStore, StorageError};
