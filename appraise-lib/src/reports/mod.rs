//! Rendering of evaluation results.
//!
//! Each evaluated artifact becomes one flat JSON record: artifact identity, net score
//! and, for every staged metric, its value, latency and status. Records are written one
//! per line so that they can be streamed and processed line by line.

mod record;

pub use record::{generate as generate_record, to_record};
