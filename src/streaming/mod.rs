//! Shared streaming utilities.
//!
//! - Buffer sizing for input and output streams
//! - Whole-record FASTQ output
//!
//! Inputs are read record by record; memory held per file is its id set,
//! never its records.

pub mod buffers;
pub mod output;

pub use output::FastqWriter;
