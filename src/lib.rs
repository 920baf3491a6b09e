// Clippy allows for the whole crate
#![allow(clippy::should_implement_trait)]

//! matesect: paired-end FASTQ intersection by read id.
//!
//! Keeps only the read pairs whose canonical id (the header without its
//! `/1` or `/2` mate marker) appears in both the forward and reverse file.
//!
//! # Features
//!
//! - **Two-pass streaming**: index ids, then filter; records are never held in memory
//! - **Order preserving**: each output keeps its input's record order
//! - **All-or-nothing**: malformed input in either file produces no output
//!
//! # Example
//!
//! ```rust,no_run
//! use matesect::commands::IntersectCommand;
//!
//! let cmd = IntersectCommand::new();
//! let stats = cmd
//!     .run("reads_1.fastq", "reads_2.fastq", "paired_1.fastq", "paired_2.fastq")
//!     .unwrap();
//! assert_eq!(stats.forward_written, stats.reverse_written);
//! ```

pub mod commands;
pub mod config;
pub mod fastq;
pub mod id_set;
pub mod read_id;
pub mod streaming;

// Re-export commonly used types
pub use fastq::{FastqError, FastqReader, FastqRecord};
pub use id_set::{common_ids, read_id_set, read_ids, read_unique_ids, ReadIdSet};
pub use read_id::{parse_header, read_id, Mate};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::commands::{IntersectCommand, IntersectStats};
    pub use crate::config::{DuplicatePolicy, IntersectConfig};
    pub use crate::fastq::{FastqError, FastqReader, FastqRecord};
    pub use crate::id_set::{common_ids, read_id_set, read_ids, IdSetBuilder, ReadIdSet};
    pub use crate::read_id::{parse_header, read_id, Mate};
    pub use crate::streaming::FastqWriter;
}
