//! Command implementations for matesect.

pub mod intersect;

pub use intersect::{IntersectCommand, IntersectStats};
