//! Runtime configuration for paired intersection.
//!
//! Settings are gathered once from the command line and passed by value
//! into the intersect command; nothing here is mutated during a run.

use crate::streaming::buffers::{input_buffer_size, output_buffer_size};

/// How to treat a canonical read id that occurs more than once in one file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DuplicatePolicy {
    /// Abort indexing with a duplicate-id error.
    #[default]
    Error,
    /// Keep the first record carrying the id and drop later ones.
    KeepFirst,
}

impl DuplicatePolicy {
    /// Parse policy from string.
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "error" | "fail" => Some(Self::Error),
            "keep-first" | "keep_first" | "first" => Some(Self::KeepFirst),
            _ => None,
        }
    }

    /// Name used on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::KeepFirst => "keep-first",
        }
    }
}

/// Options shared by the indexing and filtering passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntersectConfig {
    /// Handling of repeated ids within a single file
    pub duplicates: DuplicatePolicy,
    /// Require `/1` on forward reads and `/2` on reverse reads
    pub check_mates: bool,
    /// Use smaller I/O buffers
    pub low_memory: bool,
}

impl IntersectConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    pub fn with_check_mates(mut self, check: bool) -> Self {
        self.check_mates = check;
        self
    }

    pub fn with_low_memory(mut self, low_memory: bool) -> Self {
        self.low_memory = low_memory;
        self
    }

    /// Read buffer capacity for input streams.
    #[inline]
    pub fn input_buffer(&self) -> usize {
        input_buffer_size(self.low_memory)
    }

    /// Write buffer capacity for output streams.
    #[inline]
    pub fn output_buffer(&self) -> usize {
        output_buffer_size(self.low_memory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::streaming::buffers::{DEFAULT_INPUT_BUFFER, LOW_MEMORY_OUTPUT_BUFFER};

    #[test]
    fn test_default_config() {
        let config = IntersectConfig::new();
        assert_eq!(config.duplicates, DuplicatePolicy::Error);
        assert!(!config.check_mates);
        assert_eq!(config.input_buffer(), DEFAULT_INPUT_BUFFER);
    }

    #[test]
    fn test_low_memory_buffers() {
        let config = IntersectConfig::new().with_low_memory(true);
        assert_eq!(config.output_buffer(), LOW_MEMORY_OUTPUT_BUFFER);
    }

    #[test]
    fn test_duplicate_policy_from_str() {
        assert_eq!(DuplicatePolicy::from_str("error"), Some(DuplicatePolicy::Error));
        assert_eq!(
            DuplicatePolicy::from_str("Keep-First"),
            Some(DuplicatePolicy::KeepFirst)
        );
        assert_eq!(DuplicatePolicy::from_str("last"), None);
        assert_eq!(DuplicatePolicy::KeepFirst.name(), "keep-first");
    }
}
