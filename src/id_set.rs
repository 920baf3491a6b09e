//! Canonical read id extraction over whole FASTQ streams.
//!
//! Two views of a file's ids are offered:
//! - [`read_ids`]: every id in file order
//! - [`read_id_set`] / [`IdSetBuilder`]: unique ids for membership tests
//!
//! Both consume the stream in strict 4-line groups and fail on the first
//! malformed header or truncated record.

use crate::config::DuplicatePolicy;
use crate::fastq::{FastqError, FastqReader, FastqRecord, Result};
use crate::read_id::Mate;
use rustc_hash::FxHashSet;
use std::io::Read;
use std::path::Path;

/// Set of canonical read ids.
pub type ReadIdSet = FxHashSet<String>;

/// Canonical ids of every record, in file order.
pub fn read_ids<R: Read>(mut reader: FastqReader<R>) -> Result<Vec<String>> {
    let mut ids = Vec::new();
    let mut record = FastqRecord::default();
    while reader.read_into(&mut record)? {
        ids.push(record.read_id()?.to_string());
    }
    Ok(ids)
}

/// Canonical ids of a FASTQ file, in file order.
pub fn read_ids_from_path<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    read_ids(FastqReader::from_path(path)?)
}

/// Canonical ids in file order, each reported at its first occurrence only.
pub fn read_unique_ids<R: Read>(mut reader: FastqReader<R>) -> Result<Vec<String>> {
    let mut seen = ReadIdSet::default();
    let mut ids = Vec::new();
    let mut record = FastqRecord::default();
    while reader.read_into(&mut record)? {
        let id = record.read_id()?;
        if seen.insert(id.to_string()) {
            ids.push(id.to_string());
        }
    }
    Ok(ids)
}

/// Unique canonical ids of a stream. Repeated ids collapse into one entry.
pub fn read_id_set<R: Read>(reader: FastqReader<R>) -> Result<ReadIdSet> {
    IdSetBuilder::new()
        .with_duplicates(DuplicatePolicy::KeepFirst)
        .build(reader)
        .map(IdIndex::into_ids)
}

/// Unique canonical ids of a FASTQ file.
pub fn read_id_set_from_path<P: AsRef<Path>>(path: P) -> Result<ReadIdSet> {
    read_id_set(FastqReader::from_path(path)?)
}

/// Ids present in both sets.
///
/// Iterates the smaller set, so the cost is O(min(|a|, |b|)).
pub fn common_ids(a: &ReadIdSet, b: &ReadIdSet) -> ReadIdSet {
    let (small, large) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    small
        .iter()
        .filter(|id| large.contains(*id))
        .cloned()
        .collect()
}

/// Result of indexing one file.
#[derive(Debug, Clone, Default)]
pub struct IdIndex {
    ids: ReadIdSet,
    records: usize,
    duplicates: usize,
}

impl IdIndex {
    /// Unique ids seen.
    pub fn ids(&self) -> &ReadIdSet {
        &self.ids
    }

    pub fn into_ids(self) -> ReadIdSet {
        self.ids
    }

    /// Total records read, duplicates included.
    pub fn records(&self) -> usize {
        self.records
    }

    /// Records whose id had already been seen.
    pub fn duplicates(&self) -> usize {
        self.duplicates
    }

    #[inline]
    pub fn contains(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

/// Builds the id set of one file with duplicate and mate checks.
#[derive(Debug, Clone, Default)]
pub struct IdSetBuilder {
    pub duplicates: DuplicatePolicy,
    pub expected_mate: Option<Mate>,
}

impl IdSetBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_duplicates(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicates = policy;
        self
    }

    /// Require every header to carry the given mate marker.
    pub fn with_expected_mate(mut self, mate: Option<Mate>) -> Self {
        self.expected_mate = mate;
        self
    }

    /// Index every record of the stream.
    pub fn build<R: Read>(&self, mut reader: FastqReader<R>) -> Result<IdIndex> {
        let mut index = IdIndex::default();
        let mut record = FastqRecord::default();

        while reader.read_into(&mut record)? {
            index.records += 1;
            let parsed = record.parse_header()?;

            if let Some(expected) = self.expected_mate {
                if parsed.mate != expected {
                    return Err(FastqError::MateMismatch {
                        header: record.header.clone(),
                        expected: expected.number(),
                    });
                }
            }

            if index.ids.contains(parsed.id) {
                if self.duplicates == DuplicatePolicy::Error {
                    return Err(FastqError::DuplicateId {
                        id: parsed.id.to_string(),
                        line: reader.record_line(),
                    });
                }
                index.duplicates += 1;
                continue;
            }
            index.ids.insert(parsed.id.to_string());
        }

        log::debug!(
            "Indexed {} records ({} unique ids, {} duplicates)",
            index.records,
            index.ids.len(),
            index.duplicates
        );
        Ok(index)
    }
}
