//! Paired-end intersection by canonical read id.
//!
//! # Algorithm
//!
//! 1. Index both inputs (canonical id sets), validating every record
//! 2. Intersect the two sets
//! 3. Rewind each input and emit records whose id is in the intersection
//!
//! Nothing is written until both inputs have been fully validated, so a
//! malformed file in either mate produces no output at all. Output order
//! within each file follows input order.

use crate::config::{DuplicatePolicy, IntersectConfig};
use crate::fastq::{FastqError, FastqReader, FastqRecord, Result};
use crate::id_set::{common_ids, IdIndex, IdSetBuilder, ReadIdSet};
use crate::read_id::Mate;
use crate::streaming::FastqWriter;
use rustc_hash::FxHashSet;
use std::fs::{self, File};
use std::io::{Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::{NamedTempFile, TempPath};

/// Mode requested for output files, before the process umask is applied.
#[cfg(unix)]
const OUTPUT_MODE: u32 = 0o666;

/// Paired intersection command.
#[derive(Debug, Clone, Default)]
pub struct IntersectCommand {
    pub config: IntersectConfig,
}

impl IntersectCommand {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(mut self, config: IntersectConfig) -> Self {
        self.config = config;
        self
    }

    /// Index one input. `mate` is only enforced when mate checking is on.
    pub fn index<R: Read>(&self, input: R, mate: Mate) -> Result<IdIndex> {
        let reader = FastqReader::with_capacity(input, self.config.input_buffer());
        IdSetBuilder::new()
            .with_duplicates(self.config.duplicates)
            .with_expected_mate(self.config.check_mates.then_some(mate))
            .build(reader)
    }

    /// Canonical ids present in both inputs.
    pub fn common_ids<R1: Read, R2: Read>(&self, forward: R1, reverse: R2) -> Result<ReadIdSet> {
        let forward = self.index(forward, Mate::Forward)?;
        let reverse = self.index(reverse, Mate::Reverse)?;
        Ok(common_ids(forward.ids(), reverse.ids()))
    }

    /// Common ids in forward-file order.
    pub fn common_ids_ordered<R1: Read + Seek, R2: Read>(
        &self,
        forward: &mut R1,
        reverse: R2,
    ) -> Result<Vec<String>> {
        let start = forward.stream_position()?;
        let common = self.common_ids(&mut *forward, reverse)?;
        forward.seek(SeekFrom::Start(start))?;

        let mut reader = FastqReader::with_capacity(&mut *forward, self.config.input_buffer());
        let mut record = FastqRecord::default();
        let mut ordered = Vec::with_capacity(common.len());
        let mut seen: FxHashSet<String> = FxHashSet::default();

        while reader.read_into(&mut record)? {
            let id = record.read_id()?;
            if common.contains(id) && seen.insert(id.to_string()) {
                ordered.push(id.to_string());
            }
        }
        Ok(ordered)
    }

    /// Emit the records of `input` whose id is in `keep`, in input order.
    ///
    /// With [`DuplicatePolicy::KeepFirst`] only the first record per id is
    /// emitted. Returns the number of records written.
    pub fn filter<R: Read, W: Write>(
        &self,
        input: R,
        keep: &ReadIdSet,
        output: &mut FastqWriter<W>,
    ) -> Result<usize> {
        let mut reader = FastqReader::with_capacity(input, self.config.input_buffer());
        let mut record = FastqRecord::default();
        let mut emitted: FxHashSet<String> = FxHashSet::default();
        let dedup = self.config.duplicates == DuplicatePolicy::KeepFirst;
        let before = output.records_written();

        while reader.read_into(&mut record)? {
            let id = record.read_id()?;
            if !keep.contains(id) {
                continue;
            }
            if dedup && !emitted.insert(id.to_string()) {
                continue;
            }
            output.write_record(&record)?;
        }

        Ok(output.records_written() - before)
    }

    /// Intersect two seekable inputs into two outputs.
    ///
    /// Both inputs are indexed from their current position, then rewound
    /// to it for the filter pass.
    pub fn run_streaming<R1, R2, W1, W2>(
        &self,
        forward: &mut R1,
        reverse: &mut R2,
        out_forward: W1,
        out_reverse: W2,
    ) -> Result<IntersectStats>
    where
        R1: Read + Seek,
        R2: Read + Seek,
        W1: Write,
        W2: Write,
    {
        let forward_start = forward.stream_position()?;
        let reverse_start = reverse.stream_position()?;

        let forward_index = self.index(&mut *forward, Mate::Forward)?;
        let reverse_index = self.index(&mut *reverse, Mate::Reverse)?;
        let common = common_ids(forward_index.ids(), reverse_index.ids());

        log::info!(
            "Indexed {} forward and {} reverse records; {} ids in common",
            forward_index.records(),
            reverse_index.records(),
            common.len()
        );
        let duplicates_dropped = forward_index.duplicates() + reverse_index.duplicates();
        if duplicates_dropped > 0 {
            log::warn!(
                "Dropping {} records with repeated read ids",
                duplicates_dropped
            );
        }

        forward.seek(SeekFrom::Start(forward_start))?;
        let mut writer = FastqWriter::with_capacity(self.config.output_buffer(), out_forward);
        let forward_written = self.filter(&mut *forward, &common, &mut writer)?;
        writer.flush()?;

        reverse.seek(SeekFrom::Start(reverse_start))?;
        let mut writer = FastqWriter::with_capacity(self.config.output_buffer(), out_reverse);
        let reverse_written = self.filter(&mut *reverse, &common, &mut writer)?;
        writer.flush()?;

        Ok(IntersectStats {
            forward_records: forward_index.records(),
            reverse_records: reverse_index.records(),
            common_ids: common.len(),
            forward_written,
            reverse_written,
            forward_duplicates: forward_index.duplicates(),
            reverse_duplicates: reverse_index.duplicates(),
        })
    }

    /// Intersect two FASTQ files into two output files.
    ///
    /// Outputs are staged in temporary files next to their destinations and
    /// renamed into place only after both were written completely. On any
    /// error neither destination is created or modified: an existing forward
    /// output is set aside before the first rename and put back if the
    /// second one fails.
    pub fn run<P: AsRef<Path>, Q: AsRef<Path>>(
        &self,
        forward_path: P,
        reverse_path: P,
        out_forward: Q,
        out_reverse: Q,
    ) -> Result<IntersectStats> {
        let out_forward = out_forward.as_ref();
        let out_reverse = out_reverse.as_ref();
        if out_forward == out_reverse {
            return Err(FastqError::InvalidArgument(format!(
                "forward and reverse outputs are the same file: {}",
                out_forward.display()
            )));
        }
        for destination in [out_forward, out_reverse] {
            if destination.is_dir() {
                return Err(FastqError::InvalidArgument(format!(
                    "output is a directory: {}",
                    destination.display()
                )));
            }
        }

        let mut forward = File::open(forward_path.as_ref())?;
        let mut reverse = File::open(reverse_path.as_ref())?;

        let mut staged_forward = staging_file(out_forward)?;
        let mut staged_reverse = staging_file(out_reverse)?;

        let stats = self.run_streaming(
            &mut forward,
            &mut reverse,
            staged_forward.as_file_mut(),
            staged_reverse.as_file_mut(),
        )?;

        persist_pair(staged_forward, staged_reverse, out_forward, out_reverse)?;

        log::info!(
            "Wrote {} records to {} and {} records to {}",
            stats.forward_written,
            out_forward.display(),
            stats.reverse_written,
            out_reverse.display()
        );
        Ok(stats)
    }
}

/// Directory that holds `destination`.
fn parent_dir(destination: &Path) -> &Path {
    match destination.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    }
}

/// Temporary file in the destination's directory, so the final rename stays
/// on one filesystem. Created with the same mode `File::create` would use.
fn staging_file(destination: &Path) -> Result<NamedTempFile> {
    let mut builder = tempfile::Builder::new();
    builder.prefix(".matesect-").suffix(".tmp");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(OUTPUT_MODE));
    }
    Ok(builder.tempfile_in(parent_dir(destination))?)
}

/// Move an existing file at `destination` to a temporary name in the same
/// directory. The returned path deletes the old file when dropped.
fn set_aside(destination: &Path) -> Result<Option<TempPath>> {
    if fs::symlink_metadata(destination).is_err() {
        return Ok(None);
    }
    let backup = tempfile::Builder::new()
        .prefix(".matesect-")
        .suffix(".bak")
        .tempfile_in(parent_dir(destination))?
        .into_temp_path();
    fs::rename(destination, &backup)?;
    Ok(Some(backup))
}

/// Put `destination` back the way it was before [`set_aside`].
fn restore(destination: &Path, backup: Option<TempPath>) {
    let restored = match backup {
        Some(backup) => fs::rename(&backup, destination),
        None => fs::remove_file(destination),
    };
    if let Err(e) = restored {
        log::warn!("Could not restore {}: {}", destination.display(), e);
    }
}

/// Rename both staged outputs into place, or neither.
fn persist_pair(
    staged_forward: NamedTempFile,
    staged_reverse: NamedTempFile,
    out_forward: &Path,
    out_reverse: &Path,
) -> Result<()> {
    let backup = set_aside(out_forward)?;
    if let Err(e) = staged_forward.persist(out_forward) {
        if backup.is_some() {
            restore(out_forward, backup);
        }
        return Err(FastqError::Io(e.error));
    }
    if let Err(e) = staged_reverse.persist(out_reverse) {
        // Do not leave a forward output without its mate.
        restore(out_forward, backup);
        return Err(FastqError::Io(e.error));
    }
    Ok(())
}

/// Statistics from a paired intersection run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IntersectStats {
    /// Records read from the forward input
    pub forward_records: usize,
    /// Records read from the reverse input
    pub reverse_records: usize,
    /// Ids present in both inputs
    pub common_ids: usize,
    /// Records written to the forward output
    pub forward_written: usize,
    /// Records written to the reverse output
    pub reverse_written: usize,
    /// Forward records skipped because their id repeated
    pub forward_duplicates: usize,
    /// Reverse records skipped because their id repeated
    pub reverse_duplicates: usize,
}

impl IntersectStats {
    /// Forward records without a reverse mate.
    pub fn forward_only(&self) -> usize {
        self.forward_records - self.forward_duplicates - self.forward_written
    }

    /// Reverse records without a forward mate.
    pub fn reverse_only(&self) -> usize {
        self.reverse_records - self.reverse_duplicates - self.reverse_written
    }

    /// Records skipped in either file because their id repeated.
    pub fn duplicates_dropped(&self) -> usize {
        self.forward_duplicates + self.reverse_duplicates
    }
}

impl std::fmt::Display for IntersectStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Forward: {}, Reverse: {}, Common: {}, Written: {}/{}, Duplicates dropped: {}",
            self.forward_records,
            self.reverse_records,
            self.common_ids,
            self.forward_written,
            self.reverse_written,
            self.duplicates_dropped()
        )
    }
}
