//! Streaming FASTQ parser.
//!
//! Records are read in strict groups of four lines (header, sequence,
//! separator, quality). A trailing partial group is an error rather than
//! being silently discarded.

use crate::read_id::{parse_header, read_id, ReadHeader};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur while reading, indexing or filtering FASTQ files.
#[derive(Error, Debug)]
pub enum FastqError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Unparseable read header: '{header}'")]
    MalformedHeader { header: String },

    #[error("Truncated record at line {line}: found {lines} of 4 lines")]
    TruncatedRecord { line: usize, lines: usize },

    #[error("Missing '+' separator at line {line}: '{found}'")]
    MissingSeparator { line: usize, found: String },

    #[error("Duplicate read id '{id}' at line {line}")]
    DuplicateId { id: String, line: usize },

    #[error("Read '{header}' does not carry the expected mate marker /{expected}")]
    MateMismatch { header: String, expected: u8 },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, FastqError>;

/// One sequencing read: the four lines of a record group, without line
/// terminators.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FastqRecord {
    pub header: String,
    pub sequence: String,
    pub separator: String,
    pub quality: String,
}

impl FastqRecord {
    pub fn new(
        header: impl Into<String>,
        sequence: impl Into<String>,
        separator: impl Into<String>,
        quality: impl Into<String>,
    ) -> Self {
        Self {
            header: header.into(),
            sequence: sequence.into(),
            separator: separator.into(),
            quality: quality.into(),
        }
    }

    /// Canonical read id of this record (header minus the mate marker).
    #[inline]
    pub fn read_id(&self) -> Result<&str> {
        read_id(&self.header)
    }

    /// Canonical read id together with the mate marker.
    #[inline]
    pub fn parse_header(&self) -> Result<ReadHeader<'_>> {
        parse_header(&self.header)
    }

    fn clear(&mut self) {
        self.header.clear();
        self.sequence.clear();
        self.separator.clear();
        self.quality.clear();
    }
}

/// A streaming FASTQ file reader.
pub struct FastqReader<R: Read> {
    reader: BufReader<R>,
    line_number: usize,
    record_line: usize,
}

impl FastqReader<File> {
    /// Open a FASTQ file from a path.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = File::open(path)?;
        Ok(Self::new(file))
    }
}

impl<R: Read> FastqReader<R> {
    /// Create a new FASTQ reader from any readable source.
    pub fn new(reader: R) -> Self {
        Self {
            reader: BufReader::new(reader),
            line_number: 0,
            record_line: 0,
        }
    }

    /// Create a FASTQ reader with custom buffer capacity.
    pub fn with_capacity(reader: R, capacity: usize) -> Self {
        Self {
            reader: BufReader::with_capacity(capacity, reader),
            line_number: 0,
            record_line: 0,
        }
    }

    /// Number of lines consumed so far.
    pub fn line_number(&self) -> usize {
        self.line_number
    }

    /// 1-based line number of the header of the most recently read record.
    pub fn record_line(&self) -> usize {
        self.record_line
    }

    /// Read the next record into `record`, reusing its allocations.
    ///
    /// Returns `Ok(false)` at a clean end of input.
    pub fn read_into(&mut self, record: &mut FastqRecord) -> Result<bool> {
        record.clear();

        if !self.read_line(&mut record.header)? {
            return Ok(false);
        }
        self.record_line = self.line_number;

        if !self.read_line(&mut record.sequence)? {
            return Err(self.truncated(1));
        }
        if !self.read_line(&mut record.separator)? {
            return Err(self.truncated(2));
        }
        if !record.separator.starts_with('+') {
            return Err(FastqError::MissingSeparator {
                line: self.line_number,
                found: record.separator.clone(),
            });
        }
        if !self.read_line(&mut record.quality)? {
            return Err(self.truncated(3));
        }

        Ok(true)
    }

    /// Read the next FASTQ record.
    pub fn read_record(&mut self) -> Result<Option<FastqRecord>> {
        let mut record = FastqRecord::default();
        if self.read_into(&mut record)? {
            Ok(Some(record))
        } else {
            Ok(None)
        }
    }

    /// Get an iterator over all records.
    pub fn records(self) -> FastqRecordIter<R> {
        FastqRecordIter { reader: self }
    }

    /// Read one line into `buf` with its terminator stripped.
    fn read_line(&mut self, buf: &mut String) -> Result<bool> {
        let bytes_read = self.reader.read_line(buf)?;
        if bytes_read == 0 {
            return Ok(false);
        }
        self.line_number += 1;

        if buf.ends_with('\n') {
            buf.pop();
            if buf.ends_with('\r') {
                buf.pop();
            }
        }
        Ok(true)
    }

    fn truncated(&self, lines: usize) -> FastqError {
        FastqError::TruncatedRecord {
            line: self.record_line,
            lines,
        }
    }
}

/// Iterator over FASTQ records.
pub struct FastqRecordIter<R: Read> {
    reader: FastqReader<R>,
}

impl<R: Read> Iterator for FastqRecordIter<R> {
    type Item = Result<FastqRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        match self.reader.read_record() {
            Ok(Some(record)) => Some(Ok(record)),
            Ok(None) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

/// Read all records from a FASTQ file.
pub fn read_records<P: AsRef<Path>>(path: P) -> Result<Vec<FastqRecord>> {
    let reader = FastqReader::from_path(path)?;
    reader.records().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    const TWO_RECORDS: &str = "@M1:1:1101:1:1#AAA/1\nACGT\n+\nIIII\n\
                               @M1:1:1101:2:2#CCC/1\nTTTT\n+M1:1:1101:2:2#CCC/1\nJJJJ\n";

    #[test]
    fn test_read_records() {
        let reader = FastqReader::new(TWO_RECORDS.as_bytes());
        let records: Vec<_> = reader.records().collect::<Result<_>>().unwrap();

        assert_eq!(records.len(), 2);
        assert_eq!(records[0].header, "@M1:1:1101:1:1#AAA/1");
        assert_eq!(records[0].sequence, "ACGT");
        assert_eq!(records[0].separator, "+");
        assert_eq!(records[0].quality, "IIII");
        assert_eq!(records[1].separator, "+M1:1:1101:2:2#CCC/1");
    }

    #[test]
    fn test_crlf_line_endings() {
        let content = "@M1:1:1101:1:1#AAA/1\r\nACGT\r\n+\r\nIIII\r\n";
        let mut reader = FastqReader::new(content.as_bytes());
        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.header, "@M1:1:1101:1:1#AAA/1");
        assert_eq!(record.quality, "IIII");
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_missing_final_newline() {
        let content = "@M1:1:1101:1:1#AAA/1\nACGT\n+\nIIII";
        let mut reader = FastqReader::new(content.as_bytes());
        let record = reader.read_record().unwrap().unwrap();
        assert_eq!(record.quality, "IIII");
        assert!(reader.read_record().unwrap().is_none());
    }

    #[test]
    fn test_truncated_record() {
        let content = "@M1:1:1101:1:1#AAA/1\nACGT\n+\nIIII\n@M1:1:1101:2:2#CCC/1\nTTTT\n";
        let reader = FastqReader::new(content.as_bytes());
        let result: Result<Vec<_>> = reader.records().collect();

        match result {
            Err(FastqError::TruncatedRecord { line, lines }) => {
                assert_eq!(line, 5);
                assert_eq!(lines, 2);
            }
            other => panic!("expected truncated record, got {:?}", other),
        }
    }

    #[test]
    fn test_missing_separator() {
        let content = "@M1:1:1101:1:1#AAA/1\nACGT\nIIII\n@M1:1:1101:2:2#CCC/1\n";
        let mut reader = FastqReader::new(content.as_bytes());
        let err = reader.read_record().unwrap_err();
        assert!(matches!(err, FastqError::MissingSeparator { line: 3, .. }));
    }

    #[test]
    fn test_empty_input() {
        let mut reader = FastqReader::new(&b""[..]);
        assert!(reader.read_record().unwrap().is_none());
        assert_eq!(reader.line_number(), 0);
    }

    #[test]
    fn test_read_into_reuses_record() {
        let mut reader = FastqReader::new(TWO_RECORDS.as_bytes());
        let mut record = FastqRecord::default();

        assert!(reader.read_into(&mut record).unwrap());
        assert_eq!(reader.record_line(), 1);
        assert!(reader.read_into(&mut record).unwrap());
        assert_eq!(reader.record_line(), 5);
        assert_eq!(record.sequence, "TTTT");
        assert!(!reader.read_into(&mut record).unwrap());
        assert_eq!(reader.line_number(), 8);
    }

    #[test]
    fn test_read_records_from_path() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TWO_RECORDS.as_bytes()).unwrap();
        file.flush().unwrap();

        let records = read_records(file.path()).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].read_id().unwrap(), "@M1:1:1101:2:2#CCC");
    }

    #[test]
    fn test_record_read_id() {
        let record = FastqRecord::new("@M1:1:1101:1:1#AAA/2", "A", "+", "I");
        assert_eq!(record.read_id().unwrap(), "@M1:1:1101:1:1#AAA");
    }
}
