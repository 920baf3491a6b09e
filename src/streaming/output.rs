//! Buffered FASTQ output.
//!
//! Records are written whole: all four lines go into the buffer before the
//! next record is accepted, so a flushed stream never ends mid-record.
//!
//! Every line is terminated with `\n`. The reader strips `\r\n` as well as
//! `\n`, so records read from a CRLF file are re-emitted with LF endings;
//! apart from the terminators their bytes are unchanged.

use crate::fastq::{FastqError, FastqRecord};
use crate::streaming::buffers::DEFAULT_OUTPUT_BUFFER;
use std::io::{BufWriter, Write};

/// Buffered FASTQ record writer.
pub struct FastqWriter<W: Write> {
    writer: BufWriter<W>,
    records_written: usize,
}

impl<W: Write> FastqWriter<W> {
    /// Create a new FastqWriter with the default buffer.
    pub fn new(output: W) -> Self {
        Self::with_capacity(DEFAULT_OUTPUT_BUFFER, output)
    }

    /// Create a new FastqWriter with specified buffer size.
    pub fn with_capacity(capacity: usize, output: W) -> Self {
        Self {
            writer: BufWriter::with_capacity(capacity, output),
            records_written: 0,
        }
    }

    /// Write one record as four newline-terminated lines.
    #[inline]
    pub fn write_record(&mut self, record: &FastqRecord) -> Result<(), FastqError> {
        for line in [
            &record.header,
            &record.sequence,
            &record.separator,
            &record.quality,
        ] {
            self.writer.write_all(line.as_bytes())?;
            self.writer.write_all(b"\n")?;
        }
        self.records_written += 1;
        Ok(())
    }

    /// Number of records written so far.
    pub fn records_written(&self) -> usize {
        self.records_written
    }

    /// Flush the output buffer.
    pub fn flush(&mut self) -> Result<(), FastqError> {
        self.writer.flush()?;
        Ok(())
    }
}
