//! Read identifier extraction from FASTQ headers.
//!
//! A header has the form
//! `@<instrument>:<run>:<lane>:<tile>:<x>:<y>#<barcode>/<mate>`.
//! The canonical read id is the header up to (not including) the mate
//! marker, so both mates of a pair map to the same id.

use crate::fastq::{FastqError, Result};
use memchr::{memchr, memrchr};

/// Leading character of every FASTQ header line.
pub const SENTINEL: u8 = b'@';

/// Separates the coordinate block from the index barcode.
pub const BARCODE_DELIMITER: u8 = b'#';

/// Separates the barcode from the mate digit.
pub const MATE_DELIMITER: u8 = b'/';

/// Which end of a read pair a record belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Mate {
    /// `/1`
    Forward,
    /// `/2`
    Reverse,
}

impl Mate {
    /// Parse a mate digit (`b'1'` or `b'2'`).
    #[inline]
    pub fn from_digit(digit: u8) -> Option<Self> {
        match digit {
            b'1' => Some(Self::Forward),
            b'2' => Some(Self::Reverse),
            _ => None,
        }
    }

    /// Numeric mate marker (1 or 2).
    #[inline]
    pub fn number(self) -> u8 {
        match self {
            Self::Forward => 1,
            Self::Reverse => 2,
        }
    }
}

/// A parsed header: canonical id plus mate marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReadHeader<'a> {
    pub id: &'a str,
    pub mate: Mate,
}

/// Parse a header into its canonical id and mate marker.
///
/// Fails with [`FastqError::MalformedHeader`] when the header lacks the
/// sentinel, the barcode segment, or a `/1` / `/2` mate marker. The mate
/// delimiter may appear only once.
pub fn parse_header(header: &str) -> Result<ReadHeader<'_>> {
    let bytes = header.as_bytes();
    let malformed = || FastqError::MalformedHeader {
        header: header.to_string(),
    };

    if bytes.first() != Some(&SENTINEL) {
        return Err(malformed());
    }

    let slash = memrchr(MATE_DELIMITER, bytes).ok_or_else(malformed)?;
    if memchr(MATE_DELIMITER, bytes) != Some(slash) {
        return Err(malformed());
    }
    let mate = match &bytes[slash + 1..] {
        [digit] => Mate::from_digit(*digit).ok_or_else(malformed)?,
        _ => return Err(malformed()),
    };

    let id = &bytes[..slash];
    let hash = memchr(BARCODE_DELIMITER, id).ok_or_else(malformed)?;
    if memrchr(BARCODE_DELIMITER, id) != Some(hash) {
        return Err(malformed());
    }

    let coordinates = &id[1..hash];
    let barcode = &id[hash + 1..];
    if barcode.is_empty() || !valid_coordinates(coordinates) {
        return Err(malformed());
    }

    Ok(ReadHeader {
        id: &header[..slash],
        mate,
    })
}

/// Canonical read id of a header: the header with its mate marker removed.
///
/// ```
/// use matesect::read_id::read_id;
///
/// let id = read_id("@MISEQ578:1:1101:17145:1691#TTCAGA/1").unwrap();
/// assert_eq!(id, "@MISEQ578:1:1101:17145:1691#TTCAGA");
/// ```
#[inline]
pub fn read_id(header: &str) -> Result<&str> {
    parse_header(header).map(|parsed| parsed.id)
}

/// Instrument and coordinates: at least two non-empty `:`-separated fields,
/// no whitespace.
fn valid_coordinates(coordinates: &[u8]) -> bool {
    if coordinates.iter().any(u8::is_ascii_whitespace) {
        return false;
    }
    let mut fields = 0;
    for field in coordinates.split(|&b| b == b':') {
        if field.is_empty() {
            return false;
        }
        fields += 1;
    }
    fields >= 2
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_id_strips_mate_marker() {
        assert_eq!(
            read_id("@MISEQ578:1:1101:17145:1691#TTCAGA/1").unwrap(),
            "@MISEQ578:1:1101:17145:1691#TTCAGA"
        );
        assert_eq!(
            read_id("@MISEQ578:1:1101:17145:1691#TTCAGA/2").unwrap(),
            "@MISEQ578:1:1101:17145:1691#TTCAGA"
        );
    }

    #[test]
    fn test_six_field_header() {
        let parsed = parse_header("@HWI-ST1234:8:1101:1234:5678:91011#ACGTAC/2").unwrap();
        assert_eq!(parsed.id, "@HWI-ST1234:8:1101:1234:5678:91011#ACGTAC");
        assert_eq!(parsed.mate, Mate::Reverse);
    }

    #[test]
    fn test_malformed_header() {
        let err = read_id("@MISEQ:crap").unwrap_err();
        match err {
            FastqError::MalformedHeader { header } => assert_eq!(header, "@MISEQ:crap"),
            other => panic!("expected malformed header, got {:?}", other),
        }
    }

    #[test]
    fn test_rejects_structural_defects() {
        let bad = [
            "",
            "MISEQ578:1:1101:17145:1691#TTCAGA/1",
            "@MISEQ578:1:1101:17145:1691#TTCAGA",
            "@MISEQ578:1:1101:17145:1691#TTCAGA/",
            "@MISEQ578:1:1101:17145:1691#TTCAGA/3",
            "@MISEQ578:1:1101:17145:1691#TTCAGA/12",
            "@MISEQ578:1:1101:17145:1691/1",
            "@MISEQ578:1:1101:17145:1691#/1",
            "@#TTCAGA/1",
            "@MISEQ578#TTCAGA/1",
            "@MISEQ578::1101:17145:1691#TTCAGA/1",
            "@MISEQ578:1:1101:17145:1691#TT#CAGA/1",
            "@MISEQ578:1:1101 17145:1691#TTCAGA/1",
            "@M:1:1101:1:1#AA/CC/1",
            "@M/x:1:1101#AA/1",
        ];
        for header in bad {
            assert!(read_id(header).is_err(), "accepted '{}'", header);
        }
    }

    #[test]
    fn test_mate_numbers() {
        assert_eq!(Mate::from_digit(b'1'), Some(Mate::Forward));
        assert_eq!(Mate::from_digit(b'2'), Some(Mate::Reverse));
        assert_eq!(Mate::from_digit(b'0'), None);
        assert_eq!(Mate::Forward.number(), 1);
        assert_eq!(Mate::Reverse.number(), 2);
    }
}
