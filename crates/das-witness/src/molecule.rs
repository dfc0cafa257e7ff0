//! Molecule binary encoding.
//!
//! Only the shapes the account and config cell schemas use are supported:
//! fixed-width integers, `Byte20`, `Bytes` (fixvec of byte), tables, dynvecs and
//! options. All integers are little-endian. Tables are read in compatible mode:
//! trailing fields unknown to this decoder are accepted, missing ones are not.

use crate::error::{DecodeError, DecodeResult};

const HEADER_UNIT: usize = 4;

fn le_u32(bytes: &[u8]) -> u32 {
    let mut buf = [0u8; 4];
    buf.copy_from_slice(&bytes[..4]);
    u32::from_le_bytes(buf)
}

fn exact<'a>(slice: &'a [u8], width: usize, what: &'static str) -> DecodeResult<&'a [u8]> {
    if slice.len() != width {
        return Err(DecodeError::WidthMismatch {
            what,
            expected: width,
            actual: slice.len(),
        });
    }
    Ok(slice)
}

pub fn read_u8(slice: &[u8], what: &'static str) -> DecodeResult<u8> {
    Ok(exact(slice, 1, what)?[0])
}

pub fn read_u32(slice: &[u8], what: &'static str) -> DecodeResult<u32> {
    Ok(le_u32(exact(slice, 4, what)?))
}

pub fn read_u64(slice: &[u8], what: &'static str) -> DecodeResult<u64> {
    let mut buf = [0u8; 8];
    buf.copy_from_slice(exact(slice, 8, what)?);
    Ok(u64::from_le_bytes(buf))
}

pub fn read_byte20(slice: &[u8], what: &'static str) -> DecodeResult<[u8; 20]> {
    let mut buf = [0u8; 20];
    buf.copy_from_slice(exact(slice, 20, what)?);
    Ok(buf)
}

/// Raw content of a `Bytes` field (`count: u32` followed by `count` bytes).
pub fn read_bytes<'a>(slice: &'a [u8], what: &'static str) -> DecodeResult<&'a [u8]> {
    if slice.len() < HEADER_UNIT {
        return Err(DecodeError::TooShort {
            what,
            expected: HEADER_UNIT,
            actual: slice.len(),
        });
    }
    let count = le_u32(slice) as usize;
    let declared = HEADER_UNIT + count;
    if declared != slice.len() {
        return Err(DecodeError::TotalSizeMismatch {
            what,
            declared,
            actual: slice.len(),
        });
    }
    Ok(&slice[HEADER_UNIT..])
}

pub fn read_string(slice: &[u8], what: &'static str) -> DecodeResult<String> {
    let bytes = read_bytes(slice, what)?;
    String::from_utf8(bytes.to_vec()).map_err(|_| DecodeError::InvalidUtf8 { what })
}

/// An empty slice encodes `None`.
pub fn read_option(slice: &[u8]) -> Option<&[u8]> {
    if slice.is_empty() {
        None
    } else {
        Some(slice)
    }
}

/// Split a table or dynvec into its item slices, validating the header.
fn split_offsets<'a>(slice: &'a [u8], what: &'static str) -> DecodeResult<Vec<&'a [u8]>> {
    if slice.len() < HEADER_UNIT {
        return Err(DecodeError::TooShort {
            what,
            expected: HEADER_UNIT,
            actual: slice.len(),
        });
    }
    let total = le_u32(slice) as usize;
    if total != slice.len() {
        return Err(DecodeError::TotalSizeMismatch {
            what,
            declared: total,
            actual: slice.len(),
        });
    }
    if total == HEADER_UNIT {
        return Ok(Vec::new());
    }
    if total < HEADER_UNIT * 2 {
        return Err(DecodeError::TooShort {
            what,
            expected: HEADER_UNIT * 2,
            actual: total,
        });
    }

    let first = le_u32(&slice[HEADER_UNIT..]) as usize;
    if first % HEADER_UNIT != 0 || first < HEADER_UNIT * 2 || first > total {
        return Err(DecodeError::InvalidOffsets { what });
    }
    let count = first / HEADER_UNIT - 1;

    let mut offsets: Vec<usize> = (0..count)
        .map(|i| le_u32(&slice[HEADER_UNIT * (i + 1)..]) as usize)
        .collect();
    offsets.push(total);
    if offsets.windows(2).any(|w| w[0] > w[1]) {
        return Err(DecodeError::InvalidOffsets { what });
    }

    Ok(offsets.windows(2).map(|w| &slice[w[0]..w[1]]).collect())
}

/// Items of a dynvec.
pub fn read_dynvec<'a>(slice: &'a [u8], what: &'static str) -> DecodeResult<Vec<&'a [u8]>> {
    split_offsets(slice, what)
}

/// A decoded table header with typed field accessors.
#[derive(Debug, Clone)]
pub struct Table<'a> {
    what: &'static str,
    fields: Vec<&'a [u8]>,
}

impl<'a> Table<'a> {
    /// Parse a table that must carry at least `min_fields` fields.
    pub fn parse(slice: &'a [u8], what: &'static str, min_fields: usize) -> DecodeResult<Self> {
        let fields = split_offsets(slice, what)?;
        if fields.len() < min_fields {
            return Err(DecodeError::FieldCountMismatch {
                what,
                expected: min_fields,
                actual: fields.len(),
            });
        }
        Ok(Self { what, fields })
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn field(&self, index: usize) -> DecodeResult<&'a [u8]> {
        self.fields
            .get(index)
            .copied()
            .ok_or(DecodeError::FieldCountMismatch {
                what: self.what,
                expected: index + 1,
                actual: self.fields.len(),
            })
    }

    pub fn u8(&self, index: usize, what: &'static str) -> DecodeResult<u8> {
        read_u8(self.field(index)?, what)
    }

    pub fn u32(&self, index: usize, what: &'static str) -> DecodeResult<u32> {
        read_u32(self.field(index)?, what)
    }

    pub fn u64(&self, index: usize, what: &'static str) -> DecodeResult<u64> {
        read_u64(self.field(index)?, what)
    }

    pub fn bytes(&self, index: usize, what: &'static str) -> DecodeResult<&'a [u8]> {
        read_bytes(self.field(index)?, what)
    }

    pub fn string(&self, index: usize, what: &'static str) -> DecodeResult<String> {
        read_string(self.field(index)?, what)
    }
}

// Encoders, used to build witnesses for fixtures and to check decoder output.

pub fn pack_u8(value: u8) -> Vec<u8> {
    vec![value]
}

pub fn pack_u32(value: u32) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

pub fn pack_u64(value: u64) -> Vec<u8> {
    value.to_le_bytes().to_vec()
}

pub fn pack_bytes(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(HEADER_UNIT + bytes.len());
    out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
    out.extend_from_slice(bytes);
    out
}

pub fn pack_table(fields: &[Vec<u8>]) -> Vec<u8> {
    let header_len = HEADER_UNIT * (fields.len() + 1);
    let total = header_len + fields.iter().map(Vec::len).sum::<usize>();
    let mut out = Vec::with_capacity(total);
    out.extend_from_slice(&(total as u32).to_le_bytes());
    let mut offset = header_len;
    for field in fields {
        out.extend_from_slice(&(offset as u32).to_le_bytes());
        offset += field.len();
    }
    for field in fields {
        out.extend_from_slice(field);
    }
    out
}

/// Dynvecs share the table layout.
pub fn pack_dynvec(items: &[Vec<u8>]) -> Vec<u8> {
    pack_table(items)
}

pub fn pack_option(inner: Option<Vec<u8>>) -> Vec<u8> {
    inner.unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixed_width_integers() {
        assert_eq!(read_u8(&[7], "u8").unwrap(), 7);
        assert_eq!(read_u32(&pack_u32(0xdead_beef), "u32").unwrap(), 0xdead_beef);
        assert_eq!(read_u64(&pack_u64(u64::MAX - 1), "u64").unwrap(), u64::MAX - 1);

        let err = read_u32(&[1, 2, 3], "ttl").unwrap_err();
        assert_eq!(
            err,
            DecodeError::WidthMismatch {
                what: "ttl",
                expected: 4,
                actual: 3
            }
        );
        assert!(read_u64(&[0; 9], "u64").is_err());
    }

    #[test]
    fn test_bytes_length_prefix() {
        let packed = pack_bytes(b"alice");
        assert_eq!(read_bytes(&packed, "bytes").unwrap(), b"alice");
        assert_eq!(read_string(&packed, "bytes").unwrap(), "alice");

        // declared length longer than the payload
        let mut short = packed.clone();
        short.pop();
        assert!(matches!(
            read_bytes(&short, "bytes"),
            Err(DecodeError::TotalSizeMismatch { .. })
        ));
        assert!(read_bytes(&[1, 0], "bytes").is_err());
        assert!(read_string(&pack_bytes(&[0xff, 0xfe]), "bytes").is_err());
    }

    #[test]
    fn test_table_fields() {
        let table = pack_table(&[pack_u8(1), pack_bytes(b"ab"), pack_u64(9)]);
        let parsed = Table::parse(&table, "sample", 3).unwrap();
        assert_eq!(parsed.len(), 3);
        assert_eq!(parsed.u8(0, "a").unwrap(), 1);
        assert_eq!(parsed.bytes(1, "b").unwrap(), b"ab");
        assert_eq!(parsed.u64(2, "c").unwrap(), 9);
        assert!(parsed.field(3).is_err());
    }

    #[test]
    fn test_table_compatible_mode() {
        let table = pack_table(&[pack_u32(1), pack_u32(2), pack_u32(3)]);
        assert!(Table::parse(&table, "sample", 2).is_ok());
        assert!(matches!(
            Table::parse(&table, "sample", 4),
            Err(DecodeError::FieldCountMismatch {
                expected: 4,
                actual: 3,
                ..
            })
        ));
    }

    #[test]
    fn test_empty_table_and_dynvec() {
        let empty = pack_dynvec(&[]);
        assert_eq!(empty, vec![4, 0, 0, 0]);
        assert!(read_dynvec(&empty, "records").unwrap().is_empty());

        let items = pack_dynvec(&[pack_bytes(b"x"), pack_bytes(b"yz")]);
        let parsed = read_dynvec(&items, "items").unwrap();
        assert_eq!(parsed.len(), 2);
        assert_eq!(read_bytes(parsed[1], "item").unwrap(), b"yz");
    }

    #[test]
    fn test_inconsistent_offsets_rejected() {
        let mut table = pack_table(&[pack_u32(1), pack_u32(2)]);
        // second offset points before the first
        table[8..12].copy_from_slice(&4u32.to_le_bytes());
        assert!(matches!(
            Table::parse(&table, "sample", 2),
            Err(DecodeError::InvalidOffsets { .. })
        ));

        let mut misaligned = pack_table(&[pack_u32(1)]);
        misaligned[4..8].copy_from_slice(&9u32.to_le_bytes());
        assert!(Table::parse(&misaligned, "sample", 1).is_err());

        let mut wrong_total = pack_table(&[pack_u32(1)]);
        wrong_total[0..4].copy_from_slice(&100u32.to_le_bytes());
        assert!(matches!(
            Table::parse(&wrong_total, "sample", 1),
            Err(DecodeError::TotalSizeMismatch { .. })
        ));
    }

    #[test]
    fn test_option() {
        assert!(read_option(&pack_option(None)).is_none());
        assert_eq!(read_option(&pack_option(Some(vec![1]))), Some(&[1u8][..]));
    }
}
