//! PLAIN encoding (spec.md §4.4): fixed-width types are written
//! little-endian back to back; `ByteArray` and `FixedLenByteArray` carry
//! their own length handling.

use crate::schema::PhysicalType;

/// Appends one value's PLAIN bytes to `out`.
///
/// `FixedLenByteArray` values are written raw, with no length prefix (the
/// length lives in the column's type metadata); `ByteArray` values are
/// written as a 4-byte little-endian length followed by the raw bytes.
pub fn encode_fixed(out: &mut Vec<u8>, physical_type: PhysicalType, bytes: &[u8]) {
    match physical_type {
        PhysicalType::ByteArray => {
            out.extend_from_slice(&(bytes.len() as u32).to_le_bytes());
            out.extend_from_slice(bytes);
        }
        _ => out.extend_from_slice(bytes),
    }
}

pub fn encode_bool(out: &mut Vec<u8>, values: &[bool]) {
    for chunk in values.chunks(8) {
        let mut byte = 0u8;
        for (i, &v) in chunk.iter().enumerate() {
            if v {
                byte |= 1 << i;
            }
        }
        out.push(byte);
    }
}

pub fn encode_i32(out: &mut Vec<u8>, values: &[i32]) {
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

pub fn encode_i64(out: &mut Vec<u8>, values: &[i64]) {
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

pub fn encode_f32(out: &mut Vec<u8>, values: &[f32]) {
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

pub fn encode_f64(out: &mut Vec<u8>, values: &[f64]) {
    for &v in values {
        out.extend_from_slice(&v.to_le_bytes());
    }
}

/// Iterates `ByteArray` values out of a PLAIN-encoded buffer: a 4-byte
/// little-endian length followed by that many raw bytes, repeated.
///
/// Grounded on the teacher's `plain_byte_array::BinaryIter`: a zero-copy
/// cursor over the buffer rather than materializing every slice up front.
#[derive(Debug)]
pub struct BinaryIter<'a> {
    values: &'a [u8],
}

impl<'a> BinaryIter<'a> {
    pub fn new(values: &'a [u8]) -> Self {
        Self { values }
    }
}

impl<'a> Iterator for BinaryIter<'a> {
    type Item = &'a [u8];

    fn next(&mut self) -> Option<Self::Item> {
        if self.values.len() < 4 {
            return None;
        }
        let length = u32::from_le_bytes(self.values[0..4].try_into().unwrap()) as usize;
        self.values = &self.values[4..];
        let result = &self.values[..length];
        self.values = &self.values[length..];
        Some(result)
    }
}

pub fn decode_bool(bytes: &[u8], count: usize) -> Vec<bool> {
    let mut out = Vec::with_capacity(count);
    'outer: for byte in bytes {
        for i in 0..8 {
            if out.len() == count {
                break 'outer;
            }
            out.push(byte & (1 << i) != 0);
        }
    }
    out
}

pub fn decode_i32(bytes: &[u8]) -> Vec<i32> {
    bytes
        .chunks_exact(4)
        .map(|c| i32::from_le_bytes(c.try_into().unwrap()))
        .collect()
}

pub fn decode_i64(bytes: &[u8]) -> Vec<i64> {
    bytes
        .chunks_exact(8)
        .map(|c| i64::from_le_bytes(c.try_into().unwrap()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_roundtrip() {
        let values = vec![true, false, true, true, false, false, false, true, true];
        let mut out = vec![];
        encode_bool(&mut out, &values);
        assert_eq!(out.len(), 2); // 9 values -> 2 bytes
        assert_eq!(decode_bool(&out, values.len()), values);
    }

    #[test]
    fn i32_roundtrip() {
        let values = vec![1i32, -2, 3, i32::MIN, i32::MAX];
        let mut out = vec![];
        encode_i32(&mut out, &values);
        assert_eq!(decode_i32(&out), values);
    }

    #[test]
    fn byte_array_roundtrip() {
        let mut out = vec![];
        encode_fixed(&mut out, PhysicalType::ByteArray, b"hello");
        encode_fixed(&mut out, PhysicalType::ByteArray, b"");
        encode_fixed(&mut out, PhysicalType::ByteArray, b"world!");
        let values: Vec<&[u8]> = BinaryIter::new(&out).collect();
        assert_eq!(values, vec![b"hello".as_ref(), b"".as_ref(), b"world!".as_ref()]);
    }

    #[test]
    fn fixed_len_byte_array_has_no_prefix() {
        let mut out = vec![];
        encode_fixed(&mut out, PhysicalType::FixedLenByteArray(4), &[1, 2, 3, 4]);
        assert_eq!(out, vec![1, 2, 3, 4]);
    }
}
