//! The in-memory value a caller supplies for one leaf column (spec.md §3).

use crate::encoding::plain;
use crate::error::{ParquetError, Result};
use crate::schema::PhysicalType;

/// One leaf-column value, tagged by physical type.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Boolean(bool),
    Int32(i32),
    Int64(i64),
    /// The 12-byte INT96 representation, stored as three little-endian u32s
    /// (the legacy nanosecond-timestamp encoding; spec.md does not interpret
    /// it further).
    Int96([u32; 3]),
    Float(f32),
    Double(f64),
    ByteArray(Vec<u8>),
    FixedLenByteArray(Vec<u8>),
}

impl Value {
    /// The physical type this value would shred as.
    pub fn physical_type(&self) -> PhysicalType {
        match self {
            Value::Boolean(_) => PhysicalType::Boolean,
            Value::Int32(_) => PhysicalType::Int32,
            Value::Int64(_) => PhysicalType::Int64,
            Value::Int96(_) => PhysicalType::Int96,
            Value::Float(_) => PhysicalType::Float,
            Value::Double(_) => PhysicalType::Double,
            Value::ByteArray(_) => PhysicalType::ByteArray,
            Value::FixedLenByteArray(bytes) => PhysicalType::FixedLenByteArray(bytes.len() as i32),
        }
    }

    /// Checks this value's tag against the leaf's declared physical type
    /// (spec.md §3's "value whose type does not match its leaf" edge case).
    pub fn check_type(&self, expected: PhysicalType) -> Result<()> {
        let matches = match (self, expected) {
            (Value::Boolean(_), PhysicalType::Boolean) => true,
            (Value::Int32(_), PhysicalType::Int32) => true,
            (Value::Int64(_), PhysicalType::Int64) => true,
            (Value::Int96(_), PhysicalType::Int96) => true,
            (Value::Float(_), PhysicalType::Float) => true,
            (Value::Double(_), PhysicalType::Double) => true,
            (Value::ByteArray(_), PhysicalType::ByteArray) => true,
            (Value::FixedLenByteArray(bytes), PhysicalType::FixedLenByteArray(len)) => {
                bytes.len() == len as usize
            }
            _ => false,
        };
        if matches {
            Ok(())
        } else {
            Err(ParquetError::InvalidRecord(format!(
                "value {:?} does not match leaf physical type {:?}",
                self, expected
            )))
        }
    }

    /// This value's PLAIN-encoded bytes (spec.md §4.4), used both for
    /// direct PLAIN buffering and as a dictionary entry's key.
    pub fn to_plain_bytes(&self) -> Vec<u8> {
        let mut out = Vec::new();
        match self {
            Value::Boolean(v) => plain::encode_bool(&mut out, &[*v]),
            Value::Int32(v) => plain::encode_i32(&mut out, &[*v]),
            Value::Int64(v) => plain::encode_i64(&mut out, &[*v]),
            Value::Int96(words) => {
                for w in words {
                    out.extend_from_slice(&w.to_le_bytes());
                }
            }
            Value::Float(v) => plain::encode_f32(&mut out, &[*v]),
            Value::Double(v) => plain::encode_f64(&mut out, &[*v]),
            Value::ByteArray(bytes) => plain::encode_fixed(&mut out, PhysicalType::ByteArray, bytes),
            Value::FixedLenByteArray(bytes) => {
                plain::encode_fixed(&mut out, PhysicalType::FixedLenByteArray(bytes.len() as i32), bytes)
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn type_check_rejects_mismatch() {
        let v = Value::Int32(5);
        assert!(v.check_type(PhysicalType::Int32).is_ok());
        assert!(v.check_type(PhysicalType::Int64).is_err());
    }

    #[test]
    fn fixed_len_byte_array_checks_length() {
        let v = Value::FixedLenByteArray(vec![1, 2, 3]);
        assert!(v.check_type(PhysicalType::FixedLenByteArray(3)).is_ok());
        assert!(v.check_type(PhysicalType::FixedLenByteArray(4)).is_err());
    }
}
