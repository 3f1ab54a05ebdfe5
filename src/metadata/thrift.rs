//! A small, self-contained codec for the file footer, shaped like the
//! Thrift Compact Protocol (field-id deltas, zigzag varints, a single
//! "stop" byte ending each struct). spec.md §4.12 treats the footer codec
//! as opaque and only requires stable round-tripping, so this avoids
//! binding to a generated Thrift crate (see DESIGN.md) while keeping the
//! same on-wire shape real Parquet readers expect from a compact-protocol
//! footer: compact, self-describing, and forward-extensible by field id.

use crate::encoding::uleb128;
use crate::encoding::zigzag_leb128;
use crate::error::{ParquetError, Result};

const STOP: u8 = 0x00;
const TYPE_BOOL_TRUE: u8 = 0x01;
const TYPE_BOOL_FALSE: u8 = 0x02;
const TYPE_I32: u8 = 0x05;
const TYPE_I64: u8 = 0x06;
const TYPE_STRING: u8 = 0x08;
const TYPE_LIST: u8 = 0x09;
const TYPE_STRUCT: u8 = 0x0C;

/// Writes struct fields with Thrift-compact field-id deltas.
pub struct Writer {
    buf: Vec<u8>,
    last_field_id: Vec<i16>,
}

impl Writer {
    pub fn new() -> Self {
        Self {
            buf: Vec::new(),
            last_field_id: vec![0],
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buf
    }

    pub fn len(&self) -> usize {
        self.buf.len()
    }

    fn write_varint(&mut self, value: u64) {
        let mut container = [0u8; 10];
        let used = uleb128::encode(value, &mut container);
        self.buf.extend_from_slice(&container[..used]);
    }

    fn field_header(&mut self, field_id: i16, type_: u8) {
        let last = *self.last_field_id.last().unwrap();
        let delta = field_id - last;
        if delta > 0 && delta <= 15 {
            self.buf.push(((delta as u8) << 4) | type_);
        } else {
            self.buf.push(type_);
            let zz = zigzag_leb128::encode(field_id as i64);
            self.write_varint(zz);
        }
        *self.last_field_id.last_mut().unwrap() = field_id;
    }

    pub fn struct_begin(&mut self) {
        self.buf.push(TYPE_STRUCT); // marker only used by nested-struct readers; top-level ignores it
        self.last_field_id.push(0);
    }

    /// Begins a struct *as a field value* of the enclosing struct.
    pub fn field_struct_begin(&mut self, field_id: i16) {
        self.field_header(field_id, TYPE_STRUCT);
        self.last_field_id.push(0);
    }

    pub fn struct_end(&mut self) {
        self.buf.push(STOP);
        self.last_field_id.pop();
    }

    pub fn field_i32(&mut self, field_id: i16, value: i32) {
        self.field_header(field_id, TYPE_I32);
        let zz = zigzag_leb128::encode(value as i64);
        self.write_varint(zz);
    }

    pub fn field_i64(&mut self, field_id: i16, value: i64) {
        self.field_header(field_id, TYPE_I64);
        let zz = zigzag_leb128::encode(value);
        self.write_varint(zz);
    }

    pub fn field_bool(&mut self, field_id: i16, value: bool) {
        self.field_header(field_id, if value { TYPE_BOOL_TRUE } else { TYPE_BOOL_FALSE });
    }

    pub fn field_string(&mut self, field_id: i16, value: &str) {
        self.field_header(field_id, TYPE_STRING);
        self.write_varint(value.len() as u64);
        self.buf.extend_from_slice(value.as_bytes());
    }

    /// Begins a list field; `write_list_element_*` must be called exactly
    /// `len` times afterwards, of the element kind named here.
    pub fn field_list_begin(&mut self, field_id: i16, elem_type: u8, len: usize) {
        self.field_header(field_id, TYPE_LIST);
        if len < 15 {
            self.buf.push(((len as u8) << 4) | elem_type);
        } else {
            self.buf.push(0xF0 | elem_type);
            self.write_varint(len as u64);
        }
    }

    /// Pushes a nested struct-typed list element; caller must close it with
    /// [`Writer::struct_end`].
    pub fn list_element_struct_begin(&mut self) {
        self.last_field_id.push(0);
    }

    pub fn list_element_string(&mut self, value: &str) {
        self.write_varint(value.len() as u64);
        self.buf.extend_from_slice(value.as_bytes());
    }

    pub fn list_element_i32(&mut self, value: i32) {
        let zz = zigzag_leb128::encode(value as i64);
        self.write_varint(zz);
    }
}

impl Default for Writer {
    fn default() -> Self {
        Self::new()
    }
}

/// Reads struct fields written by [`Writer`].
pub struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
    last_field_id: Vec<i16>,
}

/// One field header as read off the wire: `0` signals the struct's stop byte.
pub struct FieldHeader {
    pub id: i16,
    pub type_: u8,
}

impl<'a> Reader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self {
            buf,
            pos: 0,
            last_field_id: vec![0],
        }
    }

    pub fn position(&self) -> usize {
        self.pos
    }

    fn read_byte(&mut self) -> Result<u8> {
        let b = *self
            .buf
            .get(self.pos)
            .ok_or_else(|| ParquetError::MalformedStream("unexpected end of footer".to_string()))?;
        self.pos += 1;
        Ok(b)
    }

    fn read_varint(&mut self) -> Result<u64> {
        let (value, consumed) = uleb128::decode(&self.buf[self.pos..]);
        if consumed == 0 {
            return Err(ParquetError::MalformedStream(
                "truncated varint in footer".to_string(),
            ));
        }
        self.pos += consumed;
        Ok(value)
    }

    pub fn struct_begin(&mut self) -> Result<()> {
        let marker = self.read_byte()?;
        if marker != TYPE_STRUCT {
            return Err(ParquetError::MalformedStream(
                "expected struct marker".to_string(),
            ));
        }
        self.last_field_id.push(0);
        Ok(())
    }

    pub fn nested_struct_begin(&mut self) {
        self.last_field_id.push(0);
    }

    pub fn struct_end(&mut self) {
        self.last_field_id.pop();
    }

    /// Reads the next field header, or a stop marker (`type_ == 0`).
    pub fn field_begin(&mut self) -> Result<FieldHeader> {
        let byte = self.read_byte()?;
        if byte == STOP {
            return Ok(FieldHeader { id: 0, type_: STOP });
        }
        let type_ = byte & 0x0F;
        let short_delta = byte >> 4;
        let last = *self.last_field_id.last().unwrap();
        let id = if short_delta != 0 {
            last + short_delta as i16
        } else {
            let zz = self.read_varint()?;
            zigzag_leb128::decode(zz) as i16
        };
        *self.last_field_id.last_mut().unwrap() = id;
        Ok(FieldHeader { id, type_ })
    }

    pub fn read_i32(&mut self) -> Result<i32> {
        let zz = self.read_varint()?;
        Ok(zigzag_leb128::decode(zz) as i32)
    }

    pub fn read_i64(&mut self) -> Result<i64> {
        let zz = self.read_varint()?;
        Ok(zigzag_leb128::decode(zz))
    }

    pub fn read_string(&mut self) -> Result<String> {
        let len = self.read_varint()? as usize;
        let end = self.pos + len;
        let bytes = self
            .buf
            .get(self.pos..end)
            .ok_or_else(|| ParquetError::MalformedStream("truncated string in footer".to_string()))?;
        self.pos = end;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| ParquetError::MalformedStream(format!("invalid utf8 in footer: {}", e)))
    }

    /// Reads a list header, returning `(element_type, length)`.
    pub fn read_list_begin(&mut self) -> Result<(u8, usize)> {
        let byte = self.read_byte()?;
        let elem_type = byte & 0x0F;
        let short_len = byte >> 4;
        if short_len != 0x0F {
            Ok((elem_type, short_len as usize))
        } else {
            let len = self.read_varint()? as usize;
            Ok((elem_type, len))
        }
    }

    pub fn skip_field(&mut self, type_: u8) -> Result<()> {
        match type_ {
            TYPE_BOOL_TRUE | TYPE_BOOL_FALSE => {}
            TYPE_I32 | TYPE_I64 => {
                self.read_varint()?;
            }
            TYPE_STRING => {
                self.read_string()?;
            }
            TYPE_STRUCT => {
                self.nested_struct_begin();
                loop {
                    let f = self.field_begin()?;
                    if f.type_ == STOP {
                        break;
                    }
                    self.skip_field(f.type_)?;
                }
                self.struct_end();
            }
            TYPE_LIST => {
                let (elem_type, len) = self.read_list_begin()?;
                for _ in 0..len {
                    self.skip_field(elem_type)?;
                }
            }
            other => {
                return Err(ParquetError::MalformedStream(format!(
                    "unsupported field type {} while skipping",
                    other
                )))
            }
        }
        Ok(())
    }
}

pub mod type_ids {
    pub use super::{TYPE_BOOL_FALSE, TYPE_BOOL_TRUE, TYPE_I32, TYPE_I64, TYPE_LIST, TYPE_STRING, TYPE_STRUCT};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn roundtrip_scalars() {
        let mut w = Writer::new();
        w.struct_begin();
        w.field_i32(1, 42);
        w.field_string(2, "hello");
        w.field_bool(3, true);
        w.field_i64(10, -7);
        w.struct_end();
        let bytes = w.into_bytes();

        let mut r = Reader::new(&bytes);
        r.struct_begin().unwrap();
        let f1 = r.field_begin().unwrap();
        assert_eq!(f1.id, 1);
        assert_eq!(r.read_i32().unwrap(), 42);
        let f2 = r.field_begin().unwrap();
        assert_eq!(f2.id, 2);
        assert_eq!(r.read_string().unwrap(), "hello");
        let f3 = r.field_begin().unwrap();
        assert_eq!(f3.id, 3);
        assert_eq!(f3.type_, TYPE_BOOL_TRUE);
        let f4 = r.field_begin().unwrap();
        assert_eq!(f4.id, 10);
        assert_eq!(r.read_i64().unwrap(), -7);
        let stop = r.field_begin().unwrap();
        assert_eq!(stop.type_, STOP);
    }
}
