//! One leaf column's in-memory buffer (spec.md §4.9, §4.10): repetition
//! and definition level encoders plus a value sink (PLAIN or dictionary),
//! flushed into pages as they fill.

use crate::encoding::dictionary::DictionaryEncoder;
use crate::encoding::levels::LevelEncoder;
use crate::encoding::Encoding;
use crate::metadata::ColumnDescriptor;
use crate::page::{DataPage, DictionaryPage};
use crate::record::Value;
use crate::schema::PhysicalType;
use crate::write::WriteOptions;

/// A PLAIN-encoded value buffer. Most physical types are simply
/// concatenated byte-for-byte as each value arrives, but `BOOL` is
/// bit-packed 8 values to a byte (spec.md §4.4), so a `Boolean` value
/// can't be encoded in isolation — this tracks the in-progress byte
/// across calls to [`PlainBuffer::push_value`].
struct PlainBuffer {
    bytes: Vec<u8>,
    bool_pending_byte: u8,
    bool_pending_count: u8,
    /// Number of values pushed since the last [`PlainBuffer::finish`]. Needed
    /// because a flat `REQUIRED` leaf (`maxRep == maxDef == 0`) pushes no
    /// bytes into the level encoders at all, so `bytes.len()` alone can't
    /// tell `flush_page` how many values are buffered.
    value_count: usize,
}

impl PlainBuffer {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            bool_pending_byte: 0,
            bool_pending_count: 0,
            value_count: 0,
        }
    }

    fn push_value(&mut self, value: &Value) {
        match value {
            Value::Boolean(b) => {
                if *b {
                    self.bool_pending_byte |= 1 << self.bool_pending_count;
                }
                self.bool_pending_count += 1;
                if self.bool_pending_count == 8 {
                    self.bytes.push(self.bool_pending_byte);
                    self.bool_pending_byte = 0;
                    self.bool_pending_count = 0;
                }
            }
            other => self.bytes.extend_from_slice(&other.to_plain_bytes()),
        }
        self.value_count += 1;
    }

    /// Appends already-PLAIN-encoded bytes for a non-`BOOL` type directly
    /// (used when rebuilding a PLAIN buffer from a dictionary's entries).
    fn push_raw(&mut self, bytes: &[u8]) {
        self.bytes.extend_from_slice(bytes);
        self.value_count += 1;
    }

    /// Approximate buffered size, including a not-yet-full boolean byte.
    fn len(&self) -> usize {
        self.bytes.len() + if self.bool_pending_count > 0 { 1 } else { 0 }
    }

    /// Number of values pushed since the last [`PlainBuffer::finish`].
    fn value_count(&self) -> usize {
        self.value_count
    }

    /// Flushes any partial boolean byte (zero-padded on the high side, same
    /// rule as [`crate::encoding::bitpacking`]) and returns every byte
    /// buffered, resetting this buffer for the next page.
    fn finish(&mut self) -> Vec<u8> {
        if self.bool_pending_count > 0 {
            self.bytes.push(self.bool_pending_byte);
            self.bool_pending_byte = 0;
            self.bool_pending_count = 0;
        }
        self.value_count = 0;
        std::mem::take(&mut self.bytes)
    }
}

enum ValuesSink {
    Plain(PlainBuffer),
    Dictionary(DictionaryEncoder),
}

/// Buffers one leaf column's triples for the current row group, flushing
/// data pages once `page_size` is exceeded.
pub struct ColumnBuffer {
    descriptor: ColumnDescriptor,
    page_size: usize,
    rep_levels: LevelEncoder,
    def_levels: LevelEncoder,
    values: ValuesSink,
    /// Set once a dictionary column exceeds `dictionary_page_size` and
    /// switches to PLAIN for the remainder of the chunk (spec.md §9).
    fell_back_to_plain: bool,
    dictionary_page_size: usize,
    dictionary_emitted: bool,
    /// Set once any page has been flushed with `RLE_DICTIONARY` encoding,
    /// so a later fallback to PLAIN still knows a dictionary page must be
    /// written for the pages already produced (spec.md §9).
    used_dictionary_encoding: bool,
    /// The dictionary page captured at the moment of falling back to PLAIN,
    /// if [`Self::used_dictionary_encoding`] was already set by then — the
    /// live dictionary is discarded once the sink switches to a
    /// [`PlainBuffer`], so the page has to be snapshotted before that.
    pending_dictionary_snapshot: Option<DictionaryPage>,
    num_values_in_chunk: u64,
    /// Data pages already flushed from the live buffer but not yet handed
    /// to the file writer; a column chunk's pages are only written to disk
    /// once the whole row group has been collected (spec.md §4.9: a chunk
    /// is physically contiguous on disk, which is only knowable once no
    /// more records for it will arrive).
    pending_pages: Vec<DataPage>,
}

impl ColumnBuffer {
    pub fn new(descriptor: ColumnDescriptor, options: &WriteOptions) -> Self {
        let values = if options.enable_dictionary {
            ValuesSink::Dictionary(DictionaryEncoder::new())
        } else {
            ValuesSink::Plain(PlainBuffer::new())
        };
        Self {
            rep_levels: LevelEncoder::new(descriptor.max_rep_level()),
            def_levels: LevelEncoder::new(descriptor.max_def_level()),
            descriptor,
            page_size: options.page_size,
            values,
            fell_back_to_plain: false,
            dictionary_page_size: options.dictionary_page_size,
            dictionary_emitted: false,
            used_dictionary_encoding: false,
            pending_dictionary_snapshot: None,
            num_values_in_chunk: 0,
            pending_pages: Vec::new(),
        }
    }

    /// Flushes the live buffer into a page and stashes it in
    /// `pending_pages` if [`Self::should_flush_page`] says it's time.
    /// Returns whether a page was flushed.
    pub fn maybe_flush_page(&mut self) -> bool {
        if !self.should_flush_page() {
            return false;
        }
        if let Some(page) = self.flush_page() {
            self.pending_pages.push(page);
            true
        } else {
            false
        }
    }

    /// Flushes any remaining buffered values into a final page, then
    /// returns every page accumulated for this chunk (including that
    /// final one), clearing the pending list.
    pub fn take_pages(&mut self) -> Vec<DataPage> {
        if let Some(page) = self.flush_page() {
            self.pending_pages.push(page);
        }
        std::mem::take(&mut self.pending_pages)
    }

    pub fn descriptor(&self) -> &ColumnDescriptor {
        &self.descriptor
    }

    /// Writes one shredded triple. `value` is `None` for a null (spec.md §3:
    /// `definitionLevel < maxDefinitionLevel`).
    pub fn write_triple(&mut self, rep: i16, def: i16, value: Option<&Value>) {
        self.rep_levels.push(rep);
        self.def_levels.push(def);
        self.num_values_in_chunk += 1;

        if def == self.descriptor.max_def_level() {
            let value = value.expect("definition level at max implies a present value");
            match &mut self.values {
                ValuesSink::Plain(buf) => buf.push_value(value),
                ValuesSink::Dictionary(dict) => {
                    let plain_bytes = value.to_plain_bytes();
                    dict.push(&plain_bytes);
                    if dict.plain_byte_size() > self.dictionary_page_size {
                        self.fall_back_to_plain();
                    }
                }
            }
        }
    }

    /// Replaces a dictionary sink with an equivalent PLAIN buffer built
    /// from the dictionary's own entries (spec.md §9): the dictionary page
    /// already written (if any) stays valid for the ids already encoded,
    /// but the remainder of the chunk is encoded as PLAIN data pages.
    ///
    /// `BOOL` entries are re-packed bit-by-bit rather than concatenated
    /// raw, since a dictionary entry's PLAIN bytes are one byte per
    /// boolean (spec.md §4.4 only bit-packs within a single PLAIN value
    /// buffer, not across a dictionary's per-entry encoding).
    fn fall_back_to_plain(&mut self) {
        if let ValuesSink::Dictionary(dict) = &self.values {
            if self.used_dictionary_encoding && self.pending_dictionary_snapshot.is_none() {
                self.pending_dictionary_snapshot = Some(DictionaryPage {
                    num_values: dict.num_entries() as u32,
                    buffer: dict.dictionary_page_bytes(),
                });
            }
            let entries = dict.entries();
            let mut buf = PlainBuffer::new();
            if self.descriptor.type_().physical_type() == PhysicalType::Boolean {
                for &id in dict.ids() {
                    let bit_is_set = entries[id as usize].first().copied().unwrap_or(0) & 1 != 0;
                    buf.push_value(&Value::Boolean(bit_is_set));
                }
            } else {
                for &id in dict.ids() {
                    buf.push_raw(&entries[id as usize]);
                }
            }
            self.values = ValuesSink::Plain(buf);
        }
        self.fell_back_to_plain = true;
    }

    /// Current approximate memory footprint of everything buffered since
    /// the last page flush, used for both the page-size and (summed
    /// across columns) the row-group-size flush decisions.
    pub fn mem_size(&self) -> usize {
        let levels = self.rep_levels.len() * 4 + self.def_levels.len() * 4;
        let values = match &self.values {
            ValuesSink::Plain(buf) => buf.len(),
            ValuesSink::Dictionary(dict) => dict.plain_byte_size() + dict.num_values() * 4,
        };
        let pending: usize = self.pending_pages.iter().map(|p| p.buffer.len()).sum();
        levels + values + pending
    }

    pub fn should_flush_page(&self) -> bool {
        self.mem_size() >= self.page_size
    }

    pub fn num_buffered_values(&self) -> usize {
        self.rep_levels.len().max(self.def_levels.len()).max(match &self.values {
            ValuesSink::Plain(buf) => buf.value_count(),
            ValuesSink::Dictionary(dict) => dict.num_values(),
        })
    }

    /// The encoding the next data page will be written with.
    pub fn current_encoding(&self) -> Encoding {
        match &self.values {
            ValuesSink::Plain(_) => Encoding::Plain,
            ValuesSink::Dictionary(_) if !self.fell_back_to_plain => Encoding::RleDictionary,
            ValuesSink::Dictionary(_) => Encoding::Plain,
        }
    }

    /// Emits this chunk's dictionary page exactly once, the first time a
    /// dictionary-encoded column is flushed, or — if the column later fell
    /// back to PLAIN — the snapshot captured at fallback time, as long as
    /// some `RLE_DICTIONARY` page was produced before the fallback (spec.md
    /// §9). Returns `None` on every later call, and for columns that never
    /// used dictionary encoding at all.
    pub fn take_dictionary_page(&mut self) -> Option<DictionaryPage> {
        if self.dictionary_emitted {
            return None;
        }
        if let Some(page) = self.pending_dictionary_snapshot.take() {
            self.dictionary_emitted = true;
            return Some(page);
        }
        match &self.values {
            ValuesSink::Dictionary(dict) if !self.fell_back_to_plain => {
                self.dictionary_emitted = true;
                Some(DictionaryPage {
                    num_values: dict.num_entries() as u32,
                    buffer: dict.dictionary_page_bytes(),
                })
            }
            _ => None,
        }
    }

    /// Flushes the buffered levels/values into one data page, clearing the
    /// buffer for the next page. Returns `None` if nothing is buffered.
    pub fn flush_page(&mut self) -> Option<DataPage> {
        let num_values = self.num_buffered_values();
        if num_values == 0 {
            return None;
        }

        let mut buffer = Vec::new();
        if let Some(rep_bytes) = self.rep_levels.finish() {
            buffer.extend_from_slice(&(rep_bytes.len() as u32).to_le_bytes());
            buffer.extend_from_slice(&rep_bytes);
        }
        if let Some(def_bytes) = self.def_levels.finish() {
            buffer.extend_from_slice(&(def_bytes.len() as u32).to_le_bytes());
            buffer.extend_from_slice(&def_bytes);
        }

        let encoding = self.current_encoding();
        if encoding == Encoding::RleDictionary {
            self.used_dictionary_encoding = true;
        }
        match &mut self.values {
            ValuesSink::Plain(values) => {
                buffer.extend_from_slice(&values.finish());
            }
            ValuesSink::Dictionary(dict) => {
                buffer.extend_from_slice(&dict.encode_ids());
                dict.take_ids();
            }
        }

        self.rep_levels.clear();
        self.def_levels.clear();

        Some(DataPage {
            num_values: num_values as u32,
            encoding,
            buffer,
        })
    }

    /// Resets chunk-scoped state (dictionary, fallback flag, totals) for
    /// the next row group; levels/values are already empty after a flush.
    pub fn start_new_chunk(&mut self, options: &WriteOptions) {
        self.values = if options.enable_dictionary {
            ValuesSink::Dictionary(DictionaryEncoder::new())
        } else {
            ValuesSink::Plain(PlainBuffer::new())
        };
        self.fell_back_to_plain = false;
        self.dictionary_emitted = false;
        self.used_dictionary_encoding = false;
        self.pending_dictionary_snapshot = None;
        self.num_values_in_chunk = 0;
        self.pending_pages.clear();
    }

    pub fn num_values_in_chunk(&self) -> u64 {
        self.num_values_in_chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::SchemaDescriptor;

    fn int_column(options: &WriteOptions) -> ColumnBuffer {
        let schema = SchemaDescriptor::try_from_message("message m { required int32 x; }").unwrap();
        ColumnBuffer::new(schema.column(0).clone(), options)
    }

    #[test]
    fn plain_roundtrip_through_flush() {
        let options = WriteOptions {
            enable_dictionary: false,
            ..WriteOptions::default()
        };
        let mut column = int_column(&options);
        for v in [1i32, 2, 3] {
            column.write_triple(0, 0, Some(&Value::Int32(v)));
        }
        let page = column.flush_page().unwrap();
        assert_eq!(page.num_values, 3);
        assert_eq!(page.encoding, Encoding::Plain);
        assert_eq!(page.buffer, vec![1, 0, 0, 0, 2, 0, 0, 0, 3, 0, 0, 0]);
    }

    #[test]
    fn plain_bool_values_are_bit_packed_across_the_column() {
        let schema = SchemaDescriptor::try_from_message("message m { required boolean b; }").unwrap();
        let options = WriteOptions {
            enable_dictionary: false,
            ..WriteOptions::default()
        };
        let mut column = ColumnBuffer::new(schema.column(0).clone(), &options);
        // 9 values: the first 8 fill one byte, the 9th starts a second,
        // zero-padded byte (spec.md §4.4, §4.1's padding rule).
        let values = [true, false, true, true, false, false, false, true, true];
        for v in values {
            column.write_triple(0, 0, Some(&Value::Boolean(v)));
        }
        let page = column.take_pages().remove(0);
        assert_eq!(page.num_values, 9);
        // byte 0 packs the first 8 values LSB-first; byte 1 holds only the
        // 9th value, zero-padded on the high side.
        assert_eq!(page.buffer, vec![0b1000_1101, 0b0000_0001]);
        assert_eq!(crate::encoding::plain::decode_bool(&page.buffer, 9), values);
    }

    #[test]
    fn dictionary_emits_dictionary_page_once() {
        let options = WriteOptions::default();
        let mut column = int_column(&options);
        for v in [1i32, 1, 2] {
            column.write_triple(0, 0, Some(&Value::Int32(v)));
        }
        assert!(column.take_dictionary_page().is_some());
        assert!(column.take_dictionary_page().is_none());
        let page = column.flush_page().unwrap();
        assert_eq!(page.encoding, Encoding::RleDictionary);
    }

    #[test]
    fn dictionary_falls_back_to_plain_past_budget() {
        let options = WriteOptions {
            dictionary_page_size: 4, // tiny budget, forces fallback quickly
            ..WriteOptions::default()
        };
        let mut column = int_column(&options);
        for v in 0..10i32 {
            column.write_triple(0, 0, Some(&Value::Int32(v)));
        }
        assert_eq!(column.current_encoding(), Encoding::Plain);
    }

    #[test]
    fn dictionary_page_survives_fallback_after_a_page_already_flushed() {
        // A large enough page_size that the first few values flush as an
        // RLE_DICTIONARY page well before the dictionary itself grows past
        // its (tiny) budget and the column falls back to PLAIN.
        let options = WriteOptions {
            dictionary_page_size: 4,
            page_size: 1,
            ..WriteOptions::default()
        };
        let mut column = int_column(&options);
        for v in [1i32, 1, 2] {
            column.write_triple(0, 0, Some(&Value::Int32(v)));
            column.maybe_flush_page();
        }
        assert_eq!(column.current_encoding(), Encoding::Plain); // already fallen back
        assert!(
            column.pending_pages.iter().any(|p| p.encoding == Encoding::RleDictionary),
            "an RLE_DICTIONARY page must have been flushed before the fallback"
        );
        let dict_page = column.take_dictionary_page();
        assert!(
            dict_page.is_some(),
            "the dictionary page referenced by the already-flushed RLE_DICTIONARY page must still be emitted"
        );
        assert!(column.take_dictionary_page().is_none());
    }
}
