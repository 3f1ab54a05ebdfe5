//! The file-level writer (spec.md §7): an explicit state machine over
//! `NotStarted -> Started -> Block -> Column -> Block -> ... -> Started -> Ended`,
//! so that calling an operation out of order is rejected rather than
//! producing a malformed file.

use std::io::Write;

use crate::column::ColumnStore;
use crate::encoding::Encoding;
use crate::error::{ParquetError, Result};
use crate::metadata::{ColumnChunkMetaData, FileMetaData, KeyValue, RowGroupMetaData, SchemaDescriptor};
use crate::page::{self, CompressedPage, DataPage, DictionaryPage, Page};
use crate::record::GroupValue;
use crate::write::WriteOptions;

pub const MAGIC: [u8; 4] = *b"PAR1";
/// 4-byte little-endian footer length + the trailing magic.
pub const FOOTER_SIZE: u64 = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WriterState {
    NotStarted,
    Started,
    Block,
    Column,
}

struct ColumnChunkInProgress {
    index: usize,
    start_offset: u64,
    num_values: i64,
    total_uncompressed_size: i64,
    total_compressed_size: i64,
    dictionary_page_offset: Option<i64>,
    data_page_offset: Option<i64>,
    encodings: Vec<Encoding>,
}

/// Writes a parquet file: [`FileWriter::start`] writes the magic header;
/// each row group is framed by [`FileWriter::start_block`] /
/// [`FileWriter::end_block`], each column chunk within it by
/// [`FileWriter::start_column`] / [`FileWriter::end_column`]; and
/// [`FileWriter::end`] writes the footer and magic trailer.
///
/// [`FileWriter::write_row_group`] drives this state machine for callers
/// who already have whole records rather than pre-split pages.
pub struct FileWriter<W: Write> {
    writer: W,
    schema: SchemaDescriptor,
    options: WriteOptions,
    created_by: Option<String>,

    state: WriterState,
    offset: u64,
    row_groups: Vec<RowGroupMetaData>,

    current_block_columns: Vec<ColumnChunkMetaData>,
    current_block_start_offset: u64,
    current_column: Option<ColumnChunkInProgress>,
}

impl<W: Write> FileWriter<W> {
    pub fn new(writer: W, schema: SchemaDescriptor, options: WriteOptions, created_by: Option<String>) -> Self {
        Self {
            writer,
            schema,
            options,
            created_by,
            state: WriterState::NotStarted,
            offset: 0,
            row_groups: Vec::new(),
            current_block_columns: Vec::new(),
            current_block_start_offset: 0,
            current_column: None,
        }
    }

    pub fn schema(&self) -> &SchemaDescriptor {
        &self.schema
    }

    pub fn options(&self) -> &WriteOptions {
        &self.options
    }

    fn require_state(&self, expected: WriterState, op: &str) -> Result<()> {
        if self.state != expected {
            return Err(illegal_state!(
                "cannot call {} while writer is in state {:?} (expected {:?})",
                op,
                self.state,
                expected
            ));
        }
        Ok(())
    }

    /// Writes the `PAR1` magic header. Must be the first call.
    pub fn start(&mut self) -> Result<()> {
        self.require_state(WriterState::NotStarted, "start")?;
        self.writer.write_all(&MAGIC)?;
        self.offset = MAGIC.len() as u64;
        self.state = WriterState::Started;
        Ok(())
    }

    /// Opens a new row group. Must follow `start` or a prior `end_block`.
    pub fn start_block(&mut self) -> Result<()> {
        self.require_state(WriterState::Started, "start_block")?;
        self.current_block_columns = Vec::with_capacity(self.schema.num_columns());
        self.current_block_start_offset = self.offset;
        self.state = WriterState::Block;
        Ok(())
    }

    /// Opens the column chunk at `column_index` (schema leaf order). Column
    /// chunks within a row group must be started in schema order, since
    /// they land contiguously on disk in that order.
    pub fn start_column(&mut self, column_index: usize) -> Result<()> {
        self.require_state(WriterState::Block, "start_column")?;
        if column_index != self.current_block_columns.len() {
            return Err(illegal_state!(
                "expected column chunk {} next, got {}",
                self.current_block_columns.len(),
                column_index
            ));
        }
        self.current_column = Some(ColumnChunkInProgress {
            index: column_index,
            start_offset: self.offset,
            num_values: 0,
            total_uncompressed_size: 0,
            total_compressed_size: 0,
            dictionary_page_offset: None,
            data_page_offset: None,
            encodings: Vec::new(),
        });
        self.state = WriterState::Column;
        Ok(())
    }

    /// Writes this chunk's dictionary page. Must be called (if at all)
    /// before any data page, since a dictionary page always precedes the
    /// data pages that reference it (spec.md §5).
    pub fn write_dictionary_page(&mut self, dict: DictionaryPage) -> Result<()> {
        self.require_state(WriterState::Column, "write_dictionary_page")?;
        let current = self.current_column.as_ref().unwrap();
        if current.data_page_offset.is_some() {
            return Err(illegal_state!(
                "dictionary page must be written before data pages"
            ));
        }
        let offset = self.offset;
        self.write_page_and_track(page::Page::Dictionary(dict), Some(Encoding::Plain))?;
        self.current_column.as_mut().unwrap().dictionary_page_offset = Some(offset as i64);
        Ok(())
    }

    /// Writes one data page.
    pub fn write_data_page(&mut self, page: DataPage) -> Result<()> {
        self.require_state(WriterState::Column, "write_data_page")?;
        let offset = self.offset;
        let num_values = page.num_values as i64;
        let encoding = page.encoding;
        self.write_page_and_track(Page::Data(page), Some(encoding))?;
        let current = self.current_column.as_mut().unwrap();
        current.num_values += num_values;
        if current.data_page_offset.is_none() {
            current.data_page_offset = Some(offset as i64);
        }
        Ok(())
    }

    fn write_page_and_track(&mut self, page: Page, encoding: Option<Encoding>) -> Result<()> {
        let compressed = page::compress_page(page, self.options.compression)?;
        let uncompressed_size = compressed.uncompressed_size;
        let compressed_size = match &compressed.page {
            page::CompressedPageKind::Data { buffer, .. } => buffer.len(),
            page::CompressedPageKind::Dictionary { buffer, .. } => buffer.len(),
        };
        let written = page::write_page(&mut self.writer, &compressed)?;
        self.offset += written;

        let current = self.current_column.as_mut().unwrap();
        current.total_uncompressed_size += (written as usize - compressed_size + uncompressed_size) as i64;
        current.total_compressed_size += written as i64;
        if let Some(encoding) = encoding {
            if !current.encodings.contains(&encoding) {
                current.encodings.push(encoding);
            }
        }
        Ok(())
    }

    /// Closes the current column chunk, recording its metadata.
    pub fn end_column(&mut self) -> Result<()> {
        self.require_state(WriterState::Column, "end_column")?;
        let current = self.current_column.take().unwrap();
        let data_page_offset = current.data_page_offset.ok_or_else(|| {
            illegal_state!("column chunk {} has no data pages", current.index)
        })?;
        let descriptor = self.schema.column(current.index);
        self.current_block_columns.push(ColumnChunkMetaData {
            path_in_schema: descriptor.path_in_schema().to_vec(),
            physical_type: descriptor.type_().physical_type(),
            encodings: current.encodings,
            codec: self.options.compression,
            num_values: current.num_values,
            total_uncompressed_size: current.total_uncompressed_size,
            total_compressed_size: current.total_compressed_size,
            data_page_offset,
            dictionary_page_offset: current.dictionary_page_offset,
        });
        self.state = WriterState::Block;
        Ok(())
    }

    /// Closes the row group, recording its metadata.
    pub fn end_block(&mut self, num_rows: i64) -> Result<()> {
        self.require_state(WriterState::Block, "end_block")?;
        if self.current_block_columns.len() != self.schema.num_columns() {
            return Err(illegal_state!(
                "row group closed with {} of {} column chunks written",
                self.current_block_columns.len(),
                self.schema.num_columns()
            ));
        }
        let total_byte_size = self.current_block_columns.iter().map(|c| c.total_uncompressed_size).sum();
        self.row_groups.push(RowGroupMetaData {
            columns: std::mem::take(&mut self.current_block_columns),
            total_byte_size,
            num_rows,
        });
        self.state = WriterState::Started;
        Ok(())
    }

    /// Writes one row group end-to-end from whole records, driving
    /// `start_block`/`start_column`/.../`end_block` internally. Buffers
    /// the row group in a [`ColumnStore`] so that dictionary fallback and
    /// page sizing can look at the whole group before anything is written.
    pub fn write_row_group(&mut self, records: &[GroupValue]) -> Result<()> {
        let mut store = ColumnStore::new(&self.schema, &self.options);
        for record in records {
            store.write_record(record)?;
        }
        let num_records = store.num_records() as i64;
        let per_column = store.finish_block(&self.options);

        self.start_block()?;
        for (index, (dict_page, data_pages)) in per_column.into_iter().enumerate() {
            self.start_column(index)?;
            if let Some(dict_page) = dict_page {
                self.write_dictionary_page(dict_page)?;
            }
            for data_page in data_pages {
                self.write_data_page(data_page)?;
            }
            self.end_column()?;
        }
        self.end_block(num_records)?;
        Ok(())
    }

    /// Writes the footer and magic trailer, returning the total file size
    /// and the underlying writer.
    pub fn end(mut self, key_value_metadata: Vec<KeyValue>) -> Result<(u64, W)> {
        self.require_state(WriterState::Started, "end")?;
        let num_rows = self.row_groups.iter().map(|rg| rg.num_rows).sum();
        let metadata = FileMetaData {
            version: 1,
            num_rows,
            row_groups: std::mem::take(&mut self.row_groups),
            key_value_metadata,
            created_by: self.created_by.clone(),
        };
        let footer_bytes = metadata.write(&self.schema);
        let footer_len: i32 = footer_bytes
            .len()
            .try_into()
            .map_err(|_| ParquetError::OutOfSpec("footer exceeds i32::MAX bytes".to_string()))?;

        self.writer.write_all(&footer_bytes)?;
        self.writer.write_all(&footer_len.to_le_bytes())?;
        self.writer.write_all(&MAGIC)?;

        let total = self.offset + footer_bytes.len() as u64 + FOOTER_SIZE;
        Ok((total, self.writer))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{shredder::Field, Value};
    use std::io::Cursor;

    fn schema() -> SchemaDescriptor {
        SchemaDescriptor::try_from_message("message m { required int32 x; }").unwrap()
    }

    #[test]
    fn illegal_transitions_are_rejected() {
        let mut writer = FileWriter::new(Cursor::new(Vec::new()), schema(), WriteOptions::default(), None);
        assert!(writer.start_block().is_err()); // before start()
        writer.start().unwrap();
        assert!(writer.start().is_err()); // start() twice
        assert!(writer.end_column().is_err()); // before start_block()/start_column()
        writer.start_block().unwrap();
        assert!(writer.start_column(1).is_err()); // out of order
        writer.start_column(0).unwrap();
        assert!(writer.end_block(0).is_err()); // column still open
    }

    #[test]
    fn end_to_end_tiny_file() {
        let mut writer = FileWriter::new(Cursor::new(Vec::new()), schema(), WriteOptions::default(), None);
        writer.start().unwrap();
        let records: Vec<GroupValue> = [1i32, 2, 3]
            .into_iter()
            .map(|v| GroupValue::new().with("x", Field::Value(Value::Int32(v))))
            .collect();
        writer.write_row_group(&records).unwrap();
        let (total_size, cursor) = writer.end(vec![]).unwrap();
        let bytes = cursor.into_inner();
        assert_eq!(bytes.len() as u64, total_size);
        assert_eq!(&bytes[0..4], &MAGIC);
        assert_eq!(&bytes[bytes.len() - 4..], &MAGIC);
    }
}
