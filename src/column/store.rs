//! Coordinates one [`ColumnBuffer`] per leaf column across a row group,
//! and implements the adaptive row-group (block) flush heuristic
//! (spec.md §4.10, §9).

use crate::column::buffer::ColumnBuffer;
use crate::error::Result;
use crate::metadata::SchemaDescriptor;
use crate::page::{DataPage, DictionaryPage};
use crate::record::{shred_record, GroupValue};
use crate::write::WriteOptions;

/// Buffers an entire row group's worth of records, one [`ColumnBuffer`]
/// per leaf, and decides when the row group has grown large enough to
/// close.
pub struct ColumnStore {
    columns: Vec<ColumnBuffer>,
    root: crate::schema::ParquetType,
    validating: bool,
    block_size: usize,
    num_records: usize,
    /// Records written since the last time `mem_size` was actually
    /// recomputed; spec.md's adaptive check avoids recomputing it after
    /// every single record.
    records_since_check: usize,
    next_check: usize,
}

impl ColumnStore {
    pub fn new(schema: &SchemaDescriptor, options: &WriteOptions) -> Self {
        let columns = schema
            .columns()
            .iter()
            .map(|descriptor| ColumnBuffer::new(descriptor.clone(), options))
            .collect();
        Self {
            columns,
            root: schema.root_schema().clone(),
            validating: options.validating,
            block_size: options.block_size,
            num_records: 0,
            records_since_check: 0,
            next_check: 100,
        }
    }

    pub fn columns_mut(&mut self) -> &mut [ColumnBuffer] {
        &mut self.columns
    }

    pub fn num_records(&self) -> usize {
        self.num_records
    }

    /// Shreds `record` against the schema and feeds each leaf's triples
    /// into its buffer.
    pub fn write_record(&mut self, record: &GroupValue) -> Result<()> {
        let per_leaf = shred_record(&self.root, record, self.validating)?;
        for (column, triples) in self.columns.iter_mut().zip(per_leaf.into_iter()) {
            for (rep, def, value) in triples {
                column.write_triple(rep, def, value.as_ref());
            }
            column.maybe_flush_page();
        }
        self.num_records += 1;
        self.records_since_check += 1;
        Ok(())
    }

    /// Total buffered memory across every column; expensive enough
    /// (O(columns)) that callers should gate it behind
    /// [`ColumnStore::should_check_block_size`] rather than call it per record.
    pub fn mem_size(&self) -> usize {
        self.columns.iter().map(|c| c.mem_size()).sum()
    }

    /// Whether enough records have accumulated since the last check to
    /// warrant recomputing `mem_size` (spec.md §4.10's adaptive policy:
    /// `nextCheck = max(100, (records + blockSize/avgRecordSize) / 2)`).
    pub fn should_check_block_size(&self) -> bool {
        self.records_since_check >= self.next_check
    }

    /// Recomputes the next check threshold from the current average
    /// per-record memory footprint, and returns whether the row group has
    /// reached `block_size` and should be closed.
    pub fn recheck_block_size(&mut self) -> bool {
        let total = self.mem_size();
        self.records_since_check = 0;

        let avg_record_size = if self.num_records > 0 {
            (total / self.num_records).max(1)
        } else {
            1
        };
        let remaining_budget = self.block_size.saturating_sub(total);
        self.next_check = (100).max((remaining_budget / avg_record_size) / 2);

        total >= self.block_size
    }

    /// Closes out the row group: for every column, returns its (at most
    /// one) dictionary page and every data page accumulated, in column
    /// order, then resets each column's chunk-scoped state for the next
    /// row group.
    pub fn finish_block(&mut self, options: &WriteOptions) -> Vec<(Option<DictionaryPage>, Vec<DataPage>)> {
        let result = self
            .columns
            .iter_mut()
            .map(|column| {
                let dict_page = column.take_dictionary_page();
                let data_pages = column.take_pages();
                (dict_page, data_pages)
            })
            .collect();

        for column in &mut self.columns {
            column.start_new_chunk(options);
        }
        self.num_records = 0;
        self.records_since_check = 0;
        self.next_check = 100;
        result
    }
}
